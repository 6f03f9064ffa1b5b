//! Segmask composites crowdsourced segmentation annotations into class masks.
//!
//! A mask is a raster the size of the annotated image where every labelled pixel carries
//! the colour of its class. Two independent sessions given the same vocabulary and the
//! same annotations produce byte-identical masks.
//!
//! # Pipeline overview
//!
//! 1. **Load**: raw annotation payloads (`ann_in_progress`, `ann_final`) are normalised,
//!    parsed and classified into typed [`Annotation`] values ([`load_annotations`]).
//! 2. **Compile**: a [`RenderRequest`] becomes a [`MaskPlan`], an ordered list of
//!    [`DrawOp`]s with resolved colour and [`BlendMode`] ([`compile_mask`]).
//! 3. **Execute**: the plan is replayed onto a fresh black [`MaskSurface`]
//!    ([`execute_plan`]).
//! 4. **Encode** (optional): the surface becomes a PNG or a `data:` URL for upload
//!    ([`encode_png`], [`png_data_url`]).
//!
//! [`MaskCompositor`] bundles steps 2 and 3; [`process_hit`] and [`ReviewSession`] drive
//! the full load/render/submit lifecycle.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: colours depend only on class position in the vocabulary, and
//!   rasterisation is aliased so output never depends on anti-aliasing heuristics.
//! - **No IO in rendering**: payload fetching and submission sit behind
//!   [`ReviewTransport`] or the caller.
#![forbid(unsafe_code)]

mod annotation;
mod color;
mod encode;
mod foundation;
mod render;
mod review;

pub use annotation::model::{
    Annotation, AnnotationKind, BoxAnnotation, InProgress, ObjectAnnotation, ShapeAnnotation,
    Stroke, StrokeKind,
};
pub use annotation::payload::{
    LoadIssue, LoadedAnnotations, PayloadField, classify_record, load_annotations,
    normalize_quotes, parse_records,
};
pub use color::assigner::{
    CLASS_LIST_DELIMITER, ClassColor, ColorAssigner, DEFAULT_CLASS_LIST, Hsv, class_hash,
    class_key, hsv_for_key, hsv_to_rgb, hue_for_key,
};
pub use encode::png::{decode_data_url, decode_png, encode_png, png_data_url, write_png};
pub use foundation::core::{BezPath, Canvas, Point, Rect, Rgb8};
pub use foundation::error::{SegmaskError, SegmaskResult};
pub use render::blend::{BACKGROUND, BlendMode, Paint, Rgba8, blend, blend_covered_in_place};
pub use render::compositor::{MaskCompositor, MaskSurface, execute_plan};
pub use render::plan::{DrawOp, Geometry, MaskPlan, OpSource, RenderRequest, compile_mask};
pub use render::raster::Coverage;
pub use render::settings::RenderSettings;
pub use review::session::{
    HitOutcome, HitPayload, HitTarget, MaskSubmission, ReviewCommand, ReviewQueue,
    ReviewRecord, ReviewSession, ReviewTransport, process_hit,
};
