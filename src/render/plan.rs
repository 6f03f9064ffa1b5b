use crate::{
    annotation::model::{Annotation, AnnotationKind, InProgress, ObjectAnnotation, StrokeKind},
    annotation::payload::LoadedAnnotations,
    color::assigner::ColorAssigner,
    foundation::core::{Canvas, Point, Rect, Rgb8},
    foundation::error::SegmaskResult,
    render::blend::{BlendMode, Paint},
    render::settings::RenderSettings,
};

#[derive(Clone, Debug, PartialEq)]
/// Everything one mask render depends on.
///
/// Finalized annotations paint in list order; the in-progress slots paint after all
/// of them, in the fixed order box, polygon, outline, object.
pub struct RenderRequest {
    pub canvas: Canvas,
    pub finalized: Vec<Annotation>,
    pub in_progress: InProgress,
}

impl RenderRequest {
    pub fn new(width: u32, height: u32) -> SegmaskResult<Self> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            finalized: Vec::new(),
            in_progress: InProgress::default(),
        })
    }

    pub fn from_loaded(width: u32, height: u32, loaded: LoadedAnnotations) -> SegmaskResult<Self> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            finalized: loaded.finalized,
            in_progress: loaded.in_progress,
        })
    }

    pub fn with_finalized(mut self, finalized: Vec<Annotation>) -> Self {
        self.finalized = finalized;
        self
    }

    pub fn with_in_progress(mut self, in_progress: InProgress) -> Self {
        self.in_progress = in_progress;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which annotation a [`DrawOp`] was compiled from.
pub enum OpSource {
    Finalized(usize),
    InProgress(AnnotationKind),
}

#[derive(Clone, Debug, PartialEq)]
/// Shape rasterized by a [`DrawOp`].
pub enum Geometry {
    /// Point-set rule: pixel, line or filled polygon depending on the point count.
    PointSet(Vec<Point>),
    /// Closed, filled polygon.
    Polygon(Vec<Point>),
    /// Vertex markers plus open edges.
    PolygonOutline {
        points: Vec<Point>,
        marker_size_px: f64,
    },
}

impl Geometry {
    /// Bounding box of everything the geometry can cover, or `None` when it has no
    /// finite points.
    pub fn bounds(&self) -> Option<Rect> {
        let (points, pad) = match self {
            Geometry::PointSet(points) | Geometry::Polygon(points) => (points, 0.0),
            Geometry::PolygonOutline {
                points,
                marker_size_px,
            } => (points, marker_size_px / 2.0),
        };
        let mut finite = points
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite());
        let first = finite.next()?;
        let rect = finite.fold(Rect::from_points(first, first), |r, p| r.union_pt(p));
        Some(rect.inflate(pad, pad))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawOp {
    pub source: OpSource,
    pub geometry: Geometry,
    pub paint: Paint,
    pub blend: BlendMode,
}

#[derive(Clone, Debug, PartialEq)]
/// Ordered draw operations for one mask.
pub struct MaskPlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Finalized,
    InProgress,
}

/// Compile `request` into draw operations.
///
/// Fails when a drawn annotation names a class outside `colors`' vocabulary.
pub fn compile_mask(
    request: &RenderRequest,
    colors: &ColorAssigner,
    settings: &RenderSettings,
) -> SegmaskResult<MaskPlan> {
    settings.validate()?;

    let mut ops = Vec::new();
    for (idx, annotation) in request.finalized.iter().enumerate() {
        compile_annotation(
            annotation,
            Stage::Finalized,
            OpSource::Finalized(idx),
            colors,
            settings,
            &mut ops,
        )?;
    }
    for annotation in request.in_progress.drawable() {
        let source = OpSource::InProgress(annotation.kind());
        compile_annotation(
            &annotation,
            Stage::InProgress,
            source,
            colors,
            settings,
            &mut ops,
        )?;
    }

    Ok(MaskPlan {
        canvas: request.canvas,
        ops,
    })
}

fn compile_annotation(
    annotation: &Annotation,
    stage: Stage,
    source: OpSource,
    colors: &ColorAssigner,
    settings: &RenderSettings,
    ops: &mut Vec<DrawOp>,
) -> SegmaskResult<()> {
    match annotation {
        Annotation::Box(b) => {
            if let Some(corners) = b.outline() {
                ops.push(DrawOp {
                    source,
                    geometry: Geometry::Polygon(corners.to_vec()),
                    paint: Paint::opaque(colors.color_for(&b.class)?),
                    blend: BlendMode::Overwrite,
                });
            }
        }
        Annotation::Polygon(shape) | Annotation::Outline(shape) => {
            if shape.is_empty() {
                return Ok(());
            }
            let rgb = colors.color_for(&shape.class)?;
            let op = match stage {
                Stage::Finalized => DrawOp {
                    source,
                    geometry: Geometry::Polygon(shape.points.clone()),
                    paint: Paint::with_opacity(rgb, settings.fill_alpha),
                    blend: BlendMode::ToggleAlpha,
                },
                Stage::InProgress => DrawOp {
                    source,
                    geometry: Geometry::PolygonOutline {
                        points: shape.points.clone(),
                        marker_size_px: settings.marker_size_px,
                    },
                    paint: Paint::opaque(rgb),
                    blend: BlendMode::Overwrite,
                },
            };
            ops.push(op);
        }
        Annotation::Object(object) => {
            compile_object(object, stage, source, colors, settings, ops)?;
        }
    }
    Ok(())
}

fn compile_object(
    object: &ObjectAnnotation,
    stage: Stage,
    source: OpSource,
    colors: &ColorAssigner,
    settings: &RenderSettings,
    ops: &mut Vec<DrawOp>,
) -> SegmaskResult<()> {
    let mut class_rgb: Option<Rgb8> = None;
    for stroke in object.strokes.iter().filter(|s| !s.points.is_empty()) {
        let (paint, blend) = match stroke.kind {
            StrokeKind::Negative => (Paint::opaque(Rgb8::BLACK), BlendMode::ClearUnder),
            StrokeKind::Positive => {
                let rgb = match class_rgb {
                    Some(rgb) => rgb,
                    None => {
                        let rgb = colors.color_for(&object.class)?;
                        class_rgb = Some(rgb);
                        rgb
                    }
                };
                match stage {
                    Stage::Finalized => (
                        Paint::with_opacity(rgb, settings.fill_alpha),
                        BlendMode::ToggleAlpha,
                    ),
                    Stage::InProgress => (Paint::opaque(rgb), BlendMode::Overwrite),
                }
            }
        };
        ops.push(DrawOp {
            source,
            geometry: Geometry::PointSet(stroke.points.clone()),
            paint,
            blend,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
