//! Load/render/submit lifecycle around the compositor.
//!
//! Two callers share the same core: the mask printer turns one [`HitPayload`] into a
//! [`MaskSubmission`], and the reviewer walks a queue of [`ReviewRecord`]s through a
//! [`ReviewTransport`]. Neither keeps annotation state past the current image.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    annotation::payload::{LoadIssue, LoadedAnnotations, load_annotations},
    color::assigner::{ColorAssigner, DEFAULT_CLASS_LIST},
    encode::png::png_data_url,
    foundation::error::{SegmaskError, SegmaskResult},
    render::compositor::{MaskCompositor, MaskSurface},
    render::plan::RenderRequest,
    render::settings::RenderSettings,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One image's worth of annotation data pushed to the mask printer.
pub struct HitPayload {
    pub assignment_id: String,
    #[serde(default, deserialize_with = "de_opt_lenient_u64")]
    pub offset_index: Option<u64>,
    #[serde(deserialize_with = "de_lenient_u32")]
    pub img_width: u32,
    #[serde(deserialize_with = "de_lenient_u32")]
    pub img_height: u32,
    #[serde(default = "default_class_list")]
    pub classes: String,
    #[serde(default, alias = "annotation_in_progress")]
    pub ann_in_progress: Option<String>,
    #[serde(default, alias = "annotation_final")]
    pub ann_final: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Rendered class mask handed back for upload.
pub struct MaskSubmission {
    /// PNG data URL of the mask.
    pub class_mask: String,
    pub offset_index: Option<u64>,
    pub assignment_id: String,
}

#[derive(Clone, Debug)]
pub struct HitOutcome {
    pub surface: MaskSurface,
    pub submission: MaskSubmission,
    pub issues: Vec<LoadIssue>,
}

/// Render the mask for one HIT payload.
///
/// Payload fields that fail to parse are reported in [`HitOutcome::issues`] and
/// rendered as empty.
#[tracing::instrument(skip(payload, settings), fields(assignment_id = %payload.assignment_id))]
pub fn process_hit(payload: &HitPayload, settings: &RenderSettings) -> SegmaskResult<HitOutcome> {
    let colors = ColorAssigner::from_class_list(&payload.classes);
    let loaded = load_annotations(
        payload.ann_in_progress.as_deref(),
        payload.ann_final.as_deref(),
    );
    let issues = loaded.issues.clone();
    let request = RenderRequest::from_loaded(payload.img_width, payload.img_height, loaded)?;
    let surface = MaskCompositor::new(&colors)
        .with_settings(*settings)
        .render(&request)?;
    let submission = MaskSubmission {
        class_mask: png_data_url(&surface)?,
        offset_index: payload.offset_index,
        assignment_id: payload.assignment_id.clone(),
    };
    Ok(HitOutcome {
        surface,
        submission,
        issues,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Which review queue to pull the next record from.
pub enum ReviewQueue {
    /// Submitted production/sandbox results.
    Results,
    /// Qualification task submissions.
    Qualifiers,
}

impl ReviewQueue {
    pub fn endpoint(self) -> &'static str {
        match self {
            ReviewQueue::Results => "/call_get_next_result_to_review",
            ReviewQueue::Qualifiers => "/call_get_next_qualifier_result_to_review",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// One-way reviewer decision about the current record.
pub enum ReviewCommand {
    Approve,
    RejectTooInaccurate,
    RejectTooFew,
    MarkGood,
    MarkBad,
}

impl ReviewCommand {
    pub fn endpoint(self) -> &'static str {
        match self {
            ReviewCommand::Approve => "/call_approve_current_record",
            ReviewCommand::RejectTooInaccurate => "/call_reject_current_record_too_inaccurate",
            ReviewCommand::RejectTooFew => "/call_reject_current_record_too_few",
            ReviewCommand::MarkGood => "/call_mark_current_qual_record_as_good",
            ReviewCommand::MarkBad => "/call_mark_current_qual_record_as_bad",
        }
    }

    /// Qualification feedback is keyed by assignment as well as HIT.
    pub fn needs_assignment(self) -> bool {
        matches!(self, ReviewCommand::MarkGood | ReviewCommand::MarkBad)
    }

    /// Queue the reviewer continues with after sending this command.
    pub fn next_queue(self) -> ReviewQueue {
        match self {
            ReviewCommand::Approve
            | ReviewCommand::RejectTooInaccurate
            | ReviewCommand::RejectTooFew => ReviewQueue::Results,
            ReviewCommand::MarkGood | ReviewCommand::MarkBad => ReviewQueue::Qualifiers,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A reviewable record as returned by the review backend.
pub struct ReviewRecord {
    pub hit_id: String,
    #[serde(default)]
    pub assignment_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_class_list")]
    pub classes: String,
    #[serde(default)]
    pub annotation_mode: Option<String>,
    #[serde(default)]
    pub exp_group: Option<String>,
    #[serde(default)]
    pub auto_approve_time: Option<String>,
    #[serde(default)]
    pub annotation_in_progress: Option<String>,
    #[serde(default)]
    pub annotation_final: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Identifiers a review command is sent for.
pub struct HitTarget {
    pub hit_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
}

/// Connection to the review backend.
pub trait ReviewTransport {
    /// Next record waiting in `queue`, or `None` when the queue is drained.
    fn fetch_next(&mut self, queue: ReviewQueue) -> SegmaskResult<Option<ReviewRecord>>;

    fn send(&mut self, command: ReviewCommand, target: &HitTarget) -> SegmaskResult<()>;
}

struct LoadedReview {
    record: ReviewRecord,
    colors: ColorAssigner,
    annotations: LoadedAnnotations,
}

/// Reviewer state machine: at most one record is loaded at a time.
pub struct ReviewSession<T> {
    transport: T,
    settings: RenderSettings,
    current: Option<LoadedReview>,
}

impl<T: ReviewTransport> ReviewSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            settings: RenderSettings::default(),
            current: None,
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn current(&self) -> Option<&ReviewRecord> {
        self.current.as_ref().map(|c| &c.record)
    }

    /// Load problems for the current record.
    pub fn issues(&self) -> &[LoadIssue] {
        self.current
            .as_ref()
            .map(|c| c.annotations.issues.as_slice())
            .unwrap_or(&[])
    }

    /// Discard the current record and load the next one from `queue`.
    #[tracing::instrument(skip(self))]
    pub fn load_next(&mut self, queue: ReviewQueue) -> SegmaskResult<Option<&ReviewRecord>> {
        self.current = None;
        let Some(record) = self.transport.fetch_next(queue)? else {
            tracing::debug!("review queue is empty");
            return Ok(None);
        };
        let colors = ColorAssigner::from_class_list(&record.classes);
        let annotations = load_annotations(
            record.annotation_in_progress.as_deref(),
            record.annotation_final.as_deref(),
        );
        self.current = Some(LoadedReview {
            record,
            colors,
            annotations,
        });
        Ok(self.current())
    }

    /// Render the current record's mask at the displayed image's size.
    pub fn render_current(&self, width: u32, height: u32) -> SegmaskResult<MaskSurface> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| SegmaskError::validation("no review record is loaded"))?;
        let request = RenderRequest::from_loaded(width, height, current.annotations.clone())?;
        MaskCompositor::new(&current.colors)
            .with_settings(self.settings)
            .render(&request)
    }

    /// Send `command` for the current record.
    ///
    /// Approvals and rejections release the current record.
    #[tracing::instrument(skip(self))]
    pub fn dispatch(&mut self, command: ReviewCommand) -> SegmaskResult<()> {
        let record = self.current().ok_or_else(|| {
            SegmaskError::validation(format!("{command:?} needs a current HIT id"))
        })?;
        if command.needs_assignment() && record.assignment_id.is_none() {
            return Err(SegmaskError::validation(format!(
                "{command:?} needs the current assignment id"
            )));
        }
        let target = HitTarget {
            hit_id: record.hit_id.clone(),
            assignment_id: command
                .needs_assignment()
                .then(|| record.assignment_id.clone())
                .flatten(),
        };
        self.transport.send(command, &target)?;
        if !command.needs_assignment() {
            self.current = None;
        }
        Ok(())
    }

    /// Send `command`, then continue with the next record of its queue.
    pub fn review(&mut self, command: ReviewCommand) -> SegmaskResult<Option<&ReviewRecord>> {
        self.dispatch(command)?;
        self.load_next(command.next_queue())
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

fn default_class_list() -> String {
    DEFAULT_CLASS_LIST.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(u64),
    Text(String),
}

impl Lenient {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Lenient::Number(n) => Ok(n),
            Lenient::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("expected an unsigned integer, got '{s}'"))),
        }
    }
}

fn de_lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Lenient::deserialize(d)?.into_u64::<D::Error>()?;
    u32::try_from(v).map_err(|_| serde::de::Error::custom(format!("{v} does not fit in u32")))
}

fn de_opt_lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<Lenient>::deserialize(d)?
        .map(Lenient::into_u64)
        .transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/review/session.rs"]
mod tests;
