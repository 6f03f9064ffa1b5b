//! Loosely-typed annotation payloads and their classification into [`Annotation`]s.
//!
//! Payloads arrive as JSON-like strings that may use single quotes in place of double
//! quotes. Each field (in-progress, finalized) is parsed independently: a field that
//! fails to parse is reported as a [`LoadIssue`] and treated as empty, and a record
//! that matches no known shape is dropped with a diagnostic.

use serde::Deserialize;
use serde_json::Value;

use crate::annotation::model::{
    Annotation, BoxAnnotation, InProgress, ObjectAnnotation, ShapeAnnotation, Stroke, StrokeKind,
};
use crate::foundation::core::Point;
use crate::foundation::error::{SegmaskError, SegmaskResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Which payload field a record came from.
pub enum PayloadField {
    InProgress,
    Finalized,
}

impl std::fmt::Display for PayloadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadField::InProgress => f.write_str("in-progress"),
            PayloadField::Finalized => f.write_str("finalized"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A recoverable problem found while loading one payload field.
pub struct LoadIssue {
    pub field: PayloadField,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Result of loading both payload fields for one image.
pub struct LoadedAnnotations {
    pub finalized: Vec<Annotation>,
    pub in_progress: InProgress,
    pub issues: Vec<LoadIssue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRecord {
    Pair([f64; 2]),
    Xy { x: f64, y: f64 },
}

impl From<PointRecord> for Point {
    fn from(p: PointRecord) -> Self {
        match p {
            PointRecord::Pair([x, y]) => Point::new(x, y),
            PointRecord::Xy { x, y } => Point::new(x, y),
        }
    }
}

#[derive(Deserialize)]
struct ShapeRecord {
    #[serde(default)]
    class: String,
    #[serde(default)]
    data: Option<Vec<PointRecord>>,
}

#[derive(Deserialize)]
struct StrokeRecord {
    #[serde(rename = "type")]
    kind: StrokeKind,
    #[serde(default)]
    points: Option<Vec<PointRecord>>,
}

#[derive(Deserialize)]
struct ObjectRecord {
    #[serde(default)]
    class: String,
    #[serde(default)]
    strokes: Option<Vec<StrokeRecord>>,
}

fn points(raw: Option<Vec<PointRecord>>) -> Vec<Point> {
    raw.unwrap_or_default().into_iter().map(Point::from).collect()
}

/// Replace every single quote with a double quote.
pub fn normalize_quotes(raw: &str) -> String {
    raw.replace('\'', "\"")
}

/// Parse one payload field into its record list.
///
/// An absent field or a literal `null` yields no records.
pub fn parse_records(raw: Option<&str>) -> SegmaskResult<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let normalized = normalize_quotes(raw);
    let value: Value =
        serde_json::from_str(&normalized).map_err(|e| SegmaskError::serde(e.to_string()))?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        other => Err(SegmaskError::serde(format!(
            "expected a list of annotation records, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Classify a single record.
///
/// Returns `Ok(None)` for `link` and `paint` records, which are recognised but have
/// no mask rendering.
pub fn classify_record(record: &Value, field: PayloadField) -> SegmaskResult<Option<Annotation>> {
    let obj = record.as_object().ok_or_else(|| {
        SegmaskError::classification(format!(
            "annotation record must be an object, got {}",
            json_type_name(record)
        ))
    })?;

    if let Some(mode) = obj.get("mode") {
        let mode = mode
            .as_str()
            .ok_or_else(|| SegmaskError::classification("annotation mode must be a string"))?;
        return match mode {
            "bbox" => {
                let r = parse_shape(record)?;
                Ok(Some(Annotation::Box(BoxAnnotation {
                    class: r.class,
                    points: points(r.data),
                })))
            }
            "polygon" => {
                let r = parse_shape(record)?;
                Ok(Some(Annotation::Polygon(ShapeAnnotation::new(
                    r.class,
                    points(r.data),
                ))))
            }
            "outline" => {
                let r = parse_shape(record)?;
                Ok(Some(Annotation::Outline(ShapeAnnotation::new(
                    r.class,
                    points(r.data),
                ))))
            }
            "link" | "paint" => Ok(None),
            other => Err(SegmaskError::classification(format!(
                "unrecognized annotation mode '{other}'"
            ))),
        };
    }

    let is_object = obj.contains_key("strokes")
        && (obj.contains_key("modes") || field == PayloadField::Finalized);
    if !is_object {
        return Err(SegmaskError::classification(
            "unrecognized annotation type: expected 'mode' or 'modes' with 'strokes'",
        ));
    }

    let r: ObjectRecord = serde_json::from_value(record.clone())
        .map_err(|e| SegmaskError::classification(format!("malformed object record: {e}")))?;
    require_class(&r.class)?;
    let strokes = r
        .strokes
        .unwrap_or_default()
        .into_iter()
        .map(|s| Stroke {
            kind: s.kind,
            points: points(s.points),
        })
        .collect();
    Ok(Some(Annotation::Object(ObjectAnnotation::new(r.class, strokes))))
}

fn parse_shape(record: &Value) -> SegmaskResult<ShapeRecord> {
    let r: ShapeRecord = serde_json::from_value(record.clone())
        .map_err(|e| SegmaskError::classification(format!("malformed shape record: {e}")))?;
    require_class(&r.class)?;
    Ok(r)
}

fn require_class(class: &str) -> SegmaskResult<()> {
    if class.trim().is_empty() {
        return Err(SegmaskError::classification("annotation record has no class"));
    }
    Ok(())
}

/// Load both payload fields for one image.
///
/// In-progress records fill their slot (a later record of the same kind replaces an
/// earlier one); finalized records keep their order. Problems are collected in
/// [`LoadedAnnotations::issues`] rather than returned.
#[tracing::instrument(skip_all)]
pub fn load_annotations(in_progress: Option<&str>, finalized: Option<&str>) -> LoadedAnnotations {
    let mut out = LoadedAnnotations::default();

    for annotation in load_field(in_progress, PayloadField::InProgress, &mut out.issues) {
        tracing::debug!(kind = ?annotation.kind(), class = annotation.class(), "in-progress slot");
        out.in_progress.set(annotation);
    }
    out.finalized = load_field(finalized, PayloadField::Finalized, &mut out.issues);

    tracing::debug!(
        finalized = out.finalized.len(),
        issues = out.issues.len(),
        "loaded annotations"
    );
    out
}

fn load_field(
    raw: Option<&str>,
    field: PayloadField,
    issues: &mut Vec<LoadIssue>,
) -> Vec<Annotation> {
    let records = match parse_records(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(%field, error = %e, "failed to parse annotation payload");
            issues.push(LoadIssue {
                field,
                message: e.to_string(),
            });
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match classify_record(record, field) {
            Ok(Some(annotation)) => out.push(annotation),
            Ok(None) => tracing::debug!(%field, idx, "skipping record without mask rendering"),
            Err(e) => {
                tracing::warn!(%field, idx, error = %e, "dropping annotation record");
                issues.push(LoadIssue {
                    field,
                    message: format!("record {idx}: {e}"),
                });
            }
        }
    }
    out
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/payload.rs"]
mod tests;
