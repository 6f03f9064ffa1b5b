use crate::foundation::core::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Whether a stroke adds class pixels or erases everything beneath it.
pub enum StrokeKind {
    Positive,
    Negative,
}

#[derive(Clone, Debug, PartialEq)]
/// One contiguous gesture inside a [`ObjectAnnotation`].
pub struct Stroke {
    pub kind: StrokeKind,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn positive(points: Vec<Point>) -> Self {
        Self {
            kind: StrokeKind::Positive,
            points,
        }
    }

    pub fn negative(points: Vec<Point>) -> Self {
        Self {
            kind: StrokeKind::Negative,
            points,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Axis-aligned box given by two opposite corners.
///
/// Only the two-corner form renders; any other point count is kept as authored and
/// treated as empty at render time.
pub struct BoxAnnotation {
    pub class: String,
    pub points: Vec<Point>,
}

impl BoxAnnotation {
    pub fn from_corners(class: impl Into<String>, a: Point, b: Point) -> Self {
        Self {
            class: class.into(),
            points: vec![a, b],
        }
    }

    pub fn corners(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Four rectangle corners in drawing order, starting at the first corner.
    pub fn outline(&self) -> Option<[Point; 4]> {
        let (a, b) = self.corners()?;
        Some([a, Point::new(b.x, a.y), b, Point::new(a.x, b.y)])
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Vertex list shared by polygon and outline annotations.
pub struct ShapeAnnotation {
    pub class: String,
    pub points: Vec<Point>,
}

impl ShapeAnnotation {
    pub fn new(class: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            class: class.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Compound annotation assembled from ordered positive and negative strokes.
pub struct ObjectAnnotation {
    pub class: String,
    pub strokes: Vec<Stroke>,
}

impl ObjectAnnotation {
    pub fn new(class: impl Into<String>, strokes: Vec<Stroke>) -> Self {
        Self {
            class: class.into(),
            strokes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A classified annotation.
pub enum Annotation {
    Box(BoxAnnotation),
    Polygon(ShapeAnnotation),
    /// Same geometry as [`Annotation::Polygon`]; authored in a separate editor mode.
    Outline(ShapeAnnotation),
    Object(ObjectAnnotation),
}

impl Annotation {
    pub fn class(&self) -> &str {
        match self {
            Annotation::Box(a) => &a.class,
            Annotation::Polygon(a) | Annotation::Outline(a) => &a.class,
            Annotation::Object(a) => &a.class,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Box(_) => AnnotationKind::Box,
            Annotation::Polygon(_) => AnnotationKind::Polygon,
            Annotation::Outline(_) => AnnotationKind::Outline,
            Annotation::Object(_) => AnnotationKind::Object,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Annotation::Box(a) => a.is_empty(),
            Annotation::Polygon(a) | Annotation::Outline(a) => a.is_empty(),
            Annotation::Object(a) => a.is_empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Variant tag of an [`Annotation`], also naming the in-progress slots.
pub enum AnnotationKind {
    Box,
    Polygon,
    Outline,
    Object,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// The annotations still being authored, one optional slot per shape kind.
pub struct InProgress {
    pub bbox: Option<BoxAnnotation>,
    pub polygon: Option<ShapeAnnotation>,
    pub outline: Option<ShapeAnnotation>,
    pub object: Option<ObjectAnnotation>,
}

impl InProgress {
    /// Store `annotation` in its slot, replacing whatever the slot held.
    pub fn set(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Box(a) => self.bbox = Some(a),
            Annotation::Polygon(a) => self.polygon = Some(a),
            Annotation::Outline(a) => self.outline = Some(a),
            Annotation::Object(a) => self.object = Some(a),
        }
    }

    /// Non-empty slots in fixed paint order: box, polygon, outline, object.
    pub fn drawable(&self) -> Vec<Annotation> {
        let slots = [
            self.bbox.clone().map(Annotation::Box),
            self.polygon.clone().map(Annotation::Polygon),
            self.outline.clone().map(Annotation::Outline),
            self.object.clone().map(Annotation::Object),
        ];
        slots
            .into_iter()
            .flatten()
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.drawable().is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/model.rs"]
mod tests;
