use super::*;
use crate::annotation::model::AnnotationKind;

#[test]
fn normalize_quotes_swaps_single_for_double() {
    assert_eq!(
        normalize_quotes("[{'mode': 'bbox'}]"),
        r#"[{"mode": "bbox"}]"#
    );
}

#[test]
fn absent_and_null_fields_have_no_records() {
    assert!(parse_records(None).unwrap().is_empty());
    assert!(parse_records(Some("null")).unwrap().is_empty());
}

#[test]
fn non_list_payload_is_serde_error() {
    let err = parse_records(Some("{'mode': 'bbox'}")).unwrap_err();
    assert!(matches!(err, SegmaskError::Serde(_)));
}

#[test]
fn classify_shape_modes() {
    let bbox = serde_json::json!({"mode": "bbox", "class": "cat", "data": [[0, 0], [4, 4]]});
    let a = classify_record(&bbox, PayloadField::InProgress)
        .unwrap()
        .unwrap();
    assert_eq!(a.kind(), AnnotationKind::Box);
    assert_eq!(a.class(), "cat");

    let polygon = serde_json::json!({"mode": "polygon", "class": "dog", "data": [{"x": 1, "y": 2}]});
    let a = classify_record(&polygon, PayloadField::InProgress)
        .unwrap()
        .unwrap();
    let Annotation::Polygon(p) = a else {
        panic!("expected polygon");
    };
    assert_eq!(p.points, vec![Point::new(1.0, 2.0)]);

    let outline = serde_json::json!({"mode": "outline", "class": "dog", "data": []});
    let a = classify_record(&outline, PayloadField::InProgress)
        .unwrap()
        .unwrap();
    assert_eq!(a.kind(), AnnotationKind::Outline);
    assert!(a.is_empty());
}

#[test]
fn link_and_paint_are_recognised_but_not_rendered() {
    for mode in ["link", "paint"] {
        let r = serde_json::json!({"mode": mode, "data": []});
        assert!(
            classify_record(&r, PayloadField::InProgress)
                .unwrap()
                .is_none()
        );
    }
}

#[test]
fn unknown_mode_is_classification_error() {
    let r = serde_json::json!({"mode": "ellipse", "data": []});
    let err = classify_record(&r, PayloadField::InProgress).unwrap_err();
    assert!(err.to_string().contains("ellipse"));
}

#[test]
fn in_progress_object_requires_modes() {
    let without_modes = serde_json::json!({"class": "cat", "strokes": []});
    assert!(classify_record(&without_modes, PayloadField::InProgress).is_err());

    let with_modes = serde_json::json!({"class": "cat", "modes": ["paint"], "strokes": []});
    let a = classify_record(&with_modes, PayloadField::InProgress)
        .unwrap()
        .unwrap();
    assert_eq!(a.kind(), AnnotationKind::Object);
}

#[test]
fn finalized_object_needs_only_strokes() {
    let r = serde_json::json!({
        "class": "cat",
        "strokes": [
            {"type": "positive", "points": [[0, 0], [3, 0], [3, 3]]},
            {"type": "negative", "points": [[1, 1]]}
        ]
    });
    let Some(Annotation::Object(o)) = classify_record(&r, PayloadField::Finalized).unwrap() else {
        panic!("expected object");
    };
    assert_eq!(o.strokes.len(), 2);
    assert_eq!(o.strokes[0].kind, StrokeKind::Positive);
    assert_eq!(o.strokes[1].kind, StrokeKind::Negative);
    assert_eq!(o.strokes[1].points, vec![Point::new(1.0, 1.0)]);
}

#[test]
fn unknown_stroke_type_is_classification_error() {
    let r = serde_json::json!({"class": "cat", "strokes": [{"type": "sideways", "points": []}]});
    let err = classify_record(&r, PayloadField::Finalized).unwrap_err();
    assert!(matches!(err, SegmaskError::Classification(_)));
}

#[test]
fn non_object_record_is_rejected() {
    let r = serde_json::json!([1, 2]);
    assert!(classify_record(&r, PayloadField::Finalized).is_err());
}

#[test]
fn load_routes_slots_and_keeps_final_order() {
    let in_progress = "[{'mode': 'polygon', 'class': 'cat', 'data': [[0, 0]]}, \
                       {'mode': 'bbox', 'class': 'dog', 'data': []}, \
                       {'mode': 'polygon', 'class': 'dog', 'data': [[5, 5]]}]";
    let finalized = "[{'class': 'dog', 'strokes': []}, {'class': 'cat', 'strokes': []}]";

    let loaded = load_annotations(Some(in_progress), Some(finalized));
    assert!(loaded.issues.is_empty());
    assert_eq!(loaded.in_progress.polygon.as_ref().unwrap().class, "dog");
    assert!(loaded.in_progress.bbox.as_ref().unwrap().is_empty());
    let classes: Vec<_> = loaded.finalized.iter().map(Annotation::class).collect();
    assert_eq!(classes, vec!["dog", "cat"]);
}

#[test]
fn broken_field_is_reported_and_other_field_survives() {
    let finalized = "[{'class': 'cat', 'strokes': []}]";
    let loaded = load_annotations(Some("[{'mode': "), Some(finalized));
    assert_eq!(loaded.issues.len(), 1);
    assert_eq!(loaded.issues[0].field, PayloadField::InProgress);
    assert!(loaded.in_progress.is_empty());
    assert_eq!(loaded.finalized.len(), 1);
}

#[test]
fn unrecognised_record_is_dropped_with_issue() {
    let in_progress = "[{'shape': 'blob'}, {'mode': 'outline', 'class': 'cat', 'data': [[1, 1]]}]";
    let loaded = load_annotations(Some(in_progress), None);
    assert_eq!(loaded.issues.len(), 1);
    assert!(loaded.issues[0].message.starts_with("record 0:"));
    assert!(loaded.in_progress.outline.is_some());
}

#[test]
fn record_without_class_is_rejected() {
    for r in [
        serde_json::json!({"mode": "bbox", "data": [[0, 0], [3, 3]]}),
        serde_json::json!({"mode": "polygon", "class": " ", "data": [[0, 0]]}),
        serde_json::json!({"strokes": [{"type": "positive", "points": [[1, 1]]}]}),
    ] {
        let err = classify_record(&r, PayloadField::Finalized).unwrap_err();
        assert!(matches!(err, SegmaskError::Classification(_)), "{r}");
    }
}

#[test]
fn classless_record_is_dropped_and_the_rest_loads() {
    let loaded = load_annotations(
        Some("[{'mode':'bbox','data':[[0,0],[3,3]]}]"),
        Some("[{'class':'cat','strokes':[]}]"),
    );
    assert_eq!(loaded.issues.len(), 1);
    assert_eq!(loaded.issues[0].field, PayloadField::InProgress);
    assert!(loaded.issues[0].message.contains("no class"));
    assert!(loaded.in_progress.bbox.is_none());
    assert_eq!(loaded.finalized.len(), 1);
}
