use super::*;
use crate::render::blend::BACKGROUND;
use std::collections::VecDeque;

#[derive(Default)]
struct MockTransport {
    results: VecDeque<ReviewRecord>,
    qualifiers: VecDeque<ReviewRecord>,
    sent: Vec<(ReviewCommand, HitTarget)>,
    fetched: Vec<ReviewQueue>,
}

impl ReviewTransport for MockTransport {
    fn fetch_next(&mut self, queue: ReviewQueue) -> SegmaskResult<Option<ReviewRecord>> {
        self.fetched.push(queue);
        Ok(match queue {
            ReviewQueue::Results => self.results.pop_front(),
            ReviewQueue::Qualifiers => self.qualifiers.pop_front(),
        })
    }

    fn send(&mut self, command: ReviewCommand, target: &HitTarget) -> SegmaskResult<()> {
        self.sent.push((command, target.clone()));
        Ok(())
    }
}

fn record(hit: &str, assignment: Option<&str>) -> ReviewRecord {
    ReviewRecord {
        hit_id: hit.to_string(),
        assignment_id: assignment.map(str::to_string),
        classes: "cat-dog".to_string(),
        annotation_final: Some(
            "[{'mode':'bbox','class':'cat','data':[[0,0],[4,4]]}]".to_string(),
        ),
        ..ReviewRecord::default()
    }
}

#[test]
fn hit_payload_accepts_numeric_strings() {
    let payload: HitPayload = serde_json::from_str(
        r#"{"assignment_id":"A1","offset_index":"7","img_width":"10","img_height":4}"#,
    )
    .unwrap();
    assert_eq!(payload.img_width, 10);
    assert_eq!(payload.img_height, 4);
    assert_eq!(payload.offset_index, Some(7));
    assert_eq!(payload.classes, DEFAULT_CLASS_LIST);
    assert!(payload.ann_final.is_none());
}

#[test]
fn hit_payload_rejects_non_numeric_dimensions() {
    let err = serde_json::from_str::<HitPayload>(
        r#"{"assignment_id":"A1","img_width":"wide","img_height":4}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("wide"));
}

#[test]
fn process_hit_renders_submission() {
    let payload = HitPayload {
        assignment_id: "A1".to_string(),
        offset_index: Some(3),
        img_width: 10,
        img_height: 10,
        classes: "cat-dog".to_string(),
        ann_in_progress: None,
        ann_final: Some("[{'mode':'bbox','class':'dog','data':[[0,0],[10,10]]}]".to_string()),
    };
    let out = process_hit(&payload, &RenderSettings::default()).unwrap();
    assert!(out.issues.is_empty());
    assert_eq!(out.submission.assignment_id, "A1");
    assert_eq!(out.submission.offset_index, Some(3));
    assert!(out.submission.class_mask.starts_with("data:image/png;base64,"));
    assert_eq!(out.surface.count_matching([174, 255, 0, 255]), 100);
}

#[test]
fn process_hit_reports_bad_field_and_renders_the_rest() {
    let payload = HitPayload {
        assignment_id: "A1".to_string(),
        offset_index: None,
        img_width: 4,
        img_height: 4,
        classes: "cat-dog".to_string(),
        ann_in_progress: Some("not json".to_string()),
        ann_final: None,
    };
    let out = process_hit(&payload, &RenderSettings::default()).unwrap();
    assert_eq!(out.issues.len(), 1);
    assert!(out.surface.is_blank());
}

#[test]
fn submission_serializes_expected_keys() {
    let s = MaskSubmission {
        class_mask: "data:image/png;base64,AA==".to_string(),
        offset_index: Some(1),
        assignment_id: "A".to_string(),
    };
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["class_mask"], "data:image/png;base64,AA==");
    assert_eq!(v["offset_index"], 1);
    assert_eq!(v["assignment_id"], "A");
}

#[test]
fn endpoints_are_stable() {
    assert_eq!(ReviewCommand::Approve.endpoint(), "/call_approve_current_record");
    assert_eq!(
        ReviewCommand::RejectTooFew.endpoint(),
        "/call_reject_current_record_too_few"
    );
    assert_eq!(
        ReviewCommand::MarkBad.endpoint(),
        "/call_mark_current_qual_record_as_bad"
    );
    assert_eq!(
        ReviewQueue::Qualifiers.endpoint(),
        "/call_get_next_qualifier_result_to_review"
    );
}

#[test]
fn dispatch_without_record_is_rejected() {
    let mut session = ReviewSession::new(MockTransport::default());
    let err = session.dispatch(ReviewCommand::Approve).unwrap_err();
    assert!(matches!(err, SegmaskError::Validation(_)));
    assert!(session.into_transport().sent.is_empty());
}

#[test]
fn approve_sends_hit_and_advances() {
    let mut transport = MockTransport::default();
    transport.results.push_back(record("H1", Some("A1")));
    transport.results.push_back(record("H2", None));
    let mut session = ReviewSession::new(transport);

    assert_eq!(session.load_next(ReviewQueue::Results).unwrap().unwrap().hit_id, "H1");
    let next = session.review(ReviewCommand::Approve).unwrap().unwrap();
    assert_eq!(next.hit_id, "H2");

    let transport = session.into_transport();
    assert_eq!(transport.sent.len(), 1);
    let (cmd, target) = &transport.sent[0];
    assert_eq!(*cmd, ReviewCommand::Approve);
    assert_eq!(target.hit_id, "H1");
    assert_eq!(target.assignment_id, None);
}

#[test]
fn reject_releases_current_record() {
    let mut transport = MockTransport::default();
    transport.results.push_back(record("H1", None));
    let mut session = ReviewSession::new(transport);
    session.load_next(ReviewQueue::Results).unwrap();
    session.dispatch(ReviewCommand::RejectTooInaccurate).unwrap();
    assert!(session.current().is_none());
    assert!(session.dispatch(ReviewCommand::RejectTooFew).is_err());
}

#[test]
fn mark_requires_assignment() {
    let mut transport = MockTransport::default();
    transport.qualifiers.push_back(record("Q1", None));
    let mut session = ReviewSession::new(transport);
    session.load_next(ReviewQueue::Qualifiers).unwrap();
    let err = session.dispatch(ReviewCommand::MarkGood).unwrap_err();
    assert!(matches!(err, SegmaskError::Validation(_)));
    assert!(session.current().is_some());
}

#[test]
fn mark_good_sends_assignment_and_pulls_qualifier_queue() {
    let mut transport = MockTransport::default();
    transport.qualifiers.push_back(record("Q1", Some("A9")));
    let mut session = ReviewSession::new(transport);
    session.load_next(ReviewQueue::Qualifiers).unwrap();
    assert!(session.review(ReviewCommand::MarkGood).unwrap().is_none());

    let transport = session.into_transport();
    assert_eq!(transport.fetched, vec![ReviewQueue::Qualifiers, ReviewQueue::Qualifiers]);
    assert_eq!(transport.sent[0].1.assignment_id.as_deref(), Some("A9"));
}

#[test]
fn render_current_uses_record_vocabulary() {
    let mut transport = MockTransport::default();
    transport.results.push_back(record("H1", None));
    let mut session = ReviewSession::new(transport);
    assert!(session.render_current(8, 8).is_err());

    session.load_next(ReviewQueue::Results).unwrap();
    let surface = session.render_current(8, 8).unwrap();
    assert_eq!(surface.count_matching([255, 204, 0, 255]), 16);
    assert_eq!(surface.count_matching(BACKGROUND), 48);
}

#[test]
fn load_next_resets_state_on_empty_queue() {
    let mut transport = MockTransport::default();
    transport.results.push_back(record("H1", None));
    let mut session = ReviewSession::new(transport);
    session.load_next(ReviewQueue::Results).unwrap();
    assert!(session.load_next(ReviewQueue::Results).unwrap().is_none());
    assert!(session.current().is_none());
    assert!(session.issues().is_empty());
}

#[test]
fn process_hit_survives_record_without_class() {
    let payload = HitPayload {
        assignment_id: "A1".to_string(),
        offset_index: None,
        img_width: 6,
        img_height: 6,
        classes: "cat-dog".to_string(),
        ann_in_progress: Some("[{'mode':'bbox','data':[[0,0],[3,3]]}]".to_string()),
        ann_final: Some("[{'mode':'bbox','class':'cat','data':[[0,0],[2,2]]}]".to_string()),
    };
    let out = process_hit(&payload, &RenderSettings::default()).unwrap();
    assert_eq!(out.issues.len(), 1);
    assert_eq!(out.surface.count_matching([255, 204, 0, 255]), 4);
}
