use docsync_core::{
    Annotation, DocumentSnapshot, EditEvent, LiveDocument, Marker, MarkerAnnotation, MarkerId,
    MarkerKind, OnTextChange, OutboundContent, Position, Range, Severity, SyncConfig, SyncSession,
    apply,
};
use pretty_assertions::assert_eq;

fn adjust_marker(id: &str, range: Range) -> Marker {
    Marker::new(id, range, "hl", MarkerKind::Range, false, OnTextChange::Adjust)
}

#[test]
fn test_live_document_fed_by_session() {
    let mut session = SyncSession::new("first\nsecond");
    let marker_id = session.add_generated_marker(
        Range::new(1, 0, 1, 6),
        "hl",
        MarkerKind::Range,
        false,
        OnTextChange::Adjust,
    );
    session.add_marker_annotation(MarkerAnnotation::new(
        marker_id.clone(),
        Annotation::new(Severity::Warning, "second row"),
    ));

    let mut live = LiveDocument::with_config(session.config());
    match session.outbound().content {
        OutboundContent::Document(doc) => assert!(live.set_document(doc)),
        other => panic!("expected a full document, got {other:?}"),
    }

    // Typing a new first row pushes the marker and its annotation down.
    let change = live.apply_edit(
        &EditEvent::insertion(Position::new(0, 0), "zeroth\n"),
        "zeroth\nfirst\nsecond",
    );
    assert_eq!(change.moved, vec![marker_id.clone()]);

    let rendered = live.rendered_annotations();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].row, 2);
    assert_eq!(rendered[0].marker_id.as_ref(), Some(&marker_id));
}

#[test]
fn test_pushed_document_does_not_adjust_markers() {
    let mut live = LiveDocument::new();
    live.set_document(
        DocumentSnapshot::from_text("abc").with_additional_marker(adjust_marker(
            "a",
            Range::new(0, 1, 0, 2),
        )),
    );

    let next = DocumentSnapshot::from_text("xxabc").with_additional_marker(adjust_marker(
        "a",
        Range::new(0, 3, 0, 4),
    ));
    assert!(live.set_document(next.clone()));
    assert_eq!(live.document(), &next);
}

#[test]
fn test_diff_from_surface_edits_matches_surface_text() {
    let mut live = LiveDocument::new();
    live.set_document(DocumentSnapshot::from_text("one two"));
    let shared = live.document().clone();

    live.apply_edit(&EditEvent::insertion(Position::new(0, 3), ","), "one, two");
    live.apply_edit(
        &EditEvent::removal(Position::new(0, 5), Position::new(0, 8)),
        "one, ",
    );

    let script = docsync_core::diff(&shared, live.document());
    assert_eq!(apply(&script, &shared).unwrap().text(), "one, ");
}

#[test]
fn test_text_adjust_drops_collapsed_markers() {
    let mut live = LiveDocument::with_config(&SyncConfig::default());
    live.set_document(
        DocumentSnapshot::from_text("keep REMOVE keep")
            .with_additional_marker(adjust_marker("gone", Range::new(0, 5, 0, 11)))
            .with_additional_marker(adjust_marker("tail", Range::new(0, 12, 0, 16))),
    );

    let change = live.set_text_and_adjust("keep  keep");
    assert_eq!(change.removed, vec![MarkerId::from("gone")]);
    assert_eq!(change.moved, vec![MarkerId::from("tail")]);
    assert_eq!(
        live.markers().get(&MarkerId::from("tail")).map(|m| m.range),
        Some(Range::new(0, 6, 0, 10))
    );
}
