//! Integration tests for the 3D path: import, transform requests and
//! `drawings3d` results flowing back into the matrix cache.

use geodraw_session_lib::fixtures;
use geodraw_session_lib::harness::TestHarness;
use geodraw_session_lib::render::RenderEvent;
use geodraw_session_lib::state::DrawingMode;
use serde_json::json;
use shared::{Topic, TransformCommand, TransformationMatrix};

fn with_cube() -> TestHarness {
    let mut h = TestHarness::new();
    h.session.select_mode(DrawingMode::ThreeD);
    h.session.import_object(fixtures::CUBE_OBJ).unwrap();
    h
}

// --- Import ---

#[test]
fn test_import_sends_untransformed_request() {
    let h = with_cube();
    let sent = h.transform_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["transformationType"], "none");
    assert_eq!(sent[0]["vertices"].as_array().unwrap().len(), 8);
    assert_eq!(sent[0]["edges"].as_array().unwrap().len(), 24);
    assert!(sent[0].get("matrix").is_none());
}

#[test]
fn test_vertices_sent_homogeneous() {
    let h = with_cube();
    let sent = h.transform_requests();
    assert_eq!(sent[0]["vertices"][0], json!([-0.5, -0.5, -0.5, 1.0]));
    assert_eq!(sent[0]["edges"][0], json!([0, 1]));
    assert_eq!(sent[0]["edges"][3], json!([3, 0]));
}

#[test]
fn test_transform_without_object() {
    let mut h = TestHarness::new();
    assert!(h.session.transform(TransformCommand::RotationX { angle: 5.0 }).is_err());
    assert_eq!(h.published_count(), 0);
    assert_eq!(h.last_notice(), Some("Сначала загрузите 3D объект!"));
}

// --- Matrix round trip ---

#[test]
fn test_result_sets_matrix_and_next_request_carries_it() {
    let mut h = with_cube();
    let applied = h.broadcast(
        Topic::Drawings3D,
        &fixtures::transform_result_json(&fixtures::translated(0.5)),
    );
    assert_eq!(applied, 1);
    assert_eq!(
        h.session.pipeline().matrix().current(),
        Some(fixtures::translated(0.5))
    );

    assert!(h.session.transform_key("ArrowUp").unwrap());
    let sent = h.transform_requests();
    let last = sent.last().unwrap();
    assert_eq!(last["transformationType"], "rotationX");
    assert_eq!(last["angle"], 5.0);
    assert_eq!(last["vertices"].as_array().unwrap().len(), 8);
    assert_eq!(last["edges"].as_array().unwrap().len(), 24);
    assert_eq!(last["matrix"][0][3], 0.5);
}

#[test]
fn test_latest_result_wins() {
    let mut h = with_cube();
    h.session.transform_key("KeyW").unwrap();
    h.session.transform_key("KeyD").unwrap();
    assert_eq!(h.session.pipeline().matrix().awaiting(), 3);

    for dx in [0.1, 0.2, 0.3] {
        h.broadcast(
            Topic::Drawings3D,
            &fixtures::transform_result_json(&fixtures::translated(dx)),
        );
    }
    assert_eq!(h.session.pipeline().matrix().awaiting(), 0);
    assert!(h.session.pipeline().matrix().is_confirmed());

    h.session.transform_key("+").unwrap();
    let last = *h.transform_requests().last().unwrap();
    assert_eq!(last["matrix"][0][3], 0.3);
    assert_eq!(last["transformationType"], "scaling");
}

#[test]
fn test_result_clears_before_drawing() {
    let mut h = with_cube();
    h.broadcast(
        Topic::Drawings3D,
        &fixtures::transform_result_json(&TransformationMatrix::identity()),
    );
    let events = h.sink().events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], RenderEvent::Clear);
    assert!(matches!(&events[1], RenderEvent::Pixels(px) if px.len() == 2));
}

#[test]
fn test_reimport_drops_matrix() {
    let mut h = with_cube();
    h.broadcast(
        Topic::Drawings3D,
        &fixtures::transform_result_json(&fixtures::translated(2.0)),
    );
    h.session.import_object(fixtures::PYRAMID_OBJ).unwrap();

    let last = *h.transform_requests().last().unwrap();
    assert_eq!(last["transformationType"], "none");
    assert!(last.get("matrix").is_none());
    assert_eq!(last["vertices"].as_array().unwrap().len(), 5);
    assert!(h.session.pipeline().matrix().current().is_none());
}

// --- Keyboard ---

#[test]
fn test_key_commands() {
    let mut h = with_cube();
    let cases = [
        ("ArrowDown", json!({"transformationType": "rotationX", "angle": -5.0})),
        ("ArrowLeft", json!({"transformationType": "rotationY", "angle": 5.0})),
        ("KeyS", json!({"transformationType": "translation", "x": 0.0, "y": -0.1, "z": 0.0})),
        ("KeyQ", json!({"transformationType": "translation", "x": 0.0, "y": 0.0, "z": 0.1})),
        ("KeyP", json!({"transformationType": "perspective", "d": 10.0})),
        ("KeyO", json!({"transformationType": "perspective", "d": -10.0})),
    ];
    for (key, expected) in cases {
        assert!(h.session.transform_key(key).unwrap(), "{key} not bound");
        let last = *h.transform_requests().last().unwrap();
        for (field, value) in expected.as_object().unwrap() {
            assert_eq!(&last[field], value, "{key}: field {field}");
        }
    }
}

#[test]
fn test_unbound_key_sends_nothing() {
    let mut h = with_cube();
    let before = h.published_count();
    assert!(!h.session.transform_key("KeyZ").unwrap());
    assert!(!h.session.transform_key("Enter").unwrap());
    assert_eq!(h.published_count(), before);
}

// --- Malformed results ---

#[test]
fn test_malformed_3d_result_ignored() {
    let mut h = with_cube();
    assert_eq!(h.broadcast(Topic::Drawings3D, r#"{"pixels": []}"#), 0);
    assert_eq!(h.broadcast(Topic::Drawings3D, "not json"), 0);
    assert_eq!(h.session.ignored_payloads(), 2);
    assert!(h.sink().events().is_empty());
    assert!(h.session.pipeline().matrix().current().is_none());
}
