use flow_marks::{
    Context, FlowEvent, SceneGraph, TrackingFlow,
    cgmath::Vector3,
    data_structures::{color::Color, template::Template},
    marks::UpdateMessage,
};
use futures::channel::mpsc;

use crate::common::test_utils::object;

mod common;

fn payload(json: &str) -> FlowEvent {
    FlowEvent::Message(json.as_bytes().to_vec())
}

fn position(flow: &TrackingFlow<SceneGraph>, id: &str) -> Vector3<f32> {
    let mark = flow.reconciler().mark(id).expect("mark exists");
    flow.scene().get(mark.visual).unwrap().local.position
}

#[test]
fn should_queue_updates_until_subscribed() {
    let mut flow = TrackingFlow::new(&Context::default(), SceneGraph::new());

    let _ = flow.handle(payload(r#"{"objects": [{"id": "1", "category": "person", "translation": [1, 0, 0]}]}"#));
    let _ = flow.handle(payload(r#"{"objects": [{"id": "1", "category": "person", "translation": [2, 0, 0]}]}"#));
    assert_eq!(flow.backlog(), 2);
    assert!(flow.reconciler().registry().is_empty());

    let _ = flow.handle(FlowEvent::Subscribe);

    assert_eq!(flow.backlog(), 0);
    assert_eq!(flow.stats().processed, 2);
    assert_eq!(position(&flow, "1"), Vector3::new(2.0, 0.0, 0.0));
}

#[test]
fn should_keep_going_after_a_bad_update() {
    let mut flow = TrackingFlow::new(&Context::default(), SceneGraph::new());
    let _ = flow.handle(FlowEvent::Subscribe);

    let _ = flow.handle(payload("{not json"));
    let _ = flow.handle(payload(r#"{"objects": [{"id": "1", "category": "person"}]}"#));
    let _ = flow.handle(payload(r#"{"objects": [{"id": "1", "category": "person", "translation": [3, 4]}]}"#));

    assert_eq!(flow.stats().failed, 2);
    assert_eq!(flow.stats().processed, 1);
    assert_eq!(position(&flow, "1"), Vector3::new(3.0, 4.0, 0.0));
}

#[test]
fn should_use_templates_loaded_while_tracking() {
    let mut flow = TrackingFlow::new(&Context::default(), SceneGraph::new());
    let _ = flow.handle(FlowEvent::Subscribe);

    let _ = flow.handle(FlowEvent::Update(UpdateMessage {
        objects: vec![object("1", "vehicle", &[0.0, 0.0, 0.0])],
    }));
    let _ = flow.handle(FlowEvent::AssetLoaded {
        name: "vehicle".into(),
        template: Template::default_box("vehicle", Color::rgb(9, 9, 9), 1.5),
    });
    let _ = flow.handle(FlowEvent::Update(UpdateMessage {
        objects: vec![
            object("1", "vehicle", &[1.0, 0.0, 0.0]),
            object("2", "vehicle", &[0.0, 0.0, 0.0]),
        ],
    }));

    let template = |id: &str| {
        let mark = flow.reconciler().mark(id).unwrap();
        flow.scene().get(mark.visual).unwrap().template.name.clone()
    };
    // marks created before the asset arrived keep the fallback
    assert_eq!(template("1"), "unknown");
    assert_eq!(template("2"), "vehicle");
}

#[tokio::test]
async fn should_run_until_shutdown() {
    let (tx, rx) = mpsc::unbounded();
    let flow = TrackingFlow::new(&Context::default(), SceneGraph::new());

    tx.unbounded_send(FlowEvent::Subscribe).unwrap();
    tx.unbounded_send(payload(r#"{"objects": [{"id": 1, "type": "person", "translation": [1, 1, 0]}, {"id": 2, "type": "person", "translation": [2, 2, 0]}]}"#)).unwrap();
    tx.unbounded_send(payload(r#"{"objects": [{"id": 2, "type": "person", "translation": [2, 3, 0]}]}"#)).unwrap();
    tx.unbounded_send(FlowEvent::SetShowTrails(true)).unwrap();
    tx.unbounded_send(FlowEvent::Shutdown).unwrap();
    tx.unbounded_send(FlowEvent::Clear).unwrap();

    let flow = flow.run(rx).await;

    assert_eq!(flow.stats().processed, 2);
    assert_eq!(flow.reconciler().registry().len(), 1);
    assert_eq!(position(&flow, "2"), Vector3::new(2.0, 3.0, 0.0));
    // events after shutdown are not handled
    assert!(flow.reconciler().trails().get("2").is_some());
}

#[tokio::test]
async fn should_stop_when_senders_are_gone() {
    let (tx, rx) = mpsc::unbounded();
    let flow = TrackingFlow::new(&Context::default(), SceneGraph::new());
    tx.unbounded_send(payload(r#"{"objects": []}"#)).unwrap();
    drop(tx);

    let flow = flow.run(rx).await;

    assert_eq!(flow.backlog(), 1);
    assert!(!flow.is_subscribed());
}
