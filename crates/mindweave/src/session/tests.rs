use super::*;
use futures::FutureExt;
use futures::executor::block_on;
use mindweave_core::{BlockReason, SequentialIdGenerator};
use mindweave_render::LayoutStrategy;
use serde_json::json;

fn persisted() -> Value {
    json!([{
        "id": "root",
        "concept": "World War I",
        "subConcepts": [
            {
                "id": "causes",
                "concept": "Causes",
                "subConcepts": [
                    { "id": "alliances", "concept": "Alliances" },
                    { "id": "nationalism", "concept": "Nationalism" }
                ]
            },
            { "id": "fronts", "concept": "Fronts", "x": 320.0, "y": 140.0 },
            { "id": "treaty", "concept": "Treaty of Versailles" }
        ]
    }])
}

fn session() -> MindmapSession {
    let mut s = MindmapSession::new(MindmapConfig::default())
        .unwrap()
        .with_id_generator(SequentialIdGenerator::new("t"));
    s.load_value(&persisted()).unwrap();
    s
}

struct Canned(Result<String, String>);

impl ConceptSource for Canned {
    fn generate<'a>(
        &'a self,
        _topic: &'a str,
    ) -> BoxFuture<'a, Result<String, Box<dyn std::error::Error + Send + Sync>>> {
        let out = self.0.clone().map_err(Into::into);
        futures::future::ready(out).boxed()
    }
}

#[test]
fn new_session_is_empty() {
    let s = MindmapSession::new(MindmapConfig::default()).unwrap();
    assert!(s.tree().is_empty());
    assert!(s.layout().nodes.is_empty());
    assert_eq!(s.interaction().selected(), None);
    assert!(s.outline_markdown().is_empty());
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = MindmapConfig::with_overrides(&json!({ "layout": { "strategy": "spiral" } }));
    assert!(matches!(
        MindmapSession::new(cfg),
        Err(SessionError::Render(_))
    ));
}

#[test]
fn loading_lays_out_selects_root_and_fits() {
    let s = session();
    assert_eq!(s.tree().len(), 6);
    assert_eq!(s.layout().nodes.len(), 6);
    assert_eq!(s.index().root(), Some("root"));
    assert_eq!(s.interaction().selected(), Some("root"));
    let zoom = s.viewport().state().zoom;
    assert!(zoom > 0.0 && zoom <= 1.0);

    let fronts = s.layout().node("fronts").unwrap();
    assert_eq!((fronts.x, fronts.y), (320.0, 140.0));
}

#[test]
fn failed_load_keeps_previous_tree() {
    let mut s = session();
    let before = s.tree().clone();
    let err = s
        .load_value(&json!([{ "concept": "a" }, { "concept": "b" }]))
        .unwrap_err();
    assert!(matches!(err, SessionError::Tree(_)));
    assert_eq!(s.tree(), &before);
    assert_eq!(s.layout().nodes.len(), 6);
}

#[test]
fn generated_json_replaces_tree_only_on_success() {
    let mut s = session();
    let ok = futures::future::ready(Ok::<_, String>(
        r#"[{"concept":"Cells","subConcepts":[{"concept":"Nucleus"}]}]"#.to_string(),
    ));
    block_on(s.ingest_generated(ok)).unwrap();
    assert_eq!(s.tree().len(), 2);
    assert_eq!(s.tree().root_id(), Some("t-1"));

    let failed = futures::future::ready(Err::<String, _>("rate limited"));
    let err = block_on(s.ingest_generated(failed)).unwrap_err();
    assert!(matches!(err, SessionError::Generator(ref m) if m == "rate limited"));
    assert_eq!(s.tree().len(), 2);

    let garbage = futures::future::ready(Ok::<_, String>("not json".to_string()));
    assert!(block_on(s.ingest_generated(garbage)).is_err());
    assert_eq!(s.tree().len(), 2);
}

#[test]
fn concept_source_feeds_the_session() {
    let mut s = MindmapSession::new(MindmapConfig::default()).unwrap();
    let source = Canned(Ok(r#"[{"id":"x","concept":"Optics"}]"#.to_string()));
    block_on(s.generate_from(&source, "optics")).unwrap();
    assert_eq!(s.tree().root_id(), Some("x"));

    let broken = Canned(Err("offline".to_string()));
    assert!(block_on(s.generate_from(&broken, "optics")).is_err());
    assert_eq!(s.tree().root_id(), Some("x"));
}

#[test]
fn commands_need_the_target_selected() {
    let mut s = session();
    let outcome = s.command(NodeCommand::Rename {
        id: "treaty".to_string(),
        text: "Peace".to_string(),
    });
    assert_eq!(outcome, EditOutcome::Blocked(BlockReason::NotSelected));

    s.handle(InteractionEvent::ClickNode("treaty".to_string()));
    let outcome = s.command(NodeCommand::Rename {
        id: "treaty".to_string(),
        text: "Peace".to_string(),
    });
    assert_eq!(outcome, EditOutcome::Applied);
    assert_eq!(s.tree().get("treaty").unwrap().concept(), "Peace");
    assert_eq!(s.layout().node("treaty").unwrap().concept, "Peace");
}

#[test]
fn adding_a_child_relayouts_and_keeps_focus() {
    let mut s = session();
    s.handle(InteractionEvent::ClickNode("causes".to_string()));
    let view = s.viewport().state();
    let outcome = s.command(NodeCommand::AddChild {
        parent: "causes".to_string(),
        text: "  Militarism ".to_string(),
    });
    assert_eq!(outcome, EditOutcome::Applied);
    assert_eq!(s.tree().children_of("causes").len(), 3);
    assert_eq!(s.tree().get("t-1").unwrap().concept(), "Militarism");
    assert!(s.layout().node("t-1").is_some());
    assert_eq!(s.interaction().selection.focused(), Some("causes"));
    assert_eq!(s.viewport().state(), view);
}

#[test]
fn deleting_the_selection_falls_back_to_root() {
    let mut s = session();
    s.handle(InteractionEvent::ClickNode("causes".to_string()));
    s.handle(InteractionEvent::HoverEnter("alliances".to_string()));
    let outcome = s.command(NodeCommand::Delete {
        id: "causes".to_string(),
    });
    assert_eq!(outcome, EditOutcome::Applied);
    assert_eq!(s.tree().len(), 3);
    assert_eq!(s.interaction().selected(), Some("root"));
    assert_eq!(s.interaction().hovered, None);

    s.handle(InteractionEvent::ClickNode("root".to_string()));
    let outcome = s.command(NodeCommand::Delete {
        id: "root".to_string(),
    });
    assert_eq!(outcome, EditOutcome::Blocked(BlockReason::RootProtected));
}

#[test]
fn annotations_follow_focus() {
    let mut s = session();
    s.handle(InteractionEvent::ClickNode("causes".to_string()));
    let a = s.annotations();
    assert!(!a.node("causes").unwrap().is_dimmed);
    assert!(!a.node("alliances").unwrap().is_dimmed);
    assert!(a.node("treaty").unwrap().is_dimmed);
    assert_eq!(a.node("treaty").unwrap().opacity, 0.2);

    s.handle(InteractionEvent::ClickBackground);
    let a = s.annotations();
    assert!(a.nodes.iter().all(|n| n.opacity == 1.0));
}

#[test]
fn dragging_a_node_persists_a_manual_position() {
    let mut s = session();
    s.resize(800.0, 600.0);
    s.viewport.set_state(mindweave_render::viewport::ViewState {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 0.5,
    });
    let start = s.layout().node("treaty").map(|n| (n.x, n.y)).unwrap();

    assert!(s.begin_node_drag("treaty", point(10.0, 10.0)));
    let at = s.drag_to(point(30.0, 20.0)).unwrap();
    assert_eq!((at.x, at.y), (start.0 + 40.0, start.1 + 20.0));
    assert_eq!(s.end_node_drag(), Some(EditOutcome::Applied));

    let pos = s.tree().get("treaty").unwrap().manual_position().unwrap();
    assert_eq!((pos.x, pos.y), (start.0 + 40.0, start.1 + 20.0));
    let node = s.layout().node("treaty").unwrap();
    assert_eq!((node.x, node.y), (pos.x, pos.y));

    assert!(!s.begin_node_drag("missing", point(0.0, 0.0)));
    assert_eq!(s.end_node_drag(), None);
}

#[test]
fn edges_follow_a_node_while_it_is_dragged() {
    let mut s = session();
    let edge = |s: &MindmapSession, id: &str| {
        s.layout()
            .edges
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.path.clone())
            .unwrap()
    };
    let to_causes = edge(&s, "edge-root-causes");
    let from_causes = edge(&s, "edge-causes-alliances");
    let unrelated = edge(&s, "edge-root-treaty");

    let zoom = s.viewport().state().zoom;
    assert!(s.begin_node_drag("causes", point(100.0, 100.0)));
    s.drag_to(point(100.0 + 150.0 * zoom, 100.0 + 80.0 * zoom));

    let moved_in = edge(&s, "edge-root-causes");
    let moved_out = edge(&s, "edge-causes-alliances");
    assert_ne!(moved_in, to_causes);
    assert_ne!(moved_out, from_causes);
    assert_eq!(edge(&s, "edge-root-treaty"), unrelated);

    let layout = s.layout();
    let (root, causes, alliances) = (
        layout.node("root").unwrap(),
        layout.node("causes").unwrap(),
        layout.node("alliances").unwrap(),
    );
    assert_eq!(
        moved_in,
        edge_path(LayoutStrategy::Hierarchical, root, causes)
    );
    assert_eq!(
        moved_out,
        edge_path(LayoutStrategy::Hierarchical, causes, alliances)
    );

    let svg = s.render_svg();
    assert!(svg.contains(&moved_in));
    assert!(!svg.contains(&to_causes));
}

#[test]
fn pan_moves_are_coalesced_per_frame() {
    let mut s = session();
    let before = s.viewport().state();
    s.begin_pan(point(100.0, 100.0));
    s.pan_to(point(110.0, 105.0));
    s.pan_to(point(130.0, 90.0));
    assert_eq!(s.viewport().state(), before);
    assert!(s.flush_frame());
    let after = s.viewport().state();
    assert_eq!(after.pan_x - before.pan_x, 30.0);
    assert_eq!(after.pan_y - before.pan_y, -10.0);
    assert!(!s.flush_frame());

    s.pan_to(point(131.0, 90.0));
    s.end_pan();
    assert_eq!(s.viewport().state().pan_x - after.pan_x, 1.0);
}

#[test]
fn zoom_buttons_anchor_on_the_selected_node() {
    let mut s = session();
    s.handle(InteractionEvent::ClickNode("treaty".to_string()));
    let node = s.layout().node("treaty").unwrap();
    let world = point(node.x, node.y);
    let before = s.viewport().world_to_screen(world);
    assert!(s.zoom_step(ZoomDirection::In));
    let after = s.viewport().world_to_screen(world);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn svg_and_outline_reflect_the_current_tree() {
    let s = session();
    let svg = s.render_svg();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Treaty of"));
    assert!(svg.contains("class=\"control"));
    assert_eq!(
        s.outline_markdown(),
        "- World War I\n  - Causes\n    - Alliances\n    - Nationalism\n  - Fronts\n  - Treaty of Versailles\n"
    );
    let json = s.to_json_string(false).unwrap();
    assert!(json.starts_with("[{\"id\":\"root\""));
}
