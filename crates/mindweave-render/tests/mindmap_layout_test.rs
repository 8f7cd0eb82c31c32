use mindweave_core::ingest::ingest_str;
use mindweave_core::{ConceptNode, ConceptTree, MindmapConfig, SequentialIdGenerator};
use mindweave_render::geom::point;
use mindweave_render::viewport::{ViewState, Viewport, ViewportConfig, ZoomDirection};
use mindweave_render::{Bounds, LayoutOptions, MindmapLayout, layout_from_json, layout_tree};
use serde_json::json;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> ConceptTree {
    let path = workspace_root().join("fixtures").join("mindmap").join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");
    ingest_str(&text, &mut SequentialIdGenerator::default()).expect("valid fixture")
}

/// Deterministic pseudo-random tree: `n` nodes, each attached under an earlier node.
fn generated_tree(n: usize, seed: u64) -> ConceptTree {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    let mut parents: Vec<usize> = vec![0];
    for i in 1..n {
        parents.push(next() % i);
    }
    fn build(i: usize, parents: &[usize], words: &[&str]) -> ConceptNode {
        let children = (i + 1..parents.len())
            .filter(|&c| parents[c] == i)
            .map(|c| build(c, parents, words));
        let label = words[..=(i % words.len())].join(" ");
        ConceptNode::new(format!("n{i}"), label).with_children(children)
    }
    let words = ["energy", "chlorophyll", "light", "reactions", "glucose", "stroma"];
    ConceptTree::from_root(build(0, &parents, &words)).unwrap()
}

fn layout(tree: &ConceptTree, strategy: &str) -> MindmapLayout {
    let cfg = MindmapConfig::with_overrides(&json!({ "layout": { "strategy": strategy } }));
    layout_tree(tree, &cfg, &LayoutOptions::from_config(&cfg)).expect("layout ok")
}

fn subtree_bounds(layout: &MindmapLayout, tree: &ConceptTree, id: &str) -> Bounds {
    let mut ids = vec![id.to_string()];
    let mut i = 0;
    while i < ids.len() {
        let children = tree.children_of(&ids[i]).to_vec();
        ids.extend(children);
        i += 1;
    }
    Bounds::of_nodes(layout.nodes.iter().filter(|n| ids.contains(&n.id))).unwrap()
}

#[test]
fn fixture_layout_has_one_positioned_node_per_concept() {
    let tree = fixture("photosynthesis.json");
    let out = layout(&tree, "hierarchical");
    assert_eq!(out.nodes.len(), tree.len());
    assert_eq!(out.edges.len(), tree.len() - 1);
    for n in &out.nodes {
        assert!(n.x.is_finite() && n.y.is_finite());
        assert_eq!(n.width, 150.0);
        assert!(n.height >= 50.0);
        assert!(!n.lines.is_empty());
    }
}

#[test]
fn hierarchical_sibling_subtrees_are_disjoint_on_generated_trees() {
    for seed in 1..=12 {
        let tree = generated_tree(40, seed);
        let out = layout(&tree, "hierarchical");
        for &parent in &tree.pre_order() {
            let children = tree.children_of(parent);
            for pair in children.windows(2) {
                let left = subtree_bounds(&out, &tree, &pair[0]);
                let right = subtree_bounds(&out, &tree, &pair[1]);
                assert!(
                    !left.intersects(&right),
                    "seed {seed}: {} overlaps {}",
                    pair[0],
                    pair[1]
                );
            }
        }
        let b = out.bounds.unwrap();
        assert!((b.min_x + b.max_x).abs() < 1e-6, "seed {seed}: not centered");
    }
}

#[test]
fn radial_siblings_keep_their_angular_order() {
    let tree = fixture("photosynthesis.json");
    let out = layout(&tree, "radial");
    let root = tree.root_id().unwrap();
    let angles: Vec<f64> = tree
        .children_of(root)
        .iter()
        .map(|c| {
            let n = out.node(c).unwrap();
            // Unwrap past the starting angle so the sequence is monotonic.
            let a = n.y.atan2(n.x);
            if a < -std::f64::consts::FRAC_PI_2 {
                a + std::f64::consts::TAU
            } else {
                a
            }
        })
        .collect();
    assert!(angles.windows(2).all(|w| w[0] < w[1]), "{angles:?}");
}

#[test]
fn repeated_layout_is_bit_identical() {
    let tree = generated_tree(60, 7);
    for strategy in ["hierarchical", "radial"] {
        let a = serde_json::to_string(&layout(&tree, strategy)).unwrap();
        let b = serde_json::to_string(&layout(&tree, strategy)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn zoom_to_cursor_preserves_the_world_point() {
    let tree = fixture("photosynthesis.json");
    let out = layout(&tree, "hierarchical");
    let mut vp = Viewport::new(1024.0, 600.0, ViewportConfig::default());
    vp.fit_to_content(&out.nodes);
    let cursor = point(100.0, 100.0);
    let world = vp.screen_to_world(cursor);
    for direction in [ZoomDirection::In, ZoomDirection::In, ZoomDirection::Out] {
        vp.zoom_at_point(cursor, direction, 1.1);
        let after = vp.screen_to_world(cursor);
        assert!((after.x - world.x).abs() < 1e-9);
        assert!((after.y - world.y).abs() < 1e-9);
    }
    assert!(vp.state().zoom <= 1.0 * 1.1 * 1.1);
}

#[test]
fn fitting_a_fixture_never_zooms_in() {
    let tree = fixture("persisted.json");
    let out = layout(&tree, "hierarchical");
    let mut vp = Viewport::new(4000.0, 4000.0, ViewportConfig::default());
    vp.set_state(ViewState {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 2.0,
    });
    assert!(vp.fit_to_content(&out.nodes));
    assert_eq!(vp.state().zoom, 1.0);
}

#[test]
fn serialized_layouts_load_back() {
    let tree = fixture("persisted.json");
    let out = layout(&tree, "hierarchical");
    let text = serde_json::to_string_pretty(&out).unwrap();
    assert_eq!(layout_from_json(&text).unwrap(), out);

    let mut broken = out.clone();
    broken.edges[0].to = "missing".to_string();
    let text = serde_json::to_string(&broken).unwrap();
    assert!(matches!(
        layout_from_json(&text),
        Err(mindweave_render::Error::InvalidModel { .. })
    ));
    assert!(matches!(
        layout_from_json("{"),
        Err(mindweave_render::Error::Json(_))
    ));
}
