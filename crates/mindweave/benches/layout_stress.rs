use criterion::{Criterion, criterion_group, criterion_main};
use mindweave::render::{LayoutOptions, layout_tree};
use mindweave::{ConceptNode, ConceptTree, MindmapConfig};
use serde_json::json;
use std::hint::black_box;

/// Balanced tree: `fanout` children per node down to `depth` levels.
fn balanced_tree(depth: usize, fanout: usize) -> ConceptTree {
    fn build(prefix: String, level: usize, depth: usize, fanout: usize) -> ConceptNode {
        let children = if level < depth {
            (0..fanout)
                .map(|i| build(format!("{prefix}.{i}"), level + 1, depth, fanout))
                .collect()
        } else {
            Vec::new()
        };
        ConceptNode::new(
            prefix.clone(),
            format!("Concept {prefix} with a label long enough to wrap"),
        )
        .with_children(children)
    }
    ConceptTree::from_root(build("n".to_string(), 0, depth, fanout)).expect("valid tree")
}

fn bench_layout_stress(c: &mut Criterion) {
    let tree = balanced_tree(5, 4);
    let mut group = c.benchmark_group("layout_stress");
    group.sample_size(50);

    for strategy in ["hierarchical", "radial"] {
        let config = MindmapConfig::with_overrides(&json!({ "layout": { "strategy": strategy } }));
        let options = LayoutOptions::from_config(&config);
        group.bench_function(format!("balanced_1365_{strategy}"), |b| {
            b.iter(|| {
                let layout = layout_tree(black_box(&tree), &config, &options).expect("layout");
                black_box(layout.nodes.len() ^ layout.edges.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout_stress);
criterion_main!(benches);
