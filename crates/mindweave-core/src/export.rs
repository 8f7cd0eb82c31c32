use crate::tree::ConceptTree;
use crate::Result;
use serde_json::Value;

/// One `- concept` line per node, two spaces of indent per depth, pre-order.
pub fn to_markdown_outline(tree: &ConceptTree) -> String {
    let mut out = String::new();
    let Some(root) = tree.root_id() else {
        return out;
    };
    let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str("- ");
        // Outline lines are single-line; fold any embedded line breaks.
        out.push_str(&node.concept().split_whitespace().collect::<Vec<_>>().join(" "));
        out.push('\n');
        for child in node.children().iter().rev() {
            stack.push((child.as_str(), depth + 1));
        }
    }
    out
}

/// Everything that goes into a study-notes export besides the mind map.
#[derive(Debug, Clone, Default)]
pub struct StudyNotes<'a> {
    pub summary: Option<&'a str>,
    pub key_insight: Option<&'a str>,
    pub mind_map: Option<&'a ConceptTree>,
}

pub fn to_study_notes_markdown(notes: &StudyNotes<'_>) -> String {
    let mut out = String::from("# Study Notes\n\n");
    if let Some(summary) = notes.summary.filter(|s| !s.trim().is_empty()) {
        out.push_str("## Summary\n\n");
        out.push_str(summary);
        out.push_str("\n\n");
    }
    if let Some(insight) = notes.key_insight.filter(|s| !s.trim().is_empty()) {
        out.push_str("## Key Insight\n\n*");
        out.push_str(insight);
        out.push_str("*\n\n");
    }
    if let Some(tree) = notes.mind_map.filter(|t| !t.is_empty()) {
        out.push_str("## Mind Map\n\n");
        out.push_str(&to_markdown_outline(tree));
        out.push('\n');
    }
    out.trim().to_string()
}

/// Exchange form: `[root]`, or `[]` for an empty tree.
pub fn to_value(tree: &ConceptTree) -> Result<Value> {
    let roots: Vec<_> = tree.to_concept_node().into_iter().collect();
    Ok(serde_json::to_value(roots)?)
}

pub fn to_json_string(tree: &ConceptTree, pretty: bool) -> Result<String> {
    let value = to_value(tree)?;
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use crate::ingest::ingest_value;
    use crate::model::ConceptNode;
    use serde_json::json;

    fn sample() -> ConceptTree {
        ConceptTree::from_root(ConceptNode::new("r", "Cell").with_children([
            ConceptNode::new("a", "Organelles").with_children([
                ConceptNode::new("a1", "Nucleus"),
                ConceptNode::new("a2", "Mitochondria"),
            ]),
            ConceptNode::new("b", "Membrane"),
        ]))
        .unwrap()
    }

    #[test]
    fn outline_indents_by_depth() {
        assert_eq!(
            to_markdown_outline(&sample()),
            "- Cell\n  - Organelles\n    - Nucleus\n    - Mitochondria\n  - Membrane\n"
        );
        assert_eq!(to_markdown_outline(&ConceptTree::empty()), "");
    }

    #[test]
    fn study_notes_skip_missing_sections() {
        let tree = sample();
        let md = to_study_notes_markdown(&StudyNotes {
            summary: Some("Cells are the unit of life."),
            key_insight: None,
            mind_map: Some(&tree),
        });
        assert!(md.starts_with("# Study Notes\n\n## Summary\n\nCells are the unit of life."));
        assert!(!md.contains("Key Insight"));
        assert!(md.ends_with("  - Membrane"));
    }

    #[test]
    fn exchange_form_reingests_to_the_same_tree() {
        let mut tree = sample();
        tree = crate::mutation::reposition(&tree, "b", 10.0, 20.0).tree;
        let value = to_value(&tree).unwrap();
        assert_eq!(value[0]["subConcepts"][1]["x"], json!(10.0));
        let mut ids = SequentialIdGenerator::default();
        assert_eq!(ingest_value(&value, &mut ids).unwrap(), tree);
    }
}
