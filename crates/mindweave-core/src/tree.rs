//! Canonical concept tree.
//!
//! Nodes live in an arena keyed by id (insertion ordered) and carry an explicit parent link next
//! to their ordered child ids, so ancestor queries are O(depth) and no node owns another.

use crate::model::{ConceptNode, ManualPosition, NodeStyle};
use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConceptSlot {
    pub(crate) concept: String,
    pub(crate) style: NodeStyle,
    pub(crate) position: Option<ManualPosition>,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,
}

impl ConceptSlot {
    pub(crate) fn leaf(concept: String, parent: Option<String>) -> Self {
        Self {
            concept,
            style: NodeStyle::default(),
            position: None,
            parent,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConceptTree {
    root: Option<String>,
    nodes: IndexMap<String, ConceptSlot, FxBuildHasher>,
}

/// Borrowed view of one node in a [`ConceptTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    id: &'a str,
    slot: &'a ConceptSlot,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn concept(&self) -> &'a str {
        &self.slot.concept
    }

    pub fn style(&self) -> &'a NodeStyle {
        &self.slot.style
    }

    pub fn manual_position(&self) -> Option<ManualPosition> {
        self.slot.position
    }

    pub fn parent(&self) -> Option<&'a str> {
        self.slot.parent.as_deref()
    }

    pub fn children(&self) -> &'a [String] {
        &self.slot.children
    }

    pub fn is_root(&self) -> bool {
        self.slot.parent.is_none()
    }
}

impl ConceptTree {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a tree from the exchange form, rejecting empty concepts and duplicate ids.
    pub fn from_root(root: ConceptNode) -> Result<Self> {
        let mut tree = Self::empty();
        let mut stack: Vec<(ConceptNode, Option<String>, String)> =
            vec![(root, None, "$[0]".to_string())];
        while let Some((node, parent, path)) = stack.pop() {
            let ConceptNode {
                id,
                concept,
                sub_concepts,
                style,
                x,
                y,
            } = node;
            if id.is_empty() {
                return Err(Error::invalid(format!("{path}.id"), "id must not be empty"));
            }
            if concept.trim().is_empty() {
                return Err(Error::invalid(
                    format!("{path}.concept"),
                    "concept must be a non-empty string",
                ));
            }
            if tree.nodes.contains_key(&id) {
                return Err(Error::invalid(
                    format!("{path}.id"),
                    format!("duplicate node id {id:?}"),
                ));
            }
            let position = match (x, y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                    Some(ManualPosition { x, y })
                }
                _ => None,
            };
            match parent.as_deref() {
                Some(p) => {
                    if let Some(parent_slot) = tree.nodes.get_mut(p) {
                        parent_slot.children.push(id.clone());
                    }
                }
                None => tree.root = Some(id.clone()),
            }
            tree.nodes.insert(
                id.clone(),
                ConceptSlot {
                    concept,
                    style,
                    position,
                    parent,
                    children: Vec::with_capacity(sub_concepts.len()),
                },
            );
            // Reverse push keeps pre-order (and child order) when popping.
            for (i, child) in sub_concepts.into_iter().enumerate().rev() {
                stack.push((child, Some(id.clone()), format!("{path}.subConcepts[{i}]")));
            }
        }
        Ok(tree)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.get(self.root.as_deref()?)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<NodeRef<'_>> {
        let (id, slot) = self.nodes.get_key_value(id)?;
        Some(NodeRef { id, slot })
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id)?.parent.as_deref()
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Distance from the root (root = 0). `None` for unknown ids.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        let mut cur = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(p) = cur.parent.as_deref() {
            cur = self.nodes.get(p)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Node ids in depth-first pre-order (parent before children, children in order).
    pub fn pre_order(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root.as_deref() else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children_of(id).iter().rev() {
                stack.push(child.as_str());
            }
        }
        out
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|k| k.as_str())
    }

    /// Rebuilds the recursive exchange form. `None` for an empty tree.
    pub fn to_concept_node(&self) -> Option<ConceptNode> {
        fn build(tree: &ConceptTree, id: &str) -> Option<ConceptNode> {
            let slot = tree.nodes.get(id)?;
            Some(ConceptNode {
                id: id.to_string(),
                concept: slot.concept.clone(),
                sub_concepts: slot
                    .children
                    .iter()
                    .filter_map(|c| build(tree, c))
                    .collect(),
                style: slot.style.clone(),
                x: slot.position.map(|p| p.x),
                y: slot.position.map(|p| p.y),
            })
        }
        build(self, self.root.as_deref()?)
    }

    pub(crate) fn slot_mut(&mut self, id: &str) -> Option<&mut ConceptSlot> {
        self.nodes.get_mut(id)
    }

    /// Appends `id` as the last child of `parent`. The caller guarantees `id` is fresh.
    pub(crate) fn push_child(&mut self, parent: &str, id: String, concept: String) -> bool {
        let Some(parent_slot) = self.nodes.get_mut(parent) else {
            return false;
        };
        parent_slot.children.push(id.clone());
        self.nodes
            .insert(id, ConceptSlot::leaf(concept, Some(parent.to_string())));
        true
    }

    /// Removes `id` and its whole subtree, returning how many nodes were dropped.
    pub(crate) fn remove_subtree(&mut self, id: &str) -> usize {
        let Some(slot) = self.nodes.get(id) else {
            return 0;
        };
        if let Some(parent) = slot.parent.clone() {
            if let Some(parent_slot) = self.nodes.get_mut(&parent) {
                parent_slot.children.retain(|c| c != id);
            }
        } else {
            self.root = None;
        }

        let mut doomed: FxHashSet<String> = FxHashSet::default();
        let mut stack = vec![id.to_string()];
        while let Some(cur) = stack.pop() {
            stack.extend(self.children_of(&cur).iter().cloned());
            doomed.insert(cur);
        }
        self.nodes.retain(|k, _| !doomed.contains(k));
        doomed.len()
    }
}

/// Structural equality: same root, same ids, and per node the same text, style, override and
/// child order. Arena order is irrelevant.
impl PartialEq for ConceptTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
            && self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .all(|(id, slot)| other.nodes.get(id) == Some(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConceptTree {
        let root = ConceptNode::new("root", "Biology").with_children([
            ConceptNode::new("a", "Cells").with_children([ConceptNode::new("a1", "Membrane")]),
            ConceptNode::new("b", "Genetics"),
        ]);
        ConceptTree::from_root(root).unwrap()
    }

    #[test]
    fn pre_order_follows_child_order() {
        let tree = sample();
        assert_eq!(tree.pre_order(), vec!["root", "a", "a1", "b"]);
        assert_eq!(tree.parent_of("a1"), Some("a"));
        assert_eq!(tree.depth_of("a1"), Some(2));
        assert_eq!(tree.depth_of("missing"), None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let root = ConceptNode::new("root", "x").with_children([
            ConceptNode::new("dup", "a"),
            ConceptNode::new("dup", "b"),
        ]);
        let err = ConceptTree::from_root(root).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
        assert!(err.to_string().contains("$[0].subConcepts[1].id"));
    }

    #[test]
    fn round_trips_through_exchange_form() {
        let tree = sample();
        let node = tree.to_concept_node().unwrap();
        assert_eq!(ConceptTree::from_root(node).unwrap(), tree);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut tree = sample();
        assert_eq!(tree.remove_subtree("a"), 2);
        assert_eq!(tree.pre_order(), vec!["root", "b"]);
        assert!(!tree.contains("a1"));
    }
}
