//! Structural edits on the canonical tree.
//!
//! Every operation takes the current tree by reference and returns a new tree value together with
//! an [`EditOutcome`]; callers replace their stored tree only when the outcome is
//! [`EditOutcome::Applied`]. Guards (blank text, unknown ids, root deletion) are outcomes, not
//! errors.

use crate::ids::{IdGenerator, fresh_id};
use crate::model::{ManualPosition, NodeStyle};
use crate::tree::{ConceptTree, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The root can never be deleted.
    RootProtected,
    /// Structural edits are only exposed for the selected node.
    NotSelected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    NotFound,
    IgnoredEmptyText,
    /// The edit would not change anything (e.g. renaming to the same text).
    Unchanged,
    Blocked(BlockReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Edit {
    pub tree: ConceptTree,
    pub outcome: EditOutcome,
    /// Id of the node created by [`add_child`].
    pub created: Option<String>,
}

impl Edit {
    fn applied(tree: ConceptTree) -> Self {
        Self {
            tree,
            outcome: EditOutcome::Applied,
            created: None,
        }
    }

    pub(crate) fn unchanged(tree: &ConceptTree, outcome: EditOutcome) -> Self {
        tracing::trace!(?outcome, "edit not applied");
        Self {
            tree: tree.clone(),
            outcome,
            created: None,
        }
    }

    /// Builds a rejected edit for a guard that lives outside this module.
    pub fn rejected(tree: &ConceptTree, outcome: EditOutcome) -> Self {
        Self::unchanged(tree, outcome)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleChange {
    /// Fill and text color are picked together from a palette swatch.
    SetColors { fill: String, text: String },
    ClearColors,
    ToggleBold,
    ToggleItalic,
}

/// Looks a node up by identity. Ids are unique per tree, so the first pre-order match is the
/// only match.
pub fn find<'a>(tree: &'a ConceptTree, id: &str) -> Option<NodeRef<'a>> {
    tree.get(id)
}

pub fn add_child(
    tree: &ConceptTree,
    parent_id: &str,
    text: &str,
    ids: &mut dyn IdGenerator,
) -> Edit {
    let text = text.trim();
    if text.is_empty() {
        return Edit::unchanged(tree, EditOutcome::IgnoredEmptyText);
    }
    if !tree.contains(parent_id) {
        return Edit::unchanged(tree, EditOutcome::NotFound);
    }

    let mut next = tree.clone();
    let id = fresh_id(ids, |candidate| tree.contains(candidate));
    next.push_child(parent_id, id.clone(), text.to_string());
    tracing::debug!(parent = parent_id, id = %id, "added child");
    Edit {
        tree: next,
        outcome: EditOutcome::Applied,
        created: Some(id),
    }
}

pub fn rename(tree: &ConceptTree, id: &str, text: &str) -> Edit {
    if text.trim().is_empty() {
        return Edit::unchanged(tree, EditOutcome::IgnoredEmptyText);
    }
    let Some(node) = tree.get(id) else {
        return Edit::unchanged(tree, EditOutcome::NotFound);
    };
    if node.concept() == text {
        return Edit::unchanged(tree, EditOutcome::Unchanged);
    }

    let mut next = tree.clone();
    if let Some(slot) = next.slot_mut(id) {
        slot.concept = text.to_string();
    }
    tracing::debug!(id, "renamed node");
    Edit::applied(next)
}

pub fn delete(tree: &ConceptTree, id: &str) -> Edit {
    let Some(node) = tree.get(id) else {
        return Edit::unchanged(tree, EditOutcome::NotFound);
    };
    if node.is_root() {
        return Edit::unchanged(tree, EditOutcome::Blocked(BlockReason::RootProtected));
    }

    let mut next = tree.clone();
    let removed = next.remove_subtree(id);
    tracing::debug!(id, removed, "deleted subtree");
    Edit::applied(next)
}

pub fn reposition(tree: &ConceptTree, id: &str, x: f64, y: f64) -> Edit {
    if !(x.is_finite() && y.is_finite()) {
        return Edit::unchanged(tree, EditOutcome::Unchanged);
    }
    set_position(tree, id, Some(ManualPosition { x, y }))
}

pub fn clear_position(tree: &ConceptTree, id: &str) -> Edit {
    set_position(tree, id, None)
}

fn set_position(tree: &ConceptTree, id: &str, position: Option<ManualPosition>) -> Edit {
    let Some(node) = tree.get(id) else {
        return Edit::unchanged(tree, EditOutcome::NotFound);
    };
    if node.manual_position() == position {
        return Edit::unchanged(tree, EditOutcome::Unchanged);
    }

    let mut next = tree.clone();
    if let Some(slot) = next.slot_mut(id) {
        slot.position = position;
    }
    Edit::applied(next)
}

pub fn restyle(tree: &ConceptTree, id: &str, change: StyleChange) -> Edit {
    let Some(node) = tree.get(id) else {
        return Edit::unchanged(tree, EditOutcome::NotFound);
    };

    let mut style: NodeStyle = node.style().clone();
    match change {
        StyleChange::SetColors { fill, text } => {
            style.color = Some(fill);
            style.text_color = Some(text);
        }
        StyleChange::ClearColors => {
            style.color = None;
            style.text_color = None;
        }
        StyleChange::ToggleBold => style.is_bold = !style.is_bold,
        StyleChange::ToggleItalic => style.is_italic = !style.is_italic,
    }
    if &style == node.style() {
        return Edit::unchanged(tree, EditOutcome::Unchanged);
    }

    let mut next = tree.clone();
    if let Some(slot) = next.slot_mut(id) {
        slot.style = style;
    }
    Edit::applied(next)
}
