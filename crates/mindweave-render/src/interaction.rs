//! Selection, focus and hover state, and the per-node emphasis derived from it.

use crate::geom::{Point, point};
use crate::model::{MindmapLayout, PositionedNode};
use crate::{Error, Result};
use mindweave_core::mutation::{self, BlockReason, Edit, EditOutcome, StyleChange};
use mindweave_core::{ConceptTree, IdGenerator, MindmapConfig};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

pub const DIMMED_OPACITY: f64 = 0.2;
pub const UNRELATED_OPACITY: f64 = 0.3;
pub const INACTIVE_EDGE_OPACITY: f64 = 0.1;

/// Parent/children lookups for one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeIndex {
    root: Option<String>,
    parent: FxHashMap<String, String>,
    children: FxHashMap<String, Vec<String>>,
    /// Pre-order.
    ids: Vec<String>,
}

impl TreeIndex {
    pub fn from_layout(layout: &MindmapLayout) -> Self {
        let mut index = Self::default();
        for n in &layout.nodes {
            index.ids.push(n.id.clone());
            match &n.parent {
                Some(p) => {
                    index.parent.insert(n.id.clone(), p.clone());
                    index
                        .children
                        .entry(p.clone())
                        .or_default()
                        .push(n.id.clone());
                }
                None => index.root = Some(n.id.clone()),
            }
        }
        index
    }

    pub fn from_tree(tree: &ConceptTree) -> Self {
        let mut index = Self {
            root: tree.root_id().map(str::to_string),
            ..Self::default()
        };
        for id in tree.pre_order() {
            index.ids.push(id.to_string());
            if let Some(p) = tree.parent_of(id) {
                index.parent.insert(id.to_string(), p.to_string());
            }
            let kids = tree.children_of(id);
            if !kids.is_empty() {
                index.children.insert(id.to_string(), kids.to_vec());
            }
        }
        index
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    fn stored_id(&self, id: &str) -> Option<&str> {
        match self.parent.get_key_value(id) {
            Some((k, _)) => Some(k.as_str()),
            None => self.root.as_deref().filter(|r| *r == id),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.root.as_deref() == Some(id) || self.parent.contains_key(id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(String::as_str)
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `id` followed by its ancestors up to the root. Empty for unknown ids.
    pub fn ancestor_path(&self, id: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = self.stored_id(id);
        while let Some(c) = cur {
            out.push(c);
            cur = self.parent(c);
        }
        out
    }

    /// All nodes below `id`, pre-order, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children(id).iter().rev().map(String::as_str).collect();
        while let Some(c) = stack.pop() {
            out.push(c);
            stack.extend(self.children(c).iter().rev().map(String::as_str));
        }
        out
    }
}

/// Focus implies selection, so a focused node that is not selected cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Selection {
    #[default]
    None,
    Selected(String),
    Focused(String),
}

impl Selection {
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Selected(id) | Self::Focused(id) => Some(id),
        }
    }

    pub fn focused(&self) -> Option<&str> {
        match self {
            Self::Focused(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Hovering,
    Focused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    HoverEnter(String),
    HoverLeave,
    /// Selects the node and enters focus mode on it.
    ClickNode(String),
    /// Clears selection and focus.
    ClickBackground,
    /// The canonical tree was swapped; drops focus and ids that no longer exist.
    TreeReplaced,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    pub selection: Selection,
    pub hovered: Option<String>,
}

impl InteractionState {
    pub fn phase(&self) -> Phase {
        if self.selection.focused().is_some() {
            Phase::Focused
        } else if self.hovered.is_some() {
            Phase::Hovering
        } else {
            Phase::Idle
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    /// Applies `event` against the current index. Events naming unknown nodes are ignored.
    pub fn apply(&mut self, event: &InteractionEvent, index: &TreeIndex) {
        match event {
            InteractionEvent::HoverEnter(id) => {
                if index.contains(id) {
                    self.hovered = Some(id.clone());
                }
            }
            InteractionEvent::HoverLeave => self.hovered = None,
            InteractionEvent::ClickNode(id) => {
                if index.contains(id) {
                    self.selection = Selection::Focused(id.clone());
                }
            }
            InteractionEvent::ClickBackground => self.selection = Selection::None,
            InteractionEvent::TreeReplaced => {
                self.selection = match self.selection.selected() {
                    Some(id) if index.contains(id) => Selection::Selected(id.to_string()),
                    _ => index
                        .root()
                        .map(|r| Selection::Selected(r.to_string()))
                        .unwrap_or_default(),
                };
                if self.hovered.as_deref().is_some_and(|h| !index.contains(h)) {
                    self.hovered = None;
                }
            }
        }
        tracing::trace!(?event, phase = ?self.phase(), "interaction event");
    }
}

/// Which nodes stay fully visible around the focused node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusScope {
    /// The node and its direct children.
    #[default]
    Children,
    /// The node and everything below it.
    Subtree,
}

impl FocusScope {
    pub fn from_config(config: &MindmapConfig) -> Result<Self> {
        let Some(v) = config.get("interaction.focusScope") else {
            return Ok(Self::default());
        };
        match v.as_str() {
            Some("children") => Ok(Self::Children),
            Some("subtree") => Ok(Self::Subtree),
            _ => Err(Error::InvalidConfig {
                key: "interaction.focusScope".to_string(),
                message: format!("expected \"children\" or \"subtree\", got {v}"),
            }),
        }
    }

    pub fn focus_set<'a>(self, index: &'a TreeIndex, id: &'a str) -> FxHashSet<&'a str> {
        let mut set: FxHashSet<&str> = FxHashSet::default();
        if !index.contains(id) {
            return set;
        }
        set.insert(id);
        match self {
            Self::Children => set.extend(index.children(id).iter().map(String::as_str)),
            Self::Subtree => set.extend(index.descendants(id)),
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeAnnotation {
    pub id: String,
    pub is_selected: bool,
    /// On the hovered node's ancestor path.
    pub is_highlighted: bool,
    /// Outside the focus set while focus mode is active.
    pub is_dimmed: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeAnnotation {
    pub id: String,
    pub is_active: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotations {
    pub phase: Phase,
    /// Same order as the layout's nodes.
    pub nodes: Vec<NodeAnnotation>,
    /// Same order as the layout's edges.
    pub edges: Vec<EdgeAnnotation>,
}

impl Annotations {
    pub fn node(&self, id: &str) -> Option<&NodeAnnotation> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeAnnotation> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn highlighted(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_highlighted)
            .map(|n| n.id.as_str())
            .collect()
    }
}

/// Emphasis of every node and edge for the current interaction state.
///
/// Focus dims everything outside the focus set. Hovering highlights the hovered node's path to
/// the root and fades the rest; within a focus set the hover fade still applies.
pub fn annotate(
    layout: &MindmapLayout,
    index: &TreeIndex,
    state: &InteractionState,
    scope: FocusScope,
) -> Annotations {
    let path: FxHashSet<&str> = state
        .hovered
        .as_deref()
        .map(|h| index.ancestor_path(h).into_iter().collect())
        .unwrap_or_default();
    let hovering = !path.is_empty();
    let focus: Option<FxHashSet<&str>> = state
        .selection
        .focused()
        .map(|f| scope.focus_set(index, f));
    let selected = state.selected();

    let nodes = layout
        .nodes
        .iter()
        .map(|n| {
            let id = n.id.as_str();
            let is_highlighted = path.contains(id);
            let is_dimmed = focus.as_ref().is_some_and(|f| !f.contains(id));
            let opacity = if is_dimmed {
                DIMMED_OPACITY
            } else if hovering && !is_highlighted {
                UNRELATED_OPACITY
            } else {
                1.0
            };
            NodeAnnotation {
                id: n.id.clone(),
                is_selected: selected == Some(id),
                is_highlighted,
                is_dimmed,
                opacity,
            }
        })
        .collect();

    let edges = layout
        .edges
        .iter()
        .map(|e| {
            let (from, to) = (e.from.as_str(), e.to.as_str());
            let on_path = hovering && path.contains(from) && path.contains(to);
            let in_focus = focus
                .as_ref()
                .is_some_and(|f| f.contains(from) && f.contains(to));
            let opacity = match (&focus, hovering) {
                (Some(_), _) if !in_focus => INACTIVE_EDGE_OPACITY,
                (None, true) if !on_path => INACTIVE_EDGE_OPACITY,
                _ => 1.0,
            };
            EdgeAnnotation {
                id: e.id.clone(),
                is_active: on_path || in_focus,
                opacity,
            }
        })
        .collect();

    Annotations {
        phase: state.phase(),
        nodes,
        edges,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlKind {
    AddChild,
    Rename,
    Delete,
}

/// An edit affordance attached to a node, offset from the node center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeControl {
    pub kind: ControlKind,
    pub dx: f64,
    pub dy: f64,
}

/// Edit controls for `node`: only the selected node has any.
pub fn controls_for(node: &PositionedNode, state: &InteractionState) -> Vec<NodeControl> {
    if state.selected() != Some(node.id.as_str()) {
        return Vec::new();
    }
    node_controls(node)
}

/// Controls shown on a selected node. The root cannot be deleted, so it has no delete control.
pub fn node_controls(node: &PositionedNode) -> Vec<NodeControl> {
    let mut out = vec![
        NodeControl {
            kind: ControlKind::AddChild,
            dx: node.width / 2.0,
            dy: 0.0,
        },
        NodeControl {
            kind: ControlKind::Rename,
            dx: 0.0,
            dy: node.height / 2.0,
        },
    ];
    if !node.is_root {
        out.push(NodeControl {
            kind: ControlKind::Delete,
            dx: -node.width / 2.0,
            dy: 0.0,
        });
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeCommand {
    AddChild { parent: String, text: String },
    Rename { id: String, text: String },
    Delete { id: String },
    Restyle { id: String, change: StyleChange },
    /// Drag result; allowed on any node.
    Reposition { id: String, x: f64, y: f64 },
    ClearPosition { id: String },
}

impl NodeCommand {
    pub fn target(&self) -> &str {
        match self {
            Self::AddChild { parent, .. } => parent,
            Self::Rename { id, .. }
            | Self::Delete { id }
            | Self::Restyle { id, .. }
            | Self::Reposition { id, .. }
            | Self::ClearPosition { id } => id,
        }
    }

    fn needs_selection(&self) -> bool {
        !matches!(self, Self::Reposition { .. } | Self::ClearPosition { .. })
    }
}

/// Runs `command` through the mutation engine. Structural edits are only accepted for the
/// selected node.
pub fn route_command(
    state: &InteractionState,
    tree: &ConceptTree,
    command: &NodeCommand,
    ids: &mut dyn IdGenerator,
) -> Edit {
    if command.needs_selection() && state.selected() != Some(command.target()) {
        return Edit::rejected(tree, EditOutcome::Blocked(BlockReason::NotSelected));
    }
    match command {
        NodeCommand::AddChild { parent, text } => mutation::add_child(tree, parent, text, ids),
        NodeCommand::Rename { id, text } => mutation::rename(tree, id, text),
        NodeCommand::Delete { id } => mutation::delete(tree, id),
        NodeCommand::Restyle { id, change } => mutation::restyle(tree, id, change.clone()),
        NodeCommand::Reposition { id, x, y } => mutation::reposition(tree, id, *x, *y),
        NodeCommand::ClearPosition { id } => mutation::clear_position(tree, id),
    }
}

/// Dragging a single node: pointer motion in screen space moves the node by `delta / zoom` in
/// world space.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    id: String,
    origin: Point,
    pointer_start: Point,
    current: Point,
}

impl NodeDrag {
    pub fn begin(node: &PositionedNode, pointer: Point) -> Self {
        let origin = point(node.x, node.y);
        Self {
            id: node.id.clone(),
            origin,
            pointer_start: pointer,
            current: origin,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Moves the node under `pointer`; returns its new world position.
    pub fn update(&mut self, pointer: Point, zoom: f64) -> Point {
        if zoom.is_finite() && zoom > 0.0 {
            self.current = self.origin + (pointer - self.pointer_start) / zoom;
        }
        self.current
    }

    pub fn position(&self) -> Point {
        self.current
    }

    /// Ends the drag. A drag that never moved the node produces no command.
    pub fn release(self) -> Option<NodeCommand> {
        if self.current == self.origin {
            return None;
        }
        Some(NodeCommand::Reposition {
            id: self.id,
            x: self.current.x,
            y: self.current.y,
        })
    }
}
