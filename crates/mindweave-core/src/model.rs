use serde::{Deserialize, Serialize};

/// Optional per-node presentation overrides. `None` means "derive from depth/palette".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_italic: bool,
}

impl NodeStyle {
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// Manual position set by dragging a node; replaces the computed layout coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualPosition {
    pub x: f64,
    pub y: f64,
}

/// Exchange/persisted form of a mind map node.
///
/// This is the recursive shape stored in saved notes and produced by ingestion; editing and layout
/// work on [`crate::ConceptTree`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub id: String,
    pub concept: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_concepts: Vec<ConceptNode>,
    #[serde(flatten)]
    pub style: NodeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl ConceptNode {
    pub fn new(id: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            concept: concept.into(),
            sub_concepts: Vec::new(),
            style: NodeStyle::default(),
            x: None,
            y: None,
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ConceptNode>) -> Self {
        self.sub_concepts.extend(children);
        self
    }

    /// Both coordinates must be present for an override to take effect.
    pub fn manual_position(&self) -> Option<ManualPosition> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(ManualPosition { x, y }),
            _ => None,
        }
    }
}
