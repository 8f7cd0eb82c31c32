#![forbid(unsafe_code)]

//! Headless mind-map layout and presentation.
//!
//! - [`layout`]: node sizing, hierarchical/radial placement and edge curves
//! - [`viewport`]: pan/zoom math, fit-to-content and culling
//! - [`interaction`]: selection/focus/hover state and derived emphasis
//! - [`svg`]: SVG rendering of a layout

pub mod geom;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod svg;
pub mod text;
pub mod viewport;

use crate::text::{AverageGlyphMeasurer, TextMeasurer};
use mindweave_core::MindmapConfig;
use std::sync::Arc;

pub use layout::{LayoutSettings, LayoutStrategy, Palette, layout_tree};
pub use model::{Bounds, LayoutEdge, MindmapLayout, PositionedNode};
pub use svg::{SvgRenderOptions, render_svg};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config value for {key}: {message}")]
    InvalidConfig { key: String, message: String },
    #[error("invalid layout model: {message}")]
    InvalidModel { message: String },
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(AverageGlyphMeasurer::default()),
        }
    }
}

impl LayoutOptions {
    /// Glyph metrics taken from `layout.avgGlyphWidth` / `layout.lineHeight`.
    pub fn from_config(config: &MindmapConfig) -> Self {
        Self {
            text_measurer: Arc::new(AverageGlyphMeasurer::from_config(config)),
        }
    }
}

/// Parses a layout previously serialized with `serde_json`.
pub fn layout_from_json(text: &str) -> Result<MindmapLayout> {
    let layout: MindmapLayout = serde_json::from_str(text)?;
    let mut ids = rustc_hash::FxHashSet::default();
    for n in &layout.nodes {
        if !ids.insert(n.id.as_str()) {
            return Err(Error::InvalidModel {
                message: format!("duplicate node id {}", n.id),
            });
        }
    }
    for e in &layout.edges {
        for end in [&e.from, &e.to] {
            if !ids.contains(end.as_str()) {
                return Err(Error::InvalidModel {
                    message: format!("edge {} references unknown node {end}", e.id),
                });
            }
        }
    }
    Ok(layout)
}
