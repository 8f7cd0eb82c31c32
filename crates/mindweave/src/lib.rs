#![forbid(unsafe_code)]

//! `mindweave` is a headless mind-map engine.
//!
//! The concept tree lives in [`mindweave_core`]; layout, viewport math, interaction emphasis and
//! SVG output live in [`mindweave_render`]. [`MindmapSession`] owns one tree and keeps every
//! derived view of it (layout, highlight state, viewport) consistent across edits.

mod session;

pub use mindweave_core::*;
pub use session::{ConceptSource, MindmapSession};

pub mod render {
    pub use mindweave_render::interaction::{
        Annotations, FocusScope, InteractionEvent, InteractionState, NodeCommand, Phase,
        Selection, TreeIndex,
    };
    pub use mindweave_render::text::{AverageGlyphMeasurer, TextMeasurer};
    pub use mindweave_render::viewport::{ViewState, Viewport, ViewportConfig, ZoomDirection};
    pub use mindweave_render::{
        Bounds, LayoutEdge, LayoutOptions, LayoutSettings, LayoutStrategy, MindmapLayout, Palette,
        PositionedNode, SvgRenderOptions, layout_from_json, layout_tree, render_svg,
    };
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] mindweave_core::Error),
    #[error(transparent)]
    Render(#[from] mindweave_render::Error),
    /// The external concept generator failed before producing any JSON.
    #[error("concept generator failed: {0}")]
    Generator(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
