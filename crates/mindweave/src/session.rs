//! Single owner of a mind map's state.
//!
//! The canonical tree is the only source of truth. The layout, the tree index and the highlight
//! state are derived from it and recomputed whenever the tree is swapped; the viewport survives
//! edits and is refitted only when a whole new tree is loaded.

#[cfg(test)]
mod tests;

use crate::{SessionError, SessionResult};
use futures::future::BoxFuture;
use mindweave_core::ingest::{ingest_str, ingest_value};
use mindweave_core::{
    ConceptTree, EditOutcome, IdGenerator, MindmapConfig, UuidIdGenerator, export,
};
use mindweave_render::geom::{Point, point};
use mindweave_render::interaction::{
    Annotations, FocusScope, InteractionEvent, InteractionState, NodeCommand, NodeDrag, TreeIndex,
    annotate, route_command,
};
use mindweave_render::layout::{edge_path, layout_with};
use mindweave_render::text::TextMeasurer as _;
use mindweave_render::viewport::{PanCoalescer, Viewport, ViewportConfig, ZoomDirection};
use mindweave_render::{
    LayoutOptions, LayoutSettings, MindmapLayout, Palette, SvgRenderOptions, render_svg,
};
use serde_json::Value;
use std::future::Future;

const DEFAULT_CANVAS_WIDTH: f64 = 1024.0;
const DEFAULT_CANVAS_HEIGHT: f64 = 768.0;

/// An external producer of concept-tree JSON (typically a text-generation service).
pub trait ConceptSource {
    fn generate<'a>(
        &'a self,
        topic: &'a str,
    ) -> BoxFuture<'a, Result<String, Box<dyn std::error::Error + Send + Sync>>>;
}

pub struct MindmapSession {
    config: MindmapConfig,
    settings: LayoutSettings,
    palette: Palette,
    layout_options: LayoutOptions,
    scope: FocusScope,
    ids: Box<dyn IdGenerator + Send>,

    tree: ConceptTree,
    layout: MindmapLayout,
    index: TreeIndex,
    interaction: InteractionState,

    viewport: Viewport,
    pan: PanCoalescer,
    drag: Option<NodeDrag>,
}

impl std::fmt::Debug for MindmapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MindmapSession")
            .field("nodes", &self.tree.len())
            .field("interaction", &self.interaction)
            .field("view", &self.viewport.state())
            .finish_non_exhaustive()
    }
}

impl MindmapSession {
    /// Starts with an empty tree. Fails when the config holds values the typed views reject.
    pub fn new(config: MindmapConfig) -> SessionResult<Self> {
        let settings = LayoutSettings::from_config(&config)?;
        let viewport_config = ViewportConfig::from_config(&config)?;
        let scope = FocusScope::from_config(&config)?;
        let layout_options = LayoutOptions::from_config(&config);
        let palette = Palette::from_config(&config);
        let layout = MindmapLayout::empty(layout_options.text_measurer.line_height());
        Ok(Self {
            config,
            settings,
            palette,
            layout_options,
            scope,
            ids: Box::new(UuidIdGenerator),
            tree: ConceptTree::empty(),
            layout,
            index: TreeIndex::default(),
            interaction: InteractionState::default(),
            viewport: Viewport::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT, viewport_config),
            pan: PanCoalescer::new(),
            drag: None,
        })
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &MindmapConfig {
        &self.config
    }

    /// The canonical tree.
    pub fn tree(&self) -> &ConceptTree {
        &self.tree
    }

    pub fn layout(&self) -> &MindmapLayout {
        &self.layout
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Swaps in a whole new tree, re-lays it out and fits the view to it.
    pub fn replace_tree(&mut self, tree: ConceptTree) {
        tracing::debug!(nodes = tree.len(), "replacing concept tree");
        self.drag = None;
        self.install(tree);
        self.interaction
            .apply(&InteractionEvent::TreeReplaced, &self.index);
        self.fit_view();
    }

    /// Ingests a JSON value. On any validation error the current tree is kept.
    pub fn load_value(&mut self, value: &Value) -> SessionResult<()> {
        let tree = ingest_value(value, self.ids.as_mut())?;
        self.replace_tree(tree);
        Ok(())
    }

    pub fn load_str(&mut self, text: &str) -> SessionResult<()> {
        let tree = ingest_str(text, self.ids.as_mut())?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Awaits JSON from an external generator and loads it. Nothing changes unless both the
    /// generator and ingestion succeed.
    pub async fn ingest_generated<F, E>(&mut self, generated: F) -> SessionResult<()>
    where
        F: Future<Output = Result<String, E>>,
        E: std::fmt::Display,
    {
        let text = generated.await.map_err(|err| {
            tracing::debug!(%err, "concept generator failed");
            SessionError::Generator(err.to_string())
        })?;
        self.load_str(&text)
    }

    pub async fn generate_from<S>(&mut self, source: &S, topic: &str) -> SessionResult<()>
    where
        S: ConceptSource + ?Sized,
    {
        tracing::debug!(topic, "requesting generated concept tree");
        self.ingest_generated(source.generate(topic)).await
    }

    pub fn handle(&mut self, event: InteractionEvent) {
        self.interaction.apply(&event, &self.index);
    }

    /// Runs an edit through the mutation engine; the tree is only swapped when it applied.
    pub fn command(&mut self, command: NodeCommand) -> EditOutcome {
        let edit = route_command(&self.interaction, &self.tree, &command, self.ids.as_mut());
        tracing::debug!(node = command.target(), outcome = ?edit.outcome, "node command");
        if !edit.outcome.is_applied() {
            return edit.outcome;
        }
        self.install(edit.tree);
        let selection_gone = self
            .interaction
            .selected()
            .is_some_and(|id| !self.index.contains(id));
        let hover_gone = self
            .interaction
            .hovered
            .as_deref()
            .is_some_and(|id| !self.index.contains(id));
        if selection_gone || hover_gone {
            self.interaction
                .apply(&InteractionEvent::TreeReplaced, &self.index);
        }
        edit.outcome
    }

    pub fn annotations(&self) -> Annotations {
        annotate(&self.layout, &self.index, &self.interaction, self.scope)
    }

    /// SVG as seen through the session viewport.
    pub fn render_svg(&self) -> String {
        let options = SvgRenderOptions {
            viewport: Some(self.viewport.clone()),
            ..SvgRenderOptions::default()
        };
        self.render_svg_with(&options)
    }

    pub fn render_svg_with(&self, options: &SvgRenderOptions) -> String {
        render_svg(&self.layout, &self.annotations(), options)
    }

    pub fn outline_markdown(&self) -> String {
        export::to_markdown_outline(&self.tree)
    }

    pub fn to_json_string(&self, pretty: bool) -> SessionResult<String> {
        Ok(export::to_json_string(&self.tree, pretty)?)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
    }

    pub fn fit_view(&mut self) -> bool {
        self.viewport.fit_to_content(&self.layout.nodes)
    }

    pub fn zoom_wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        self.viewport.zoom_wheel(screen, delta_y)
    }

    /// Zoom buttons anchor on the selected node when there is one.
    pub fn zoom_step(&mut self, direction: ZoomDirection) -> bool {
        let anchor = self
            .interaction
            .selected()
            .and_then(|id| self.layout.node(id))
            .map(|n| point(n.x, n.y));
        self.viewport.zoom_step(direction, anchor)
    }

    pub fn begin_pan(&mut self, screen: Point) {
        self.pan.begin(screen);
    }

    pub fn pan_to(&mut self, screen: Point) {
        self.pan.move_to(screen);
    }

    /// Applies the pan accumulated since the last frame.
    pub fn flush_frame(&mut self) -> bool {
        self.pan.flush_frame(&mut self.viewport)
    }

    pub fn end_pan(&mut self) {
        self.pan.release(&mut self.viewport);
    }

    /// Returns `false` when `id` is not laid out.
    pub fn begin_node_drag(&mut self, id: &str, screen: Point) -> bool {
        let Some(node) = self.layout.node(id) else {
            return false;
        };
        self.drag = Some(NodeDrag::begin(node, screen));
        true
    }

    /// Moves the dragged node in the current layout only; the tree changes on release.
    pub fn drag_to(&mut self, screen: Point) -> Option<Point> {
        let zoom = self.viewport.state().zoom;
        let drag = self.drag.as_mut()?;
        let at = drag.update(screen, zoom);
        let id = drag.id().to_string();
        if let Some(node) = self.layout.nodes.iter_mut().find(|n| n.id == id) {
            node.x = at.x;
            node.y = at.y;
        }
        // Edges to the parent and children follow the node.
        let strategy = self.settings.strategy;
        let MindmapLayout { nodes, edges, .. } = &mut self.layout;
        for edge in edges.iter_mut().filter(|e| e.from == id || e.to == id) {
            let parent = nodes.iter().find(|n| n.id == edge.from);
            let child = nodes.iter().find(|n| n.id == edge.to);
            if let (Some(parent), Some(child)) = (parent, child) {
                edge.path = edge_path(strategy, parent, child);
            }
        }
        Some(at)
    }

    /// Commits the drag as a manual position. `None` when no drag was active.
    pub fn end_node_drag(&mut self) -> Option<EditOutcome> {
        let drag = self.drag.take()?;
        match drag.release() {
            Some(command) => Some(self.command(command)),
            None => Some(EditOutcome::Unchanged),
        }
    }

    fn install(&mut self, tree: ConceptTree) {
        self.layout = layout_with(&tree, &self.settings, &self.palette, &self.layout_options);
        self.index = TreeIndex::from_tree(&tree);
        self.tree = tree;
        tracing::trace!(
            strategy = self.settings.strategy.as_str(),
            nodes = self.layout.nodes.len(),
            edges = self.layout.edges.len(),
            "session layout refreshed"
        );
    }
}
