//! Tree layout for concept maps.
//!
//! Sizing and coloring are shared; [`hierarchical`] and [`radial`] only decide node centers.

pub mod hierarchical;
pub mod radial;


use crate::model::{Bounds, LayoutEdge, MindmapLayout, PositionedNode};
use crate::svg::util::fmt;
use crate::{Error, LayoutOptions, Result};
use mindweave_core::{ConceptTree, MindmapConfig};
use rustc_hash::FxHashMap;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    #[default]
    Hierarchical,
    Radial,
}

impl LayoutStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hierarchical" | "tree" => Some(Self::Hierarchical),
            "radial" => Some(Self::Radial),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Radial => "radial",
        }
    }
}

/// Typed view of the `layout.*` config keys.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub strategy: LayoutStrategy,
    pub node_width: f64,
    pub base_height: f64,
    pub vertical_padding: f64,
    /// Horizontal space reserved inside the node box; labels wrap at `node_width - label_inset`.
    pub label_inset: f64,
    pub row_spacing: f64,
    pub sibling_gap: f64,
    pub subtree_gap: f64,
    pub root_radius: f64,
    pub level_radius: f64,
    pub sector_shrink: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::Hierarchical,
            node_width: 150.0,
            base_height: 50.0,
            vertical_padding: 24.0,
            label_inset: 20.0,
            row_spacing: 120.0,
            sibling_gap: 24.0,
            subtree_gap: 24.0,
            root_radius: 200.0,
            level_radius: 160.0,
            sector_shrink: 0.8,
        }
    }
}

fn non_negative(config: &MindmapConfig, key: &str, fallback: f64) -> Result<f64> {
    match config.get(key) {
        None => Ok(fallback),
        Some(_) => match config.get_f64(key) {
            Some(v) if v >= 0.0 => Ok(v),
            _ => Err(Error::InvalidConfig {
                key: key.to_string(),
                message: "expected a non-negative number".to_string(),
            }),
        },
    }
}

impl LayoutSettings {
    pub fn from_config(config: &MindmapConfig) -> Result<Self> {
        let d = Self::default();
        let strategy = match config.get("layout.strategy") {
            None => d.strategy,
            Some(v) => v
                .as_str()
                .and_then(LayoutStrategy::parse)
                .ok_or_else(|| Error::InvalidConfig {
                    key: "layout.strategy".to_string(),
                    message: format!("unknown layout strategy {v}"),
                })?,
        };
        let sector_shrink = non_negative(config, "layout.sectorShrink", d.sector_shrink)?;
        if sector_shrink > 1.0 {
            return Err(Error::InvalidConfig {
                key: "layout.sectorShrink".to_string(),
                message: "must be at most 1".to_string(),
            });
        }
        Ok(Self {
            strategy,
            node_width: non_negative(config, "layout.nodeWidth", d.node_width)?.max(1.0),
            base_height: non_negative(config, "layout.baseHeight", d.base_height)?,
            vertical_padding: non_negative(config, "layout.verticalPadding", d.vertical_padding)?,
            label_inset: non_negative(config, "layout.labelInset", d.label_inset)?,
            row_spacing: non_negative(config, "layout.rowSpacing", d.row_spacing)?,
            sibling_gap: non_negative(config, "layout.siblingGap", d.sibling_gap)?,
            subtree_gap: non_negative(config, "layout.subtreeGap", d.subtree_gap)?,
            root_radius: non_negative(config, "layout.rootRadius", d.root_radius)?,
            level_radius: non_negative(config, "layout.levelRadius", d.level_radius)?,
            sector_shrink,
        })
    }

    pub fn label_width(&self) -> f64 {
        (self.node_width - self.label_inset).max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub fill: String,
    pub text: String,
}

impl Swatch {
    fn new(fill: &str, text: &str) -> Self {
        Self {
            fill: fill.to_string(),
            text: text.to_string(),
        }
    }

    fn from_value(v: &Value) -> Option<Self> {
        Some(Self::new(
            v.get("fill")?.as_str()?,
            v.get("text")?.as_str()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub root: Swatch,
    pub neutral: Swatch,
    /// Cycled over the root's children.
    pub sections: Vec<Swatch>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&MindmapConfig::default())
    }
}

impl Palette {
    /// Malformed entries fall back to the neutral swatch rather than failing the layout.
    pub fn from_config(config: &MindmapConfig) -> Self {
        let neutral = config
            .get("palette.neutral")
            .and_then(Swatch::from_value)
            .unwrap_or_else(|| Swatch::new("#f1f5f9", "#1e293b"));
        let root = config
            .get("palette.root")
            .and_then(Swatch::from_value)
            .unwrap_or_else(|| neutral.clone());
        let sections = config
            .get("palette.sections")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Swatch::from_value).collect())
            .unwrap_or_default();
        Self {
            root,
            neutral,
            sections,
        }
    }

    pub fn swatch_for(&self, level: usize, section: Option<usize>) -> &Swatch {
        match (level, section) {
            (0, _) => &self.root,
            (1, Some(idx)) if !self.sections.is_empty() => {
                &self.sections[idx % self.sections.len()]
            }
            _ => &self.neutral,
        }
    }
}

/// Depth and depth-1 section for every node, keyed by id.
pub(crate) fn assign_sections<'a>(
    tree: &'a ConceptTree,
) -> FxHashMap<&'a str, (usize, Option<usize>)> {
    let mut out: FxHashMap<&str, (usize, Option<usize>)> = FxHashMap::default();
    let Some(root) = tree.root_id() else {
        return out;
    };
    out.insert(root, (0, None));
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(&(level, section)) = out.get(id) else {
            continue;
        };
        for (idx, child) in tree.children_of(id).iter().enumerate() {
            let child_section = if level == 0 { Some(idx) } else { section };
            out.insert(child.as_str(), (level + 1, child_section));
            stack.push(child.as_str());
        }
    }
    out
}

pub fn layout_tree(
    tree: &ConceptTree,
    config: &MindmapConfig,
    options: &LayoutOptions,
) -> Result<MindmapLayout> {
    let settings = LayoutSettings::from_config(config)?;
    let palette = Palette::from_config(config);
    Ok(layout_with(tree, &settings, &palette, options))
}

/// Same as [`layout_tree`] for callers that already hold typed settings.
pub fn layout_with(
    tree: &ConceptTree,
    settings: &LayoutSettings,
    palette: &Palette,
    options: &LayoutOptions,
) -> MindmapLayout {
    let measurer = options.text_measurer.as_ref();
    let line_height = measurer.line_height();
    let order = tree.pre_order();
    if order.is_empty() {
        return MindmapLayout::empty(line_height);
    }

    let levels = assign_sections(tree);
    let mut sizes: FxHashMap<&str, (f64, f64)> = FxHashMap::default();
    let mut wrapped: FxHashMap<&str, Vec<String>> = FxHashMap::default();
    for &id in &order {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let lines = measurer.wrap_lines(node.concept(), settings.label_width());
        let height = settings
            .base_height
            .max(lines.len() as f64 * line_height + settings.vertical_padding);
        sizes.insert(id, (settings.node_width, height));
        wrapped.insert(id, lines);
    }

    let mut centers = match settings.strategy {
        LayoutStrategy::Hierarchical => hierarchical::place(tree, &sizes, settings),
        LayoutStrategy::Radial => radial::place(tree, settings),
    };

    if settings.strategy == LayoutStrategy::Hierarchical {
        for &id in &order {
            if let Some(pos) = tree.get(id).and_then(|n| n.manual_position()) {
                centers.insert(id, (pos.x, pos.y));
            }
        }
    }

    let mut nodes: Vec<PositionedNode> = Vec::with_capacity(order.len());
    for &id in &order {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let (level, section) = levels.get(id).copied().unwrap_or((0, None));
        let (width, height) = sizes.get(id).copied().unwrap_or((settings.node_width, 0.0));
        let (x, y) = centers.get(id).copied().unwrap_or((0.0, 0.0));
        let swatch = palette.swatch_for(level, section);
        let style = node.style().clone();
        nodes.push(PositionedNode {
            id: id.to_string(),
            concept: node.concept().to_string(),
            x,
            y,
            width,
            height,
            lines: wrapped.remove(id).unwrap_or_default(),
            color: style.color.clone().unwrap_or_else(|| swatch.fill.clone()),
            text_color: style
                .text_color
                .clone()
                .unwrap_or_else(|| swatch.text.clone()),
            style,
            level,
            is_root: node.is_root(),
            section,
            parent: node.parent().map(str::to_string),
        });
    }

    let index: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let mut edges: Vec<LayoutEdge> = Vec::with_capacity(nodes.len().saturating_sub(1));
    for child in &nodes {
        let Some(parent) = child.parent.as_deref().and_then(|p| index.get(p)) else {
            continue;
        };
        let parent = &nodes[*parent];
        let path = edge_path(settings.strategy, parent, child);
        edges.push(LayoutEdge {
            id: format!("edge-{}-{}", parent.id, child.id),
            from: parent.id.clone(),
            to: child.id.clone(),
            section: child.section,
            path,
        });
    }

    let bounds = Bounds::of_nodes(&nodes);
    tracing::debug!(
        strategy = settings.strategy.as_str(),
        nodes = nodes.len(),
        edges = edges.len(),
        "mindmap layout"
    );
    MindmapLayout {
        nodes,
        edges,
        bounds,
        line_height,
    }
}

/// SVG path of the edge from `parent` to `child` in the curve style of `strategy`.
pub fn edge_path(
    strategy: LayoutStrategy,
    parent: &PositionedNode,
    child: &PositionedNode,
) -> String {
    match strategy {
        LayoutStrategy::Hierarchical => vertical_curve(parent, child),
        LayoutStrategy::Radial => quadratic_curve(parent, child),
    }
}

/// Cubic from the parent's bottom edge to the child's top edge with vertical tangents.
fn vertical_curve(parent: &PositionedNode, child: &PositionedNode) -> String {
    let (sx, sy) = (parent.x, parent.y + parent.height / 2.0);
    let (tx, ty) = (child.x, child.y - child.height / 2.0);
    let my = (sy + ty) / 2.0;
    format!(
        "M{},{} C{},{} {},{} {},{}",
        fmt(sx),
        fmt(sy),
        fmt(sx),
        fmt(my),
        fmt(tx),
        fmt(my),
        fmt(tx),
        fmt(ty)
    )
}

/// Center-to-center quadratic bending through `(parent.x, child.y)`.
fn quadratic_curve(parent: &PositionedNode, child: &PositionedNode) -> String {
    format!(
        "M{} {} Q{} {} {} {}",
        fmt(parent.x),
        fmt(parent.y),
        fmt(parent.x),
        fmt(child.y),
        fmt(child.x),
        fmt(child.y)
    )
}
