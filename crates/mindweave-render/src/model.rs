use crate::geom::{Box2D, centered_box};
use mindweave_core::NodeStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Union of the boxes of `nodes`; `None` when there are no nodes.
    pub fn of_nodes<'a>(nodes: impl IntoIterator<Item = &'a PositionedNode>) -> Option<Self> {
        Self::from_points(nodes.into_iter().flat_map(|n| {
            let b = n.bbox();
            [(b.min.x, b.min.y), (b.max.x, b.max.y)]
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

/// A laid-out concept node. `x`/`y` are the box center in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub concept: String,
    pub style: NodeStyle,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Wrapped label.
    pub lines: Vec<String>,
    pub color: String,
    pub text_color: String,
    pub level: usize,
    pub is_root: bool,
    /// Index of the depth-1 ancestor among the root's children; `None` for the root.
    pub section: Option<usize>,
    pub parent: Option<String>,
}

impl PositionedNode {
    pub fn bbox(&self) -> Box2D {
        centered_box(self.x, self.y, self.width, self.height)
    }

    pub fn bounds(&self) -> Bounds {
        let b = self.bbox();
        Bounds {
            min_x: b.min.x,
            min_y: b.min.y,
            max_x: b.max.x,
            max_y: b.max.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub section: Option<usize>,
    /// SVG path data in world units.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapLayout {
    /// Pre-order.
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Option<Bounds>,
    /// Label line spacing the node heights were computed with.
    pub line_height: f64,
}

impl MindmapLayout {
    pub fn empty(line_height: f64) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            bounds: None,
            line_height,
        }
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
