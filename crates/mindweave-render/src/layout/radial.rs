//! Radial placement: the root at the origin, each child on a ring around its parent, inside the
//! angular sector its parent handed down.

use super::LayoutSettings;
use mindweave_core::ConceptTree;
use rustc_hash::FxHashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Angular range (radians) a node distributes among its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub sweep: f64,
}

impl Sector {
    pub fn end(&self) -> f64 {
        self.start + self.sweep
    }

    /// Angle of child `i` of `n`: the middle of its equal share.
    pub fn child_angle(&self, i: usize, n: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.sweep / n as f64
    }

    /// The sector handed to child `i` of `n`, shrunk around its angle so siblings never touch.
    pub fn child_sector(&self, i: usize, n: usize, shrink: f64) -> Sector {
        let share = self.sweep / n as f64;
        let sweep = share * shrink;
        Sector {
            start: self.child_angle(i, n) - sweep / 2.0,
            sweep,
        }
    }
}

/// Full circle starting straight up.
pub const ROOT_SECTOR: Sector = Sector {
    start: -FRAC_PI_2,
    sweep: TAU,
};

/// Sector of every node, root first. Empty trees have none.
pub fn sectors(tree: &ConceptTree, settings: &LayoutSettings) -> FxHashMap<String, Sector> {
    let mut out: FxHashMap<String, Sector> = FxHashMap::default();
    for (id, _, sector) in walk(tree, settings) {
        out.insert(id.to_string(), sector);
    }
    out
}

pub(crate) fn place<'a>(
    tree: &'a ConceptTree,
    settings: &LayoutSettings,
) -> FxHashMap<&'a str, (f64, f64)> {
    walk(tree, settings)
        .into_iter()
        .map(|(id, pos, _)| (id, pos))
        .collect()
}

fn walk<'a>(
    tree: &'a ConceptTree,
    settings: &LayoutSettings,
) -> Vec<(&'a str, (f64, f64), Sector)> {
    let mut out = Vec::with_capacity(tree.len());
    let Some(root) = tree.root_id() else {
        return out;
    };
    let root_ring = settings.node_width.max(settings.root_radius);
    let inner_ring = settings.node_width.max(settings.level_radius);

    let mut stack: Vec<(&'a str, (f64, f64), Sector)> = vec![(root, (0.0, 0.0), ROOT_SECTOR)];
    while let Some((id, (px, py), sector)) = stack.pop() {
        out.push((id, (px, py), sector));
        let children = tree.children_of(id);
        let n = children.len();
        let radius = if tree.parent_of(id).is_none() {
            root_ring
        } else {
            inner_ring
        };
        for (i, child) in children.iter().enumerate().rev() {
            let angle = sector.child_angle(i, n);
            let pos = (px + radius * angle.cos(), py + radius * angle.sin());
            stack.push((
                child.as_str(),
                pos,
                sector.child_sector(i, n, settings.sector_shrink),
            ));
        }
    }
    tracing::trace!(nodes = out.len(), "radial placement");
    out
}
