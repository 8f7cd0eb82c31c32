//! Top-down tidy tree.
//!
//! First walk (post-order): children are placed left to right at preliminary positions in the
//! parent's row frame, each one pushed right until its whole subtree clears the merged extent of
//! the siblings before it. The parent sits at the midpoint of its first and last child, and each
//! child keeps `modifier = prelim - natural` as its offset from the parent.
//!
//! Second walk (pre-order): `x = parent.x + modifier`, `y = level * row_spacing`, then the
//! whole drawing is translated so its horizontal extent is centered on `x = 0`.

use super::LayoutSettings;
use mindweave_core::ConceptTree;
use rustc_hash::FxHashMap;

pub(crate) fn place<'a>(
    tree: &'a ConceptTree,
    sizes: &FxHashMap<&str, (f64, f64)>,
    settings: &LayoutSettings,
) -> FxHashMap<&'a str, (f64, f64)> {
    let mut out: FxHashMap<&'a str, (f64, f64)> = FxHashMap::default();
    let order = tree.pre_order();
    let Some(&root) = order.first() else {
        return out;
    };
    let width = |id: &str| {
        sizes
            .get(id)
            .map(|(w, _)| *w)
            .unwrap_or(settings.node_width)
    };

    let mut modifier: FxHashMap<&str, f64> = FxHashMap::default();
    // Horizontal extent of each subtree relative to its own root's x.
    let mut extent: FxHashMap<&str, (f64, f64)> = FxHashMap::default();

    for &id in order.iter().rev() {
        let w = width(id);
        let children = tree.children_of(id);
        if children.is_empty() {
            extent.insert(id, (-w / 2.0, w / 2.0));
            continue;
        }

        let mut prelim: Vec<f64> = Vec::with_capacity(children.len());
        let mut merged_right = f64::NEG_INFINITY;
        for (i, child) in children.iter().enumerate() {
            let cw = width(child.as_str());
            let (left, right) = extent
                .get(child.as_str())
                .copied()
                .unwrap_or((-cw / 2.0, cw / 2.0));
            let mut x = 0.0;
            if i > 0 {
                let prev = &children[i - 1];
                x = prelim[i - 1] + (width(prev.as_str()) + cw) / 2.0 + settings.sibling_gap;
                let deficit = merged_right + settings.subtree_gap - (x + left);
                if deficit > 0.0 {
                    x += deficit;
                }
            }
            merged_right = merged_right.max(x + right);
            prelim.push(x);
        }

        let natural = (prelim[0] + prelim[prelim.len() - 1]) / 2.0;
        let (mut lo, mut hi) = (-w / 2.0, w / 2.0);
        for (child, p) in children.iter().zip(&prelim) {
            let m = p - natural;
            modifier.insert(child.as_str(), m);
            if let Some(&(l, r)) = extent.get(child.as_str()) {
                lo = lo.min(m + l);
                hi = hi.max(m + r);
            }
        }
        extent.insert(id, (lo, hi));
    }

    let shift = extent
        .get(root)
        .map(|(lo, hi)| -(lo + hi) / 2.0)
        .unwrap_or(0.0);

    let mut level: FxHashMap<&str, usize> = FxHashMap::default();
    level.insert(root, 0);
    out.insert(root, (shift, 0.0));
    for &id in &order {
        let (Some(&(px, _)), Some(&plevel)) = (out.get(id), level.get(id)) else {
            continue;
        };
        for child in tree.children_of(id) {
            let l = plevel + 1;
            let x = px + modifier.get(child.as_str()).copied().unwrap_or(0.0);
            level.insert(child.as_str(), l);
            out.insert(child.as_str(), (x, l as f64 * settings.row_spacing));
        }
    }

    tracing::trace!(nodes = out.len(), shift, "hierarchical placement");
    out
}
