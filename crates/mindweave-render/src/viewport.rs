//! Pan/zoom state of the canvas and the math that maps between screen and world space.
//!
//! Screen space is the canvas pixel grid (origin top-left); world space is the layout's
//! coordinate system. `screen = world * zoom + pan`.

use crate::geom::{Point, Size, Vector, point, size, vector};
use crate::model::{Bounds, PositionedNode};
use crate::{Error, Result};
use mindweave_core::MindmapConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier per wheel notch.
    pub wheel_factor: f64,
    /// Zoom multiplier per zoom-button press.
    pub button_factor: f64,
    pub fit_padding: f64,
    /// Extra screen-space margin around the canvas kept when culling.
    pub cull_margin: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 2.0,
            wheel_factor: 1.1,
            button_factor: 1.2,
            fit_padding: 100.0,
            cull_margin: 100.0,
        }
    }
}

impl ViewportConfig {
    pub fn from_config(config: &MindmapConfig) -> Result<Self> {
        let d = Self::default();
        let read = |key: &str, fallback: f64| -> Result<f64> {
            match config.get(key) {
                None => Ok(fallback),
                Some(_) => config.get_f64(key).ok_or_else(|| Error::InvalidConfig {
                    key: key.to_string(),
                    message: "expected a number".to_string(),
                }),
            }
        };
        let out = Self {
            min_zoom: read("viewport.minZoom", d.min_zoom)?,
            max_zoom: read("viewport.maxZoom", d.max_zoom)?,
            wheel_factor: read("viewport.wheelFactor", d.wheel_factor)?,
            button_factor: read("viewport.buttonFactor", d.button_factor)?,
            fit_padding: read("viewport.fitPadding", d.fit_padding)?,
            cull_margin: read("viewport.cullMargin", d.cull_margin)?,
        };
        if !(out.min_zoom > 0.0 && out.min_zoom <= out.max_zoom) {
            return Err(Error::InvalidConfig {
                key: "viewport.minZoom".to_string(),
                message: format!(
                    "zoom range [{}, {}] is empty or not positive",
                    out.min_zoom, out.max_zoom
                ),
            });
        }
        for (key, factor) in [
            ("viewport.wheelFactor", out.wheel_factor),
            ("viewport.buttonFactor", out.button_factor),
        ] {
            if factor <= 1.0 {
                return Err(Error::InvalidConfig {
                    key: key.to_string(),
                    message: "zoom factors must be greater than 1".to_string(),
                });
            }
        }
        Ok(out)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewState {
    pub fn pan(&self) -> Vector {
        vector(self.pan_x, self.pan_y)
    }

    /// SVG `transform` attribute value for the content group.
    pub fn to_svg_transform(&self) -> String {
        use crate::svg::util::fmt;
        format!(
            "translate({}, {}) scale({})",
            fmt(self.pan_x),
            fmt(self.pan_y),
            fmt(self.zoom)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    state: ViewState,
    size: Size,
    config: ViewportConfig,
}

impl Viewport {
    pub fn new(width: f64, height: f64, config: ViewportConfig) -> Self {
        Self {
            state: ViewState::default(),
            size: size(width.max(0.0), height.max(0.0)),
            config,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Replaces the view; zoom is clamped into the configured range.
    pub fn set_state(&mut self, state: ViewState) {
        self.state = ViewState {
            zoom: self.config.clamp_zoom(state.zoom),
            ..state
        };
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = size(width.max(0.0), height.max(0.0));
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn center(&self) -> Point {
        point(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.state.pan_x += dx;
        self.state.pan_y += dy;
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        let z = self.state.zoom;
        point(
            (screen.x - self.state.pan_x) / z,
            (screen.y - self.state.pan_y) / z,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        let z = self.state.zoom;
        point(
            world.x * z + self.state.pan_x,
            world.y * z + self.state.pan_y,
        )
    }

    /// Multiplies (`In`) or divides (`Out`) the zoom by `factor`, keeping the world point under
    /// `screen` fixed. Returns `false` when the clamp leaves the zoom unchanged.
    pub fn zoom_at_point(&mut self, screen: Point, direction: ZoomDirection, factor: f64) -> bool {
        let old = self.state.zoom;
        let wanted = match direction {
            ZoomDirection::In => old * factor,
            ZoomDirection::Out => old / factor,
        };
        let zoom = self.config.clamp_zoom(wanted);
        if zoom == old || !zoom.is_finite() {
            return false;
        }
        let world = self.screen_to_world(screen);
        self.state = ViewState {
            pan_x: screen.x - world.x * zoom,
            pan_y: screen.y - world.y * zoom,
            zoom,
        };
        true
    }

    /// Wheel zoom at the cursor: scrolling up (`delta_y < 0`) zooms in. A zero delta is ignored.
    pub fn zoom_wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        let direction = if delta_y < 0.0 {
            ZoomDirection::In
        } else if delta_y > 0.0 {
            ZoomDirection::Out
        } else {
            return false;
        };
        self.zoom_at_point(screen, direction, self.config.wheel_factor)
    }

    /// Zoom-button step anchored on `target` (a world point, usually the selected node), or on
    /// the canvas center when there is none.
    pub fn zoom_step(&mut self, direction: ZoomDirection, target: Option<Point>) -> bool {
        let anchor = target
            .map(|w| self.world_to_screen(w))
            .unwrap_or_else(|| self.center());
        self.zoom_at_point(anchor, direction, self.config.button_factor)
    }

    /// Centers `nodes` in the canvas, zooming out to fit but never in past 1.0.
    ///
    /// No-op when there is nothing to fit or the content box is degenerate.
    pub fn fit_to_content(&mut self, nodes: &[PositionedNode]) -> bool {
        let Some(b) = Bounds::of_nodes(nodes) else {
            return false;
        };
        let (bw, bh) = (b.width(), b.height());
        if bw <= 0.0 || bh <= 0.0 {
            return false;
        }
        let pad = self.config.fit_padding;
        let fit = ((self.size.width - pad) / bw)
            .min((self.size.height - pad) / bh)
            .min(1.0);
        let zoom = self.config.clamp_zoom(fit);
        let (cx, cy) = b.center();
        self.state = ViewState {
            pan_x: self.size.width / 2.0 - cx * zoom,
            pan_y: self.size.height / 2.0 - cy * zoom,
            zoom,
        };
        tracing::trace!(zoom, pan_x = self.state.pan_x, pan_y = self.state.pan_y, "fit view");
        true
    }

    /// World-space rectangle covered by the canvas grown by `margin` screen pixels on each side.
    pub fn visible_world_rect(&self, margin: f64) -> Bounds {
        let z = self.state.zoom;
        let min_x = (-self.state.pan_x - margin) / z;
        let min_y = (-self.state.pan_y - margin) / z;
        Bounds {
            min_x,
            min_y,
            max_x: min_x + (self.size.width + margin * 2.0) / z,
            max_y: min_y + (self.size.height + margin * 2.0) / z,
        }
    }

    /// Nodes whose box intersects the padded visible rectangle, in input order. Nothing is
    /// visible before the canvas has a size.
    pub fn cull_visible<'a>(&self, nodes: &'a [PositionedNode]) -> Vec<&'a PositionedNode> {
        if self.size.width <= 0.0 {
            return Vec::new();
        }
        let view = self.visible_world_rect(self.config.cull_margin);
        nodes
            .iter()
            .filter(|n| n.bounds().intersects(&view))
            .collect()
    }
}

/// Accumulates background-drag motion between animation frames.
///
/// Every pointer move adds to the pending delta; [`PanCoalescer::flush_frame`] applies the sum
/// once per frame. Releasing the pointer flushes whatever is still pending.
#[derive(Debug, Clone, Default)]
pub struct PanCoalescer {
    last: Option<Point>,
    pending: Vector,
}

impl PanCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, at: Point) {
        self.last = Some(at);
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Records pointer motion; ignored unless a drag is in progress.
    pub fn move_to(&mut self, at: Point) {
        let Some(last) = self.last else {
            return;
        };
        self.pending += at - last;
        self.last = Some(at);
    }

    pub fn push_delta(&mut self, dx: f64, dy: f64) {
        self.pending += vector(dx, dy);
    }

    pub fn pending(&self) -> Vector {
        self.pending
    }

    /// Applies the accumulated delta. Returns `false` when there was nothing to apply.
    pub fn flush_frame(&mut self, viewport: &mut Viewport) -> bool {
        if self.pending == Vector::zero() {
            return false;
        }
        viewport.pan(self.pending.x, self.pending.y);
        self.pending = Vector::zero();
        true
    }

    pub fn release(&mut self, viewport: &mut Viewport) {
        self.flush_frame(viewport);
        self.last = None;
    }
}
