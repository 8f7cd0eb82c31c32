//! Headless SVG output for a laid-out mind map.

pub(crate) mod util;

use crate::interaction::{Annotations, ControlKind, node_controls};
use crate::model::{Bounds, MindmapLayout, PositionedNode};
use crate::viewport::Viewport;
use std::fmt::Write as _;
use util::{escape_xml, escape_xml_into, fmt, fmt_into};

const SELECTED_STROKE: &str = "#10B981";
const ACTIVE_EDGE_STROKE: &str = "#34d399";
const EDGE_STROKE: &str = "#d1d5db";
const CONTROL_RADIUS: f64 = 14.0;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Extra space around the content bounds when no viewport is given.
    pub viewbox_padding: f64,
    /// Scopes the embedded stylesheet; defaults to `mindmap`.
    pub diagram_id: Option<String>,
    pub font_family: String,
    pub font_size: f64,
    /// Render as seen through this viewport: canvas-sized, panned/zoomed content group, and
    /// nodes outside the padded view culled.
    pub viewport: Option<Viewport>,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 20.0,
            diagram_id: None,
            font_family: r#""trebuchet ms",verdana,arial,sans-serif"#.to_string(),
            font_size: 14.0,
            viewport: None,
        }
    }
}

fn mindmap_css(diagram_id: &str, options: &SvgRenderOptions) -> String {
    let id = escape_xml(diagram_id);
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"#{id}{{font-family:{};font-size:{}px;}}#{id} .node text{{font-weight:600;pointer-events:none;user-select:none;}}#{id} .node .bold{{font-weight:800;}}#{id} .node .italic{{font-style:italic;}}#{id} .edge{{fill:none;stroke-width:2;}}#{id} .control text{{fill:#ffffff;font-weight:700;}}"#,
        escape_xml(&options.font_family),
        fmt(options.font_size),
    );
    out
}

fn control_style(kind: ControlKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        ControlKind::AddChild => ("add", "#22c55e", "+"),
        ControlKind::Rename => ("rename", "#3b82f6", "✎"),
        ControlKind::Delete => ("delete", "#ef4444", "×"),
    }
}

fn render_node(
    out: &mut String,
    node: &PositionedNode,
    annotations: &Annotations,
    line_height: f64,
) {
    let ann = annotations.node(&node.id);
    let selected = ann.is_some_and(|a| a.is_selected);

    out.push_str(r#"<g class="node"#);
    if node.is_root {
        out.push_str(" root");
    }
    if let Some(section) = node.section {
        let _ = write!(out, " section-{section}");
    }
    if let Some(a) = ann {
        for (flag, class) in [
            (a.is_selected, " selected"),
            (a.is_highlighted, " highlighted"),
            (a.is_dimmed, " dimmed"),
        ] {
            if flag {
                out.push_str(class);
            }
        }
    }
    out.push_str(r#"" data-id=""#);
    escape_xml_into(out, &node.id);
    out.push_str(r#"" transform="translate("#);
    fmt_into(out, node.x);
    out.push_str(", ");
    fmt_into(out, node.y);
    out.push_str(r#")" opacity=""#);
    fmt_into(out, ann.map(|a| a.opacity).unwrap_or(1.0));
    out.push_str(r#"">"#);

    let (w, h) = (node.width, node.height);
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill=""#,
        fmt(-w / 2.0),
        fmt(-h / 2.0),
        fmt(w),
        fmt(h),
        fmt(h / 2.0),
    );
    escape_xml_into(out, &node.color);
    if selected {
        let _ = write!(out, r#"" stroke="{SELECTED_STROKE}" stroke-width="2.5"/>"#);
    } else {
        out.push_str(r##"" stroke="#0000001a" stroke-width="1"/>"##);
    }

    out.push_str(r#"<text text-anchor="middle" dominant-baseline="central""#);
    let mut classes: Vec<&str> = Vec::new();
    if node.style.is_bold {
        classes.push("bold");
    }
    if node.style.is_italic {
        classes.push("italic");
    }
    if !classes.is_empty() {
        let _ = write!(out, r#" class="{}""#, classes.join(" "));
    }
    out.push_str(r#" fill=""#);
    escape_xml_into(out, &node.text_color);
    out.push_str(r#"">"#);
    let n = node.lines.len();
    for (i, line) in node.lines.iter().enumerate() {
        let y = i as f64 * line_height - (n as f64 - 1.0) * line_height / 2.0;
        out.push_str(r#"<tspan x="0" y=""#);
        fmt_into(out, y);
        out.push_str(r#"">"#);
        escape_xml_into(out, line);
        out.push_str("</tspan>");
    }
    out.push_str("</text>");

    if selected {
        for control in node_controls(node) {
            let (class, fill, glyph) = control_style(control.kind);
            let _ = write!(
                out,
                r#"<g class="control {class}" transform="translate({}, {})"><circle r="{}" fill="{fill}"/><text text-anchor="middle" dominant-baseline="middle">{glyph}</text></g>"#,
                fmt(control.dx),
                fmt(control.dy),
                fmt(CONTROL_RADIUS),
            );
        }
    }
    out.push_str("</g>");
}

/// Renders edges then nodes, so nodes paint over the curves.
pub fn render_svg(
    layout: &MindmapLayout,
    annotations: &Annotations,
    options: &SvgRenderOptions,
) -> String {
    let diagram_id = options.diagram_id.as_deref().unwrap_or("mindmap");
    let mut out = String::new();

    let (view_box, width, height, transform, nodes) = match &options.viewport {
        Some(vp) => {
            let size = vp.size();
            (
                format!("0 0 {} {}", fmt(size.width), fmt(size.height)),
                size.width,
                size.height,
                Some(vp.state().to_svg_transform()),
                vp.cull_visible(&layout.nodes),
            )
        }
        None => {
            let pad = options.viewbox_padding;
            let b = layout.bounds.unwrap_or(Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
            });
            let (w, h) = (b.width() + pad * 2.0, b.height() + pad * 2.0);
            (
                format!(
                    "{} {} {} {}",
                    fmt(b.min_x - pad),
                    fmt(b.min_y - pad),
                    fmt(w),
                    fmt(h)
                ),
                w,
                h,
                None,
                layout.nodes.iter().collect(),
            )
        }
    };

    let _ = write!(
        &mut out,
        r#"<svg id="{}" xmlns="http://www.w3.org/2000/svg" class="mindweave" width="{}" height="{}" viewBox="{}" role="graphics-document document" aria-roledescription="mindmap">"#,
        escape_xml(diagram_id),
        fmt(width),
        fmt(height),
        view_box,
    );
    let _ = write!(&mut out, "<style>{}</style>", mindmap_css(diagram_id, options));

    match &transform {
        Some(t) => {
            let _ = write!(&mut out, r#"<g class="content" transform="{t}">"#);
        }
        None => out.push_str(r#"<g class="content">"#),
    }

    out.push_str(r#"<g class="edges">"#);
    for edge in &layout.edges {
        let ann = annotations.edge(&edge.id);
        let active = ann.is_some_and(|a| a.is_active);
        out.push_str(r#"<path class="edge"#);
        if let Some(section) = edge.section {
            let _ = write!(&mut out, " section-{section}");
        }
        if active {
            out.push_str(" active");
        }
        out.push_str(r#"" data-id=""#);
        escape_xml_into(&mut out, &edge.id);
        let _ = write!(
            &mut out,
            r#"" d="{}" stroke="{}" opacity="{}"/>"#,
            edge.path,
            if active { ACTIVE_EDGE_STROKE } else { EDGE_STROKE },
            fmt(ann.map(|a| a.opacity).unwrap_or(1.0)),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in nodes {
        render_node(&mut out, node, annotations, layout.line_height);
    }
    out.push_str("</g></g></svg>\n");
    out
}
