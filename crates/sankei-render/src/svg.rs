use crate::model::SankeyDiagramLayout;
use crate::{Error, Result};
use std::fmt::Write as _;

/// Fixed output canvas. Layout geometry is centered inside it, below the
/// title band when a title is present.
pub const CANVAS_WIDTH: f64 = 1000.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const FONT_SIZE: f64 = 16.0;

const TITLE_BAND: f64 = 40.0;
const LABEL_GAP: f64 = 6.0;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    pub title: Option<String>,
}

/// Renders a laid-out diagram to an SVG document.
///
/// `colors` and `display_labels` are per-node sequences in node-index order;
/// link strokes inherit the source node's color.
pub fn render_sankey_svg(
    layout: &SankeyDiagramLayout,
    colors: &[String],
    display_labels: &[String],
    options: &SvgRenderOptions,
) -> Result<String> {
    if colors.len() != layout.nodes.len() {
        return Err(Error::InvalidGraph {
            message: format!(
                "{} colors for {} nodes",
                colors.len(),
                layout.nodes.len()
            ),
        });
    }
    if display_labels.len() != layout.nodes.len() {
        return Err(Error::InvalidGraph {
            message: format!(
                "{} labels for {} nodes",
                display_labels.len(),
                layout.nodes.len()
            ),
        });
    }

    let tx = (CANVAS_WIDTH - layout.width) / 2.0;
    let top = if options.title.is_some() {
        TITLE_BAND
    } else {
        0.0
    };
    let ty = top + (CANVAS_HEIGHT - top - layout.height) / 2.0;

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" role="graphics-document document" aria-roledescription="sankey">"#,
        w = fmt(CANVAS_WIDTH),
        h = fmt(CANVAS_HEIGHT),
    );
    let _ = write!(
        &mut out,
        r#"<rect width="{w}" height="{h}" fill="white"/>"#,
        w = fmt(CANVAS_WIDTH),
        h = fmt(CANVAS_HEIGHT),
    );

    if let Some(title) = &options.title {
        let _ = write!(
            &mut out,
            r#"<text class="title" x="{x}" y="{y}" text-anchor="middle" font-size="{fs}" font-weight="bold">{text}</text>"#,
            x = fmt(CANVAS_WIDTH / 2.0),
            y = fmt(TITLE_BAND * 0.65),
            fs = fmt(FONT_SIZE),
            text = escape_xml(title),
        );
    }

    let _ = write!(
        &mut out,
        r#"<g transform="translate({tx},{ty})">"#,
        tx = fmt(tx),
        ty = fmt(ty),
    );

    out.push_str(r#"<g class="links" fill="none">"#);
    for link in &layout.links {
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        let sx = source.x1;
        let ex = target.x0;
        let mx = (sx + ex) / 2.0;
        let path_d = format!(
            "M{sx},{y0}C{mx},{y0},{mx},{y1},{ex},{y1}",
            sx = fmt(sx),
            y0 = fmt(link.y0),
            mx = fmt(mx),
            y1 = fmt(link.y1),
            ex = fmt(ex),
        );
        let _ = write!(
            &mut out,
            r#"<path class="link" d="{d}" stroke="{stroke}" stroke-width="{sw}"/>"#,
            d = path_d,
            stroke = escape_xml(&colors[link.source]),
            sw = fmt(link.width.max(1.0)),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for (node, color) in layout.nodes.iter().zip(colors) {
        let _ = write!(
            &mut out,
            r#"<rect class="node" x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}" stroke="black" stroke-width="0.5"/>"#,
            x = fmt(node.x0),
            y = fmt(node.y0),
            w = fmt(node.x1 - node.x0),
            h = fmt(node.y1 - node.y0),
            fill = escape_xml(color),
        );
    }
    out.push_str("</g>");

    let _ = write!(
        &mut out,
        r#"<g class="node-labels" font-size="{fs}">"#,
        fs = fmt(FONT_SIZE),
    );
    for (node, label) in layout.nodes.iter().zip(display_labels) {
        let y = (node.y0 + node.y1) / 2.0;
        let (x, anchor) = if node.x0 < layout.width / 2.0 {
            (node.x1 + LABEL_GAP, "start")
        } else {
            (node.x0 - LABEL_GAP, "end")
        };
        let _ = write!(
            &mut out,
            r#"<text x="{x}" y="{y}" dy="0.35em" text-anchor="{anchor}">{text}</text>"#,
            x = fmt(x),
            y = fmt(y),
            anchor = anchor,
            text = escape_xml(label),
        );
    }
    out.push_str("</g>");

    out.push_str("</g></svg>");
    Ok(out)
}

/// Stringifies a coordinate the way D3 would: round-trippable decimal form,
/// with `-0` and tiny float noise flattened away.
fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    format!("{v}")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
