use crate::model::{Bounds, SankeyDiagramLayout, SankeyLinkLayout, SankeyNodeLayout};
use crate::{Error, Result};
use sankei_core::FlowGraph;
use std::cmp::Ordering;

/// Geometry of the flow area the diagram is packed into. The facade passes
/// the flow region of its fixed canvas; defaults leave room for labels and a
/// title band on a 1000×600 canvas.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 920.0,
            height: 520.0,
            node_width: 20.0,
            node_padding: 15.0,
        }
    }
}

const RELAX_ITERATIONS: usize = 6;

#[derive(Debug, Clone, Default)]
struct NodeGeom {
    out_links: Vec<usize>,
    in_links: Vec<usize>,
    value: f64,
    depth: usize,
    layer: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

#[derive(Debug, Clone)]
struct LinkGeom {
    index: usize,
    source: usize,
    target: usize,
    value: f64,
    width: f64,
    y0: f64,
    y1: f64,
}

fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Breadth-first longest-path depth from the source side. Errors out on
/// cycles; a node can only be revisited more times than there are nodes when
/// the links loop back.
fn assign_depths(nodes: &mut [NodeGeom], links: &[LinkGeom]) -> Result<()> {
    let n = nodes.len();
    let mut current: Vec<usize> = (0..n).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut queued = vec![false; n];
    let mut depth = 0usize;
    while !current.is_empty() {
        for &ni in &current {
            nodes[ni].depth = depth;
            for &li in &nodes[ni].out_links {
                let target = links[li].target;
                if !queued[target] {
                    queued[target] = true;
                    next.push(target);
                }
            }
        }
        depth += 1;
        if depth > n {
            return Err(Error::CircularFlow);
        }
        current = std::mem::take(&mut next);
        queued.fill(false);
    }
    Ok(())
}

fn sort_out_links_by_target_y(node_y0: &[f64], links: &[LinkGeom], link_indices: &mut [usize]) {
    link_indices.sort_by(|&a, &b| {
        f64_cmp(node_y0[links[a].target], node_y0[links[b].target])
            .then_with(|| links[a].index.cmp(&links[b].index))
    });
}

fn sort_in_links_by_source_y(node_y0: &[f64], links: &[LinkGeom], link_indices: &mut [usize]) {
    link_indices.sort_by(|&a, &b| {
        f64_cmp(node_y0[links[a].source], node_y0[links[b].source])
            .then_with(|| links[a].index.cmp(&links[b].index))
    });
}

fn reorder_column_links(nodes: &mut [NodeGeom], links: &[LinkGeom], column: &[usize]) {
    let node_y0: Vec<f64> = nodes.iter().map(|n| n.y0).collect();
    for &ni in column {
        sort_out_links_by_target_y(&node_y0, links, &mut nodes[ni].out_links);
        sort_in_links_by_source_y(&node_y0, links, &mut nodes[ni].in_links);
    }
}

fn reorder_neighbor_links(nodes: &mut [NodeGeom], links: &[LinkGeom], node_idx: usize) {
    let node_y0: Vec<f64> = nodes.iter().map(|n| n.y0).collect();

    let in_links = nodes[node_idx].in_links.clone();
    for li in in_links {
        let source = links[li].source;
        sort_out_links_by_target_y(&node_y0, links, &mut nodes[source].out_links);
    }

    let out_links = nodes[node_idx].out_links.clone();
    for li in out_links {
        let target = links[li].target;
        sort_in_links_by_source_y(&node_y0, links, &mut nodes[target].in_links);
    }
}

/// Preferred y for `target`'s top edge as dictated by the band leaving
/// `source` towards it.
fn anchor_from_source(
    nodes: &[NodeGeom],
    links: &[LinkGeom],
    py: f64,
    source: usize,
    target: usize,
) -> f64 {
    let fan_out = nodes[source].out_links.len() as f64;
    let mut y = nodes[source].y0 - (fan_out - 1.0) * py / 2.0;
    for &li in &nodes[source].out_links {
        if links[li].target == target {
            break;
        }
        y += links[li].width + py;
    }
    for &li in &nodes[target].in_links {
        if links[li].source == source {
            break;
        }
        y -= links[li].width;
    }
    y
}

/// Preferred y for `source`'s top edge as dictated by the band arriving at
/// `target` from it.
fn anchor_from_target(
    nodes: &[NodeGeom],
    links: &[LinkGeom],
    py: f64,
    source: usize,
    target: usize,
) -> f64 {
    let fan_in = nodes[target].in_links.len() as f64;
    let mut y = nodes[target].y0 - (fan_in - 1.0) * py / 2.0;
    for &li in &nodes[target].in_links {
        if links[li].source == source {
            break;
        }
        y += links[li].width + py;
    }
    for &li in &nodes[source].out_links {
        if links[li].target == target {
            break;
        }
        y -= links[li].width;
    }
    y
}

fn push_down(nodes: &mut [NodeGeom], column: &[usize], py: f64, mut y: f64, mut i: isize, alpha: f64) {
    while i < column.len() as isize {
        let ni = column[i as usize];
        let dy = (y - nodes[ni].y0) * alpha;
        if dy > 1e-6 {
            nodes[ni].y0 += dy;
            nodes[ni].y1 += dy;
        }
        y = nodes[ni].y1 + py;
        i += 1;
    }
}

fn push_up(nodes: &mut [NodeGeom], column: &[usize], py: f64, mut y: f64, mut i: isize, alpha: f64) {
    while i >= 0 {
        let ni = column[i as usize];
        let dy = (nodes[ni].y1 - y) * alpha;
        if dy > 1e-6 {
            nodes[ni].y0 -= dy;
            nodes[ni].y1 -= dy;
        }
        y = nodes[ni].y0 - py;
        i -= 1;
    }
}

fn resolve_collisions(
    nodes: &mut [NodeGeom],
    column: &[usize],
    py: f64,
    top: f64,
    bottom: f64,
    alpha: f64,
) {
    if column.is_empty() {
        return;
    }
    let i = column.len() >> 1;
    let subject = column[i];
    push_up(nodes, column, py, nodes[subject].y0 - py, i as isize - 1, alpha);
    push_down(nodes, column, py, nodes[subject].y1 + py, i as isize + 1, alpha);
    push_up(nodes, column, py, bottom, column.len() as isize - 1, alpha);
    push_down(nodes, column, py, top, 0, alpha);
}

#[allow(clippy::too_many_arguments)]
fn relax_left_to_right(
    nodes: &mut [NodeGeom],
    links: &[LinkGeom],
    columns: &mut [Vec<usize>],
    py: f64,
    alpha: f64,
    beta: f64,
    top: f64,
    bottom: f64,
) {
    for i in 1..columns.len() {
        let column = &mut columns[i];
        for &target in column.iter() {
            let mut y = 0.0;
            let mut w = 0.0;
            for &li in &nodes[target].in_links {
                let source = links[li].source;
                let v = links[li].value * (nodes[target].layer as f64 - nodes[source].layer as f64);
                y += anchor_from_source(nodes, links, py, source, target) * v;
                w += v;
            }
            if !(w > 0.0) {
                continue;
            }
            let dy = (y / w - nodes[target].y0) * alpha;
            nodes[target].y0 += dy;
            nodes[target].y1 += dy;
            reorder_neighbor_links(nodes, links, target);
        }
        column.sort_by(|&a, &b| f64_cmp(nodes[a].y0, nodes[b].y0).then_with(|| a.cmp(&b)));
        resolve_collisions(nodes, column, py, top, bottom, beta);
    }
}

#[allow(clippy::too_many_arguments)]
fn relax_right_to_left(
    nodes: &mut [NodeGeom],
    links: &[LinkGeom],
    columns: &mut [Vec<usize>],
    py: f64,
    alpha: f64,
    beta: f64,
    top: f64,
    bottom: f64,
) {
    if columns.len() < 2 {
        return;
    }
    for i in (0..=(columns.len() - 2)).rev() {
        let column = &mut columns[i];
        for &source in column.iter() {
            let mut y = 0.0;
            let mut w = 0.0;
            for &li in &nodes[source].out_links {
                let target = links[li].target;
                let v = links[li].value * (nodes[target].layer as f64 - nodes[source].layer as f64);
                y += anchor_from_target(nodes, links, py, source, target) * v;
                w += v;
            }
            if !(w > 0.0) {
                continue;
            }
            let dy = (y / w - nodes[source].y0) * alpha;
            nodes[source].y0 += dy;
            nodes[source].y1 += dy;
            reorder_neighbor_links(nodes, links, source);
        }
        column.sort_by(|&a, &b| f64_cmp(nodes[a].y0, nodes[b].y0).then_with(|| a.cmp(&b)));
        resolve_collisions(nodes, column, py, top, bottom, beta);
    }
}

/// Computes node and link geometry for a flow graph inside the given area.
///
/// Columns are assigned by longest-path depth with sink nodes justified to
/// the last column, then vertical positions are settled by a fixed number of
/// alternating relaxation sweeps.
pub fn layout_sankey(graph: &FlowGraph, options: &LayoutOptions) -> Result<SankeyDiagramLayout> {
    let n = graph.node_count();
    for e in &graph.edges {
        if e.source >= n || e.target >= n {
            return Err(Error::InvalidGraph {
                message: format!(
                    "edge references node {} outside [0, {n})",
                    e.source.max(e.target)
                ),
            });
        }
    }

    let width = options.width.max(1.0);
    let height = options.height.max(1.0);
    let dx = options.node_width;

    let mut nodes: Vec<NodeGeom> = vec![NodeGeom::default(); n];
    let mut links: Vec<LinkGeom> = Vec::with_capacity(graph.edges.len());
    for (i, e) in graph.edges.iter().enumerate() {
        links.push(LinkGeom {
            index: i,
            source: e.source,
            target: e.target,
            value: e.value as f64,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
        });
        nodes[e.source].out_links.push(i);
        nodes[e.target].in_links.push(i);
    }

    for node in &mut nodes {
        let outgoing: f64 = node.out_links.iter().map(|&li| links[li].value).sum();
        let incoming: f64 = node.in_links.iter().map(|&li| links[li].value).sum();
        node.value = outgoing.max(incoming);
    }

    assign_depths(&mut nodes, &links)?;

    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let column_count = (max_depth + 1).max(1);
    let kx = if column_count <= 1 {
        0.0
    } else {
        (width - dx) / (column_count as f64 - 1.0)
    };

    // Justify alignment: sinks go to the last column, everything else sits at
    // its depth.
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
    for i in 0..nodes.len() {
        let layer = if nodes[i].out_links.is_empty() {
            column_count - 1
        } else {
            nodes[i].depth.min(column_count - 1)
        };
        nodes[i].layer = layer;
        nodes[i].x0 = layer as f64 * kx;
        nodes[i].x1 = nodes[i].x0 + dx;
        columns[layer].push(i);
    }

    let tallest = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let py = if tallest <= 1 {
        options.node_padding
    } else {
        options.node_padding.min(height / (tallest as f64 - 1.0))
    };

    let mut ky = f64::INFINITY;
    for col in &columns {
        if col.is_empty() {
            continue;
        }
        let total: f64 = col.iter().map(|&ni| nodes[ni].value).sum();
        if total <= 0.0 {
            continue;
        }
        let usable = height - (col.len() as f64 - 1.0) * py;
        ky = ky.min(usable / total);
    }
    if !ky.is_finite() {
        ky = 0.0;
    }

    // Initial vertical packing, centered per column.
    for col in &columns {
        let mut y = 0.0;
        for &ni in col {
            nodes[ni].y0 = y;
            nodes[ni].y1 = y + nodes[ni].value * ky;
            y = nodes[ni].y1 + py;
            for &li in &nodes[ni].out_links {
                links[li].width = links[li].value * ky;
            }
        }
        if !col.is_empty() {
            let offset = (height - y + py) / (col.len() as f64 + 1.0);
            for (i, &ni) in col.iter().enumerate() {
                let shift = offset * (i as f64 + 1.0);
                nodes[ni].y0 += shift;
                nodes[ni].y1 += shift;
            }
            reorder_column_links(&mut nodes, &links, col);
        }
    }

    let mut relax_columns = columns.clone();
    for i in 0..RELAX_ITERATIONS {
        let alpha = 0.99_f64.powi(i as i32);
        let beta = (1.0 - alpha).max((i as f64 + 1.0) / RELAX_ITERATIONS as f64);
        relax_right_to_left(
            &mut nodes,
            &links,
            &mut relax_columns,
            py,
            alpha,
            beta,
            0.0,
            height,
        );
        relax_left_to_right(
            &mut nodes,
            &links,
            &mut relax_columns,
            py,
            alpha,
            beta,
            0.0,
            height,
        );
    }

    // Stack band offsets along each node face.
    for node in &mut nodes {
        let mut y0 = node.y0;
        let mut y1 = node.y0;
        for &li in &node.out_links {
            links[li].y0 = y0 + links[li].width / 2.0;
            y0 += links[li].width;
        }
        for &li in &node.in_links {
            links[li].y1 = y1 + links[li].width / 2.0;
            y1 += links[li].width;
        }
    }

    let layout_nodes: Vec<SankeyNodeLayout> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| SankeyNodeLayout {
            label: graph.labels.get(i).cloned().unwrap_or_default(),
            index: i,
            layer: node.layer,
            value: node.value,
            x0: node.x0,
            x1: node.x1,
            y0: node.y0,
            y1: node.y1,
        })
        .collect();

    let layout_links: Vec<SankeyLinkLayout> = links
        .iter()
        .map(|l| SankeyLinkLayout {
            index: l.index,
            source: l.source,
            target: l.target,
            value: l.value,
            width: l.width,
            y0: l.y0,
            y1: l.y1,
        })
        .collect();

    Ok(SankeyDiagramLayout {
        bounds: Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        },
        width,
        height,
        node_width: dx,
        node_padding: py,
        nodes: layout_nodes,
        links: layout_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sankei_core::{FlowEdge, FlowGraph};

    fn graph(edges: &[(&str, &str, u64)]) -> FlowGraph {
        let edges: Vec<FlowEdge> = edges
            .iter()
            .map(|(s, t, v)| FlowEdge {
                source: (*s).to_string(),
                target: (*t).to_string(),
                value: *v,
            })
            .collect();
        FlowGraph::from_edges(&edges).unwrap()
    }

    #[test]
    fn two_stage_layout_splits_into_two_columns() {
        let g = graph(&[("A", "X", 3), ("A", "Y", 1), ("B", "X", 2)]);
        let layout = layout_sankey(&g, &LayoutOptions::default()).unwrap();

        assert_eq!(layout.nodes.len(), 4);
        assert_eq!(layout.links.len(), 3);

        let by_label = |l: &str| {
            layout
                .nodes
                .iter()
                .find(|n| n.label == l)
                .cloned()
                .unwrap()
        };
        assert_eq!(by_label("A").layer, 0);
        assert_eq!(by_label("B").layer, 0);
        assert_eq!(by_label("X").layer, 1);
        assert_eq!(by_label("Y").layer, 1);

        // Sources sit at the left edge, sinks at the right edge.
        assert_eq!(by_label("A").x0, 0.0);
        let opts = LayoutOptions::default();
        assert!((by_label("X").x1 - opts.width).abs() < 1e-9);
    }

    #[test]
    fn node_heights_are_proportional_to_flow() {
        let g = graph(&[("A", "X", 3), ("B", "X", 1)]);
        let layout = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        let h = |l: &str| {
            let n = layout.nodes.iter().find(|n| n.label == l).unwrap();
            n.y1 - n.y0
        };
        assert!((h("A") - 3.0 * h("B")).abs() < 1e-6);
        assert!((h("X") - h("A") - h("B")).abs() < 1e-6);
    }

    #[test]
    fn link_widths_match_values() {
        let g = graph(&[("A", "X", 2), ("A", "Y", 1)]);
        let layout = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        let wide = &layout.links[0];
        let narrow = &layout.links[1];
        assert!((wide.width - 2.0 * narrow.width).abs() < 1e-6);
    }

    #[test]
    fn nodes_stay_inside_the_area() {
        let g = graph(&[
            ("A", "M", 3),
            ("B", "M", 2),
            ("M", "X", 4),
            ("M", "Y", 1),
        ]);
        let opts = LayoutOptions::default();
        let layout = layout_sankey(&g, &opts).unwrap();
        for n in &layout.nodes {
            assert!(n.x0 >= -1e-6 && n.x1 <= opts.width + 1e-6);
            assert!(n.y0 >= -1e-6 && n.y1 <= opts.height + 1e-6, "{n:?}");
            assert!(n.y1 >= n.y0);
        }
    }

    #[test]
    fn middle_stage_gets_its_own_column() {
        let g = graph(&[("A", "M", 2), ("M", "Z", 2)]);
        let layout = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        let layer = |l: &str| layout.nodes.iter().find(|n| n.label == l).unwrap().layer;
        assert_eq!(layer("A"), 0);
        assert_eq!(layer("M"), 1);
        assert_eq!(layer("Z"), 2);
    }

    #[test]
    fn cycle_is_rejected() {
        let g = graph(&[("A", "B", 1), ("B", "A", 1)]);
        let err = layout_sankey(&g, &LayoutOptions::default()).unwrap_err();
        assert!(matches!(err, Error::CircularFlow));
    }

    #[test]
    fn empty_graph_lays_out_empty() {
        let g = FlowGraph::from_edges(&[]).unwrap();
        let layout = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        assert!(layout.nodes.is_empty() && layout.links.is_empty());
    }

    #[test]
    fn layout_is_deterministic() {
        let g = graph(&[("A", "X", 3), ("A", "Y", 1), ("B", "X", 2)]);
        let a = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        let b = layout_sankey(&g, &LayoutOptions::default()).unwrap();
        for (x, y) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(x.y0.to_bits(), y.y0.to_bits());
            assert_eq!(x.y1.to_bits(), y.y1.to_bits());
        }
    }
}
