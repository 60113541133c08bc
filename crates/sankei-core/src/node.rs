use crate::{FlowEdge, Result, palette};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A flow edge rewritten to dense node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEdge {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

/// Assigns a dense index in `[0, K)` to every distinct category value.
///
/// Scan order is all edge sources in edge order, then all edge targets in
/// edge order; the first occurrence wins. This is the node order every other
/// per-node sequence (labels, colors, totals) follows.
pub fn index_nodes(edges: &[FlowEdge]) -> IndexMap<String, usize> {
    let mut index = IndexMap::new();
    for edge in edges {
        let next = index.len();
        index.entry(edge.source.clone()).or_insert(next);
    }
    for edge in edges {
        let next = index.len();
        index.entry(edge.target.clone()).or_insert(next);
    }
    index
}

/// The fully mapped graph handed to layout and rendering.
///
/// `labels`, `colors` and `totals` are parallel arrays of length K; every
/// edge endpoint is an index in `[0, K)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    pub labels: Vec<String>,
    pub colors: Vec<String>,
    pub totals: Vec<u64>,
    pub edges: Vec<IndexedEdge>,
}

impl FlowGraph {
    pub fn from_edges(edges: &[FlowEdge]) -> Result<Self> {
        let node_index = index_nodes(edges);
        let colors = palette::colors(node_index.len())?;

        let indexed: Vec<IndexedEdge> = edges
            .iter()
            .map(|e| IndexedEdge {
                source: node_index[e.source.as_str()],
                target: node_index[e.target.as_str()],
                value: e.value,
            })
            .collect();

        let mut incoming = vec![0u64; node_index.len()];
        let mut outgoing = vec![0u64; node_index.len()];
        let mut is_target = vec![false; node_index.len()];
        for e in &indexed {
            outgoing[e.source] += e.value;
            incoming[e.target] += e.value;
            is_target[e.target] = true;
        }
        // A node that ever receives flow shows its incoming total; a pure
        // source shows its outgoing total.
        let totals: Vec<u64> = (0..node_index.len())
            .map(|i| if is_target[i] { incoming[i] } else { outgoing[i] })
            .collect();

        Ok(Self {
            labels: node_index.into_keys().collect(),
            colors,
            totals,
            edges: indexed,
        })
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }
}
