use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyNodeLayout {
    pub label: String,
    pub index: usize,
    /// Horizontal column after alignment.
    pub layer: usize,
    /// Node magnitude: max of incoming and outgoing flow.
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyLinkLayout {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub value: f64,
    /// Stroke width of the link band.
    pub width: f64,
    /// Vertical center of the band at the source face.
    pub y0: f64,
    /// Vertical center of the band at the target face.
    pub y1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyDiagramLayout {
    pub bounds: Bounds,
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
    pub nodes: Vec<SankeyNodeLayout>,
    pub links: Vec<SankeyLinkLayout>,
}
