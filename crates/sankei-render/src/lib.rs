#![forbid(unsafe_code)]

//! Headless layout and SVG rendering for categorical Sankey diagrams.
//!
//! [`layout::layout_sankey`] turns a [`sankei_core::FlowGraph`] into node and
//! link geometry; [`svg::render_sankey_svg`] writes that geometry onto a
//! fixed 1000×600 canvas. Both are deterministic functions with no I/O.

pub mod layout;
pub mod model;
pub mod svg;

pub use layout::{LayoutOptions, layout_sankey};
pub use model::{Bounds, SankeyDiagramLayout, SankeyLinkLayout, SankeyNodeLayout};
pub use svg::{SvgRenderOptions, render_sankey_svg};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid flow graph: {message}")]
    InvalidGraph { message: String },
    #[error("flow graph contains a cycle")]
    CircularFlow,
}

pub type Result<T> = std::result::Result<T, Error>;
