#![forbid(unsafe_code)]

//! Flow aggregation and node/color mapping for categorical Sankey diagrams.
//!
//! Everything here is a pure function over in-memory inputs: a [`Dataset`]
//! plus an ordered column list becomes a flow table ([`aggregate_flows`]),
//! and a flow table becomes an indexed, colored [`FlowGraph`] ready for
//! layout and rendering. There is no incremental update and no persistence;
//! derived structures are recomputed in full on every call.

pub mod dataset;
pub mod error;
pub mod flow;
pub mod label;
pub mod node;
pub mod palette;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use flow::{FlowEdge, aggregate_flows};
pub use node::{FlowGraph, IndexedEdge, index_nodes};
