#![forbid(unsafe_code)]

//! `sankei` turns tabular categorical data into rendered Sankey diagrams.
//!
//! The pipeline is a composition of pure stages: [`aggregate_flows`] counts
//! transitions between consecutive columns, [`FlowGraph::from_edges`] assigns
//! node indices, colors and totals, `sankei-render` lays the graph out and
//! writes SVG, and [`Figure::save`] exports to SVG/PNG/JPG/PDF with the
//! format inferred from the file extension.
//!
//! ```no_run
//! use sankei::{Dataset, DiagramOptions, build_diagram};
//!
//! let mut data = Dataset::new();
//! data.push_filled_column("Stage1", ["A", "A", "B"])?;
//! data.push_filled_column("Stage2", ["X", "Y", "X"])?;
//! data.push_filled_column("Id", ["1", "2", "3"])?;
//!
//! let figure = build_diagram(
//!     &data,
//!     &["Stage1", "Stage2"],
//!     "Id",
//!     &DiagramOptions {
//!         show_numbers: true,
//!         title: Some("Pipeline".to_string()),
//!     },
//! )?;
//! figure.save("pipeline.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod export;

pub use sankei_core::{
    Dataset, FlowEdge, FlowGraph, IndexedEdge, aggregate_flows, index_nodes, label, palette,
};
pub use sankei_render::{
    LayoutOptions, SankeyDiagramLayout, SvgRenderOptions, layout_sankey, render_sankey_svg,
};

pub use export::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] sankei_core::Error),
    #[error(transparent)]
    Render(#[from] sankei_render::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Presentation knobs for [`build_diagram`].
#[derive(Debug, Clone, Default)]
pub struct DiagramOptions {
    /// Annotate each node label with its aggregate flow total.
    pub show_numbers: bool,
    /// Optional figure title, centered above the diagram.
    pub title: Option<String>,
}

/// A fully built diagram: the mapped graph, its geometry and the rendered
/// SVG document.
#[derive(Debug, Clone)]
pub struct Figure {
    graph: FlowGraph,
    layout: SankeyDiagramLayout,
    svg: String,
}

impl Figure {
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn layout(&self) -> &SankeyDiagramLayout {
        &self.layout
    }
}

/// Runs the whole pipeline: aggregate, map, lay out, render.
pub fn build_diagram(
    data: &Dataset,
    ordered_columns: &[&str],
    count_column: &str,
    options: &DiagramOptions,
) -> Result<Figure> {
    let edges = aggregate_flows(data, ordered_columns, count_column)?;
    let graph = FlowGraph::from_edges(&edges)?;
    let layout = layout_sankey(&graph, &LayoutOptions::default())?;

    let display_labels: Vec<String> = graph
        .labels
        .iter()
        .zip(&graph.totals)
        .map(|(raw, total)| {
            if options.show_numbers {
                label::display_label_with_total(raw, *total)
            } else {
                label::display_label(raw)
            }
        })
        .collect();

    let svg = render_sankey_svg(
        &layout,
        &graph.colors,
        &display_labels,
        &SvgRenderOptions {
            title: options.title.clone(),
        },
    )?;

    Ok(Figure { graph, layout, svg })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_data() -> Dataset {
        let mut data = Dataset::new();
        data.push_filled_column(
            "Decision_a",
            ["Accept_a", "Accept_a", "Accept_a", "Reject_a", "Reject_a", "Reject_a"],
        )
        .unwrap();
        data.push_filled_column(
            "Decision_b",
            ["Accept_b", "Accept_b", "Reject_b", "Reject_b", "Reject_b", "Accept_b"],
        )
        .unwrap();
        data.push_filled_column("Submission Number", ["1", "2", "3", "4", "5", "6"])
            .unwrap();
        data
    }

    #[test]
    fn end_to_end_builds_svg() {
        let figure = build_diagram(
            &review_data(),
            &["Decision_a", "Decision_b"],
            "Submission Number",
            &DiagramOptions::default(),
        )
        .unwrap();

        assert_eq!(figure.graph().node_count(), 4);
        assert_eq!(figure.layout().nodes.len(), 4);
        roxmltree::Document::parse(figure.svg()).unwrap();
    }

    #[test]
    fn labels_are_stripped_and_annotated() {
        let figure = build_diagram(
            &review_data(),
            &["Decision_a", "Decision_b"],
            "Submission Number",
            &DiagramOptions {
                show_numbers: true,
                title: None,
            },
        )
        .unwrap();

        // "_a"/"_b" markers disappear and totals are appended.
        assert!(figure.svg().contains(">Accept (3)<"));
        assert!(figure.svg().contains(">Reject (3)<"));
        assert!(!figure.svg().contains("Accept_a"));
    }

    #[test]
    fn title_shows_up() {
        let figure = build_diagram(
            &review_data(),
            &["Decision_a", "Decision_b"],
            "Submission Number",
            &DiagramOptions {
                show_numbers: false,
                title: Some("Decisions".to_string()),
            },
        )
        .unwrap();
        assert!(figure.svg().contains(">Decisions<"));
    }

    #[test]
    fn core_errors_surface_through_the_facade() {
        let err = build_diagram(
            &review_data(),
            &["Decision_a"],
            "Submission Number",
            &DiagramOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Core(sankei_core::Error::InsufficientColumns { count: 1 })
        ));
    }
}
