use crate::{Dataset, Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One directed, weighted transition between categorical values of two
/// adjacent stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub value: u64,
}

/// Counts transitions between every consecutive column pair in
/// `ordered_columns`.
///
/// For each pair `(a, b)`, each distinct value of `a` (in first-seen row
/// order) becomes a source; the rows carrying that source are grouped by
/// their `b` cell (groups iterated in sorted order) and tallied. A row
/// contributes to a tally only when its `count_column` cell is present; rows
/// with a missing source or target cell contribute nothing. A tally of zero
/// never produces an edge.
///
/// The same `(source, target)` string pair occurring in different column
/// pairs yields separate edges; nothing merges across stages.
pub fn aggregate_flows(
    data: &Dataset,
    ordered_columns: &[&str],
    count_column: &str,
) -> Result<Vec<FlowEdge>> {
    if ordered_columns.len() < 2 {
        return Err(Error::InsufficientColumns {
            count: ordered_columns.len(),
        });
    }
    // Resolve every named column up front so a bad name fails before any work.
    for name in ordered_columns {
        data.column(name)?;
    }
    let counted = data.column(count_column)?;

    let mut edges = Vec::new();
    for pair in ordered_columns.windows(2) {
        let source_col = data.column(pair[0])?;
        let target_col = data.column(pair[1])?;

        let mut distinct: IndexSet<&str> = IndexSet::new();
        for cell in source_col.iter().flatten() {
            distinct.insert(cell.as_str());
        }

        for source in distinct {
            let mut groups: BTreeMap<&str, u64> = BTreeMap::new();
            for ((s, t), id) in source_col.iter().zip(target_col).zip(counted) {
                if s.as_deref() != Some(source) {
                    continue;
                }
                let Some(target) = t.as_deref() else { continue };
                *groups.entry(target).or_insert(0) += u64::from(id.is_some());
            }
            for (target, value) in groups {
                if value == 0 {
                    continue;
                }
                edges.push(FlowEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    value,
                });
            }
        }
    }
    tracing::debug!(
        edges = edges.len(),
        stages = ordered_columns.len(),
        "aggregated flow table"
    );
    Ok(edges)
}
