//! Taxonomic suggestion ranking.
//!
//! A batch of flat search hits goes through four synchronous phases:
//! normalize, build hierarchy, flatten, re-rank against the query. The tree
//! is private to one call and dropped before `rank` returns.

mod flatten;
mod hierarchy;
mod node;
mod normalize;
pub mod ranks;
mod relevance;
pub mod text;

use tracing::debug;

use crate::model::{RankedTaxon, TaxonRecord};

/// Orders a search batch for display.
pub fn rank(records: &[TaxonRecord], query: &str) -> Vec<RankedTaxon> {
    let query = text::normalize_query(query);
    let tree = hierarchy::build_hierarchy(normalize::normalize(records));
    let hierarchical = flatten::flatten(&tree);
    let ordered = relevance::rerank(&tree, &hierarchical, &query);

    debug!(
        input = records.len(),
        output = ordered.len(),
        query = %query,
        "ranked taxon batch"
    );

    let mut slots = tree.into_records().into_iter().map(Some).collect::<Vec<_>>();
    ordered
        .into_iter()
        .filter_map(|entry| {
            slots[entry.index].take().map(|record| RankedTaxon {
                record,
                depth: entry.depth,
                matches_query: entry.matches_query,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
