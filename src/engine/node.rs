use std::collections::HashMap;

use crate::model::{Rank, TaxonRecord};

/// A search hit wrapped for tree building. `children` holds arena indices
/// into the owning [`TaxonTree`]; parents are never stored.
#[derive(Debug, Clone)]
pub struct TaxonNode {
    pub record: TaxonRecord,
    pub children: Vec<usize>,
    pub attached: bool,
}

impl TaxonNode {
    pub fn new(record: TaxonRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
            attached: false,
        }
    }
}

/// Arena of nodes for one search batch, discarded after ranking.
#[derive(Debug, Clone, Default)]
pub struct TaxonTree {
    pub nodes: Vec<TaxonNode>,
    pub roots: Vec<usize>,
    positions: HashMap<(String, Rank), usize>,
}

impl TaxonTree {
    pub fn new(nodes: Vec<TaxonNode>, roots: Vec<usize>) -> Self {
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| ((node.record.scientific_name.clone(), node.record.rank), index))
            .collect();

        Self {
            nodes,
            roots,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn record(&self, index: usize) -> &TaxonRecord {
        &self.nodes[index].record
    }

    /// Arena index of the node with this `(scientific_name, rank)` identity.
    pub fn find(&self, scientific_name: &str, rank: Rank) -> Option<usize> {
        self.positions
            .get(&(scientific_name.to_string(), rank))
            .copied()
    }

    pub fn into_records(self) -> Vec<TaxonRecord> {
        self.nodes.into_iter().map(|node| node.record).collect()
    }
}
