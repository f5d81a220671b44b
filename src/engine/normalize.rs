use std::collections::HashSet;

use tracing::trace;

use super::node::TaxonNode;
use crate::model::TaxonRecord;

/// One fresh node per distinct `(scientific_name, rank)`, first occurrence
/// wins, input order kept.
pub fn normalize(records: &[TaxonRecord]) -> Vec<TaxonNode> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut nodes = Vec::with_capacity(records.len());

    for record in records {
        if !seen.insert(record.identity()) {
            trace!(
                scientific_name = %record.scientific_name,
                rank = %record.rank,
                "dropping duplicate taxon record"
            );
            continue;
        }
        nodes.push(TaxonNode::new(record.clone()));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rank;

    #[test]
    fn normalize_keeps_first_occurrence_per_name_and_rank() {
        let records = vec![
            TaxonRecord::new("Ficus", Rank::Genus).with_field("id", 1),
            TaxonRecord::new("Ficus benjamina", Rank::Species),
            TaxonRecord::new("Ficus", Rank::Genus).with_field("id", 2),
            TaxonRecord::new("Ficus", Rank::Subgenus),
        ];

        let nodes = normalize(&records);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].record.numeric_id(), Some(1));
        assert_eq!(nodes[1].record.scientific_name, "Ficus benjamina");
        assert_eq!(nodes[2].record.rank, Rank::Subgenus);
        assert!(nodes.iter().all(|node| node.children.is_empty() && !node.attached));
    }

    #[test]
    fn normalize_empty_input_is_empty() {
        assert!(normalize(&[]).is_empty());
    }
}
