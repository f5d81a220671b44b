use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use super::flatten::FlatEntry;
use super::node::TaxonTree;
use super::ranks::compare_by_display_priority;
use super::text::contains_query;
use crate::model::TaxonRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    pub index: usize,
    pub depth: usize,
    pub matches_query: bool,
}

/// Moves the best query match and its whole subtree to the front, followed
/// by the other matches and then the rest. `query` must already be trimmed
/// and lower-cased.
pub fn rerank(tree: &TaxonTree, hierarchical: &[FlatEntry], query: &str) -> Vec<RankedEntry> {
    if query.is_empty() || tree.is_empty() {
        return keep_order(hierarchical, &vec![false; tree.len()]);
    }

    let containing = (0..tree.len())
        .map(|index| contains_query(tree.record(index), query))
        .collect::<Vec<bool>>();

    let Some(best) = hierarchical
        .iter()
        .map(|entry| entry.index)
        .filter(|&index| containing[index])
        .min_by(|&left, &right| {
            compare_best_match(tree.record(left), tree.record(right), query)
                .then(left.cmp(&right))
        })
    else {
        debug!(query, "no taxon contains the query, keeping hierarchical order");
        return keep_order(hierarchical, &containing);
    };

    let mut depths = vec![0; tree.len()];
    for entry in hierarchical {
        depths[entry.index] = entry.depth;
    }

    let best_record = tree.record(best);
    let Some(anchor) = tree.find(&best_record.scientific_name, best_record.rank) else {
        warn!(
            scientific_name = %best_record.scientific_name,
            rank = %best_record.rank,
            "best match missing from taxon tree, falling back to flat priority order"
        );
        return order_without_anchor(tree, hierarchical, &containing, &depths);
    };

    let subtree = collect_subtree(tree, anchor);
    let collected = subtree.iter().copied().collect::<HashSet<usize>>();

    let (mut matching, mut rest): (Vec<usize>, Vec<usize>) = hierarchical
        .iter()
        .map(|entry| entry.index)
        .filter(|index| !collected.contains(index))
        .partition(|&index| containing[index]);
    sort_by_display_priority(tree, &mut matching);
    sort_by_display_priority(tree, &mut rest);

    debug!(
        query,
        anchor = %best_record.scientific_name,
        subtree = subtree.len(),
        other_matches = matching.len(),
        non_matching = rest.len(),
        "re-ranked taxon suggestions"
    );

    subtree
        .into_iter()
        .chain(matching)
        .chain(rest)
        .map(|index| RankedEntry {
            index,
            depth: depths[index],
            matches_query: containing[index],
        })
        .collect()
}

/// Exact scientific-name hits win outright, then display priority, then name.
fn compare_best_match(left: &TaxonRecord, right: &TaxonRecord, query: &str) -> Ordering {
    let left_exact = left.scientific_name.to_lowercase() == query;
    let right_exact = right.scientific_name.to_lowercase() == query;
    right_exact
        .cmp(&left_exact)
        .then_with(|| compare_by_display_priority(left, right))
}

fn collect_subtree(tree: &TaxonTree, anchor: usize) -> Vec<usize> {
    let mut collected = Vec::new();
    let mut stack = vec![anchor];

    while let Some(index) = stack.pop() {
        collected.push(index);
        let mut children = tree.nodes[index].children.clone();
        sort_by_display_priority(tree, &mut children);
        stack.extend(children.into_iter().rev());
    }

    collected
}

fn order_without_anchor(
    tree: &TaxonTree,
    hierarchical: &[FlatEntry],
    containing: &[bool],
    depths: &[usize],
) -> Vec<RankedEntry> {
    let (mut matching, mut rest): (Vec<usize>, Vec<usize>) = hierarchical
        .iter()
        .map(|entry| entry.index)
        .partition(|&index| containing[index]);
    sort_by_display_priority(tree, &mut matching);
    sort_by_display_priority(tree, &mut rest);

    matching
        .into_iter()
        .chain(rest)
        .map(|index| RankedEntry {
            index,
            depth: depths[index],
            matches_query: containing[index],
        })
        .collect()
}

fn keep_order(hierarchical: &[FlatEntry], containing: &[bool]) -> Vec<RankedEntry> {
    hierarchical
        .iter()
        .map(|entry| RankedEntry {
            index: entry.index,
            depth: entry.depth,
            matches_query: containing[entry.index],
        })
        .collect()
}

fn sort_by_display_priority(tree: &TaxonTree, indices: &mut [usize]) {
    indices.sort_by(|&left, &right| {
        compare_by_display_priority(tree.record(left), tree.record(right)).then(left.cmp(&right))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::flatten::flatten;
    use crate::engine::hierarchy::build_hierarchy;
    use crate::engine::normalize::normalize;
    use crate::model::Rank;

    #[test]
    fn order_without_anchor_puts_sorted_matches_before_sorted_rest() {
        let records = vec![
            TaxonRecord::new("Zea mays", Rank::Species).with_common_name("maize"),
            TaxonRecord::new("Poaceae", Rank::Family).with_common_name("grasses"),
            TaxonRecord::new("Avena", Rank::Genus).with_common_name("oat grass"),
            TaxonRecord::new("Oryza", Rank::Genus),
        ];
        let tree = build_hierarchy(normalize(&records));
        let hierarchical = flatten(&tree);
        let containing = (0..tree.len())
            .map(|index| contains_query(tree.record(index), "grass"))
            .collect::<Vec<bool>>();

        let ordered = order_without_anchor(&tree, &hierarchical, &containing, &vec![0; tree.len()]);
        let names = ordered
            .iter()
            .map(|entry| tree.record(entry.index).scientific_name.as_str())
            .collect::<Vec<&str>>();

        assert_eq!(names, vec!["Poaceae", "Avena", "Oryza", "Zea mays"]);
        assert!(ordered[0].matches_query && ordered[1].matches_query);
        assert!(!ordered[2].matches_query && !ordered[3].matches_query);
    }
}
