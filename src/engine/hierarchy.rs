use std::collections::HashMap;

use tracing::{debug, trace};

use super::node::{TaxonNode, TaxonTree};
use super::ranks::{compare_by_seniority, taxonomic_seniority};
use super::text::binomial;
use crate::model::{Rank, TaxonRecord};

/// Links the batch into a forest. Each node ends up under at most one
/// parent, the most immediate ancestor present in the batch.
pub fn build_hierarchy(mut nodes: Vec<TaxonNode>) -> TaxonTree {
    let binomials = nodes
        .iter()
        .map(|node| binomial(&node.record))
        .collect::<Vec<Option<String>>>();
    let species_by_binomial = index_species_by_binomial(&nodes, &binomials);

    let context = AdoptionContext {
        nodes: &nodes,
        binomials: &binomials,
        species_by_binomial: &species_by_binomial,
    };

    let candidates = (0..nodes.len())
        .map(|child| {
            (0..nodes.len())
                .filter(|&parent| parent != child && context.adopts(parent, child))
                .collect::<Vec<usize>>()
        })
        .collect::<Vec<Vec<usize>>>();

    let mut parents = vec![None; nodes.len()];
    for (child, child_candidates) in candidates.iter().enumerate() {
        parents[child] = child_candidates
            .iter()
            .copied()
            .filter(|&parent| !has_intermediate(&candidates, parent, child_candidates))
            .min_by_key(|&parent| (taxonomic_seniority(nodes[parent].record.rank), parent));
    }

    reattach_subspecies(&nodes, &binomials, &species_by_binomial, &mut parents);

    for (child, parent) in parents.iter().enumerate() {
        if let Some(parent) = *parent {
            nodes[parent].children.push(child);
            nodes[child].attached = true;
        }
    }

    let records = nodes
        .iter()
        .map(|node| node.record.clone())
        .collect::<Vec<TaxonRecord>>();
    let by_seniority = |left: &usize, right: &usize| {
        compare_by_seniority(&records[*left], &records[*right]).then(left.cmp(right))
    };

    for node in &mut nodes {
        node.children.sort_by(by_seniority);
    }

    let mut roots = (0..nodes.len())
        .filter(|&index| !nodes[index].attached)
        .collect::<Vec<usize>>();
    roots.sort_by(by_seniority);

    debug!(
        nodes = nodes.len(),
        roots = roots.len(),
        attached = nodes.len() - roots.len(),
        "built taxon hierarchy"
    );

    TaxonTree::new(nodes, roots)
}

struct AdoptionContext<'a> {
    nodes: &'a [TaxonNode],
    binomials: &'a [Option<String>],
    species_by_binomial: &'a HashMap<String, usize>,
}

impl AdoptionContext<'_> {
    fn adopts(&self, parent: usize, child: usize) -> bool {
        let parent_record = &self.nodes[parent].record;
        let child_record = &self.nodes[child].record;

        if taxonomic_seniority(parent_record.rank) <= taxonomic_seniority(child_record.rank) {
            return false;
        }

        match parent_record.rank {
            Rank::Family | Rank::Subfamily | Rank::Tribe | Rank::Subtribe => {
                shares_attribute(parent_record, child_record, parent_record.rank.as_str())
            }
            Rank::Genus => {
                // A species for this subspecies is in the batch; it takes it.
                if child_record.rank == Rank::Subspecies && self.species_for(child).is_some() {
                    return false;
                }
                let Some(genus) = parent_record.attribute("genus") else {
                    return false;
                };
                child_record.attribute("genus") == Some(genus)
                    || child_record.attribute("subgenus_parent") == Some(genus)
            }
            Rank::Subgenus => shares_attribute(parent_record, child_record, "subgenus"),
            Rank::Species => {
                child_record.rank == Rank::Subspecies
                    && self.binomials[parent].is_some()
                    && self.binomials[parent] == self.binomials[child]
            }
            _ => false,
        }
    }

    fn species_for(&self, child: usize) -> Option<usize> {
        let binomial = self.binomials[child].as_ref()?;
        self.species_by_binomial.get(binomial).copied()
    }
}

fn shares_attribute(parent: &TaxonRecord, child: &TaxonRecord, key: &str) -> bool {
    match (parent.attribute(key), child.attribute(key)) {
        (Some(parent_value), Some(child_value)) => parent_value == child_value,
        _ => false,
    }
}

/// True when some other candidate parent of `child` is itself adopted by
/// `parent`, making `parent` a grand-ancestor rather than the parent.
fn has_intermediate(candidates: &[Vec<usize>], parent: usize, child_candidates: &[usize]) -> bool {
    child_candidates
        .iter()
        .any(|&middle| middle != parent && candidates[middle].contains(&parent))
}

fn index_species_by_binomial(
    nodes: &[TaxonNode],
    binomials: &[Option<String>],
) -> HashMap<String, usize> {
    let mut species = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        if node.record.rank != Rank::Species {
            continue;
        }
        if let Some(binomial) = &binomials[index] {
            species.entry(binomial.clone()).or_insert(index);
        }
    }
    species
}

fn reattach_subspecies(
    nodes: &[TaxonNode],
    binomials: &[Option<String>],
    species_by_binomial: &HashMap<String, usize>,
    parents: &mut [Option<usize>],
) {
    for (index, node) in nodes.iter().enumerate() {
        if node.record.rank != Rank::Subspecies {
            continue;
        }
        let Some(species) = binomials[index]
            .as_ref()
            .and_then(|binomial| species_by_binomial.get(binomial))
            .copied()
        else {
            continue;
        };

        if parents[index] != Some(species) {
            trace!(
                subspecies = %node.record.scientific_name,
                species = %nodes[species].record.scientific_name,
                "re-homing subspecies onto its species"
            );
            parents[index] = Some(species);
        }
    }
}
