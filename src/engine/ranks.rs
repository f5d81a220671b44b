//! The two rank tables used by the engine.
//!
//! `taxonomic_seniority` decides who may adopt whom while the tree is built
//! and orders siblings in the hierarchical view. `display_priority` decides
//! which query match floats to the top and orders the re-ranked remainder.
//! Both rank the same vocabulary on different scales; the re-ranker never
//! consults the builder's table.

use std::cmp::Ordering;

use crate::model::{Rank, TaxonRecord};

pub fn taxonomic_seniority(rank: Rank) -> u32 {
    match rank {
        Rank::Domain => 32,
        Rank::Superkingdom => 31,
        Rank::Kingdom => 30,
        Rank::Subkingdom => 29,
        Rank::Infrakingdom => 28,
        Rank::Superphylum => 27,
        Rank::Phylum => 26,
        Rank::Subphylum => 25,
        Rank::Infraphylum => 24,
        Rank::Superclass => 23,
        Rank::Class => 22,
        Rank::Subclass => 21,
        Rank::Infraclass => 20,
        Rank::Superorder => 19,
        Rank::Order => 18,
        Rank::Suborder => 17,
        Rank::Infraorder => 16,
        Rank::Superfamily => 15,
        Rank::Family => 14,
        Rank::Subfamily => 13,
        Rank::Tribe => 12,
        Rank::Subtribe => 11,
        Rank::Genus => 10,
        Rank::Subgenus => 9,
        Rank::Section => 8,
        Rank::Series => 7,
        Rank::Species => 6,
        Rank::Subspecies => 5,
        Rank::Variety => 4,
        Rank::Subvariety => 3,
        Rank::Form => 2,
        Rank::Subform => 1,
        Rank::Unranked => 0,
    }
}

pub fn display_priority(rank: Rank) -> u32 {
    match rank {
        Rank::Domain => 1000,
        Rank::Superkingdom => 960,
        Rank::Kingdom => 950,
        Rank::Subkingdom => 940,
        Rank::Infrakingdom => 930,
        Rank::Superphylum => 860,
        Rank::Phylum => 850,
        Rank::Subphylum => 840,
        Rank::Infraphylum => 830,
        Rank::Superclass => 760,
        Rank::Class => 750,
        Rank::Subclass => 740,
        Rank::Infraclass => 730,
        Rank::Superorder => 660,
        Rank::Order => 650,
        Rank::Suborder => 640,
        Rank::Infraorder => 630,
        Rank::Superfamily => 560,
        Rank::Family => 550,
        Rank::Subfamily => 540,
        Rank::Tribe => 530,
        Rank::Subtribe => 520,
        Rank::Genus => 450,
        Rank::Subgenus => 440,
        Rank::Section => 430,
        Rank::Series => 420,
        Rank::Species => 350,
        Rank::Subspecies => 250,
        Rank::Variety => 150,
        Rank::Subvariety => 140,
        Rank::Form => 50,
        Rank::Subform => 40,
        Rank::Unranked => 0,
    }
}

/// Sibling order in the hierarchical view: seniority desc, then name.
pub fn compare_by_seniority(left: &TaxonRecord, right: &TaxonRecord) -> Ordering {
    taxonomic_seniority(right.rank)
        .cmp(&taxonomic_seniority(left.rank))
        .then_with(|| compare_names(left, right))
}

/// Order used by the re-ranker: display priority desc, then name.
pub fn compare_by_display_priority(left: &TaxonRecord, right: &TaxonRecord) -> Ordering {
    display_priority(right.rank)
        .cmp(&display_priority(left.rank))
        .then_with(|| compare_names(left, right))
}

fn compare_names(left: &TaxonRecord, right: &TaxonRecord) -> Ordering {
    left.scientific_name
        .to_lowercase()
        .cmp(&right.scientific_name.to_lowercase())
        .then_with(|| left.scientific_name.cmp(&right.scientific_name))
}
