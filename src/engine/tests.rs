use std::collections::HashSet;

use super::*;
use crate::model::Rank;

fn names(ranked: &[RankedTaxon]) -> Vec<&str> {
    ranked
        .iter()
        .map(|entry| entry.record.scientific_name.as_str())
        .collect()
}

fn genus(name: &str) -> TaxonRecord {
    TaxonRecord::new(name, Rank::Genus).with_field("genus", name)
}

fn species(genus: &str, epithet: &str) -> TaxonRecord {
    TaxonRecord::new(format!("{genus} {epithet}"), Rank::Species)
        .with_field("genus", genus)
        .with_field("species", epithet)
}

fn subspecies(genus: &str, epithet: &str, infra: &str) -> TaxonRecord {
    TaxonRecord::new(format!("{genus} {epithet} {infra}"), Rank::Subspecies)
        .with_field("genus", genus)
        .with_field("species", epithet)
}

fn oak_batch() -> Vec<TaxonRecord> {
    vec![
        TaxonRecord::new("Lithocarpus densiflorus", Rank::Species).with_common_name("tanoak"),
        species("Quercus", "robur").with_field("family", "Fagaceae"),
        TaxonRecord::new("Nothofagaceae", Rank::Family)
            .with_common_name("southern quercus relatives")
            .with_field("family", "Nothofagaceae"),
        genus("Quercus").with_field("family", "Fagaceae"),
        species("Quercus", "alba").with_field("family", "Fagaceae"),
    ]
}

fn depth_of(ranked: &[RankedTaxon], name: &str) -> usize {
    ranked
        .iter()
        .find(|entry| entry.record.scientific_name == name)
        .map(|entry| entry.depth)
        .unwrap_or(usize::MAX)
}

#[test]
fn rank_is_deterministic() {
    let records = oak_batch();
    let first = rank(&records, "quercus");
    let second = rank(&records, "quercus");
    assert_eq!(first, second);

    let hierarchical = rank(&records, "");
    assert_eq!(hierarchical, rank(&records, ""));
}

#[test]
fn rank_drops_duplicate_identities() {
    let mut records = oak_batch();
    records.push(genus("Quercus").with_field("id", 999));
    records.push(species("Quercus", "alba"));
    records.push(TaxonRecord::new("Quercus", Rank::Subgenus).with_field("subgenus", "Quercus"));

    let distinct = records
        .iter()
        .map(|record| (record.scientific_name.clone(), record.rank))
        .collect::<HashSet<(String, Rank)>>();

    let ranked = rank(&records, "quercus");
    assert!(ranked.len() <= distinct.len());
    assert_eq!(ranked.len(), 6);

    let quercus_genus = ranked
        .iter()
        .find(|entry| entry.record.identity() == ("Quercus", Rank::Genus))
        .map(|entry| entry.record.numeric_id());
    assert_eq!(quercus_genus, Some(None));
}

#[test]
fn every_node_appears_exactly_once() {
    let records = vec![
        TaxonRecord::new("Fagaceae", Rank::Family).with_field("family", "Fagaceae"),
        TaxonRecord::new("Quercoideae", Rank::Subfamily)
            .with_field("family", "Fagaceae")
            .with_field("subfamily", "Quercoideae"),
        genus("Quercus")
            .with_field("family", "Fagaceae")
            .with_field("subfamily", "Quercoideae"),
        species("Quercus", "robur")
            .with_field("family", "Fagaceae")
            .with_field("subfamily", "Quercoideae"),
        subspecies("Quercus", "robur", "brutia")
            .with_field("family", "Fagaceae")
            .with_field("subfamily", "Quercoideae"),
        TaxonRecord::new("Aves", Rank::Class),
    ];

    for query in ["", "quercus", "fagaceae", "nothing-matches"] {
        let ranked = rank(&records, query);
        assert_eq!(ranked.len(), records.len(), "query {query:?}");
        let unique = ranked
            .iter()
            .map(|entry| entry.record.identity())
            .collect::<HashSet<(&str, Rank)>>();
        assert_eq!(unique.len(), records.len(), "query {query:?}");
    }

    let hierarchical = rank(&records, "");
    assert_eq!(
        names(&hierarchical),
        vec![
            "Aves",
            "Fagaceae",
            "Quercoideae",
            "Quercus",
            "Quercus robur",
            "Quercus robur brutia",
        ]
    );
    assert_eq!(depth_of(&hierarchical, "Fagaceae"), 0);
    assert_eq!(depth_of(&hierarchical, "Quercoideae"), 1);
    assert_eq!(depth_of(&hierarchical, "Quercus"), 2);
    assert_eq!(depth_of(&hierarchical, "Quercus robur"), 3);
    assert_eq!(depth_of(&hierarchical, "Quercus robur brutia"), 4);
}

#[test]
fn subspecies_attaches_to_species_not_genus() {
    let records = vec![
        subspecies("Parus", "major", "newtoni"),
        genus("Parus"),
        species("Parus", "major"),
    ];

    let tree = hierarchy::build_hierarchy(normalize::normalize(&records));
    let genus_index = tree.find("Parus", Rank::Genus).unwrap_or(usize::MAX);
    let species_index = tree.find("Parus major", Rank::Species).unwrap_or(usize::MAX);
    let subspecies_index = tree
        .find("Parus major newtoni", Rank::Subspecies)
        .unwrap_or(usize::MAX);

    assert_eq!(tree.roots, vec![genus_index]);
    assert_eq!(tree.nodes[genus_index].children, vec![species_index]);
    assert_eq!(tree.nodes[species_index].children, vec![subspecies_index]);
    assert!(tree.nodes[subspecies_index].attached);
    assert!(!tree.nodes[genus_index].attached);

    let ranked = rank(&records, "");
    assert_eq!(
        names(&ranked),
        vec!["Parus", "Parus major", "Parus major newtoni"]
    );
}

#[test]
fn subspecies_uses_name_binomial_when_fields_are_missing() {
    let records = vec![
        genus("Parus"),
        TaxonRecord::new("Parus major newtoni", Rank::Subspecies).with_field("genus", "Parus"),
        TaxonRecord::new("Parus major", Rank::Species).with_field("genus", "Parus"),
    ];

    let ranked = rank(&records, "");
    assert_eq!(
        names(&ranked),
        vec!["Parus", "Parus major", "Parus major newtoni"]
    );
    assert_eq!(depth_of(&ranked, "Parus major newtoni"), 2);
}

#[test]
fn genus_keeps_subspecies_when_no_species_is_present() {
    let records = vec![subspecies("Parus", "major", "newtoni"), genus("Parus")];

    let ranked = rank(&records, "");
    assert_eq!(names(&ranked), vec!["Parus", "Parus major newtoni"]);
    assert_eq!(depth_of(&ranked, "Parus major newtoni"), 1);
}

#[test]
fn subspecies_prefers_species_over_matching_tribe() {
    let records = vec![
        TaxonRecord::new("Quercinae", Rank::Tribe).with_field("tribe", "Quercinae"),
        subspecies("Quercus", "robur", "brutia").with_field("tribe", "Quercinae"),
        species("Quercus", "robur"),
    ];

    let tree = hierarchy::build_hierarchy(normalize::normalize(&records));
    let species_index = tree.find("Quercus robur", Rank::Species).unwrap_or(usize::MAX);
    let tribe_index = tree.find("Quercinae", Rank::Tribe).unwrap_or(usize::MAX);

    assert_eq!(tree.nodes[species_index].children.len(), 1);
    assert!(tree.nodes[tribe_index].children.is_empty());
}

#[test]
fn only_the_most_immediate_ancestor_adopts() {
    let records = vec![
        species("Quercus", "robur").with_field("family", "Fagaceae"),
        genus("Quercus").with_field("family", "Fagaceae"),
        TaxonRecord::new("Fagaceae", Rank::Family).with_field("family", "Fagaceae"),
    ];

    let tree = hierarchy::build_hierarchy(normalize::normalize(&records));
    let family_index = tree.find("Fagaceae", Rank::Family).unwrap_or(usize::MAX);
    let genus_index = tree.find("Quercus", Rank::Genus).unwrap_or(usize::MAX);
    let species_index = tree.find("Quercus robur", Rank::Species).unwrap_or(usize::MAX);

    assert_eq!(tree.roots, vec![family_index]);
    assert_eq!(tree.nodes[family_index].children, vec![genus_index]);
    assert_eq!(tree.nodes[genus_index].children, vec![species_index]);
}

#[test]
fn genus_adopts_subgenus_demoted_children() {
    let records = vec![
        genus("Bombus"),
        TaxonRecord::new("Bombus terrestris", Rank::Species).with_field("subgenus_parent", "Bombus"),
    ];

    let ranked = rank(&records, "");
    assert_eq!(names(&ranked), vec!["Bombus", "Bombus terrestris"]);
    assert_eq!(depth_of(&ranked, "Bombus terrestris"), 1);
}

#[test]
fn subgenus_adopts_on_shared_subgenus() {
    let records = vec![
        TaxonRecord::new("Bombus terrestris", Rank::Species).with_field("subgenus", "Bombus s.str."),
        TaxonRecord::new("Bombus s.str.", Rank::Subgenus).with_field("subgenus", "Bombus s.str."),
    ];

    let ranked = rank(&records, "");
    assert_eq!(names(&ranked), vec!["Bombus s.str.", "Bombus terrestris"]);
    assert_eq!(depth_of(&ranked, "Bombus terrestris"), 1);
}

#[test]
fn malformed_full_data_never_links_or_panics() {
    let records = vec![
        TaxonRecord::new("Fagaceae", Rank::Family).with_field("family", 17),
        TaxonRecord::new("Quercus", Rank::Genus).with_field("genus", serde_json::Value::Null),
        TaxonRecord::new("Quercus robur", Rank::Species)
            .with_field("family", 17)
            .with_field("genus", ""),
        TaxonRecord::new("", Rank::Unranked),
    ];

    let tree = hierarchy::build_hierarchy(normalize::normalize(&records));
    assert_eq!(tree.roots.len(), 4);
    assert!(tree.nodes.iter().all(|node| node.children.is_empty()));
}

#[test]
fn roots_sort_by_seniority_then_case_insensitive_name() {
    let records = vec![
        genus("abies"),
        TaxonRecord::new("Corvidae", Rank::Family),
        genus("Acer"),
        TaxonRecord::new("Aves", Rank::Class),
        TaxonRecord::new("mystery", Rank::Unranked),
    ];

    let ranked = rank(&records, "");
    assert_eq!(
        names(&ranked),
        vec!["Aves", "Corvidae", "abies", "Acer", "mystery"]
    );
}

#[test]
fn searching_a_genus_groups_it_with_its_species() {
    let ranked = rank(&oak_batch(), "Quercus");
    assert_eq!(
        names(&ranked),
        vec![
            "Quercus",
            "Quercus alba",
            "Quercus robur",
            "Nothofagaceae",
            "Lithocarpus densiflorus",
        ]
    );
    assert!(ranked[..4].iter().all(|entry| entry.matches_query));
    assert!(!ranked[4].matches_query);
}

#[test]
fn prefix_query_is_anchored_by_highest_priority_match() {
    let ranked = rank(&oak_batch(), "querc");
    assert_eq!(
        names(&ranked),
        vec![
            "Nothofagaceae",
            "Quercus",
            "Quercus alba",
            "Quercus robur",
            "Lithocarpus densiflorus",
        ]
    );
    assert!(ranked[..4].iter().all(|entry| entry.matches_query));
    assert_eq!(depth_of(&ranked, "Quercus alba"), 1);
}

#[test]
fn highest_priority_match_anchors_the_subtree() {
    let records = vec![
        species("Corvus", "corax").with_field("family", "Corvidae"),
        TaxonRecord::new("Corvidae", Rank::Family).with_field("family", "Corvidae"),
        genus("Corvus").with_field("family", "Corvidae"),
        TaxonRecord::new("Corvina", Rank::Genus).with_common_name("croaker"),
        TaxonRecord::new("Pica pica", Rank::Species),
    ];

    let ranked = rank(&records, "corv");
    assert_eq!(
        names(&ranked),
        vec!["Corvidae", "Corvus", "Corvus corax", "Corvina", "Pica pica"]
    );
}

#[test]
fn corvidae_scenario_orders_rest_by_display_priority() {
    let records = vec![
        TaxonRecord::new("Aves", Rank::Class),
        TaxonRecord::new("Passeriformes", Rank::Order).with_field("class", "Aves"),
        TaxonRecord::new("Corvidae", Rank::Family)
            .with_field("order", "Passeriformes")
            .with_field("class", "Aves"),
    ];

    let ranked = rank(&records, "corv");
    assert_eq!(names(&ranked), vec!["Corvidae", "Aves", "Passeriformes"]);
    assert!(ranked[0].matches_query);
    assert!(!ranked[1].matches_query && !ranked[2].matches_query);
}

#[test]
fn empty_query_returns_hierarchical_order() {
    let records = oak_batch();
    let tree = hierarchy::build_hierarchy(normalize::normalize(&records));
    let expected = flatten::flatten(&tree)
        .into_iter()
        .map(|entry| tree.record(entry.index).scientific_name.clone())
        .collect::<Vec<String>>();

    for query in ["", "   "] {
        let ranked = rank(&records, query);
        let actual = names(&ranked)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<String>>();
        assert_eq!(actual, expected);
        assert!(ranked.iter().all(|entry| !entry.matches_query));
    }

    assert_eq!(
        expected,
        vec![
            "Nothofagaceae",
            "Quercus",
            "Quercus alba",
            "Quercus robur",
            "Lithocarpus densiflorus",
        ]
    );
}

#[test]
fn unmatched_query_keeps_hierarchical_order() {
    let records = oak_batch();
    assert_eq!(names(&rank(&records, "zzz")), names(&rank(&records, "")));
}

#[test]
fn matching_on_common_names_and_ancestor_common_names() {
    let records = vec![
        TaxonRecord::new("Corvus corax", Rank::Species)
            .with_common_name("Common Raven")
            .with_field("cname_family", "crows"),
        TaxonRecord::new("Turdus merula", Rank::Species).with_common_name("Blackbird"),
    ];

    let ranked = rank(&records, "CROW");
    assert_eq!(names(&ranked), vec!["Corvus corax", "Turdus merula"]);
    assert!(ranked[0].matches_query);
}

#[test]
fn empty_batch_yields_empty_output() {
    assert!(rank(&[], "").is_empty());
    assert!(rank(&[], "quercus").is_empty());
}
