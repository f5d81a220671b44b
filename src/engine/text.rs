use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Rank, TaxonRecord};

static BINOMIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<genus>[A-Z][A-Za-z-]+)\s+(?P<species>[a-z][a-z-]+)")
        .expect("valid binomial regex")
});

const NAME_KEYS: [&str; 3] = ["accepted_scientific_name", "accepted_name", "basionym"];

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// `Genus species` for a record, preferring the ancestor fields over the
/// record's own name.
pub fn binomial(record: &TaxonRecord) -> Option<String> {
    if let (Some(genus), Some(species)) = (record.attribute("genus"), record.attribute("species")) {
        let species = condense_whitespace(species);
        // Some backends already store the full binomial in `species`.
        if species.starts_with(&format!("{genus} ")) {
            return Some(species);
        }
        return Some(format!("{genus} {species}"));
    }

    let captures = BINOMIAL_PATTERN.captures(&record.scientific_name)?;
    Some(format!("{} {}", &captures["genus"], &captures["species"]))
}

/// Lower-cased strings a query is matched against.
pub fn searchable_strings(record: &TaxonRecord) -> Vec<String> {
    let mut values = vec![record.scientific_name.to_lowercase()];
    if let Some(common_name) = record.common_name.as_deref() {
        values.push(common_name.to_lowercase());
    }

    for key in record.full_data.keys() {
        let searchable = key.starts_with("cname_")
            || NAME_KEYS.contains(&key.as_str())
            || Rank::ALL.iter().any(|rank| rank.as_str() == key);
        if !searchable {
            continue;
        }
        if let Some(value) = record.attribute(key) {
            values.push(value.to_lowercase());
        }
    }

    values
}

pub fn contains_query(record: &TaxonRecord, query: &str) -> bool {
    searchable_strings(record)
        .iter()
        .any(|value| value.contains(query))
}

fn condense_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
