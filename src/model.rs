use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Linnaean rank vocabulary, most senior first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rank {
    Domain,
    Superkingdom,
    Kingdom,
    Subkingdom,
    Infrakingdom,
    Superphylum,
    Phylum,
    Subphylum,
    Infraphylum,
    Superclass,
    Class,
    Subclass,
    Infraclass,
    Superorder,
    Order,
    Suborder,
    Infraorder,
    Superfamily,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    Genus,
    Subgenus,
    Section,
    Series,
    Species,
    Subspecies,
    Variety,
    Subvariety,
    Form,
    Subform,
    #[default]
    Unranked,
}

impl Rank {
    pub const ALL: [Rank; 32] = [
        Rank::Domain,
        Rank::Superkingdom,
        Rank::Kingdom,
        Rank::Subkingdom,
        Rank::Infrakingdom,
        Rank::Superphylum,
        Rank::Phylum,
        Rank::Subphylum,
        Rank::Infraphylum,
        Rank::Superclass,
        Rank::Class,
        Rank::Subclass,
        Rank::Infraclass,
        Rank::Superorder,
        Rank::Order,
        Rank::Suborder,
        Rank::Infraorder,
        Rank::Superfamily,
        Rank::Family,
        Rank::Subfamily,
        Rank::Tribe,
        Rank::Subtribe,
        Rank::Genus,
        Rank::Subgenus,
        Rank::Section,
        Rank::Series,
        Rank::Species,
        Rank::Subspecies,
        Rank::Variety,
        Rank::Subvariety,
        Rank::Form,
        Rank::Subform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Superkingdom => "superkingdom",
            Self::Kingdom => "kingdom",
            Self::Subkingdom => "subkingdom",
            Self::Infrakingdom => "infrakingdom",
            Self::Superphylum => "superphylum",
            Self::Phylum => "phylum",
            Self::Subphylum => "subphylum",
            Self::Infraphylum => "infraphylum",
            Self::Superclass => "superclass",
            Self::Class => "class",
            Self::Subclass => "subclass",
            Self::Infraclass => "infraclass",
            Self::Superorder => "superorder",
            Self::Order => "order",
            Self::Suborder => "suborder",
            Self::Infraorder => "infraorder",
            Self::Superfamily => "superfamily",
            Self::Family => "family",
            Self::Subfamily => "subfamily",
            Self::Tribe => "tribe",
            Self::Subtribe => "subtribe",
            Self::Genus => "genus",
            Self::Subgenus => "subgenus",
            Self::Section => "section",
            Self::Series => "series",
            Self::Species => "species",
            Self::Subspecies => "subspecies",
            Self::Variety => "variety",
            Self::Subvariety => "subvariety",
            Self::Form => "form",
            Self::Subform => "subform",
            Self::Unranked => "unranked",
        }
    }

    /// Case-insensitive; unknown labels map to [`Rank::Unranked`].
    pub fn parse(value: &str) -> Self {
        let lowered = value.trim().trim_end_matches('.').to_ascii_lowercase();
        match lowered.as_str() {
            "subsp" | "ssp" => return Self::Subspecies,
            "var" => return Self::Variety,
            "subvar" => return Self::Subvariety,
            "f" | "forma" => return Self::Form,
            "subf" | "subforma" => return Self::Subform,
            "division" => return Self::Phylum,
            "subdivision" => return Self::Subphylum,
            _ => {}
        }

        Self::ALL
            .iter()
            .copied()
            .find(|rank| rank.as_str() == lowered)
            .unwrap_or(Self::Unranked)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Rank::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TaxonomicStatus {
    #[default]
    Accepted,
    Synonym,
    Other(String),
}

impl TaxonomicStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Synonym => "SYNONYM",
            Self::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("accepted") {
            Self::Accepted
        } else if trimmed.eq_ignore_ascii_case("synonym") {
            Self::Synonym
        } else {
            Self::Other(trimmed.to_ascii_uppercase())
        }
    }
}

impl fmt::Display for TaxonomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaxonomicStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaxonomicStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(TaxonomicStatus::parse).unwrap_or_default())
    }
}

/// One hit from the backend taxon search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub scientific_name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub taxonomic_status: TaxonomicStatus,
    #[serde(default)]
    pub accepted_scientific_name: Option<String>,
    #[serde(default)]
    pub full_data: BTreeMap<String, Value>,
}

impl TaxonRecord {
    pub fn new(scientific_name: impl Into<String>, rank: Rank) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            common_name: None,
            rank,
            taxonomic_status: TaxonomicStatus::Accepted,
            accepted_scientific_name: None,
            full_data: BTreeMap::new(),
        }
    }

    pub fn with_common_name(mut self, common_name: impl Into<String>) -> Self {
        self.common_name = Some(common_name.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.full_data.insert(key.to_string(), value.into());
        self
    }

    pub fn synonym_of(mut self, accepted_scientific_name: impl Into<String>) -> Self {
        self.taxonomic_status = TaxonomicStatus::Synonym;
        self.accepted_scientific_name = Some(accepted_scientific_name.into());
        self
    }

    /// Non-empty string value of a `full_data` key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self.full_data.get(key) {
            Some(Value::String(value)) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    pub fn numeric_id(&self) -> Option<i64> {
        match self.full_data.get("id")? {
            Value::Number(number) => number.as_i64(),
            Value::String(value) => value.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_synonym(&self) -> bool {
        self.taxonomic_status == TaxonomicStatus::Synonym
    }

    /// Two records describe the same entity iff this key matches.
    pub fn identity(&self) -> (&str, Rank) {
        (self.scientific_name.as_str(), self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
    pub include_all_taxa: bool,
    pub exact_name: bool,
    pub status_filter: Option<TaxonomicStatus>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            query: query.into(),
            page,
            per_page,
            include_all_taxa: false,
            exact_name: false,
            status_filter: None,
        }
    }

    /// Exact-name lookup for the accepted counterpart of a synonym.
    pub fn accepted_name(name: impl Into<String>) -> Self {
        Self {
            query: name.into(),
            page: 1,
            per_page: 1,
            include_all_taxa: false,
            exact_name: true,
            status_filter: Some(TaxonomicStatus::Accepted),
        }
    }

    pub fn include_all_taxa(mut self, include_all_taxa: bool) -> Self {
        self.include_all_taxa = include_all_taxa;
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact_name = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pagination {
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<TaxonRecord>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// One entry of the display list produced by [`crate::engine::rank`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTaxon {
    #[serde(flatten)]
    pub record: TaxonRecord,
    pub depth: usize,
    pub matches_query: bool,
}

/// The taxon handed back to the identification or tagging form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedTaxon {
    #[serde(flatten)]
    pub record: TaxonRecord,
    pub resolved_id: Option<i64>,
    pub identification_level: Rank,
    pub resolved_from_synonym: Option<String>,
}

impl SelectedTaxon {
    pub fn from_record(record: TaxonRecord) -> Self {
        Self {
            resolved_id: record.numeric_id(),
            identification_level: record.rank,
            record,
            resolved_from_synonym: None,
        }
    }

    pub fn scientific_name(&self) -> &str {
        &self.record.scientific_name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub db_path: String,
    pub record_count: usize,
    pub upserted_count: usize,
    pub duplicate_count: usize,
    pub accepted_count: usize,
    pub synonym_count: usize,
    pub other_status_count: usize,
}
