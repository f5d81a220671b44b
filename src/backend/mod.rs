//! The taxon search collaborator the engine is fed from.

pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::model::{SearchRequest, SearchResponse, TaxonRecord};

/// Backend full-text taxon search.
///
/// Implementations return hits already ordered by their own relevance; the
/// engine only re-orders them for taxonomic coherence.
#[async_trait]
pub trait TaxonSearch: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// Runs a search, treating transport errors and unsuccessful responses as
/// an empty batch.
pub async fn search_or_empty<S: TaxonSearch + ?Sized>(
    search: &S,
    request: &SearchRequest,
) -> Vec<TaxonRecord> {
    match search.search(request).await {
        Ok(response) if response.success => response.data,
        Ok(_) => {
            warn!(query = %request.query, "taxon search reported failure, showing no results");
            Vec::new()
        }
        Err(err) => {
            warn!(query = %request.query, error = %err, "taxon search failed, showing no results");
            Vec::new()
        }
    }
}
