//! Synonym resolution for a user's taxon selection.
//!
//! Only the latest selection may be applied. Each call claims a ticket from
//! a shared counter; a lookup that completes after a newer selection was
//! made reports [`Resolution::Superseded`] instead of a taxon. The newest
//! selection owns the caller's in-flight indicator and clears it even when it
//! needs no lookup of its own.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::{debug, info, warn};

use crate::backend::TaxonSearch;
use crate::model::{SearchRequest, SelectedTaxon, TaxonRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Selected(SelectedTaxon),
    Superseded,
}

impl Resolution {
    pub fn selected(self) -> Option<SelectedTaxon> {
        match self {
            Self::Selected(selected) => Some(selected),
            Self::Superseded => None,
        }
    }
}

/// Hook for the caller's transient UI state.
pub trait ResolutionObserver: Send + Sync {
    fn resolving(&self, _accepted_name: &str) {}

    fn settled(&self) {}

    fn warning(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ResolutionObserver for NoopObserver {}

pub struct SynonymResolver<S> {
    search: S,
    latest_selection: AtomicU64,
    lookups_in_flight: AtomicUsize,
}

impl<S: TaxonSearch> SynonymResolver<S> {
    pub fn new(search: S) -> Self {
        Self {
            search,
            latest_selection: AtomicU64::new(0),
            lookups_in_flight: AtomicUsize::new(0),
        }
    }

    /// Turns a clicked record into the taxon to persist, substituting the
    /// accepted name for synonyms. Lookup failures keep the original record.
    pub async fn resolve_selection(
        &self,
        record: TaxonRecord,
        observer: &dyn ResolutionObserver,
    ) -> Resolution {
        let ticket = self.latest_selection.fetch_add(1, Ordering::SeqCst) + 1;

        let accepted_name = record
            .accepted_scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|name| record.is_synonym() && !name.is_empty())
            .map(str::to_string);
        let Some(accepted_name) = accepted_name else {
            if self.lookups_in_flight.load(Ordering::SeqCst) > 0 {
                observer.settled();
            }
            return Resolution::Selected(SelectedTaxon::from_record(record));
        };

        observer.resolving(&accepted_name);
        self.lookups_in_flight.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .search
            .search(&SearchRequest::accepted_name(accepted_name.clone()))
            .await;
        self.lookups_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.latest_selection.load(Ordering::SeqCst) != ticket {
            debug!(
                synonym = %record.scientific_name,
                accepted_name = %accepted_name,
                "discarding synonym lookup for a superseded selection"
            );
            return Resolution::Superseded;
        }
        observer.settled();

        let matched = match outcome {
            Ok(response) if response.success => response.data.into_iter().next(),
            Ok(_) => None,
            Err(err) => {
                warn!(
                    synonym = %record.scientific_name,
                    accepted_name = %accepted_name,
                    error = %err,
                    "accepted name lookup failed, keeping synonym"
                );
                observer.warning(&format!(
                    "could not resolve accepted name {accepted_name}; keeping {}",
                    record.scientific_name
                ));
                return Resolution::Selected(SelectedTaxon::from_record(record));
            }
        };

        let Some(mut accepted) = matched else {
            warn!(
                synonym = %record.scientific_name,
                accepted_name = %accepted_name,
                "no accepted record found, keeping synonym"
            );
            observer.warning(&format!(
                "no accepted record for {accepted_name}; keeping {}",
                record.scientific_name
            ));
            return Resolution::Selected(SelectedTaxon::from_record(record));
        };

        // A lookup that lands on another synonym still displays the name the
        // original record pointed at.
        if accepted.is_synonym() {
            accepted.scientific_name = accepted_name;
        }

        info!(
            synonym = %record.scientific_name,
            accepted = %accepted.scientific_name,
            "resolved synonym to accepted name"
        );

        let mut selected = SelectedTaxon::from_record(accepted);
        selected.resolved_from_synonym = Some(record.scientific_name);
        Resolution::Selected(selected)
    }
}
