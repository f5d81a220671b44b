use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ResolveArgs;
use taxon_suggest::backend::TaxonSearch;
use taxon_suggest::backend::sqlite::SqliteTaxonIndex;
use taxon_suggest::model::{Rank, SearchRequest, SelectedTaxon};
use taxon_suggest::resolver::{Resolution, ResolutionObserver, SynonymResolver};

use super::{event_loop, resolve_db_path};

const CANDIDATE_LIMIT: u32 = 20;

struct LogObserver;

impl ResolutionObserver for LogObserver {
    fn resolving(&self, accepted_name: &str) {
        info!(accepted_name, "resolving accepted name");
    }

    fn warning(&self, message: &str) {
        warn!(message, "synonym resolution degraded");
    }
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_ref());
    if !db_path.exists() {
        bail!(
            "taxon index not found at {}; run `taxon-suggest ingest` first",
            db_path.display()
        );
    }

    let name = args.name.trim();
    let wanted_rank = args.rank.as_deref().map(Rank::parse);
    let index = SqliteTaxonIndex::new(&db_path);
    let runtime = event_loop()?;

    let selected = runtime.block_on(async {
        let request = SearchRequest::new(name, 1, CANDIDATE_LIMIT)
            .exact()
            .include_all_taxa(true);
        let response = index.search(&request).await?;

        let record = response
            .data
            .into_iter()
            .find(|record| wanted_rank.is_none_or(|rank| record.rank == rank))
            .with_context(|| match wanted_rank {
                Some(rank) => format!("no {rank} named {name} in the taxon index"),
                None => format!("no taxon named {name} in the taxon index"),
            })?;

        let resolver = SynonymResolver::new(index.clone());
        match resolver.resolve_selection(record, &LogObserver).await {
            Resolution::Selected(selected) => Ok::<_, anyhow::Error>(selected),
            Resolution::Superseded => bail!("selection for {name} was superseded"),
        }
    })?;

    if args.json {
        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &selected)
            .context("failed to serialize selected taxon")?;
        writeln!(output)?;
        output.flush()?;
        return Ok(());
    }

    write_text_selection(&selected)
}

fn write_text_selection(selected: &SelectedTaxon) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Selected: {}", selected.scientific_name())?;
    writeln!(output, "Identification level: {}", selected.identification_level)?;
    match selected.resolved_id {
        Some(id) => writeln!(output, "Resolved id: {id}")?,
        None => writeln!(output, "Resolved id: (none)")?,
    }
    if let Some(synonym) = selected.resolved_from_synonym.as_deref() {
        writeln!(output, "Resolved from synonym: {synonym}")?;
    }

    output.flush()?;
    Ok(())
}
