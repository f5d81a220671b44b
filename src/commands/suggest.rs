use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::cli::SuggestArgs;
use taxon_suggest::backend::search_or_empty;
use taxon_suggest::backend::sqlite::SqliteTaxonIndex;
use taxon_suggest::engine::rank;
use taxon_suggest::model::{RankedTaxon, SearchRequest, TaxonRecord};
use taxon_suggest::util::read_records_json;

use super::{event_loop, resolve_db_path};

#[derive(Debug, Serialize)]
struct SuggestResponse<'a> {
    query: &'a str,
    source: &'a str,
    returned: usize,
    suggestions: &'a [RankedTaxon],
}

pub fn run(args: SuggestArgs) -> Result<()> {
    let query = args.query.trim();

    let (records, source) = match &args.records {
        Some(path) => (read_records_json(path)?, path.display().to_string()),
        None => {
            let db_path = resolve_db_path(&args.cache_root, args.db_path.as_ref());
            if !db_path.exists() {
                bail!(
                    "taxon index not found at {}; run `taxon-suggest ingest` first",
                    db_path.display()
                );
            }
            let records = search_index(&args, query, SqliteTaxonIndex::new(&db_path))?;
            (records, db_path.display().to_string())
        }
    };

    let suggestions = rank(&records, query);
    info!(
        query,
        hits = records.len(),
        suggestions = suggestions.len(),
        "ranked suggestions"
    );

    if args.json {
        write_json_response(query, &source, &suggestions)
    } else {
        write_text_response(query, &suggestions)
    }
}

fn search_index(
    args: &SuggestArgs,
    query: &str,
    index: SqliteTaxonIndex,
) -> Result<Vec<TaxonRecord>> {
    let request = SearchRequest::new(query, args.page, args.per_page)
        .include_all_taxa(args.include_all_taxa);
    let runtime = event_loop()?;
    Ok(runtime.block_on(search_or_empty(&index, &request)))
}

fn write_json_response(query: &str, source: &str, suggestions: &[RankedTaxon]) -> Result<()> {
    let response = SuggestResponse {
        query,
        source,
        returned: suggestions.len(),
        suggestions,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &response)
        .context("failed to serialize suggestion json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(query: &str, suggestions: &[RankedTaxon]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Query: {query}")?;
    writeln!(output, "Suggestions: {}", suggestions.len())?;

    for suggestion in suggestions {
        let record = &suggestion.record;
        let marker = if suggestion.matches_query { "*" } else { " " };
        let mut line = format!(
            "{marker} {}{} [{}]",
            "  ".repeat(suggestion.depth),
            record.scientific_name,
            record.rank
        );
        if let Some(common_name) = record.common_name.as_deref() {
            line.push_str(&format!(" - {common_name}"));
        }
        if record.is_synonym() {
            let accepted = record
                .accepted_scientific_name
                .as_deref()
                .unwrap_or("unknown accepted name");
            line.push_str(&format!(" (synonym of {accepted})"));
        }
        writeln!(output, "{line}")?;
    }

    output.flush()?;
    Ok(())
}
