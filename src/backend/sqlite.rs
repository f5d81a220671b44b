use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OpenFlags, params};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::TaxonSearch;
use crate::engine::text::{normalize_query, searchable_strings};
use crate::model::{
    Pagination, Rank, SearchRequest, SearchResponse, TaxonRecord, TaxonomicStatus,
};

pub const DEFAULT_DB_FILENAME: &str = "taxa.sqlite";
pub const DB_SCHEMA_VERSION: &str = "2";
const MAX_PER_PAGE: u32 = 200;

const SEARCH_FILTER: &str = "
    WHERE (
        (?2 = 1 AND name_key = ?1)
        OR (?2 = 0 AND instr(search_text, ?1) > 0)
    )
    AND (?3 IS NULL OR taxonomic_status = ?3)
    AND (?4 = 1 OR taxonomic_status IN ('ACCEPTED', 'SYNONYM'))
";

/// Taxon search over a local SQLite index built by `ingest`.
#[derive(Debug, Clone)]
pub struct SqliteTaxonIndex {
    db_path: PathBuf,
}

impl SqliteTaxonIndex {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn open_read_only(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| {
            format!(
                "failed to open taxon index read-only: {}",
                self.db_path.display()
            )
        })
    }
}

#[async_trait]
impl TaxonSearch for SqliteTaxonIndex {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let index = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            let connection = index.open_read_only()?;
            search_taxa(&connection, &request)
        })
        .await
        .context("taxon search task did not complete")?
    }
}

pub fn open_for_write(db_path: &Path) -> Result<Connection> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open taxon index: {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

/// Creates the schema. A `taxa` table written under another schema version
/// is dropped, since `ingest` rebuilds it from the source batch.
pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );",
        )
        .context("failed to initialize metadata table")?;

    let stored_version = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version' LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .ok();
    if let Some(stored) = stored_version.filter(|stored| stored != DB_SCHEMA_VERSION) {
        warn!(
            stored = %stored,
            current = DB_SCHEMA_VERSION,
            "dropping taxon table from an older schema"
        );
        connection
            .execute_batch("DROP TABLE IF EXISTS taxa;")
            .context("failed to drop outdated taxon table")?;
    }

    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS taxa (
              row_id INTEGER PRIMARY KEY,
              taxon_id INTEGER,
              scientific_name TEXT NOT NULL,
              name_key TEXT NOT NULL,
              common_name TEXT,
              rank TEXT NOT NULL,
              taxonomic_status TEXT NOT NULL,
              accepted_scientific_name TEXT,
              full_data TEXT NOT NULL,
              search_text TEXT NOT NULL,
              UNIQUE(scientific_name, rank)
            );

            CREATE INDEX IF NOT EXISTS idx_taxa_name_key ON taxa(name_key);
            CREATE INDEX IF NOT EXISTS idx_taxa_status ON taxa(taxonomic_status);
            ",
        )
        .context("failed to initialize taxon index schema")?;

    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [DB_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub upserted: usize,
    pub duplicates: usize,
}

/// Inserts or refreshes records keyed by `(scientific_name, rank)`. Within
/// one batch the first occurrence of a key wins. The backend id is plain
/// data, so a record re-ranked upstream may reuse an id already stored.
pub fn upsert_records(connection: &mut Connection, records: &[TaxonRecord]) -> Result<UpsertCounts> {
    let transaction = connection
        .transaction()
        .context("failed to start taxon upsert transaction")?;
    let mut counts = UpsertCounts::default();

    {
        let mut statement = transaction.prepare(
            "
            INSERT INTO taxa(
              taxon_id, scientific_name, name_key, common_name, rank,
              taxonomic_status, accepted_scientific_name, full_data, search_text
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(scientific_name, rank) DO UPDATE SET
              taxon_id = excluded.taxon_id,
              common_name = excluded.common_name,
              taxonomic_status = excluded.taxonomic_status,
              accepted_scientific_name = excluded.accepted_scientific_name,
              full_data = excluded.full_data,
              search_text = excluded.search_text
            ",
        )?;

        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.identity()) {
                counts.duplicates += 1;
                continue;
            }

            let full_data = serde_json::to_string(&record.full_data).with_context(|| {
                format!("failed to serialize full_data for {}", record.scientific_name)
            })?;

            statement
                .execute(params![
                    record.numeric_id(),
                    record.scientific_name,
                    record.scientific_name.to_lowercase(),
                    record.common_name,
                    record.rank.as_str(),
                    record.taxonomic_status.as_str(),
                    record.accepted_scientific_name,
                    full_data,
                    searchable_strings(record).join("\n"),
                ])
                .with_context(|| {
                    format!(
                        "failed to upsert taxon {} ({})",
                        record.scientific_name, record.rank
                    )
                })?;
            counts.upserted += 1;
        }
    }

    transaction.execute(
        "INSERT INTO metadata(key, value) VALUES('updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![Utc::now()],
    )?;
    transaction
        .commit()
        .context("failed to commit taxon upsert transaction")?;

    info!(
        upserted = counts.upserted,
        duplicates = counts.duplicates,
        "upserted taxon records"
    );

    Ok(counts)
}

pub fn search_taxa(connection: &Connection, request: &SearchRequest) -> Result<SearchResponse> {
    let needle = normalize_query(&request.query);
    let per_page = request.per_page.clamp(1, MAX_PER_PAGE);
    let page = request.page.max(1);
    let status_filter = request.status_filter.as_ref().map(TaxonomicStatus::as_str);

    let total: i64 = connection
        .query_row(
            &format!("SELECT COUNT(*) FROM taxa {SEARCH_FILTER}"),
            params![
                needle,
                request.exact_name,
                status_filter,
                request.include_all_taxa
            ],
            |row| row.get(0),
        )
        .context("failed to count taxon search hits")?;

    let mut statement = connection.prepare(&format!(
        "
        SELECT
          COALESCE(taxon_id, row_id),
          scientific_name,
          common_name,
          rank,
          taxonomic_status,
          accepted_scientific_name,
          full_data
        FROM taxa
        {SEARCH_FILTER}
        ORDER BY
          CASE
            WHEN name_key = ?1 THEN 0
            WHEN substr(name_key, 1, length(?1)) = ?1 THEN 1
            ELSE 2
          END,
          name_key,
          rank
        LIMIT ?5 OFFSET ?6
        "
    ))?;

    let mut rows = statement.query(params![
        needle,
        request.exact_name,
        status_filter,
        request.include_all_taxa,
        i64::from(per_page),
        i64::from(per_page) * i64::from(page - 1),
    ])?;

    let mut data = Vec::new();
    while let Some(row) = rows.next()? {
        let taxon_id: i64 = row.get(0)?;
        let scientific_name: String = row.get(1)?;
        let rank: String = row.get(3)?;
        let status: String = row.get(4)?;
        let raw_full_data: String = row.get(6)?;

        let mut full_data = serde_json::from_str::<BTreeMap<String, Value>>(&raw_full_data)
            .with_context(|| format!("invalid full_data stored for {scientific_name}"))?;
        full_data
            .entry("id".to_string())
            .or_insert_with(|| Value::from(taxon_id));

        data.push(TaxonRecord {
            scientific_name,
            common_name: row.get(2)?,
            rank: Rank::parse(&rank),
            taxonomic_status: TaxonomicStatus::parse(&status),
            accepted_scientific_name: row.get(5)?,
            full_data,
        });
    }

    let total_pages = u32::try_from(total.max(0))
        .unwrap_or(u32::MAX)
        .div_ceil(per_page);

    debug!(
        query = %request.query,
        exact = request.exact_name,
        page,
        per_page,
        total,
        returned = data.len(),
        "searched taxon index"
    );

    Ok(SearchResponse {
        success: true,
        data,
        pagination: Pagination { total_pages },
    })
}

/// Row counts grouped by `taxonomic_status`, then by `rank`.
pub fn index_counts(connection: &Connection) -> Result<(Vec<(String, i64)>, Vec<(String, i64)>)> {
    Ok((
        grouped_count(connection, "taxonomic_status")?,
        grouped_count(connection, "rank")?,
    ))
}

fn grouped_count(connection: &Connection, column: &'static str) -> Result<Vec<(String, i64)>> {
    let mut statement = connection.prepare(&format!(
        "SELECT {column}, COUNT(*) FROM taxa GROUP BY {column} ORDER BY COUNT(*) DESC, {column}"
    ))?;
    let rows = statement
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, i64)>>>()
        .with_context(|| format!("failed to count taxa by {column}"))?;
    Ok(rows)
}
