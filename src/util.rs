use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::{SearchResponse, TaxonRecord};

/// Run id and RFC 3339 timestamp for one ingest, taken from the same instant.
pub fn ingest_stamp(at: DateTime<Utc>) -> (String, String) {
    (
        format!("ingest-{}", at.format("%Y%m%dT%H%M%SZ")),
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display())),
        _ => Ok(()),
    }
}

/// Hex sha256 of a taxon batch, recorded so re-ingests of the same file can
/// be recognised.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open taxon batch: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash taxon batch: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_directory(path)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write json to {}", path.display()))?;
    writeln!(writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}

/// Reads a taxon batch saved either as a bare array of records or as a
/// full search response.
pub fn read_records_json(path: &Path) -> Result<Vec<TaxonRecord>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    if let Ok(records) = serde_json::from_slice::<Vec<TaxonRecord>>(&raw) {
        return Ok(records);
    }

    let response: SearchResponse = serde_json::from_slice(&raw).with_context(|| {
        format!(
            "failed to parse taxon records or search response: {}",
            path.display()
        )
    })?;
    Ok(response.data)
}
