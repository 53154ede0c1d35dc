//! Table I/O for the deltamart pipeline.
//!
//! Thin, format-aware readers and writers for typed row tables:
//!
//! - [`read_table`] / [`write_table`]: whole-table codecs (CSV and JSON
//!   record arrays)
//! - [`delta`]: delta-file decoding (the `action` column contract)
//! - [`layout`]: input directory layout and month-coded delta discovery
//!
//! Decoding is strict by design: a missing `action` column, an unknown
//! verb, or an unparsable row fails the file with its path and row number.
//! Proceeding past a bad row would silently corrupt downstream totals.

pub mod delta;
pub mod layout;

pub use delta::read_delta_table;
pub use layout::{deltas_for_month, discover_delta_files, initial_path, DeltaFile};

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

/// On-disk table encoding.
///
/// The merge engine is agnostic to encoding; this enum is the writer/reader
/// collaborators' concern. The upstream system also emitted a columnar
/// binary format, which this port does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Format::Csv),
            Some("json") => Ok(Format::Json),
            other => bail!(
                "unsupported table format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ),
        }
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => bail!("unsupported format {other:?} (expected csv or json)"),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Read a whole typed table, inferring the format from the file extension.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match Format::from_path(path)? {
        Format::Csv => {
            let mut reader = csv::Reader::from_path(path)
                .with_context(|| format!("opening table {}", path.display()))?;
            let mut rows = Vec::new();
            for (idx, row) in reader.deserialize::<T>().enumerate() {
                // +2: one for the header line, one for 1-based counting
                let row = row.with_context(|| format!("{}: row {}", path.display(), idx + 2))?;
                rows.push(row);
            }
            Ok(rows)
        }
        Format::Json => {
            let file =
                File::open(path).with_context(|| format!("opening table {}", path.display()))?;
            let rows: Vec<T> = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("decoding table {}", path.display()))?;
            Ok(rows)
        }
    }
}

/// Write a whole typed table in the requested format.
pub fn write_table<T: Serialize>(rows: &[T], path: &Path, format: Format) -> Result<()> {
    match format {
        Format::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("creating table {}", path.display()))?;
            for row in rows {
                writer
                    .serialize(row)
                    .with_context(|| format!("writing table {}", path.display()))?;
            }
            writer
                .flush()
                .with_context(|| format!("flushing table {}", path.display()))?;
        }
        Format::Json => {
            let file =
                File::create(path).with_context(|| format!("creating table {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), rows)
                .with_context(|| format!("writing table {}", path.display()))?;
        }
    }
    Ok(())
}
