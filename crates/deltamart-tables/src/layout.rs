//! Input directory layout and delta-file discovery.
//!
//! The loader contract mirrors the upstream export layout:
//!
//! ```text
//! data/
//!   initial/
//!     agents.csv  contact_centers.csv  service_categories.csv  interactions.csv
//!   delta/
//!     agents_202502.csv  interactions_202502.csv  ...  agents_202503.csv ...
//! ```
//!
//! Discovery scans `delta/` once and indexes what exists; the caller then
//! asks for `(entity, month)` pairs. A requested pair with no file is a
//! fatal configuration error: the run cannot guarantee correctness for
//! later months without it.

use anyhow::{bail, Context, Result};
use deltamart_model::{EntityKind, MonthCode};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Path of one entity's initial snapshot file.
pub fn initial_path(data_dir: &Path, kind: EntityKind) -> PathBuf {
    data_dir
        .join("initial")
        .join(format!("{}.csv", kind.table_name()))
}

/// One discovered month-coded delta file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFile {
    pub kind: EntityKind,
    pub month: MonthCode,
    pub path: PathBuf,
}

fn delta_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-z_]+)_([0-9]{6})\.csv$").expect("constant pattern"))
}

/// Parse `{table}_{YYYYMM}.csv` into its entity kind and month.
///
/// Returns `None` for anything that does not match the naming scheme;
/// unrelated files in `delta/` are skipped, not errors.
pub fn parse_delta_name(file_name: &str) -> Option<(EntityKind, MonthCode)> {
    let captures = delta_name_pattern().captures(file_name)?;
    let table = captures.get(1)?.as_str();
    let kind = EntityKind::ALL
        .into_iter()
        .find(|k| k.table_name() == table)?;
    let month: MonthCode = captures.get(2)?.as_str().parse().ok()?;
    Some((kind, month))
}

/// Scan `data_dir/delta` for month-coded delta files.
///
/// The result is sorted by `(kind, month)` so callers iterate
/// deterministically. A missing `delta/` directory yields an empty list;
/// whether that is fatal depends on which months the caller requests.
pub fn discover_delta_files(data_dir: &Path) -> Result<Vec<DeltaFile>> {
    let delta_dir = data_dir.join("delta");
    if !delta_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&delta_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("scanning {}", delta_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some((kind, month)) = parse_delta_name(name) {
            files.push(DeltaFile {
                kind,
                month,
                path: entry.into_path(),
            });
        }
    }
    files.sort_by_key(|f| (f.kind, f.month));
    Ok(files)
}

/// Find the delta file for one `(entity, month)` pair.
///
/// Missing files are fatal: a month was requested, so every entity's batch
/// for it must exist.
pub fn deltas_for_month(files: &[DeltaFile], kind: EntityKind, month: MonthCode) -> Result<&DeltaFile> {
    match files.iter().find(|f| f.kind == kind && f.month == month) {
        Some(file) => Ok(file),
        None => bail!("missing delta file for {kind} in month {month} (expected {}_{month}.csv)", kind.table_name()),
    }
}
