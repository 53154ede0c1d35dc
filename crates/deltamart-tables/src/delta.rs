//! Delta-file decoding.
//!
//! A delta file is a CSV batch for one entity type: the entity's full
//! column set plus an `action` column holding `add`, `update`, or `delete`.
//! Decoding turns each row into a tagged [`DeltaRecord`]; this is the one
//! place unknown verbs are rejected, so everything downstream can match
//! exhaustively on the three legal cases.
//!
//! Delete rows only need their key column populated; whatever else the row
//! carries is ignored (the files are rectangular).

use anyhow::{anyhow, Context, Result};
use deltamart_model::{DeltaAction, DeltaRecord, KeyedRow, ModelError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Decode one delta file into records, preserving file order.
pub fn read_delta_table<R>(path: &Path) -> Result<Vec<DeltaRecord<R>>>
where
    R: KeyedRow + DeserializeOwned,
{
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening delta file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();

    let action_idx = headers
        .iter()
        .position(|h| h.trim() == "action")
        .ok_or_else(|| anyhow!("{}: delta file is missing the required 'action' column", path.display()))?;

    let key_column = R::KIND.key_column();
    let key_idx = headers
        .iter()
        .position(|h| h.trim() == key_column)
        .ok_or_else(|| anyhow!("{}: delta file is missing the key column '{key_column}'", path.display()))?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let line = idx + 2;
        let row = row.with_context(|| format!("{}: row {line}", path.display()))?;

        let verb = row.get(action_idx).unwrap_or_default();
        let action = DeltaAction::parse(verb)
            .with_context(|| format!("{}: row {line}", path.display()))?;

        let record = match action {
            DeltaAction::Delete => {
                let key = row.get(key_idx).unwrap_or_default().trim();
                if key.is_empty() {
                    return Err(ModelError::EmptyKey { key_column })
                        .with_context(|| format!("{}: row {line}", path.display()));
                }
                DeltaRecord::Delete(key.to_string())
            }
            DeltaAction::Add | DeltaAction::Update => {
                let parsed: R = row
                    .deserialize(Some(&headers))
                    .with_context(|| format!("{}: row {line}", path.display()))?;
                if parsed.key().trim().is_empty() {
                    return Err(ModelError::EmptyKey { key_column })
                        .with_context(|| format!("{}: row {line}", path.display()));
                }
                DeltaRecord::from_parts(action, parsed)
            }
        };
        records.push(record);
    }
    Ok(records)
}
