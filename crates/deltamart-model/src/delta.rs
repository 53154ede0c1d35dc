//! Tagged delta records.
//!
//! A monthly delta file is a batch of add/update/delete records for one
//! entity type. We keep the action as a three-case enum carrying either the
//! full replacement row (`Add`/`Update`) or the bare key (`Delete`), so
//! match exhaustiveness covers every legal verb and decoding is the single
//! rejection point for unknown ones.
//!
//! `Add` and `Update` are mechanically identical (both become a full-row
//! `put`); the verb is kept for logging and for callers that care about the
//! distinction. The permissive reading (an `update` of a missing key creates
//! it) follows the upstream system.

use crate::entity::KeyedRow;
use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The action verb as written in a delta file's `action` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaAction {
    Add,
    Update,
    Delete,
}

impl DeltaAction {
    /// Parse an action verb as it appears on disk.
    ///
    /// Verbs are trimmed and matched case-insensitively (upstream exports
    /// are inconsistent about casing). Anything else is fatal for the file.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(DeltaAction::Add),
            "update" => Ok(DeltaAction::Update),
            "delete" => Ok(DeltaAction::Delete),
            _ => Err(ModelError::UnknownAction {
                action: raw.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for DeltaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            DeltaAction::Add => "add",
            DeltaAction::Update => "update",
            DeltaAction::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// One record of a monthly delta batch for entity type `R`.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaRecord<R: KeyedRow> {
    /// Insert the row (full payload).
    Add(R),
    /// Replace the row (full payload, not a field-level patch).
    Update(R),
    /// Remove the row with this key.
    Delete(String),
}

impl<R: KeyedRow> DeltaRecord<R> {
    pub fn action(&self) -> DeltaAction {
        match self {
            DeltaRecord::Add(_) => DeltaAction::Add,
            DeltaRecord::Update(_) => DeltaAction::Update,
            DeltaRecord::Delete(_) => DeltaAction::Delete,
        }
    }

    /// Primary key this record settles.
    pub fn key(&self) -> &str {
        match self {
            DeltaRecord::Add(row) | DeltaRecord::Update(row) => row.key(),
            DeltaRecord::Delete(key) => key,
        }
    }

    /// Build a record from a decoded verb and payload parts.
    ///
    /// `Delete` keeps only the key; any other fields decoded alongside it
    /// are ignored rather than validated (delta files are rectangular).
    pub fn from_parts(action: DeltaAction, row: R) -> Self {
        match action {
            DeltaAction::Add => DeltaRecord::Add(row),
            DeltaAction::Update => DeltaRecord::Update(row),
            DeltaAction::Delete => DeltaRecord::Delete(row.key().to_string()),
        }
    }
}
