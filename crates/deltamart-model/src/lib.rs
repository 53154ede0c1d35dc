//! Deltamart core table model.
//!
//! This crate defines the typed rows for the four customer-support tables
//! (agents, contact centers, service categories, interactions), the tagged
//! delta-record representation for monthly change batches, and the `YYYYMM`
//! month codes that order those batches.
//!
//! Everything here is plain data: no I/O, no clock access. File decoding
//! lives in `deltamart-tables`; merge semantics live in `deltamart-merge`.

pub mod delta;
pub mod entity;
pub mod month;

pub use delta::{DeltaAction, DeltaRecord};
pub use entity::{Agent, ContactCenter, EntityKind, Interaction, KeyedRow, ServiceCategory};
pub use month::MonthCode;

use thiserror::Error;

/// Placeholder substituted for any dimension reference that cannot be
/// resolved after all months are merged.
pub const UNKNOWN: &str = "Unknown";

/// Errors raised while interpreting raw delta/month values.
///
/// These are *fatal* by contract: an unrecognized action verb or a malformed
/// month code means the input batch cannot be trusted, so callers abort
/// rather than skip (a silent skip would corrupt downstream totals).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unrecognized action {action:?} (expected add, update, or delete)")]
    UnknownAction { action: String },

    #[error("invalid month code {raw:?} (expected YYYYMM)")]
    InvalidMonthCode { raw: String },

    #[error("delta record has an empty {key_column} key")]
    EmptyKey { key_column: &'static str },
}
