//! Delta replay against an entity store.
//!
//! One call replays one month's batch for one entity type, in file order.
//! If the same key appears more than once within a batch the later record
//! wins: the batch models a single settlement for the month, so earlier
//! records for a key are superseded, not conflicting.
//!
//! Unknown verbs never reach this module: decoding rejects them, so replay
//! itself is total.

use crate::store::EntityStore;
use deltamart_model::{DeltaRecord, KeyedRow};

/// Counts of what a batch did to the store, for stage logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub puts: usize,
    pub deletes: usize,
}

/// Replay `records` against `store`, strictly in slice order.
///
/// `Add` and `Update` both become a full-row `put`. The engine does not
/// require a row to pre-exist for `update`, nor to be absent for `add`.
pub fn apply_batch<R: KeyedRow>(store: &mut EntityStore<R>, records: Vec<DeltaRecord<R>>) -> ApplyStats {
    let mut stats = ApplyStats::default();
    for record in records {
        match record {
            DeltaRecord::Add(row) | DeltaRecord::Update(row) => {
                store.put(row);
                stats.puts += 1;
            }
            DeltaRecord::Delete(key) => {
                store.delete(&key);
                stats.deletes += 1;
            }
        }
    }
    stats
}
