//! Merge orchestration.
//!
//! A linear, single-threaded state machine:
//!
//! ```text
//! INIT → LOAD_INITIAL → (APPLY_MONTH)* → RESOLVE_REFERENCES
//!      → NORMALIZE_TIMESTAMPS → DONE
//! ```
//!
//! The engine processes exactly the month list it was configured with, in
//! that order, and refuses anything else: a month applied out of sequence,
//! a month missing at `finish`, or deltas before the snapshot are all fatal.
//! There are no retries and no partial output: `finish` hands back tables
//! only from a fully successful run.
//!
//! All I/O stays outside: callers decode files into [`InitialSnapshot`] /
//! [`MonthlyDeltas`] values (see `deltamart-tables`) and feed them in.

use crate::apply::apply_batch;
use crate::resolve::resolve_references;
use crate::store::EntityStore;
use crate::zone::{normalize_timestamp, ZoneRules};
use deltamart_model::{Agent, ContactCenter, DeltaRecord, Interaction, MonthCode, ServiceCategory};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("requested months must be strictly ascending: {prev} does not precede {next}")]
    MonthsNotAscending { prev: MonthCode, next: MonthCode },

    #[error("initial snapshot already loaded")]
    SnapshotAlreadyLoaded,

    #[error("initial snapshot must be loaded before this step")]
    SnapshotNotLoaded,

    #[error("month {month} applied out of sequence (expected {expected})")]
    UnexpectedMonth { month: MonthCode, expected: MonthCode },

    #[error("month {month} applied but no further months were requested")]
    MonthNotRequested { month: MonthCode },

    #[error("requested month {month} was never applied")]
    MonthNotApplied { month: MonthCode },
}

/// Engine configuration: the ordered month list and the destination zone.
///
/// Both are passed in explicitly; the engine keeps no process-wide state.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    months: Vec<MonthCode>,
    zone: ZoneRules,
}

impl MergeConfig {
    /// Build a config, rejecting month lists that are not strictly
    /// ascending. An empty list is legal: the run is then snapshot →
    /// resolve → normalize with no deltas.
    pub fn new(months: Vec<MonthCode>, zone: ZoneRules) -> Result<Self, MergeError> {
        for pair in months.windows(2) {
            if pair[0] >= pair[1] {
                return Err(MergeError::MonthsNotAscending {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(MergeConfig { months, zone })
    }

    pub fn months(&self) -> &[MonthCode] {
        &self.months
    }

    pub fn zone(&self) -> &ZoneRules {
        &self.zone
    }
}

/// Decoded initial snapshot, one row set per entity type.
#[derive(Debug, Clone, Default)]
pub struct InitialSnapshot {
    pub agents: Vec<Agent>,
    pub contact_centers: Vec<ContactCenter>,
    pub service_categories: Vec<ServiceCategory>,
    pub interactions: Vec<Interaction>,
}

/// One month's decoded delta batches, one per entity type, each already in
/// file order.
#[derive(Debug, Clone, Default)]
pub struct MonthlyDeltas {
    pub agents: Vec<DeltaRecord<Agent>>,
    pub contact_centers: Vec<DeltaRecord<ContactCenter>>,
    pub service_categories: Vec<DeltaRecord<ServiceCategory>>,
    pub interactions: Vec<DeltaRecord<Interaction>>,
}

impl MonthlyDeltas {
    pub fn record_count(&self) -> usize {
        self.agents.len() + self.contact_centers.len() + self.service_categories.len() + self.interactions.len()
    }
}

/// The four finished tables: resolved, normalized, keyed by primary key.
///
/// `BTreeMap` keys give a deterministic row order, so serializing the same
/// merged state twice yields byte-identical output. No further ordering
/// contract is imposed on writers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedTables {
    pub agents: BTreeMap<String, Agent>,
    pub contact_centers: BTreeMap<String, ContactCenter>,
    pub service_categories: BTreeMap<String, ServiceCategory>,
    pub interactions: BTreeMap<String, Interaction>,
}

/// The delta-merge engine. One value per pipeline run.
pub struct MergeEngine {
    config: MergeConfig,
    agents: EntityStore<Agent>,
    contact_centers: EntityStore<ContactCenter>,
    service_categories: EntityStore<ServiceCategory>,
    interactions: EntityStore<Interaction>,
    snapshot_loaded: bool,
    months_applied: usize,
}

impl MergeEngine {
    pub fn new(config: MergeConfig) -> Self {
        MergeEngine {
            config,
            agents: EntityStore::new(),
            contact_centers: EntityStore::new(),
            service_categories: EntityStore::new(),
            interactions: EntityStore::new(),
            snapshot_loaded: false,
            months_applied: 0,
        }
    }

    /// LOAD_INITIAL: populate each store from the snapshot. Each row is a
    /// `put`, so duplicate keys within the snapshot resolve last-write-wins
    /// like everywhere else.
    pub fn load_initial(&mut self, snapshot: InitialSnapshot) -> Result<(), MergeError> {
        if self.snapshot_loaded {
            return Err(MergeError::SnapshotAlreadyLoaded);
        }
        for row in snapshot.agents {
            self.agents.put(row);
        }
        for row in snapshot.contact_centers {
            self.contact_centers.put(row);
        }
        for row in snapshot.service_categories {
            self.service_categories.put(row);
        }
        for row in snapshot.interactions {
            self.interactions.put(row);
        }
        self.snapshot_loaded = true;
        info!(
            agents = self.agents.len(),
            contact_centers = self.contact_centers.len(),
            service_categories = self.service_categories.len(),
            interactions = self.interactions.len(),
            "initial snapshot loaded"
        );
        Ok(())
    }

    /// APPLY_MONTH: replay one month's batches against the state left by
    /// the previous month. `month` must be exactly the next entry of the
    /// configured list.
    pub fn apply_month(&mut self, month: MonthCode, deltas: MonthlyDeltas) -> Result<(), MergeError> {
        if !self.snapshot_loaded {
            return Err(MergeError::SnapshotNotLoaded);
        }
        match self.config.months.get(self.months_applied) {
            Some(expected) if *expected == month => {}
            Some(expected) => {
                return Err(MergeError::UnexpectedMonth {
                    month,
                    expected: *expected,
                })
            }
            None => return Err(MergeError::MonthNotRequested { month }),
        }

        let records = deltas.record_count();
        let agent_stats = apply_batch(&mut self.agents, deltas.agents);
        let center_stats = apply_batch(&mut self.contact_centers, deltas.contact_centers);
        let category_stats = apply_batch(&mut self.service_categories, deltas.service_categories);
        let interaction_stats = apply_batch(&mut self.interactions, deltas.interactions);
        debug!(
            %month,
            agents = ?agent_stats,
            contact_centers = ?center_stats,
            service_categories = ?category_stats,
            interactions = ?interaction_stats,
            "month batches replayed"
        );

        self.months_applied += 1;
        info!(%month, records, "month applied");
        Ok(())
    }

    /// RESOLVE_REFERENCES + NORMALIZE_TIMESTAMPS + DONE.
    ///
    /// Fails if any configured month was never applied: later months'
    /// correctness depends on every earlier one, so a gap invalidates the
    /// whole run.
    pub fn finish(self) -> Result<MergedTables, MergeError> {
        if !self.snapshot_loaded {
            return Err(MergeError::SnapshotNotLoaded);
        }
        if let Some(missing) = self.config.months.get(self.months_applied) {
            return Err(MergeError::MonthNotApplied { month: *missing });
        }

        let tables = MergedTables {
            agents: self.agents.snapshot(),
            contact_centers: self.contact_centers.snapshot(),
            service_categories: self.service_categories.snapshot(),
            interactions: self.interactions.snapshot(),
        };

        let (mut tables, resolve_stats) = resolve_references(tables);
        info!(substituted = resolve_stats.total(), "references resolved");

        let zone = &self.config.zone;
        let mut fields = 0usize;
        for interaction in tables.interactions.values_mut() {
            interaction.interaction_start = normalize_timestamp(interaction.interaction_start, zone);
            interaction.interaction_end = normalize_timestamp(interaction.interaction_end, zone);
            interaction.agent_resolution_timestamp =
                normalize_timestamp(interaction.agent_resolution_timestamp, zone);
            fields += 3;
        }
        info!(zone = %zone.name, fields, "timestamps normalized");

        Ok(tables)
    }
}
