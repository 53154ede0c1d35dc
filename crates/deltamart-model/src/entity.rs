//! Typed rows for the four support tables.
//!
//! Field sets mirror the upstream export schema: string primary keys,
//! reference fields holding the referenced table's key, and timestamps as
//! absolute instants with an explicit offset. Inputs arrive in UTC; the
//! merge engine rewrites every timestamp to the destination zone exactly
//! once, so a row only ever carries one "generation" of offsets.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four entity types handled by the pipeline.
///
/// `Interaction` is the fact table; the other three are dimensions it
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agent,
    ContactCenter,
    ServiceCategory,
    Interaction,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Agent,
        EntityKind::ContactCenter,
        EntityKind::ServiceCategory,
        EntityKind::Interaction,
    ];

    /// Table name as used in file names (`agents.csv`, `agents_202502.csv`).
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Agent => "agents",
            EntityKind::ContactCenter => "contact_centers",
            EntityKind::ServiceCategory => "service_categories",
            EntityKind::Interaction => "interactions",
        }
    }

    /// Name of the primary-key column in this entity's files.
    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::Agent => "agent_id",
            EntityKind::ContactCenter => "contact_center_id",
            EntityKind::ServiceCategory => "category_id",
            EntityKind::Interaction => "interaction_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row with a stable string primary key.
///
/// Keys are unique per entity type at any point in the merge timeline; the
/// store enforces this structurally (one slot per key).
pub trait KeyedRow: Clone {
    const KIND: EntityKind;

    fn key(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub agent_name: String,
    /// Reference into the contact-center table.
    pub contact_center_id: String,
    pub hire_date: NaiveDate,
    pub status: String,
}

impl KeyedRow for Agent {
    const KIND: EntityKind = EntityKind::Agent;

    fn key(&self) -> &str {
        &self.agent_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCenter {
    pub contact_center_id: String,
    pub contact_center_name: String,
    pub city: String,
    pub state: String,
    pub region: String,
}

impl KeyedRow for ContactCenter {
    const KIND: EntityKind = EntityKind::ContactCenter;

    fn key(&self) -> &str {
        &self.contact_center_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub category_id: String,
    pub category_name: String,
    pub department: String,
    pub description: String,
}

impl KeyedRow for ServiceCategory {
    const KIND: EntityKind = EntityKind::ServiceCategory;

    fn key(&self) -> &str {
        &self.category_id
    }
}

/// Fact row: one customer interaction.
///
/// The three `*_id` reference fields may dangle after deltas delete their
/// targets; the reference-resolution pass substitutes the sentinel, never
/// the row itself. Measures on orphaned rows stay intact so they still
/// count toward totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: String,
    pub agent_id: String,
    pub contact_center_id: String,
    pub category_id: String,
    /// Contact channel, e.g. `phone`, `chat`, `email`.
    pub channel: String,
    pub interaction_start: DateTime<FixedOffset>,
    pub interaction_end: DateTime<FixedOffset>,
    pub agent_resolution_timestamp: DateTime<FixedOffset>,
    pub call_duration_minutes: f64,
}

impl KeyedRow for Interaction {
    const KIND: EntityKind = EntityKind::Interaction;

    fn key(&self) -> &str {
        &self.interaction_id
    }
}
