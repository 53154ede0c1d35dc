//! Reference resolution: sentinel substitution for dangling keys.
//!
//! Runs once, after all months are applied, as a pure pass over the merged
//! snapshot, not as incremental patching during replay. Each row is
//! resolved independently against the final key sets, so the pass is
//! order-free and trivially testable.
//!
//! Rows are never deleted here. An interaction whose agent was deleted in
//! a later month keeps its measures and is labeled `Unknown` for that
//! dimension, so it still counts toward center/category totals.

use crate::engine::MergedTables;
use deltamart_model::UNKNOWN;
use std::collections::BTreeSet;

/// Per-field substitution counts, for stage logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub agent_contact_center: usize,
    pub interaction_agent: usize,
    pub interaction_contact_center: usize,
    pub interaction_category: usize,
}

impl ResolveStats {
    pub fn total(&self) -> usize {
        self.agent_contact_center
            + self.interaction_agent
            + self.interaction_contact_center
            + self.interaction_category
    }
}

fn substitute(field: &mut String, live: &BTreeSet<&str>, count: &mut usize) {
    // The sentinel is reserved: a field already holding it stays put and is
    // not counted again, which keeps the pass idempotent.
    if field != UNKNOWN && !live.contains(field.as_str()) {
        *field = UNKNOWN.to_string();
        *count += 1;
    }
}

/// Replace every reference field that does not point at a currently-present
/// key with the sentinel.
///
/// Covers the fact table's three references and the one dimension-to-
/// dimension reference (agent → contact center). Key sets are taken from
/// the final stores, so a dimension deleted in any month resolves to the
/// sentinel everywhere it was referenced.
pub fn resolve_references(mut tables: MergedTables) -> (MergedTables, ResolveStats) {
    let mut stats = ResolveStats::default();

    let contact_centers: BTreeSet<&str> = tables.contact_centers.keys().map(String::as_str).collect();
    let categories: BTreeSet<&str> = tables.service_categories.keys().map(String::as_str).collect();

    for agent in tables.agents.values_mut() {
        substitute(&mut agent.contact_center_id, &contact_centers, &mut stats.agent_contact_center);
    }

    // Agent keys are collected *after* the agent table itself is resolved:
    // resolution only rewrites reference fields, never keys, so the set is
    // the same either way, but the ordering keeps that invariant obvious.
    let agents: BTreeSet<&str> = tables.agents.keys().map(String::as_str).collect();

    for interaction in tables.interactions.values_mut() {
        substitute(&mut interaction.agent_id, &agents, &mut stats.interaction_agent);
        substitute(
            &mut interaction.contact_center_id,
            &contact_centers,
            &mut stats.interaction_contact_center,
        );
        substitute(&mut interaction.category_id, &categories, &mut stats.interaction_category);
    }

    (tables, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use deltamart_model::{Agent, ContactCenter, Interaction};

    fn agent(id: &str, center: &str) -> Agent {
        Agent {
            agent_id: id.to_string(),
            agent_name: format!("Agent {id}"),
            contact_center_id: center.to_string(),
            hire_date: "2023-05-01".parse().unwrap(),
            status: "active".to_string(),
        }
    }

    fn center(id: &str) -> ContactCenter {
        ContactCenter {
            contact_center_id: id.to_string(),
            contact_center_name: format!("Center {id}"),
            city: "Atlanta".to_string(),
            state: "GA".to_string(),
            region: "SE".to_string(),
        }
    }

    fn interaction(id: &str, agent: &str, center: &str, category: &str) -> Interaction {
        let ts: DateTime<chrono::FixedOffset> = "2025-02-03T14:00:00+00:00".parse().unwrap();
        Interaction {
            interaction_id: id.to_string(),
            agent_id: agent.to_string(),
            contact_center_id: center.to_string(),
            category_id: category.to_string(),
            channel: "phone".to_string(),
            interaction_start: ts,
            interaction_end: ts,
            agent_resolution_timestamp: ts,
            call_duration_minutes: 4.0,
        }
    }

    fn tables() -> MergedTables {
        let mut t = MergedTables::default();
        t.contact_centers.insert("CC1".to_string(), center("CC1"));
        t.agents.insert("A1".to_string(), agent("A1", "CC1"));
        t.agents.insert("A2".to_string(), agent("A2", "CC9"));
        t.interactions
            .insert("I1".to_string(), interaction("I1", "A1", "CC1", "SC1"));
        t.interactions
            .insert("I2".to_string(), interaction("I2", "A9", "CC9", "SC1"));
        t
    }

    #[test]
    fn dangling_references_become_the_sentinel() {
        let (resolved, stats) = resolve_references(tables());

        // no category table entries at all: every category ref dangles
        assert_eq!(stats.interaction_category, 2);
        assert_eq!(stats.interaction_agent, 1);
        assert_eq!(stats.interaction_contact_center, 1);
        assert_eq!(stats.agent_contact_center, 1);

        let i2 = &resolved.interactions["I2"];
        assert_eq!(i2.agent_id, "Unknown");
        assert_eq!(i2.contact_center_id, "Unknown");
        assert_eq!(i2.category_id, "Unknown");
        assert_eq!(resolved.agents["A2"].contact_center_id, "Unknown");
    }

    #[test]
    fn live_references_and_measures_are_untouched() {
        let (resolved, _) = resolve_references(tables());
        let i1 = &resolved.interactions["I1"];
        assert_eq!(i1.agent_id, "A1");
        assert_eq!(i1.contact_center_id, "CC1");
        assert_eq!(i1.call_duration_minutes, 4.0);
        assert_eq!(resolved.interactions.len(), 2, "rows are never deleted");
    }

    #[test]
    fn resolution_is_idempotent() {
        let (once, _) = resolve_references(tables());
        let (twice, stats) = resolve_references(once.clone());
        assert_eq!(once, twice);
        assert_eq!(stats.total(), 0, "second pass finds nothing to substitute");
    }
}
