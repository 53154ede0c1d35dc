//! Monthly support report over the merged tables.
//!
//! Consumes the *finished* tables (references resolved, timestamps already
//! in the destination zone) and aggregates interactions by month ×
//! contact center × department. Dimension names are joined in here; a
//! reference holding the sentinel simply fails the lookup and keeps the
//! sentinel as its label, so orphaned interactions still land in a bucket
//! and count toward totals.

pub mod answers;

use chrono::{DateTime, FixedOffset};
use deltamart_model::{ContactCenter, Interaction, ServiceCategory, UNKNOWN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One aggregated report bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Local-time month of `interaction_end`, `YYYY-MM`.
    pub month: String,
    pub contact_center_name: String,
    pub department: String,
    pub total_interactions: u64,
    pub total_calls: u64,
    pub total_call_duration: f64,
}

/// Month bucket for an already-normalized timestamp.
fn month_of(ts: DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m").to_string()
}

fn is_call(interaction: &Interaction) -> bool {
    interaction.channel.eq_ignore_ascii_case("phone")
}

/// Aggregate the final interactions into report rows.
///
/// Buckets come out sorted by (month, center, department), so the report
/// is deterministic for identical inputs.
pub fn build_report(
    interactions: &[Interaction],
    contact_centers: &[ContactCenter],
    service_categories: &[ServiceCategory],
) -> Vec<ReportRow> {
    let center_names: BTreeMap<&str, &str> = contact_centers
        .iter()
        .map(|c| (c.contact_center_id.as_str(), c.contact_center_name.as_str()))
        .collect();
    let departments: BTreeMap<&str, &str> = service_categories
        .iter()
        .map(|c| (c.category_id.as_str(), c.department.as_str()))
        .collect();

    #[derive(Default)]
    struct Bucket {
        interactions: u64,
        calls: u64,
        call_duration: f64,
    }

    let mut buckets: BTreeMap<(String, String, String), Bucket> = BTreeMap::new();
    for interaction in interactions {
        let center = center_names
            .get(interaction.contact_center_id.as_str())
            .copied()
            .unwrap_or(UNKNOWN);
        let department = departments
            .get(interaction.category_id.as_str())
            .copied()
            .unwrap_or(UNKNOWN);
        let key = (
            month_of(interaction.interaction_end),
            center.to_string(),
            department.to_string(),
        );

        let bucket = buckets.entry(key).or_default();
        bucket.interactions += 1;
        if is_call(interaction) {
            bucket.calls += 1;
            bucket.call_duration += interaction.call_duration_minutes;
        }
    }

    buckets
        .into_iter()
        .map(|((month, contact_center_name, department), bucket)| ReportRow {
            month,
            contact_center_name,
            department,
            total_interactions: bucket.interactions,
            total_calls: bucket.calls,
            total_call_duration: bucket.call_duration,
        })
        .collect()
}
