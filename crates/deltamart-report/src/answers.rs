//! Business answers computed over report rows.
//!
//! These mirror the questions the report exists to answer:
//!
//! 1. total interactions handled by each contact center,
//! 2. the month with the highest interaction volume,
//! 3. the contact center with the longest average call duration.
//!
//! Ties resolve deterministically (earliest month, then lexicographic
//! center name) so repeated runs print the same answer.

use crate::ReportRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterTotal {
    pub contact_center_name: String,
    pub total_interactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: String,
    pub total_interactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterCallAverage {
    pub contact_center_name: String,
    pub total_calls: u64,
    pub total_call_duration: f64,
    pub avg_call_duration: f64,
}

/// Q1: total interactions per contact center, sorted by center name.
pub fn total_interactions_by_center(rows: &[ReportRow]) -> Vec<CenterTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.contact_center_name.as_str()).or_default() += row.total_interactions;
    }
    totals
        .into_iter()
        .map(|(name, total_interactions)| CenterTotal {
            contact_center_name: name.to_string(),
            total_interactions,
        })
        .collect()
}

/// Q2: the month with the highest total interaction volume.
pub fn busiest_month(rows: &[ReportRow]) -> Option<MonthTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.month.as_str()).or_default() += row.total_interactions;
    }
    totals
        .into_iter()
        // BTreeMap iterates months ascending; max_by_key keeps the last
        // maximum, so prefer the earliest month on ties by comparing
        // (total, Reverse(month)) explicitly.
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(month, total_interactions)| MonthTotal {
            month: month.to_string(),
            total_interactions,
        })
}

/// Q3: the contact center with the longest average phone-call duration.
///
/// Centers with no calls at all are skipped rather than divided by zero.
pub fn longest_avg_call(rows: &[ReportRow]) -> Option<CenterCallAverage> {
    #[derive(Default)]
    struct Acc {
        calls: u64,
        duration: f64,
    }

    let mut totals: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in rows {
        let acc = totals.entry(row.contact_center_name.as_str()).or_default();
        acc.calls += row.total_calls;
        acc.duration += row.total_call_duration;
    }

    totals
        .into_iter()
        .filter(|(_, acc)| acc.calls > 0)
        .map(|(name, acc)| CenterCallAverage {
            contact_center_name: name.to_string(),
            total_calls: acc.calls,
            total_call_duration: acc.duration,
            avg_call_duration: acc.duration / acc.calls as f64,
        })
        // prefer the lexicographically first name on exact ties
        .max_by(|a, b| {
            a.avg_call_duration
                .total_cmp(&b.avg_call_duration)
                .then_with(|| b.contact_center_name.cmp(&a.contact_center_name))
        })
}
