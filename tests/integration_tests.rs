//! Integration tests for the complete deltamart pipeline.
//!
//! These tests verify end-to-end functionality across crates, driving the
//! same stages the CLI does over real files in a temp dir:
//! discovery → decoding → merge engine → final tables → report.
//!
//! Run with: cargo test --test integration_tests

use anyhow::Result;
use deltamart_merge::{InitialSnapshot, MergeConfig, MergeEngine, MergedTables, MonthlyDeltas, ZoneRules};
use deltamart_model::{month::parse_month_list, EntityKind};
use deltamart_tables::{
    deltas_for_month, discover_delta_files, initial_path, read_delta_table, read_table, write_table,
    Format,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// ============================================================================
// Fixture plumbing
// ============================================================================

const AGENT_HEADER: &str = "action,agent_id,agent_name,contact_center_id,hire_date,status\n";
const CENTER_HEADER: &str = "action,contact_center_id,contact_center_name,city,state,region\n";
const CATEGORY_HEADER: &str = "action,category_id,category_name,department,description\n";
const INTERACTION_HEADER: &str = "action,interaction_id,agent_id,contact_center_id,category_id,\
channel,interaction_start,interaction_end,agent_resolution_timestamp,call_duration_minutes\n";

fn write_initial(data_dir: &Path) {
    let initial = data_dir.join("initial");
    fs::create_dir_all(&initial).unwrap();
    fs::write(
        initial.join("agents.csv"),
        "agent_id,agent_name,contact_center_id,hire_date,status\n\
         A1,Ada Lovelace,CC1,2023-05-01,active\n",
    )
    .unwrap();
    fs::write(
        initial.join("contact_centers.csv"),
        "contact_center_id,contact_center_name,city,state,region\n\
         CC1,Atlanta GA SE,Atlanta,GA,SE\n",
    )
    .unwrap();
    fs::write(
        initial.join("service_categories.csv"),
        "category_id,category_name,department,description\n\
         SC1,Billing,Finance,Billing questions\n",
    )
    .unwrap();
    fs::write(
        initial.join("interactions.csv"),
        "interaction_id,agent_id,contact_center_id,category_id,channel,\
         interaction_start,interaction_end,agent_resolution_timestamp,call_duration_minutes\n",
    )
    .unwrap();
}

/// Write a delta file; header-only contents model a month with no changes
/// for that entity.
fn write_delta(data_dir: &Path, name: &str, contents: &str) {
    let delta = data_dir.join("delta");
    fs::create_dir_all(&delta).unwrap();
    fs::write(delta.join(name), contents).unwrap();
}

/// A month where nothing changed still ships all four delta files.
fn write_empty_month(data_dir: &Path, month: &str, except: &[EntityKind]) {
    let headers = [
        (EntityKind::Agent, AGENT_HEADER),
        (EntityKind::ContactCenter, CENTER_HEADER),
        (EntityKind::ServiceCategory, CATEGORY_HEADER),
        (EntityKind::Interaction, INTERACTION_HEADER),
    ];
    for (kind, header) in headers {
        if except.contains(&kind) {
            continue;
        }
        write_delta(data_dir, &format!("{}_{month}.csv", kind.table_name()), header);
    }
}

fn interaction_add(id: &str, ts: &str, minutes: f64) -> String {
    format!("add,{id},A1,CC1,SC1,phone,{ts},{ts},{ts},{minutes}\n")
}

/// Drive the same stages `deltamart run` does, minus the output writing.
fn run_pipeline(data_dir: &Path, months: &str) -> Result<MergedTables> {
    let months = parse_month_list(months)?;
    let config = MergeConfig::new(months.clone(), ZoneRules::us_eastern())?;
    let mut engine = MergeEngine::new(config);

    engine.load_initial(InitialSnapshot {
        agents: read_table(&initial_path(data_dir, EntityKind::Agent))?,
        contact_centers: read_table(&initial_path(data_dir, EntityKind::ContactCenter))?,
        service_categories: read_table(&initial_path(data_dir, EntityKind::ServiceCategory))?,
        interactions: read_table(&initial_path(data_dir, EntityKind::Interaction))?,
    })?;

    let files = discover_delta_files(data_dir)?;
    for month in &months {
        let deltas = MonthlyDeltas {
            agents: read_delta_table(&deltas_for_month(&files, EntityKind::Agent, *month)?.path)?,
            contact_centers: read_delta_table(
                &deltas_for_month(&files, EntityKind::ContactCenter, *month)?.path,
            )?,
            service_categories: read_delta_table(
                &deltas_for_month(&files, EntityKind::ServiceCategory, *month)?.path,
            )?,
            interactions: read_delta_table(
                &deltas_for_month(&files, EntityKind::Interaction, *month)?.path,
            )?,
        };
        engine.apply_month(*month, deltas)?;
    }
    Ok(engine.finish()?)
}

/// The reporting scenario: February adds five interactions against CC1,
/// March adds three more and deletes CC1 itself.
fn write_atlanta_fixture(data_dir: &Path) {
    write_initial(data_dir);

    write_empty_month(data_dir, "202502", &[EntityKind::Interaction]);
    let mut feb = String::from(INTERACTION_HEADER);
    feb += &interaction_add("I1", "2025-02-03T14:00:00Z", 12.5);
    feb += &interaction_add("I2", "2025-02-05T15:30:00Z", 4.0);
    feb += &interaction_add("I3", "2025-02-10T16:00:00Z", 7.25);
    feb += &interaction_add("I4", "2025-02-18T18:45:00Z", 9.0);
    feb += &interaction_add("I5", "2025-02-21T20:00:00Z", 3.5);
    write_delta(data_dir, "interactions_202502.csv", &feb);

    write_empty_month(
        data_dir,
        "202503",
        &[EntityKind::Interaction, EntityKind::ContactCenter],
    );
    let mut mar = String::from(INTERACTION_HEADER);
    mar += &interaction_add("I6", "2025-03-04T14:00:00Z", 5.0);
    mar += &interaction_add("I7", "2025-03-15T14:00:00Z", 6.0);
    mar += &interaction_add("I8", "2025-03-20T21:00:00Z", 11.0);
    write_delta(data_dir, "interactions_202503.csv", &mar);
    write_delta(
        data_dir,
        "contact_centers_202503.csv",
        &format!("{CENTER_HEADER}delete,CC1,,,,\n"),
    );
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn atlanta_scenario_resolves_deleted_center_to_unknown() {
    let dir = tempdir().unwrap();
    write_atlanta_fixture(dir.path());

    let tables = run_pipeline(dir.path(), "202502,202503").unwrap();

    assert!(tables.contact_centers.is_empty(), "CC1 was deleted in March");
    assert_eq!(tables.interactions.len(), 8, "all 8 added rows survive");
    for (id, interaction) in &tables.interactions {
        assert_eq!(
            interaction.contact_center_id, "Unknown",
            "{id} should reference the sentinel"
        );
        assert_eq!(interaction.agent_id, "A1", "agent A1 still exists");
        assert_eq!(interaction.category_id, "SC1");
        assert!(interaction.call_duration_minutes > 0.0, "measures intact");
    }

    // the agent's own center reference dangles too
    assert_eq!(tables.agents["A1"].contact_center_id, "Unknown");
}

#[test]
fn atlanta_scenario_normalizes_timestamps_across_the_dst_boundary() {
    let dir = tempdir().unwrap();
    write_atlanta_fixture(dir.path());

    let tables = run_pipeline(dir.path(), "202502,202503").unwrap();

    // February and early March are EST; mid-March onward is EDT
    assert_eq!(
        tables.interactions["I1"].interaction_end.to_rfc3339(),
        "2025-02-03T09:00:00-05:00"
    );
    assert_eq!(
        tables.interactions["I6"].interaction_end.to_rfc3339(),
        "2025-03-04T09:00:00-05:00"
    );
    assert_eq!(
        tables.interactions["I7"].interaction_end.to_rfc3339(),
        "2025-03-15T10:00:00-04:00"
    );
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn replaying_the_same_inputs_twice_is_byte_identical() {
    let dir = tempdir().unwrap();
    write_atlanta_fixture(dir.path());

    let first = run_pipeline(dir.path(), "202502,202503").unwrap();
    let second = run_pipeline(dir.path(), "202502,202503").unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    // and the written tables are byte-identical too
    let out_a = dir.path().join("out_a");
    let out_b = dir.path().join("out_b");
    for (tables, out) in [(&first, &out_a), (&second, &out_b)] {
        fs::create_dir_all(out).unwrap();
        let rows: Vec<_> = tables.interactions.values().collect();
        write_table(&rows, &out.join("interactions_final.csv"), Format::Csv).unwrap();
    }
    assert_eq!(
        fs::read(out_a.join("interactions_final.csv")).unwrap(),
        fs::read(out_b.join("interactions_final.csv")).unwrap()
    );
}

// ============================================================================
// Order sensitivity
// ============================================================================

#[test]
fn update_then_delete_across_months_removes_the_key() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202502.csv",
        &format!("{CENTER_HEADER}update,CC1,Atlanta GA SE v2,Atlanta,GA,SE\n"),
    );
    write_empty_month(dir.path(), "202503", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202503.csv",
        &format!("{CENTER_HEADER}delete,CC1,,,,\n"),
    );

    let tables = run_pipeline(dir.path(), "202502,202503").unwrap();
    assert!(!tables.contact_centers.contains_key("CC1"));
}

#[test]
fn delete_then_add_across_months_keeps_the_added_row() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202502.csv",
        &format!("{CENTER_HEADER}delete,CC1,,,,\n"),
    );
    write_empty_month(dir.path(), "202503", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202503.csv",
        &format!("{CENTER_HEADER}add,CC1,Atlanta GA SE rebuilt,Atlanta,GA,SE\n"),
    );

    let tables = run_pipeline(dir.path(), "202502,202503").unwrap();
    assert_eq!(
        tables.contact_centers["CC1"].contact_center_name,
        "Atlanta GA SE rebuilt"
    );
}

#[test]
fn update_then_delete_within_one_file_removes_the_key() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202502.csv",
        &format!(
            "{CENTER_HEADER}\
             update,CC1,Atlanta GA SE v2,Atlanta,GA,SE\n\
             delete,CC1,,,,\n"
        ),
    );

    let tables = run_pipeline(dir.path(), "202502").unwrap();
    assert!(!tables.contact_centers.contains_key("CC1"));
}

// ============================================================================
// Fatal inputs
// ============================================================================

#[test]
fn missing_delta_file_for_a_requested_month_aborts() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[]);
    // no 202503 files at all

    let err = run_pipeline(dir.path(), "202502,202503").unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("202503"), "got: {msg}");
    assert!(msg.contains("missing delta file"), "got: {msg}");
}

#[test]
fn unknown_action_verb_aborts_with_file_and_row() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[EntityKind::ContactCenter]);
    write_delta(
        dir.path(),
        "contact_centers_202502.csv",
        &format!("{CENTER_HEADER}merge,CC1,Atlanta GA SE,Atlanta,GA,SE\n"),
    );

    let err = run_pipeline(dir.path(), "202502").unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("merge"), "got: {msg}");
    assert!(msg.contains("row 2"), "got: {msg}");
}

#[test]
fn out_of_order_month_request_aborts() {
    let dir = tempdir().unwrap();
    write_initial(dir.path());
    write_empty_month(dir.path(), "202502", &[]);
    write_empty_month(dir.path(), "202503", &[]);

    let err = run_pipeline(dir.path(), "202503,202502").unwrap_err();
    assert!(format!("{err:#}").contains("ascending"));
}

// ============================================================================
// Report over the finished tables
// ============================================================================

#[test]
fn report_counts_orphaned_interactions_under_the_sentinel() {
    let dir = tempdir().unwrap();
    write_atlanta_fixture(dir.path());
    let tables = run_pipeline(dir.path(), "202502,202503").unwrap();

    let interactions: Vec<_> = tables.interactions.values().cloned().collect();
    let contact_centers: Vec<_> = tables.contact_centers.values().cloned().collect();
    let service_categories: Vec<_> = tables.service_categories.values().cloned().collect();
    let rows = deltamart_report::build_report(&interactions, &contact_centers, &service_categories);

    // two months, one (sentinel) center, one department
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.contact_center_name == "Unknown"));
    assert!(rows.iter().all(|r| r.department == "Finance"));
    assert_eq!(
        rows.iter().map(|r| r.total_interactions).sum::<u64>(),
        8,
        "orphaned rows still count toward totals"
    );

    let busiest = deltamart_report::answers::busiest_month(&rows).unwrap();
    assert_eq!(busiest.month, "2025-02");
    assert_eq!(busiest.total_interactions, 5);
}
