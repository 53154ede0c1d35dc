//! `deltamart run`: the full merge pipeline.
//!
//! Orchestration only: decoding lives in `deltamart-tables`, semantics in
//! `deltamart-merge`. All inputs are read and merged before the first
//! output byte is written, so a failing run leaves no partial tables.

use anyhow::{Context, Result};
use colored::Colorize;
use deltamart_merge::{InitialSnapshot, MergeConfig, MergeEngine, MergedTables, MonthlyDeltas, ZoneRules};
use deltamart_model::{month::parse_month_list, EntityKind, MonthCode};
use deltamart_tables::{
    deltas_for_month, discover_delta_files, initial_path, read_delta_table, read_table, write_table,
    DeltaFile, Format,
};
use std::path::{Path, PathBuf};

/// Path of one finished table under `out_dir`.
pub(crate) fn final_path(dir: &Path, kind: EntityKind, format: Format) -> PathBuf {
    dir.join(format!("{}_final.{}", kind.table_name(), format.extension()))
}

fn load_initial_snapshot(data_dir: &Path) -> Result<InitialSnapshot> {
    Ok(InitialSnapshot {
        agents: read_table(&initial_path(data_dir, EntityKind::Agent))?,
        contact_centers: read_table(&initial_path(data_dir, EntityKind::ContactCenter))?,
        service_categories: read_table(&initial_path(data_dir, EntityKind::ServiceCategory))?,
        interactions: read_table(&initial_path(data_dir, EntityKind::Interaction))?,
    })
}

fn load_month_deltas(files: &[DeltaFile], month: MonthCode) -> Result<MonthlyDeltas> {
    Ok(MonthlyDeltas {
        agents: read_delta_table(&deltas_for_month(files, EntityKind::Agent, month)?.path)?,
        contact_centers: read_delta_table(&deltas_for_month(files, EntityKind::ContactCenter, month)?.path)?,
        service_categories: read_delta_table(&deltas_for_month(files, EntityKind::ServiceCategory, month)?.path)?,
        interactions: read_delta_table(&deltas_for_month(files, EntityKind::Interaction, month)?.path)?,
    })
}

fn write_final_tables(tables: &MergedTables, out_dir: &Path, format: Format) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;

    let agents: Vec<_> = tables.agents.values().collect();
    write_table(&agents, &final_path(out_dir, EntityKind::Agent, format), format)?;

    let centers: Vec<_> = tables.contact_centers.values().collect();
    write_table(&centers, &final_path(out_dir, EntityKind::ContactCenter, format), format)?;

    let categories: Vec<_> = tables.service_categories.values().collect();
    write_table(&categories, &final_path(out_dir, EntityKind::ServiceCategory, format), format)?;

    let interactions: Vec<_> = tables.interactions.values().collect();
    write_table(&interactions, &final_path(out_dir, EntityKind::Interaction, format), format)?;

    Ok(())
}

pub fn cmd_run(data_dir: &Path, out_dir: &Path, format: Format, months: &str) -> Result<()> {
    let months = parse_month_list(months)?;
    let config = MergeConfig::new(months.clone(), ZoneRules::us_eastern())?;
    let mut engine = MergeEngine::new(config);

    engine.load_initial(load_initial_snapshot(data_dir)?)?;

    let discovered = discover_delta_files(data_dir)?;
    for month in &months {
        let deltas = load_month_deltas(&discovered, *month)
            .with_context(|| format!("loading deltas for month {month}"))?;
        engine.apply_month(*month, deltas)?;
    }

    let tables = engine.finish()?;
    write_final_tables(&tables, out_dir, format)?;

    eprintln!(
        "{} {} agents, {} contact centers, {} service categories, {} interactions -> {}",
        "merged".green().bold(),
        tables.agents.len(),
        tables.contact_centers.len(),
        tables.service_categories.len(),
        tables.interactions.len(),
        out_dir.display().to_string().bold(),
    );
    Ok(())
}
