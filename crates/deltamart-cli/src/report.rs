//! `deltamart report`: aggregate final tables into the support report.

use crate::run::final_path;
use anyhow::{Context, Result};
use colored::Colorize;
use deltamart_model::{ContactCenter, EntityKind, Interaction, ServiceCategory};
use deltamart_report::build_report;
use deltamart_tables::{read_table, write_table, Format};
use std::path::Path;

pub fn cmd_report(data_dir: &Path, out_dir: &Path, format: Format) -> Result<()> {
    let interactions: Vec<Interaction> =
        read_table(&final_path(data_dir, EntityKind::Interaction, format))
            .context("reading final interactions table (run `deltamart run` first)")?;
    let contact_centers: Vec<ContactCenter> =
        read_table(&final_path(data_dir, EntityKind::ContactCenter, format))?;
    let service_categories: Vec<ServiceCategory> =
        read_table(&final_path(data_dir, EntityKind::ServiceCategory, format))?;

    let rows = build_report(&interactions, &contact_centers, &service_categories);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating report dir {}", out_dir.display()))?;
    let report_path = out_dir.join(format!("support_report.{}", format.extension()));
    write_table(&rows, &report_path, format)?;

    eprintln!(
        "{} {} report rows -> {}",
        "wrote".green().bold(),
        rows.len(),
        report_path.display().to_string().bold(),
    );
    Ok(())
}
