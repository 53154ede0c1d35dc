//! `deltamart answers`: print the business answers over the report.

use anyhow::{Context, Result};
use colored::Colorize;
use deltamart_report::answers::{busiest_month, longest_avg_call, total_interactions_by_center};
use deltamart_report::ReportRow;
use deltamart_tables::read_table;
use std::path::Path;

pub fn cmd_answers(report_path: &Path) -> Result<()> {
    let rows: Vec<ReportRow> = read_table(report_path)
        .context("reading support report (run `deltamart report` first)")?;

    println!(
        "{}",
        "Q1: total interactions handled by each contact center".bold()
    );
    for total in total_interactions_by_center(&rows) {
        println!(
            "  {:<28} {}",
            total.contact_center_name, total.total_interactions
        );
    }

    println!("{}", "Q2: month with the highest interaction volume".bold());
    match busiest_month(&rows) {
        Some(best) => println!("  {} ({} interactions)", best.month, best.total_interactions),
        None => println!("  {}", "no report rows".yellow()),
    }

    println!(
        "{}",
        "Q3: contact center with the longest average call duration".bold()
    );
    match longest_avg_call(&rows) {
        Some(best) => println!(
            "  {} ({:.2} min over {} calls)",
            best.contact_center_name, best.avg_call_duration, best.total_calls
        ),
        None => println!("  {}", "no phone calls in the report".yellow()),
    }

    Ok(())
}
