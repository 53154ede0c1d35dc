//! Deltamart CLI
//!
//! Command-line interface for the support-data delta-merge pipeline:
//! - `run`: merge the initial snapshot with monthly delta files and write
//!   the four final tables
//! - `report`: aggregate the final tables into the monthly support report
//! - `answers`: print the business answers computed from that report

use anyhow::Result;
use clap::{Parser, Subcommand};
use deltamart_tables::Format;
use std::path::PathBuf;

mod answers;
mod report;
mod run;

#[derive(Parser)]
#[command(name = "deltamart")]
#[command(author, version, about = "Deltamart: support-data delta merge pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the initial snapshot with monthly deltas into final tables.
    ///
    /// Months are applied in the order given and must be strictly
    /// ascending. Any fatal error (missing delta file, unknown action,
    /// unparsable row) aborts before anything is written.
    Run {
        /// Folder containing initial/ and delta/
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
        /// Folder to write `{table}_final.*` outputs to
        #[arg(long, default_value = "./output")]
        out_dir: PathBuf,
        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: Format,
        /// Months to process, e.g. 202502,202503
        #[arg(long, default_value = "202502,202503")]
        months: String,
    },

    /// Build the monthly support report from final tables.
    Report {
        /// Folder holding the `{table}_final.*` outputs of `run`
        #[arg(long, default_value = "./output")]
        data_dir: PathBuf,
        /// Folder to write the report to
        #[arg(long, default_value = "./report")]
        out_dir: PathBuf,
        /// Format of the final tables and of the report output
        #[arg(long, default_value = "csv")]
        format: Format,
    },

    /// Print business answers computed from the support report.
    Answers {
        /// Path to the support report written by `report`
        #[arg(long, default_value = "./report/support_report.csv")]
        report: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            data_dir,
            out_dir,
            format,
            months,
        } => run::cmd_run(&data_dir, &out_dir, format, &months),
        Commands::Report {
            data_dir,
            out_dir,
            format,
        } => report::cmd_report(&data_dir, &out_dir, format),
        Commands::Answers { report } => answers::cmd_answers(&report),
    }
}
