use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use lead_response_report::batch;
use lead_response_report::logging;
use lead_response_report::taxonomy::CodeTaxonomy;

#[derive(Parser)]
#[command(name = "lead-response-report")]
#[command(about = "Per-lead dealer response summaries from activity CSV exports")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every CSV in a directory, one output file per input
    Run {
        /// Directory containing the activity CSV exports
        #[arg(long)]
        input: PathBuf,
        /// Where to write the summary files (defaults to the input directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Freshness reference date (YYYY-MM-DD); defaults to today.
        /// Fixing this makes repeat runs byte-identical.
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// TOML file replacing the built-in activity-code taxonomy
        #[arg(long)]
        taxonomy: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            as_of,
            taxonomy,
        } => {
            let output_dir = output.unwrap_or_else(|| input.clone());
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let taxonomy = match taxonomy {
                Some(path) => CodeTaxonomy::load(&path)?,
                None => CodeTaxonomy::builtin(),
            };

            println!("🔄 Summarizing activity exports in {}...", input.display());
            let summary = batch::run_batch(&input, &output_dir, &taxonomy, as_of)?;

            info!(
                written = summary.written.len(),
                failed = summary.failures.len(),
                "batch finished"
            );
            println!("\n📊 Batch Results:");
            println!("   Files summarized: {}", summary.written.len());
            println!("   Files failed: {}", summary.failures.len());

            if !summary.failures.is_empty() {
                println!("\n⚠️  Failed files:");
                for failure in &summary.failures {
                    error!(file = %failure.file.display(), error = %failure.error, "file failed");
                    println!("   - {}: {}", failure.file.display(), failure.error);
                }
                std::process::exit(1);
            }
            println!("✅ Batch completed successfully");
        }
    }
    Ok(())
}
