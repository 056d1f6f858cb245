use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

mod config;
mod constants;
mod domain;
mod error;
mod fetch;
mod logging;
mod output;
mod pipeline;

use crate::config::Config;
use crate::fetch::FetchOptions;
use crate::pipeline::{Pipeline, ProcessOptions};

#[derive(Parser)]
#[command(name = "oflc_wages")]
#[command(about = "OFLC H-1B LCA disclosure wage aggregator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and download the latest disclosure files into one snapshot
    Fetch {
        /// How many of the most recent disclosure files to consolidate
        #[arg(long)]
        limit: Option<usize>,
        /// Where to write the consolidated snapshot CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Aggregate a downloaded snapshot into county prevailing wage summaries
    Process {
        /// Consolidated snapshot CSV to read
        #[arg(long)]
        input: Option<PathBuf>,
        /// County reference table CSV
        #[arg(long)]
        county_map: Option<PathBuf>,
        /// Where to write the summary JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Where to write the truncated sample JSON
        #[arg(long)]
        sample_output: Option<PathBuf>,
        /// Where to write the unmatched-county log CSV
        #[arg(long)]
        unmatched_log: Option<PathBuf>,
    },
    /// Run fetch and process sequentially
    Run {
        /// How many of the most recent disclosure files to consolidate
        #[arg(long)]
        limit: Option<usize>,
        /// County reference table CSV
        #[arg(long)]
        county_map: Option<PathBuf>,
    },
}

fn fetch_options(config: &Config, limit: Option<usize>, output: Option<PathBuf>) -> FetchOptions {
    FetchOptions {
        performance_url: config.fetch.performance_url.clone(),
        file_limit: limit.unwrap_or(config.fetch.file_limit),
        timeout_seconds: config.fetch.timeout_seconds,
        output: output.unwrap_or_else(|| PathBuf::from(&config.fetch.output)),
    }
}

fn process_options(
    config: &Config,
    input: Option<PathBuf>,
    county_map: Option<PathBuf>,
    output: Option<PathBuf>,
    sample_output: Option<PathBuf>,
    unmatched_log: Option<PathBuf>,
) -> ProcessOptions {
    ProcessOptions {
        input: input.unwrap_or_else(|| PathBuf::from(&config.process.input)),
        county_map: county_map.unwrap_or_else(|| PathBuf::from(&config.process.county_map)),
        output: output.unwrap_or_else(|| PathBuf::from(&config.process.output)),
        sample_output: sample_output
            .or_else(|| config.process.sample_output.as_ref().map(PathBuf::from)),
        sample_size: config.process.sample_size,
        unmatched_log: unmatched_log.unwrap_or_else(|| PathBuf::from(&config.process.unmatched_log)),
    }
}

fn report_process_result(result: &domain::ProcessResult) {
    println!("\n📊 Aggregation results:");
    println!("   Rows read: {}", result.total_rows);
    println!("   Rows aggregated: {}", result.aggregated_rows);
    println!("   Rows skipped: {}", result.skipped_rows);
    println!("   Summary records: {}", result.summary_records);
    println!("   Unmatched counties: {}", result.unmatched_entries);
    println!("   Output file: {}", result.output_file);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Fetch { limit, output } => {
            println!("🔄 Running fetch...");
            let options = fetch_options(&config, limit, output);
            match fetch::run(&options).await {
                Ok(result) => {
                    info!("Fetch finished");
                    println!(
                        "✅ Consolidated {} files ({} rows, {} skipped)",
                        result.files_consolidated, result.total_rows, result.files_skipped
                    );
                }
                Err(e) => {
                    error!("Fetch failed: {}", e);
                    println!("❌ Fetch failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Process {
            input,
            county_map,
            output,
            sample_output,
            unmatched_log,
        } => {
            println!("🔨 Running aggregation...");
            let options = process_options(
                &config,
                input,
                county_map,
                output,
                sample_output,
                unmatched_log,
            );
            match Pipeline::run(&options) {
                Ok(result) => {
                    info!("Aggregation finished");
                    report_process_result(&result);
                }
                Err(e) => {
                    error!("Aggregation failed: {}", e);
                    println!("❌ Aggregation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Run { limit, county_map } => {
            println!("🚀 Running full pipeline (fetch + process)...");

            println!("\n📥 Step 1: Fetching disclosure files...");
            let fetch_opts = fetch_options(&config, limit, None);
            let fetch_result = match fetch::run(&fetch_opts).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Fetch failed: {}", e);
                    println!("❌ Fetch failed: {e}");
                    std::process::exit(1);
                }
            };

            println!("\n🔨 Step 2: Aggregating wages...");
            let options = process_options(
                &config,
                Some(PathBuf::from(&fetch_result.output_file)),
                county_map,
                None,
                None,
                None,
            );
            match Pipeline::run(&options) {
                Ok(result) => {
                    report_process_result(&result);
                    println!("✅ Full pipeline completed successfully!");
                }
                Err(e) => {
                    error!("Aggregation failed: {}", e);
                    println!("❌ Aggregation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
