use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use doctor_scraper::config::Config;
use doctor_scraper::logging;
use doctor_scraper::pipeline::{DiscoveryResult, ExportResult, ExtractResult, Pipeline};

#[derive(Parser)]
#[command(name = "doctor_scraper")]
#[command(about = "Doctor profile discovery, extraction and spreadsheet export")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to $DOCTOR_SCRAPER_CONFIG, then ./doctor_scraper.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk listing pages and save unique profile URLs
    Discover,
    /// Scrape saved profile URLs, then validate and enrich the records
    Extract {
        /// Only handle the first N URLs
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Write processed records to the spreadsheet
    Export {
        /// Only export the first N records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run discover, extract and export in sequence
    Run {
        /// Only handle the first N URLs and records
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn print_discovery(result: &DiscoveryResult) {
    println!("\n📊 Discovery Results:");
    println!("   Unique URLs: {}", result.unique_urls);
    println!("   Output file: {}", result.output_file.display());
}

fn print_extract(result: &ExtractResult) {
    println!("\n📊 Extraction Results:");
    println!("   URLs attempted: {}", result.urls_attempted);
    println!("   Scraped: {}", result.scraped);
    println!("   Missing profile content: {}", result.missing_content);
    println!("   Failed to load: {}", result.fetch_failed);
    println!(
        "   Contact numbers: {}/{}",
        result.with_contact_number, result.scraped
    );
    println!("   Processed (inside region): {}", result.processed);
    println!("   Raw file: {}", result.raw_file.display());
    println!("   Processed file: {}", result.processed_file.display());
}

fn print_export(result: &ExportResult) {
    println!("\n📊 Export Results:");
    println!("   Rows: {}", result.rows);
    println!("   Output file: {}", result.output_file.display());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging(Path::new(logging::DEFAULT_LOG_DIR));

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!("Target city: {}", config.target.city);

    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;

    match cli.command {
        Commands::Discover => {
            println!("🔍 Discovering doctor profile URLs...");
            let result = pipeline.discover().await?;
            print_discovery(&result);
        }
        Commands::Extract { limit } => {
            println!("🔄 Scraping and processing profiles...");
            let result = pipeline.extract(limit).await?;
            print_extract(&result);
        }
        Commands::Export { limit } => {
            println!("📄 Exporting spreadsheet...");
            let result = pipeline.export(limit)?;
            print_export(&result);
        }
        Commands::Run { limit } => {
            println!("🚀 Running full pipeline (discover + extract + export)...");

            println!("\n🔍 Step 1: Discovering URLs...");
            let discovered = pipeline.discover().await?;
            print_discovery(&discovered);
            if discovered.unique_urls == 0 {
                error!("Discovery found no URLs; stopping");
                println!("❌ No URLs discovered, nothing to extract.");
                return Ok(());
            }

            println!("\n🔄 Step 2: Scraping and processing profiles...");
            let extracted = pipeline.extract(limit).await?;
            print_extract(&extracted);

            println!("\n📄 Step 3: Exporting spreadsheet...");
            let exported = pipeline.export(limit)?;
            print_export(&exported);

            println!("\n✅ Full pipeline completed successfully!");
        }
    }
    Ok(())
}
