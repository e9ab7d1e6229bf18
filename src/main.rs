use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use tour_catalog_sync::catalog::{load_catalog_file, seed, CatalogEntry};
use tour_catalog_sync::config::{self, Config};
use tour_catalog_sync::remote::PostgrestCollection;
use tour_catalog_sync::services::listing_service::format_price_range;
use tour_catalog_sync::services::{
    EntryOutcome, EntryReport, ReconcileService, RunSummary, Strategy,
};

#[derive(Parser)]
#[command(name = "tour-catalog-sync")]
#[command(about = "Reconcile a tour catalog with the remote listings table", long_about = None)]
struct Cli {
    /// Reconciliation strategy
    #[arg(long, value_enum, default_value_t = Strategy::SkipIfPresent)]
    strategy: Strategy,

    /// JSON catalog to reconcile (default: the bundled catalog for the strategy)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Validate and print the catalog without contacting the backend
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {e}");
            eprintln!("✗ {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Credentials are checked before anything touches the network.
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let entries = match &cli.catalog {
        Some(path) => load_catalog_file(path)?,
        None => match cli.strategy {
            Strategy::SkipIfPresent => seed::new_listings()?,
            Strategy::ForceUpsertById => seed::curated_listings()?,
        },
    };
    info!("Loaded catalog with {} entries", entries.len());

    if cli.dry_run {
        print_catalog(&entries);
        return Ok(());
    }

    let remote = PostgrestCollection::new(&config)?;
    println!(
        "Reconciling {} entries into '{}' ({})\n",
        entries.len(),
        remote.table(),
        cli.strategy
    );

    let service = ReconcileService::new(remote);
    let summary = service
        .run_with_progress(cli.strategy, &entries, print_report)
        .await?;

    print_summary(&summary);
    Ok(())
}

fn print_report(report: &EntryReport<'_>) {
    let entry = report.entry;
    let price = format_price_range(Some(entry.price_min()), Some(entry.price_max()));

    match &report.outcome {
        EntryOutcome::Inserted => println!("✓ Inserted: {} - {}", entry.name(), price),
        EntryOutcome::AlreadyExisted => println!("- Already exists: {}", entry.name()),
        EntryOutcome::Upserted => {
            println!("✓ Upserted: {}", entry.name());
            println!("   {} | {}", price, entry.duration());
        }
        EntryOutcome::Failed(reason) => println!("✗ Failed: {} - {}", entry.name(), reason),
    }
}

fn print_catalog(entries: &[CatalogEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {} [{}] {} | {}",
            i + 1,
            entry.name(),
            entry.id().unwrap_or("no id"),
            format_price_range(Some(entry.price_min()), Some(entry.price_max())),
            entry.duration()
        );
    }
    println!("\n{} entries are valid", entries.len());
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    println!("Summary:");
    println!("   Inserted:        {}", summary.inserted);
    println!("   Already existed: {}", summary.already_existed);
    println!("   Upserted:        {}", summary.upserted);
    println!("   Errors:          {}", summary.errored);
    println!("   Total processed: {}", summary.total);
    println!("{}", "=".repeat(60));
}
