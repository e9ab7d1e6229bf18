use clap::Parser;
use tracing::info;

use tour_catalog_sync::config::{self, Config};
use tour_catalog_sync::remote::PostgrestCollection;
use tour_catalog_sync::services::listing_service::{duplicate_groups, format_price_range};
use tour_catalog_sync::services::ListingService;

#[derive(Parser)]
#[command(name = "list-catalog")]
#[command(about = "Dump the listings stored in the remote table", long_about = None)]
struct Cli {
    /// Print only names with their normalized form, and flag collisions
    #[arg(long)]
    names_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let remote = PostgrestCollection::new(&config)?;
    let table = remote.table().to_string();
    let service = ListingService::new(remote);

    if cli.names_only {
        let names = service.names().await?;
        println!("Names in '{table}' ({} total):\n", names.len());
        for (name, key) in &names {
            println!("  {name}  ->  {key}");
        }

        let duplicates = duplicate_groups(&names);
        if !duplicates.is_empty() {
            println!("\nNames treated as duplicates ({} groups):", duplicates.len());
            for (key, group) in duplicates {
                println!("  {key}: {}", group.join(" | "));
            }
        }
        return Ok(());
    }

    let rows = service.rows().await?;
    println!("Rows in '{table}':\n");
    for row in &rows {
        println!(
            "- {} | {} | {} | {}",
            row.id,
            row.name,
            row.category.as_deref().unwrap_or("-"),
            format_price_range(row.price_min, row.price_max)
        );
    }
    println!("\nTotal rows: {}", rows.len());

    Ok(())
}
