use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flyerhub_core::{FlyerCollection, StoreKey};

#[derive(Debug, Parser)]
#[command(name = "flyerhub-cli")]
#[command(about = "FlyerHub command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape all retailers and replace the persisted flyer data.
    Update,
    /// Print per-store record counts from the persisted flyer data.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = flyerhub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Update => {
            let collection = flyerhub_scraper::run_update(&config).await?;
            print_counts(&collection);
        }
        Commands::Status => {
            let collection = FlyerCollection::load(&config.data_dir);
            print_counts(&collection);
        }
    }

    Ok(())
}

fn print_counts(collection: &FlyerCollection) {
    for store in StoreKey::ALL {
        let records = collection.records(store);
        let valid = records.iter().filter(|r| r.valid).count();
        println!(
            "{:<16} {:>5} records ({valid} valid)",
            store.as_str(),
            records.len()
        );
    }
    println!("{:<16} {:>5} total", "", collection.total_len());
}
