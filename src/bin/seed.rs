use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stay_api::{config::AppConfig, services::seed_service, state::AppState};

/// Seeds the store with sample listings, bookings and reviews.
#[derive(Debug, Parser)]
#[command(name = "seed", version, about)]
struct Cli {
    /// Clear existing data before seeding.
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let state = AppState::connect(&config).await?;

    if cli.clear {
        println!("Clearing existing data...");
    }
    println!("Seeding database...");
    let summary = seed_service::seed(&state, cli.clear, Utc::now().date_naive()).await?;

    println!("Created {} users", summary.users);
    println!("Created {} listings", summary.listings);
    println!("Created {} bookings", summary.bookings);
    println!("Created {} reviews", summary.reviews);
    println!("Database seeded successfully with sample data!");
    Ok(())
}
