//! Gym directory seeding tool
//!
//! ```text
//! gym-seeder scrape [--dry-run]     # first source with results wins
//! gym-seeder enhanced [--dry-run]   # merge Google Places, OpenStreetMap and bundled data
//! gym-seeder verify                 # report on what is stored
//! gym-seeder check                  # connectivity pre-flight
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use gym_buddy::config::Settings;
use gym_buddy::scraper::diagnostics::{self, CheckOutcome, CheckSummary, VerificationReport};
use gym_buddy::scraper::geocode::Geocoder;
use gym_buddy::scraper::seeder::{GymSink, SeedReport, Seeder};
use gym_buddy::scraper::{
    http_client, FinderApiSource, GooglePlacesSource, HtmlPagesSource, OverpassSource, StaticListSource,
};
use gym_buddy::services::PostgresClient;

#[derive(Parser)]
#[command(name = "gym-seeder")]
#[command(version, about = "Seed the Gym Buddy gym directory from public sources")]
struct Cli {
    /// Configuration file to use instead of config/default.toml + config/local.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finder API, then HTML pages, then the bundled list; stores the first non-empty result
    Scrape {
        /// Collect and report only, don't touch the database
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Merge Google Places, OpenStreetMap and the bundled list, replacing stored brand gyms
    Enhanced {
        /// Collect and report only, don't touch the database
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Summarise the gyms currently stored
    Verify,

    /// Check database, network and data source availability
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env.local wins over .env since dotenv never overwrites a set variable
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load configuration")?;

    settings.logging.init();

    match cli.command {
        Commands::Scrape { dry_run } => scrape(&settings, dry_run).await,
        Commands::Enhanced { dry_run } => enhanced(&settings, dry_run).await,
        Commands::Verify => verify(&settings).await,
        Commands::Check => check(&settings).await,
    }
}

async fn connect(settings: &Settings) -> Result<PostgresClient> {
    let db = &settings.database;
    PostgresClient::new(
        &db.url,
        db.max_connections.unwrap_or(5),
        db.min_connections.unwrap_or(1),
        db.acquire_timeout_secs.unwrap_or(5),
        db.idle_timeout_secs.unwrap_or(600),
    )
    .await
    .context("Failed to connect to PostgreSQL")
}

async fn scrape(settings: &Settings, dry_run: bool) -> Result<()> {
    let scraper = &settings.scraper;
    let client = http_client(scraper)?;

    let api = FinderApiSource::new(client.clone(), &scraper.site_url);
    let html = HtmlPagesSource::new(
        client.clone(),
        Geocoder::new(client, &scraper.nominatim_url),
        &scraper.site_url,
        scraper.html_batch_size,
        Duration::from_millis(scraper.html_batch_delay_ms),
    );
    let fallback = StaticListSource::new(&scraper.site_url);

    let store = if dry_run { None } else { Some(connect(settings).await?) };
    let sink = store.as_ref().map(|s| s as &dyn GymSink);

    let seeder = Seeder::new(sink, &scraper.brand, scraper.chain_insert_batch, scraper.merge_insert_batch);
    let report = seeder
        .run_chain(&[&api, &html, &fallback])
        .await
        .context("Failed to store scraped gyms")?;

    print_report(&report)
}

async fn enhanced(settings: &Settings, dry_run: bool) -> Result<()> {
    let scraper = &settings.scraper;
    let client = http_client(scraper)?;

    let places = GooglePlacesSource::new(
        client.clone(),
        &scraper.places_url,
        scraper.places_api_key.clone(),
        &scraper.brand,
        scraper.places_radius_m,
        Duration::from_millis(scraper.places_delay_ms),
    );
    let overpass = OverpassSource::new(client, &scraper.overpass_url, &scraper.brand, &scraper.brand_pattern);
    let fallback = StaticListSource::new(&scraper.site_url);

    let store = if dry_run { None } else { Some(connect(settings).await?) };
    let sink = store.as_ref().map(|s| s as &dyn GymSink);

    let seeder = Seeder::new(sink, &scraper.brand, scraper.chain_insert_batch, scraper.merge_insert_batch);
    let report = seeder
        .run_merge(&[&places, &overpass, &fallback])
        .await
        .context("Failed to store merged gyms")?;

    print_report(&report)
}

fn print_report(report: &SeedReport) -> Result<()> {
    if report.found == 0 {
        bail!("No gyms found from any source");
    }

    tracing::info!(
        found = report.found,
        inserted = report.inserted,
        deleted = report.deleted,
        dry_run = report.dry_run,
        "Seeding finished"
    );
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

async fn verify(settings: &Settings) -> Result<()> {
    let store = connect(settings).await?;
    let report = VerificationReport::collect(&store, &settings.scraper.brand_pattern)
        .await
        .context("Failed to read gyms")?;

    report.log();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn check(settings: &Settings) -> Result<()> {
    let scraper = &settings.scraper;
    let client = http_client(scraper)?;
    let mut summary = CheckSummary::default();

    let database = match connect(settings).await {
        Ok(store) => diagnostics::check_database(Some(&store)).await,
        Err(e) => CheckOutcome::Fail(format!("{:#}", e)),
    };
    summary.push("database", database);

    summary.push(
        "fallback data",
        diagnostics::check_fallback_data(&StaticListSource::new(&scraper.site_url)),
    );

    summary.push(
        "network",
        diagnostics::check_reachable(&client, &scraper.network_check_url).await,
    );

    let overpass = OverpassSource::new(client.clone(), &scraper.overpass_url, &scraper.brand, &scraper.brand_pattern);
    summary.push(
        "overpass",
        diagnostics::check_reachable(&client, &overpass.status_url()).await,
    );

    summary.push(
        "google places",
        diagnostics::check_google_places(
            &client,
            &scraper.places_url,
            scraper.places_api_key.as_deref(),
            &scraper.brand,
        )
        .await,
    );

    for result in &summary.results {
        println!("{}", result);
    }
    println!(
        "{} passed, {} failed, {} skipped",
        summary.passed(),
        summary.failed(),
        summary.skipped()
    );

    if !summary.all_passed() {
        bail!("{} check(s) failed", summary.failed());
    }
    Ok(())
}
