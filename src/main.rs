mod config;
mod error;
mod ledger;
mod logging;
mod models;
mod pipeline;
mod scrapers;
mod storage;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use config::{Cli, RunConfig, StorageKind};
use pipeline::{run_with_retries, Collector, RunReport};
use scrapers::{DetailScraper, IndexBrowser};
use std::process::ExitCode;
use storage::{LocalStore, ObjectStore, S3Store};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let run_date = Local::now().date_naive();

    let log_file = (!cli.no_log_archive).then(|| cli.log_file(run_date));
    if let Err(e) = logging::init(log_file.as_deref()) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    info!("🏠 Listing Ledger - 28Hse rental collector");
    info!("Run date {}", run_date);

    let config = cli.run_config(run_date);

    let store: Box<dyn ObjectStore> = match cli.storage {
        StorageKind::Local => Box::new(LocalStore::new(&cli.data_dir)),
        StorageKind::S3 => match S3Store::connect(&cli.bucket, &cli.region).await {
            Ok(store) => Box::new(store),
            Err(e) => {
                error!("Failed to set up S3 storage: {:#}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    info!("Storing ledger and documents in {}", store.describe());

    let result = collect(store.as_ref(), &config).await;

    let exit = match result {
        Ok(report) => {
            info!("✅ Run finished: {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    };

    if let Some(path) = &log_file {
        logging::archive(store.as_ref(), path, &storage::log_key(run_date)).await;
    }

    exit
}

/// Run the collector under the retry budget. Each attempt gets a fresh browser.
async fn collect(store: &dyn ObjectStore, config: &RunConfig) -> Result<RunReport> {
    let source = DetailScraper::new(config.site.clone())?;
    let source = &source;

    run_with_retries(config.max_attempts, |attempt| async move {
        info!("Attempt {}/{}", attempt, config.max_attempts);
        let index = IndexBrowser::launch(config.site.clone())?;
        Collector::new(store, &index, source, config).run().await
    })
    .await
}
