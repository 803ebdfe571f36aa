use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::scrapers::SiteConfig;

/// Which persistence backend holds the ledger and the documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Local,
    S3,
}

/// Command-line and environment configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "listing-ledger")]
#[command(about = "Incremental rental listing collector")]
pub struct Cli {
    /// Storage backend for the ledger and listing documents
    #[arg(long, env = "LEDGER_STORAGE", value_enum, default_value = "local")]
    pub storage: StorageKind,

    /// Root directory of the local backend
    #[arg(long, env = "LEDGER_DATA_DIR", default_value = "./housing_data")]
    pub data_dir: PathBuf,

    /// S3 bucket name
    #[arg(long, env = "LEDGER_BUCKET", default_value = "housing-listing-bucket")]
    pub bucket: String,

    /// S3 bucket region
    #[arg(long, env = "LEDGER_REGION", default_value = "ap-east-1")]
    pub region: String,

    /// Whole-run attempts before giving up
    #[arg(long, env = "LEDGER_MAX_ATTEMPTS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Stop discovery after this many index pages
    #[arg(long, env = "LEDGER_PAGE_CEILING")]
    pub page_ceiling: Option<u32>,

    /// Site root
    #[arg(long, env = "LEDGER_BASE_URL", default_value = "https://www.28hse.com/en")]
    pub base_url: String,

    /// Seconds to wait for an index page to settle
    #[arg(long, env = "LEDGER_PAGE_DELAY_SECS", default_value_t = 3)]
    pub page_delay_secs: u64,

    /// Detail page request timeout in seconds
    #[arg(long, env = "LEDGER_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Fold IDs whose fetch failed into the ledger anyway
    #[arg(long, env = "LEDGER_FOLD_FAILURES")]
    pub fold_failures: bool,

    /// Keep the run log local instead of archiving it to storage
    #[arg(long, env = "LEDGER_NO_LOG_ARCHIVE")]
    pub no_log_archive: bool,
}

/// Settings for one run, fixed at startup
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Date partition for documents and logs
    pub run_date: NaiveDate,
    pub max_attempts: u32,
    pub fold_failures: bool,
    pub site: SiteConfig,
}

impl Cli {
    pub fn run_config(&self, run_date: NaiveDate) -> RunConfig {
        RunConfig {
            run_date,
            max_attempts: self.max_attempts,
            fold_failures: self.fold_failures,
            site: SiteConfig {
                base_url: self.base_url.clone(),
                page_delay: Duration::from_secs(self.page_delay_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                page_ceiling: self.page_ceiling,
            },
        }
    }

    /// Local file the run log is written to
    pub fn log_file(&self, run_date: NaiveDate) -> PathBuf {
        PathBuf::from(format!("{}-log.log", run_date.format("%Y-%m-%d")))
    }
}
