use crate::core::catalog::DEFAULT_CONCURRENT_REQUESTS;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "venue-catalog")]
#[command(about = "Browse, price and review venue and service listings")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base URL of a remote listing service (overrides the config file)
    #[arg(long)]
    pub store_url: Option<String>,

    /// JSON file with listings keyed by category (overrides the config file)
    #[arg(long)]
    pub seed_file: Option<String>,

    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List registered categories
    Categories,
    /// List listings of one category
    List {
        #[arg(short = 'k', long)]
        category: String,
        /// Filters as key=value, e.g. --filter city=Kota
        #[arg(short, long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },
    /// List listings across several categories concurrently
    ListAll {
        #[arg(short = 'k', long, value_delimiter = ',')]
        categories: Vec<String>,
        #[arg(short, long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },
    /// Show a single listing
    Get {
        #[arg(short = 'k', long)]
        category: String,
        #[arg(long)]
        id: String,
    },
    /// Show the bookable price range of a listing
    Price {
        #[arg(short = 'k', long)]
        category: String,
        #[arg(long)]
        id: String,
    },
    /// Submit a review for a listing
    Review {
        #[arg(short = 'k', long)]
        category: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        rating: f64,
        #[arg(long)]
        comment: String,
    },
    /// Show which booking flow a category uses
    Flow {
        #[arg(short = 'k', long)]
        category: String,
    },
    /// Build the booking intent for a listing
    Intent {
        #[arg(short = 'k', long)]
        category: String,
        #[arg(long)]
        id: String,
    },
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

impl ConfigProvider for CliConfig {
    fn store_base_url(&self) -> Option<&str> {
        self.store_url.as_deref()
    }

    fn seed_file(&self) -> Option<&str> {
        self.seed_file.as_deref()
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests.unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.store_url {
            validation::validate_url("--store-url", url)?;
        }
        if let Some(seed_file) = &self.seed_file {
            validation::validate_path("--seed-file", seed_file)?;
            validation::validate_file_extension("--seed-file", seed_file, &["json"])?;
        }
        if let Some(concurrent) = self.concurrent_requests {
            validation::validate_positive_number("--concurrent-requests", concurrent, 1)?;
        }
        validation::validate_positive_number("--timeout-seconds", self.timeout_seconds as usize, 1)?;
        Ok(())
    }
}
