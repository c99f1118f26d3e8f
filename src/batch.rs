//! Sequential codes × years runner

use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::downloader::Orchestrator;
use crate::errors::Result;
use crate::http::build_client;
use crate::models::{DownloadOutcome, ReportRequest};

/// Download every requested report with the standard probe chains.
pub async fn download_reports(config: &Config, codes: &[String], years: &[i32]) -> Result<Vec<DownloadOutcome>> {
    std::fs::create_dir_all(&config.download_dir)?;

    let client = build_client(config)?;
    let runner = BatchRunner::new(Orchestrator::new(client, config), config.request_delay());
    Ok(runner.run(codes, years).await)
}

pub struct BatchRunner {
    orchestrator: Orchestrator,
    delay: Duration,
}

impl BatchRunner {
    pub fn new(orchestrator: Orchestrator, delay: Duration) -> Self {
        Self { orchestrator, delay }
    }

    /// Resolve every (code, year) pair, codes outer and years inner, pausing
    /// between consecutive requests. Returns one outcome per pair in that order.
    pub async fn run(&self, codes: &[String], years: &[i32]) -> Vec<DownloadOutcome> {
        let total = codes.len() * years.len();
        let mut outcomes = Vec::with_capacity(total);

        for code in codes {
            for &year in years {
                if !outcomes.is_empty() && !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }

                let request = ReportRequest::new(code, year);
                info!(
                    "Processing {}/{}: {} {} ({})",
                    outcomes.len() + 1,
                    total,
                    request.stock_code,
                    year,
                    request.market
                );
                outcomes.push(self.orchestrator.resolve(&request).await);
            }
        }

        outcomes
    }
}
