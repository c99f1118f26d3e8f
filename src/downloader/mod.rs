//! Source probes and the per-market fallback chain
//!
//! Every data source implements [`Probe`]. The [`Orchestrator`] keeps one ordered
//! list of probes per market and walks it until a probe lands a validated PDF.
//! Network, parse and validation failures inside a probe only mean "try the
//! next source"; a local I/O failure ends the request as `Failed`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::{ReportError, Result};
use crate::fetcher::{FileFetcher, Fetched};
use crate::market::Market;
use crate::models::{DownloadOutcome, DownloadStatus, ReportRequest};

pub mod cninfo;
pub mod eastmoney;
pub mod hkex;
pub mod scrape;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Locate and download the report. `Ok(None)` means this source has nothing.
    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>>;
}

pub struct Orchestrator {
    fetcher: FileFetcher,
    mainland: Vec<Box<dyn Probe>>,
    hong_kong: Vec<Box<dyn Probe>>,
}

impl Orchestrator {
    /// Standard probe chains against the configured endpoints.
    pub fn new(client: Client, config: &Config) -> Self {
        let mainland: Vec<Box<dyn Probe>> = vec![
            Box::new(cninfo::AnnouncementQuery::new(client.clone(), config)),
            Box::new(cninfo::DisclosurePage::new(client.clone(), config)),
            Box::new(eastmoney::AnnouncementApi::new(client.clone(), config)),
            Box::new(cninfo::DirectUrl::new(client.clone(), config)),
        ];
        let hong_kong: Vec<Box<dyn Probe>> = vec![
            Box::new(hkex::TitleSearch::new(client.clone(), config)),
            Box::new(hkex::DirectUrl::new(client.clone(), config)),
            Box::new(hkex::ListingPage::new(client.clone(), config)),
        ];

        Self::with_probes(FileFetcher::new(client, config), mainland, hong_kong)
    }

    pub fn with_probes(
        fetcher: FileFetcher,
        mainland: Vec<Box<dyn Probe>>,
        hong_kong: Vec<Box<dyn Probe>>,
    ) -> Self {
        Self { fetcher, mainland, hong_kong }
    }

    fn probes(&self, market: Market) -> &[Box<dyn Probe>] {
        match market {
            Market::Mainland => &self.mainland,
            Market::HongKong => &self.hong_kong,
        }
    }

    /// Run the market's probes in priority order; first success wins.
    pub async fn resolve(&self, request: &ReportRequest) -> DownloadOutcome {
        info!(
            "Fetching {} {} annual report for {}",
            request.market, request.year, request.code
        );

        for probe in self.probes(request.market) {
            debug!("Trying {} for {} {}", probe.name(), request.code, request.year);

            match probe.attempt(request, &self.fetcher).await {
                Ok(Some(fetched)) => {
                    info!("{} found {}", probe.name(), fetched.path().display());
                    return DownloadOutcome::new(
                        request,
                        DownloadStatus::Success { filename: request.filename() },
                    );
                }
                Ok(None) => debug!("{} found nothing", probe.name()),
                Err(e) if e.is_recoverable() => debug!("{} failed: {}", probe.name(), e),
                Err(e) => {
                    error!("{} {} aborted in {}: {}", request.code, request.year, probe.name(), e);
                    return DownloadOutcome::new(request, DownloadStatus::Failed { error: e.to_string() });
                }
            }
        }

        let message = match request.market {
            Market::Mainland => format!("所有方法都未找到{}年年报", request.year),
            Market::HongKong => format!("未找到{}年年报", request.year),
        };
        info!("{} {}: {}", request.code, request.year, message);
        DownloadOutcome::new(request, DownloadStatus::NotFound { message })
    }
}

/// Download one candidate. Recoverable failures become `None` so the caller can
/// move on to its next candidate.
pub(crate) async fn try_download(
    fetcher: &FileFetcher,
    url: &str,
    filename: &str,
) -> Result<Option<Fetched>> {
    match fetcher.fetch(url, filename).await {
        Ok(fetched) => Ok(Some(fetched)),
        Err(e) if e.is_recoverable() => {
            debug!("Candidate {} rejected: {}", url, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Cheap existence check used by the URL-guessing probes.
pub(crate) async fn head_ok(client: &Client, url: &str, timeout: Duration) -> bool {
    match client.head(url).timeout(timeout).send().await {
        Ok(response) => {
            debug!("HEAD {} -> {}", url, response.status());
            response.status() == StatusCode::OK
        }
        Err(e) => {
            debug!("HEAD {} failed: {}", url, e);
            false
        }
    }
}

/// Resolve a possibly relative link against a site root.
pub(crate) fn resolve_url(base: &str, href: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| ReportError::Parse(format!("bad base url {}: {}", base, e)))?;
    let url = base
        .join(href)
        .map_err(|e| ReportError::Parse(format!("bad link {}: {}", href, e)))?;
    Ok(url.to_string())
}
