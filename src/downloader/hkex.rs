//! HKEXnews (披露易) sources for Hong Kong listed companies
//!
//! Codes reaching this module are already padded to five digits. HKEX file
//! paths bucket companies by the first two digits of that code.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{head_ok, resolve_url, scrape, try_download, Probe};
use crate::config::Config;
use crate::errors::Result;
use crate::fetcher::{FileFetcher, Fetched};
use crate::models::ReportRequest;

const TITLE_SEARCH_ENDPOINT: &str = "/search/titlesearch.xhtml";

fn company_dir(base: &str, code: &str) -> String {
    let prefix: String = code.chars().take(2).collect();
    format!("{}/listedco/listconews/sehk/{}/{}", base, prefix, code)
}

/// Annual report link patterns for the title search page, most specific first.
/// Group 1 is the href, group 2 the anchor text.
fn title_search_patterns(year: i32) -> [String; 4] {
    [
        format!(r#"(?i)href="([^"]*)"[^>]*>([^<]*{year}[^<]*年報[^<]*)"#),
        format!(r#"(?i)href="([^"]*)"[^>]*>([^<]*{year}[^<]*Annual\s+Report[^<]*)"#),
        format!(r#"(?i)href="([^"]*)"[^>]*>([^<]*年度報告[^<]*{year}[^<]*)"#),
        r#"(?i)href="([^"]*)"[^>]*>([^<]*年度业绩[^<]*)"#.to_string(),
    ]
}

/// Scrape the first non-summary link for each pattern in turn and download it.
async fn fetch_first_match(
    html: &str,
    patterns: &[String],
    base: &str,
    request: &ReportRequest,
    fetcher: &FileFetcher,
) -> Result<Option<Fetched>> {
    for pattern in patterns {
        let Some(link) = scrape::first_full_report(html, pattern)? else {
            continue;
        };
        debug!("HKEX link: {} ({})", link.href, link.text);
        let pdf_url = resolve_url(base, &link.href)?;
        if let Some(fetched) = try_download(fetcher, &pdf_url, &request.filename()).await? {
            return Ok(Some(fetched));
        }
    }
    Ok(None)
}

/// HKEXnews title search over the report year and the following one.
pub struct TitleSearch {
    client: Client,
    base: String,
    timeout: Duration,
}

impl TitleSearch {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.hkex.clone(),
            timeout: config.api_timeout(),
        }
    }
}

#[async_trait]
impl Probe for TitleSearch {
    fn name(&self) -> &'static str {
        "hkex title search"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        let url = format!("{}{}", self.base, TITLE_SEARCH_ENDPOINT);
        let from_date = format!("01/01/{}", request.year);
        let to_date = format!("31/12/{}", request.year.saturating_add(1));

        debug!("Searching HKEX titles for {} ({} - {})", request.code, from_date, to_date);
        let html = self
            .client
            .get(&url)
            .query(&[
                ("lang", "C"),
                ("category", "0"),
                ("market", "SEHK"),
                ("stockId", request.code.as_str()),
                ("documentType", "0"),
                ("fromDate", from_date.as_str()),
                ("toDate", to_date.as_str()),
                ("submit", "搜寻"),
                ("sortDir", "0"),
                ("alert", "0"),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        fetch_first_match(&html, &title_search_patterns(request.year), &self.base, request, fetcher).await
    }
}

/// Guess conventional HKEX filenames and take the first one that exists.
/// No title is available here, so an existing file is accepted as the report.
pub struct DirectUrl {
    client: Client,
    base: String,
    timeout: Duration,
}

impl DirectUrl {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.hkex.clone(),
            timeout: config.probe_timeout(),
        }
    }

    fn candidates(&self, request: &ReportRequest) -> Vec<String> {
        let dir = company_dir(&self.base, &request.code);
        let year = request.year;
        vec![
            format!("{dir}/LTN{year}C001.pdf"),
            format!("{dir}/AR{year}C001.pdf"),
            format!("{dir}/LTN{year}C002.pdf"),
        ]
    }
}

#[async_trait]
impl Probe for DirectUrl {
    fn name(&self) -> &'static str {
        "hkex direct url"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        for url in self.candidates(request) {
            if !head_ok(&self.client, &url, self.timeout).await {
                continue;
            }
            if let Some(fetched) = try_download(fetcher, &url, &request.filename()).await? {
                return Ok(Some(fetched));
            }
        }
        Ok(None)
    }
}

/// The company's yearly listing page (`LTN<year>_C.htm`).
pub struct ListingPage {
    client: Client,
    base: String,
    timeout: Duration,
}

impl ListingPage {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.hkex.clone(),
            timeout: config.api_timeout(),
        }
    }
}

#[async_trait]
impl Probe for ListingPage {
    fn name(&self) -> &'static str {
        "hkex listing page"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        let year = request.year;
        let url = format!("{}/LTN{}_C.htm", company_dir(&self.base, &request.code), year);

        let html = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let patterns = [
            format!(r#"(?i)href="([^"]*\.pdf)"[^>]*>([^<]*{year}[^<]*年報[^<]*)"#),
            format!(r#"(?i)href="([^"]*\.pdf)"[^>]*>([^<]*Annual[^<]*Report[^<]*{year}[^<]*)"#),
        ];
        fetch_first_match(&html, &patterns, &self.base, request, fetcher).await
    }
}
