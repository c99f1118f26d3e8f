//! cninfo (巨潮资讯) sources for Shanghai/Shenzhen listed companies

use async_trait::async_trait;
use reqwest::header::{ACCEPT, REFERER};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{head_ok, resolve_url, scrape, try_download, Probe};
use crate::classifier::is_annual_report;
use crate::config::Config;
use crate::errors::Result;
use crate::fetcher::{FileFetcher, Fetched};
use crate::models::{Announcement, ReportRequest};

const QUERY_ENDPOINT: &str = "/new/hisAnnouncement/query";
const DISCLOSURE_PAGE: &str = "/new/disclosure/stock";
const ANNUAL_REPORT_CATEGORY: &str = "category_ndbg_szsh";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    announcements: Option<Vec<QueryAnnouncement>>,
}

#[derive(Debug, Deserialize)]
struct QueryAnnouncement {
    #[serde(rename = "announcementTitle", default)]
    title: String,
    #[serde(rename = "adjunctUrl", default)]
    adjunct_url: Option<String>,
}

/// Historical announcement query (`hisAnnouncement/query`), filtered to the
/// annual-report category and the window in which the report gets filed.
pub struct AnnouncementQuery {
    client: Client,
    base: String,
    static_base: String,
    timeout: Duration,
}

impl AnnouncementQuery {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.cninfo.clone(),
            static_base: config.endpoints.cninfo_static.clone(),
            timeout: config.api_timeout(),
        }
    }

    async fn announcements(&self, request: &ReportRequest) -> Result<Vec<Announcement>> {
        let url = format!("{}{}", self.base, QUERY_ENDPOINT);
        let se_date = format!("{}-01-01~{}-06-30", request.year, request.year.saturating_add(1));
        let form = [
            ("stock", request.code.as_str()),
            ("searchkey", ""),
            ("plate", ""),
            ("category", ANNUAL_REPORT_CATEGORY),
            ("trade", ""),
            ("column", "szse_main"),
            ("columnTitle", "历史公告查询"),
            ("pageNum", "1"),
            ("pageSize", "50"),
            ("tabName", "fulltext"),
            ("sortName", ""),
            ("sortType", ""),
            ("limit", ""),
            ("showTitle", ""),
            ("seDate", se_date.as_str()),
        ];

        debug!("Querying cninfo announcements: {} ({})", url, se_date);
        let response = self
            .client
            .post(&url)
            .form(&form)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, format!("{}{}", self.base, DISCLOSURE_PAGE))
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .announcements
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                let adjunct = a.adjunct_url?;
                Some(Announcement {
                    title: a.title,
                    document_url: format!("{}/{}", self.static_base, adjunct.trim_start_matches('/')),
                })
            })
            .collect())
    }
}

#[async_trait]
impl Probe for AnnouncementQuery {
    fn name(&self) -> &'static str {
        "cninfo announcement query"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        let announcements = self.announcements(request).await?;
        info!("cninfo returned {} announcements for {}", announcements.len(), request.code);

        for announcement in announcements {
            if !is_annual_report(&announcement.title, request.year) {
                continue;
            }
            debug!("Matched announcement: {}", announcement.title);
            if let Some(fetched) = try_download(fetcher, &announcement.document_url, &request.filename()).await? {
                return Ok(Some(fetched));
            }
        }

        Ok(None)
    }
}

/// The per-stock disclosure page, scraped for a direct PDF link.
pub struct DisclosurePage {
    client: Client,
    base: String,
    timeout: Duration,
}

impl DisclosurePage {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.cninfo.clone(),
            timeout: config.api_timeout(),
        }
    }
}

#[async_trait]
impl Probe for DisclosurePage {
    fn name(&self) -> &'static str {
        "cninfo disclosure page"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        let url = format!("{}{}", self.base, DISCLOSURE_PAGE);
        let html = self
            .client
            .get(&url)
            .query(&[("orgId", request.code.as_str()), ("stockCode", request.code.as_str())])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let year = request.year.to_string();
        if !html.contains("年度报告") || !html.contains(&year) {
            return Ok(None);
        }

        let pattern = format!(r#"(?i)href="([^"]*\.pdf)"[^>]*>([^<]*{}[^<]*年度报告[^<]*)"#, year);
        let Some(link) = scrape::links(&html, &pattern)?.into_iter().next() else {
            return Ok(None);
        };

        debug!("Disclosure page link: {} ({})", link.href, link.text);
        let pdf_url = resolve_url(&self.base, &link.href)?;
        try_download(fetcher, &pdf_url, &request.filename()).await
    }
}

/// Guess the static `finalpage` filenames cninfo used for older filings.
pub struct DirectUrl {
    client: Client,
    static_base: String,
    timeout: Duration,
}

impl DirectUrl {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            static_base: config.endpoints.cninfo_static.clone(),
            timeout: config.probe_timeout(),
        }
    }

    fn candidates(&self, request: &ReportRequest) -> Vec<String> {
        let (base, year, code) = (&self.static_base, request.year, &request.code);
        vec![
            format!("{base}/finalpage/{year}-03-{code}.PDF"),
            format!("{base}/finalpage/{year}-04-{code}.PDF"),
            format!("{base}/finalpage/{year}-03-{code}_1.PDF"),
            format!("{base}/finalpage/{year}-04-{code}_1.PDF"),
        ]
    }
}

#[async_trait]
impl Probe for DirectUrl {
    fn name(&self) -> &'static str {
        "cninfo direct url"
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
