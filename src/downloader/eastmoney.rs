//! Eastmoney (东方财富) announcement API, the third-party fallback for A-shares

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{try_download, Probe};
use crate::classifier::is_annual_report;
use crate::config::Config;
use crate::errors::Result;
use crate::fetcher::{FileFetcher, Fetched};
use crate::models::{Announcement, ReportRequest};

const ANNOUNCEMENT_ENDPOINT: &str = "/api/security/ann";

#[derive(Debug, Deserialize)]
struct AnnouncementResponse {
    #[serde(default)]
    data: Option<AnnouncementPage>,
}

#[derive(Debug, Deserialize)]
struct AnnouncementPage {
    #[serde(default)]
    list: Vec<AnnouncementItem>,
}

#[derive(Debug, Deserialize)]
struct AnnouncementItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    art_code: Option<String>,
}

pub struct AnnouncementApi {
    client: Client,
    base: String,
    pdf_base: String,
    timeout: Duration,
}

impl AnnouncementApi {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.endpoints.eastmoney.clone(),
            pdf_base: config.endpoints.eastmoney_pdf.clone(),
            timeout: config.api_timeout(),
        }
    }

    /// PDF location for an article code
    fn pdf_url(&self, art_code: &str) -> String {
        format!("{}/pdf/H2_{}_1.pdf", self.pdf_base, art_code)
    }

    async fn announcements(&self, request: &ReportRequest) -> Result<Vec<Announcement>> {
        let url = format!("{}{}", self.base, ANNOUNCEMENT_ENDPOINT);
        debug!("Querying eastmoney announcements: {}", url);

        let body = self
            .client
            .get(&url)
            .query(&[
                ("sr", "-1"),
                ("page_size", "50"),
                ("page_index", "1"),
                ("ann_type", "A"),
                ("client_source", "web"),
                ("stock_list", request.code.as_str()),
                ("f_node", "0"),
                ("s_node", "0"),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let parsed: AnnouncementResponse = serde_json::from_str(&body)?;
        let items = parsed.data.map(|page| page.list).unwrap_or_default();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let art_code = item.art_code.filter(|code| !code.is_empty())?;
                Some(Announcement {
                    title: item.title,
                    document_url: self.pdf_url(&art_code),
                })
            })
            .collect())
    }
}

#[async_trait]
impl Probe for AnnouncementApi {
    fn name(&self) -> &'static str {
        "eastmoney announcement api"
    }

    async fn attempt(&self, request: &ReportRequest, fetcher: &FileFetcher) -> Result<Option<Fetched>> {
        for announcement in self.announcements(request).await? {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::http::build_client;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_matching_item_downloads_from_art_code() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "data": {
                "list": [
                    {"title": "贵州茅台2021年第三季度报告", "art_code": "AN202110"},
                    {"title": "贵州茅台2021年年度报告", "art_code": "AN202203"},
                    {"title": "贵州茅台2021年年度报告", "art_code": ""}
                ]
            }
        });
        Mock::given(method("GET"))
            .and(path(ANNOUNCEMENT_ENDPOINT))
            .and(query_param("stock_list", "600519"))
            .and(query_param("ann_type", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pdf/H2_AN202203_1.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'%'; 2048], "application/pdf"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = Config::for_host(&server.uri(), dir.path());
        let client = build_client(&config).unwrap();
        let fetcher = FileFetcher::new(client.clone(), &config);
        let probe = AnnouncementApi::new(client, &config);

        let fetched = probe
            .attempt(&ReportRequest::new("600519", 2021), &fetcher)
            .await
            .unwrap()
            .unwrap();
        assert!(fetched.path().ends_with("A股_600519_2021年年度报告.pdf"));
    }

    #[tokio::test]
    async fn test_missing_data_is_no_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ANNOUNCEMENT_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = Config::for_host(&server.uri(), dir.path());
        let client = build_client(&config).unwrap();
        let fetcher = FileFetcher::new(client.clone(), &config);
        let probe = AnnouncementApi::new(client, &config);

        assert!(probe.attempt(&ReportRequest::new("600519", 2021), &fetcher).await.unwrap().is_none());
    }

    #[test]
    fn test_pdf_url_template() {
        let config = Config {
            endpoints: Endpoints::default(),
            ..Config::for_host("http://127.0.0.1:9", "reports")
        };
        let probe = AnnouncementApi::new(build_client(&config).unwrap(), &config);
        assert_eq!(probe.pdf_url("AN123"), "https://pdf.dfcfw.com/pdf/H2_AN123_1.pdf");
    }
}
