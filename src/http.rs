use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::Client;

use crate::config::Config;
use crate::errors::Result;

/// Build the one client shared by every probe and the fetcher for the whole
/// run. Browser-like headers; cookies persist across calls like a session.
pub fn build_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.http.user_agent)?);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let client = Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .timeout(config.download_timeout())
        .build()?;
    Ok(client)
}
