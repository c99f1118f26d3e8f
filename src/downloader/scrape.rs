//! Regex link extraction from disclosure listing pages
//!
//! Listing pages are matched as raw text; no DOM parsing. Patterns must capture
//! the link target in group 1 and the anchor text in group 2.

use regex::Regex;

use crate::classifier::is_summary;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

impl Link {
    pub fn is_summary(&self) -> bool {
        is_summary(&self.text) || is_summary(&self.href)
    }
}

/// All matches of `pattern` in document order.
pub fn links(html: &str, pattern: &str) -> Result<Vec<Link>> {
    let re = Regex::new(pattern)?;
    Ok(re
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str().to_string();
            let text = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            Some(Link { href, text })
        })
        .collect())
}

/// First match of `pattern` that is not a summary edition.
pub fn first_full_report(html: &str, pattern: &str) -> Result<Option<Link>> {
    Ok(links(html, pattern)?.into_iter().find(|link| !link.is_summary()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <tr><td><a href="/listedco/2022/summary.pdf">2022 Annual Report Summary</a></td></tr>
        <tr><td><a href="/listedco/2022/ar.pdf" target="_blank">2022 Annual Report</a></td></tr>
        <tr><td><a href="/listedco/2022/interim.pdf">2022 Interim Report</a></td></tr>
    "#;

    #[test]
    fn test_links_in_document_order() {
        let found = links(PAGE, r#"(?i)href="([^"]*)"[^>]*>([^<]*2022[^<]*Annual\s+Report[^<]*)"#).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].href, "/listedco/2022/summary.pdf");
        assert_eq!(found[1].text, "2022 Annual Report");
    }

    #[test]
    fn test_first_full_report_skips_summary() {
        let link = first_full_report(PAGE, r#"(?i)href="([^"]*)"[^>]*>([^<]*2022[^<]*Annual\s+Report[^<]*)"#)
            .unwrap()
            .unwrap();
        assert_eq!(link.href, "/listedco/2022/ar.pdf");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(
            first_full_report(PAGE, r#"href="([^"]*)"[^>]*>([^<]*2019[^<]*)"#).unwrap(),
            None
        );
    }
}
