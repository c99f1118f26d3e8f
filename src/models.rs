use serde::{Deserialize, Serialize};

use crate::market::Market;

/// A single (code, year) lookup after market classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Code as the user typed it
    pub stock_code: String,
    /// Code as the market's URLs expect it
    pub code: String,
    pub year: i32,
    pub market: Market,
}

impl ReportRequest {
    pub fn new(stock_code: &str, year: i32) -> Self {
        let market = Market::classify(stock_code);
        Self {
            stock_code: stock_code.to_string(),
            code: market.normalize_code(stock_code),
            year,
            market,
        }
    }

    /// `<MarketLabel>_<code>_<year>年年度报告.pdf`
    pub fn filename(&self) -> String {
        format!("{}_{}_{}年年度报告.pdf", self.market.label(), self.code, self.year)
    }
}

/// A title/link pair returned by one of the disclosure sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub document_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Success { filename: String },
    NotFound { message: String },
    Failed { error: String },
}

/// Terminal result for one requested (code, year) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub stock_code: String,
    pub year: i32,
    pub market: Market,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    pub fn new(request: &ReportRequest, status: DownloadStatus) -> Self {
        Self {
            stock_code: request.stock_code.clone(),
            year: request.year,
            market: request.market,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, DownloadStatus::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_uses_padded_hk_code() {
        let request = ReportRequest::new("0700", 2021);
        assert_eq!(request.market, Market::HongKong);
        assert_eq!(request.stock_code, "0700");
        assert_eq!(request.filename(), "港股_00700_2021年年度报告.pdf");
    }

    #[test]
    fn test_filename_mainland() {
        let request = ReportRequest::new("000001", 2022);
        assert_eq!(request.filename(), "A股_000001_2022年年度报告.pdf");
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let request = ReportRequest::new("000001", 2022);
        let outcome = DownloadOutcome::new(
            &request,
            DownloadStatus::NotFound { message: "none".to_string() },
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["message"], "none");
        assert_eq!(json["stock_code"], "000001");
    }
}
