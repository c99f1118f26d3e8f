use serde::{Deserialize, Serialize};

/// Listing venue of a stock, decided purely from the shape of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Shanghai / Shenzhen A-shares, 6-digit codes
    Mainland,
    /// HKEX main board, 4-5 digit codes
    HongKong,
}

impl Market {
    /// Count the digits of `code`; 4 or 5 means Hong Kong, anything else
    /// (including malformed input) falls back to Mainland.
    pub fn classify(code: &str) -> Self {
        match code.chars().filter(|c| c.is_ascii_digit()).count() {
            4 | 5 => Market::HongKong,
            _ => Market::Mainland,
        }
    }

    /// Prefix used in downloaded filenames
    pub fn label(&self) -> &'static str {
        match self {
            Market::Mainland => "A股",
            Market::HongKong => "港股",
        }
    }

    /// Form of the code used in URLs and filenames. HKEX paths expect
    /// five characters, left-padded with zeros.
    pub fn normalize_code(&self, code: &str) -> String {
        match self {
            Market::Mainland => code.to_string(),
            Market::HongKong => format!("{:0>5}", code),
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
