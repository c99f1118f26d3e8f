//! Error types shared by the probes, the fetcher and the input parsers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status_code} for {url}")]
    HttpStatus { status_code: u16, url: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Downloaded file rejected: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Errors a probe downgrades to "no result" so the next source gets a chance.
    /// Anything else is a local failure that aborts the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReportError::Http(_)
                | ReportError::HttpStatus { .. }
                | ReportError::Parse(_)
                | ReportError::Validation(_)
        )
    }

    /// Transport-level failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ReportError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Parse(err.to_string())
    }
}

impl From<regex::Error> for ReportError {
    fn from(err: regex::Error) -> Self {
        ReportError::Parse(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ReportError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        ReportError::InvalidInput(err.to_string())
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_are_recoverable() {
        assert!(ReportError::Parse("bad json".into()).is_recoverable());
        assert!(ReportError::Validation("too small".into()).is_recoverable());
        assert!(ReportError::HttpStatus { status_code: 404, url: "x".into() }.is_recoverable());
    }

    #[test]
    fn test_local_errors_are_not_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!ReportError::from(io).is_recoverable());
        assert!(!ReportError::InvalidInput("year".into()).is_recoverable());
    }
}
