//! nianbao: download annual reports of A-share and Hong Kong listed companies
//! from the exchanges' disclosure sites.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod downloader;
pub mod errors;
pub mod fetcher;
pub mod http;
pub mod input;
pub mod market;
pub mod models;
pub mod report;

pub use errors::ReportError;
pub use market::Market;
pub use models::{DownloadOutcome, DownloadStatus, ReportRequest};
