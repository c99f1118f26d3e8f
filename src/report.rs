//! Run summary rendering and persistence

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::{DownloadOutcome, DownloadStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub success: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl Tally {
    pub fn of(outcomes: &[DownloadOutcome]) -> Self {
        outcomes.iter().fold(Tally::default(), |mut tally, outcome| {
            tally.total += 1;
            match outcome.status {
                DownloadStatus::Success { .. } => tally.success += 1,
                DownloadStatus::NotFound { .. } => tally.not_found += 1,
                DownloadStatus::Failed { .. } => tally.failed += 1,
            }
            tally
        })
    }
}

/// Human readable summary, one line per outcome in request order.
pub fn render(outcomes: &[DownloadOutcome]) -> String {
    let tally = Tally::of(outcomes);
    let mut report = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(report, "========== 下载报告 ==========");
    let _ = writeln!(report, "总计: {} 个文件", tally.total);
    let _ = writeln!(report, "下载成功: {} 个", tally.success);
    let _ = writeln!(report, "未找到: {} 个", tally.not_found);
    let _ = writeln!(report, "下载失败: {} 个", tally.failed);
    let _ = writeln!(report);
    let _ = write!(report, "详细结果:");

    for outcome in outcomes {
        let detail = match &outcome.status {
            DownloadStatus::Success { filename } => format!("✅ 下载成功 - {}", filename),
            DownloadStatus::NotFound { message } => format!("❌ 未找到 - {}", message),
            DownloadStatus::Failed { error } => format!("❌ 下载失败 - {}", error),
        };
        let _ = write!(report, "\n  {} {}年: {}", outcome.stock_code, outcome.year, detail);
    }

    report
}

pub fn report_filename(at: DateTime<Local>) -> String {
    format!("report_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Write the rendered report to `report_<YYYYMMDD_HHMMSS>.txt` in `dir`.
pub fn save(report: &str, dir: &Path, at: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(at));
    std::fs::write(&path, report)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportRequest;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn outcomes() -> Vec<DownloadOutcome> {
        vec![
            DownloadOutcome::new(
                &ReportRequest::new("600519", 2022),
                DownloadStatus::Success { filename: "A股_600519_2022年年度报告.pdf".to_string() },
            ),
            DownloadOutcome::new(
                &ReportRequest::new("000001", 2022),
                DownloadStatus::NotFound { message: "所有方法都未找到2022年年报".to_string() },
            ),
            DownloadOutcome::new(
                &ReportRequest::new("00700", 2021),
                DownloadStatus::Failed { error: "IO error: disk full".to_string() },
            ),
        ]
    }

    #[test]
    fn test_tally() {
        assert_eq!(
            Tally::of(&outcomes()),
            Tally { total: 3, success: 1, not_found: 1, failed: 1 }
        );
    }

    #[test]
    fn test_render_lines_in_order() {
        let report = render(&outcomes());
        assert!(report.contains("总计: 3 个文件"));
        assert!(report.contains("下载成功: 1 个"));

        let details: Vec<&str> = report.split("详细结果:").nth(1).unwrap().lines().skip(1).collect();
        assert_eq!(details.len(), 3);
        assert_eq!(details[0], "  600519 2022年: ✅ 下载成功 - A股_600519_2022年年度报告.pdf");
        assert_eq!(details[1], "  000001 2022年: ❌ 未找到 - 所有方法都未找到2022年年报");
        assert_eq!(details[2], "  00700 2021年: ❌ 下载失败 - IO error: disk full");
    }

    #[test]
    fn test_render_empty() {
        let report = render(&[]);
        assert!(report.contains("总计: 0 个文件"));
        assert!(report.ends_with("详细结果:"));
    }

    #[test]
    fn test_save_uses_timestamped_name() {
        let dir = TempDir::new().unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap();
        let path = save("hello", dir.path(), at).unwrap();
        assert_eq!(path, dir.path().join("report_20240305_090701.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
