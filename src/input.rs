//! Parsing of user-supplied years and stock code lists

use std::path::Path;

use crate::errors::{ReportError, Result};

/// Years outside this window are rejected as typos.
pub const EARLIEST_YEAR: i32 = 1990;
pub const LATEST_YEAR: i32 = 2100;

/// `"2022"` → `[2022]`, `"2020-2022"` → `[2020, 2021, 2022]`.
pub fn parse_years(spec: &str) -> Result<Vec<i32>> {
    let spec = spec.trim();
    let parse = |s: &str| {
        let year = s
            .trim()
            .parse::<i32>()
            .map_err(|_| ReportError::InvalidInput(format!("bad year '{}' in '{}'", s.trim(), spec)))?;
        if !(EARLIEST_YEAR..=LATEST_YEAR).contains(&year) {
            return Err(ReportError::InvalidInput(format!(
                "year {} outside {}-{}",
                year, EARLIEST_YEAR, LATEST_YEAR
            )));
        }
        Ok(year)
    };

    match spec.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse(start)?, parse(end)?);
            if start > end {
                return Err(ReportError::InvalidInput(format!(
                    "year range '{}' runs backwards",
                    spec
                )));
            }
            Ok((start..=end).collect())
        }
        None => Ok(vec![parse(spec)?]),
    }
}

/// One code per line, first whitespace-separated token; blank lines and
/// `#` comments are skipped.
pub fn parse_codes(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

pub fn read_codes_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReportError::InvalidInput(format!("cannot read codes file {}: {}", path.display(), e))
    })?;
    Ok(parse_codes(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_year() {
        assert_eq!(parse_years("2022").unwrap(), vec![2022]);
        assert_eq!(parse_years(" 2022 ").unwrap(), vec![2022]);
    }

    #[test]
    fn test_year_range_inclusive() {
        assert_eq!(parse_years("2020-2022").unwrap(), vec![2020, 2021, 2022]);
        assert_eq!(parse_years("2021-2021").unwrap(), vec![2021]);
    }

    #[test]
    fn test_bad_years() {
        for bad in ["", "twenty", "2020-", "2022-2020", "2020-2021-2022"] {
            assert!(
                matches!(parse_years(bad), Err(ReportError::InvalidInput(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_years_outside_window() {
        for bad in ["2147483647", "1989", "2101", "0-2147483647", "2020-9999", "-5"] {
            assert!(
                matches!(parse_years(bad), Err(ReportError::InvalidInput(_))),
                "{bad}"
            );
        }
        assert_eq!(parse_years("1990").unwrap(), vec![1990]);
        assert_eq!(parse_years("2099-2100").unwrap(), vec![2099, 2100]);
    }

    #[test]
    fn test_parse_codes_skips_comments_and_blanks() {
        let content = "# banks\n000001 平安银行\n\n  600519   贵州茅台\n#00700\n00700\n";
        assert_eq!(parse_codes(content), vec!["000001", "600519", "00700"]);
    }

    #[test]
    fn test_read_codes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codes.txt");
        std::fs::write(&path, "000001\n00700 腾讯\n").unwrap();
        assert_eq!(read_codes_file(&path).unwrap(), vec!["000001", "00700"]);
    }

    #[test]
    fn test_missing_codes_file() {
        let dir = TempDir::new().unwrap();
        let err = read_codes_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }
}
