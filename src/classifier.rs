//! Annual-report title recognition

/// Terms marking a filing as something other than the full report. Matched
/// against the lowercased title, simplified and traditional forms both listed.
const EXCLUDED_TERMS: &[&str] = &[
    "摘要",
    "summary",
    "更正",
    "correction",
    "补充",
    "補充",
    "supplement",
    "修订",
    "修訂",
    "amendment",
];

/// True when `title` is the full annual report for `year`.
///
/// Exclusions win: "2022年年度报告摘要" is rejected even though it also
/// contains "2022年年度报告".
pub fn is_annual_report(title: &str, year: i32) -> bool {
    let title = title.to_lowercase();

    if EXCLUDED_TERMS.iter().any(|term| title.contains(term)) {
        return false;
    }

    included_phrases(year)
        .iter()
        .any(|phrase| title.contains(phrase.as_str()))
}

fn included_phrases(year: i32) -> [String; 7] {
    [
        format!("{year}年年度报告"),
        format!("{year}年度报告"),
        format!("{year}年报"),
        format!("{year}年年報"),
        format!("{year}年度報告"),
        format!("{year} annual report"),
        format!("annual report {year}"),
    ]
}

/// True when free text (anchor text, link target) reads as a summary edition.
pub fn is_summary(text: &str) -> bool {
    text.contains("摘要") || text.to_lowercase().contains("summary")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_report_accepted() {
        assert!(is_annual_report("2022年年度报告", 2022));
        assert!(is_annual_report("平安银行：2022年年度报告", 2022));
        assert!(is_annual_report("2022年报", 2022));
        assert!(is_annual_report("Tencent 2022 Annual Report", 2022));
        assert!(is_annual_report("ANNUAL REPORT 2022", 2022));
    }

    #[test]
    fn test_other_year_rejected() {
        assert!(!is_annual_report("2021年年度报告", 2022));
        assert!(!is_annual_report("2021 Annual Report", 2022));
    }

    #[test]
    fn test_exclusion_beats_inclusion() {
        assert!(!is_annual_report("2022年年度报告摘要", 2022));
        assert!(!is_annual_report("关于2022年年度报告的更正公告", 2022));
        assert!(!is_annual_report("2022年年度报告（修订版）", 2022));
        assert!(!is_annual_report("2022年年度报告补充公告", 2022));
        assert!(!is_annual_report("2022 Annual Report Summary", 2022));
        assert!(!is_annual_report("2022 Annual Report - Amendment", 2022));
        assert!(!is_annual_report("Correction to 2022 annual report", 2022));
    }

    #[test]
    fn test_unrelated_titles_rejected() {
        assert!(!is_annual_report("2022年第三季度报告", 2022));
        assert!(!is_annual_report("2022年半年度报告", 2022));
        assert!(!is_annual_report("", 2022));
    }

    #[test]
    fn test_is_summary() {
        assert!(is_summary("2022年報摘要"));
        assert!(is_summary("Annual Report SUMMARY"));
        assert!(!is_summary("2022 Annual Report"));
    }
}
