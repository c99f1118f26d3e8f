use clap::Parser;
use std::path::PathBuf;

use nianbao::errors::{ReportError, Result};
use nianbao::input;

#[derive(Parser, Debug)]
#[command(name = "nianbao")]
#[command(about = "Download annual reports of A-share and Hong Kong listed companies")]
#[command(version)]
#[command(after_help = "Examples:\n  nianbao 000001 2022\n  nianbao 00700 2021\n  nianbao -c 000001 600519 -y 2020-2022\n  nianbao -f codes.txt -y 2022 -d reports")]
pub struct Cli {
    /// Stock code (single report mode)
    #[arg(conflicts_with_all = ["codes", "file"], requires = "year")]
    pub code: Option<String>,

    /// Fiscal year or range (single report mode)
    pub year: Option<String>,

    /// Stock codes to download
    #[arg(short, long, num_args = 1.., conflicts_with = "file")]
    pub codes: Vec<String>,

    /// File with one stock code per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Year or inclusive range (2022 or 2020-2022)
    #[arg(short, long)]
    pub years: Option<String>,

    /// Download directory
    #[arg(short, long, env = "NIANBAO_DOWNLOAD_DIR", default_value = "annual_reports")]
    pub dir: PathBuf,
}

/// What to download, resolved from the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub codes: Vec<String>,
    pub years: Vec<i32>,
}

impl Cli {
    /// `Ok(None)` when neither mode was requested, so usage should be shown.
    pub fn job(&self) -> Result<Option<Job>> {
        if let Some(code) = &self.code {
            let year = self
                .year
                .as_deref()
                .ok_or_else(|| ReportError::InvalidInput("missing year".to_string()))?;
            return Ok(Some(Job {
                codes: vec![code.clone()],
                years: input::parse_years(year)?,
            }));
        }

        let codes = match &self.file {
            Some(path) => input::read_codes_file(path)?,
            None if !self.codes.is_empty() => self.codes.clone(),
            None => return Ok(None),
        };
        if codes.is_empty() {
            return Err(ReportError::InvalidInput("no stock codes to download".to_string()));
        }

        let years = self
            .years
            .as_deref()
            .ok_or_else(|| ReportError::InvalidInput("--years is required with --codes/--file".to_string()))?;

        Ok(Some(Job {
            codes,
            years: input::parse_years(years)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nianbao").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_mode() {
        let cli = parse(&["000001", "2022"]);
        assert_eq!(
            cli.job().unwrap(),
            Some(Job { codes: vec!["000001".to_string()], years: vec![2022] })
        );
    }

    #[test]
    fn test_batch_codes() {
        let cli = parse(&["-c", "000001", "00700", "-y", "2020-2021", "-d", "out"]);
        assert_eq!(cli.dir, PathBuf::from("out"));
        assert_eq!(
            cli.job().unwrap(),
            Some(Job {
                codes: vec!["000001".to_string(), "00700".to_string()],
                years: vec![2020, 2021],
            })
        );
    }

    #[test]
    fn test_batch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codes.txt");
        std::fs::write(&path, "# list\n600519\n").unwrap();

        let cli = parse(&["--file", path.to_str().unwrap(), "--years", "2022"]);
        assert_eq!(cli.job().unwrap().unwrap().codes, vec!["600519".to_string()]);
    }

    #[test]
    fn test_no_mode_shows_usage() {
        assert_eq!(parse(&[]).job().unwrap(), None);
    }

    #[test]
    fn test_batch_without_years_is_input_error() {
        let err = parse(&["-c", "000001"]).job().unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }

    #[test]
    fn test_bad_year_is_input_error() {
        let err = parse(&["000001", "twenty"]).job().unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }

    #[test]
    fn test_codes_and_file_conflict() {
        assert!(Cli::try_parse_from(["nianbao", "-c", "000001", "-f", "codes.txt", "-y", "2022"]).is_err());
    }

    #[test]
    fn test_code_without_year_rejected() {
        assert!(Cli::try_parse_from(["nianbao", "000001"]).is_err());
    }
}
