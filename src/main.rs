use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::warn;
use serde_json::json;

use anomaly_globe::AnomalyLoader;

const USAGE: &str = "usage: anomaly-globe <file.csv> [--json]  (or set ANOMALY_FILE)";

#[derive(Debug, PartialEq)]
struct CliArgs {
    path: Option<PathBuf>,
    as_json: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        path: None,
        as_json: false,
    };
    for arg in args {
        if arg == "--json" {
            parsed.as_json = true;
        } else if arg.starts_with("--") {
            bail!("unknown option '{arg}'\n{USAGE}");
        } else if let Some(previous) = &parsed.path {
            bail!("unexpected argument '{arg}' after '{}'\n{USAGE}", previous.display());
        } else {
            parsed.path = Some(PathBuf::from(arg));
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let path = args
        .path
        .or_else(|| std::env::var_os("ANOMALY_FILE").map(PathBuf::from))
        .context(USAGE)?;

    let (dataset, report) = AnomalyLoader::default()
        .load_with_report(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    if args.as_json {
        let out = json!({ "summary": dataset.summary(), "report": report });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", dataset.summary());
    if !report.dropped_columns.is_empty() {
        warn!("{} header column(s) ignored", report.dropped_columns.len());
    }
    if !report.skipped_rows.is_empty() {
        warn!("{} row(s) skipped", report.skipped_rows.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn path_and_json_flag() {
        let parsed = parse_args(args(&["--json", "grid.csv"])).unwrap();
        assert_eq!(
            parsed,
            CliArgs {
                path: Some(PathBuf::from("grid.csv")),
                as_json: true
            }
        );
        assert_eq!(parse_args(args(&[])).unwrap().path, None);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(parse_args(args(&["--help"])).is_err());
        assert!(parse_args(args(&["grid.csv", "--jsn"])).is_err());
    }

    #[test]
    fn second_path_is_rejected() {
        let err = parse_args(args(&["a.csv", "b.csv"])).unwrap_err();
        assert!(err.to_string().contains("b.csv"));
    }
}
