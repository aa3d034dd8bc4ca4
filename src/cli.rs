//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collection and field registry over PostgreSQL", long_about = None)]
pub struct Args {
    /// Path to the config file (defaults to ./.rectus.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// PostgreSQL connection string; overrides the config file and environment
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log filter, e.g. `debug` or `rectus=trace` (defaults to RUST_LOG, then info)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_defaults() {
        let args = Args::try_parse_from(["rectus", "setup"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.database_url, None);
        assert_eq!(args.format, OutputFormat::Table);
        assert_eq!(args.log_level, None);
    }

    #[rstest]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "rectus",
            "collections",
            "list",
            "--format",
            "json",
            "--database-url",
            "postgres://localhost/cms",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.database_url.as_deref(), Some("postgres://localhost/cms"));
    }

    #[rstest]
    #[case("table", OutputFormat::Table)]
    #[case("json", OutputFormat::Json)]
    #[case("toon", OutputFormat::Toon)]
    fn test_format_values(#[case] value: &str, #[case] expected: OutputFormat) {
        let args = Args::try_parse_from(["rectus", "-f", value, "setup"]).unwrap();
        assert_eq!(args.format, expected);
    }

    #[rstest]
    fn test_setup_dry_run() {
        let args = Args::try_parse_from(["rectus", "--config", "cms.json", "setup", "--dry-run"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cms.json")));
        match args.command {
            Command::Setup(cmd) => assert!(cmd.dry_run),
            _ => panic!("Expected Setup command"),
        }
    }

    #[rstest]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["rectus", "-f", "xml", "setup"]).is_err());
    }

    #[rstest]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["rectus"]).is_err());
    }
}
