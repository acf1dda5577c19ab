// paramcheck/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{ArgAction, Parser, Subcommand};
use paramcheck_core::domain::project::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paramcheck")]
#[command(about = "Rule-driven validation of network-element configuration parameters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🔎 Validates the exported MO data against the knowledge base
    Check {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Only check this MO
        #[arg(long)]
        mo: Option<String>,

        /// Only check this instance key (e.g. "1-2")
        #[arg(long)]
        instance: Option<String>,

        /// Report format, overrides the project configuration
        #[arg(long)]
        format: Option<ReportFormat>,

        /// Exit with an error when any finding exists
        #[arg(long)]
        strict: bool,
    },

    /// 🧪 Checks the knowledge base itself (syntax, rule cycles, dangling links)
    Lint {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// ⚡ Evaluates a condition expression against ad-hoc parameter values
    Eval {
        /// Condition, e.g. "(频段=N78 and 带宽>=100)"
        expression: String,

        /// Parameter value as name=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// 🌱 Writes a sample project (knowledge base, MO data, paramcheck.yaml)
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_check_defaults() -> Result<()> {
        let args = Cli::parse_from(["paramcheck", "check"]);
        assert_eq!(args.verbose, 0);
        match args.command {
            Commands::Check {
                project_dir,
                mo,
                format,
                strict,
                ..
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(mo, None);
                assert_eq!(format, None);
                assert!(!strict);
                Ok(())
            }
            _ => bail!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parse_check_scoped() -> Result<()> {
        let args = Cli::parse_from([
            "paramcheck",
            "-vv",
            "check",
            "--project-dir",
            "/tmp/audit",
            "--mo",
            "NRDUCELL",
            "--instance",
            "1-2",
            "--format",
            "json",
            "--strict",
        ]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Commands::Check {
                project_dir,
                mo,
                instance,
                format,
                strict,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp/audit");
                assert_eq!(mo.as_deref(), Some("NRDUCELL"));
                assert_eq!(instance.as_deref(), Some("1-2"));
                assert_eq!(format, Some(ReportFormat::Json));
                assert!(strict);
                Ok(())
            }
            _ => bail!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parse_eval_params() -> Result<()> {
        let args = Cli::parse_from(["paramcheck", "eval", "a=1 and b>2", "-p", "a=1", "--param", "b=3"]);
        match args.command {
            Commands::Eval { expression, params } => {
                assert_eq!(expression, "a=1 and b>2");
                assert_eq!(params, vec!["a=1", "b=3"]);
                Ok(())
            }
            _ => bail!("Expected Eval command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["paramcheck", "check", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_parse_init() -> Result<()> {
        let args = Cli::parse_from(["paramcheck", "init", "audit", "--name", "site-audit"]);
        match args.command {
            Commands::Init { dir, name } => {
                assert_eq!(dir.to_string_lossy(), "audit");
                assert_eq!(name.as_deref(), Some("site-audit"));
                Ok(())
            }
            _ => bail!("Expected Init command"),
        }
    }
}
