//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --color, --verbose) are inherited by all subcommands
//! - Running without a subcommand is the same as `inplace update`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// inplace - replace application code without losing runtime state
#[derive(Parser, Debug)]
#[command(name = "inplace")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'inplace check' first to preview what an update would do.")]
pub struct Cli {
    /// Emit NDJSON events and a final JSON report
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub args: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Update the installation in place (default)
    Update(RunArgs),

    /// Resolve, validate and preview the state guard without changing anything
    Check(RunArgs),
}

/// Options shared by `update` and `check`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Source tree to deploy (defaults to the directory inplace runs from)
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Installation root
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Directory the orchestrator runs from (defaults to the executable's directory)
    #[arg(long, value_name = "DIR")]
    pub origin: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not fast-forward the source checkout
    #[arg(long)]
    pub no_pull: bool,

    /// Application service unit (empty string disables service control)
    #[arg(long, value_name = "NAME")]
    pub service: Option<String>,

    /// Reverse-proxy unit (empty string skips the proxy restart)
    #[arg(long, value_name = "NAME")]
    pub proxy: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl RunArgs {
    /// Fill unset values from `outer`; values given after the subcommand win.
    pub fn merged(self, outer: RunArgs) -> RunArgs {
        RunArgs {
            source: self.source.or(outer.source),
            target: self.target.or(outer.target),
            origin: self.origin.or(outer.origin),
            config: self.config.or(outer.config),
            no_pull: self.no_pull || outer.no_pull,
            service: self.service.or(outer.service),
            proxy: self.proxy.or(outer.proxy),
            yes: self.yes || outer.yes,
        }
    }
}

impl Cli {
    /// The subcommand to run, with top-level options folded in.
    pub fn into_command(self) -> Commands {
        match self.command {
            None => Commands::Update(self.args),
            Some(Commands::Update(args)) => Commands::Update(args.merged(self.args)),
            Some(Commands::Check(args)) => Commands::Check(args.merged(self.args)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_subcommand_is_update() {
        let cli = Cli::try_parse_from(["inplace"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.into_command(), Commands::Update(RunArgs::default()));
    }

    #[test]
    fn test_cli_parse_bare_source() {
        let cli =
            Cli::try_parse_from(["inplace", "/srv/release", "--target", "/opt/app"]).unwrap();
        let Commands::Update(args) = cli.into_command() else {
            panic!("Expected Update command");
        };
        assert_eq!(args.source, Some(PathBuf::from("/srv/release")));
        assert_eq!(args.target, Some(PathBuf::from("/opt/app")));
        assert!(!args.no_pull);
    }

    #[test]
    fn test_cli_parse_update_flags() {
        let cli = Cli::try_parse_from([
            "inplace",
            "update",
            "-y",
            "--no-pull",
            "--service",
            "",
            "--proxy",
            "caddy",
        ])
        .unwrap();
        if let Commands::Update(args) = cli.into_command() {
            assert!(args.yes);
            assert!(args.no_pull);
            assert_eq!(args.service.as_deref(), Some(""));
            assert_eq!(args.proxy.as_deref(), Some("caddy"));
        } else {
            panic!("Expected Update command");
        }
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["inplace", "check", "--config", "/tmp/c.toml"]).unwrap();
        if let Commands::Check(args) = cli.into_command() {
            assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
            assert_eq!(args.source, None);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["inplace", "check", "--json", "-vv", "--color", "never"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, Some(ColorWhen::Never));
    }

    #[test]
    fn test_subcommand_values_win_over_top_level() {
        let outer = RunArgs {
            target: Some(PathBuf::from("/opt/outer")),
            service: Some("outer".to_string()),
            yes: true,
            ..RunArgs::default()
        };
        let inner = RunArgs {
            target: Some(PathBuf::from("/opt/inner")),
            ..RunArgs::default()
        };
        let merged = inner.merged(outer);
        assert_eq!(merged.target, Some(PathBuf::from("/opt/inner")));
        assert_eq!(merged.service.as_deref(), Some("outer"));
        assert!(merged.yes);
    }

    #[test]
    fn test_cli_rejects_unknown_color() {
        assert!(Cli::try_parse_from(["inplace", "--color", "sometimes"]).is_err());
    }
}
