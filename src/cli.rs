use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cxx-clippy CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "cxx-clippy",
    version,
    about = "Flag C++ performance anti-patterns and standard-upgrade opportunities in dumped ASTs",
    args_conflicts_with_subcommands = true,
    subcommand_precedence_over_arg = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze AST documents or directories of them.
    Lint(LintArgs),

    /// List available checks.
    ListChecks,

    /// Explain a check.
    Explain {
        /// Check id, legacy name or bare name.
        check: String,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LintArgs {
    /// `.ast.json` files or directories containing them.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these checks (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these checks (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Language standard (e.g. `c++20`), overriding what each document records.
    #[arg(long, value_name = "STD")]
    pub std: Option<String>,

    /// Path to a config file (default: search for cxx-clippy.toml upward).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Github,
}
