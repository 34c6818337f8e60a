// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::campaign::ReadColumn;

/// Command-line arguments for `polishplan`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "polishplan",
    version,
    about = "Plan assembly polishing campaigns: artifact names, inputs, resources and job trees.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the campaign config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Polishplan.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POLISHPLAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load and validate config and tables, print a summary.
    Check,

    /// Print every wanted assembly artifact name.
    Assemblies {
        /// Include every intermediate polishing round.
        #[arg(long)]
        unroll: bool,

        /// Only base assemblies.
        #[arg(long)]
        base_only: bool,

        /// Only samples that belong to a reference group.
        #[arg(long)]
        grouped: bool,
    },

    /// Print every read file referenced for the given columns.
    Reads {
        #[arg(long = "column", value_enum, required = true)]
        columns: Vec<ReadColumnArg>,

        /// Suffix paths with the sample's reference group.
        #[arg(long)]
        group_scoped: bool,
    },

    /// Print the inputs needed to build an artifact.
    Resolve {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print every intermediate artifact of a polished artifact.
    Unroll {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print the resource declaration for the job building an artifact.
    Resources {
        #[arg(value_name = "NAME")]
        name: String,

        /// Job kind used to look up campaign defaults.
        #[arg(long, value_name = "KEY")]
        key: String,
    },

    /// Print the per-sample dependency forest of a job graph.
    Report {
        #[arg(long, value_name = "PATH")]
        graph: String,
    },
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Check => "check",
            Command::Assemblies { .. } => "assemblies",
            Command::Reads { .. } => "reads",
            Command::Resolve { .. } => "resolve",
            Command::Unroll { .. } => "unroll",
            Command::Resources { .. } => "resources",
            Command::Report { .. } => "report",
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ReadColumnArg {
    Ont,
    I1,
    I2,
}

impl From<ReadColumnArg> for ReadColumn {
    fn from(arg: ReadColumnArg) -> Self {
        match arg {
            ReadColumnArg::Ont => ReadColumn::Ont,
            ReadColumnArg::I1 => ReadColumn::I1,
            ReadColumnArg::I2 => ReadColumn::I2,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
