//! CLI command definitions
//!
//! Defines the clap commands for the integrations E2E runner.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::common::config::BrowserKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in integrations page suite
    Run {
        #[command(flatten)]
        options: RunArgs,
    },

    /// Run a suite from a YAML file
    Test {
        /// Path to the suite file
        path: PathBuf,

        #[command(flatten)]
        options: RunArgs,
    },

    /// List scenarios of the built-in suite, or of a suite file
    List {
        /// Path to a suite file (default: built-in suite)
        path: Option<PathBuf>,
    },
}

/// Options shared by `run` and `test`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Only run scenarios whose name contains this (repeatable)
    #[arg(long)]
    pub only: Vec<String>,

    /// Print the report as JSON after the run
    #[arg(long)]
    pub json: bool,

    /// Show step details and debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Server URL (overrides the config file)
    #[arg(long)]
    pub server_url: Option<String>,

    /// WebDriver URL (overrides the config file)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Browser to drive: chrome or firefox
    #[arg(long)]
    pub browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

impl Commands {
    /// Whether debug logging was requested
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Run { options } | Commands::Test { options, .. } => options.verbose,
            Commands::List { .. } => false,
        }
    }
}
