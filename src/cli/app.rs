//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::{check, inspect, logging, resolve};
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "plugreg")]
#[command(author, version, about = "Inspect and simulate dependency-aware plugin registries")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Manifest file (defaults to the workspace's configured manifest)
    #[arg(long, short = 'm', global = true, env = "PLUGREG_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace with a config and a starter manifest
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// List declared plugins
    List,

    /// Show one plugin with its dependencies and dependents
    Show {
        /// Plugin key
        key: String,
    },

    /// Validate the manifest: undefined dependencies and cycles
    Check,

    /// Print the order in which requiring a plugin builds its dependencies
    Order {
        /// Plugin key
        key: String,
    },

    /// Require a plugin from a fresh registry and report each instance
    Resolve {
        /// Plugin key
        key: String,

        /// Init argument, as JSON (plain text is taken as a string); repeatable
        #[arg(long = "arg", value_name = "JSON")]
        args: Vec<String>,

        /// Number of times to require the plugin
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        times: u32,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Config is only read by commands that need a manifest, so `init` works
    // next to a broken config file
    let open_session = || -> Result<(Session, Output)> {
        let config = Config::load()?;
        let format = cli.format.unwrap_or(config.global.default_format);
        debug!(?format, project_root = ?config.project_root, "loaded config");

        let output = Output::new(format);
        let session = Session::open(&config, cli.manifest.as_deref(), &output)?;
        Ok((session, output))
    };

    match cli.command {
        Commands::Init { path } => {
            let output = Output::new(cli.format.unwrap_or_default());
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let workspace = Workspace::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Manifest at: {}", workspace.manifest_path().display()),
            );
            output.success(&format!(
                "Initialized plugreg workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::List => {
            let (session, output) = open_session()?;
            inspect::list(&session, &output)?
        }
        Commands::Show { key } => {
            let (session, output) = open_session()?;
            inspect::show(&session, &output, &key)?
        }
        Commands::Check => {
            let (session, output) = open_session()?;
            check::run(&session, &output)?
        }
        Commands::Order { key } => {
            let (session, output) = open_session()?;
            inspect::order(&session, &output, &key)?
        }
        Commands::Resolve { key, args, times } => {
            let (session, output) = open_session()?;
            resolve::run(&session, &output, &key, &args, times)?
        }
    }

    debug!("command completed");
    Ok(())
}
