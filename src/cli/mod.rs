//! CLI module for X-Ray
//!
//! Provides commands:
//! - `serve`: Run the reference trace store
//! - `demo`: Record the Content Recommendation pipeline
//! - `traces`: List recorded traces
//! - `show`: Inspect one trace's timeline

use clap::{Parser, Subcommand};

use crate::server::AppConfig;

pub mod demo;
pub mod inspect;

/// X-Ray pipeline trace recorder
#[derive(Parser, Debug)]
#[command(name = "xray")]
#[command(about = "Record and replay multi-step decision pipelines")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the reference trace store
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the Content Recommendation demo pipeline
    Demo {
        /// Record into an in-process store and print the timeline
        #[arg(long)]
        offline: bool,
    },
    /// List recorded traces, most recent first
    Traces,
    /// Show a trace's timeline and the selected step
    Show {
        /// Trace ID
        trace_id: String,
        /// Step position to select (0-based)
        #[arg(long)]
        step: Option<usize>,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { port }) => crate::server::run(&config, port).await,
        Some(Commands::Demo { offline }) => demo::run(&config, offline).await,
        Some(Commands::Traces) => inspect::list(&config).await,
        Some(Commands::Show { trace_id, step }) => {
            inspect::show(&config, &trace_id.into(), step).await
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
