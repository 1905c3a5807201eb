// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use diagnostics::{LogLevel, log_debug};
use repotree::FactoryRegistry;

use cmd::commands;
use cmd::common::SourceArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "repotree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr, overriding REPOTREE_LOG
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the expanded tree of one or more sources
    Tree {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// List the rows below a node
    Ls {
        #[command(flatten)]
        sources: SourceArgs,

        /// Node path to list, the root when omitted
        #[arg(short, long)]
        path: Option<String>,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the attributes of a node
    Attrs {
        #[command(flatten)]
        sources: SourceArgs,

        /// Node path whose attributes are listed
        #[arg(short, long)]
        path: String,
    },
    /// List the registered source factories
    Factories,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        diagnostics::init_with_level(LogLevel::Debug);
    } else {
        diagnostics::init();
    }
    log_debug!("Starting repotree");

    let output = match &cli.command {
        Commands::Tree { sources } => commands::tree_command(sources)?,
        Commands::Ls {
            sources,
            path,
            json,
        } => commands::ls_command(sources, path.as_deref(), *json)?,
        Commands::Attrs { sources, path } => commands::attrs_command(sources, path)?,
        Commands::Factories => commands::factories_command(&FactoryRegistry::default()),
    };

    print!("{output}");
    Ok(())
}
