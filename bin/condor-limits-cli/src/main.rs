// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # condor-limits
//!
//! Command-line interface for the HTCondor pool views.
//!
//! ## Usage
//! ```bash
//! # Show limits, usage and capacity of the local pool
//! condor-limits status
//!
//! # Same for a remote pool, machine-readable
//! condor-limits --pool cm.example.org status --json
//!
//! # Change or remove a concurrency limit
//! condor-limits set gpu 16
//! condor-limits unset gpu
//!
//! # Read a limit the way a controller sees it
//! condor-limits inspect cloud local cpus
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "condor-limits",
    about = "Inspect and steer HTCondor concurrency limits",
    version,
    author
)]
struct Cli {
    /// Path to a TOML view configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// HTCondor pool to query (overrides the configuration file).
    #[arg(short, long, global = true)]
    pool: Option<String>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display configured limits, their usage and the pool capacity.
    Status {
        /// Print a JSON document instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Set the concurrency limit of a resource.
    Set {
        /// Name of the concurrency limit.
        resource: String,

        /// New limit; fractions are truncated.
        value: f64,
    },

    /// Remove the concurrency limit of a resource.
    Unset {
        /// Name of the concurrency limit.
        resource: String,
    },

    /// Show supply, demand and utilisation of a resource as a controller sees it.
    Inspect {
        /// Name of the concurrency limit.
        resource: String,

        /// Concurrency limit that conflicts with `resource`.
        #[arg(requires = "total")]
        opponent: Option<String>,

        /// Total shared by `resource` and `opponent`: a number or one of
        /// cpus, memory, disk, machines.
        #[arg(requires = "opponent")]
        total: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.pool)?;

    match cli.command {
        Commands::Status { json } => commands::status::execute(&config, json),
        Commands::Set { resource, value } => commands::set::execute(&config, &resource, Some(value)),
        Commands::Unset { resource } => commands::set::execute(&config, &resource, None),
        Commands::Inspect {
            resource,
            opponent,
            total,
        } => commands::inspect::execute(&config, resource, opponent.zip(total)),
    }
}
