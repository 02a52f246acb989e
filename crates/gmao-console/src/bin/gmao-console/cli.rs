//! CLI definitions for gmao-console.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gmao-console",
    version,
    about = "Terminal console for a GMAO factory maintenance server",
    infer_subcommands = true,
    arg_required_else_help = false,
    after_help = "Examples:\n  gmao-console                            # interactive console\n  gmao-console --url ws://plant-a:9001    # point at another server\n  gmao-console send lister                # ask for a fresh snapshot push\n  gmao-console send delete-machine --id M4\n  gmao-console snapshot                   # print the current state as JSON"
)]
pub struct Cli {
    /// Show debug-level log output.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Configuration file (defaults to ./console.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Server WebSocket URL override (ws://host:port).
    #[arg(long, global = true)]
    pub url: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal console (the default).
    Ui,
    /// Send one command and exit without waiting for a response.
    Send {
        #[command(subcommand)]
        action: SendAction,
    },
    /// Print the next pushed snapshot as JSON and exit.
    Snapshot {
        /// Give up after this many seconds without a snapshot.
        #[arg(long, default_value = "5")]
        timeout: u64,
    },
    /// Generate shell completions.
    Completions {
        /// Shell flavor.
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum SendAction {
    /// Request a fresh snapshot push.
    Lister,
    /// Create a machine.
    AddMachine {
        /// Machine id (operator-chosen, must be new).
        #[arg(long)]
        id: String,
        /// Machine display name.
        #[arg(long)]
        name: String,
        /// Machine status (wire string, e.g. "En panne").
        #[arg(long)]
        status: String,
        /// Production chain id the machine belongs to.
        #[arg(long)]
        chain: String,
    },
    /// Update a machine.
    ModifyMachine {
        /// Machine id to update.
        #[arg(long)]
        id: String,
        /// Machine display name.
        #[arg(long)]
        name: String,
        /// Machine status (wire string).
        #[arg(long)]
        status: String,
        /// Production chain id the machine belongs to.
        #[arg(long)]
        chain: String,
    },
    /// Delete a machine by id.
    DeleteMachine {
        /// Machine id to delete.
        #[arg(long)]
        id: String,
    },
    /// Create a maintenance record.
    AddMaintenance {
        /// Record id (operator-chosen, must be new).
        #[arg(long)]
        id: String,
        /// Machine the record is about.
        #[arg(long)]
        machine: String,
        /// Maintenance type (free text).
        #[arg(long = "type")]
        kind: String,
        /// What is being done.
        #[arg(long)]
        description: String,
        /// Scheduled date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
        /// Record status (free text).
        #[arg(long)]
        status: String,
        /// Assigned technician name.
        #[arg(long)]
        technician: String,
    },
    /// Update a maintenance record.
    ModifyMaintenance {
        /// Record id to update.
        #[arg(long)]
        id: String,
        /// Machine the record is about.
        #[arg(long)]
        machine: String,
        /// Maintenance type (free text).
        #[arg(long = "type")]
        kind: String,
        /// What is being done.
        #[arg(long)]
        description: String,
        /// Scheduled date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
        /// Record status (free text).
        #[arg(long)]
        status: String,
        /// Assigned technician name.
        #[arg(long)]
        technician: String,
    },
    /// Delete a maintenance record by id.
    DeleteMaintenance {
        /// Record id to delete.
        #[arg(long)]
        id: String,
    },
}
