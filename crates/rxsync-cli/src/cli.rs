use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rxsync")]
#[command(about = "Offline-first prescription records, synced to a remote service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Base URL of the remote prescription API
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Optional path to the bearer token file
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or migrate the local database
    Init,
    /// Create a new prescription
    Create {
        /// Patient reference
        #[arg(long, value_name = "ID")]
        patient: i64,
        /// Doctor reference
        #[arg(long, value_name = "ID")]
        doctor: i64,
        /// Prescription date, YYYY-MM-DD
        #[arg(long, value_name = "DATE")]
        date: String,
        /// Free-text prescription body
        #[arg(long, value_name = "TEXT")]
        content: String,
    },
    /// List prescriptions
    List {
        /// Filter by patient reference
        #[arg(long, value_name = "ID")]
        patient: Option<i64>,
        /// Filter by doctor reference
        #[arg(long, value_name = "ID")]
        doctor: Option<i64>,
        /// Pull the remote listing first and include newly discovered records
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a prescription's content
    Update {
        /// Prescription ID
        id: String,
        /// New prescription body
        #[arg(long, value_name = "TEXT")]
        content: String,
    },
    /// Delete a prescription
    Delete {
        /// Prescription ID
        id: String,
    },
    /// Push pending local changes to the remote service
    Sync {
        /// Keep running and sync on an interval
        #[arg(long)]
        watch: bool,
        /// Output the cycle report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show record counts and token presence
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the stored bearer token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
    /// Destroy and reinitialize the local store
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Store a bearer token
    Set {
        /// Token value
        value: String,
    },
    /// Remove the stored token
    Clear,
    /// Show whether a token is stored (never the value)
    Show,
}
