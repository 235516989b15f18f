//! rxsync CLI - offline-first prescription records from the terminal
//!
//! Every mutation lands in the local store immediately; `rxsync sync` (or
//! `sync --watch`) pushes pending changes to the remote service.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::AppOptions;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("rxsync_core={level}").parse().unwrap())
                .add_directive(format!("rxsync_cli={level}").parse().unwrap()),
        )
        .init();
    let options = AppOptions::resolve(&cli);

    match cli.command {
        Commands::Init => commands::init::run_init(&options).await?,
        Commands::Create {
            patient,
            doctor,
            date,
            content,
        } => commands::create::run_create(patient, doctor, date, content, &options).await?,
        Commands::List {
            patient,
            doctor,
            refresh,
            json,
        } => commands::list::run_list(patient, doctor, refresh, json, &options).await?,
        Commands::Update { id, content } => {
            commands::update::run_update(&id, &content, &options).await?;
        }
        Commands::Delete { id } => commands::delete::run_delete(&id, &options).await?,
        Commands::Sync { watch, json } => commands::sync::run_sync(watch, json, &options).await?,
        Commands::Status { json } => commands::status::run_status(json, &options).await?,
        Commands::Token { command } => commands::token::run_token(command, &options)?,
        Commands::Clear { yes } => commands::clear::run_clear(yes, &options).await?,
    }

    Ok(())
}
