use rxsync_core::sync::SkipReason;

use crate::commands::common::{format_cycle_report, unwrap_envelope, AppContext, AppOptions};
use crate::error::CliError;

pub async fn run_sync(watch: bool, as_json: bool, options: &AppOptions) -> Result<(), CliError> {
    if !options.api_configured() {
        return Err(CliError::ApiNotConfigured);
    }

    let context = AppContext::open(options).await?;
    if watch {
        return run_watch(&context).await;
    }

    let report = unwrap_envelope(context.service().sync_now().await)?;
    if report.skipped == Some(SkipReason::NotAuthenticated) {
        return Err(CliError::NotAuthenticated);
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_cycle_report(&report) {
            println!("{line}");
        }
    }

    Ok(())
}

async fn run_watch(context: &AppContext) -> Result<(), CliError> {
    let worker = context.service().engine().spawn();
    println!("Syncing on an interval; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    worker.abort();
    println!("Stopped");
    Ok(())
}
