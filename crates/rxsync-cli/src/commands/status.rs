use crate::commands::common::{unwrap_envelope, AppContext, AppOptions};
use crate::error::CliError;

pub async fn run_status(as_json: bool, options: &AppOptions) -> Result<(), CliError> {
    let context = AppContext::open(options).await?;
    let status = unwrap_envelope(context.service().status().await)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!(
            "Records: {} total, {} pending, {} awaiting remote delete",
            status.store.total, status.store.pending, status.store.tombstones
        );
        println!(
            "Token: {}",
            if status.authenticated {
                "stored"
            } else {
                "not stored"
            }
        );
    }

    Ok(())
}
