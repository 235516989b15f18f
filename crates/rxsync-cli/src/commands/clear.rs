use crate::commands::common::{ensure_success, AppContext, AppOptions};
use crate::error::CliError;

pub async fn run_clear(yes: bool, options: &AppOptions) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::ConfirmationRequired);
    }

    let context = AppContext::open(options).await?;
    ensure_success(&context.service().clear().await)?;
    println!("Local store cleared");
    Ok(())
}
