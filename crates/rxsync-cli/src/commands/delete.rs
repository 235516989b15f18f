use rxsync_core::models::RecordId;

use crate::commands::common::{
    ensure_success, normalize_record_identifier, AppContext, AppOptions,
};
use crate::error::CliError;

pub async fn run_delete(id: &str, options: &AppOptions) -> Result<(), CliError> {
    let normalized_id = normalize_record_identifier(id)?;
    let context = AppContext::open(options).await?;

    let record_id = RecordId::from(normalized_id);
    ensure_success(&context.service().delete(&record_id).await)?;
    println!("{record_id}");
    Ok(())
}
