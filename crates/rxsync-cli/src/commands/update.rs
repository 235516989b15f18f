use rxsync_core::models::RecordId;

use crate::commands::common::{
    normalize_record_identifier, unwrap_envelope, AppContext, AppOptions,
};
use crate::error::CliError;

pub async fn run_update(id: &str, content: &str, options: &AppOptions) -> Result<(), CliError> {
    let normalized_id = normalize_record_identifier(id)?;
    let context = AppContext::open(options).await?;

    let record_id = RecordId::from(normalized_id);
    let updated = unwrap_envelope(context.service().update(&record_id, content).await)?;
    println!("{}", updated.id);
    Ok(())
}
