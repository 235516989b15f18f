use rxsync_core::models::SearchSelector;

use crate::commands::common::{
    format_record_lines, record_to_list_item, unwrap_envelope, AppContext, AppOptions,
    RecordListItem,
};
use crate::error::CliError;

pub async fn run_list(
    patient: Option<i64>,
    doctor: Option<i64>,
    refresh: bool,
    as_json: bool,
    options: &AppOptions,
) -> Result<(), CliError> {
    if refresh && !options.api_configured() {
        return Err(CliError::ApiNotConfigured);
    }

    let context = AppContext::open(options).await?;
    let selector = SearchSelector {
        patient_id: patient,
        doctor_id: doctor,
    };
    let records = unwrap_envelope(context.service().search(selector, refresh).await)?;

    if as_json {
        let items = records
            .iter()
            .map(record_to_list_item)
            .collect::<Vec<RecordListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_record_lines(&records) {
            println!("{line}");
        }
    }

    Ok(())
}
