use rxsync_core::models::PrescriptionDraft;

use crate::commands::common::{unwrap_envelope, AppContext, AppOptions};
use crate::error::CliError;

pub async fn run_create(
    patient: i64,
    doctor: i64,
    date: String,
    content: String,
    options: &AppOptions,
) -> Result<(), CliError> {
    let context = AppContext::open(options).await?;
    let draft = PrescriptionDraft {
        patient_id: patient,
        doctor_id: doctor,
        date,
        content,
    };

    let record = unwrap_envelope(context.service().create(draft).await)?;
    println!("{}", record.id);
    Ok(())
}
