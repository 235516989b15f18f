use rxsync_core::db::Database;

use crate::commands::common::AppOptions;
use crate::error::CliError;

pub async fn run_init(options: &AppOptions) -> Result<(), CliError> {
    if let Some(parent) = options.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Opening runs the migrations
    let _db = Database::open(&options.db_path).await?;

    println!("{}", options.db_path.display());
    Ok(())
}
