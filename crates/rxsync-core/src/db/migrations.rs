//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    // Check if schema_version table exists
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Migration to version 1: prescription collection
async fn migrate_v1(conn: &Connection) -> Result<()> {
    // libsql doesn't have execute_batch, so we run each statement separately
    // Using a transaction for atomicity

    conn.execute("BEGIN TRANSACTION", ()).await?;

    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // Prescription records; action = 'delete' marks a tombstone
        "CREATE TABLE IF NOT EXISTS prescriptions (
            id TEXT PRIMARY KEY,
            rev TEXT NOT NULL,
            patient_id INTEGER NOT NULL,
            doctor_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            content TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0,
            action TEXT NOT NULL DEFAULT 'none',
            remote_id TEXT,
            created_at INTEGER NOT NULL,
            last_modified INTEGER NOT NULL,
            last_conflict_resolved INTEGER,
            conflicts TEXT NOT NULL DEFAULT '[]'
        )",
        "CREATE INDEX IF NOT EXISTS idx_prescriptions_lookup
            ON prescriptions(date, patient_id, doctor_id)",
        "CREATE INDEX IF NOT EXISTS idx_prescriptions_refs
            ON prescriptions(patient_id, doctor_id)",
        "CREATE INDEX IF NOT EXISTS idx_prescriptions_pending
            ON prescriptions(synced) WHERE synced = 0",
        // Record migration version
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: conflict resolution audit log
async fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let statements = [
        "CREATE TABLE IF NOT EXISTS conflict_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_id TEXT NOT NULL,
            losing_rev TEXT NOT NULL,
            winning_rev TEXT NOT NULL,
            resolved_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_conflict_log_record_id
            ON conflict_log(record_id)",
        "CREATE INDEX IF NOT EXISTS idx_conflict_log_resolved_at
            ON conflict_log(resolved_at DESC)",
        "INSERT INTO schema_version (version) VALUES (2)",
    ];

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    async fn setup() -> Connection {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        db.connect().unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_migrations() {
        let conn = setup().await;
        run(&conn).await.unwrap();

        let version = get_version(&conn).await.unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_migrations_idempotent() {
        let conn = setup().await;
        run(&conn).await.unwrap();
        run(&conn).await.unwrap(); // Should not fail

        let version = get_version(&conn).await.unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_migration_creates_tables() {
        let conn = setup().await;
        run(&conn).await.unwrap();

        for table in ["prescriptions", "conflict_log"] {
            let mut rows = conn
                .query(
                    "SELECT EXISTS(
                        SELECT 1 FROM sqlite_master
                        WHERE type = 'table' AND name = ?
                    )",
                    libsql::params![table],
                )
                .await
                .unwrap();

            let exists = rows
                .next()
                .await
                .unwrap()
                .is_some_and(|row| row.get::<i32>(0).unwrap() != 0);

            assert!(exists, "missing table {table}");
        }
    }
}
