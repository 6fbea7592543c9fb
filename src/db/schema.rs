use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Creates the catalog tables and indexes if they are missing.
///
/// Every statement is `IF NOT EXISTS`, so this is safe to run on each open.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", SCHEMA))?;
    tracing::debug!("Catalog schema ready");
    Ok(())
}
