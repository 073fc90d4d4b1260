use log::info;
use rusqlite::Connection;

use crate::db::error::Result;
use crate::db::schema::SCHEMA_V1;

pub const LATEST_SCHEMA_VERSION: i32 = 1;

pub fn schema_version(conn: &Connection) -> Result<i32> {
    let ver: i32 = conn.query_row("PRAGMA user_version;", [], |r| r.get(0))?;
    Ok(ver)
}

pub fn setup_migrations(conn: &Connection) -> Result<()> {
    let ver = schema_version(conn)?;

    if ver < 1 {
        info!("applying schema v1 (found user_version={ver})");
        conn.execute_batch(SCHEMA_V1)?;
    }

    // A future SCHEMA_V2 goes behind `ver < 2` here.

    Ok(())
}
