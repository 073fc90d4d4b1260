// src/db/mod.rs
//
// Persistence layer: one SQLite connection owned by `Database`, schema applied
// through `migrations`, and the two stores borrowing that connection.

pub mod error;
pub mod format;
pub mod migrations;
pub mod monitoring;
pub mod profile;
pub mod schedule;
pub mod schema;

use std::path::Path;

use log::info;
use rusqlite::{Connection, OpenFlags};

use crate::config::Config;
use crate::db::error::Result;
use crate::db::migrations::setup_migrations;
use crate::db::profile::ProfileRepo;
use crate::db::schedule::ScheduleRepo;

/// The process-wide persistence handle. Open it once at startup, hand its
/// repos to whoever needs them, close it at shutdown (dropping also closes).
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        info!("opened database at {}", path.as_ref().display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.db_path)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Per-connection setting; SQLite starts with it off.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        setup_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn profiles(&self) -> ProfileRepo<'_> {
        ProfileRepo::new(&self.conn)
    }

    pub fn schedule(&self) -> ScheduleRepo<'_> {
        ScheduleRepo::new(&self.conn)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::{schema_version, LATEST_SCHEMA_VERSION};

    #[test]
    fn test_open_in_memory_applies_schema_and_foreign_keys() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(schema_version(db.connection()).unwrap(), LATEST_SCHEMA_VERSION);

        let fk: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys;", [], |r| r.get(0))
            .unwrap();
        assert_eq!(fk, 1);

        db.close().unwrap();
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let path = std::env::temp_dir().join(format!("pim_sqlite_reopen_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::open(&path).unwrap();
            db.profiles()
                .save_profile(1, &profile::ProfileFields::new("Li Wei"))
                .unwrap();
            db.close().unwrap();
        }

        let db = Database::open(&path).unwrap();
        let p = db.profiles().get_profile(1).unwrap().unwrap();
        assert_eq!(p.name, "Li Wei");
        db.close().unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
