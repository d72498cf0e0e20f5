use std::{fs, path::Path};

use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    error::Result,
    storage::{NOTES_KEY, Persistence},
};

pub struct SqliteStorage {
    connection: Connection,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<SqliteStorage> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        log::debug!("opened database at {}", db_path.display());

        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<SqliteStorage> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<SqliteStorage> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )?;

        Ok(SqliteStorage { connection: conn })
    }
}

impl Persistence for SqliteStorage {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        let value = self
            .connection
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![NOTES_KEY],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.connection.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![NOTES_KEY, bytes],
        )?;

        Ok(())
    }
}
