//! Provides functions for interacting with the application's SQLite database.
//! Handles initialization, table creation, and storage of saved playlists.

use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use std::sync::Once;
use tracing::error;

use crate::config::DATABASE_PATH;

/// Ensures that database table creation logic runs only once.
static DB_INIT: Once = Once::new();

/// A saved playlist row as stored. `songs` is the JSON-encoded song list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRow {
    pub name: String,
    pub songs: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Initializes the database by ensuring the necessary tables are created.
/// Uses `std::sync::Once` to guarantee table creation happens only once per application run.
pub fn init_db() -> SqlResult<()> {
    DB_INIT.call_once(|| {
        if let Err(e) = open().and_then(|conn| create_tables(&conn)) {
            error!("Failed to create database tables: {}", e);
        }
    });
    Ok(())
}

/// Open a connection to the configured database file.
pub fn open() -> SqlResult<Connection> {
    Connection::open(DATABASE_PATH.as_str())
}

/// Creates the `saved_playlists` table if it doesn't exist.
pub fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS saved_playlists (
            guild_id INTEGER NOT NULL,
            name_key TEXT NOT NULL,
            name TEXT NOT NULL,
            songs TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (guild_id, name_key)
        )",
        [],
    )?;
    Ok(())
}

/// Inserts or replaces a guild's playlist stored under `name_key`.
pub fn upsert_playlist(
    conn: &Connection,
    guild_id: u64,
    name_key: &str,
    row: &PlaylistRow,
) -> SqlResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO saved_playlists (guild_id, name_key, name, songs, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![guild_id as i64, name_key, row.name, row.songs, row.created_at],
    )?;
    Ok(())
}

pub fn get_playlist(
    conn: &Connection,
    guild_id: u64,
    name_key: &str,
) -> SqlResult<Option<PlaylistRow>> {
    conn.query_row(
        "SELECT name, songs, created_at FROM saved_playlists WHERE guild_id = ?1 AND name_key = ?2",
        params![guild_id as i64, name_key],
        |row| {
            Ok(PlaylistRow {
                name: row.get(0)?,
                songs: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )
    .optional()
}

/// All of a guild's playlists, oldest first.
pub fn list_playlists(conn: &Connection, guild_id: u64) -> SqlResult<Vec<PlaylistRow>> {
    let mut statement = conn.prepare(
        "SELECT name, songs, created_at FROM saved_playlists
         WHERE guild_id = ?1 ORDER BY created_at, name",
    )?;

    let rows = statement.query_map(params![guild_id as i64], |row| {
        Ok(PlaylistRow {
            name: row.get(0)?,
            songs: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;

    rows.collect()
}
