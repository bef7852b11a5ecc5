//! Saved playlists: a guild's queue snapshot stored under a name.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serenity::model::id::GuildId;
use tracing::{info, warn};

use crate::commands::music::audio_sources::track_metadata::TrackMetadata;
use crate::utils::database::{self, PlaylistRow};

use super::music_manager::{MusicError, MusicResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPlaylist {
    pub name: String,
    pub songs: Vec<TrackMetadata>,
    pub created_at: DateTime<Utc>,
}

/// What `/playlist list` shows for each playlist
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSummary {
    pub name: String,
    pub song_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Storage key for a playlist name: every character that is not ASCII alphanumeric becomes `_`.
pub fn name_key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn storage_error(e: impl std::fmt::Display) -> MusicError {
    MusicError::StorageError(e.to_string())
}

fn parse_row(row: PlaylistRow) -> MusicResult<SavedPlaylist> {
    let songs: Vec<TrackMetadata> = serde_json::from_str(&row.songs).map_err(storage_error)?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(storage_error)?
        .with_timezone(&Utc);

    Ok(SavedPlaylist {
        name: row.name,
        songs,
        created_at,
    })
}

pub fn save_with(conn: &Connection, guild_id: GuildId, playlist: &SavedPlaylist) -> MusicResult<()> {
    let row = PlaylistRow {
        name: playlist.name.clone(),
        songs: serde_json::to_string(&playlist.songs).map_err(storage_error)?,
        created_at: playlist.created_at.to_rfc3339(),
    };

    database::upsert_playlist(conn, guild_id.get(), &name_key(&playlist.name), &row)
        .map_err(storage_error)
}

pub fn load_with(
    conn: &Connection,
    guild_id: GuildId,
    name: &str,
) -> MusicResult<Option<SavedPlaylist>> {
    database::get_playlist(conn, guild_id.get(), &name_key(name))
        .map_err(storage_error)?
        .map(parse_row)
        .transpose()
}

/// Summaries of every readable playlist. Corrupt rows are logged and skipped.
pub fn list_with(conn: &Connection, guild_id: GuildId) -> MusicResult<Vec<PlaylistSummary>> {
    let rows = database::list_playlists(conn, guild_id.get()).map_err(storage_error)?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let name = row.name.clone();
            match parse_row(row) {
                Ok(playlist) => Some(PlaylistSummary {
                    name: playlist.name,
                    song_count: playlist.songs.len(),
                    created_at: playlist.created_at,
                }),
                Err(e) => {
                    warn!("Skipping unreadable playlist '{}': {}", name, e);
                    None
                }
            }
        })
        .collect())
}

/// Run a database operation on the blocking pool against the configured database.
async fn with_connection<T, F>(op: F) -> MusicResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> MusicResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = database::open().map_err(storage_error)?;
        database::create_tables(&conn).map_err(storage_error)?;
        op(&conn)
    })
    .await
    .map_err(storage_error)?
}

/// Save `songs` as `name` for the guild, replacing a playlist with the same storage key.
pub async fn save_playlist(
    guild_id: GuildId,
    name: String,
    songs: Vec<TrackMetadata>,
) -> MusicResult<SavedPlaylist> {
    let playlist = SavedPlaylist {
        name,
        songs,
        created_at: Utc::now(),
    };

    let saved = playlist.clone();
    with_connection(move |conn| save_with(conn, guild_id, &saved)).await?;

    info!(
        "Saved playlist '{}' with {} songs for guild {}",
        playlist.name,
        playlist.songs.len(),
        guild_id
    );
    Ok(playlist)
}

pub async fn load_playlist(guild_id: GuildId, name: String) -> MusicResult<Option<SavedPlaylist>> {
    with_connection(move |conn| load_with(conn, guild_id, &name)).await
}

pub async fn list_playlists(guild_id: GuildId) -> MusicResult<Vec<PlaylistSummary>> {
    with_connection(move |conn| list_with(conn, guild_id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const GUILD: GuildId = GuildId::new(10);

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        database::create_tables(&conn).expect("Failed to create tables");
        conn
    }

    fn playlist(name: &str, songs: usize) -> SavedPlaylist {
        SavedPlaylist {
            name: name.to_string(),
            songs: (0..songs)
                .map(|i| TrackMetadata {
                    title: format!("Song {}", i),
                    url: format!("https://youtu.be/video{:06}", i),
                    ..Default::default()
                })
                .collect(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test_case("Chill Mix", "Chill_Mix"; "space")]
    #[test_case("rock/roll!", "rock_roll_"; "punctuation")]
    #[test_case("café", "caf_"; "non ascii")]
    #[test_case("abc123", "abc123"; "unchanged")]
    fn test_name_key(name: &str, expected: &str) {
        assert_eq!(name_key(name), expected);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let conn = setup_db();
        let saved = playlist("Road Trip", 3);

        save_with(&conn, GUILD, &saved).unwrap();

        assert_eq!(load_with(&conn, GUILD, "Road Trip").unwrap(), Some(saved));
    }

    #[test]
    fn test_names_colliding_on_key_overwrite() {
        let conn = setup_db();
        save_with(&conn, GUILD, &playlist("road trip", 1)).unwrap();
        save_with(&conn, GUILD, &playlist("road-trip", 2)).unwrap();

        let loaded = load_with(&conn, GUILD, "road_trip").unwrap().unwrap();
        assert_eq!(loaded.name, "road-trip");
        assert_eq!(loaded.songs.len(), 2);
    }

    #[test]
    fn test_load_missing_playlist() {
        let conn = setup_db();
        assert_eq!(load_with(&conn, GUILD, "nope").unwrap(), None);
    }

    #[test]
    fn test_list_skips_corrupt_rows() {
        let conn = setup_db();
        save_with(&conn, GUILD, &playlist("good", 4)).unwrap();
        database::upsert_playlist(
            &conn,
            GUILD.get(),
            "bad",
            &PlaylistRow {
                name: "bad".into(),
                songs: "{not json".into(),
                created_at: "2024-01-01T00:00:00+00:00".into(),
            },
        )
        .unwrap();

        let summaries = list_with(&conn, GUILD).unwrap();

        assert_eq!(
            summaries,
            vec![PlaylistSummary {
                name: "good".into(),
                song_count: 4,
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            }]
        );
    }

    #[test]
    fn test_load_corrupt_row_is_storage_error() {
        let conn = setup_db();
        database::upsert_playlist(
            &conn,
            GUILD.get(),
            "bad",
            &PlaylistRow {
                name: "bad".into(),
                songs: "[]".into(),
                created_at: "yesterday".into(),
            },
        )
        .unwrap();

        assert_matches!(
            load_with(&conn, GUILD, "bad"),
            Err(MusicError::StorageError(_))
        );
    }
}
