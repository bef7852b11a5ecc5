use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};
use thousands::Separable;

use super::music_manager::MusicError;
use super::playlist_store::{PlaylistSummary, SavedPlaylist};
use super::queue_manager::{AddedRange, GuildQueue, QueueStatus};
use crate::commands::music::audio_sources::spotify::{ConvertedPlaylist, SpotifyTrack};
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

const SUCCESS: u32 = 0x00ff00;
const ERROR: u32 = 0xff0000;
const WARNING: u32 = 0xffa500;
const INFO: u32 = 0x45b7d1;
const SPOTIFY: u32 = 0x1db954;

/// Songs per page of `/controls queue`
pub const QUEUE_PAGE_SIZE: usize = 10;
/// How many songs a bulk add lists by name
const PREVIEW_LEN: usize = 5;
/// Failed Spotify tracks are listed by name up to this many
const FAILED_LIST_LEN: usize = 5;

fn error_embed(title: &str, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ERROR)
}

/// A red error reply
pub fn error(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(error_embed(title, description))
}

fn link(song: &TrackMetadata) -> String {
    format!("[{}]({})", song.title, song.url)
}

/// 1-based inclusive range label, e.g. `3 - 7`
fn range_label(range: &AddedRange) -> String {
    format!("{} - {}", range.start_index + 1, range.end_index + 1)
}

/// Create an embed for the song that is playing now
pub fn now_playing(song: &TrackMetadata) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("**{}**", link(song)))
        .field("⏱️ Duration", song.duration_label(), true)
        .field("📺 Channel", song.channel_label(), true)
        .field("👤 Requested by", song.requester_label(), true)
        .color(SUCCESS)
        .timestamp(Timestamp::now());

    if let Some(thumbnail) = &song.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(song: &TrackMetadata, position: usize) -> CreateEmbed {
    now_playing(song)
        .title("🎵 Added to Queue")
        .field("📍 Position in Queue", position.to_string(), true)
}

/// Numbered `title (duration)` lines for the first few songs, with a remainder note
fn preview_list(songs: &[TrackMetadata]) -> String {
    let mut list = songs
        .iter()
        .take(PREVIEW_LEN)
        .enumerate()
        .map(|(i, song)| format!("{}. {} ({})", i + 1, song.title, song.duration_label()))
        .collect::<Vec<_>>()
        .join("\n");

    if songs.len() > PREVIEW_LEN {
        list.push_str(&format!("\n... and {} more", songs.len() - PREVIEW_LEN));
    }
    list
}

pub fn artist_songs_added(
    artist: &str,
    songs: &[TrackMetadata],
    range: &AddedRange,
    requested_by: &str,
) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Added Artist Songs")
        .description(format!(
            "Added **{}** songs by **{}** to the queue!",
            range.count, artist
        ))
        .field("📍 Queue Position", range_label(range), true)
        .field("👤 Requested by", requested_by, true)
        .field("🎵 Songs Added", preview_list(songs), false)
        .color(SUCCESS)
        .timestamp(Timestamp::now())
}

pub fn spotify_processing() -> CreateEmbed {
    CreateEmbed::new()
        .title("🔄 Processing Spotify Playlist")
        .description("Fetching playlist and converting to YouTube... This may take a moment.")
        .color(SPOTIFY)
}

fn failed_tracks_label(failed: &[SpotifyTrack]) -> Option<String> {
    match failed.len() {
        0 => None,
        n if n <= FAILED_LIST_LEN => Some(
            failed
                .iter()
                .map(|track| format!("• {} - {}", track.artists.join(", "), track.title))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        n => Some(format!("{} tracks could not be found on YouTube", n)),
    }
}

/// Converted share as a percentage with one decimal, e.g. `"87.5%"`
fn success_percentage(converted: usize, original: usize) -> String {
    if original == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", converted as f64 / original as f64 * 100.0)
}

pub fn spotify_playlist_added(
    playlist: &ConvertedPlaylist,
    range: &AddedRange,
    requested_by: &str,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Spotify Playlist Added")
        .description(format!("**{}**", playlist.name))
        .field(
            "📊 Conversion Stats",
            format!("{} tracks converted", playlist.success_rate),
            true,
        )
        .field("📍 Queue Position", range_label(range), true)
        .field("👤 Requested by", requested_by, true)
        .field(
            "✅ Success Rate",
            success_percentage(playlist.converted_count, playlist.original_count),
            true,
        )
        .color(SPOTIFY)
        .timestamp(Timestamp::now());

    if let Some(failed) = failed_tracks_label(&playlist.failed_tracks) {
        embed = embed.field("⚠️ Tracks Not Found", failed, false);
    }

    embed
}

pub fn queue_finished() -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Queue Finished")
        .description("No more songs in the queue!")
        .color(ERROR)
        .timestamp(Timestamp::now())
}

pub fn audio_encoding_error() -> CreateEmbed {
    error_embed(
        "❌ Audio Encoding Error",
        "The bot cannot encode audio. This is a server configuration issue.",
    )
    .field("Error", "Audio codec unavailable", false)
    .field("Solution", "Bot admin needs to install audio dependencies", false)
    .timestamp(Timestamp::now())
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel() -> CreateReply {
    error("❌ Error", "You need to be in a voice channel to play music!").ephemeral(true)
}

/// Create an embed for when the bot fails to join a voice channel
pub fn failed_to_join_voice_channel(err: MusicError) -> CreateReply {
    error("❌ Error", format!("Failed to join voice channel: {}", err))
}

pub fn nothing_playing() -> CreateReply {
    error("❌ Nothing Playing", "No music is currently playing!")
}

pub fn queue_is_empty() -> CreateReply {
    error("❌ Empty Queue", "The queue is empty!")
}

pub fn paused() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏸️ Paused")
            .description("Music playback has been paused.")
            .color(WARNING)
            .timestamp(Timestamp::now()),
    )
}

pub fn resumed(song: Option<&TrackMetadata>) -> CreateReply {
    let description = match song {
        Some(song) => format!("Resumed: **{}**", song.title),
        None => "Music playback has been resumed.".to_string(),
    };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("▶️ Resumed")
            .description(description)
            .color(SUCCESS)
            .timestamp(Timestamp::now()),
    )
}

/// Create an embed for when a track is skipped
pub fn skipped(song: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏭️ Skipped")
            .description(format!("Skipped: **{}**", song.title))
            .color(SUCCESS),
    )
}

/// Create an embed for when the bot stops playing music
pub fn stopped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description("Music playback stopped and queue cleared.")
            .color(SUCCESS),
    )
}

pub fn shuffle_status(enabled: bool) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(if enabled {
                "🔀 Shuffle Enabled"
            } else {
                "🔀 Shuffle Disabled"
            })
            .description(if enabled {
                "Songs will now play in random order."
            } else {
                "Songs will now play in order."
            })
            .color(SUCCESS),
    )
}

pub fn loop_status(enabled: bool) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(if enabled {
                "🔁 Loop Enabled"
            } else {
                "🔁 Loop Disabled"
            })
            .description(if enabled {
                "The queue will now repeat when it reaches the end."
            } else {
                "The queue will stop when it reaches the end."
            })
            .color(SUCCESS),
    )
}

/// Playing, paused or stopped, from the queue's playback flags
fn status_label(status: &QueueStatus) -> &'static str {
    if status.is_playing {
        "▶️ Playing"
    } else if status.is_paused {
        "⏸️ Paused"
    } else {
        "⏹️ Stopped"
    }
}

fn modes_label(loop_enabled: bool, shuffle_enabled: bool) -> Option<String> {
    let modes: Vec<&str> = [(loop_enabled, "🔁 Loop"), (shuffle_enabled, "🔀 Shuffle")]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();

    (!modes.is_empty()).then(|| modes.join(" | "))
}

pub fn now_playing_status(song: &TrackMetadata, status: &QueueStatus) -> CreateReply {
    let mut embed = now_playing(song)
        .field("🎵 Status", status_label(status), true)
        .field(
            "📋 Queue Position",
            format!("{}/{}", status.current_index + 1, status.songs_count),
            true,
        );

    if let Some(modes) = modes_label(status.loop_enabled, status.shuffle_enabled) {
        embed = embed.field("⚙️ Modes", modes, true);
    }

    if !status.up_next.is_empty() {
        let up_next = status
            .up_next
            .iter()
            .map(|song| format!("• {}", song.title))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("🔜 Up Next", up_next, false);
    }

    CreateReply::default().embed(embed)
}

/// One page of the queue listing, or `None` when the queue is empty
pub struct QueuePage {
    /// 0-based page, clamped to the available pages
    pub page: usize,
    pub total_pages: usize,
    pub lines: Vec<String>,
}

/// Lay out page `page` (1-based) of `queue`; the song after the current one is marked as next.
pub fn queue_page(queue: &GuildQueue, page: usize) -> Option<QueuePage> {
    if queue.songs.is_empty() {
        return None;
    }

    let total_pages = queue.songs.len().div_ceil(QUEUE_PAGE_SIZE);
    let page = page.saturating_sub(1).min(total_pages - 1);
    let start = page * QUEUE_PAGE_SIZE;

    let lines = queue
        .songs
        .iter()
        .enumerate()
        .skip(start)
        .take(QUEUE_PAGE_SIZE)
        .map(|(index, song)| {
            let prefix = if index == queue.current_index + 1 {
                "🔜".to_string()
            } else {
                format!("{}.", index + 1)
            };
            format!(
                "{} **{}**\n   Duration: {} | By: {}",
                prefix,
                link(song),
                song.duration_label(),
                song.requester_label()
            )
        })
        .collect();

    Some(QueuePage {
        page,
        total_pages,
        lines,
    })
}

pub fn queue_listing(queue: &GuildQueue, page: usize) -> CreateReply {
    let mut embed = CreateEmbed::new()
        .title("📋 Music Queue")
        .color(INFO)
        .timestamp(Timestamp::now());

    let Some(listing) = queue_page(queue, page) else {
        return CreateReply::default()
            .embed(embed.description("Queue is empty! Use `/play` to add songs."));
    };

    if let Some(song) = queue.current_song() {
        embed = embed.field(
            "▶️ Currently Playing",
            format!(
                "**{}**\nDuration: {} | Requested by: {}",
                link(song),
                song.duration_label(),
                song.requester_label()
            ),
            false,
        );
    }

    let mut footer = format!(
        "Page {}/{} | {} songs total",
        listing.page + 1,
        listing.total_pages,
        queue.songs.len()
    );
    if queue.loop_enabled {
        footer.push_str(" | 🔁 Loop ON");
    }
    if queue.shuffle_enabled {
        footer.push_str(" | 🔀 Shuffle ON");
    }

    embed = embed
        .field("📝 Up Next", truncate_field(listing.lines.join("\n\n")), false)
        .footer(CreateEmbedFooter::new(footer));

    CreateReply::default().embed(embed)
}

/// Discord rejects field values longer than 1024 characters
fn truncate_field(value: String) -> String {
    const LIMIT: usize = 1024;
    if value.chars().count() <= LIMIT {
        return value;
    }
    let mut truncated: String = value.chars().take(LIMIT - 1).collect();
    truncated.push('…');
    truncated
}

pub fn playlist_saved(name: &str, song_count: usize, saved_by: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("💾 Playlist Saved")
            .description(format!("Playlist **\"{}\"** has been saved successfully!", name))
            .field("🎵 Songs Count", song_count.to_string(), true)
            .field("👤 Saved by", saved_by, true)
            .color(SUCCESS)
            .timestamp(Timestamp::now()),
    )
}

pub fn playlist_loaded(playlist: &SavedPlaylist, range: &AddedRange, loaded_by: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("📋 Playlist Loaded")
            .description(format!("Loaded playlist **\"{}\"**", playlist.name))
            .field("🎵 Songs Count", playlist.songs.len().to_string(), true)
            .field("📍 Queue Position", range_label(range), true)
            .field("👤 Loaded by", loaded_by, true)
            .field(
                "📅 Created",
                playlist.created_at.format("%Y-%m-%d").to_string(),
                true,
            )
            .color(SUCCESS)
            .timestamp(Timestamp::now()),
    )
}

pub fn playlist_list(playlists: &[PlaylistSummary]) -> CreateReply {
    if playlists.is_empty() {
        return CreateReply::default().embed(
            CreateEmbed::new()
                .title("📋 No Playlists")
                .description(
                    "No saved playlists found for this server.\nUse `/playlist save <name>` to save your first playlist!",
                )
                .color(INFO),
        );
    }

    let list = playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            format!(
                "{}. **{}**\n   🎵 {} songs | 📅 {}",
                i + 1,
                playlist.name,
                playlist.song_count,
                playlist.created_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("📋 Saved Playlists")
            .description(list)
            .footer(CreateEmbedFooter::new(format!(
                "Total: {} playlists",
                playlists.len()
            )))
            .color(INFO)
            .timestamp(Timestamp::now()),
    )
}

pub fn queue_cleared(song_count: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🗑️ Queue Cleared")
            .description(format!("Removed {} songs from the queue.", song_count))
            .color(SUCCESS),
    )
}

/// Create an embed for when a queue position is invalid
pub fn invalid_queue_position(position: usize, queue_length: usize) -> CreateReply {
    error(
        "❌ Invalid Position",
        format!(
            "Position {} is out of range. Queue has {} songs.",
            position, queue_length
        ),
    )
}

pub fn cannot_remove_current() -> CreateReply {
    error(
        "❌ Cannot Remove",
        "Cannot remove the currently playing song. Use `/controls skip` instead.",
    )
}

/// Create an embed for when a track is removed from the queue
pub fn track_removed(song: &TrackMetadata, position: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🗑️ Song Removed")
            .description(format!("Removed **{}** from position {}", song.title, position))
            .field("👤 Originally requested by", song.requester_label(), true)
            .field("⏱️ Duration", song.duration_label(), true)
            .color(SUCCESS),
    )
}

/// Results of `/test`: metadata plus the playability and stream checks
pub fn youtube_test_results(song: &TrackMetadata, playable: &str, stream: &str) -> CreateReply {
    let views = song
        .views
        .map(|views| views.separate_with_commas())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut embed = CreateEmbed::new()
        .title("🧪 YouTube Test Results")
        .description(format!("**{}**", song.title))
        .field("👤 Channel", song.channel_label(), true)
        .field("⏱️ Duration", song.duration_label(), true)
        .field("👁️ Views", views, true)
        .field("🎵 Playability Test", playable, true)
        .field("🔊 Stream Test", stream, true)
        .field("🔗 URL", &song.url, false)
        .color(SUCCESS)
        .timestamp(Timestamp::now());

    if let Some(thumbnail) = &song.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    CreateReply::default().embed(embed)
}
