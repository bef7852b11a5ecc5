use super::*;
use crate::commands::music::{
    audio_sources::{
        YoutubeSearch,
        spotify::{SPOTIFY_API, SpotifyApi},
        track_metadata::TrackMetadata,
        youtube::YoutubeApi,
    },
    utils::{
        embedded_messages,
        music_manager::{MusicManager, StartOutcome},
        queue_manager::QUEUE_MANAGER,
    },
};
use poise::serenity_prelude::CreateEmbed;
use tracing::{error, info};

/// Number of songs queued by an artist search
const ARTIST_SONG_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, poise::ChoiceParameter)]
pub enum SearchSource {
    #[default]
    #[name = "YouTube"]
    Youtube,
    #[name = "YouTube by Artist"]
    YoutubeArtist,
}

/// Play a song from YouTube, a Spotify playlist, or an artist's top songs
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song name, YouTube URL, or Spotify playlist URL"] query: String,
    #[description = "Where to search"] source: Option<SearchSource>,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = guild_id(&ctx)?;

    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)
        {
            Ok(channel_id) => channel_id,
            Err(_) => {
                ctx.send(embedded_messages::user_not_in_voice_channel())
                    .await?;
                return Ok(());
            }
        };

    // Searching and converting can take a while
    ctx.defer().await?;

    if let Err(err) =
        MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await
    {
        error!("Failed to join voice channel: {}", err);
        ctx.send(embedded_messages::failed_to_join_voice_channel(err))
            .await?;
        return Ok(());
    }

    let requested_by = requester_name(&ctx).await;
    let source = source.unwrap_or_default();

    // Spotify links report through their own progress message
    let reply = if SpotifyApi::is_spotify_url(&query) {
        if !queue_spotify(&ctx, guild_id, &query, &requested_by).await? {
            return Ok(());
        }
        None
    } else if YoutubeApi::is_youtube_url(&query) {
        let song = match YoutubeApi::video_info(&query).await {
            Ok(song) => song.requested_by(&requested_by),
            Err(err) => {
                error!("Failed to get video info for {}: {}", query, err);
                ctx.send(embedded_messages::error(
                    "❌ Error",
                    format!("Failed to get video info: {}", err),
                ))
                .await?;
                return Ok(());
            }
        };
        Some(queue_single(guild_id, song).await)
    } else if source == SearchSource::YoutubeArtist {
        let songs = match YoutubeApi.search_by_artist(&query, ARTIST_SONG_COUNT).await {
            Ok(songs) => songs
                .into_iter()
                .map(|song| song.requested_by(&requested_by))
                .collect::<Vec<_>>(),
            Err(err) => {
                info!("Artist search for '{}' failed: {}", query, err);
                ctx.send(no_results(&query)).await?;
                return Ok(());
            }
        };

        let range = QUEUE_MANAGER
            .lock()
            .await
            .add_songs(guild_id, songs.clone());
        Some(embedded_messages::artist_songs_added(
            &query,
            &songs,
            &range,
            &requested_by,
        ))
    } else {
        let song = match YoutubeApi.search(&query, 1).await {
            Ok(mut songs) if !songs.is_empty() => songs.swap_remove(0).requested_by(&requested_by),
            Ok(_) => {
                ctx.send(no_results(&query)).await?;
                return Ok(());
            }
            Err(err) => {
                info!("Search for '{}' failed: {}", query, err);
                ctx.send(no_results(&query)).await?;
                return Ok(());
            }
        };
        Some(queue_single(guild_id, song).await)
    };

    QUEUE_MANAGER
        .lock()
        .await
        .set_text_channel(guild_id, ctx.channel_id());

    if let Some(embed) = reply {
        ctx.send(CreateReply::default().embed(embed)).await?;
    }

    if MusicManager::start_if_idle(ctx.serenity_context(), guild_id).await == StartOutcome::Failed {
        error!("Failed to start playback in guild {}", guild_id);
    }

    Ok(())
}

fn no_results(query: &str) -> CreateReply {
    embedded_messages::error("❌ No Results", format!("No results found for: \"{}\"", query))
}

async fn queue_single(guild_id: GuildId, song: TrackMetadata) -> CreateEmbed {
    let position = QUEUE_MANAGER.lock().await.add_song(guild_id, song.clone());
    info!("Queued '{}' at position {}", song.title, position);
    embedded_messages::added_to_queue(&song, position)
}

/// Convert a Spotify link and queue every track that was found on YouTube.
/// Returns false once an error has been reported to the user.
async fn queue_spotify(
    ctx: &Context<'_>,
    guild_id: GuildId,
    url: &str,
    requested_by: &str,
) -> Result<bool, Error> {
    let progress = ctx
        .send(CreateReply::default().embed(embedded_messages::spotify_processing()))
        .await?;

    let playlist = match SPOTIFY_API
        .get_playlist_from_url(&YoutubeApi, url, requested_by)
        .await
    {
        Ok(playlist) => playlist,
        Err(err) => {
            error!("Spotify conversion failed for {}: {}", url, err);
            progress
                .edit(
                    *ctx,
                    embedded_messages::error("❌ Spotify Error", err.to_string()),
                )
                .await?;
            return Ok(false);
        }
    };

    if playlist.tracks.is_empty() {
        progress
            .edit(
                *ctx,
                embedded_messages::error(
                    "❌ No Tracks",
                    "Could not find any tracks from the Spotify playlist on YouTube.",
                ),
            )
            .await?;
        return Ok(false);
    }

    let range = QUEUE_MANAGER
        .lock()
        .await
        .add_songs(guild_id, playlist.tracks.clone());

    progress
        .edit(
            *ctx,
            CreateReply::default().embed(embedded_messages::spotify_playlist_added(
                &playlist,
                &range,
                requested_by,
            )),
        )
        .await?;

    Ok(true)
}
