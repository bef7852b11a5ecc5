use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{MUSIC_MANAGER, MusicManager, StartOutcome},
    playlist_store,
    queue_manager::QUEUE_MANAGER,
};
use tracing::{error, info};

/// Save, load and edit playlists
#[poise::command(
    slash_command,
    guild_only,
    category = "Music",
    subcommands("save", "load", "list", "clear", "remove"),
    subcommand_required
)]
pub async fn playlist(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Save the current queue as a playlist
#[poise::command(slash_command, guild_only)]
pub async fn save(
    ctx: Context<'_>,
    #[description = "Name for the playlist"] name: String,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let songs = QUEUE_MANAGER
        .lock()
        .await
        .peek(guild_id)
        .map(|queue| queue.songs.clone())
        .unwrap_or_default();

    if songs.is_empty() {
        ctx.send(embedded_messages::error(
            "❌ Empty Queue",
            "Cannot save an empty queue! Add some songs first.",
        ))
        .await?;
        return Ok(());
    }

    match playlist_store::save_playlist(guild_id, name, songs).await {
        Ok(saved) => {
            let saved_by = requester_name(&ctx).await;
            ctx.send(embedded_messages::playlist_saved(
                &saved.name,
                saved.songs.len(),
                &saved_by,
            ))
            .await?;
        }
        Err(err) => {
            error!("Failed to save playlist: {}", err);
            ctx.send(embedded_messages::error(
                "❌ Save Failed",
                format!("Failed to save playlist: {}", err),
            ))
            .await?;
        }
    }

    Ok(())
}

/// Load a saved playlist into the queue
#[poise::command(slash_command, guild_only)]
pub async fn load(
    ctx: Context<'_>,
    #[description = "Name of the playlist"] name: String,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let Ok(channel_id) =
        MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)
    else {
        ctx.send(embedded_messages::error(
            "❌ Error",
            "You need to be in a voice channel to load a playlist!",
        ))
        .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let playlist = match playlist_store::load_playlist(guild_id, name.clone()).await {
        Ok(Some(playlist)) => playlist,
        Ok(None) => {
            ctx.send(embedded_messages::error(
                "❌ Load Failed",
                format!("Failed to load playlist: Playlist \"{}\" not found", name),
            ))
            .await?;
            return Ok(());
        }
        Err(err) => {
            error!("Failed to load playlist '{}': {}", name, err);
            ctx.send(embedded_messages::error(
                "❌ Load Failed",
                format!("Failed to load playlist: {}", err),
            ))
            .await?;
            return Ok(());
        }
    };

    let loaded_by = requester_name(&ctx).await;
    let songs = playlist
        .songs
        .iter()
        .cloned()
        .map(|song| song.requested_by(&loaded_by))
        .collect();

    let range = {
        let mut queue_manager = QUEUE_MANAGER.lock().await;
        let range = queue_manager.add_songs(guild_id, songs);
        queue_manager.set_text_channel(guild_id, ctx.channel_id());
        range
    };
    info!(
        "Loaded playlist '{}' ({} songs) in guild {}",
        playlist.name, range.count, guild_id
    );

    if let Err(err) = MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await
    {
        error!("Failed to join voice channel: {}", err);
        ctx.send(embedded_messages::failed_to_join_voice_channel(err))
            .await?;
        return Ok(());
    }

    ctx.send(embedded_messages::playlist_loaded(
        &playlist, &range, &loaded_by,
    ))
    .await?;

    if MusicManager::start_if_idle(ctx.serenity_context(), guild_id).await == StartOutcome::Failed {
        error!("Failed to start playback in guild {}", guild_id);
    }

    Ok(())
}

/// List this server's saved playlists
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match playlist_store::list_playlists(guild_id).await {
        Ok(playlists) => {
            ctx.send(embedded_messages::playlist_list(&playlists)).await?;
        }
        Err(err) => {
            error!("Failed to list playlists: {}", err);
            ctx.send(embedded_messages::error(
                "❌ Error",
                format!("Failed to list playlists: {}", err),
            ))
            .await?;
        }
    }

    Ok(())
}

/// Stop playback and remove every song from the queue
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let song_count = QUEUE_MANAGER
        .lock()
        .await
        .peek(guild_id)
        .map_or(0, |queue| queue.songs.len());

    if song_count == 0 {
        ctx.send(embedded_messages::error(
            "❌ Empty Queue",
            "The queue is already empty!",
        ))
        .await?;
        return Ok(());
    }

    MusicManager::stop(guild_id).await;
    QUEUE_MANAGER.lock().await.clear(guild_id);

    info!("Cleared {} songs in guild {}", song_count, guild_id);
    ctx.send(embedded_messages::queue_cleared(song_count)).await?;
    Ok(())
}

/// Remove a song from the queue
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position of the song to remove (1-based)"]
    #[min = 1]
    position: u32,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let position = position as usize;
    let playing = MUSIC_MANAGER.lock().await.is_busy(guild_id);

    let mut queue_manager = QUEUE_MANAGER.lock().await;
    let (queue_length, current_index) = queue_manager
        .peek(guild_id)
        .map_or((0, 0), |queue| (queue.songs.len(), queue.current_index));

    if queue_length == 0 {
        drop(queue_manager);
        ctx.send(embedded_messages::queue_is_empty()).await?;
        return Ok(());
    }

    if position == 0 || position > queue_length {
        drop(queue_manager);
        ctx.send(embedded_messages::invalid_queue_position(
            position,
            queue_length,
        ))
        .await?;
        return Ok(());
    }

    let index = position - 1;
    if index == current_index && playing {
        drop(queue_manager);
        ctx.send(embedded_messages::cannot_remove_current()).await?;
        return Ok(());
    }

    let removed = queue_manager.remove_song(guild_id, index);
    drop(queue_manager);

    match removed {
        Some(song) => {
            info!("Removed '{}' from position {} in guild {}", song.title, position, guild_id);
            ctx.send(embedded_messages::track_removed(&song, position))
                .await?;
        }
        None => {
            ctx.send(embedded_messages::error(
                "❌ Remove Failed",
                "Failed to remove the song from the queue.",
            ))
            .await?;
        }
    }

    Ok(())
}
