use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::MusicManager,
    queue_manager::{PlaybackState, QUEUE_MANAGER},
};
use tracing::info;

/// Control music playback
#[poise::command(
    slash_command,
    guild_only,
    category = "Music",
    subcommands(
        "pause",
        "resume",
        "skip",
        "stop",
        "shuffle",
        "loop_",
        "nowplaying",
        "queue"
    ),
    subcommand_required
)]
pub async fn controls(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Pause the current song
#[poise::command(slash_command, guild_only)]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let status = MusicManager::status(ctx.serenity_context(), guild_id).await;

    if !status.has_track {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    }

    if status.player_state == PlaybackState::Paused || status.is_paused {
        ctx.send(embedded_messages::error(
            "❌ Already Paused",
            "Music is already paused!",
        ))
        .await?;
        return Ok(());
    }

    if !MusicManager::pause(guild_id).await {
        ctx.send(embedded_messages::error("❌ Error", "Failed to pause music."))
            .await?;
        return Ok(());
    }

    info!("Paused playback in guild {}", guild_id);
    ctx.send(embedded_messages::paused()).await?;
    Ok(())
}

/// Resume the paused song
#[poise::command(slash_command, guild_only)]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let status = MusicManager::status(ctx.serenity_context(), guild_id).await;

    if !status.has_track {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    }

    if status.player_state != PlaybackState::Paused && !status.is_paused {
        ctx.send(embedded_messages::error("❌ Not Paused", "Music is not paused!"))
            .await?;
        return Ok(());
    }

    if !MusicManager::resume(guild_id).await {
        ctx.send(embedded_messages::error("❌ Error", "Failed to resume music."))
            .await?;
        return Ok(());
    }

    info!("Resumed playback in guild {}", guild_id);
    ctx.send(embedded_messages::resumed(status.current_song.as_ref()))
        .await?;
    Ok(())
}

/// Skip to the next song
#[poise::command(slash_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let status = MusicManager::status(ctx.serenity_context(), guild_id).await;

    let has_track = status.has_track;
    let Some(song) = status.current_song.filter(|_| has_track) else {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    };

    if !MusicManager::skip(guild_id).await {
        ctx.send(embedded_messages::error("❌ Error", "Failed to skip the song."))
            .await?;
        return Ok(());
    }

    info!("Skipped '{}' in guild {}", song.title, guild_id);
    ctx.send(embedded_messages::skipped(&song)).await?;
    Ok(())
}

/// Stop the music, clear the queue and leave the voice channel
#[poise::command(slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let status = MusicManager::status(ctx.serenity_context(), guild_id).await;

    if !status.has_track && !status.has_connection {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    }

    MusicManager::leave(ctx.serenity_context(), guild_id).await;
    ctx.send(embedded_messages::stopped()).await?;
    Ok(())
}

/// Toggle playing the queue in random order
#[poise::command(slash_command, guild_only)]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let enabled = {
        let mut queue_manager = QUEUE_MANAGER.lock().await;
        queue_manager
            .has_songs(guild_id)
            .then(|| queue_manager.toggle_shuffle(guild_id))
    };

    let Some(enabled) = enabled else {
        ctx.send(embedded_messages::queue_is_empty()).await?;
        return Ok(());
    };

    ctx.send(embedded_messages::shuffle_status(enabled)).await?;
    Ok(())
}

/// Toggle repeating the queue when it ends
#[poise::command(slash_command, guild_only, rename = "loop")]
pub async fn loop_(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let enabled = {
        let mut queue_manager = QUEUE_MANAGER.lock().await;
        queue_manager
            .has_songs(guild_id)
            .then(|| queue_manager.toggle_loop(guild_id))
    };

    let Some(enabled) = enabled else {
        ctx.send(embedded_messages::queue_is_empty()).await?;
        return Ok(());
    };

    ctx.send(embedded_messages::loop_status(enabled)).await?;
    Ok(())
}

/// Show the song that is playing now
#[poise::command(slash_command, guild_only)]
pub async fn nowplaying(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let status = QUEUE_MANAGER.lock().await.status(guild_id);

    let Some(song) = status.current_song.clone() else {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    };

    ctx.send(embedded_messages::now_playing_status(&song, &status))
        .await?;
    Ok(())
}

/// Show the songs in the queue
#[poise::command(slash_command, guild_only)]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page number"]
    #[min = 1]
    page: Option<u32>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let queue = QUEUE_MANAGER
        .lock()
        .await
        .peek(guild_id)
        .cloned()
        .unwrap_or_default();

    ctx.send(embedded_messages::queue_listing(&queue, page.unwrap_or(1) as usize))
        .await?;
    Ok(())
}
