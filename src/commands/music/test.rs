use super::*;
use crate::commands::music::{
    audio_sources::youtube::{StreamProfile, YoutubeApi},
    utils::embedded_messages,
};
use poise::serenity_prelude::CreateEmbed;
use tracing::info;

/// Check that a YouTube video can be looked up and streamed
#[poise::command(slash_command, category = "Music")]
pub async fn test(
    ctx: Context<'_>,
    #[description = "YouTube URL to test"] url: String,
) -> CommandResult {
    ctx.defer().await?;

    let Some(url) = YoutubeApi::watch_url(&url) else {
        ctx.send(embedded_messages::error(
            "❌ Invalid URL",
            "Please provide a valid YouTube video URL",
        ))
        .await?;
        return Ok(());
    };

    let progress = ctx
        .send(
            CreateReply::default().embed(
                CreateEmbed::new()
                    .title("🧪 Testing YouTube URL")
                    .description(format!("Testing: {}", url))
                    .field("Status", "⏳ Checking video info...", false)
                    .color(0x0099ff),
            ),
        )
        .await?;

    info!("Testing video info for: {}", url);
    let song = match YoutubeApi::video_info(&url).await {
        Ok(song) => song,
        Err(err) => {
            progress
                .edit(
                    ctx,
                    CreateReply::default().embed(
                        CreateEmbed::new()
                            .title("❌ Video Info Failed")
                            .description(format!("Error: {}", err))
                            .field("URL", &url, false)
                            .color(0xff0000),
                    ),
                )
                .await?;
            return Ok(());
        }
    };

    info!("Testing playability for: {}", url);
    let playable = if YoutubeApi::is_playable(&url).await {
        "✅ Playable".to_string()
    } else {
        "❌ Not playable".to_string()
    };

    info!("Testing stream creation for: {}", url);
    let stream = match YoutubeApi::create_input(&url, StreamProfile::Default).await {
        // Dropping the input closes the stream
        Ok(_input) => "✅ Stream created successfully".to_string(),
        Err(err) => format!("❌ Stream error: {}", err),
    };

    progress
        .edit(
            ctx,
            embedded_messages::youtube_test_results(&song, &playable, &stream),
        )
        .await?;
    Ok(())
}
