use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::{EventContext, EventHandler};
use tracing::{info, warn};

use super::music_manager::MusicManager;

/// The track events the player reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackLifecycle {
    Play,
    Pause,
    End,
    Error,
}

/// Forwards one kind of track event for a guild to the music manager
pub struct TrackLifecycleNotifier {
    pub ctx: serenity::Context,
    pub guild_id: serenity::GuildId,
    pub lifecycle: TrackLifecycle,
}

#[async_trait]
impl EventHandler for TrackLifecycleNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<songbird::Event> {
        if let EventContext::Track(tracks) = ctx {
            for (state, handle) in tracks.iter() {
                MusicManager::on_track_event(
                    &self.ctx,
                    self.guild_id,
                    handle.uuid(),
                    self.lifecycle,
                    state.play_time,
                )
                .await;
            }
        }
        None
    }
}

/// Cleans a guild up when its voice connection drops without being asked to
pub struct VoiceDisconnectNotifier {
    pub ctx: serenity::Context,
    pub guild_id: serenity::GuildId,
}

#[async_trait]
impl EventHandler for VoiceDisconnectNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<songbird::Event> {
        if let EventContext::DriverDisconnect(data) = ctx {
            // No reason means the disconnect was requested by us
            let Some(reason) = &data.reason else {
                return None;
            };

            info!(
                "Voice connection lost in guild {} ({:?}), cleaning up",
                self.guild_id, reason
            );
            MusicManager::cleanup(self.guild_id).await;

            if let Err(e) = MusicManager::leave_channel(&self.ctx, self.guild_id).await {
                warn!(
                    "Failed to drop voice call for guild {}: {}",
                    self.guild_id, e
                );
            }
        }
        None
    }
}
