use serenity::all::{ChannelId, Ready, UserId, VoiceState};
use serenity::async_trait;
use serenity::prelude::*;
use tracing::{debug, info};

use crate::commands::music::utils::music_manager::MusicManager;

pub struct Handler;

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id else {
            return;
        };
        let bot_id = ctx.cache.current_user().id;

        let left_alone = {
            let Some(guild) = ctx.cache.guild(guild_id) else {
                return;
            };
            let Some(bot_channel) = guild
                .voice_states
                .get(&bot_id)
                .and_then(|state| state.channel_id)
            else {
                return;
            };

            is_alone(
                bot_id,
                bot_channel,
                guild.voice_states.values().map(|state| {
                    let is_bot = state.member.as_ref().is_some_and(|m| m.user.bot);
                    (state.user_id, state.channel_id, is_bot)
                }),
            )
        };

        if left_alone {
            info!("Left alone in voice channel in guild {}, leaving", guild_id);
            MusicManager::leave(&ctx, guild_id).await;
        } else {
            debug!("Voice state update in guild {}", guild_id);
        }
    }
}

/// Whether no other human listener shares `channel` with the bot
fn is_alone(
    bot_id: UserId,
    channel: ChannelId,
    occupants: impl IntoIterator<Item = (UserId, Option<ChannelId>, bool)>,
) -> bool {
    !occupants
        .into_iter()
        .any(|(user, current, is_bot)| user != bot_id && current == Some(channel) && !is_bot)
}
