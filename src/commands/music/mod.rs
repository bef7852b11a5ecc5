pub(crate) mod controls;
pub(crate) mod play;
pub(crate) mod playlist;
pub(crate) mod test;

pub(crate) mod audio_sources;
pub(crate) mod utils;

use crate::{CommandResult, Context, Error};
use poise::CreateReply;
use serenity::model::id::GuildId;
use utils::music_manager::MusicError;

/// The guild the command was invoked in, or a `NotInGuild` error for DMs
fn guild_id(ctx: &Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as Error)
}

/// The invoking member's server display name, falling back to their account name
async fn requester_name(ctx: &Context<'_>) -> String {
    match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    }
}
