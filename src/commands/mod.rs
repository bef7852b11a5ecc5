//! This module aggregates all the command modules for the bot.

/// Commands related to music playback, playlists and diagnostics.
pub(crate) mod music;
