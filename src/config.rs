//! Runtime configuration read from the environment (after `.env` is loaded).

use std::env;
use std::sync::LazyLock;
use thiserror::Error;

const DEFAULT_DATABASE_PATH: &str = "application_data.db";
const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";

/// The `yt-dlp` executable, `YTDLP_PATH` or whatever is on the `PATH`.
pub static YTDLP_PROGRAM: LazyLock<String> =
    LazyLock::new(|| non_empty_var("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PROGRAM.into()));

/// Location of the SQLite database holding saved playlists.
pub static DATABASE_PATH: LazyLock<String> = LazyLock::new(|| {
    non_empty_var("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.into())
});

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    /// Both `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`, or nothing.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(non_empty_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        Some(Self {
            client_id: lookup("SPOTIFY_CLIENT_ID")?,
            client_secret: lookup("SPOTIFY_CLIENT_SECRET")?,
        })
    }
}

/// Settings the bot needs at startup
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub discord_token: String,
    /// Register commands in this guild only, which takes effect immediately
    pub guild_id: Option<u64>,
    pub spotify: Option<SpotifyCredentials>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(non_empty_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = lookup("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let guild_id = lookup("GUILD_ID")
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .ok_or(ConfigError::Invalid {
                        name: "GUILD_ID",
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            discord_token,
            guild_id,
            spotify: SpotifyCredentials::from_lookup(&lookup),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_minimal_config() {
        let config = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.guild_id, None);
        assert_eq!(config.spotify, None);
    }

    #[test]
    fn test_full_config() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("GUILD_ID", "123456789"),
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.guild_id, Some(123456789));
        assert_eq!(
            config.spotify,
            Some(SpotifyCredentials {
                client_id: "id".into(),
                client_secret: "secret".into()
            })
        );
    }

    #[test]
    fn test_missing_token() {
        assert_matches!(
            BotConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn test_invalid_guild_id() {
        let result = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("GUILD_ID", "not-a-number"),
        ]));

        assert_matches!(result, Err(ConfigError::Invalid { name: "GUILD_ID", .. }));
    }

    #[test]
    fn test_spotify_requires_both_halves() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("SPOTIFY_CLIENT_ID", "id"),
        ]))
        .unwrap();

        assert_eq!(config.spotify, None);
    }
}
