//! Resolves Spotify playlists, albums and tracks and converts them into playable YouTube tracks.
//! Handles authentication (client credentials flow), URL parsing, pagination and API errors.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::HTTP_CLIENT;
use crate::commands::music::utils::music_manager::MusicError;
use crate::config::SpotifyCredentials;

use super::track_metadata::{TrackMetadata, TrackSource};
use super::{AudioSourceResult, YoutubeSearch};

const ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const API_URL: &str = "https://api.spotify.com/v1";
/// Spotify's maximum page size for track listings
const PAGE_SIZE: usize = 50;
/// Refresh tokens this long before Spotify would reject them
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
/// Pause between consecutive YouTube searches during conversion
const CONVERSION_DELAY: Duration = Duration::from_millis(100);

/// Shared client configured from the environment.
pub static SPOTIFY_API: LazyLock<SpotifyApi> =
    LazyLock::new(|| SpotifyApi::new(SpotifyCredentials::from_env()));

static SPOTIFY_PLAYLIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:open\.)?spotify\.com/playlist/([a-zA-Z0-9]+)")
        .expect("valid playlist regex")
});

static SPOTIFY_ALBUM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:open\.)?spotify\.com/album/([a-zA-Z0-9]+)")
        .expect("valid album regex")
});

static SPOTIFY_TRACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:open\.)?spotify\.com/track/([a-zA-Z0-9]+)")
        .expect("valid track regex")
});

/// Basic track information retrieved from Spotify.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotifyTrack {
    pub title: String,
    pub artists: Vec<String>,
    pub duration: Option<Duration>,
    pub spotify_url: Option<String>,
}

impl SpotifyTrack {
    /// The YouTube query used to find this track: artists then title.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.artists.join(" "), self.title)
    }
}

/// A named list of Spotify tracks (playlist, album, or a single track).
#[derive(Clone, Debug)]
pub struct SpotifyCollection {
    pub name: String,
    pub tracks: Vec<SpotifyTrack>,
}

/// Outcome of searching YouTube for a batch of Spotify tracks.
#[derive(Debug)]
pub struct ConversionResult {
    pub tracks: Vec<TrackMetadata>,
    pub failed_tracks: Vec<SpotifyTrack>,
    /// `converted/total`, e.g. `"18/20"`
    pub success_rate: String,
}

/// A Spotify collection converted to YouTube tracks.
#[derive(Debug)]
pub struct ConvertedPlaylist {
    pub name: String,
    pub original_count: usize,
    pub converted_count: usize,
    pub tracks: Vec<TrackMetadata>,
    pub failed_tracks: Vec<SpotifyTrack>,
    pub success_rate: String,
}

/// Response from Spotify's token endpoint.
#[derive(Debug, Deserialize)]
struct SpotifyToken {
    access_token: String,
    expires_in: u64,
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    fn is_expired(&self) -> bool {
        let lifetime = Duration::from_secs(self.expires_in);
        self.created_at.elapsed() + TOKEN_REFRESH_MARGIN >= lifetime
    }
}

/// Spotify Web API client using the client credentials flow.
pub struct SpotifyApi {
    accounts_url: String,
    api_url: String,
    credentials: Option<SpotifyCredentials>,
    token: Mutex<Option<SpotifyToken>>,
    conversion_delay: Duration,
}

impl SpotifyApi {
    pub fn new(credentials: Option<SpotifyCredentials>) -> Self {
        Self::with_base_urls(ACCOUNTS_URL, API_URL, credentials)
    }

    /// Build a client against other endpoints, e.g. a mock server.
    pub fn with_base_urls(
        accounts_url: &str,
        api_url: &str,
        credentials: Option<SpotifyCredentials>,
    ) -> Self {
        Self {
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
            conversion_delay: CONVERSION_DELAY,
        }
    }

    pub fn is_spotify_url(url: &str) -> bool {
        SPOTIFY_PLAYLIST_REGEX.is_match(url)
            || SPOTIFY_ALBUM_REGEX.is_match(url)
            || SPOTIFY_TRACK_REGEX.is_match(url)
    }

    pub fn extract_playlist_id(url: &str) -> Option<String> {
        capture_id(&SPOTIFY_PLAYLIST_REGEX, url)
    }

    pub fn extract_album_id(url: &str) -> Option<String> {
        capture_id(&SPOTIFY_ALBUM_REGEX, url)
    }

    pub fn extract_track_id(url: &str) -> Option<String> {
        capture_id(&SPOTIFY_TRACK_REGEX, url)
    }

    /// Return a cached access token, requesting a new one when missing or about to expire.
    async fn access_token(&self) -> AudioSourceResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = token_lock.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            MusicError::ConfigError(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set".to_string(),
            )
        })?;

        info!("Authenticating with Spotify");
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let response = HTTP_CLIENT
            .post(format!("{}/api/token", self.accounts_url))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(MusicError::ExternalApiError(format!(
                "Spotify authentication failed: {} - {}",
                status, text
            )));
        }

        let token = response.json::<SpotifyToken>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify token: {}", e))
        })?;

        let access_token = token.access_token.clone();
        *token_lock = Some(token);
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// GET a Spotify API resource. A 401 drops the cached token and retries once.
    async fn get_json(&self, url: &str, not_found: &str) -> AudioSourceResult<serde_json::Value> {
        let mut reauthenticated = false;

        loop {
            let token = self.access_token().await?;
            let response = HTTP_CLIENT
                .get(url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| {
                    MusicError::ExternalApiError(format!("Failed to request Spotify API: {}", e))
                })?;

            match response.status() {
                status if status.is_success() => {
                    return response.json().await.map_err(|e| {
                        MusicError::ExternalApiError(format!(
                            "Failed to parse Spotify response: {}",
                            e
                        ))
                    });
                }
                StatusCode::NOT_FOUND => return Err(MusicError::NotFound(not_found.to_string())),
                StatusCode::UNAUTHORIZED if !reauthenticated => {
                    warn!("Spotify rejected the access token, re-authenticating");
                    self.invalidate_token().await;
                    reauthenticated = true;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(MusicError::ExternalApiError(
                        "Spotify authentication failed".to_string(),
                    ));
                }
                status => {
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Cannot read response".to_string());
                    return Err(MusicError::ExternalApiError(format!(
                        "Spotify API error: {} - {}",
                        status, text
                    )));
                }
            }
        }
    }

    /// Follow `next` links from `first_url`, collecting tracks from every page.
    /// `track_of` picks the track object out of a page item.
    async fn collect_pages(
        &self,
        first_url: String,
        not_found: &str,
        track_of: fn(&serde_json::Value) -> &serde_json::Value,
    ) -> AudioSourceResult<Vec<SpotifyTrack>> {
        let mut tracks = Vec::new();
        let mut next_url = Some(first_url);

        while let Some(url) = next_url {
            let page = self.get_json(&url, not_found).await?;

            if let Some(items) = page["items"].as_array() {
                tracks.extend(items.iter().map(track_of).filter_map(parse_track));
            }

            next_url = page["next"].as_str().map(str::to_string);
        }

        Ok(tracks)
    }

    /// Fetch a playlist's name and all of its tracks.
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> AudioSourceResult<SpotifyCollection> {
        const NOT_FOUND: &str = "Playlist not found or is private";
        info!("Fetching Spotify playlist: {}", playlist_id);

        let playlist = self
            .get_json(
                &format!("{}/playlists/{}?fields=name", self.api_url, playlist_id),
                NOT_FOUND,
            )
            .await?;
        let name = playlist["name"].as_str().unwrap_or("Unknown Playlist").to_string();

        let tracks = self
            .collect_pages(
                format!(
                    "{}/playlists/{}/tracks?limit={}",
                    self.api_url, playlist_id, PAGE_SIZE
                ),
                NOT_FOUND,
                |item| &item["track"],
            )
            .await?;

        info!("Retrieved {} tracks from playlist \"{}\"", tracks.len(), name);
        Ok(SpotifyCollection { name, tracks })
    }

    /// Fetch an album's name and all of its tracks.
    pub async fn get_album_tracks(&self, album_id: &str) -> AudioSourceResult<SpotifyCollection> {
        const NOT_FOUND: &str = "Album not found";
        info!("Fetching Spotify album: {}", album_id);

        let album = self
            .get_json(&format!("{}/albums/{}", self.api_url, album_id), NOT_FOUND)
            .await?;
        let name = album["name"].as_str().unwrap_or("Unknown Album").to_string();

        let tracks = self
            .collect_pages(
                format!("{}/albums/{}/tracks?limit={}", self.api_url, album_id, PAGE_SIZE),
                NOT_FOUND,
                |item| item,
            )
            .await?;

        Ok(SpotifyCollection { name, tracks })
    }

    /// Fetch a single track as a one-song collection named after the track.
    pub async fn get_track(&self, track_id: &str) -> AudioSourceResult<SpotifyCollection> {
        info!("Fetching Spotify track: {}", track_id);

        let data = self
            .get_json(&format!("{}/tracks/{}", self.api_url, track_id), "Track not found")
            .await?;
        let track = parse_track(&data)
            .ok_or_else(|| MusicError::ExternalApiError("Missing track name".to_string()))?;

        Ok(SpotifyCollection {
            name: track.title.clone(),
            tracks: vec![track],
        })
    }

    /// Find a YouTube equivalent for every track, taking the first search hit.
    pub async fn convert_to_youtube_tracks(
        &self,
        search: &dyn YoutubeSearch,
        tracks: &[SpotifyTrack],
        requested_by: &str,
    ) -> ConversionResult {
        info!("Converting {} Spotify tracks to YouTube", tracks.len());

        let mut converted = Vec::new();
        let mut failed_tracks = Vec::new();

        for (i, track) in tracks.iter().enumerate() {
            let query = track.search_query();
            debug!("[{}/{}] Searching: {}", i + 1, tracks.len(), query);

            match search.search(&query, 1).await {
                Ok(mut results) if !results.is_empty() => {
                    let mut song = results.swap_remove(0).requested_by(requested_by);
                    song.source = TrackSource::Spotify;
                    song.duration = song.duration.or(track.duration);
                    converted.push(song);
                }
                Ok(_) => {
                    warn!("No YouTube result for: {}", query);
                    failed_tracks.push(track.clone());
                }
                Err(e) => {
                    warn!("YouTube search failed for {}: {}", query, e);
                    failed_tracks.push(track.clone());
                }
            }

            if i + 1 < tracks.len() && !self.conversion_delay.is_zero() {
                tokio::time::sleep(self.conversion_delay).await;
            }
        }

        let success_rate = format!("{}/{}", converted.len(), tracks.len());
        info!("Converted {} Spotify tracks", success_rate);

        ConversionResult {
            tracks: converted,
            failed_tracks,
            success_rate,
        }
    }

    /// Resolve a Spotify playlist, album or track URL and convert it to YouTube tracks.
    pub async fn get_playlist_from_url(
        &self,
        search: &dyn YoutubeSearch,
        url: &str,
        requested_by: &str,
    ) -> AudioSourceResult<ConvertedPlaylist> {
        let collection = if let Some(id) = Self::extract_playlist_id(url) {
            self.get_playlist_tracks(&id).await?
        } else if let Some(id) = Self::extract_album_id(url) {
            self.get_album_tracks(&id).await?
        } else if let Some(id) = Self::extract_track_id(url) {
            self.get_track(&id).await?
        } else {
            return Err(MusicError::AudioSourceError(
                "Invalid Spotify URL".to_string(),
            ));
        };

        if collection.tracks.is_empty() {
            return Err(MusicError::NoResults(format!(
                "\"{}\" has no playable tracks",
                collection.name
            )));
        }

        let conversion = self
            .convert_to_youtube_tracks(search, &collection.tracks, requested_by)
            .await;

        Ok(ConvertedPlaylist {
            name: collection.name,
            original_count: collection.tracks.len(),
            converted_count: conversion.tracks.len(),
            tracks: conversion.tracks,
            failed_tracks: conversion.failed_tracks,
            success_rate: conversion.success_rate,
        })
    }
}

fn capture_id(regex: &Regex, url: &str) -> Option<String> {
    regex
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a Spotify track object. Null entries, local files and unnamed tracks yield `None`.
fn parse_track(track: &serde_json::Value) -> Option<SpotifyTrack> {
    if !track.is_object() || track["is_local"].as_bool().unwrap_or(false) {
        return None;
    }

    let title = track["name"].as_str().filter(|name| !name.is_empty())?;

    let artists = track["artists"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|a| a["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Some(SpotifyTrack {
        title: title.to_string(),
        artists,
        duration: track["duration_ms"].as_u64().map(Duration::from_millis),
        spotify_url: track["external_urls"]["spotify"].as_str().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::testing::{FakeSearch, song};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Option<SpotifyCredentials> {
        Some(SpotifyCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        })
    }

    fn api_for(server: &MockServer) -> SpotifyApi {
        let mut api = SpotifyApi::with_base_urls(
            &server.uri(),
            &format!("{}/v1", server.uri()),
            credentials(),
        );
        api.conversion_delay = Duration::ZERO;
        api
    }

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        // base64("id:secret")
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn spotify_track(name: &str, artists: &[&str]) -> serde_json::Value {
        json!({
            "id": name.to_lowercase(),
            "name": name,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "duration_ms": 180000,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", name) }
        })
    }

    #[test_case("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M", Some("37i9dQZF1DXcBWIGoYBM5M"); "full url")]
    #[test_case("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc", Some("37i9dQZF1DXcBWIGoYBM5M"); "with query")]
    #[test_case("spotify.com/playlist/abc123", Some("abc123"); "bare host")]
    #[test_case("https://open.spotify.com/album/abc123", None; "album")]
    fn test_extract_playlist_id(url: &str, expected: Option<&str>) {
        assert_eq!(SpotifyApi::extract_playlist_id(url).as_deref(), expected);
    }

    #[test]
    fn test_is_spotify_url() {
        assert!(SpotifyApi::is_spotify_url("https://open.spotify.com/album/abc123"));
        assert!(SpotifyApi::is_spotify_url("https://open.spotify.com/track/abc123"));
        assert!(!SpotifyApi::is_spotify_url("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_search_query_puts_artists_first() {
        let track = SpotifyTrack {
            title: "Under Pressure".to_string(),
            artists: vec!["Queen".to_string(), "David Bowie".to_string()],
            duration: None,
            spotify_url: None,
        };
        assert_eq!(track.search_query(), "Queen David Bowie Under Pressure");
    }

    #[test]
    fn test_parse_track_skips_null_and_local() {
        assert_eq!(parse_track(&serde_json::Value::Null), None);
        assert_eq!(
            parse_track(&json!({ "name": "Local", "is_local": true, "artists": [] })),
            None
        );
        assert_eq!(parse_track(&json!({ "name": "", "artists": [] })), None);
    }

    #[test]
    fn test_token_expires_with_margin() {
        let token = SpotifyToken {
            access_token: "t".into(),
            expires_in: 30,
            created_at: Instant::now(),
        };
        assert!(token.is_expired());

        let token = SpotifyToken {
            access_token: "t".into(),
            expires_in: 3600,
            created_at: Instant::now(),
        };
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn test_get_playlist_tracks_paginates_and_skips_unplayable() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/pl1"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Road Trip" })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/pl1/tracks"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "track": spotify_track("One", &["A"]) },
                    { "track": null },
                    { "track": { "name": "Local", "is_local": true, "artists": [] } }
                ],
                "next": format!("{}/v1/playlists/pl1/tracks-page-2", server.uri())
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/pl1/tracks-page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [ { "track": spotify_track("Two", &["B", "C"]) } ],
                "next": null
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let playlist = api.get_playlist_tracks("pl1").await.unwrap();

        assert_eq!(playlist.name, "Road Trip");
        let titles: Vec<_> = playlist.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
        assert_eq!(playlist.tracks[1].artists, vec!["B", "C"]);
        assert_eq!(playlist.tracks[0].duration, Some(Duration::from_secs(180)));
    }

    #[tokio::test]
    async fn test_get_playlist_not_found() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let result = api.get_playlist_tracks("missing").await;

        assert_matches!(result, Err(MusicError::NotFound(msg)) if msg == "Playlist not found or is private");
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_token_and_retries_once() {
        let server = MockServer::start().await;
        mount_token(&server, 2).await;

        Mock::given(method("GET"))
            .and(path("/v1/albums/al1"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/albums/al1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Album" })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/albums/al1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [ spotify_track("Song", &["A"]) ],
                "next": null
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let album = api.get_album_tracks("al1").await.unwrap();

        assert_eq!(album.name, "Album");
        assert_eq!(album.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_unauthorized_gives_up() {
        let server = MockServer::start().await;
        mount_token(&server, 2).await;

        Mock::given(method("GET"))
            .and(path("/v1/tracks/t1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let result = api.get_track("t1").await;

        assert_matches!(result, Err(MusicError::ExternalApiError(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let api = SpotifyApi::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9/v1", None);

        let result = api.get_track("t1").await;

        assert_matches!(result, Err(MusicError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_convert_to_youtube_tracks_reports_failures() {
        let server = MockServer::start().await;
        let api = api_for(&server);

        let tracks = vec![
            SpotifyTrack {
                title: "Found".to_string(),
                artists: vec!["Artist".to_string()],
                duration: Some(Duration::from_secs(200)),
                spotify_url: None,
            },
            SpotifyTrack {
                title: "Missing".to_string(),
                artists: vec!["Artist".to_string()],
                duration: None,
                spotify_url: None,
            },
        ];
        let search = FakeSearch::default().with("Artist Found", vec![song("found")]);

        let result = api.convert_to_youtube_tracks(&search, &tracks, "alice").await;

        assert_eq!(result.success_rate, "1/2");
        assert_eq!(result.tracks.len(), 1);
        assert_eq!(result.tracks[0].requester_label(), "alice");
        assert_eq!(result.tracks[0].source, TrackSource::Spotify);
        assert_eq!(result.tracks[0].duration, Some(Duration::from_secs(200)));
        assert_eq!(result.failed_tracks, vec![tracks[1].clone()]);
        assert_eq!(
            search.calls.lock().unwrap()[0],
            ("Artist Found".to_string(), 1)
        );
    }

    #[tokio::test]
    async fn test_get_playlist_from_url_converts_single_track() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/tracks/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(spotify_track("Hit", &["Band"])))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let search = FakeSearch::default().with("Band Hit", vec![song("hit")]);

        let playlist = api
            .get_playlist_from_url(&search, "https://open.spotify.com/track/t1", "bob")
            .await
            .unwrap();

        assert_eq!(playlist.name, "Hit");
        assert_eq!(playlist.original_count, 1);
        assert_eq!(playlist.converted_count, 1);
        assert_eq!(playlist.success_rate, "1/1");
    }

    #[tokio::test]
    async fn test_get_playlist_from_url_rejects_other_urls() {
        let api = SpotifyApi::new(credentials());
        let search = FakeSearch::default();

        let result = api
            .get_playlist_from_url(&search, "https://open.spotify.com/artist/xyz", "bob")
            .await;

        assert_matches!(result, Err(MusicError::AudioSourceError(_)));
    }
}
