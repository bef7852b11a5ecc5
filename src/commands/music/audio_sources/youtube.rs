//! YouTube search, video lookup and stream creation.
//! Uses the `yt-dlp` command-line tool for everything that talks to YouTube.

use regex::Regex;
use serde::Deserialize;
use serenity::async_trait;
use songbird::input::{Compose, HttpRequest, Input, YoutubeDl};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::HTTP_CLIENT;
use crate::commands::music::utils::music_manager::MusicError;
use crate::config::YTDLP_PROGRAM;

use super::track_metadata::{TrackMetadata, TrackSource};
use super::{AudioSourceResult, YoutubeSearch};

/// Matches watch, embed, `/v/` and youtu.be links.
static YOUTUBE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/(watch\?v=|embed/|v/)|youtu\.be/)[\w-]+")
        .expect("valid youtube url regex")
});

/// Captures the 11 character video ID from the common URL shapes.
static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#)
        .expect("valid video id regex")
});

/// Which stream `create_input` should open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProfile {
    /// Best audio, resolved lazily by songbird's yt-dlp source
    Default,
    /// Lowest-quality audio format fetched as a direct media URL
    LowestAudio,
}

/// One JSON object as printed by `yt-dlp -j`
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
    channel: Option<String>,
    uploader: Option<String>,
    view_count: Option<u64>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    acodec: Option<String>,
    vcodec: Option<String>,
}

impl YtDlpFormat {
    fn is_audio_only(&self) -> bool {
        let has = |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != "none");
        has(&self.acodec) && !has(&self.vcodec)
    }
}

impl YtDlpEntry {
    fn watch_url(&self) -> Option<String> {
        if let Some(url) = &self.webpage_url {
            return Some(url.clone());
        }
        match (&self.url, &self.id) {
            (Some(url), _) if url.starts_with("http") => Some(url.clone()),
            (_, Some(id)) => Some(format!("https://www.youtube.com/watch?v={}", id)),
            _ => None,
        }
    }

    fn into_metadata(self) -> Option<TrackMetadata> {
        let url = self.watch_url()?;
        // Flat search results only carry the thumbnail list
        let thumbnail = self
            .thumbnail
            .or_else(|| self.thumbnails.last().map(|t| t.url.clone()));

        Some(TrackMetadata {
            title: self.title.unwrap_or_else(|| "Unknown Track".to_string()),
            url,
            duration: self
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
            thumbnail,
            channel: self.channel.or(self.uploader),
            views: self.view_count,
            requested_by: None,
            source: TrackSource::Youtube,
        })
    }
}

/// Parse the line-delimited JSON `yt-dlp` prints for a search. Lines that fail to parse are skipped.
fn parse_search_output(stdout: &str) -> Vec<TrackMetadata> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => entry.into_metadata(),
            Err(e) => {
                warn!("Skipping unparseable yt-dlp line: {}", e);
                None
            }
        })
        .collect()
}

fn parse_video_output(stdout: &str) -> AudioSourceResult<YtDlpEntry> {
    serde_json::from_str(stdout.trim()).map_err(|e| {
        MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
    })
}

/// Map a stream failure onto `CodecError` when it came from audio encoding or decoding.
fn classify_stream_error(message: String) -> MusicError {
    let lower = message.to_lowercase();
    if lower.contains("opus") || lower.contains("codec") {
        MusicError::CodecError(message)
    } else {
        MusicError::AudioSourceError(message)
    }
}

/// Run `op` up to `attempts` times, sleeping `base_delay * attempt` between failures.
/// Codec errors are returned immediately since another attempt cannot fix them.
async fn retry_with_backoff<T, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> AudioSourceResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AudioSourceResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_codec_error() || attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
        }
    }
}

/// Run yt-dlp with `args` and return its stdout.
async fn run_ytdlp(args: &[&str]) -> AudioSourceResult<String> {
    debug!("Running {} {:?}", YTDLP_PROGRAM.as_str(), args);

    let output = Command::new(YTDLP_PROGRAM.as_str())
        .args(args)
        .output()
        .await
        .map_err(|e| MusicError::ExternalApiError(format!("Failed to run yt-dlp: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MusicError::ExternalApiError(format!(
            "yt-dlp exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// YouTube access through `yt-dlp`.
#[derive(Default, Clone, Copy)]
pub struct YoutubeApi;

#[async_trait]
impl YoutubeSearch for YoutubeApi {
    async fn search(&self, query: &str, limit: usize) -> AudioSourceResult<Vec<TrackMetadata>> {
        info!("Searching YouTube for: \"{}\"", query);
        let search_param = format!("ytsearch{}:{}", limit.max(1), query);

        let stdout = run_ytdlp(&["-j", "--flat-playlist", &search_param]).await?;
        let songs = parse_search_output(&stdout);

        if songs.is_empty() {
            return Err(MusicError::NoResults(query.to_string()));
        }

        info!("Found {} results for \"{}\"", songs.len(), query);
        Ok(songs)
    }
}

impl YoutubeApi {
    pub fn is_youtube_url(input: &str) -> bool {
        YOUTUBE_URL_REGEX.is_match(input)
    }

    pub fn extract_video_id(url: &str) -> Option<String> {
        VIDEO_ID_REGEX
            .captures(url)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Canonical watch URL for any link that names a single video
    pub fn watch_url(url: &str) -> Option<String> {
        Self::extract_video_id(url).map(|id| format!("https://www.youtube.com/watch?v={}", id))
    }

    /// Fetch metadata for a single video, ignoring any playlist in the URL.
    pub async fn video_info(url: &str) -> AudioSourceResult<TrackMetadata> {
        info!("Fetching YouTube video info: {}", url);
        let stdout = run_ytdlp(&["-j", "--no-playlist", url]).await?;

        parse_video_output(&stdout)?
            .into_metadata()
            .ok_or_else(|| MusicError::AudioSourceError("Video has no URL".to_string()))
    }

    /// Whether the video offers at least one audio-only format.
    pub async fn is_playable(url: &str) -> bool {
        match Self::audio_format_count(url).await {
            Ok(count) => count > 0,
            Err(e) => {
                warn!("Could not check playability of {}: {}", url, e);
                false
            }
        }
    }

    async fn audio_format_count(url: &str) -> AudioSourceResult<usize> {
        let stdout = run_ytdlp(&["-j", "--no-playlist", url]).await?;
        let entry = parse_video_output(&stdout)?;
        Ok(entry.formats.iter().filter(|f| f.is_audio_only()).count())
    }

    /// Open a playable stream for `url`.
    pub async fn create_input(url: &str, profile: StreamProfile) -> AudioSourceResult<Input> {
        match profile {
            StreamProfile::Default => {
                let mut source = YoutubeDl::new_ytdl_like(
                    YTDLP_PROGRAM.as_str(),
                    HTTP_CLIENT.clone(),
                    url.to_string(),
                );
                // Resolve now so failures surface here rather than inside the driver
                source
                    .aux_metadata()
                    .await
                    .map_err(|e| classify_stream_error(e.to_string()))?;
                Ok(source.into())
            }
            StreamProfile::LowestAudio => {
                let stdout = run_ytdlp(&["-f", "worstaudio", "-g", "--no-playlist", url]).await?;
                let media_url = stdout
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .ok_or_else(|| {
                        MusicError::AudioSourceError("yt-dlp returned no media URL".to_string())
                    })?;
                Ok(HttpRequest::new(HTTP_CLIENT.clone(), media_url.to_string()).into())
            }
        }
    }

    /// `create_input` with fresh video info on every attempt, so expired stream URLs are not reused.
    pub async fn create_input_with_retry(
        url: &str,
        profile: StreamProfile,
        attempts: u32,
        base_delay: Duration,
    ) -> AudioSourceResult<Input> {
        retry_with_backoff(attempts, base_delay, |attempt| async move {
            info!(
                "Stream attempt {}/{} ({:?}) for: {}",
                attempt, attempts, profile, url
            );

            let audio_formats = Self::audio_format_count(url).await?;
            if audio_formats == 0 {
                return Err(MusicError::AudioSourceError(
                    "No audio formats available".to_string(),
                ));
            }
            debug!("Found {} audio formats for {}", audio_formats, url);

            Self::create_input(url, profile).await
        })
        .await
    }
}
