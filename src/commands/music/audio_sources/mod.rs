//! This module defines the structure and traits for handling different audio sources.
//! YouTube is the only streamable source; Spotify links are resolved to YouTube
//! equivalents through the `YoutubeSearch` trait.

/// Submodule resolving Spotify playlists, albums and tracks.
pub(crate) mod spotify;
/// Submodule defining the `TrackMetadata` struct used across audio sources.
pub(crate) mod track_metadata;
/// Submodule wrapping `yt-dlp` for searching and streaming YouTube.
pub(crate) mod youtube;

use crate::commands::music::utils::music_manager::MusicError;
use serenity::async_trait;
use std::collections::HashSet;
use track_metadata::TrackMetadata;
use tracing::{info, warn};

/// A specialized `Result` type for operations within the `audio_sources` module.
pub type AudioSourceResult<T> = Result<T, MusicError>;

/// Anything that can turn a free-text query into YouTube tracks.
#[async_trait]
pub trait YoutubeSearch: Send + Sync {
    /// Search for up to `limit` videos matching `query`.
    ///
    /// Returns `MusicError::NoResults` when nothing matched.
    async fn search(&self, query: &str, limit: usize) -> AudioSourceResult<Vec<TrackMetadata>>;

    /// Collect popular songs by an artist from several phrasings of the same search.
    ///
    /// Queries that fail are skipped. Results are deduplicated by URL and capped at `limit`.
    async fn search_by_artist(
        &self,
        artist: &str,
        limit: usize,
    ) -> AudioSourceResult<Vec<TrackMetadata>> {
        let queries = [
            format!("{} songs", artist),
            format!("{} best hits", artist),
            format!("{} popular", artist),
        ];
        let per_query = limit.div_ceil(queries.len());

        let mut seen = HashSet::new();
        let mut songs = Vec::new();

        for query in &queries {
            match self.search(query, per_query).await {
                Ok(results) => {
                    for song in results {
                        if songs.len() < limit && seen.insert(song.url.clone()) {
                            songs.push(song);
                        }
                    }
                }
                Err(e) => warn!("Artist search '{}' failed: {}", query, e),
            }
        }

        if songs.is_empty() {
            return Err(MusicError::NoResults(format!(
                "No songs found for artist: {}",
                artist
            )));
        }

        info!("Found {} songs for artist: {}", songs.len(), artist);
        Ok(songs)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeSearch, song};
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_search_by_artist_splits_limit_across_queries() {
        let search = FakeSearch::default()
            .with("Queen songs", vec![song("a"), song("b")])
            .with("Queen best hits", vec![song("c"), song("d")])
            .with("Queen popular", vec![song("e"), song("f")]);

        let songs = search.search_by_artist("Queen", 5).await.unwrap();

        assert_eq!(songs.len(), 5);
        let calls = search.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("Queen songs".to_string(), 2),
                ("Queen best hits".to_string(), 2),
                ("Queen popular".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_by_artist_dedupes_and_skips_failures() {
        let search = FakeSearch::default()
            .with("Queen songs", vec![song("a"), song("b")])
            .failing("Queen best hits")
            .with("Queen popular", vec![song("b"), song("c")]);

        let songs = search.search_by_artist("Queen", 6).await.unwrap();

        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Video a", "Video b", "Video c"]);
    }

    #[tokio::test]
    async fn test_search_by_artist_without_results() {
        let search = FakeSearch::default().failing("Nobody songs");

        let result = search.search_by_artist("Nobody", 5).await;

        assert_matches!(result, Err(MusicError::NoResults(msg)) if msg.contains("Nobody"));
    }
}
