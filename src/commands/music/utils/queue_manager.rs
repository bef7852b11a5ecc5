use crate::commands::music::audio_sources::track_metadata::TrackMetadata;
use serenity::model::id::ChannelId;
use serenity::model::id::GuildId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// How many upcoming songs `QueueStatus::up_next` exposes
const UP_NEXT_LEN: usize = 5;

/// The per-guild queue record
#[derive(Debug, Clone, Default)]
pub struct GuildQueue {
    pub songs: Vec<TrackMetadata>,
    pub current_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub loop_enabled: bool,
    pub shuffle_enabled: bool,
    /// Channel that receives unsolicited announcements (queue finished, stream errors)
    pub text_channel: Option<ChannelId>,
}

impl GuildQueue {
    pub fn current_song(&self) -> Option<&TrackMetadata> {
        self.songs.get(self.current_index)
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// Playback flags reported by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Idle,
}

/// Range of queue indices covered by a bulk insert (0-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedRange {
    pub start_index: usize,
    pub end_index: usize,
    pub count: usize,
}

/// Snapshot of a guild queue for display
#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatus {
    pub songs_count: usize,
    pub current_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub loop_enabled: bool,
    pub shuffle_enabled: bool,
    pub current_song: Option<TrackMetadata>,
    pub up_next: Vec<TrackMetadata>,
}

/// Manages the queue of songs for each guild
#[derive(Default)]
pub struct QueueManager {
    queues: HashMap<GuildId, GuildQueue>,
}

impl QueueManager {
    /// Create a new queue manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the queue for a guild, creating an empty one if needed
    pub fn queue(&mut self, guild_id: GuildId) -> &mut GuildQueue {
        self.queues.entry(guild_id).or_default()
    }

    /// Look at a guild's queue without creating it
    pub fn peek(&self, guild_id: GuildId) -> Option<&GuildQueue> {
        self.queues.get(&guild_id)
    }

    /// Append a song, returning its 1-based position (the new queue length)
    pub fn add_song(&mut self, guild_id: GuildId, song: TrackMetadata) -> usize {
        let queue = self.queue(guild_id);
        queue.songs.push(song);
        queue.songs.len()
    }

    /// Append several songs at once
    pub fn add_songs(&mut self, guild_id: GuildId, songs: Vec<TrackMetadata>) -> AddedRange {
        let queue = self.queue(guild_id);
        let start_index = queue.songs.len();
        let count = songs.len();
        queue.songs.extend(songs);

        AddedRange {
            start_index,
            end_index: queue.songs.len().saturating_sub(1),
            count,
        }
    }

    pub fn has_songs(&self, guild_id: GuildId) -> bool {
        self.peek(guild_id).is_some_and(|queue| !queue.is_empty())
    }

    pub fn current_song(&self, guild_id: GuildId) -> Option<&TrackMetadata> {
        self.peek(guild_id)?.current_song()
    }

    /// Advance to the next song. Returns `None` when the end of a non-looping queue is reached.
    pub fn skip_song(&mut self, guild_id: GuildId) -> Option<TrackMetadata> {
        self.skip_song_with(guild_id, random_index)
    }

    /// `skip_song` with the random choice supplied by the caller.
    /// `pick(n)` must return a value in `0..n`.
    pub fn skip_song_with(
        &mut self,
        guild_id: GuildId,
        pick: impl FnOnce(usize) -> usize,
    ) -> Option<TrackMetadata> {
        let queue = self.queues.get_mut(&guild_id)?;

        if queue.shuffle_enabled && queue.songs.len() > 1 {
            let current = queue.current_index;
            let candidates: Vec<usize> = (0..queue.songs.len()).filter(|&i| i != current).collect();
            queue.current_index = candidates[pick(candidates.len()) % candidates.len()];
            debug!("Shuffle picked index {} for guild {}", queue.current_index, guild_id);
        } else {
            queue.current_index += 1;

            if queue.current_index >= queue.songs.len() {
                if queue.loop_enabled {
                    queue.current_index = 0;
                } else {
                    info!("Reached end of queue for guild {}", guild_id);
                    return None;
                }
            }
        }

        queue.current_song().cloned()
    }

    /// Step back to the previous song. Returns `None` when already at the start of a non-looping queue.
    pub fn previous_song(&mut self, guild_id: GuildId) -> Option<TrackMetadata> {
        self.previous_song_with(guild_id, random_index)
    }

    pub fn previous_song_with(
        &mut self,
        guild_id: GuildId,
        pick: impl FnOnce(usize) -> usize,
    ) -> Option<TrackMetadata> {
        let queue = self.queues.get_mut(&guild_id)?;

        if queue.shuffle_enabled && !queue.songs.is_empty() {
            queue.current_index = pick(queue.songs.len()) % queue.songs.len();
        } else if queue.current_index == 0 {
            if queue.loop_enabled && !queue.songs.is_empty() {
                queue.current_index = queue.songs.len() - 1;
            } else {
                queue.current_index = 0;
                return None;
            }
        } else {
            // May still be past the end after the queue finished
            queue.current_index = (queue.current_index - 1).min(queue.songs.len().saturating_sub(1));
        }

        queue.current_song().cloned()
    }

    /// Drop every song and reset the playback flags. Mode flags are kept.
    pub fn clear(&mut self, guild_id: GuildId) {
        let queue = self.queue(guild_id);
        queue.songs.clear();
        queue.current_index = 0;
        queue.is_playing = false;
        queue.is_paused = false;
    }

    /// Remove a song at a specific position in the queue (0-based index)
    /// Returns the removed song if successful
    pub fn remove_song(&mut self, guild_id: GuildId, index: usize) -> Option<TrackMetadata> {
        let queue = self.queues.get_mut(&guild_id)?;
        if index >= queue.songs.len() {
            return None;
        }

        let removed = queue.songs.remove(index);

        if index < queue.current_index {
            queue.current_index -= 1;
        } else if index == queue.current_index && queue.current_index >= queue.songs.len() {
            queue.current_index = 0;
        }

        Some(removed)
    }

    pub fn toggle_shuffle(&mut self, guild_id: GuildId) -> bool {
        let queue = self.queue(guild_id);
        queue.shuffle_enabled = !queue.shuffle_enabled;
        info!("Toggled shuffle for guild {}: {}", guild_id, queue.shuffle_enabled);
        queue.shuffle_enabled
    }

    pub fn toggle_loop(&mut self, guild_id: GuildId) -> bool {
        let queue = self.queue(guild_id);
        queue.loop_enabled = !queue.loop_enabled;
        info!("Toggled loop for guild {}: {}", guild_id, queue.loop_enabled);
        queue.loop_enabled
    }

    /// Record the player state. A guild without a queue is left alone.
    pub fn set_state(&mut self, guild_id: GuildId, state: PlaybackState) {
        if let Some(queue) = self.queues.get_mut(&guild_id) {
            queue.is_playing = state == PlaybackState::Playing;
            queue.is_paused = state == PlaybackState::Paused;
        }
    }

    pub fn set_text_channel(&mut self, guild_id: GuildId, channel_id: ChannelId) {
        self.queue(guild_id).text_channel = Some(channel_id);
    }

    pub fn text_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.peek(guild_id)?.text_channel
    }

    pub fn status(&self, guild_id: GuildId) -> QueueStatus {
        let Some(queue) = self.peek(guild_id) else {
            return QueueStatus {
                songs_count: 0,
                current_index: 0,
                is_playing: false,
                is_paused: false,
                loop_enabled: false,
                shuffle_enabled: false,
                current_song: None,
                up_next: Vec::new(),
            };
        };

        let up_next = queue
            .songs
            .iter()
            .skip(queue.current_index + 1)
            .take(UP_NEXT_LEN)
            .cloned()
            .collect();

        QueueStatus {
            songs_count: queue.songs.len(),
            current_index: queue.current_index,
            is_playing: queue.is_playing,
            is_paused: queue.is_paused,
            loop_enabled: queue.loop_enabled,
            shuffle_enabled: queue.shuffle_enabled,
            current_song: queue.current_song().cloned(),
            up_next,
        }
    }

    /// Forget everything about a guild
    pub fn delete(&mut self, guild_id: GuildId) -> Option<GuildQueue> {
        self.queues.remove(&guild_id)
    }
}

fn random_index(len: usize) -> usize {
    rand::random_range(0..len)
}

// Create a global queue manager wrapped in a mutex for thread safety
pub static QUEUE_MANAGER: LazyLock<Arc<Mutex<QueueManager>>> =
    LazyLock::new(|| Arc::new(Mutex::new(QueueManager::new())));

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    const GUILD: GuildId = GuildId::new(1);

    fn song(n: usize) -> TrackMetadata {
        TrackMetadata {
            title: format!("Song {}", n),
            url: format!("https://www.youtube.com/watch?v=video{:06}", n),
            ..Default::default()
        }
    }

    /// Queue holding `Song 0` through `Song 4`
    #[fixture]
    fn manager() -> QueueManager {
        let mut manager = QueueManager::new();
        manager.add_songs(GUILD, (0..5).map(song).collect());
        manager
    }

    #[test]
    fn test_add_song_returns_position() {
        let mut manager = QueueManager::new();
        assert_eq!(manager.add_song(GUILD, song(0)), 1);
        assert_eq!(manager.add_song(GUILD, song(1)), 2);
        assert_eq!(manager.current_song(GUILD), Some(&song(0)));
    }

    #[rstest]
    fn test_add_songs_reports_range(mut manager: QueueManager) {
        let range = manager.add_songs(GUILD, vec![song(5), song(6)]);
        assert_eq!(
            range,
            AddedRange {
                start_index: 5,
                end_index: 6,
                count: 2
            }
        );
    }

    #[test]
    fn test_queues_are_isolated_per_guild() {
        let mut manager = QueueManager::new();
        let other = GuildId::new(2);
        manager.add_song(GUILD, song(0));

        assert!(manager.current_song(other).is_none());
        assert_eq!(manager.status(other).songs_count, 0);
    }

    #[rstest]
    fn test_skip_walks_forward_then_stops(mut manager: QueueManager) {
        for n in 1..5 {
            assert_eq!(manager.skip_song(GUILD), Some(song(n)));
        }
        assert_eq!(manager.skip_song(GUILD), None);
        assert!(manager.current_song(GUILD).is_none());
    }

    #[test]
    fn test_skip_and_previous_do_not_create_queues() {
        let mut manager = QueueManager::new();

        assert_eq!(manager.skip_song(GUILD), None);
        assert_eq!(manager.previous_song(GUILD), None);
        assert!(manager.peek(GUILD).is_none());
    }

    #[rstest]
    fn test_skip_after_delete_stays_deleted(mut manager: QueueManager) {
        manager.delete(GUILD);

        assert_eq!(manager.skip_song_with(GUILD, |_| 0), None);
        manager.set_state(GUILD, PlaybackState::Playing);
        assert!(manager.peek(GUILD).is_none());
    }

    #[rstest]
    fn test_song_added_after_finish_becomes_current(mut manager: QueueManager) {
        while manager.skip_song(GUILD).is_some() {}

        manager.add_song(GUILD, song(9));
        assert_eq!(manager.current_song(GUILD), Some(&song(9)));
    }

    #[rstest]
    fn test_skip_wraps_when_looping(mut manager: QueueManager) {
        manager.toggle_loop(GUILD);
        manager.queue(GUILD).current_index = 4;

        assert_eq!(manager.skip_song(GUILD), Some(song(0)));
    }

    #[rstest]
    fn test_shuffle_never_repeats_current(mut manager: QueueManager) {
        manager.toggle_shuffle(GUILD);
        manager.queue(GUILD).current_index = 2;

        // candidates are [0, 1, 3, 4]; index 2 of that list is song 3
        assert_eq!(manager.skip_song_with(GUILD, |_| 2), Some(song(3)));

        for _ in 0..50 {
            let before = manager.queue(GUILD).current_index;
            manager.skip_song(GUILD);
            assert_ne!(manager.queue(GUILD).current_index, before);
        }
    }

    #[test]
    fn test_shuffle_with_single_song_behaves_sequentially() {
        let mut manager = QueueManager::new();
        manager.add_song(GUILD, song(0));
        manager.toggle_shuffle(GUILD);

        assert_eq!(manager.skip_song_with(GUILD, |_| 0), None);
    }

    #[rstest]
    fn test_previous_clamps_at_start(mut manager: QueueManager) {
        assert_eq!(manager.previous_song(GUILD), None);
        assert_eq!(manager.queue(GUILD).current_index, 0);
    }

    #[rstest]
    fn test_previous_wraps_when_looping(mut manager: QueueManager) {
        manager.toggle_loop(GUILD);
        assert_eq!(manager.previous_song(GUILD), Some(song(4)));
    }

    #[rstest]
    fn test_previous_steps_back(mut manager: QueueManager) {
        manager.queue(GUILD).current_index = 3;
        assert_eq!(manager.previous_song(GUILD), Some(song(2)));
    }

    #[rstest]
    fn test_previous_shuffle_uses_pick(mut manager: QueueManager) {
        manager.toggle_shuffle(GUILD);
        assert_eq!(manager.previous_song_with(GUILD, |n| n - 1), Some(song(4)));
    }

    #[rstest]
    #[case::before_current(1, 3, 2)]
    #[case::after_current(4, 3, 3)]
    #[case::current_in_middle(3, 3, 3)]
    #[case::current_at_end(4, 4, 0)]
    fn test_remove_adjusts_current_index(
        mut manager: QueueManager,
        #[case] remove: usize,
        #[case] current: usize,
        #[case] expected: usize,
    ) {
        manager.queue(GUILD).current_index = current;

        assert_eq!(manager.remove_song(GUILD, remove), Some(song(remove)));
        assert_eq!(manager.queue(GUILD).current_index, expected);
        assert_eq!(manager.queue(GUILD).songs.len(), 4);
    }

    #[rstest]
    fn test_remove_out_of_range_is_noop(mut manager: QueueManager) {
        assert_eq!(manager.remove_song(GUILD, 5), None);
        assert_eq!(manager.queue(GUILD).songs.len(), 5);
        assert_eq!(manager.remove_song(GuildId::new(99), 0), None);
    }

    #[rstest]
    fn test_clear_resets_queue_but_keeps_modes(mut manager: QueueManager) {
        manager.toggle_loop(GUILD);
        manager.set_state(GUILD, PlaybackState::Playing);
        manager.queue(GUILD).current_index = 3;

        manager.clear(GUILD);

        let queue = manager.queue(GUILD);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index, 0);
        assert!(!queue.is_playing);
        assert!(queue.loop_enabled);
    }

    #[rstest]
    fn test_has_songs(mut manager: QueueManager) {
        assert!(manager.has_songs(GUILD));
        assert!(!manager.has_songs(GuildId::new(2)));

        manager.clear(GUILD);
        assert!(!manager.has_songs(GUILD));
    }

    #[test]
    fn test_toggles_flip() {
        let mut manager = QueueManager::new();
        assert!(manager.toggle_shuffle(GUILD));
        assert!(!manager.toggle_shuffle(GUILD));
        assert!(manager.toggle_loop(GUILD));
        assert!(!manager.toggle_loop(GUILD));
    }

    #[rstest]
    fn test_set_state_is_exclusive(mut manager: QueueManager) {
        manager.set_state(GUILD, PlaybackState::Paused);
        let queue = manager.queue(GUILD);
        assert!(queue.is_paused && !queue.is_playing);

        manager.set_state(GUILD, PlaybackState::Idle);
        let queue = manager.queue(GUILD);
        assert!(!queue.is_paused && !queue.is_playing);
    }

    #[test]
    fn test_status_up_next_is_next_five() {
        let mut manager = QueueManager::new();
        manager.add_songs(GUILD, (0..10).map(song).collect());
        manager.queue(GUILD).current_index = 2;

        let status = manager.status(GUILD);

        assert_eq!(status.songs_count, 10);
        assert_eq!(status.current_song, Some(song(2)));
        assert_eq!(status.up_next, (3..8).map(song).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_delete_forgets_guild(mut manager: QueueManager) {
        manager.set_text_channel(GUILD, ChannelId::new(7));
        assert_eq!(manager.text_channel(GUILD), Some(ChannelId::new(7)));

        assert!(manager.delete(GUILD).is_some());
        assert!(manager.peek(GUILD).is_none());
        assert_eq!(manager.text_channel(GUILD), None);
    }
}
