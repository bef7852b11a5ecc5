use poise::serenity_prelude as serenity;
use serenity::all::{CreateEmbed, CreateMessage};
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, CoreEvent, Event, Songbird, TrackEvent};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::commands::music::audio_sources::track_metadata::TrackMetadata;
use crate::commands::music::audio_sources::youtube::{StreamProfile, YoutubeApi};

use super::embedded_messages;
use super::event_handlers::{TrackLifecycle, TrackLifecycleNotifier, VoiceDisconnectNotifier};
use super::queue_manager::{GuildQueue, PlaybackState, QUEUE_MANAGER};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Audio encoding error: {0}")]
    CodecError(String),

    #[error("No results found: {0}")]
    NoResults(String),

    #[error("{0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Playlist storage error: {0}")]
    StorageError(String),
}

impl MusicError {
    pub fn is_codec_error(&self) -> bool {
        matches!(self, MusicError::CodecError(_))
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Stream attempts per profile
const STREAM_ATTEMPTS: u32 = 3;
/// Base delay between stream attempts, multiplied by the attempt number
const STREAM_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Pause before advancing after a track finished normally
pub(crate) const ADVANCE_DELAY: Duration = Duration::from_secs(1);
/// Pause before recovering from a stream that errored or never started
pub(crate) const RECOVERY_DELAY: Duration = Duration::from_secs(2);
/// How many times a song that never started gets replayed before it is skipped
const MAX_IDLE_RETRIES: u8 = 1;


/// Per-track flags consulted when the track ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackFlags {
    /// The track reached the playing state at least once
    pub started: bool,
    /// Playback was stopped on request, so the end must not advance the queue
    pub manual_stop: bool,
}

/// What to do once the active track has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterEnd {
    Halt,
    Advance,
    RetryCurrent,
}

/// The right to install the next track of a guild.
/// A newer reservation, a stop or a cleanup voids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTicket(u64);

/// Result of asking an idle guild to start playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A track is playing or already being started
    Busy,
    Failed,
}

/// How the active track is being interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Its end advances the queue, even if the stream never got going
    Skip,
    /// Its end halts the queue
    Stop,
}

/// What a track event asks of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The event came from a replaced or already finished track
    Ignore,
    Playing,
    Paused,
    Halted,
    /// Play the next song once `delay` has passed
    Advance { delay: Duration, ticket: StartTicket },
    /// Play the current song again once `delay` has passed
    Retry { delay: Duration, ticket: StartTicket },
}

/// The track currently driving a guild's playback
struct ActiveTrack {
    uuid: Uuid,
    // None when the track was registered without a live driver
    handle: Option<TrackHandle>,
    flags: TrackFlags,
}

/// Snapshot of a guild's player for display
#[derive(Debug, Clone)]
pub struct PlayerStatus {
    pub has_track: bool,
    pub has_connection: bool,
    pub player_state: PlaybackState,
    pub is_playing: bool,
    pub is_paused: bool,
    pub loop_enabled: bool,
    pub shuffle_enabled: bool,
    pub current_song: Option<TrackMetadata>,
}

/// Tracks the active songbird track of every guild and the recovery bookkeeping around it
#[derive(Default)]
pub struct MusicManager {
    active: HashMap<GuildId, ActiveTrack>,
    // Newest start reservation per guild
    starting: HashMap<GuildId, u64>,
    next_ticket: u64,
    // Consecutive replays of a song that ended without ever playing
    idle_retries: HashMap<GuildId, u8>,
}

pub static MUSIC_MANAGER: LazyLock<Arc<Mutex<MusicManager>>> =
    LazyLock::new(|| Arc::new(Mutex::new(MusicManager::default())));

impl MusicManager {
    /// Whether a track is playing or about to be installed
    pub fn is_busy(&self, guild_id: GuildId) -> bool {
        self.active.contains_key(&guild_id) || self.starting.contains_key(&guild_id)
    }

    /// Reserve the next start, voiding any older reservation
    fn reserve_start(&mut self, guild_id: GuildId) -> StartTicket {
        self.next_ticket += 1;
        self.starting.insert(guild_id, self.next_ticket);
        StartTicket(self.next_ticket)
    }

    fn try_reserve_start(&mut self, guild_id: GuildId) -> Option<StartTicket> {
        if self.is_busy(guild_id) {
            return None;
        }
        Some(self.reserve_start(guild_id))
    }

    fn holds(&self, guild_id: GuildId, ticket: StartTicket) -> bool {
        self.starting.get(&guild_id) == Some(&ticket.0)
    }

    /// Give up a reservation. A newer one is left alone.
    fn release_start(&mut self, guild_id: GuildId, ticket: StartTicket) {
        if self.holds(guild_id, ticket) {
            self.starting.remove(&guild_id);
        }
    }

    fn cancel_start(&mut self, guild_id: GuildId) -> bool {
        self.starting.remove(&guild_id).is_some()
    }

    /// Record `uuid` as the guild's track if `ticket` is still the newest reservation
    fn activate(
        &mut self,
        guild_id: GuildId,
        ticket: StartTicket,
        uuid: Uuid,
        handle: Option<TrackHandle>,
    ) -> bool {
        if !self.holds(guild_id, ticket) {
            return false;
        }
        self.starting.remove(&guild_id);
        self.active.insert(
            guild_id,
            ActiveTrack {
                uuid,
                handle,
                flags: TrackFlags::default(),
            },
        );
        true
    }

    fn active_handle(&self, guild_id: GuildId) -> Option<TrackHandle> {
        self.active
            .get(&guild_id)
            .and_then(|track| track.handle.clone())
    }

    fn is_active(&self, guild_id: GuildId, uuid: Uuid) -> bool {
        self.active
            .get(&guild_id)
            .is_some_and(|track| track.uuid == uuid)
    }

    /// Mark the guild's active track as started, if `uuid` is still the active one
    fn mark_started(&mut self, guild_id: GuildId, uuid: Uuid) -> bool {
        let Some(track) = self
            .active
            .get_mut(&guild_id)
            .filter(|track| track.uuid == uuid)
        else {
            return false;
        };
        track.flags.started = true;
        self.idle_retries.remove(&guild_id);
        true
    }

    /// Take the active track out if `uuid` is still the active one.
    /// The first end or error event wins; later events for the same track find nothing.
    fn take_active(&mut self, guild_id: GuildId, uuid: Uuid) -> Option<TrackFlags> {
        if !self.is_active(guild_id, uuid) {
            return None;
        }
        self.active.remove(&guild_id).map(|track| track.flags)
    }

    /// Flag the active track ahead of stopping it
    fn interrupt(&mut self, guild_id: GuildId, interrupt: Interrupt) -> bool {
        let Some(track) = self.active.get_mut(&guild_id) else {
            return false;
        };
        match interrupt {
            Interrupt::Skip => track.flags.started = true,
            Interrupt::Stop => track.flags.manual_stop = true,
        }
        true
    }

    /// Decide what follows an ended track and update the idle retry counter
    pub fn after_end(&mut self, guild_id: GuildId, flags: TrackFlags) -> AfterEnd {
        if flags.manual_stop {
            self.idle_retries.remove(&guild_id);
            return AfterEnd::Halt;
        }

        if flags.started {
            self.idle_retries.remove(&guild_id);
            return AfterEnd::Advance;
        }

        let retries = self.idle_retries.entry(guild_id).or_insert(0);
        if *retries < MAX_IDLE_RETRIES {
            *retries += 1;
            AfterEnd::RetryCurrent
        } else {
            self.idle_retries.remove(&guild_id);
            AfterEnd::Advance
        }
    }

    /// Apply a track event to the bookkeeping. Follow-up starts are reserved here,
    /// so the guild stays busy while the delay runs.
    pub(crate) fn track_event(
        &mut self,
        guild_id: GuildId,
        uuid: Uuid,
        lifecycle: TrackLifecycle,
        play_time: Duration,
    ) -> Transition {
        match lifecycle {
            TrackLifecycle::Play if self.mark_started(guild_id, uuid) => Transition::Playing,
            TrackLifecycle::Pause if self.is_active(guild_id, uuid) => Transition::Paused,
            TrackLifecycle::Play | TrackLifecycle::Pause => Transition::Ignore,
            TrackLifecycle::End => {
                let Some(mut flags) = self.take_active(guild_id, uuid) else {
                    return Transition::Ignore;
                };
                flags.started |= play_time > Duration::ZERO;

                match self.after_end(guild_id, flags) {
                    AfterEnd::Halt => Transition::Halted,
                    AfterEnd::Advance => Transition::Advance {
                        delay: ADVANCE_DELAY,
                        ticket: self.reserve_start(guild_id),
                    },
                    AfterEnd::RetryCurrent => Transition::Retry {
                        delay: RECOVERY_DELAY,
                        ticket: self.reserve_start(guild_id),
                    },
                }
            }
            TrackLifecycle::Error => {
                let Some(flags) = self.take_active(guild_id, uuid) else {
                    return Transition::Ignore;
                };
                self.idle_retries.remove(&guild_id);

                if flags.manual_stop {
                    Transition::Halted
                } else {
                    Transition::Advance {
                        delay: RECOVERY_DELAY,
                        ticket: self.reserve_start(guild_id),
                    }
                }
            }
        }
    }

    fn forget(&mut self, guild_id: GuildId) -> Option<TrackHandle> {
        self.idle_retries.remove(&guild_id);
        self.starting.remove(&guild_id);
        self.active.remove(&guild_id).and_then(|track| track.handle)
    }


    /// Get the Songbird voice client from the context
    pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
        songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
    }

    /// Get the current voice channel call handle
    pub async fn get_call(
        ctx: &Context,
        guild_id: GuildId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;
        songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    /// Join a voice channel, reusing the guild's call when it is already connected
    pub async fn join_channel(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;

        if let Some(call) = songbird.get(guild_id) {
            if call.lock().await.current_channel().is_some() {
                debug!("Reusing existing voice connection for guild {}", guild_id);
                return Ok(call);
            }
        }

        info!("Joining voice channel {} in guild {}", channel_id, guild_id);
        let call = songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        {
            let mut handler = call.lock().await;
            handler.remove_all_global_events();
            handler.add_global_event(
                Event::Core(CoreEvent::DriverDisconnect),
                VoiceDisconnectNotifier {
                    ctx: ctx.clone(),
                    guild_id,
                },
            );
        }

        Ok(call)
    }

    /// Leave a voice channel
    pub async fn leave_channel(ctx: &Context, guild_id: GuildId) -> MusicResult<()> {
        let songbird = Self::get_songbird(ctx).await?;

        // Check if we're in a voice channel
        if songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        songbird
            .remove(guild_id)
            .await
            .map_err(|_| MusicError::JoinError("Failed to leave voice channel".to_string()))?;

        Ok(())
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// Start the guild's current song unless a track is playing or already being started
    pub async fn start_if_idle(ctx: &Context, guild_id: GuildId) -> StartOutcome {
        let Some(ticket) = MUSIC_MANAGER.lock().await.try_reserve_start(guild_id) else {
            debug!("Playback already active or starting in guild {}", guild_id);
            return StartOutcome::Busy;
        };

        info!("Nothing playing in guild {}, starting playback", guild_id);
        if Self::play_song(ctx, guild_id, ticket).await {
            StartOutcome::Started
        } else {
            StartOutcome::Failed
        }
    }

    /// Play the guild's current song under `ticket`, replacing whatever the call was playing.
    /// Returns false when nothing was started; the ticket is released then.
    pub async fn play_song(ctx: &Context, guild_id: GuildId, ticket: StartTicket) -> bool {
        let started = Self::install_current(ctx, guild_id, ticket).await;
        if !started {
            MUSIC_MANAGER.lock().await.release_start(guild_id, ticket);
        }
        started
    }

    async fn install_current(ctx: &Context, guild_id: GuildId, ticket: StartTicket) -> bool {
        let current = QUEUE_MANAGER.lock().await.peek(guild_id).and_then(|queue| {
            queue
                .current_song()
                .map(|song| (queue.current_index, song.clone()))
        });
        let Some((index, song)) = current else {
            info!("No current song to play in guild {}", guild_id);
            return false;
        };

        let call = match Self::get_call(ctx, guild_id).await {
            Ok(call) => call,
            Err(e) => {
                error!("No voice connection for guild {}: {}", guild_id, e);
                return false;
            }
        };

        info!("Playing '{}' ({}) in guild {}", song.title, song.url, guild_id);

        let input = match YoutubeApi::create_input_with_retry(
            &song.url,
            StreamProfile::Default,
            STREAM_ATTEMPTS,
            STREAM_RETRY_DELAY,
        )
        .await
        {
            Ok(input) => input,
            Err(err) if err.is_codec_error() => {
                error!("Audio encoding failed for guild {}: {}", guild_id, err);
                announce(ctx, guild_id, embedded_messages::audio_encoding_error()).await;
                return false;
            }
            Err(err) => {
                warn!(
                    "Stream failed for '{}', trying the lowest audio quality: {}",
                    song.title, err
                );
                match YoutubeApi::create_input_with_retry(
                    &song.url,
                    StreamProfile::LowestAudio,
                    STREAM_ATTEMPTS,
                    STREAM_RETRY_DELAY,
                )
                .await
                {
                    Ok(input) => input,
                    Err(err) => {
                        error!("Alternative stream also failed for '{}': {}", song.title, err);
                        return false;
                    }
                }
            }
        };

        // Lock order: call, manager, queue. Swapping tracks with all three held keeps
        // events of the replaced track from being mistaken for the new one.
        let handle = {
            let mut handler = call.lock().await;
            let mut manager = MUSIC_MANAGER.lock().await;
            let mut queues = QUEUE_MANAGER.lock().await;

            if !manager.holds(guild_id, ticket)
                || !still_current(queues.peek(guild_id), index, &song.url)
            {
                info!(
                    "Playback in guild {} moved on while '{}' was loading, dropping it",
                    guild_id, song.title
                );
                return false;
            }

            let handle = handler.play_only_input(input);
            manager.activate(guild_id, ticket, handle.uuid(), Some(handle.clone()));
            queues.set_state(guild_id, PlaybackState::Playing);
            handle
        };

        for (event, lifecycle) in [
            (TrackEvent::Play, TrackLifecycle::Play),
            (TrackEvent::Pause, TrackLifecycle::Pause),
            (TrackEvent::End, TrackLifecycle::End),
            (TrackEvent::Error, TrackLifecycle::Error),
        ] {
            let notifier = TrackLifecycleNotifier {
                ctx: ctx.clone(),
                guild_id,
                lifecycle,
            };
            if let Err(e) = handle.add_event(Event::Track(event), notifier) {
                warn!("Failed to subscribe to {:?} for guild {}: {}", lifecycle, guild_id, e);
            }
        }

        info!("Playback started for '{}' in guild {}", song.title, guild_id);
        true
    }

    /// Advance the queue and play the new current song
    pub async fn play_next(ctx: &Context, guild_id: GuildId, ticket: StartTicket) -> bool {
        if !MUSIC_MANAGER.lock().await.holds(guild_id, ticket) {
            debug!("Pending start in guild {} was cancelled", guild_id);
            return false;
        }

        let next = QUEUE_MANAGER.lock().await.skip_song(guild_id);

        if next.is_none() {
            MUSIC_MANAGER.lock().await.release_start(guild_id, ticket);
            info!("Queue finished in guild {}", guild_id);
            announce(ctx, guild_id, embedded_messages::queue_finished()).await;
            return false;
        }

        Self::play_song(ctx, guild_id, ticket).await
    }

    pub async fn pause(guild_id: GuildId) -> bool {
        let Some(handle) = MUSIC_MANAGER.lock().await.active_handle(guild_id) else {
            return false;
        };
        handle.pause().is_ok()
    }

    pub async fn resume(guild_id: GuildId) -> bool {
        let Some(handle) = MUSIC_MANAGER.lock().await.active_handle(guild_id) else {
            return false;
        };
        handle.play().is_ok()
    }

    /// Stop the active track without advancing the queue, and cancel a pending start
    pub async fn stop(guild_id: GuildId) -> bool {
        let (cancelled, handle) = {
            let mut manager = MUSIC_MANAGER.lock().await;
            let cancelled = manager.cancel_start(guild_id);
            let handle = manager
                .interrupt(guild_id, Interrupt::Stop)
                .then(|| manager.active_handle(guild_id))
                .flatten();
            (cancelled, handle)
        };

        if cancelled {
            info!("Cancelled pending start in guild {}", guild_id);
        }
        handle.is_some_and(|handle| handle.stop().is_ok()) || cancelled
    }

    /// Stop the active track; its end event advances the queue
    pub async fn skip(guild_id: GuildId) -> bool {
        let handle = {
            let mut manager = MUSIC_MANAGER.lock().await;
            if !manager.interrupt(guild_id, Interrupt::Skip) {
                return false;
            }
            manager.active_handle(guild_id)
        };
        handle.is_some_and(|handle| handle.stop().is_ok())
    }

    /// Stop playback, leave the voice channel and drop all state for the guild
    pub async fn leave(ctx: &Context, guild_id: GuildId) -> bool {
        info!("Leaving voice channel in guild {}", guild_id);
        Self::stop(guild_id).await;

        let left = match Self::leave_channel(ctx, guild_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to leave voice channel in guild {}: {}", guild_id, e);
                false
            }
        };

        Self::cleanup(guild_id).await;
        left
    }

    /// Drop the active track, any pending start and the guild's queue
    pub async fn cleanup(guild_id: GuildId) {
        let handle = MUSIC_MANAGER.lock().await.forget(guild_id);
        if let Some(handle) = handle {
            // Already-finished tracks reject the stop; nothing to do then
            let _ = handle.stop();
        }

        QUEUE_MANAGER.lock().await.delete(guild_id);
        info!("Cleaned up music state for guild {}", guild_id);
    }

    pub async fn status(ctx: &Context, guild_id: GuildId) -> PlayerStatus {
        let handle = MUSIC_MANAGER.lock().await.active_handle(guild_id);

        let player_state = match &handle {
            Some(handle) => match handle.get_info().await {
                Ok(info) => match info.playing {
                    PlayMode::Play => PlaybackState::Playing,
                    PlayMode::Pause => PlaybackState::Paused,
                    _ => PlaybackState::Idle,
                },
                Err(_) => PlaybackState::Idle,
            },
            None => PlaybackState::Idle,
        };

        let has_connection = match Self::get_call(ctx, guild_id).await {
            Ok(call) => call.lock().await.current_channel().is_some(),
            Err(_) => false,
        };

        let queue = QUEUE_MANAGER.lock().await.status(guild_id);

        PlayerStatus {
            has_track: handle.is_some(),
            has_connection,
            player_state,
            is_playing: queue.is_playing,
            is_paused: queue.is_paused,
            loop_enabled: queue.loop_enabled,
            shuffle_enabled: queue.shuffle_enabled,
            current_song: queue.current_song,
        }
    }

    /// Apply a track lifecycle event to the guild's state
    pub(crate) async fn on_track_event(
        ctx: &Context,
        guild_id: GuildId,
        uuid: Uuid,
        lifecycle: TrackLifecycle,
        play_time: Duration,
    ) {
        let transition = MUSIC_MANAGER
            .lock()
            .await
            .track_event(guild_id, uuid, lifecycle, play_time);

        let state = match transition {
            Transition::Ignore => {
                debug!("Ignoring {:?} of a replaced track in guild {}", lifecycle, guild_id);
                return;
            }
            Transition::Playing => PlaybackState::Playing,
            Transition::Paused => PlaybackState::Paused,
            _ => PlaybackState::Idle,
        };
        QUEUE_MANAGER.lock().await.set_state(guild_id, state);

        match transition {
            Transition::Playing => debug!("Track playing in guild {}", guild_id),
            Transition::Paused => debug!("Track paused in guild {}", guild_id),
            Transition::Halted => info!("Playback stopped on request in guild {}", guild_id),
            Transition::Advance { delay, ticket } => {
                if lifecycle == TrackLifecycle::Error {
                    error!("Audio player error in guild {}, recovering", guild_id);
                } else {
                    info!("Track finished in guild {}, playing next", guild_id);
                }
                spawn_delayed(ctx, guild_id, delay, true, ticket);
            }
            Transition::Retry { delay, ticket } => {
                warn!(
                    "Track ended without playing in guild {}, retrying it",
                    guild_id
                );
                spawn_delayed(ctx, guild_id, delay, false, ticket);
            }
            Transition::Ignore => {}
        }
    }
}

/// Whether `queue` still has the song at `url` as its current song at `index`
fn still_current(queue: Option<&GuildQueue>, index: usize, url: &str) -> bool {
    queue.is_some_and(|queue| {
        queue.current_index == index && queue.current_song().is_some_and(|song| song.url == url)
    })
}

/// Play the next (or the same) song after `delay` without blocking the event task
fn spawn_delayed(
    ctx: &Context,
    guild_id: GuildId,
    delay: Duration,
    advance: bool,
    ticket: StartTicket,
) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let played = if advance {
            MusicManager::play_next(&ctx, guild_id, ticket).await
        } else {
            MusicManager::play_song(&ctx, guild_id, ticket).await
        };
        if !played {
            debug!("Nothing started after recovery in guild {}", guild_id);
        }
    });
}

/// Post an embed to the guild's announcement channel, if one is known
async fn announce(ctx: &Context, guild_id: GuildId, embed: CreateEmbed) {
    let Some(channel_id) = QUEUE_MANAGER.lock().await.text_channel(guild_id) else {
        return;
    };

    if let Err(e) = channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await
    {
        warn!("Failed to announce in channel {}: {}", channel_id, e);
    }
}
