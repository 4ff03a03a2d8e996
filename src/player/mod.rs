//! The playback controller: at most one sound plays at a time, and tapping
//! a sound starts, stops, or switches depending on what is already playing.

use crate::audio::{AudioError, SoundBackend};
use crate::catalog::SoundCatalog;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, trace};

mod run_loop;
mod sound_task;
mod state;

pub use sound_task::SoundTaskManager;
pub use state::{PlaybackState, PlayerCommand, PlayerStateUpdate};

pub(crate) const PLAYER_LOG_TARGET: &str = "sonocli::player";

/// Owns the playback state machine and the single live playback handle.
///
/// Invariant: `active_task` is `Some` exactly when `state` is `Playing`, and
/// no other component ever holds the handle. Every transition goes through
/// `toggle` (or teardown), and a new sound is only started after the previous
/// task has fully stopped and released its resources.
pub struct Player {
    // --- Configuration ---
    catalog: SoundCatalog,
    backend: Box<dyn SoundBackend>,

    // --- State ---
    state: PlaybackState,
    active_task: Option<SoundTaskManager>,

    // --- Communication ---
    command_rx: mpsc::Receiver<PlayerCommand>,
    state_update_tx: broadcast::Sender<PlayerStateUpdate>,
}

impl Player {
    /// Creates a new Player instance and the command channel sender.
    /// The Player itself should be run in a separate task using `Player::run`.
    pub fn new(
        catalog: SoundCatalog,
        backend: Box<dyn SoundBackend>,
        state_update_capacity: usize,
        command_buffer_size: usize,
    ) -> (Self, mpsc::Sender<PlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let (state_update_tx, _) = broadcast::channel(state_update_capacity);

        let player = Player {
            catalog,
            backend,
            state: PlaybackState::Idle,
            active_task: None,
            command_rx,
            state_update_tx,
        };

        (player, command_tx)
    }

    /// Subscribes to player state updates.
    pub fn subscribe_state_updates(&self) -> broadcast::Receiver<PlayerStateUpdate> {
        self.state_update_tx.subscribe()
    }

    /// The current playback state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Sends a state update via the broadcast channel, logging errors.
    fn broadcast_update(&self, update: PlayerStateUpdate) {
        trace!(target: PLAYER_LOG_TARGET, "Broadcasting state update: {:?}", update);
        if self.state_update_tx.send(update.clone()).is_err() {
            // No active receivers; normal when nothing is listening yet.
            debug!(target: PLAYER_LOG_TARGET, "No active listeners for state update: {:?}", update);
        }
    }

    /// Toggles playback of the named sound.
    ///
    /// Any live playback is stopped and released first, unconditionally. If
    /// the named sound was the one playing, that stop is the whole effect.
    /// Otherwise the sound is acquired and started looping; on acquisition
    /// failure the player stays idle holding no resources, and the error is
    /// surfaced to the caller.
    #[instrument(skip(self), fields(sound = %name))]
    pub async fn toggle(&mut self, name: &str) -> Result<(), AudioError> {
        let previous = match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Playing(playing) => Some(playing),
            PlaybackState::Idle => None,
        };

        // Step 1: stop whatever is playing. Safe when nothing is.
        if let Some(manager) = self.active_task.take() {
            manager.stop_task().await;
        }

        // Step 2: toggling the active sound is a pure stop.
        if previous.as_deref() == Some(name) {
            info!(target: PLAYER_LOG_TARGET, "Stopped '{}'.", name);
            self.broadcast_update(PlayerStateUpdate::Stopped);
            return Ok(());
        }

        // Step 3: start (or switch to) the requested sound. The previous
        // task is already fully released at this point, so the acquisitions
        // never overlap.
        let item = self
            .catalog
            .get(name)
            .ok_or_else(|| AudioError::LoadFailure(format!("Unknown sound: {}", name)))?
            .clone();
        let prepared = self.backend.prepare(&item).await?;

        let manager = sound_task::spawn_sound_task(prepared, item.name.clone());
        self.active_task = Some(manager);
        self.state = PlaybackState::Playing(item.name.clone());
        info!(target: PLAYER_LOG_TARGET, "Now playing '{}' (looping).", item.name);
        self.broadcast_update(PlayerStateUpdate::Playing(item.name));
        Ok(())
    }

    /// Stops and releases any live playback. Idempotent; also invoked on the
    /// run loop's exit path so teardown happens even on abnormal exits.
    #[instrument(skip(self))]
    pub async fn dispose(&mut self) {
        if let Some(manager) = self.active_task.take() {
            info!(target: PLAYER_LOG_TARGET, "Disposing player with active playback.");
            manager.stop_task().await;
        }
        self.state = PlaybackState::Idle;
    }

    /// Runs the player's command processing loop. This should be spawned as
    /// a Tokio task.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_player_loop(self).await;
    }
}
