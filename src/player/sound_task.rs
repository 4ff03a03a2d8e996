use crate::audio::PreparedSound;
use crate::player::PLAYER_LOG_TARGET;
use std::time::Duration as StdDuration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace};

/// Manages the task driving one looping sound. This is the single live
/// playback handle: holding a `SoundTaskManager` means a sound is playing,
/// dropping it through `stop_task` means it is fully stopped and released.
#[derive(Debug)]
pub struct SoundTaskManager {
    task_handle: JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
    sound_name: String,
}

impl SoundTaskManager {
    /// Sends the shutdown signal to the managed task.
    fn signal_shutdown(&mut self) {
        debug!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Sending shutdown signal to playback task.");
        // Ignore send errors: the task may have already exited on its own.
        if let Err(e) = self.shutdown_tx.send(()) {
            trace!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Failed to send shutdown signal (receiver likely dropped): {}", e);
        }
    }

    /// Waits for the managed task to complete with a timeout.
    /// Consumes the manager instance.
    #[instrument(skip(self), fields(sound = %self.sound_name))]
    pub async fn await_completion(mut self) {
        debug!(target: PLAYER_LOG_TARGET, "Waiting for playback task to finish...");
        let timeout_duration = StdDuration::from_secs(5);

        tokio::select! {
            biased;
            result = &mut self.task_handle => {
                match result {
                    Ok(()) => {
                        info!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Playback task finished gracefully.");
                    }
                    Err(e) if e.is_panic() => {
                        error!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Playback task panicked: {:?}", e);
                    }
                    Err(e) => {
                        error!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Playback task join error: {:?}", e);
                    }
                }
            }
            _ = tokio::time::sleep(timeout_duration) => {
                error!(target: PLAYER_LOG_TARGET, sound = %self.sound_name, "Timeout waiting for playback task to finish after {:?}. Aborting task.", timeout_duration);
                self.task_handle.abort();
            }
        }
    }

    /// Stops the managed task by sending a shutdown signal and awaiting
    /// completion. Consumes the manager instance.
    #[instrument(skip(self), fields(sound = %self.sound_name))]
    pub async fn stop_task(mut self) {
        info!(target: PLAYER_LOG_TARGET, "Stopping playback task...");
        let sound_name = self.sound_name.clone();
        self.signal_shutdown();
        self.await_completion().await;
        info!(target: PLAYER_LOG_TARGET, sound = %sound_name, "Playback task stop sequence complete.");
    }

    /// Returns a mutable reference to the JoinHandle for polling in select!
    pub fn handle(&mut self) -> &mut JoinHandle<()> {
        &mut self.task_handle
    }

    /// Name of the sound this task is playing.
    pub fn sound_name(&self) -> &str {
        &self.sound_name
    }
}

/// Spawns a Tokio task that drives a prepared sound until shutdown.
#[instrument(skip(prepared), fields(sound = %sound_name))]
pub fn spawn_sound_task(prepared: Box<dyn PreparedSound>, sound_name: String) -> SoundTaskManager {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let name_for_struct = sound_name.clone();

    info!(target: PLAYER_LOG_TARGET, "Spawning playback task for sound '{}'", sound_name);
    let task_handle = tokio::spawn(async move {
        debug!(target: PLAYER_LOG_TARGET, sound = %sound_name, "[Playback Task] Started.");
        match prepared.run(shutdown_rx).await {
            Ok(()) => info!(target: PLAYER_LOG_TARGET, sound = %sound_name, "[Playback Task] Stopped cleanly."),
            Err(e) => error!(target: PLAYER_LOG_TARGET, sound = %sound_name, "[Playback Task] Playback failed: {}", e),
        }
        debug!(target: PLAYER_LOG_TARGET, sound = %sound_name, "[Playback Task] Finished.");
    });

    SoundTaskManager {
        task_handle,
        shutdown_tx,
        sound_name: name_for_struct,
    }
}
