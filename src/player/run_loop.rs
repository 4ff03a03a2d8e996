use super::{PlaybackState, Player, PlayerCommand, PlayerStateUpdate, PLAYER_LOG_TARGET};
use tracing::{error, info, trace, warn};

/// Runs the player's command processing loop.
pub async fn run_player_loop(player: &mut Player) {
    info!(target: PLAYER_LOG_TARGET, "Player run loop started.");

    loop {
        tokio::select! {
            biased; // Check commands first

            // --- Command Processing ---
            // Bound irrefutably: a disabled branch would leave only the
            // task-completion arm, which stays pending forever while a sound
            // loops, and the loop would never reach teardown.
            maybe_command = player.command_rx.recv() => {
                let Some(command) = maybe_command else {
                    info!(target: PLAYER_LOG_TARGET, "Command channel closed. Exiting run loop.");
                    break;
                };
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlayerCommand::Toggle(name) => {
                        if let Err(e) = player.toggle(&name).await {
                            error!(target: PLAYER_LOG_TARGET, sound = %name, "Toggle failed: {}", e);
                            // The player is idle again; tell listeners so the
                            // UI never claims a sound is playing when it is not.
                            player.broadcast_update(PlayerStateUpdate::Error(e.to_string()));
                        }
                    }
                    PlayerCommand::GetState(responder) => {
                        let _ = responder.send(player.state.clone()); // Ignore error if receiver dropped
                    }
                    PlayerCommand::Shutdown => {
                        info!(target: PLAYER_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }

            // --- Handle Playback Task Completion ---
            // A looping sound never finishes naturally, so the task handle
            // completing here means playback broke down (device error, decode
            // error, panic). Clear the state so it matches reality.
            res = async { player.active_task.as_mut().unwrap().handle().await }, if player.active_task.is_some() => {
                let finished_task = player.active_task.take().unwrap();
                if let Err(e) = res {
                    error!(target: PLAYER_LOG_TARGET, sound = %finished_task.sound_name(), "Playback task panicked: {:?}", e);
                } else {
                    warn!(target: PLAYER_LOG_TARGET, sound = %finished_task.sound_name(), "Playback task stopped unexpectedly. Clearing state.");
                }
                player.state = PlaybackState::Idle;
                player.broadcast_update(PlayerStateUpdate::Stopped);
            }
        }
    }

    info!(target: PLAYER_LOG_TARGET, "Player run loop finished. Performing final cleanup.");
    // Disposal runs on every exit path so no handle outlives the player.
    player.dispose().await;
    player.broadcast_update(PlayerStateUpdate::Stopped);
    info!(target: PLAYER_LOG_TARGET, "Player task cleanup complete.");
}
