//! Integration tests for the player task
//!
//! These tests drive the spawned player loop through its command channel the
//! same way the CLI does, and observe effects through the state broadcast and
//! the instrumented backend.

use crate::test_utils::{test_catalog, CountingBackend};
use sonocli::player::{PlaybackState, Player, PlayerCommand, PlayerStateUpdate};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

async fn get_state(command_tx: &tokio::sync::mpsc::Sender<PlayerCommand>) -> PlaybackState {
    let (tx, rx) = oneshot::channel();
    command_tx
        .send(PlayerCommand::GetState(tx))
        .await
        .expect("player task alive");
    rx.await.expect("player responds to state queries")
}

fn spawn_player(
    backend: CountingBackend,
) -> (
    JoinHandle<()>,
    tokio::sync::mpsc::Sender<PlayerCommand>,
    tokio::sync::broadcast::Receiver<PlayerStateUpdate>,
) {
    let (mut player, command_tx) = Player::new(test_catalog(), Box::new(backend), 16, 16);
    let updates = player.subscribe_state_updates();
    let handle = tokio::spawn(async move {
        player.run().await;
    });
    (handle, command_tx, updates)
}

#[tokio::test]
async fn test_toggle_commands_drive_playback() {
    let (backend, probe) = CountingBackend::new();
    let (handle, command_tx, mut updates) = spawn_player(backend);

    // Start Riacho
    command_tx
        .send(PlayerCommand::Toggle("Riacho".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Playing("Riacho".to_string()));
    assert_eq!(updates.recv().await.unwrap(), PlayerStateUpdate::Playing("Riacho".to_string()));

    // Switch to Vento: the old handle is released before the new acquisition
    command_tx
        .send(PlayerCommand::Toggle("Vento".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Playing("Vento".to_string()));
    assert_eq!(updates.recv().await.unwrap(), PlayerStateUpdate::Playing("Vento".to_string()));
    assert_eq!(probe.acquires(), 2);
    assert_eq!(probe.releases(), 1);

    // Toggle Vento again: pure stop
    command_tx
        .send(PlayerCommand::Toggle("Vento".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Idle);
    assert_eq!(updates.recv().await.unwrap(), PlayerStateUpdate::Stopped);
    assert_eq!(probe.live_handles(), 0);

    command_tx.send(PlayerCommand::Shutdown).await.unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("player task exits on shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_load_failure_is_broadcast_and_leaves_idle() {
    let (backend, probe) = CountingBackend::new();
    backend.fail_for("Chuva");
    let (handle, command_tx, mut updates) = spawn_player(backend);

    command_tx
        .send(PlayerCommand::Toggle("Chuva".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Idle);
    match updates.recv().await.unwrap() {
        PlayerStateUpdate::Error(message) => assert!(message.contains("Chuva")),
        other => panic!("expected an error update, got {:?}", other),
    }
    assert_eq!(probe.acquires(), 0);

    // The player is still usable after a failed load
    command_tx
        .send(PlayerCommand::Toggle("Riacho".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Playing("Riacho".to_string()));

    command_tx.send(PlayerCommand::Shutdown).await.unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("player task exits on shutdown")
        .unwrap();
    // Shutdown released the sound that was still playing
    assert_eq!(probe.live_handles(), 0);
}

#[tokio::test]
async fn test_shutdown_while_playing_releases_resources() {
    let (backend, probe) = CountingBackend::new();
    let (handle, command_tx, mut updates) = spawn_player(backend);

    command_tx
        .send(PlayerCommand::Toggle("Riacho".to_string()))
        .await
        .unwrap();
    assert_eq!(updates.recv().await.unwrap(), PlayerStateUpdate::Playing("Riacho".to_string()));

    command_tx.send(PlayerCommand::Shutdown).await.unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("player task exits on shutdown")
        .unwrap();

    assert_eq!(probe.acquires(), 1);
    assert_eq!(probe.releases(), 1);
    // The exit path announces the stop
    assert_eq!(updates.recv().await.unwrap(), PlayerStateUpdate::Stopped);
}

#[tokio::test]
async fn test_dropping_the_command_sender_stops_the_player() {
    let (backend, probe) = CountingBackend::new();
    let (handle, command_tx, _updates) = spawn_player(backend);

    command_tx
        .send(PlayerCommand::Toggle("Vento".to_string()))
        .await
        .unwrap();
    assert_eq!(get_state(&command_tx).await, PlaybackState::Playing("Vento".to_string()));

    drop(command_tx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("player task exits when the channel closes")
        .unwrap();
    assert_eq!(probe.live_handles(), 0);
}
