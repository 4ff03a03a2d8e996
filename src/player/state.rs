use tokio::sync::oneshot;

/// Playback state of the player: either nothing plays, or exactly one named
/// sound does. Mutated only by `Player::toggle` and teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing(String),
}

impl PlaybackState {
    /// Name of the currently playing sound, if any.
    pub fn playing_name(&self) -> Option<&str> {
        match self {
            PlaybackState::Playing(name) => Some(name),
            PlaybackState::Idle => None,
        }
    }
}

/// Commands that can be sent to the Player task.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Start, stop, or switch: compares the named sound against the one
    /// currently playing.
    Toggle(String),
    GetState(oneshot::Sender<PlaybackState>),
    Shutdown,
}

/// Updates broadcast by the Player task about its state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStateUpdate {
    Playing(String),
    Stopped,
    Error(String),
}
