use std::error::Error;
use std::io;
use symphonia::core::errors::Error as SymphoniaError;

/// Error types specific to audio playback.
#[derive(Debug)]
pub enum AudioError {
    /// The sound source could not be acquired or started (missing file,
    /// unsupported codec, dead audio engine). The controller surfaces this
    /// to its caller and resets to idle.
    LoadFailure(String),
    AlsaError(String),
    DecodingError(String),
    SymphoniaError(SymphoniaError),
    IoError(io::Error),
    InvalidState(String),
    UnsupportedFormat(String),
    MissingCodecParams(&'static str),
    TaskJoinError(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::LoadFailure(e) => write!(f, "Failed to load sound: {}", e),
            AudioError::AlsaError(e) => write!(f, "ALSA error: {}", e),
            AudioError::DecodingError(e) => write!(f, "Decoding error: {}", e),
            AudioError::SymphoniaError(e) => write!(f, "Symphonia error: {}", e),
            AudioError::IoError(e) => write!(f, "I/O error: {}", e),
            AudioError::InvalidState(s) => write!(f, "Invalid state: {}", s),
            AudioError::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            AudioError::MissingCodecParams(s) => write!(f, "Missing codec parameters: {}", s),
            AudioError::TaskJoinError(e) => write!(f, "Async task join error: {}", e),
        }
    }
}

impl Error for AudioError {}

impl AudioError {
    /// True for errors raised while acquiring a sound source, i.e. the cases
    /// where `toggle` must leave the controller idle with no handle held.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, AudioError::LoadFailure(_))
    }
}

// --- From Implementations for AudioError ---

impl From<alsa::Error> for AudioError {
    fn from(e: alsa::Error) -> Self {
        AudioError::AlsaError(e.to_string())
    }
}

impl From<SymphoniaError> for AudioError {
    fn from(e: SymphoniaError) -> Self {
        AudioError::SymphoniaError(e)
    }
}

impl From<io::Error> for AudioError {
    fn from(e: io::Error) -> Self {
        AudioError::IoError(e)
    }
}

impl From<tokio::task::JoinError> for AudioError {
    fn from(e: tokio::task::JoinError) -> Self {
        AudioError::TaskJoinError(e.to_string())
    }
}
