//! Audio engine: Symphonia decoding and looped ALSA playback.

mod alsa_handler;
mod decoder;
pub mod error;
mod loop_runner;
mod playback;
mod sample_converter;

pub use error::AudioError;
pub use playback::{AlsaBackend, PreparedSound, SoundBackend};
