use crate::audio::{
    alsa_handler::AlsaPcmHandler,
    decoder::SoundDecoder,
    error::AudioError,
    loop_runner::{PlaybackLoopExitReason, PlaybackLoopRunner},
};
use crate::catalog::SoundItem;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task;
use tracing::{debug, info, instrument};

const LOG_TARGET: &str = "sonocli::audio::playback";

/// Trait defining how the player acquires playback resources for a sound.
///
/// `prepare` is the single fallible step of starting a sound: it acquires
/// the decoder for the item's source. Everything after a successful prepare
/// is best-effort and must not leave resources behind on failure.
#[async_trait]
pub trait SoundBackend: Send + Sync {
    async fn prepare(&self, item: &SoundItem) -> Result<Box<dyn PreparedSound>, AudioError>;
}

/// A fully acquired sound, ready to loop until told to stop.
#[async_trait]
pub trait PreparedSound: Send {
    /// Drives looped playback until `shutdown_rx` fires. A clean shutdown is
    /// not an error; anything else returned here means playback broke down.
    async fn run(self: Box<Self>, shutdown_rx: broadcast::Receiver<()>) -> Result<(), AudioError>;
}

/// Backend that decodes local files with Symphonia and plays them through
/// ALSA, looping indefinitely.
pub struct AlsaBackend {
    device_name: String,
}

impl AlsaBackend {
    pub fn new(device_name: &str) -> Self {
        AlsaBackend {
            device_name: device_name.to_string(),
        }
    }
}

#[async_trait]
impl SoundBackend for AlsaBackend {
    #[instrument(skip(self, item), fields(sound = %item.name))]
    async fn prepare(&self, item: &SoundItem) -> Result<Box<dyn PreparedSound>, AudioError> {
        info!(target: LOG_TARGET, "Preparing sound '{}' from {}", item.name, item.path.display());

        // Probing the container involves file I/O, so keep it off the
        // async worker threads.
        let path = item.path.clone();
        let decoder = task::spawn_blocking(move || SoundDecoder::open(&path)).await??;

        Ok(Box::new(PreparedAlsaSound {
            decoder,
            device_name: self.device_name.clone(),
        }))
    }
}

struct PreparedAlsaSound {
    decoder: SoundDecoder,
    device_name: String,
}

#[async_trait]
impl PreparedSound for PreparedAlsaSound {
    async fn run(self: Box<Self>, shutdown_rx: broadcast::Receiver<()>) -> Result<(), AudioError> {
        // The handler lives only as long as this run; dropping it closes the
        // PCM device on every exit path.
        let alsa_handler = Arc::new(Mutex::new(AlsaPcmHandler::new(&self.device_name)));
        let runner = PlaybackLoopRunner::new(self.decoder, Arc::clone(&alsa_handler), shutdown_rx);

        let exit = runner.run().await?;
        debug!(target: LOG_TARGET, "Playback loop exited: {:?}", exit);
        match exit {
            PlaybackLoopExitReason::ShutdownSignal => Ok(()),
        }
    }
}
