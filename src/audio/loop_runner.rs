use crate::audio::{
    alsa_handler::AlsaPcmHandler,
    decoder::{DecodeOutcome, DecodedBuffer, SoundDecoder},
    error::AudioError,
    sample_converter,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task;
use tracing::{debug, error, info, instrument, trace, warn};

const LOG_TARGET: &str = "sonocli::audio::loop_runner";

/// Indicates why the playback loop terminated without error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlaybackLoopExitReason {
    ShutdownSignal,
}

/// Outcome of writing one decoded buffer to ALSA.
enum WriteOutcome {
    Completed,
    Shutdown,
}

/// Runs the looping playback loop for a single sound: decode, convert,
/// write to ALSA, and rewind at end of stream. Exits only on the shutdown
/// signal or a fatal error. A looping sound never finishes naturally.
pub struct PlaybackLoopRunner {
    decoder: SoundDecoder,
    alsa_handler: Arc<Mutex<AlsaPcmHandler>>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl PlaybackLoopRunner {
    pub fn new(
        decoder: SoundDecoder,
        alsa_handler: Arc<Mutex<AlsaPcmHandler>>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            decoder,
            alsa_handler,
            shutdown_rx,
        }
    }

    /// Runs the playback loop. Consumes the runner.
    #[instrument(skip(self), name = "playback_loop")]
    pub async fn run(mut self) -> Result<PlaybackLoopExitReason, AudioError> {
        info!(target: LOG_TARGET, "Starting looping playback.");

        // Initialize the output device for this sound's spec.
        let spec = self.decoder.spec();
        {
            let mut handler = self
                .alsa_handler
                .lock()
                .map_err(|e| AudioError::InvalidState(format!("ALSA handler mutex poisoned on init: {}", e)))?;
            handler.initialize(spec)?;
        }

        loop {
            // --- Shutdown Check ---
            if self.shutdown_requested() {
                info!(target: LOG_TARGET, "Shutdown signal received, exiting playback loop.");
                return Ok(PlaybackLoopExitReason::ShutdownSignal);
            }

            // --- Decode Next Frame ---
            match self.decoder.decode_next()? {
                DecodeOutcome::Decoded(buffer) => {
                    let (num_channels, s16_vec) = convert_to_s16(buffer)?;
                    if s16_vec.is_empty() {
                        trace!(target: LOG_TARGET, "Skipping empty buffer after conversion.");
                        continue;
                    }
                    match self.write_to_alsa(&s16_vec, num_channels).await? {
                        WriteOutcome::Completed => {}
                        WriteOutcome::Shutdown => {
                            info!(target: LOG_TARGET, "Shutdown requested during ALSA write, exiting playback loop.");
                            return Ok(PlaybackLoopExitReason::ShutdownSignal);
                        }
                    }
                }
                DecodeOutcome::Skipped(reason) => {
                    warn!(target: LOG_TARGET, "Decoder skipped packet: {}", reason);
                    continue;
                }
                DecodeOutcome::EndOfStream => {
                    // Infinite looping: restart from the top instead of draining.
                    debug!(target: LOG_TARGET, "End of stream, rewinding for loop.");
                    self.decoder.rewind()?;
                }
            }
        }
    }

    /// Non-blocking shutdown probe. A closed channel counts as shutdown.
    fn shutdown_requested(&mut self) -> bool {
        match self.shutdown_rx.try_recv() {
            Ok(_) | Err(broadcast::error::TryRecvError::Closed) => true,
            Err(broadcast::error::TryRecvError::Lagged(_)) => {
                warn!(target: LOG_TARGET, "Shutdown receiver lagged, treating as shutdown.");
                true
            }
            Err(broadcast::error::TryRecvError::Empty) => false,
        }
    }

    /// Writes the decoded S16LE buffer to ALSA in chunks, handling blocking
    /// writes via spawn_blocking and recovered underruns by retrying.
    async fn write_to_alsa(
        &mut self,
        s16_buffer: &[i16],
        num_channels: usize,
    ) -> Result<WriteOutcome, AudioError> {
        if s16_buffer.is_empty() || num_channels == 0 {
            return Ok(WriteOutcome::Completed);
        }

        let total_frames = s16_buffer.len() / num_channels;
        let mut offset = 0;

        while offset < total_frames {
            // Check shutdown before potentially blocking
            if self.shutdown_requested() {
                return Ok(WriteOutcome::Shutdown);
            }

            let frames_remaining = total_frames - offset;
            let chunk_frames = frames_remaining.min(4096);
            let buffer_chunk =
                s16_buffer[offset * num_channels..(offset + chunk_frames) * num_channels].to_vec();

            let handler_clone = Arc::clone(&self.alsa_handler);
            trace!(target: LOG_TARGET, "Writing {} frames to ALSA in blocking task...", chunk_frames);
            let write_result = task::spawn_blocking(move || {
                match handler_clone.lock() {
                    Ok(handler_guard) => handler_guard.write_s16_buffer(&buffer_chunk),
                    Err(poisoned) => {
                        error!(target: LOG_TARGET, "ALSA handler mutex poisoned: {}", poisoned);
                        Err(AudioError::InvalidState("ALSA handler mutex poisoned".to_string()))
                    }
                }
            })
            .await?;

            match write_result {
                Ok(0) => {
                    // Recovered underrun; retry the same chunk after a short pause.
                    warn!(target: LOG_TARGET, "ALSA underrun recovered, retrying write for the same chunk.");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    continue;
                }
                Ok(frames_written) => {
                    let actual_frames_written = frames_written.min(chunk_frames);
                    offset += actual_frames_written;
                    trace!(target: LOG_TARGET, "Wrote {} frames to ALSA (total {}/{})", actual_frames_written, offset, total_frames);
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Unrecoverable ALSA write error: {}", e);
                    return Err(e);
                }
            }
        }
        Ok(WriteOutcome::Completed)
    }
}

/// Converts any owned decoded buffer variant to interleaved S16LE, returning
/// the channel count alongside the samples.
fn convert_to_s16(buffer: DecodedBuffer) -> Result<(usize, Vec<i16>), AudioError> {
    match buffer {
        DecodedBuffer::U8(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
        DecodedBuffer::S16(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
        DecodedBuffer::S24(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
        DecodedBuffer::S32(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
        DecodedBuffer::F32(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
        DecodedBuffer::F64(buf) => {
            let nc = buf.spec().channels.count();
            Ok((nc, sample_converter::convert_buffer_to_s16(buf)?))
        }
    }
}
