use crate::audio::error::AudioError;
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::i24;
use symphonia::core::units::Time;
use tracing::{debug, trace, warn};

const LOG_TARGET: &str = "sonocli::audio::decoder";

/// Result of a single decode step.
pub enum DecodeOutcome {
    /// Successfully decoded audio data as an owned buffer.
    Decoded(DecodedBuffer),
    /// End of the source reached. The caller decides whether to rewind.
    EndOfStream,
    /// A recoverable problem; the packet was skipped.
    Skipped(String),
}

/// Owned representation of a decoded buffer, one variant per sample format.
pub enum DecodedBuffer {
    U8(AudioBuffer<u8>),
    S16(AudioBuffer<i16>),
    S24(AudioBuffer<i24>),
    S32(AudioBuffer<i32>),
    F32(AudioBuffer<f32>),
    F64(AudioBuffer<f64>),
}

/// Symphonia format reader plus decoder for one local audio file.
///
/// Reads are synchronous; the playback loop that drives this runs on its own
/// spawned task, so blocking on local file I/O is acceptable there.
pub struct SoundDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: SignalSpec,
}

impl SoundDecoder {
    /// Opens a local audio file and prepares the first playable track for
    /// decoding. All failures here are load failures: the sound could not be
    /// acquired, so no resource is held afterwards.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        debug!(target: LOG_TARGET, "Opening sound source: {}", path.display());

        let file = File::open(path)
            .map_err(|e| AudioError::LoadFailure(format!("{}: {}", path.display(), e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| AudioError::LoadFailure(format!("{}: {}", path.display(), e)))?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::LoadFailure(format!("{}: no playable audio track", path.display())))?
            .clone();

        debug!(target: LOG_TARGET, "Found suitable audio track: ID={}, Codec={:?}", track.id, track.codec_params.codec);

        let decoder_opts = DecoderOptions::default();
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &decoder_opts)
            .map_err(|e| AudioError::LoadFailure(format!("{}: {}", path.display(), e)))?;

        let spec = SignalSpec::new(
            track.codec_params.sample_rate.ok_or(AudioError::MissingCodecParams("sample rate"))?,
            track.codec_params.channels.ok_or(AudioError::MissingCodecParams("channels map"))?,
        );

        debug!(target: LOG_TARGET, "Decoder ready. Spec: rate={}, channels={}", spec.rate, spec.channels.count());

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            spec,
        })
    }

    /// The signal specification of the decoded track.
    pub fn spec(&self) -> SignalSpec {
        self.spec
    }

    /// Decodes the next audio frame, skipping packets of other tracks and
    /// recoverable decode errors.
    pub fn decode_next(&mut self) -> Result<DecodeOutcome, AudioError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref io_err))
                    if io_err.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    trace!(target: LOG_TARGET, "End of stream reached.");
                    return Ok(DecodeOutcome::EndOfStream);
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!(target: LOG_TARGET, "Stream discontinuity (ResetRequired), skipping.");
                    self.decoder.reset();
                    return Ok(DecodeOutcome::Skipped("Stream discontinuity (ResetRequired)".to_string()));
                }
                Err(e) => return Err(AudioError::SymphoniaError(e)),
            };

            if packet.track_id() != self.track_id {
                trace!(target: LOG_TARGET, "Skipping packet for track {}", packet.track_id());
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(audio_buf_ref) => {
                    if audio_buf_ref.spec() != &self.spec {
                        warn!(
                            target: LOG_TARGET,
                            "Audio specification changed mid-stream. Expected: {:?}, Got: {:?}.",
                            self.spec, audio_buf_ref.spec()
                        );
                        return Err(AudioError::UnsupportedFormat("Dynamic spec change".to_string()));
                    }

                    // Convert the borrowed buffer into an owned enum variant.
                    let owned = match audio_buf_ref {
                        AudioBufferRef::U8(buf) => DecodedBuffer::U8(buf.into_owned()),
                        AudioBufferRef::S16(buf) => DecodedBuffer::S16(buf.into_owned()),
                        AudioBufferRef::S24(buf) => DecodedBuffer::S24(buf.into_owned()),
                        AudioBufferRef::S32(buf) => DecodedBuffer::S32(buf.into_owned()),
                        AudioBufferRef::F32(buf) => DecodedBuffer::F32(buf.into_owned()),
                        AudioBufferRef::F64(buf) => DecodedBuffer::F64(buf.into_owned()),
                        _ => {
                            return Err(AudioError::UnsupportedFormat(
                                "Unsupported decoded buffer variant".to_string(),
                            ));
                        }
                    };
                    return Ok(DecodeOutcome::Decoded(owned));
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    warn!(target: LOG_TARGET, "Symphonia decode error (skipping packet): {}", err);
                    return Ok(DecodeOutcome::Skipped(err.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Seeks back to the start of the track and resets the decoder. This is
    /// what makes looped playback possible without re-probing the file.
    pub fn rewind(&mut self) -> Result<(), AudioError> {
        trace!(target: LOG_TARGET, "Rewinding to start of track {}.", self.track_id);
        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::default(),
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| AudioError::DecodingError(format!("Rewind failed: {}", e)))?;
        self.decoder.reset();
        Ok(())
    }
}
