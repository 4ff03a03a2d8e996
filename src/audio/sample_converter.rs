use crate::audio::error::AudioError;
use std::any::TypeId;
use symphonia::core::audio::AudioBuffer;
use symphonia::core::audio::Signal;
use symphonia::core::sample::{i24, Sample};
use tracing::{trace, warn};

const LOG_TARGET: &str = "sonocli::audio::sample_converter";

/// Converts a generic Symphonia AudioBuffer into an interleaved S16LE Vec.
pub fn convert_buffer_to_s16<S: Sample + 'static>(
    audio_buffer: AudioBuffer<S>,
) -> Result<Vec<i16>, AudioError> {
    let spec = audio_buffer.spec();
    let num_frames = audio_buffer.frames();
    let num_channels = spec.channels.count();
    let mut s16_vec = vec![0i16; num_frames * num_channels];

    let type_id_s = TypeId::of::<S>();
    let planes_data = audio_buffer.planes();
    let channel_planes = planes_data.planes();

    trace!(target: LOG_TARGET, "Converting buffer ({} frames, {} channels, type: {:?}) to S16LE", num_frames, num_channels, type_id_s);

    if type_id_s == TypeId::of::<i16>() {
        if num_channels == 1 {
            let plane_s16 = unsafe { std::slice::from_raw_parts(channel_planes[0].as_ptr() as *const i16, num_frames) };
            s16_vec.copy_from_slice(plane_s16);
        } else {
            for frame in 0..num_frames {
                for ch in 0..num_channels {
                    let sample_s16 = unsafe { *(channel_planes[ch].as_ptr() as *const i16).add(frame) };
                    s16_vec[frame * num_channels + ch] = sample_s16;
                }
            }
        }
    } else if type_id_s == TypeId::of::<u8>() {
        if num_channels == 1 {
            let plane_u8 = unsafe { std::slice::from_raw_parts(channel_planes[0].as_ptr() as *const u8, num_frames) };
            for frame in 0..num_frames {
                s16_vec[frame] = ((plane_u8[frame] as i16 - 128) * 256) as i16;
            }
        } else {
            for frame in 0..num_frames {
                for ch in 0..num_channels {
                    let sample_u8 = unsafe { *(channel_planes[ch].as_ptr() as *const u8).add(frame) };
                    s16_vec[frame * num_channels + ch] = ((sample_u8 as i16 - 128) * 256) as i16;
                }
            }
        }
    } else if type_id_s == TypeId::of::<i32>() {
        // S32, or S24 packed in i32. Convert to S16 by right-shifting.
        if num_channels == 1 {
            let plane_i32 = unsafe { std::slice::from_raw_parts(channel_planes[0].as_ptr() as *const i32, num_frames) };
            for frame in 0..num_frames {
                s16_vec[frame] = (plane_i32[frame] >> 16) as i16;
            }
        } else {
            for frame in 0..num_frames {
                for ch in 0..num_channels {
                    let sample_i32 = unsafe { *(channel_planes[ch].as_ptr() as *const i32).add(frame) };
                    s16_vec[frame * num_channels + ch] = (sample_i32 >> 16) as i16;
                }
            }
        }
    } else if type_id_s == TypeId::of::<i24>() {
        // True 24-bit samples. Drop the low 8 bits to reach S16 range.
        for frame in 0..num_frames {
            for ch in 0..num_channels {
                let sample_i24 = unsafe { *(channel_planes[ch].as_ptr() as *const i24).add(frame) };
                s16_vec[frame * num_channels + ch] = (sample_i24.inner() >> 8) as i16;
            }
        }
    } else if type_id_s == TypeId::of::<f32>() {
        if num_channels == 1 {
            let plane_f32 = unsafe { std::slice::from_raw_parts(channel_planes[0].as_ptr() as *const f32, num_frames) };
            for frame in 0..num_frames {
                s16_vec[frame] = (plane_f32[frame] * 32767.0).clamp(-32768.0, 32767.0) as i16;
            }
        } else {
            for frame in 0..num_frames {
                for ch in 0..num_channels {
                    let sample_f32 = unsafe { *(channel_planes[ch].as_ptr() as *const f32).add(frame) };
                    s16_vec[frame * num_channels + ch] = (sample_f32 * 32767.0).clamp(-32768.0, 32767.0) as i16;
                }
            }
        }
    } else if type_id_s == TypeId::of::<f64>() {
        if num_channels == 1 {
            let plane_f64 = unsafe { std::slice::from_raw_parts(channel_planes[0].as_ptr() as *const f64, num_frames) };
            for frame in 0..num_frames {
                s16_vec[frame] = (plane_f64[frame] * 32767.0).clamp(-32768.0, 32767.0) as i16;
            }
        } else {
            for frame in 0..num_frames {
                for ch in 0..num_channels {
                    let sample_f64 = unsafe { *(channel_planes[ch].as_ptr() as *const f64).add(frame) };
                    s16_vec[frame * num_channels + ch] = (sample_f64 * 32767.0).clamp(-32768.0, 32767.0) as i16;
                }
            }
        }
    } else {
        warn!(target: LOG_TARGET, "Unsupported sample type {:?} for direct S16 conversion.", TypeId::of::<S>());
        return Err(AudioError::UnsupportedFormat("Cannot convert decoded format to S16".to_string()));
    }

    Ok(s16_vec)
}
