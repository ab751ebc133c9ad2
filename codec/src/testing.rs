//! Scripted codec library for unit tests.
//!
//! Mimics the argument checks and error codes of libopus closely enough to
//! drive the session code, and counts handle creations and destructions.
//! Packets are `[channels, frame_size lo, frame_size hi, checksum]`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::constants::*;
use crate::library::{CodecLibrary, Ctl};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub encoders_created: usize,
    pub encoders_destroyed: usize,
    pub decoders_created: usize,
    pub decoders_destroyed: usize,
    pub create_attempts: usize,
    pub encode_calls: usize,
    /// 1-based `encode` call that reports an internal error.
    pub fail_encode_call: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedOpus {
    counters: Arc<Mutex<Counters>>,
}

#[derive(Debug)]
pub(crate) struct FakeEncoder {
    sample_rate: i32,
    channels: usize,
    bitrate: i32,
    complexity: i32,
    signal: i32,
}

#[derive(Debug)]
pub(crate) struct FakeDecoder {
    channels: usize,
    gain: i32,
}

fn valid_layout(sample_rate: i32, channels: i32) -> bool {
    VALID_SAMPLE_RATES.contains(&sample_rate) && (channels == 1 || channels == 2)
}

/// Frame sizes libopus accepts: 2.5, 5, 10, 20, 40 or 60 ms.
fn valid_frame_size(sample_rate: i32, frame_size: i32) -> bool {
    [1, 2, 4, 8, 16, 24]
        .iter()
        .any(|quarter_ms| sample_rate / 400 * quarter_ms == frame_size)
}

impl ScriptedOpus {
    pub fn counters(&self) -> parking_lot::MutexGuard<'_, Counters> {
        self.counters.lock()
    }
}

impl CodecLibrary for ScriptedOpus {
    type Encoder = FakeEncoder;
    type Decoder = FakeDecoder;

    fn encoder_create(
        &self,
        sample_rate: i32,
        channels: i32,
        application: i32,
    ) -> Result<FakeEncoder, i32> {
        let mut counters = self.counters.lock();
        counters.create_attempts += 1;
        let application_ok = [
            OPUS_APPLICATION_VOIP,
            OPUS_APPLICATION_AUDIO,
            OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        ]
        .contains(&application);
        if !valid_layout(sample_rate, channels) || !application_ok {
            return Err(OPUS_BAD_ARG);
        }
        counters.encoders_created += 1;
        Ok(FakeEncoder {
            sample_rate,
            channels: channels as usize,
            bitrate: OPUS_AUTO,
            complexity: 9,
            signal: OPUS_AUTO,
        })
    }

    fn encoder_destroy(&self, _encoder: FakeEncoder) {
        self.counters.lock().encoders_destroyed += 1;
    }

    fn encode(&self, encoder: &mut FakeEncoder, pcm: &[i16], frame_size: i32, out: &mut [u8]) -> i32 {
        {
            let mut counters = self.counters.lock();
            counters.encode_calls += 1;
            if counters.fail_encode_call == Some(counters.encode_calls) {
                return OPUS_INTERNAL_ERROR;
            }
        }
        if !valid_frame_size(encoder.sample_rate, frame_size)
            || pcm.len() < frame_size as usize * encoder.channels
        {
            return OPUS_BAD_ARG;
        }
        if out.len() < 4 {
            return OPUS_BUFFER_TOO_SMALL;
        }
        let checksum = pcm.iter().fold(0u8, |acc, s| acc.wrapping_add(*s as u8));
        let size = (frame_size as u16).to_le_bytes();
        out[..4].copy_from_slice(&[encoder.channels as u8, size[0], size[1], checksum]);
        4
    }

    fn encoder_ctl(&self, encoder: &mut FakeEncoder, ctl: Ctl<'_>) -> i32 {
        match ctl {
            Ctl::Set {
                request: OPUS_SET_BITRATE_REQUEST,
                value,
            } => {
                if value != OPUS_AUTO && value != OPUS_BITRATE_MAX && value <= 0 {
                    return OPUS_BAD_ARG;
                }
                encoder.bitrate = value;
            }
            Ctl::Set {
                request: OPUS_SET_COMPLEXITY_REQUEST,
                value,
            } => {
                if !(0..=10).contains(&value) {
                    return OPUS_BAD_ARG;
                }
                encoder.complexity = value;
            }
            Ctl::Set {
                request: OPUS_SET_SIGNAL_REQUEST,
                value,
            } => {
                if ![OPUS_AUTO, OPUS_SIGNAL_VOICE, OPUS_SIGNAL_MUSIC].contains(&value) {
                    return OPUS_BAD_ARG;
                }
                encoder.signal = value;
            }
            Ctl::Get {
                request: OPUS_GET_BITRATE_REQUEST,
                value,
            } => *value = encoder.bitrate,
            Ctl::Get {
                request: OPUS_GET_COMPLEXITY_REQUEST,
                value,
            } => *value = encoder.complexity,
            Ctl::Get {
                request: OPUS_GET_SIGNAL_REQUEST,
                value,
            } => *value = encoder.signal,
            _ => return OPUS_UNIMPLEMENTED,
        }
        OPUS_OK
    }

    fn decoder_create(&self, sample_rate: i32, channels: i32) -> Result<FakeDecoder, i32> {
        let mut counters = self.counters.lock();
        counters.create_attempts += 1;
        if !valid_layout(sample_rate, channels) {
            return Err(OPUS_BAD_ARG);
        }
        counters.decoders_created += 1;
        Ok(FakeDecoder {
            channels: channels as usize,
            gain: 0,
        })
    }

    fn decoder_destroy(&self, _decoder: FakeDecoder) {
        self.counters.lock().decoders_destroyed += 1;
    }

    fn decode(
        &self,
        decoder: &mut FakeDecoder,
        packet: &[u8],
        pcm: &mut [i16],
        frame_size: i32,
        _fec: bool,
    ) -> i32 {
        if frame_size <= 0 || pcm.len() < frame_size as usize * decoder.channels {
            return OPUS_BAD_ARG;
        }
        if packet.len() != 4 || !(1..=2).contains(&packet[0]) {
            return OPUS_INVALID_PACKET;
        }
        let samples = i32::from(u16::from_le_bytes([packet[1], packet[2]]));
        if samples > frame_size {
            return OPUS_BUFFER_TOO_SMALL;
        }
        let fill = (decoder.gain / 256) as i16;
        pcm[..samples as usize * decoder.channels].fill(fill);
        samples
    }

    fn decoder_ctl(&self, decoder: &mut FakeDecoder, ctl: Ctl<'_>) -> i32 {
        match ctl {
            Ctl::Set {
                request: OPUS_SET_GAIN_REQUEST,
                value,
            } => {
                if !(-32768..=32767).contains(&value) {
                    return OPUS_BAD_ARG;
                }
                decoder.gain = value;
            }
            Ctl::Get {
                request: OPUS_GET_GAIN_REQUEST,
                value,
            } => *value = decoder.gain,
            _ => return OPUS_UNIMPLEMENTED,
        }
        OPUS_OK
    }

    fn strerror(&self, code: i32) -> String {
        let text = match code {
            OPUS_OK => "success",
            OPUS_BAD_ARG => "invalid argument",
            OPUS_BUFFER_TOO_SMALL => "buffer too small",
            OPUS_INTERNAL_ERROR => "internal error",
            OPUS_INVALID_PACKET => "corrupted stream",
            OPUS_UNIMPLEMENTED => "request not implemented",
            OPUS_INVALID_STATE => "invalid state",
            OPUS_ALLOC_FAIL => "memory allocation failed",
            _ => "unknown error",
        };
        text.to_string()
    }
}

/// Routes `tracing` output to the test harness.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
