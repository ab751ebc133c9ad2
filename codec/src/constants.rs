//! Constants exported to hosts.
//!
//! The `OPUS_*` values pass through from `opus_defines.h`. The sizing
//! constants are defined by this crate.

// Return codes
pub const OPUS_OK: i32 = 0;
pub const OPUS_BAD_ARG: i32 = -1;
pub const OPUS_BUFFER_TOO_SMALL: i32 = -2;
pub const OPUS_INTERNAL_ERROR: i32 = -3;
pub const OPUS_INVALID_PACKET: i32 = -4;
pub const OPUS_UNIMPLEMENTED: i32 = -5;
pub const OPUS_INVALID_STATE: i32 = -6;
pub const OPUS_ALLOC_FAIL: i32 = -7;

// Sentinels
pub const OPUS_AUTO: i32 = -1000;
pub const OPUS_BITRATE_MAX: i32 = -1;

// Application types
pub const OPUS_APPLICATION_VOIP: i32 = 2048;
pub const OPUS_APPLICATION_AUDIO: i32 = 2049;
pub const OPUS_APPLICATION_RESTRICTED_LOWDELAY: i32 = 2051;

// Signal types
pub const OPUS_SIGNAL_VOICE: i32 = 3001;
pub const OPUS_SIGNAL_MUSIC: i32 = 3002;

// CTL request codes
pub const OPUS_SET_BITRATE_REQUEST: i32 = 4002;
pub const OPUS_GET_BITRATE_REQUEST: i32 = 4003;
pub const OPUS_SET_COMPLEXITY_REQUEST: i32 = 4010;
pub const OPUS_GET_COMPLEXITY_REQUEST: i32 = 4011;
pub const OPUS_SET_SIGNAL_REQUEST: i32 = 4024;
pub const OPUS_GET_SIGNAL_REQUEST: i32 = 4025;
pub const OPUS_SET_GAIN_REQUEST: i32 = 4034;
pub const OPUS_GET_GAIN_REQUEST: i32 = 4045;

/// Smallest frame per channel: 2.5 ms at 8 kHz.
pub const MIN_FRAME_SIZE: usize = 20;

/// Largest frame per channel: 60 ms at 48 kHz.
pub const MAX_FRAME_SIZE: usize = 2880;

/// `MAX_FRAME_SIZE * 2` channels.
pub const MAX_PACKET_SIZE: usize = MAX_FRAME_SIZE * 2;

/// Upper bound on the output buffer handed to the encoder. A single Opus
/// packet never exceeds 48 frames of 1275 bytes plus framing.
pub const MAX_PACKET_CAPACITY: usize = 64 * 1024;

/// Longest frame libopus decodes into one call: 120 ms at 48 kHz.
pub const MAX_DECODE_FRAME_SIZE: usize = 5760;

/// Bytes per 16-bit PCM sample.
pub const INT16_BYTES: usize = 2;

/// Sample rates libopus accepts.
pub const VALID_SAMPLE_RATES: [i32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Frame durations the stream adapters accept, in milliseconds.
pub const VALID_FRAME_DURATIONS_MS: [i32; 5] = [5, 10, 20, 40, 60];

/// Frame duration used when none is configured.
pub const DEFAULT_FRAME_DURATION_MS: i32 = 60;
