//! Streaming adapters that frame arbitrary PCM chunks.
//!
//! Hosts often receive PCM in chunks that do not line up with Opus frames.
//! [`StreamEncoder`] buffers the overflow and encodes every complete frame;
//! [`StreamDecoder`] decodes one packet per push.

use tracing::debug;

use crate::config::{DecoderConfig, EncoderConfig, frame_size_for};
use crate::constants::{
    DEFAULT_FRAME_DURATION_MS, INT16_BYTES, VALID_FRAME_DURATIONS_MS, VALID_SAMPLE_RATES,
};
use crate::decoder::DecoderSession;
use crate::encoder::EncoderSession;
use crate::error::{Error, Parameter, Result};
use crate::library::CodecLibrary;

/// Fixed-duration framing for interleaved 16-bit PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFramer {
    sample_rate: i32,
    channels: i32,
    frame_duration_ms: i32,
}

impl PcmFramer {
    /// Rejects rates libopus does not support, non-positive channel counts,
    /// and durations outside [`VALID_FRAME_DURATIONS_MS`].
    pub fn new(sample_rate: i32, channels: i32, frame_duration_ms: i32) -> Result<Self> {
        if !VALID_SAMPLE_RATES.contains(&sample_rate) {
            return Err(Error::UnsupportedRate { rate: sample_rate });
        }
        if channels <= 0 {
            return Err(Error::InvalidParameter(Parameter::Channels));
        }
        if !VALID_FRAME_DURATIONS_MS.contains(&frame_duration_ms) {
            return Err(Error::InvalidParameter(Parameter::FrameDuration));
        }
        Ok(Self {
            sample_rate,
            channels,
            frame_duration_ms,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Frame duration in milliseconds.
    pub fn frame_duration_ms(&self) -> i32 {
        self.frame_duration_ms
    }

    /// Samples per channel in one frame.
    pub fn frame_size(&self) -> i32 {
        frame_size_for(self.sample_rate, self.frame_duration_ms)
    }

    /// Bytes of PCM in one frame.
    pub fn frame_bytes(&self) -> usize {
        self.frame_size() as usize * INT16_BYTES * self.channels as usize
    }
}

/// Encodes a PCM byte stream into one packet per complete frame.
pub struct StreamEncoder<L: CodecLibrary> {
    session: EncoderSession<L>,
    framer: PcmFramer,
    overflow: Vec<u8>,
    encoded: Vec<Vec<u8>>,
}

#[cfg(feature = "libopus")]
impl StreamEncoder<crate::Libopus> {
    /// Creates a stream encoder backed by the system libopus.
    pub fn new(config: EncoderConfig, frame_duration_ms: Option<i32>) -> Result<Self> {
        Self::with_library(crate::Libopus, config, frame_duration_ms)
    }
}

impl<L: CodecLibrary> StreamEncoder<L> {
    /// `frame_duration_ms` defaults to [`DEFAULT_FRAME_DURATION_MS`].
    pub fn with_library(lib: L, config: EncoderConfig, frame_duration_ms: Option<i32>) -> Result<Self> {
        let framer = PcmFramer::new(
            config.sample_rate,
            config.channels,
            frame_duration_ms.unwrap_or(DEFAULT_FRAME_DURATION_MS),
        )?;
        debug!(
            frame_size = framer.frame_size(),
            frame_bytes = framer.frame_bytes(),
            "opus: stream encoder framing"
        );
        Ok(Self {
            session: EncoderSession::with_library(lib, config),
            framer,
            overflow: Vec::new(),
            encoded: Vec::new(),
        })
    }

    /// Returns the framing in use.
    pub fn framer(&self) -> &PcmFramer {
        &self.framer
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &EncoderSession<L> {
        &self.session
    }

    /// Returns the underlying session, for controls such as bitrate.
    pub fn session_mut(&mut self) -> &mut EncoderSession<L> {
        &mut self.session
    }

    /// Bytes buffered towards the next frame.
    pub fn pending(&self) -> usize {
        self.overflow.len()
    }

    /// Appends `chunk` and encodes every complete frame, in order.
    ///
    /// If a frame fails to encode, the error is returned and the failing frame
    /// stays buffered. Packets encoded before it are held back and returned
    /// first by the next successful `push`, or by [`StreamEncoder::take_encoded`].
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.overflow.extend_from_slice(chunk);

        let frame_bytes = self.framer.frame_bytes();
        let mut packets = std::mem::take(&mut self.encoded);
        let mut consumed = 0;
        let mut result = Ok(());
        while self.overflow.len() - consumed >= frame_bytes {
            let frame = &self.overflow[consumed..consumed + frame_bytes];
            match self.session.encode(frame, None) {
                Ok(packet) => packets.push(packet),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
            consumed += frame_bytes;
        }
        self.overflow.drain(..consumed);

        match result {
            Ok(()) => Ok(packets),
            Err(err) => {
                debug!(held = packets.len(), "opus: stream encode failed: {}", err);
                self.encoded = packets;
                Err(err)
            }
        }
    }

    /// Packets encoded by a `push` that later failed.
    pub fn take_encoded(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.encoded)
    }

    /// Returns the bytes that never filled a frame and clears the buffer.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.overflow)
    }
}

/// Decodes a packet stream, one PCM buffer per packet.
pub struct StreamDecoder<L: CodecLibrary> {
    session: DecoderSession<L>,
    framer: PcmFramer,
}

#[cfg(feature = "libopus")]
impl StreamDecoder<crate::Libopus> {
    /// Creates a stream decoder backed by the system libopus.
    pub fn new(sample_rate: i32, channels: i32, frame_duration_ms: Option<i32>) -> Result<Self> {
        Self::with_library(crate::Libopus, sample_rate, channels, frame_duration_ms)
    }
}

impl<L: CodecLibrary> StreamDecoder<L> {
    /// The decoder reserves one frame of `frame_duration_ms` per packet.
    pub fn with_library(
        lib: L,
        sample_rate: i32,
        channels: i32,
        frame_duration_ms: Option<i32>,
    ) -> Result<Self> {
        let framer = PcmFramer::new(
            sample_rate,
            channels,
            frame_duration_ms.unwrap_or(DEFAULT_FRAME_DURATION_MS),
        )?;
        let config = DecoderConfig::new(sample_rate, channels).with_frame_size(framer.frame_size());
        Ok(Self {
            session: DecoderSession::with_library(lib, config),
            framer,
        })
    }

    /// Returns the framing in use.
    pub fn framer(&self) -> &PcmFramer {
        &self.framer
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &DecoderSession<L> {
        &self.session
    }

    /// Returns the underlying session, for controls such as gain.
    pub fn session_mut(&mut self) -> &mut DecoderSession<L> {
        &mut self.session
    }

    /// Decodes one packet into little-endian PCM bytes.
    pub fn push(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        self.session.decode(packet)
    }
}
