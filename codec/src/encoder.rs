//! Opus encoder session.

use tracing::{debug, trace, warn};

use crate::config::{Bitrate, EncoderConfig, Signal};
use crate::constants::{
    INT16_BYTES, MAX_PACKET_CAPACITY, MAX_PACKET_SIZE, OPUS_GET_BITRATE_REQUEST,
    OPUS_GET_COMPLEXITY_REQUEST, OPUS_GET_SIGNAL_REQUEST, OPUS_OK, OPUS_SET_BITRATE_REQUEST,
    OPUS_SET_COMPLEXITY_REQUEST, OPUS_SET_SIGNAL_REQUEST,
};
use crate::error::{Error, Operation, Parameter, Result, SessionKind};
use crate::library::{CodecLibrary, Ctl};
use crate::lifecycle::{Lifecycle, Realization};

/// An encoder bound to one sample rate, channel count and application.
///
/// The libopus encoder is created on first use, so construction never fails.
/// Bad parameters are reported by the first call that needs the encoder,
/// and every later call tries again.
pub struct EncoderSession<L: CodecLibrary> {
    lib: L,
    config: EncoderConfig,
    state: Lifecycle<L::Encoder>,
}

#[cfg(feature = "libopus")]
impl EncoderSession<crate::Libopus> {
    /// Creates a session backed by the system libopus.
    pub fn new(config: EncoderConfig) -> Self {
        Self::with_library(crate::Libopus, config)
    }
}

impl<L: CodecLibrary> EncoderSession<L> {
    /// Creates a session that reaches the codec through `lib`.
    ///
    /// Nothing is validated here; see [`EncoderSession::ensure_realized`].
    pub fn with_library(lib: L, config: EncoderConfig) -> Self {
        Self {
            lib,
            config,
            state: Lifecycle::Unrealized,
        }
    }

    /// Returns the configuration the session was created with.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Returns true if the libopus encoder currently exists.
    pub fn is_realized(&self) -> bool {
        self.state.is_realized()
    }

    /// Returns true once [`EncoderSession::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.state.is_destroyed()
    }

    /// Creates the libopus encoder if it does not exist yet.
    pub fn ensure_realized(&mut self) -> Realization {
        let Self { lib, config, state } = self;
        state.ensure(SessionKind::Encoder, || create(&*lib, &*config))
    }

    fn realize(&mut self) -> Result<(&L, &mut L::Encoder)> {
        let Self { lib, config, state } = self;
        let handle = state.get_or_create(SessionKind::Encoder, || create(&*lib, &*config))?;
        Ok((&*lib, handle))
    }

    /// Encodes one frame of interleaved little-endian 16-bit PCM.
    ///
    /// The frame size is `pcm.len() / 2 / channels` samples per channel. Bytes
    /// past the last whole sample group are ignored. `max_packet_size`
    /// defaults to [`MAX_PACKET_SIZE`] and is capped at [`MAX_PACKET_CAPACITY`].
    pub fn encode(&mut self, pcm: &[u8], max_packet_size: Option<usize>) -> Result<Vec<u8>> {
        let channels = self.channel_count();
        let frame_size = pcm.len() / INT16_BYTES / channels;
        let samples: Vec<i16> = pcm
            .chunks_exact(INT16_BYTES)
            .take(frame_size * channels)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        self.encode_frame(&samples, frame_size, max_packet_size)
    }

    /// Encodes one frame of interleaved samples. Trailing samples that do not
    /// fill a whole group of `channels` are ignored.
    pub fn encode_samples(&mut self, pcm: &[i16], max_packet_size: Option<usize>) -> Result<Vec<u8>> {
        let channels = self.channel_count();
        let frame_size = pcm.len() / channels;
        self.encode_frame(&pcm[..frame_size * channels], frame_size, max_packet_size)
    }

    fn encode_frame(
        &mut self,
        pcm: &[i16],
        frame_size: usize,
        max_packet_size: Option<usize>,
    ) -> Result<Vec<u8>> {
        let (lib, handle) = self.realize()?;

        let capacity = max_packet_size
            .unwrap_or(MAX_PACKET_SIZE)
            .min(MAX_PACKET_CAPACITY);
        trace!(frame_size, capacity, "opus: encode");

        let mut packet = vec![0u8; capacity];
        let frame_size = i32::try_from(frame_size).unwrap_or(i32::MAX);
        let n = lib.encode(handle, pcm, frame_size, &mut packet);
        if n < 0 {
            return Err(Error::Codec {
                operation: Operation::Encode,
                reason: lib.strerror(n),
            });
        }

        packet.truncate(n as usize);
        trace!(len = n, "opus: encoded");
        Ok(packet)
    }

    /// Sets the target bitrate.
    pub fn set_bitrate(&mut self, bitrate: impl Into<Bitrate>) -> Result<()> {
        let bitrate = bitrate.into();
        self.set_ctl(Parameter::Bitrate, OPUS_SET_BITRATE_REQUEST, bitrate.to_raw())
    }

    /// Returns the bitrate the encoder is currently using.
    pub fn bitrate(&mut self) -> Result<Bitrate> {
        self.get_ctl(Parameter::Bitrate, OPUS_GET_BITRATE_REQUEST)
            .map(Bitrate::from_raw)
    }

    /// Sets the encoder complexity (0-10).
    pub fn set_complexity(&mut self, complexity: i32) -> Result<()> {
        self.set_ctl(Parameter::Complexity, OPUS_SET_COMPLEXITY_REQUEST, complexity)
    }

    /// Returns the current encoder complexity.
    pub fn complexity(&mut self) -> Result<i32> {
        self.get_ctl(Parameter::Complexity, OPUS_GET_COMPLEXITY_REQUEST)
    }

    /// Sets the signal type hint.
    pub fn set_signal(&mut self, signal: Signal) -> Result<()> {
        self.set_ctl(Parameter::Signal, OPUS_SET_SIGNAL_REQUEST, signal.to_raw())
    }

    /// Returns the signal type hint in effect.
    pub fn signal(&mut self) -> Result<Signal> {
        let raw = self.get_ctl(Parameter::Signal, OPUS_GET_SIGNAL_REQUEST)?;
        Signal::from_raw(raw).ok_or_else(|| Error::Codec {
            operation: Operation::Get(Parameter::Signal),
            reason: format!("unexpected signal type {}", raw),
        })
    }

    /// Releases the libopus encoder. Later calls fail with [`Error::Closed`].
    pub fn close(&mut self) {
        if let Some(handle) = self.state.release() {
            debug!("opus: destroying encoder");
            self.lib.encoder_destroy(handle);
        }
    }

    fn set_ctl(&mut self, parameter: Parameter, request: i32, value: i32) -> Result<()> {
        let (lib, handle) = self.realize()?;
        let ret = lib.encoder_ctl(handle, Ctl::Set { request, value });
        if ret != OPUS_OK {
            debug!(%parameter, value, "opus: encoder rejected {}", lib.strerror(ret));
            return Err(Error::InvalidParameter(parameter));
        }
        Ok(())
    }

    fn get_ctl(&mut self, parameter: Parameter, request: i32) -> Result<i32> {
        let (lib, handle) = self.realize()?;
        let mut value = 0;
        let ret = lib.encoder_ctl(handle, Ctl::Get { request, value: &mut value });
        if ret != OPUS_OK {
            return Err(Error::Codec {
                operation: Operation::Get(parameter),
                reason: lib.strerror(ret),
            });
        }
        Ok(value)
    }

    fn channel_count(&self) -> usize {
        usize::try_from(self.config.channels).unwrap_or(1).max(1)
    }
}

impl<L: CodecLibrary> Drop for EncoderSession<L> {
    fn drop(&mut self) {
        self.close();
    }
}

fn create<L: CodecLibrary>(lib: &L, config: &EncoderConfig) -> Result<L::Encoder> {
    let application = config.application.to_raw();
    lib.encoder_create(config.sample_rate, config.channels, application)
        .map_err(|code| {
            let reason = lib.strerror(code);
            warn!(
                sample_rate = config.sample_rate,
                channels = config.channels,
                application,
                "opus: encoder create failed: {}",
                reason
            );
            Error::Construction {
                kind: SessionKind::Encoder,
                reason,
            }
        })
        .inspect(|_| {
            debug!(
                sample_rate = config.sample_rate,
                channels = config.channels,
                application,
                "opus: encoder created"
            );
        })
}
