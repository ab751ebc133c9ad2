//! Opus decoder session.

use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::constants::{
    INT16_BYTES, MAX_DECODE_FRAME_SIZE, OPUS_GET_GAIN_REQUEST, OPUS_OK, OPUS_SET_GAIN_REQUEST,
};
use crate::error::{Error, Operation, Parameter, Result, SessionKind};
use crate::library::{CodecLibrary, Ctl};
use crate::lifecycle::{Lifecycle, Realization};

/// A decoder bound to one sample rate, channel count and frame size.
///
/// Like [`EncoderSession`](crate::EncoderSession), the libopus decoder is
/// created on first use.
pub struct DecoderSession<L: CodecLibrary> {
    lib: L,
    config: DecoderConfig,
    state: Lifecycle<L::Decoder>,
}

#[cfg(feature = "libopus")]
impl DecoderSession<crate::Libopus> {
    /// Creates a session backed by the system libopus.
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_library(crate::Libopus, config)
    }
}

impl<L: CodecLibrary> DecoderSession<L> {
    /// Creates a session that reaches the codec through `lib`.
    pub fn with_library(lib: L, config: DecoderConfig) -> Self {
        Self {
            lib,
            config,
            state: Lifecycle::Unrealized,
        }
    }

    /// Returns the configuration the session was created with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns true if the libopus decoder currently exists.
    pub fn is_realized(&self) -> bool {
        self.state.is_realized()
    }

    /// Returns true once [`DecoderSession::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.state.is_destroyed()
    }

    /// Creates the libopus decoder if it does not exist yet.
    pub fn ensure_realized(&mut self) -> Realization {
        let Self { lib, config, state } = self;
        state.ensure(SessionKind::Decoder, || create(&*lib, &*config))
    }

    fn realize(&mut self) -> Result<(&L, &mut L::Decoder)> {
        let Self { lib, config, state } = self;
        let handle = state.get_or_create(SessionKind::Decoder, || create(&*lib, &*config))?;
        Ok((&*lib, handle))
    }

    /// Decodes one packet into interleaved little-endian 16-bit PCM.
    ///
    /// The output holds `decoded_samples * 2 * channels` bytes, at most one
    /// configured frame.
    pub fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        let samples = self.decode_samples(packet)?;
        let mut pcm = Vec::with_capacity(samples.len() * INT16_BYTES);
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
        Ok(pcm)
    }

    /// Decodes one packet into interleaved samples.
    ///
    /// Frame sizes above [`MAX_DECODE_FRAME_SIZE`] are clamped to it, since no
    /// packet decodes to more.
    pub fn decode_samples(&mut self, packet: &[u8]) -> Result<Vec<i16>> {
        let channels = usize::try_from(self.config.channels).unwrap_or(1).max(1);
        let frame_size = self.config.frame_size().min(MAX_DECODE_FRAME_SIZE as i32);
        let (lib, handle) = self.realize()?;

        trace!(len = packet.len(), frame_size, "opus: decode");
        let capacity = usize::try_from(frame_size).unwrap_or(0) * channels;
        let mut pcm = vec![0i16; capacity];
        let n = lib.decode(handle, packet, &mut pcm, frame_size, false);
        if n < 0 {
            return Err(Error::Codec {
                operation: Operation::Decode,
                reason: lib.strerror(n),
            });
        }

        pcm.truncate(n as usize * channels);
        trace!(samples = n, "opus: decoded");
        Ok(pcm)
    }

    /// Sets the output gain in Q8 dB (1/256 dB units).
    pub fn set_gain(&mut self, gain: i32) -> Result<()> {
        let (lib, handle) = self.realize()?;
        let ret = lib.decoder_ctl(
            handle,
            Ctl::Set {
                request: OPUS_SET_GAIN_REQUEST,
                value: gain,
            },
        );
        if ret != OPUS_OK {
            debug!(gain, "opus: decoder rejected gain: {}", lib.strerror(ret));
            return Err(Error::InvalidParameter(Parameter::Gain));
        }
        Ok(())
    }

    /// Returns the output gain in Q8 dB.
    pub fn gain(&mut self) -> Result<i32> {
        let (lib, handle) = self.realize()?;
        let mut gain = 0;
        let ret = lib.decoder_ctl(
            handle,
            Ctl::Get {
                request: OPUS_GET_GAIN_REQUEST,
                value: &mut gain,
            },
        );
        if ret != OPUS_OK {
            return Err(Error::Codec {
                operation: Operation::Get(Parameter::Gain),
                reason: lib.strerror(ret),
            });
        }
        Ok(gain)
    }

    /// Releases the libopus decoder. Later calls fail with [`Error::Closed`].
    pub fn close(&mut self) {
        if let Some(handle) = self.state.release() {
            debug!("opus: destroying decoder");
            self.lib.decoder_destroy(handle);
        }
    }
}

impl<L: CodecLibrary> Drop for DecoderSession<L> {
    fn drop(&mut self) {
        self.close();
    }
}

fn create<L: CodecLibrary>(lib: &L, config: &DecoderConfig) -> Result<L::Decoder> {
    match lib.decoder_create(config.sample_rate, config.channels) {
        Ok(handle) => {
            debug!(
                sample_rate = config.sample_rate,
                channels = config.channels,
                frame_size = config.frame_size(),
                "opus: decoder created"
            );
            Ok(handle)
        }
        Err(code) => {
            let reason = lib.strerror(code);
            warn!(
                sample_rate = config.sample_rate,
                channels = config.channels,
                "opus: decoder create failed: {}",
                reason
            );
            Err(Error::Construction {
                kind: SessionKind::Decoder,
                reason,
            })
        }
    }
}
