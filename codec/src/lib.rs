//! Lazily realized Opus encoder and decoder sessions.
//!
//! This crate sits between a host runtime and libopus. A host creates
//! sessions, pushes PCM frames or packets through them and tunes codec
//! parameters, while the crate takes care of:
//!
//! - `encoder` / `decoder`: sessions that create their libopus instance on
//!   first use and release it exactly once
//! - `config`: session configuration and typed codec parameters
//! - `shared`: sessions that can be called from several threads
//! - `stream`: framing of arbitrary PCM chunks into fixed-duration frames
//! - `constants`: values exported to hosts
//!
//! libopus itself is reached through the [`CodecLibrary`] trait. The
//! `libopus` feature links the system library and provides `Libopus`; the
//! example below runs only when it is enabled.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "libopus")]
//! # fn main() -> opusbridge_codec::Result<()> {
//! use opusbridge_codec::{Bitrate, DecoderConfig, DecoderSession, EncoderConfig, EncoderSession};
//!
//! let mut encoder = EncoderSession::new(EncoderConfig::default());
//! encoder.set_bitrate(64000)?;
//! assert_eq!(encoder.bitrate()?, Bitrate::Bits(64000));
//!
//! // 20 ms of 48 kHz mono silence.
//! let packet = encoder.encode(&[0u8; 960 * 2], None)?;
//!
//! let mut decoder = DecoderSession::new(DecoderConfig::default());
//! let pcm = decoder.decode(&packet)?;
//! assert_eq!(pcm.len(), 960 * 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "libopus"))]
//! # fn main() {}
//! ```

pub mod config;
pub mod constants;
mod decoder;
mod encoder;
mod error;
mod library;
mod lifecycle;
pub mod shared;
pub mod stream;

#[cfg(feature = "libopus")]
mod ffi;
#[cfg(feature = "libopus")]
mod libopus;

#[cfg(test)]
mod testing;

pub use config::{Application, Bitrate, DecoderConfig, EncoderConfig, Signal};
pub use decoder::DecoderSession;
pub use encoder::EncoderSession;
pub use error::{Error, ErrorKind, Operation, Parameter, Result, SessionKind};
pub use library::{CodecLibrary, Ctl};
pub use lifecycle::Realization;
pub use shared::Shared;
pub use stream::{PcmFramer, StreamDecoder, StreamEncoder};

#[cfg(feature = "libopus")]
pub use libopus::{DecoderHandle, EncoderHandle, Libopus};
