use std::fmt;

use thiserror::Error;

/// Which side of the codec a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// PCM in, packets out.
    Encoder,
    /// Packets in, PCM out.
    Decoder,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoder => write!(f, "encoder"),
            Self::Decoder => write!(f, "decoder"),
        }
    }
}

/// A tunable or configurable parameter, named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Encoder target bitrate.
    Bitrate,
    /// Encoder complexity, 0 to 10.
    Complexity,
    /// Encoder signal type hint.
    Signal,
    /// Decoder output gain.
    Gain,
    /// Encoder application mode.
    Application,
    /// Channel count of a stream adapter.
    Channels,
    /// Frame duration of a stream adapter.
    FrameDuration,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bitrate => "bitrate",
            Self::Complexity => "complexity",
            Self::Signal => "signal type",
            Self::Gain => "gain",
            Self::Application => "application mode",
            Self::Channels => "channel count",
            Self::FrameDuration => "frame duration",
        };
        f.write_str(name)
    }
}

/// The library call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `opus_encode`.
    Encode,
    /// `opus_decode`.
    Decode,
    /// A control read of the given parameter.
    Get(Parameter),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "encode"),
            Self::Decode => write!(f, "decode"),
            Self::Get(p) => write!(f, "get {}", p),
        }
    }
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The codec instance could not be created. Retried on the next call.
    Construction,
    /// A transform or control call failed.
    Operation,
}

/// Errors returned by encoder and decoder sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// libopus refused to create the codec instance.
    #[error("opus: could not create {kind}: {reason}; check the {kind} parameters")]
    Construction { kind: SessionKind, reason: String },

    /// An encode, decode or control read returned an error code.
    #[error("opus: {operation} failed: {reason}")]
    Codec { operation: Operation, reason: String },

    /// A value was rejected by a setter or a stream adapter.
    #[error("Invalid {0}")]
    InvalidParameter(Parameter),

    /// The session was closed.
    #[error("opus: {0} is closed")]
    Closed(SessionKind),

    /// A stream adapter was configured with a rate libopus does not support.
    #[error("opus: sample rate {rate} is not valid; valid rates are 8000, 12000, 16000, 24000, 48000")]
    UnsupportedRate { rate: i32 },
}

impl Error {
    /// Returns whether this is a construction or an operation failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Construction { .. } | Self::UnsupportedRate { .. } => ErrorKind::Construction,
            Self::Codec { .. } | Self::InvalidParameter(_) | Self::Closed(_) => ErrorKind::Operation,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
