//! Session configuration and typed codec parameters.
//!
//! Nothing here is validated against libopus. Unsupported sample rates or
//! channel counts surface when a session first realizes its codec instance.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FRAME_DURATION_MS, OPUS_APPLICATION_AUDIO, OPUS_APPLICATION_RESTRICTED_LOWDELAY,
    OPUS_APPLICATION_VOIP, OPUS_AUTO, OPUS_BITRATE_MAX, OPUS_SIGNAL_MUSIC, OPUS_SIGNAL_VOICE,
};
use crate::error::{Error, Parameter};

/// Opus application type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Application {
    /// Best quality for voice signals.
    #[serde(rename = "voip")]
    VoIP,
    /// Best quality for non-voice signals.
    #[default]
    #[serde(rename = "audio")]
    Audio,
    /// Minimum possible coding delay.
    #[serde(rename = "restricted_lowdelay")]
    RestrictedLowdelay,
}

impl Application {
    /// Returns the `OPUS_APPLICATION_*` value.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::VoIP => OPUS_APPLICATION_VOIP,
            Self::Audio => OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }
}

impl TryFrom<i32> for Application {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            OPUS_APPLICATION_VOIP => Ok(Self::VoIP),
            OPUS_APPLICATION_AUDIO => Ok(Self::Audio),
            OPUS_APPLICATION_RESTRICTED_LOWDELAY => Ok(Self::RestrictedLowdelay),
            _ => Err(Error::InvalidParameter(Parameter::Application)),
        }
    }
}

/// Hint about the kind of signal being encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Let the encoder detect the signal type.
    #[default]
    Auto,
    /// Bias towards speech.
    Voice,
    /// Bias towards music.
    Music,
}

impl Signal {
    /// Returns `OPUS_AUTO` or the `OPUS_SIGNAL_*` value.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Auto => OPUS_AUTO,
            Self::Voice => OPUS_SIGNAL_VOICE,
            Self::Music => OPUS_SIGNAL_MUSIC,
        }
    }

    /// Parses a value reported by `OPUS_GET_SIGNAL`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            OPUS_AUTO => Some(Self::Auto),
            OPUS_SIGNAL_VOICE => Some(Self::Voice),
            OPUS_SIGNAL_MUSIC => Some(Self::Music),
            _ => None,
        }
    }
}

/// Target bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    /// Let the encoder pick.
    Auto,
    /// As many bits as the packet size allows.
    Max,
    /// Bits per second.
    Bits(i32),
}

impl Bitrate {
    /// Returns the value passed to `OPUS_SET_BITRATE`.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Auto => OPUS_AUTO,
            Self::Max => OPUS_BITRATE_MAX,
            Self::Bits(bps) => bps,
        }
    }

    /// Interprets a raw bitrate, mapping the sentinels to their variants.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            OPUS_AUTO => Self::Auto,
            OPUS_BITRATE_MAX => Self::Max,
            bps => Self::Bits(bps),
        }
    }
}

impl From<i32> for Bitrate {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

/// Returns the number of samples per channel in `duration_ms` at `sample_rate`.
pub fn frame_size_for(sample_rate: i32, duration_ms: i32) -> i32 {
    let samples = i64::from(sample_rate) * i64::from(duration_ms) / 1000;
    samples.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Encoder session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Sample rate in Hz.
    pub sample_rate: i32,
    /// Number of interleaved channels.
    pub channels: i32,
    pub application: Application,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            application: Application::Audio,
        }
    }
}

impl EncoderConfig {
    /// Creates a config with every field set.
    pub fn new(sample_rate: i32, channels: i32, application: Application) -> Self {
        Self {
            sample_rate,
            channels,
            application,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: i32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: i32) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.application = application;
        self
    }
}

/// Decoder session configuration.
///
/// When `frame_size` is unset the decoder reserves room for
/// [`DEFAULT_FRAME_DURATION_MS`] of audio at the configured sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Sample rate in Hz.
    pub sample_rate: i32,
    /// Number of interleaved channels.
    pub channels: i32,
    /// Samples per channel reserved for one decoded frame.
    pub frame_size: Option<i32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            frame_size: None,
        }
    }
}

impl DecoderConfig {
    /// Creates a config whose frame size follows the sample rate.
    pub fn new(sample_rate: i32, channels: i32) -> Self {
        Self {
            sample_rate,
            channels,
            frame_size: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: i32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: i32) -> Self {
        self.channels = channels;
        self
    }

    /// Fixes the per-channel frame size instead of deriving it from the rate.
    pub fn with_frame_size(mut self, frame_size: i32) -> Self {
        self.frame_size = Some(frame_size);
        self
    }

    /// Resolved samples per channel in one decoded frame.
    pub fn frame_size(&self) -> i32 {
        self.frame_size
            .unwrap_or_else(|| frame_size_for(self.sample_rate, DEFAULT_FRAME_DURATION_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_config_defaults() {
        let cfg = EncoderConfig::default();
        assert_eq!(cfg.sample_rate, 48000);
        assert_eq!(cfg.channels, 1);
        assert_eq!(cfg.application, Application::Audio);
    }

    #[test]
    fn test_decoder_frame_size_follows_rate() {
        assert_eq!(DecoderConfig::default().frame_size(), 2880);
        assert_eq!(DecoderConfig::new(16000, 1).frame_size(), 960);
        assert_eq!(DecoderConfig::new(8000, 2).frame_size(), 480);
        assert_eq!(DecoderConfig::new(16000, 1).with_frame_size(320).frame_size(), 320);
    }

    #[test]
    fn test_frame_size_for() {
        assert_eq!(frame_size_for(48000, 20), 960);
        assert_eq!(frame_size_for(8000, 60), 480);
        assert_eq!(frame_size_for(i32::MAX, i32::MAX), i32::MAX);
    }

    #[test]
    fn test_application_raw() {
        for app in [Application::VoIP, Application::Audio, Application::RestrictedLowdelay] {
            assert_eq!(Application::try_from(app.to_raw()).unwrap(), app);
        }
        assert_eq!(
            Application::try_from(1234),
            Err(Error::InvalidParameter(Parameter::Application))
        );
    }

    #[test]
    fn test_bitrate_sentinels() {
        assert_eq!(Bitrate::from_raw(OPUS_AUTO), Bitrate::Auto);
        assert_eq!(Bitrate::from_raw(OPUS_BITRATE_MAX), Bitrate::Max);
        assert_eq!(Bitrate::from(64000), Bitrate::Bits(64000));
        assert_eq!(Bitrate::Bits(24000).to_raw(), 24000);
    }

    #[test]
    fn test_signal_raw() {
        assert_eq!(Signal::from_raw(OPUS_SIGNAL_VOICE), Some(Signal::Voice));
        assert_eq!(Signal::from_raw(OPUS_SIGNAL_MUSIC), Some(Signal::Music));
        assert_eq!(Signal::from_raw(OPUS_AUTO), Some(Signal::Auto));
        assert_eq!(Signal::from_raw(0), None);
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let cfg: EncoderConfig =
            serde_json::from_str(r#"{"channels": 2, "application": "voip"}"#).unwrap();
        assert_eq!(cfg, EncoderConfig::new(48000, 2, Application::VoIP));

        let cfg: DecoderConfig = serde_json::from_str(r#"{"sample_rate": 24000}"#).unwrap();
        assert_eq!(cfg.channels, 1);
        assert_eq!(cfg.frame_size(), 1440);

        let cfg: DecoderConfig =
            serde_json::from_str(r#"{"sample_rate": 16000, "frame_size": 320}"#).unwrap();
        assert_eq!(cfg.frame_size(), 320);
    }

    #[test]
    fn test_application_serialize() {
        let json = serde_json::to_string(&Application::RestrictedLowdelay).unwrap();
        assert_eq!(json, r#""restricted_lowdelay""#);
    }
}
