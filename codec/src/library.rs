//! The codec library surface consumed by sessions.

/// A generic control call, as issued through `opus_encoder_ctl` /
/// `opus_decoder_ctl`.
#[derive(Debug)]
pub enum Ctl<'a> {
    /// A `*_SET_*` request carrying one `opus_int32` argument.
    Set { request: i32, value: i32 },
    /// A `*_GET_*` request writing into one `opus_int32` out-parameter.
    Get { request: i32, value: &'a mut i32 },
}

/// Raw codec operations with libopus calling conventions.
///
/// Return values follow the C API: negative numbers are error codes that can
/// be turned into text with [`CodecLibrary::strerror`]. Sessions own every
/// handle they create and pass it back to the matching destroy call exactly
/// once.
pub trait CodecLibrary {
    /// Owned encoder state.
    type Encoder;
    /// Owned decoder state.
    type Decoder;

    /// Creates an encoder, or returns the error code libopus reported.
    fn encoder_create(
        &self,
        sample_rate: i32,
        channels: i32,
        application: i32,
    ) -> Result<Self::Encoder, i32>;

    /// Releases an encoder returned by `encoder_create`.
    fn encoder_destroy(&self, encoder: Self::Encoder);

    /// Encodes `frame_size` samples per channel from `pcm` into `out`.
    /// Returns the packet length or a negative error code.
    fn encode(&self, encoder: &mut Self::Encoder, pcm: &[i16], frame_size: i32, out: &mut [u8])
    -> i32;

    /// Issues an encoder control request. Returns `OPUS_OK` or an error code.
    fn encoder_ctl(&self, encoder: &mut Self::Encoder, ctl: Ctl<'_>) -> i32;

    /// Creates a decoder, or returns the error code libopus reported.
    fn decoder_create(&self, sample_rate: i32, channels: i32) -> Result<Self::Decoder, i32>;

    /// Releases a decoder returned by `decoder_create`.
    fn decoder_destroy(&self, decoder: Self::Decoder);

    /// Decodes `packet` into `pcm`, which holds room for `frame_size` samples
    /// per channel. Returns decoded samples per channel or a negative error
    /// code.
    fn decode(
        &self,
        decoder: &mut Self::Decoder,
        packet: &[u8],
        pcm: &mut [i16],
        frame_size: i32,
        fec: bool,
    ) -> i32;

    /// Issues a decoder control request. Returns `OPUS_OK` or an error code.
    fn decoder_ctl(&self, decoder: &mut Self::Decoder, ctl: Ctl<'_>) -> i32;

    /// Human-readable text for an error code.
    fn strerror(&self, code: i32) -> String;
}
