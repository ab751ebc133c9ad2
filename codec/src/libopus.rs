//! [`CodecLibrary`] backed by the system libopus.

use std::ptr::{self, NonNull};

use crate::constants::{OPUS_ALLOC_FAIL, OPUS_BAD_ARG, OPUS_OK};
use crate::ffi;
use crate::library::{CodecLibrary, Ctl};

/// Owned `OpusEncoder*` and the channel count it was created with.
#[derive(Debug)]
pub struct EncoderHandle {
    ptr: NonNull<ffi::OpusEncoder>,
    channels: usize,
}

/// Owned `OpusDecoder*` and the channel count it was created with.
#[derive(Debug)]
pub struct DecoderHandle {
    ptr: NonNull<ffi::OpusDecoder>,
    channels: usize,
}

// Safety: libopus state has no thread affinity. Sessions take `&mut self` for
// every call, so a handle is never used from two threads at once.
unsafe impl Send for EncoderHandle {}
unsafe impl Send for DecoderHandle {}

/// The system libopus, linked through the `libopus` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct Libopus;

fn clamp_len(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

impl CodecLibrary for Libopus {
    type Encoder = EncoderHandle;
    type Decoder = DecoderHandle;

    fn encoder_create(
        &self,
        sample_rate: i32,
        channels: i32,
        application: i32,
    ) -> Result<EncoderHandle, i32> {
        let mut error = OPUS_OK;
        let raw = unsafe { ffi::opus_encoder_create(sample_rate, channels, application, &mut error) };
        match NonNull::new(raw) {
            Some(ptr) if error == OPUS_OK => Ok(EncoderHandle {
                ptr,
                channels: channels as usize,
            }),
            Some(handle) => {
                unsafe { ffi::opus_encoder_destroy(handle.as_ptr()) };
                Err(error)
            }
            None if error == OPUS_OK => Err(OPUS_ALLOC_FAIL),
            None => Err(error),
        }
    }

    fn encoder_destroy(&self, encoder: EncoderHandle) {
        unsafe { ffi::opus_encoder_destroy(encoder.ptr.as_ptr()) };
    }

    fn encode(&self, encoder: &mut EncoderHandle, pcm: &[i16], frame_size: i32, out: &mut [u8]) -> i32 {
        // libopus reads frame_size * channels samples without bounds checks.
        if !fits(pcm.len(), frame_size, encoder.channels) {
            return OPUS_BAD_ARG;
        }

        unsafe {
            ffi::opus_encode(
                encoder.ptr.as_ptr(),
                pcm.as_ptr(),
                frame_size,
                out.as_mut_ptr(),
                clamp_len(out.len()),
            )
        }
    }

    fn encoder_ctl(&self, encoder: &mut EncoderHandle, ctl: Ctl<'_>) -> i32 {
        match ctl {
            Ctl::Set { request, value } => unsafe {
                ffi::opus_encoder_ctl(encoder.ptr.as_ptr(), request, value)
            },
            Ctl::Get { request, value } => unsafe {
                ffi::opus_encoder_ctl(encoder.ptr.as_ptr(), request, value as *mut i32)
            },
        }
    }

    fn decoder_create(&self, sample_rate: i32, channels: i32) -> Result<DecoderHandle, i32> {
        let mut error = OPUS_OK;
        let raw = unsafe { ffi::opus_decoder_create(sample_rate, channels, &mut error) };
        match NonNull::new(raw) {
            Some(ptr) if error == OPUS_OK => Ok(DecoderHandle {
                ptr,
                channels: channels as usize,
            }),
            Some(handle) => {
                unsafe { ffi::opus_decoder_destroy(handle.as_ptr()) };
                Err(error)
            }
            None if error == OPUS_OK => Err(OPUS_ALLOC_FAIL),
            None => Err(error),
        }
    }

    fn decoder_destroy(&self, decoder: DecoderHandle) {
        unsafe { ffi::opus_decoder_destroy(decoder.ptr.as_ptr()) };
    }

    fn decode(
        &self,
        decoder: &mut DecoderHandle,
        packet: &[u8],
        pcm: &mut [i16],
        frame_size: i32,
        fec: bool,
    ) -> i32 {
        // libopus writes up to frame_size * channels samples.
        if !fits(pcm.len(), frame_size, decoder.channels) {
            return OPUS_BAD_ARG;
        }

        let (data_ptr, data_len) = if packet.is_empty() {
            (ptr::null(), 0)
        } else {
            (packet.as_ptr(), clamp_len(packet.len()))
        };

        unsafe {
            ffi::opus_decode(
                decoder.ptr.as_ptr(),
                data_ptr,
                data_len,
                pcm.as_mut_ptr(),
                frame_size,
                i32::from(fec),
            )
        }
    }

    fn decoder_ctl(&self, decoder: &mut DecoderHandle, ctl: Ctl<'_>) -> i32 {
        match ctl {
            Ctl::Set { request, value } => unsafe {
                ffi::opus_decoder_ctl(decoder.ptr.as_ptr(), request, value)
            },
            Ctl::Get { request, value } => unsafe {
                ffi::opus_decoder_ctl(decoder.ptr.as_ptr(), request, value as *mut i32)
            },
        }
    }

    fn strerror(&self, code: i32) -> String {
        ffi::error_string(code)
    }
}

/// Whether a buffer of `len` samples holds `frame_size` samples for each of
/// `channels` channels.
fn fits(len: usize, frame_size: i32, channels: usize) -> bool {
    usize::try_from(frame_size)
        .ok()
        .and_then(|n| n.checked_mul(channels))
        .is_some_and(|needed| needed <= len)
}
