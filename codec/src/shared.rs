//! Sessions shared across threads.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::decoder::DecoderSession;
use crate::encoder::EncoderSession;
use crate::error::Result;
use crate::library::CodecLibrary;

/// A session behind a mutex. Clones refer to the same session, and every
/// call against it is serialized.
pub struct Shared<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Shared<S> {
    /// Wraps `session` for use from several threads.
    pub fn new(session: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Locks the session for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<L: CodecLibrary> Shared<EncoderSession<L>> {
    /// Locks the session and calls [`EncoderSession::encode`].
    pub fn encode(&self, pcm: &[u8], max_packet_size: Option<usize>) -> Result<Vec<u8>> {
        self.inner.lock().encode(pcm, max_packet_size)
    }
}

impl<L: CodecLibrary> Shared<DecoderSession<L>> {
    /// Locks the session and calls [`DecoderSession::decode`].
    pub fn decode(&self, packet: &[u8]) -> Result<Vec<u8>> {
        self.inner.lock().decode(packet)
    }
}
