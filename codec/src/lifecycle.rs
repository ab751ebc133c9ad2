//! Lazy realization of codec handles.

use crate::error::{Error, Result, SessionKind};

/// Outcome of [`EncoderSession::ensure_realized`](crate::EncoderSession::ensure_realized)
/// and its decoder counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Realization {
    /// The handle already existed. Nothing was called.
    AlreadyReady,
    /// The handle was created by this call.
    Created,
    /// Creation failed, or the session is closed. A failed creation is
    /// attempted again on the next call.
    Failed(Error),
}

impl Realization {
    /// Returns true unless realization failed.
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Where a session is in its handle lifecycle.
///
/// `Unrealized -> Realized -> Destroyed`, with failed creations staying in
/// `Unrealized`.
#[derive(Debug)]
pub(crate) enum Lifecycle<H> {
    Unrealized,
    Realized(H),
    Destroyed,
}

impl<H> Lifecycle<H> {
    pub(crate) fn is_realized(&self) -> bool {
        matches!(self, Self::Realized(_))
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Returns the handle, calling `create` first if there is none yet.
    pub(crate) fn get_or_create<F>(&mut self, kind: SessionKind, create: F) -> Result<&mut H>
    where
        F: FnOnce() -> Result<H>,
    {
        match self {
            Self::Destroyed => return Err(Error::Closed(kind)),
            Self::Unrealized => *self = Self::Realized(create()?),
            Self::Realized(_) => {}
        }
        match self {
            Self::Realized(handle) => Ok(handle),
            _ => Err(Error::Closed(kind)),
        }
    }

    pub(crate) fn ensure<F>(&mut self, kind: SessionKind, create: F) -> Realization
    where
        F: FnOnce() -> Result<H>,
    {
        let was_realized = self.is_realized();
        match self.get_or_create(kind, create) {
            Ok(_) if was_realized => Realization::AlreadyReady,
            Ok(_) => Realization::Created,
            Err(err) => Realization::Failed(err),
        }
    }

    /// Moves to `Destroyed`, handing back the handle if one was created.
    pub(crate) fn release(&mut self) -> Option<H> {
        match std::mem::replace(self, Self::Destroyed) {
            Self::Realized(handle) => Some(handle),
            Self::Unrealized | Self::Destroyed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> Result<u32> {
        Err(Error::Construction {
            kind: SessionKind::Encoder,
            reason: "invalid argument".to_string(),
        })
    }

    #[test]
    fn test_ensure_creates_once() {
        let mut state = Lifecycle::Unrealized;
        let mut calls = 0;

        let first = state.ensure(SessionKind::Encoder, || {
            calls += 1;
            Ok(7u32)
        });
        assert_eq!(first, Realization::Created);

        let second = state.ensure(SessionKind::Encoder, || {
            calls += 1;
            Ok(8u32)
        });
        assert_eq!(second, Realization::AlreadyReady);
        assert_eq!(calls, 1);
        assert_eq!(state.release(), Some(7));
    }

    #[test]
    fn test_failure_stays_unrealized() {
        let mut state = Lifecycle::<u32>::Unrealized;

        let result = state.ensure(SessionKind::Encoder, failing);
        assert!(!result.is_ready());
        assert!(matches!(state, Lifecycle::Unrealized));

        assert_eq!(state.ensure(SessionKind::Encoder, || Ok(1)), Realization::Created);
        assert!(state.is_realized());
    }

    #[test]
    fn test_release_unrealized() {
        let mut state = Lifecycle::<u32>::Unrealized;
        assert_eq!(state.release(), None);
        assert!(state.is_destroyed());
        assert_eq!(state.release(), None);
    }

    #[test]
    fn test_destroyed_never_recreates() {
        let mut state = Lifecycle::Realized(1u32);
        assert_eq!(state.release(), Some(1));

        let mut called = false;
        let result = state.get_or_create(SessionKind::Decoder, || {
            called = true;
            Ok(2)
        });
        assert_eq!(result.unwrap_err(), Error::Closed(SessionKind::Decoder));
        assert!(!called);
    }
}
