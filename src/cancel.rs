//! # Cooperative Cancellation
//!
//! A [`CancellationToken`] threaded through C9/C11/C12 call chains. No
//! internal timeouts exist anywhere in this crate; callers that want one
//! compose it by cancelling the token from a timer of their own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// A cheaply-clonable cooperative cancellation flag.
///
/// Cloning shares the same underlying flag: cancelling any clone cancels all
/// of them. This mirrors `tokio_util::sync::CancellationToken` in shape, but
/// carries no async runtime dependency since this crate only polls it
/// between already-suspending steps, never awaits it directly.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this token (and all of its clones) as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`Self::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`Error::Cancelled`] if this token has been cancelled,
    /// otherwise `Ok(())`. Call sites check this between matches and between
    /// assessors per the concurrency model.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}
