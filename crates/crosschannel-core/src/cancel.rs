// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Cooperative cancellation for a generation pass.
//!
//! Generation is a single synchronous pass. The pipeline polls the token
//! between independent units of work (before prepare, per namespace, per
//! root interface) and abandons the remaining work once it is set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Raised when a [`CancellationToken`] was triggered mid-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("generation was cancelled")]
pub struct Cancelled;

/// A cloneable cancellation flag shared between the caller and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes the request.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the token has been triggered.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
