//! Cooperative cancellation
//!
//! Every public engine entry point takes a [`CancelToken`]. Resolution
//! checks it between steps; a cancelled call fails with
//! [`ThemeError::Cancelled`] and commits nothing to the caches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ThemeError;

/// Cheap, clonable cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is never cancelled, for callers that don't need one.
    pub fn none() -> Self {
        Self::default()
    }

    /// Signal cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Bail out with [`ThemeError::Cancelled`] if cancellation was signalled.
    pub fn check(&self) -> Result<(), ThemeError> {
        if self.is_cancelled() {
            Err(ThemeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_propagates_to_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(ThemeError::Cancelled)));
    }
}
