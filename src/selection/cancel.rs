//! Cooperative cancellation for long traversals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SelectionError};

/// Default number of pixels processed between cancellation checks.
pub const DEFAULT_CHECK_INTERVAL: usize = 4096;

/// Shared flag a caller can raise to stop a running traversal.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-call traversal options.
#[derive(Debug, Clone)]
pub struct FillOptions {
    pub cancel: Option<CancelToken>,
    /// Pixels popped between cancellation checks (clamped to at least 1)
    pub check_interval: usize,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            cancel: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl FillOptions {
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..Self::default()
        }
    }

    /// Called once per popped pixel with a running counter.
    #[inline]
    pub(crate) fn checkpoint(&self, processed: usize) -> Result<()> {
        if let Some(cancel) = &self.cancel {
            if processed % self.check_interval.max(1) == 0 && cancel.is_cancelled() {
                log::debug!("traversal cancelled after {} pixels", processed);
                return Err(SelectionError::Cancelled);
            }
        }
        Ok(())
    }
}
