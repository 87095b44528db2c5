//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AnalysisError, Result};

/// A cheaply-cloneable cancellation flag. The caller sets it (e.g. when the IDE's scheduler
/// decides the method is no longer interesting); the analyzer polls it before starting a
/// method, on entering each block in the worklist during the precise CFG pass, and once more
/// before the final diagnostic list is sorted and returned.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(AnalysisAborted)` if cancellation has been requested, `Ok(())` otherwise.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnalysisError::AnalysisAborted)
        } else {
            Ok(())
        }
    }
}
