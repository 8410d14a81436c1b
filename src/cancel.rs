use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;

/// Cooperative cancellation flag shared between a pipeline and its caller.
///
/// Pipelines poll the token at the start of each AT response callback and at
/// step boundaries. Once a dial has succeeded the token is deliberately
/// ignored until the pipeline resolves, so a cancelled connect can never
/// leave a TTY stranded in raw data mode.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(Error::Cancelled)` if the token has been triggered.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
