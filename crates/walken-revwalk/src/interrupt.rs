use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::WalkError;

/// Cancellation flag shared between a walk and whoever may abort it.
///
/// Clones observe the same flag. The session checks it before every store
/// call and before every dispatch.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<(), WalkError> {
        if self.is_raised() {
            return Err(WalkError::Interrupted);
        }
        Ok(())
    }
}
