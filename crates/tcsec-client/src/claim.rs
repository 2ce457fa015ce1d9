use std::sync::atomic::{AtomicBool, Ordering};

static ENGINE_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Exclusive hold on the process-wide engine. Released on drop.
#[derive(Debug)]
pub(crate) struct EngineClaim {
    _private: (),
}

impl EngineClaim {
    pub(crate) fn acquire() -> Option<Self> {
        ENGINE_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { _private: () })
    }
}

impl Drop for EngineClaim {
    fn drop(&mut self) {
        ENGINE_CLAIMED.store(false, Ordering::Release);
        tracing::debug!("released process-wide engine claim");
    }
}
