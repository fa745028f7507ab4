use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot gate for one cycle type. A tick that cannot acquire it is
/// skipped, never queued.
#[derive(Clone, Debug, Default)]
pub struct CycleGuard {
    running: Arc<AtomicBool>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<CyclePermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CyclePermit { running: self.running.clone() })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the duration of one run; releases the guard on drop, including
/// when the run panics or is cancelled.
#[derive(Debug)]
pub struct CyclePermit {
    running: Arc<AtomicBool>,
}

impl Drop for CyclePermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let guard = CycleGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }
}
