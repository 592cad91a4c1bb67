use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks Ctrl+C across the two phases of a run.
///
/// Before [`commit`](InterruptState::commit), an interrupt cancels the
/// selection and nothing is written. After it, patches are being written and
/// the interrupt is only recorded.
pub struct InterruptState {
    interrupted: AtomicBool,
    committed: AtomicBool,
}

/// What the Ctrl+C handler should do with an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Nothing has been written yet: drop the selection
    Cancel,
    /// Writes are under way: let them finish
    Defer,
}

impl InterruptState {
    /// Create a new state: not interrupted, not committed.
    pub fn new() -> Self {
        Self {
            interrupted: AtomicBool::new(false),
            committed: AtomicBool::new(false),
        }
    }

    /// Record an interrupt and decide how to handle it.
    pub fn trigger(&self) -> InterruptAction {
        self.interrupted.store(true, Ordering::SeqCst);
        if self.is_committed() {
            InterruptAction::Defer
        } else {
            InterruptAction::Cancel
        }
    }

    /// Check if an interrupt has been received.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Mark the start of writes; later interrupts are deferred.
    pub fn commit(&self) {
        self.committed.store(true, Ordering::SeqCst);
    }

    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::SeqCst)
    }
}

impl Default for InterruptState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let state = InterruptState::new();
        assert!(!state.is_interrupted());
        assert!(!state.is_committed());
    }

    #[test]
    fn test_trigger_before_commit_cancels() {
        let state = InterruptState::new();
        assert_eq!(state.trigger(), InterruptAction::Cancel);
        assert!(state.is_interrupted());
    }

    #[test]
    fn test_trigger_after_commit_defers() {
        let state = InterruptState::new();
        state.commit();
        assert_eq!(state.trigger(), InterruptAction::Defer);
        assert!(state.is_interrupted());
    }

    #[test]
    fn test_trigger_from_other_thread() {
        let state = Arc::new(InterruptState::new());
        let state_clone = Arc::clone(&state);

        thread::spawn(move || state_clone.trigger()).join().unwrap();

        assert!(state.is_interrupted());
    }
}
