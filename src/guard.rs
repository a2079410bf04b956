//! Reentrancy guard for the interception pipeline.
//!
//! Analyzers and bus subscribers are free to call the host's query/bind/unbind
//! operations themselves (a DOM analyzer querying the document, for example).
//! While a `PauseGuard` is live the wrapped operations fall through to the
//! originals, so instrumentation never observes its own machinery.
//!
//! The guard is a depth counter, not a boolean: pause/resume pairs nest, and
//! an unbalanced pair cannot silently end instrumentation for the rest of the
//! page lifetime.

use std::cell::Cell;
use std::rc::Rc;

/// Shared pause-depth counter for one instrumentation context.
#[derive(Clone, Default)]
pub struct InterceptGuard {
    depth: Rc<Cell<u32>>,
}

impl InterceptGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while at least one `PauseGuard` is live.
    pub fn is_paused(&self) -> bool {
        self.depth.get() > 0
    }

    /// Suspend interception until the returned guard is dropped.
    pub fn pause(&self) -> PauseGuard {
        self.depth.set(self.depth.get() + 1);
        PauseGuard {
            depth: Rc::clone(&self.depth),
        }
    }
}

/// RAII handle that resumes interception on drop.
pub struct PauseGuard {
    depth: Rc<Cell<u32>>,
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaused_by_default() {
        let guard = InterceptGuard::new();
        assert!(!guard.is_paused());
    }

    #[test]
    fn test_pause_and_resume() {
        let guard = InterceptGuard::new();
        {
            let _pause = guard.pause();
            assert!(guard.is_paused());
        }
        assert!(!guard.is_paused());
    }

    #[test]
    fn test_nested_pauses_compose() {
        let guard = InterceptGuard::new();
        let outer = guard.pause();
        {
            let _inner = guard.pause();
            assert!(guard.is_paused());
        }
        // Inner pair released; outer still holds.
        assert!(guard.is_paused());
        drop(outer);
        assert!(!guard.is_paused());
    }

    #[test]
    fn test_clones_share_depth() {
        let guard = InterceptGuard::new();
        let other = guard.clone();
        let _pause = guard.pause();
        assert!(other.is_paused());
    }
}
