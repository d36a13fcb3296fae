//! Thread-local grad-tracking mode.
//!
//! Each thread carries its own mode, so concurrent threads can run with
//! different settings. Guards restore the previous mode on drop, which covers
//! early returns, `?` propagation and unwinding alike.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether newly created tensors on this thread may track gradients.
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(|g| g.get())
}

fn swap_grad_enabled(enabled: bool) -> bool {
    GRAD_ENABLED.with(|g| g.replace(enabled))
}

/// Sets the grad mode for its lifetime and restores the previous one on drop.
///
/// Not `Send`: the mode it restores belongs to the creating thread.
#[must_use = "the previous grad mode is restored as soon as the guard is dropped"]
pub struct GradModeGuard {
    prev: bool,
    _not_send: PhantomData<*const ()>,
}

impl GradModeGuard {
    pub fn new(enabled: bool) -> Self {
        let prev = swap_grad_enabled(enabled);
        Self {
            prev,
            _not_send: PhantomData,
        }
    }

    /// Mode that will be restored on drop.
    pub fn previous(&self) -> bool {
        self.prev
    }
}

impl Drop for GradModeGuard {
    fn drop(&mut self) {
        swap_grad_enabled(self.prev);
    }
}

/// Disables grad tracking in its scope.
///
/// ```
/// use kiln_native::{is_grad_enabled, NoGradGuard};
///
/// {
///     let _guard = NoGradGuard::new();
///     assert!(!is_grad_enabled());
/// }
/// assert!(is_grad_enabled());
/// ```
#[must_use = "grad tracking is re-enabled as soon as the guard is dropped"]
pub struct NoGradGuard {
    _inner: GradModeGuard,
}

impl NoGradGuard {
    pub fn new() -> Self {
        Self {
            _inner: GradModeGuard::new(false),
        }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_grad_guard() {
        assert!(is_grad_enabled());
        {
            let _guard = NoGradGuard::new();
            assert!(!is_grad_enabled());
        }
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_nested_guards_restore_in_order() {
        let outer = GradModeGuard::new(false);
        assert!(outer.previous());
        {
            let inner = GradModeGuard::new(true);
            assert!(!inner.previous());
            assert!(is_grad_enabled());
        }
        assert!(!is_grad_enabled());
        drop(outer);
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_mode_is_thread_local() {
        let _guard = NoGradGuard::new();
        let other = std::thread::spawn(is_grad_enabled).join().unwrap();
        assert!(other);
        assert!(!is_grad_enabled());
    }
}
