//! Grad mode and runtime-wide toggles.

use kiln_native::{GradModeGuard, NoGradGuard, Runtime};

use crate::Result;

pub use kiln_native::is_grad_enabled;

/// Run `f` with grad tracking disabled on this thread.
///
/// The previous mode is restored however `f` exits: normal return, a returned
/// `Err`, or a panic unwinding through this frame.
///
/// ```
/// use kiln_core::prelude::*;
///
/// let rt = Runtime::new(RuntimeConfig::default());
/// let t = no_grad(|| zeros(&rt, [1]).requires_grad(true).build())?;
/// assert!(!t.requires_grad());
/// assert!(is_grad_enabled());
/// # Ok::<(), KilnError>(())
/// ```
pub fn no_grad<R>(f: impl FnOnce() -> R) -> R {
    let _guard = NoGradGuard::new();
    f()
}

/// Run `f` with grad tracking enabled, e.g. inside a [`no_grad`] region.
pub fn enable_grad<R>(f: impl FnOnce() -> R) -> R {
    let _guard = GradModeGuard::new(true);
    f()
}

/// Reseed the generator behind `rand`, `randn` and `randperm` on `runtime`.
pub fn manual_seed(runtime: &Runtime, seed: u64) {
    runtime.manual_seed(seed);
}

/// Set kernel parallelism on `runtime`. `n` must be positive.
pub fn set_num_threads(runtime: &Runtime, n: usize) -> Result<()> {
    runtime.set_num_threads(n)?;
    Ok(())
}
