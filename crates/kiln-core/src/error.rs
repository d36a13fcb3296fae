use kiln_native::NativeError;

use crate::DType;

/// Errors surfaced by kiln-core.
///
/// Promotion never fails: every literal combination maps to exactly one dtype,
/// so there is no variant for it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KilnError {
    #[error("{op}: shape mismatch, expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Rejection from the native runtime, passed through unchanged.
    #[error(transparent)]
    Native(#[from] NativeError),

    /// A native resource's element tag disagrees with the handle's type parameter.
    #[error("native resource holds {actual} elements but the handle declares {declared}")]
    ResourceInvariantViolation { declared: DType, actual: DType },

    #[error("dtype mismatch: expected {expected}, got {actual}")]
    DTypeMismatch { expected: DType, actual: DType },
}
