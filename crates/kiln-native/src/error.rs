use crate::{Device, Kind, Layout};

/// Failures reported by the native runtime.
///
/// These cross the boundary into `kiln-core` unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    #[error("device {0} is not available")]
    UnsupportedDevice(Device),

    #[error("layout {layout} is not supported by {op}")]
    UnsupportedLayout { op: &'static str, layout: Layout },

    #[error("only dense CPU tensors can be pinned, got device {0}")]
    PinnedMemory(Device),

    #[error("only floating point and complex tensors can require grad, got {0}")]
    GradOnNonFloating(Kind),

    #[error("{op}: shape mismatch, expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("{op}: expected dtype {expected}, got {got}")]
    DTypeMismatch {
        op: &'static str,
        expected: Kind,
        got: Kind,
    },

    #[error("{op}: expected device {expected}, got {got}")]
    DeviceMismatch {
        op: &'static str,
        expected: Device,
        got: Device,
    },

    #[error("{0} is not supported for dtype {1}")]
    UnsupportedKind(&'static str, Kind),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("allocation of {numel} elements of {kind} failed")]
    AllocationFailed { kind: Kind, numel: usize },

    #[error("no tensor named '{0}'")]
    MissingEntry(String),
}
