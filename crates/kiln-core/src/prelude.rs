//! Common imports for kiln-core users.
//!
//! ```
//! use kiln_core::prelude::*;
//! ```

pub use crate::any::AnyTensor;
pub use crate::codec::{TensorArchive, TensorSource};
pub use crate::creation::{
    arange, arange_from, empty, empty_like, eye, full, full_like, linspace, logspace, ones,
    ones_like, rand, rand_like, randn, randn_like, randperm, zeros, zeros_like,
};
pub use crate::dtype::{DType, Element, FloatElement, RealElement};
pub use crate::error::KilnError;
pub use crate::join::{cat, stack};
pub use crate::mode::{enable_grad, is_grad_enabled, manual_seed, no_grad, set_num_threads};
pub use crate::options::TensorOptions;
pub use crate::tensor::Tensor;
pub use crate::{bf16, f16, Complex, Device, Layout, MemoryFormat, Result, Runtime, RuntimeConfig};
