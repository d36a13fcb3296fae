//! # kiln-core
//!
//! Statically typed tensor creation on top of the `kiln-native` runtime.
//!
//! Every constructor resolves a partially specified configuration (element
//! type, layout, device, grad tracking) into one [`TensorOptions`] value,
//! performs exactly one native call, and wraps the result in a [`Tensor<D>`]
//! whose type parameter is checked against the runtime tag of the resource.
//!
//! ```
//! use kiln_core::prelude::*;
//!
//! let rt = Runtime::new(RuntimeConfig::default());
//! let z = zeros(&rt, [3, 3]).build()?;
//! assert_eq!(z.dtype(), DType::Float32);
//!
//! let r = arange(&rt, 5).build()?;
//! assert_eq!(r.to_vec()?, vec![0i64, 1, 2, 3, 4]);
//! # Ok::<(), KilnError>(())
//! ```

pub mod any;
pub mod codec;
pub mod creation;
pub mod derive;
pub mod dtype;
pub mod error;
pub mod join;
pub mod mode;
pub mod options;
pub mod prelude;
pub mod promote;
pub mod tensor;

pub use any::AnyTensor;
pub use codec::{ArchiveEntry, TensorArchive, TensorSource};
pub use creation::{
    arange, arange_from, empty, empty_like, eye, full, full_like, linspace, logspace, ones,
    ones_like, rand, rand_like, randn, randn_like, randperm, zeros, zeros_like, Creation,
};
pub use derive::{Derive, Fixed, Slot};
pub use dtype::{DType, Element, FloatElement, RealElement};
pub use error::KilnError;
pub use join::{cat, stack};
pub use mode::{enable_grad, is_grad_enabled, manual_seed, no_grad, set_num_threads};
pub use options::{compose, TensorOptions};
pub use promote::{classify, classify_range_result, Literal, RangeLiterals, Scalar};
pub use tensor::Tensor;

pub use half::{bf16, f16};
pub use kiln_native::{Device, Layout, MemoryFormat, Runtime, RuntimeConfig, Shape};
pub use num_complex::Complex;

pub type Result<T> = std::result::Result<T, KilnError>;
