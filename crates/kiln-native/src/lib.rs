//! # kiln-native
//!
//! Reference native tensor runtime for the kiln tensor layer.
//!
//! Everything the typed layer in `kiln-core` treats as "the engine" lives here:
//! - Element kinds and the host scalar types that back them
//! - Devices, layouts and memory formats
//! - Native tensor options and the owned native resource ([`RawTensor`])
//! - Shape-based constructors, joins and conversions on a [`Runtime`] handle
//! - Process-wide seeding and kernel thread configuration
//! - The thread-local grad mode and its scoped guard
//! - A per-runtime live-allocation counter

pub mod config;
pub mod device;
pub mod element;
pub mod error;
pub mod grad;
pub mod kind;
pub mod options;
pub mod raw;
pub mod runtime;
pub mod scalar;
pub mod shape;
pub mod storage;

mod join;

pub use config::RuntimeConfig;
pub use device::{Device, Layout, MemoryFormat};
pub use element::{NativeElement, Value};
pub use error::NativeError;
pub use grad::{is_grad_enabled, GradModeGuard, NoGradGuard};
pub use kind::Kind;
pub use options::NativeOptions;
pub use raw::RawTensor;
pub use runtime::Runtime;
pub use scalar::Scalar;
pub use shape::Shape;

pub type NativeResult<T> = std::result::Result<T, NativeError>;
