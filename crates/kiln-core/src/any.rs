//! Tensors whose element type is only known at runtime.

use std::any::Any;
use std::fmt;

use half::{bf16, f16};
use kiln_native::{Device, RawTensor, Shape};
use num_complex::Complex;

use crate::{DType, Element, KilnError, Result, Tensor};

macro_rules! any_tensor {
    ($($variant:ident => $t:ty),* $(,)?) => {
        /// A [`Tensor`] whose type parameter was derived from the resource's
        /// runtime tag.
        pub enum AnyTensor {
            $($variant(Tensor<$t>),)*
        }

        impl AnyTensor {
            /// Wrap `raw`, picking the variant from its runtime tag.
            pub fn from_raw(raw: RawTensor) -> Result<Self> {
                match DType::from_kind(raw.kind()) {
                    $(DType::$variant => Ok(AnyTensor::$variant(Tensor::try_from_raw(raw)?)),)*
                }
            }

            pub fn dtype(&self) -> DType {
                match self {
                    $(AnyTensor::$variant(t) => t.dtype(),)*
                }
            }

            fn native(&self) -> &RawTensor {
                match self {
                    $(AnyTensor::$variant(t) => t.native(),)*
                }
            }

            fn as_any(&self) -> &dyn Any {
                match self {
                    $(AnyTensor::$variant(t) => t as &dyn Any,)*
                }
            }

            pub fn into_raw(self) -> RawTensor {
                match self {
                    $(AnyTensor::$variant(t) => t.into_raw(),)*
                }
            }
        }

        $(
            impl From<Tensor<$t>> for AnyTensor {
                fn from(tensor: Tensor<$t>) -> Self {
                    AnyTensor::$variant(tensor)
                }
            }
        )*

        impl fmt::Display for AnyTensor {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(AnyTensor::$variant(t) => fmt::Display::fmt(t, f),)*
                }
            }
        }

        impl fmt::Debug for AnyTensor {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(AnyTensor::$variant(t) => fmt::Debug::fmt(t, f),)*
                }
            }
        }
    };
}

any_tensor! {
    Bool => bool,
    UInt8 => u8,
    Int8 => i8,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    Float16 => f16,
    BFloat16 => bf16,
    Float32 => f32,
    Float64 => f64,
    Complex64 => Complex<f32>,
    Complex128 => Complex<f64>,
}

impl AnyTensor {
    pub fn shape(&self) -> &Shape {
        self.native().shape()
    }

    pub fn device(&self) -> Device {
        self.native().device()
    }

    pub fn numel(&self) -> usize {
        self.native().numel()
    }

    /// The typed handle, if the element type is `D`.
    pub fn downcast_ref<D: Element>(&self) -> Option<&Tensor<D>> {
        self.as_any().downcast_ref::<Tensor<D>>()
    }

    /// Convert into the typed handle. Fails with [`KilnError::DTypeMismatch`]
    /// unless the element type is `D`.
    pub fn downcast<D: Element>(self) -> Result<Tensor<D>> {
        let actual = self.dtype();
        if actual != D::DTYPE {
            return Err(KilnError::DTypeMismatch {
                expected: D::DTYPE,
                actual,
            });
        }
        Tensor::try_from_raw(self.into_raw())
    }
}
