//! The closed set of element types and their host-type witnesses.

use std::fmt;

use half::{bf16, f16};
use kiln_native::{Kind, NativeElement};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    UInt8,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    BFloat16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl DType {
    /// Dtype of floating literals and of float-producing constructors.
    pub const DEFAULT_FLOAT: DType = DType::Float32;
    /// Dtype of integral literals.
    pub const DEFAULT_INT: DType = DType::Int64;

    pub const ALL: [DType; 12] = [
        DType::Bool,
        DType::UInt8,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Float16,
        DType::BFloat16,
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    pub fn element_size(&self) -> usize {
        self.kind().element_size()
    }

    /// Real floating point: the four IEEE-style float widths.
    pub fn is_floating_point(&self) -> bool {
        matches!(
            self,
            DType::Float16 | DType::BFloat16 | DType::Float32 | DType::Float64
        )
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// Signed or unsigned integer. `Bool` is not integral.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DType::UInt8 | DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64
        )
    }

    /// Numeric and totally ordered: integral or real floating point.
    pub fn is_real(&self) -> bool {
        self.is_integral() || self.is_floating_point()
    }

    /// Native tag for this dtype.
    pub const fn kind(self) -> Kind {
        match self {
            DType::Bool => Kind::Bool,
            DType::UInt8 => Kind::Uint8,
            DType::Int8 => Kind::Int8,
            DType::Int16 => Kind::Int16,
            DType::Int32 => Kind::Int32,
            DType::Int64 => Kind::Int64,
            DType::Float16 => Kind::Half,
            DType::BFloat16 => Kind::BFloat16,
            DType::Float32 => Kind::Float,
            DType::Float64 => Kind::Double,
            DType::Complex64 => Kind::ComplexFloat,
            DType::Complex128 => Kind::ComplexDouble,
        }
    }

    pub const fn from_kind(kind: Kind) -> DType {
        match kind {
            Kind::Bool => DType::Bool,
            Kind::Uint8 => DType::UInt8,
            Kind::Int8 => DType::Int8,
            Kind::Int16 => DType::Int16,
            Kind::Int32 => DType::Int32,
            Kind::Int64 => DType::Int64,
            Kind::Half => DType::Float16,
            Kind::BFloat16 => DType::BFloat16,
            Kind::Float => DType::Float32,
            Kind::Double => DType::Float64,
            Kind::ComplexFloat => DType::Complex64,
            Kind::ComplexDouble => DType::Complex128,
        }
    }
}

impl From<Kind> for DType {
    fn from(kind: Kind) -> Self {
        DType::from_kind(kind)
    }
}

impl From<DType> for Kind {
    fn from(dtype: DType) -> Self {
        dtype.kind()
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Host type standing for one [`DType`] at the type level.
///
/// Sealed: the twelve implementors are exactly the members of [`DType::ALL`].
pub trait Element: NativeElement + sealed::Sealed {
    const DTYPE: DType;
}

/// Floating point and complex elements, the only ones that can track
/// gradients or hold random samples.
pub trait FloatElement: Element {}

/// Integral and real floating point elements: what ranges and permutations
/// may produce.
pub trait RealElement: Element {}

macro_rules! impl_element {
    ($($t:ty => $dtype:ident $(: $($marker:ident),+)?;)*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Element for $t {
                const DTYPE: DType = DType::$dtype;
            }

            $($(impl $marker for $t {})+)?
        )*
    };
}

impl_element! {
    bool => Bool;
    u8 => UInt8: RealElement;
    i8 => Int8: RealElement;
    i16 => Int16: RealElement;
    i32 => Int32: RealElement;
    i64 => Int64: RealElement;
    f16 => Float16: RealElement, FloatElement;
    bf16 => BFloat16: RealElement, FloatElement;
    f32 => Float32: RealElement, FloatElement;
    f64 => Float64: RealElement, FloatElement;
    Complex<f32> => Complex64: FloatElement;
    Complex<f64> => Complex128: FloatElement;
}
