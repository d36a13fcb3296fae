use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime element-type tag carried by every native resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Uint8,
    Int8,
    Int16,
    Int32,
    Int64,
    Half,
    BFloat16,
    Float,
    Double,
    /// Two `f32` components.
    ComplexFloat,
    /// Two `f64` components.
    ComplexDouble,
}

impl Kind {
    /// Size in bytes of a single element.
    pub fn element_size(&self) -> usize {
        match self {
            Kind::Bool | Kind::Uint8 | Kind::Int8 => 1,
            Kind::Int16 | Kind::Half | Kind::BFloat16 => 2,
            Kind::Int32 | Kind::Float => 4,
            Kind::Int64 | Kind::Double | Kind::ComplexFloat => 8,
            Kind::ComplexDouble => 16,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, Kind::Half | Kind::BFloat16 | Kind::Float | Kind::Double)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Kind::ComplexFloat | Kind::ComplexDouble)
    }

    /// Whether tensors of this kind may track gradients.
    pub fn supports_grad(&self) -> bool {
        self.is_floating_point() || self.is_complex()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Uint8 => "uint8",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Half => "float16",
            Kind::BFloat16 => "bfloat16",
            Kind::Float => "float32",
            Kind::Double => "float64",
            Kind::ComplexFloat => "complex64",
            Kind::ComplexDouble => "complex128",
        };
        f.write_str(name)
    }
}
