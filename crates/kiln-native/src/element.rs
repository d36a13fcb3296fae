//! Host scalar types the runtime can store, and their mapping to [`Kind`].

use std::fmt::Debug;

use half::{bf16, f16};
use num_complex::Complex;

use crate::storage::Buffer;
use crate::{Kind, Scalar};

/// A value on its way into storage.
///
/// Integers stay exact until they reach an integral kind; everything else
/// travels as an `(re, im)` pair of `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Parts(f64, f64),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<(f64, f64)> for Value {
    fn from((re, im): (f64, f64)) -> Self {
        Value::Parts(re, im)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => Value::Int(i64::from(b)),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(x) => Value::Parts(x, 0.0),
        }
    }
}

/// A host scalar type with a native storage representation.
///
/// Real kinds ignore the imaginary part of [`Value::Parts`].
pub trait NativeElement: Copy + Debug + PartialEq + Send + Sync + 'static {
    const KIND: Kind;

    fn from_parts(re: f64, im: f64) -> Self;

    fn to_parts(self) -> (f64, f64);

    fn into_buffer(data: Vec<Self>) -> Buffer;

    fn slice(buffer: &Buffer) -> Option<&[Self]>;

    /// Integral kinds wrap like `as`; the rest round through `f64`.
    fn from_i64(v: i64) -> Self {
        Self::from_parts(v as f64, 0.0)
    }

    fn to_value(self) -> Value {
        let (re, im) = self.to_parts();
        Value::Parts(re, im)
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Int(v) => Self::from_i64(v),
            Value::Parts(re, im) => Self::from_parts(re, im),
        }
    }
}

macro_rules! buffer_access {
    ($kind:ident) => {
        fn into_buffer(data: Vec<Self>) -> Buffer {
            Buffer::$kind(data)
        }

        fn slice(buffer: &Buffer) -> Option<&[Self]> {
            match buffer {
                Buffer::$kind(v) => Some(v),
                _ => None,
            }
        }
    };
}

macro_rules! impl_real_element {
    ($t:ty, $kind:ident, |$v:ident| $from:expr, |$x:ident| $to:expr) => {
        impl NativeElement for $t {
            const KIND: Kind = Kind::$kind;

            #[inline]
            fn from_parts($v: f64, _im: f64) -> Self {
                $from
            }

            #[inline]
            fn to_parts(self) -> (f64, f64) {
                let $x = self;
                ($to, 0.0)
            }

            buffer_access!($kind);
        }
    };
}

macro_rules! impl_integral_element {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl NativeElement for $t {
                const KIND: Kind = Kind::$kind;

                #[inline]
                fn from_parts(re: f64, _im: f64) -> Self {
                    re as $t
                }

                #[inline]
                fn to_parts(self) -> (f64, f64) {
                    (self as f64, 0.0)
                }

                #[inline]
                fn from_i64(v: i64) -> Self {
                    v as $t
                }

                #[inline]
                fn to_value(self) -> Value {
                    Value::Int(i64::from(self))
                }

                buffer_access!($kind);
            }
        )*
    };
}

impl_real_element!(bool, Bool, |v| v != 0.0, |x| f64::from(u8::from(x)));
impl_integral_element!(u8 => Uint8, i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);
impl_real_element!(f16, Half, |v| f16::from_f64(v), |x| x.to_f64());
impl_real_element!(bf16, BFloat16, |v| bf16::from_f64(v), |x| x.to_f64());
impl_real_element!(f32, Float, |v| v as f32, |x| f64::from(x));
impl_real_element!(f64, Double, |v| v, |x| x);

impl NativeElement for Complex<f32> {
    const KIND: Kind = Kind::ComplexFloat;

    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re as f32, im as f32)
    }

    fn to_parts(self) -> (f64, f64) {
        (f64::from(self.re), f64::from(self.im))
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::ComplexFloat(data)
    }

    fn slice(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::ComplexFloat(v) => Some(v),
            _ => None,
        }
    }
}

impl NativeElement for Complex<f64> {
    const KIND: Kind = Kind::ComplexDouble;

    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re, im)
    }

    fn to_parts(self) -> (f64, f64) {
        (self.re, self.im)
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::ComplexDouble(data)
    }

    fn slice(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::ComplexDouble(v) => Some(v),
            _ => None,
        }
    }
}
