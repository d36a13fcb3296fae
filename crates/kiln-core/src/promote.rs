//! Literal classification and range-result inference.
//!
//! Every rule here exists twice: once over runtime [`Scalar`] values, which is
//! what the dispatcher feeds to the native call, and once over host literal
//! types, which fixes the static element type of the result. The two must
//! agree; checked construction catches any drift between them.

pub use kiln_native::Scalar;

use crate::{DType, Element};

/// Dtype a literal defaults to: booleans to `Bool`, integers to
/// [`DType::DEFAULT_INT`], floats to [`DType::DEFAULT_FLOAT`].
pub fn classify(literal: Scalar) -> DType {
    match literal {
        Scalar::Bool(_) => DType::Bool,
        Scalar::Int(_) => DType::DEFAULT_INT,
        Scalar::Float(_) => DType::DEFAULT_FLOAT,
    }
}

/// Dtype of a range over the three endpoints: floating if any of them is,
/// otherwise the default integer. Booleans count as integral here.
pub fn classify_range_result(start: Scalar, end: Scalar, step: Scalar) -> DType {
    if start.is_floating() || end.is_floating() || step.is_floating() {
        DType::DEFAULT_FLOAT
    } else {
        DType::DEFAULT_INT
    }
}

/// Static classification of a literal type.
pub trait LiteralKind {
    /// Element the literal produces when no dtype is requested.
    type Default: Element;
}

/// Literal kind of `bool`.
pub struct Boolean;
/// Literal kind of the host integer types.
pub struct Integral;
/// Literal kind of `f32` and `f64`.
pub struct Floating;

impl LiteralKind for Boolean {
    type Default = bool;
}

impl LiteralKind for Integral {
    type Default = i64;
}

impl LiteralKind for Floating {
    type Default = f32;
}

/// Range promotion between two literal kinds.
///
/// Implemented for the numeric kinds only, so a `bool` endpoint does not
/// type-check as a range argument.
pub trait Join<Rhs: LiteralKind>: LiteralKind {
    type Output: LiteralKind;
}

impl Join<Integral> for Integral {
    type Output = Integral;
}

impl Join<Floating> for Integral {
    type Output = Floating;
}

impl Join<Integral> for Floating {
    type Output = Floating;
}

impl Join<Floating> for Floating {
    type Output = Floating;
}

/// A host value usable as a fill or range literal.
pub trait Literal: Copy + Into<Scalar> {
    type Kind: LiteralKind;

    fn to_scalar(self) -> Scalar {
        self.into()
    }
}

impl Literal for bool {
    type Kind = Boolean;
}

macro_rules! impl_literal {
    ($kind:ident: $($t:ty),*) => {
        $(
            impl Literal for $t {
                type Kind = $kind;
            }
        )*
    };
}

impl_literal!(Integral: i8, i16, i32, i64, u8, u16, u32);
impl_literal!(Floating: f32, f64);

/// Element a literal of type `L` classifies to.
pub type Classified<L> = <<L as Literal>::Kind as LiteralKind>::Default;

/// Joined literal kind of three range endpoints.
pub type RangeKind<A, B, C> = <<<A as Literal>::Kind as Join<<B as Literal>::Kind>>::Output as Join<
    <C as Literal>::Kind,
>>::Output;

/// Element a range over endpoints of types `A`, `B`, `C` produces.
pub type RangeResult<A, B, C> = <RangeKind<A, B, C> as LiteralKind>::Default;

/// Endpoint triples whose kinds join. Blanket-implemented; use it as a bound.
pub trait RangeLiterals {
    type Output: Element;
}

impl<A, B, C> RangeLiterals for (A, B, C)
where
    A: Literal,
    B: Literal,
    C: Literal,
    A::Kind: Join<B::Kind>,
    <A::Kind as Join<B::Kind>>::Output: Join<C::Kind>,
{
    type Output = RangeResult<A, B, C>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_dtype<L: Literal>(_: L) -> DType {
        <Classified<L> as Element>::DTYPE
    }

    fn static_range<A, B, C>(_: A, _: B, _: C) -> DType
    where
        (A, B, C): RangeLiterals,
    {
        <<(A, B, C) as RangeLiterals>::Output as Element>::DTYPE
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Scalar::Bool(true)), DType::Bool);
        assert_eq!(classify(Scalar::Int(3)), DType::Int64);
        assert_eq!(classify(Scalar::Float(3.0)), DType::Float32);
    }

    #[test]
    fn test_classify_range_result() {
        let (i, f) = (Scalar::Int(1), Scalar::Float(0.5));
        assert_eq!(classify_range_result(i, i, i), DType::Int64);
        assert_eq!(classify_range_result(i, f, i), DType::Float32);
        assert_eq!(classify_range_result(f, i, i), DType::Float32);
        assert_eq!(classify_range_result(i, i, f), DType::Float32);
        assert_eq!(classify_range_result(Scalar::Bool(true), i, i), DType::Int64);
    }

    #[test]
    fn test_static_classification_agrees_with_runtime() {
        assert_eq!(static_dtype(true), classify(true.to_scalar()));
        assert_eq!(static_dtype(7u8), classify(7u8.to_scalar()));
        assert_eq!(static_dtype(-7i32), classify((-7i32).to_scalar()));
        assert_eq!(static_dtype(2.5f64), classify(2.5f64.to_scalar()));
        assert_eq!(static_dtype(2.5f32), DType::Float32);
    }

    #[test]
    fn test_static_range_agrees_with_runtime() {
        assert_eq!(static_range(0, 10, 1), DType::Int64);
        assert_eq!(static_range(0, 1.0, 1), DType::Float32);
        assert_eq!(static_range(0.0f64, 10u8, 2i16), DType::Float32);
        assert_eq!(
            static_range(0u32, 3i32, 1i64),
            classify_range_result(Scalar::Int(0), Scalar::Int(3), Scalar::Int(1))
        );
    }
}
