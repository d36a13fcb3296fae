//! The Derive resolver.
//!
//! An option slot is either explicit or left to be derived from a context:
//! the source tensor of a `*_like` call, or the classified literals of a
//! fill or range. For the element type the choice is made at the type level
//! so the result handle's parameter is known statically; layout and device
//! are runtime [`Slot`]s.

use std::marker::PhantomData;

use kiln_native::{Device, Layout, MemoryFormat};

use crate::{DType, Element, Tensor};

/// A runtime option slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot<T> {
    /// Take the value from the resolution context.
    #[default]
    Derive,
    Explicit(T),
}

impl<T> Slot<T> {
    /// The explicit value, or `source` when derived.
    pub fn resolve(self, source: T) -> T {
        match self {
            Slot::Derive => source,
            Slot::Explicit(value) => value,
        }
    }

    pub fn is_derive(&self) -> bool {
        matches!(self, Slot::Derive)
    }
}

impl<T> From<T> for Slot<T> {
    fn from(value: T) -> Self {
        Slot::Explicit(value)
    }
}

/// Type-level dtype slot: [`Derive`] or [`Fixed<D>`].
pub trait DTypeSlot {
    /// Element of the result when the context element is `C`.
    type Output<C: Element>: Element;

    /// Runtime counterpart of [`DTypeSlot::Output`].
    fn resolve(context: DType) -> DType;
}

/// Dtype slot that takes the context's element type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Derive;

/// Dtype slot pinned to `D`.
pub struct Fixed<D>(PhantomData<D>);

impl DTypeSlot for Derive {
    type Output<C: Element> = C;

    fn resolve(context: DType) -> DType {
        context
    }
}

impl<D: Element> DTypeSlot for Fixed<D> {
    type Output<C: Element> = D;

    fn resolve(_context: DType) -> DType {
        D::DTYPE
    }
}

/// What derived slots resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub dtype: DType,
    pub layout: Layout,
    pub device: Device,
    pub memory_format: MemoryFormat,
}

impl Context {
    /// Context of a shape-based constructor producing `dtype` by default.
    pub fn defaults(dtype: DType) -> Self {
        Self {
            dtype,
            layout: Layout::default(),
            device: Device::default(),
            memory_format: MemoryFormat::Contiguous,
        }
    }

    /// Context of a `*_like` constructor.
    pub fn of<S: Element>(source: &Tensor<S>) -> Self {
        Self {
            dtype: source.dtype(),
            layout: source.layout(),
            device: source.device(),
            memory_format: source.memory_format(),
        }
    }
}
