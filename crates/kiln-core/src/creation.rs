//! Creation ops.
//!
//! Each free function returns a [`Creation`] builder. Setters fill in option
//! slots; [`Creation::build`] resolves every slot against the op's context,
//! composes a [`TensorOptions`], makes exactly one native call and wraps the
//! result.
//!
//! ```
//! use kiln_core::prelude::*;
//!
//! let rt = Runtime::new(RuntimeConfig::default());
//! let t = full(&rt, [2, 2], 7).build()?;
//! assert_eq!(t.dtype(), DType::Int64);
//!
//! let f = zeros_like(&rt, &t).dtype::<f64>().build()?;
//! assert_eq!(f.dims(), &[2, 2]);
//! # Ok::<(), KilnError>(())
//! ```

use std::marker::PhantomData;

use kiln_native::{
    Device, Layout, MemoryFormat, NativeOptions, NativeResult, RawTensor, Runtime, Shape,
};

use crate::derive::{Context, DTypeSlot, Derive, Fixed, Slot};
use crate::promote::{classify, classify_range_result, Classified, Literal, RangeLiterals, Scalar};
use crate::{compose, DType, Element, FloatElement, RealElement, Result, Tensor, TensorOptions};

/// One native constructor together with its op-specific arguments.
pub trait CreationOp {
    /// Element produced when the dtype slot is left to [`Derive`].
    type Context: Element;

    fn name(&self) -> &'static str;

    /// Values that derived slots resolve to.
    fn context(&self) -> Context;

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor>;
}

/// Element types an op may produce.
pub trait Accepts<D: Element>: CreationOp {}

/// Dtype admission policy of an op family.
pub trait Admits<D: Element> {}

/// Any element type.
pub struct AnyDType;
/// Floating point and complex element types.
pub struct FloatingOnly;
/// Integral and real floating element types.
pub struct RealOnly;

impl<D: Element> Admits<D> for AnyDType {}
impl<D: FloatElement> Admits<D> for FloatingOnly {}
impl<D: RealElement> Admits<D> for RealOnly {}

/// How a dense fill op populates its storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Zeros,
    Ones,
    Uninit,
    Value(Scalar),
    Uniform,
    Normal,
}

impl Fill {
    fn name(&self, like: bool) -> &'static str {
        match (self, like) {
            (Fill::Zeros, false) => "zeros",
            (Fill::Zeros, true) => "zeros_like",
            (Fill::Ones, false) => "ones",
            (Fill::Ones, true) => "ones_like",
            (Fill::Uninit, false) => "empty",
            (Fill::Uninit, true) => "empty_like",
            (Fill::Value(_), false) => "full",
            (Fill::Value(_), true) => "full_like",
            (Fill::Uniform, false) => "rand",
            (Fill::Uniform, true) => "rand_like",
            (Fill::Normal, false) => "randn",
            (Fill::Normal, true) => "randn_like",
        }
    }

    fn invoke(
        &self,
        runtime: &Runtime,
        shape: &Shape,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        match *self {
            Fill::Zeros => runtime.zeros(shape, options),
            Fill::Ones => runtime.ones(shape, options),
            Fill::Uninit => runtime.empty(shape, options),
            Fill::Value(v) => runtime.full(shape, v, options),
            Fill::Uniform => runtime.rand(shape, options),
            Fill::Normal => runtime.randn(shape, options),
        }
    }
}

/// Dense fill over an explicit shape. `C` is the derived element, `A` the
/// admission policy.
pub struct Shaped<C, A = AnyDType> {
    shape: Shape,
    fill: Fill,
    _marker: PhantomData<(C, A)>,
}

impl<C: Element, A> CreationOp for Shaped<C, A> {
    type Context = C;

    fn name(&self) -> &'static str {
        self.fill.name(false)
    }

    fn context(&self) -> Context {
        let dtype = match self.fill {
            Fill::Value(v) => classify(v),
            _ => C::DTYPE,
        };
        Context::defaults(dtype)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        self.fill.invoke(runtime, &self.shape, options)
    }
}

impl<C: Element, A: Admits<D>, D: Element> Accepts<D> for Shaped<C, A> {}

/// Dense fill shaped like an existing tensor, deriving from it.
pub struct Like<'a, S: Element, A = AnyDType> {
    source: &'a Tensor<S>,
    fill: Fill,
    _policy: PhantomData<A>,
}

impl<S: Element, A> CreationOp for Like<'_, S, A> {
    type Context = S;

    fn name(&self) -> &'static str {
        self.fill.name(true)
    }

    fn context(&self) -> Context {
        Context::of(self.source)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        self.fill.invoke(runtime, self.source.shape(), options)
    }
}

impl<S: Element, A: Admits<D>, D: Element> Accepts<D> for Like<'_, S, A> {}

pub struct Randperm {
    n: usize,
}

impl CreationOp for Randperm {
    type Context = i64;

    fn name(&self) -> &'static str {
        "randperm"
    }

    fn context(&self) -> Context {
        Context::defaults(DType::DEFAULT_INT)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        runtime.randperm(self.n, options)
    }
}

impl<D: RealElement> Accepts<D> for Randperm {}

/// Half-open range. `T` is the tuple of endpoint literal types.
pub struct Arange<T> {
    start: Scalar,
    end: Scalar,
    step: Scalar,
    _literals: PhantomData<T>,
}

impl<T: RangeLiterals> CreationOp for Arange<T> {
    type Context = T::Output;

    fn name(&self) -> &'static str {
        "arange"
    }

    fn context(&self) -> Context {
        Context::defaults(classify_range_result(self.start, self.end, self.step))
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        runtime.arange(self.start, self.end, self.step, options)
    }
}

impl<T: RangeLiterals, D: RealElement> Accepts<D> for Arange<T> {}

pub struct Linspace {
    start: f64,
    end: f64,
    steps: usize,
}

impl CreationOp for Linspace {
    type Context = f32;

    fn name(&self) -> &'static str {
        "linspace"
    }

    fn context(&self) -> Context {
        Context::defaults(DType::DEFAULT_FLOAT)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        runtime.linspace(self.start, self.end, self.steps, options)
    }
}

impl<D: RealElement> Accepts<D> for Linspace {}

pub struct Logspace {
    start: f64,
    end: f64,
    steps: usize,
    base: f64,
}

impl CreationOp for Logspace {
    type Context = f32;

    fn name(&self) -> &'static str {
        "logspace"
    }

    fn context(&self) -> Context {
        Context::defaults(DType::DEFAULT_FLOAT)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        runtime.logspace(self.start, self.end, self.steps, self.base, options)
    }
}

impl<D: RealElement> Accepts<D> for Logspace {}

pub struct Eye {
    rows: usize,
    cols: Option<usize>,
}

impl CreationOp for Eye {
    type Context = f32;

    fn name(&self) -> &'static str {
        "eye"
    }

    fn context(&self) -> Context {
        Context::defaults(DType::DEFAULT_FLOAT)
    }

    fn invoke(&self, runtime: &Runtime, options: &NativeOptions) -> NativeResult<RawTensor> {
        runtime.eye(self.rows, self.cols.unwrap_or(self.rows), options)
    }
}

impl<D: Element> Accepts<D> for Eye {}

/// Ops that allocate dense storage directly and so take placement options.
pub trait DenseFill: CreationOp {}

impl<C: Element, A> DenseFill for Shaped<C, A> {}
impl<S: Element, A> DenseFill for Like<'_, S, A> {}

// =============================================================================
// Builder
// =============================================================================

/// Pending creation. `K` is the dtype slot: [`Derive`] until
/// [`Creation::dtype`] pins it.
#[must_use = "a creation does nothing until `build` is called"]
pub struct Creation<'rt, O, K = Derive> {
    runtime: &'rt Runtime,
    op: O,
    layout: Slot<Layout>,
    device: Slot<Device>,
    memory_format: Slot<MemoryFormat>,
    requires_grad: bool,
    pin_memory: bool,
    _dtype: PhantomData<K>,
}

impl<'rt, O: CreationOp> Creation<'rt, O> {
    fn new(runtime: &'rt Runtime, op: O) -> Self {
        Self {
            runtime,
            op,
            layout: Slot::Derive,
            device: Slot::Derive,
            memory_format: Slot::Derive,
            requires_grad: false,
            pin_memory: false,
            _dtype: PhantomData,
        }
    }
}

impl<'rt, O: CreationOp, K: DTypeSlot> Creation<'rt, O, K> {
    /// Pin the element type of the result.
    pub fn dtype<D: Element>(self) -> Creation<'rt, O, Fixed<D>> {
        Creation {
            runtime: self.runtime,
            op: self.op,
            layout: self.layout,
            device: self.device,
            memory_format: self.memory_format,
            requires_grad: self.requires_grad,
            pin_memory: self.pin_memory,
            _dtype: PhantomData,
        }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Slot::Explicit(layout);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = Slot::Explicit(device);
        self
    }

    /// Request grad tracking. Only honored while grad mode is enabled on the
    /// calling thread.
    pub fn requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    /// The options `build` will hand to the native call.
    pub fn options(&self) -> TensorOptions {
        let context = self.op.context();
        compose(
            K::resolve(context.dtype),
            self.layout.resolve(context.layout),
            self.device.resolve(context.device),
            self.requires_grad,
            self.pin_memory,
            self.memory_format.resolve(context.memory_format),
        )
    }

    pub fn build(self) -> Result<Tensor<K::Output<<O as CreationOp>::Context>>>
    where
        O: Accepts<K::Output<<O as CreationOp>::Context>>,
    {
        let options = self.options();
        let raw = self.op.invoke(self.runtime, &options.to_native())?;
        Tensor::try_from_raw(raw)
    }
}

impl<O: DenseFill, K: DTypeSlot> Creation<'_, O, K> {
    /// Allocate in page-locked host memory. CPU only.
    pub fn pin_memory(mut self, pin_memory: bool) -> Self {
        self.pin_memory = pin_memory;
        self
    }

    /// `Preserve` keeps the context's format: the source's for `*_like` ops,
    /// contiguous otherwise.
    pub fn memory_format(mut self, memory_format: MemoryFormat) -> Self {
        self.memory_format = match memory_format {
            MemoryFormat::Preserve => Slot::Derive,
            format => Slot::Explicit(format),
        };
        self
    }
}

impl<K: DTypeSlot> Creation<'_, Logspace, K> {
    /// Base of the exponentials. Defaults to 10.
    pub fn base(mut self, base: f64) -> Self {
        self.op.base = base;
        self
    }
}

impl<K: DTypeSlot> Creation<'_, Eye, K> {
    /// Number of columns. Defaults to the number of rows.
    pub fn columns(mut self, cols: usize) -> Self {
        self.op.cols = Some(cols);
        self
    }
}

// =============================================================================
// Constructors
// =============================================================================

fn shaped<C: Element, A>(runtime: &Runtime, shape: Shape, fill: Fill) -> Creation<'_, Shaped<C, A>> {
    Creation::new(
        runtime,
        Shaped {
            shape,
            fill,
            _marker: PhantomData,
        },
    )
}

fn like<'a, S: Element, A>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
    fill: Fill,
) -> Creation<'a, Like<'a, S, A>> {
    Creation::new(
        runtime,
        Like {
            source,
            fill,
            _policy: PhantomData,
        },
    )
}

pub fn zeros(runtime: &Runtime, shape: impl Into<Shape>) -> Creation<'_, Shaped<f32>> {
    shaped(runtime, shape.into(), Fill::Zeros)
}

pub fn ones(runtime: &Runtime, shape: impl Into<Shape>) -> Creation<'_, Shaped<f32>> {
    shaped(runtime, shape.into(), Fill::Ones)
}

/// Storage with unspecified contents.
pub fn empty(runtime: &Runtime, shape: impl Into<Shape>) -> Creation<'_, Shaped<f32>> {
    shaped(runtime, shape.into(), Fill::Uninit)
}

/// Every element equal to `value`. Without an explicit dtype the result
/// takes the classified dtype of the literal.
pub fn full<L: Literal>(
    runtime: &Runtime,
    shape: impl Into<Shape>,
    value: L,
) -> Creation<'_, Shaped<Classified<L>>> {
    shaped(runtime, shape.into(), Fill::Value(value.to_scalar()))
}

/// Uniform samples on `[0, 1)`.
pub fn rand(runtime: &Runtime, shape: impl Into<Shape>) -> Creation<'_, Shaped<f32, FloatingOnly>> {
    shaped(runtime, shape.into(), Fill::Uniform)
}

/// Standard normal samples.
pub fn randn(runtime: &Runtime, shape: impl Into<Shape>) -> Creation<'_, Shaped<f32, FloatingOnly>> {
    shaped(runtime, shape.into(), Fill::Normal)
}

pub fn zeros_like<'a, S: Element>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
) -> Creation<'a, Like<'a, S>> {
    like(runtime, source, Fill::Zeros)
}

pub fn ones_like<'a, S: Element>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
) -> Creation<'a, Like<'a, S>> {
    like(runtime, source, Fill::Ones)
}

pub fn empty_like<'a, S: Element>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
) -> Creation<'a, Like<'a, S>> {
    like(runtime, source, Fill::Uninit)
}

/// Like [`full`], but the dtype derives from `source` rather than from `value`.
pub fn full_like<'a, S: Element, L: Literal>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
    value: L,
) -> Creation<'a, Like<'a, S>> {
    like(runtime, source, Fill::Value(value.to_scalar()))
}

pub fn rand_like<'a, S: Element>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
) -> Creation<'a, Like<'a, S, FloatingOnly>> {
    like(runtime, source, Fill::Uniform)
}

pub fn randn_like<'a, S: Element>(
    runtime: &'a Runtime,
    source: &'a Tensor<S>,
) -> Creation<'a, Like<'a, S, FloatingOnly>> {
    like(runtime, source, Fill::Normal)
}

/// Random permutation of `0..n`, `i64` unless overridden.
pub fn randperm(runtime: &Runtime, n: usize) -> Creation<'_, Randperm> {
    Creation::new(runtime, Randperm { n })
}

/// `0, 1, ..., end - 1`.
pub fn arange<E>(runtime: &Runtime, end: E) -> Creation<'_, Arange<(i64, E, i64)>>
where
    E: Literal,
    (i64, E, i64): RangeLiterals,
{
    arange_from(runtime, 0i64, end, 1i64)
}

/// `start, start + step, ...` strictly before `end`. Integral when all three
/// endpoints are integers, floating otherwise.
pub fn arange_from<A, B, C>(
    runtime: &Runtime,
    start: A,
    end: B,
    step: C,
) -> Creation<'_, Arange<(A, B, C)>>
where
    A: Literal,
    B: Literal,
    C: Literal,
    (A, B, C): RangeLiterals,
{
    Creation::new(
        runtime,
        Arange {
            start: start.to_scalar(),
            end: end.to_scalar(),
            step: step.to_scalar(),
            _literals: PhantomData,
        },
    )
}

/// `steps` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(runtime: &Runtime, start: f64, end: f64, steps: usize) -> Creation<'_, Linspace> {
    Creation::new(runtime, Linspace { start, end, steps })
}

/// `base` raised to `steps` evenly spaced exponents from `start` to `end`.
pub fn logspace(runtime: &Runtime, start: f64, end: f64, steps: usize) -> Creation<'_, Logspace> {
    Creation::new(
        runtime,
        Logspace {
            start,
            end,
            steps,
            base: 10.0,
        },
    )
}

/// `n x n` identity.
pub fn eye(runtime: &Runtime, n: usize) -> Creation<'_, Eye> {
    Creation::new(runtime, Eye { rows: n, cols: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KilnError;
    use kiln_native::{NativeError, RuntimeConfig};

    fn rt() -> Runtime {
        Runtime::new(RuntimeConfig::default().with_num_threads(2).with_seed(7))
    }

    #[test]
    fn test_options_resolve_before_native_call() {
        let rt = rt();
        let pending = zeros(&rt, [2, 3]).device(Device::Cuda(0)).requires_grad(true);
        let opts = pending.options();
        assert_eq!(opts.dtype, DType::Float32);
        assert_eq!(opts.device, Device::Cuda(0));
        assert_eq!(opts.layout, Layout::Strided);
        assert!(opts.requires_grad);
        assert_eq!(rt.live_allocations(), 0);
    }

    #[test]
    fn test_full_derives_from_literal() {
        let rt = rt();
        assert_eq!(full(&rt, [1], true).options().dtype, DType::Bool);
        assert_eq!(full(&rt, [1], 3u8).options().dtype, DType::Int64);
        assert_eq!(full(&rt, [1], 0.5).options().dtype, DType::Float32);
        assert_eq!(full(&rt, [1], 0.5).dtype::<f64>().options().dtype, DType::Float64);

        let t = full(&rt, [3], 2.5f64).build().unwrap();
        assert_eq!(t.to_vec().unwrap(), vec![2.5f32; 3]);
    }

    #[test]
    fn test_like_derives_each_slot_independently() {
        let rt = Runtime::new(RuntimeConfig::default().with_accelerators(1));
        let src = ones(&rt, [2, 2]).dtype::<i16>().device(Device::Cuda(0)).build().unwrap();

        let derived = zeros_like(&rt, &src).options();
        assert_eq!(derived.dtype, DType::Int16);
        assert_eq!(derived.device, Device::Cuda(0));

        let mixed = zeros_like(&rt, &src).device(Device::Cpu).options();
        assert_eq!(mixed.dtype, DType::Int16);
        assert_eq!(mixed.device, Device::Cpu);

        let z = zeros_like(&rt, &src).dtype::<f64>().build().unwrap();
        assert_eq!(z.dims(), &[2, 2]);
        assert_eq!(z.device(), Device::Cuda(0));
        assert_eq!(z.dtype(), DType::Float64);
    }

    #[test]
    fn test_full_like_uses_source_dtype() {
        let rt = rt();
        let src = zeros(&rt, [3]).dtype::<i32>().build().unwrap();
        let t = full_like(&rt, &src, 4.9).build().unwrap();
        assert_eq!(t.dtype(), DType::Int32);
        assert_eq!(t.to_vec().unwrap(), vec![4i32; 3]);
    }

    #[test]
    fn test_memory_format_resolution() {
        let rt = rt();
        let nhwc = empty(&rt, [1, 3, 2, 2])
            .memory_format(MemoryFormat::ChannelsLast)
            .build()
            .unwrap();
        assert_eq!(nhwc.memory_format(), MemoryFormat::ChannelsLast);

        let preserved = empty_like(&rt, &nhwc)
            .memory_format(MemoryFormat::Preserve)
            .options();
        assert_eq!(preserved.memory_format, MemoryFormat::ChannelsLast);
        assert_eq!(
            empty(&rt, [2]).memory_format(MemoryFormat::Preserve).options().memory_format,
            MemoryFormat::Contiguous
        );
    }

    #[test]
    fn test_pin_memory() {
        let rt = Runtime::new(RuntimeConfig::default().with_accelerators(1));
        let pinned = empty(&rt, [4]).pin_memory(true).build().unwrap();
        assert!(pinned.is_pinned());

        let err = empty(&rt, [4])
            .pin_memory(true)
            .device(Device::Cuda(0))
            .build()
            .unwrap_err();
        assert_eq!(err, KilnError::Native(NativeError::PinnedMemory(Device::Cuda(0))));
        assert_eq!(rt.live_allocations(), 1);
    }

    #[test]
    fn test_random_ops() {
        let rt = rt();
        let u = rand(&rt, [64]).dtype::<f64>().build().unwrap();
        assert!(u.to_vec().unwrap().iter().all(|x| (0.0f64..1.0).contains(x)));

        let n = randn(&rt, [2, 2]).build().unwrap();
        assert_eq!(n.dtype(), DType::Float32);

        let c = rand_like(&rt, &n).dtype::<num_complex::Complex<f64>>().build().unwrap();
        assert_eq!(c.dtype(), DType::Complex128);

        let p = randperm(&rt, 6).build().unwrap();
        let mut values = p.to_vec().unwrap();
        values.sort_unstable();
        assert_eq!(values, vec![0i64, 1, 2, 3, 4, 5]);

        let p32 = randperm(&rt, 3).dtype::<i32>().build().unwrap();
        assert_eq!(p32.dtype(), DType::Int32);
    }

    #[test]
    fn test_seed_reproducibility() {
        let rt = rt();
        rt.manual_seed(11);
        let a = randn(&rt, [8]).dtype::<f64>().build().unwrap().to_vec().unwrap();
        rt.manual_seed(11);
        let b = randn(&rt, [8]).dtype::<f64>().build().unwrap().to_vec().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ranges() {
        let rt = rt();
        let r = arange(&rt, 4).build().unwrap();
        assert_eq!(r.to_vec().unwrap(), vec![0i64, 1, 2, 3]);

        let f = arange_from(&rt, 0, 1.0, 0.25).build().unwrap();
        assert_eq!(f.dtype(), DType::Float32);
        assert_eq!(f.to_vec().unwrap(), vec![0.0f32, 0.25, 0.5, 0.75]);

        let narrow = arange_from(&rt, 10u8, 0u8, -3i8).dtype::<i16>().build().unwrap();
        assert_eq!(narrow.to_vec().unwrap(), vec![10i16, 7, 4, 1]);

        let l = linspace(&rt, -1.0, 1.0, 5).build().unwrap();
        assert_eq!(l.to_vec().unwrap(), vec![-1.0f32, -0.5, 0.0, 0.5, 1.0]);

        let g = logspace(&rt, 0.0, 2.0, 3).dtype::<f64>().build().unwrap();
        assert_eq!(g.to_vec().unwrap(), vec![1.0f64, 10.0, 100.0]);
        let b2 = logspace(&rt, 0.0, 2.0, 3).base(2.0).build().unwrap();
        assert_eq!(b2.to_vec().unwrap(), vec![1.0f32, 2.0, 4.0]);
    }

    #[test]
    fn test_eye() {
        let rt = rt();
        let i = eye(&rt, 3).build().unwrap();
        assert_eq!(i.dims(), &[3, 3]);
        assert_eq!(
            i.to_vec().unwrap(),
            vec![1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        let wide = eye(&rt, 2).columns(3).dtype::<bool>().build().unwrap();
        assert_eq!(wide.to_vec().unwrap(), vec![true, false, false, false, true, false]);
    }

    #[test]
    fn test_native_rejections_propagate() {
        let rt = rt();
        let err = zeros(&rt, [2]).dtype::<i64>().requires_grad(true).build().unwrap_err();
        assert!(matches!(err, KilnError::Native(NativeError::GradOnNonFloating(_))));

        let err = zeros(&rt, [2]).layout(Layout::SparseCoo).build().unwrap_err();
        assert!(matches!(err, KilnError::Native(NativeError::UnsupportedLayout { .. })));

        let err = ones(&rt, [2]).device(Device::Cuda(0)).build().unwrap_err();
        assert_eq!(err, KilnError::Native(NativeError::UnsupportedDevice(Device::Cuda(0))));

        let err = arange_from(&rt, 0, 5, 0).build().unwrap_err();
        assert!(matches!(err, KilnError::Native(NativeError::InvalidArgument(_))));

        assert_eq!(rt.live_allocations(), 0);
    }
}
