//! Runtime handle: native constructors and process-wide configuration.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::element::Value;
use crate::storage::{Allocator, Buffer, Storage};
use crate::{
    Kind, Layout, MemoryFormat, NativeError, NativeOptions, NativeResult, RawTensor,
    RuntimeConfig, Scalar, Shape,
};

static GLOBAL: OnceLock<Runtime> = OnceLock::new();

/// Handle to a native runtime instance.
///
/// Cloning is cheap and yields another handle to the same instance. The seed,
/// thread count and allocation counter are shared by every handle of one
/// instance; separate instances are fully isolated, which is what tests use.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

struct Inner {
    allocator: Arc<Allocator>,
    rng: Mutex<StdRng>,
    pool: RwLock<Option<Arc<rayon::ThreadPool>>>,
    num_threads: AtomicUsize,
}

fn build_pool(num_threads: usize) -> Option<Arc<rayon::ThreadPool>> {
    match rayon::ThreadPoolBuilder::new().num_threads(num_threads).build() {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            tracing::warn!(num_threads, error = %e, "kernel thread pool unavailable, filling sequentially");
            None
        }
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let num_threads = config.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tracing::debug!(
            num_threads,
            seed = ?config.seed,
            accelerators = config.accelerators,
            "native runtime initialized"
        );
        Self {
            inner: Arc::new(Inner {
                allocator: Arc::new(Allocator::new(config.accelerators)),
                rng: Mutex::new(rng),
                pool: RwLock::new(build_pool(num_threads)),
                num_threads: AtomicUsize::new(num_threads),
            }),
        }
    }

    /// The process-wide runtime, configured from the environment on first use.
    pub fn global() -> &'static Runtime {
        GLOBAL.get_or_init(|| Runtime::new(RuntimeConfig::from_env()))
    }

    // =========================================================================
    // Process-wide state
    // =========================================================================

    /// Reseed the generator used by `rand`, `randn` and `randperm`.
    pub fn manual_seed(&self, seed: u64) {
        *self.inner.rng.lock() = StdRng::seed_from_u64(seed);
        tracing::debug!(seed, "native generator reseeded");
    }

    /// Set kernel parallelism for every later fill on this runtime.
    pub fn set_num_threads(&self, n: usize) -> NativeResult<()> {
        if n == 0 {
            return Err(NativeError::InvalidArgument(
                "set_num_threads: thread count must be positive".into(),
            ));
        }
        *self.inner.pool.write() = build_pool(n);
        self.inner.num_threads.store(n, Ordering::Release);
        tracing::debug!(num_threads = n, "native kernel parallelism updated");
        Ok(())
    }

    pub fn num_threads(&self) -> usize {
        self.inner.num_threads.load(Ordering::Acquire)
    }

    /// Number of native storages currently alive on this runtime.
    pub fn live_allocations(&self) -> usize {
        self.inner.allocator.live()
    }

    pub fn live_bytes(&self) -> usize {
        self.inner.allocator.live_bytes()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn zeros(&self, shape: &Shape, options: &NativeOptions) -> NativeResult<RawTensor> {
        self.filled("zeros", shape, options, |_| (0.0, 0.0))
    }

    pub fn ones(&self, shape: &Shape, options: &NativeOptions) -> NativeResult<RawTensor> {
        self.filled("ones", shape, options, |_| (1.0, 0.0))
    }

    /// Storage with unspecified contents. This engine hands out zeroed memory.
    pub fn empty(&self, shape: &Shape, options: &NativeOptions) -> NativeResult<RawTensor> {
        self.filled("empty", shape, options, |_| (0.0, 0.0))
    }

    pub fn full(
        &self,
        shape: &Shape,
        fill: Scalar,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        self.filled("full", shape, options, move |_| fill)
    }

    /// Uniform samples on `[0, 1)`.
    pub fn rand(&self, shape: &Shape, options: &NativeOptions) -> NativeResult<RawTensor> {
        require_kind("rand", options.kind, Kind::supports_grad)?;
        self.sampled("rand", shape, options, |rng| rng.gen::<f64>())
    }

    /// Standard normal samples.
    pub fn randn(&self, shape: &Shape, options: &NativeOptions) -> NativeResult<RawTensor> {
        require_kind("randn", options.kind, Kind::supports_grad)?;
        self.sampled("randn", shape, options, |rng| rng.sample::<f64, _>(StandardNormal))
    }

    /// Random permutation of `0..n`.
    pub fn randperm(&self, n: usize, options: &NativeOptions) -> NativeResult<RawTensor> {
        require_kind("randperm", options.kind, is_real)?;
        let shape = Shape::new(&[n]);
        self.prepare("randperm", &shape, options)?;
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(&mut *self.inner.rng.lock());
        let buffer = Buffer::from_fn(options.kind, n, |i| perm[i] as i64);
        Ok(self.finish("randperm", buffer, shape, options))
    }

    /// Values `start, start + step, ...` strictly before `end`.
    pub fn arange(
        &self,
        start: Scalar,
        end: Scalar,
        step: Scalar,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        require_kind("arange", options.kind, is_real)?;
        if let (Some(start), Some(end), Some(step)) = (start.to_i64(), end.to_i64(), step.to_i64()) {
            return self.integral_arange(start, end, step, options);
        }
        let (start, end, step) = (start.to_f64(), end.to_f64(), step.to_f64());
        if step == 0.0 {
            return Err(NativeError::InvalidArgument("arange: step must be nonzero".into()));
        }
        let span = (end - start) / step;
        if !span.is_finite() {
            return Err(NativeError::InvalidArgument(format!(
                "arange: unsupported range {start}..{end} by {step}"
            )));
        }
        if span < 0.0 {
            return Err(inconsistent_range(start, end, step));
        }
        let n = span.ceil() as usize;
        self.filled("arange", &Shape::new(&[n]), options, move |i| {
            (start + i as f64 * step, 0.0)
        })
    }

    /// Integer bounds: every element is computed exactly.
    fn integral_arange(
        &self,
        start: i64,
        end: i64,
        step: i64,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        if step == 0 {
            return Err(NativeError::InvalidArgument("arange: step must be nonzero".into()));
        }
        let span = i128::from(end) - i128::from(start);
        if span != 0 && (span < 0) != (step < 0) {
            return Err(inconsistent_range(start, end, step));
        }
        let stride = i128::from(step).abs();
        let count = (span.abs() + stride - 1) / stride;
        // Oversized counts saturate and are rejected by the size check.
        let n = usize::try_from(count).unwrap_or(usize::MAX);
        self.filled("arange", &Shape::new(&[n]), options, move |i| {
            // Lies between `start` and `end`, so narrowing is exact.
            (i128::from(start) + i as i128 * i128::from(step)) as i64
        })
    }

    /// `steps` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(
        &self,
        start: f64,
        end: f64,
        steps: usize,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        require_kind("linspace", options.kind, is_real)?;
        let point = linspace_point(start, end, steps);
        self.filled("linspace", &Shape::new(&[steps]), options, move |i| (point(i), 0.0))
    }

    /// `base` raised to `steps` evenly spaced exponents from `start` to `end`.
    pub fn logspace(
        &self,
        start: f64,
        end: f64,
        steps: usize,
        base: f64,
        options: &NativeOptions,
    ) -> NativeResult<RawTensor> {
        require_kind("logspace", options.kind, is_real)?;
        let point = linspace_point(start, end, steps);
        self.filled("logspace", &Shape::new(&[steps]), options, move |i| {
            (base.powf(point(i)), 0.0)
        })
    }

    /// `rows x cols` matrix with ones on the main diagonal.
    pub fn eye(&self, rows: usize, cols: usize, options: &NativeOptions) -> NativeResult<RawTensor> {
        let shape = Shape::new(&[rows, cols]);
        self.filled("eye", &shape, options, move |i| {
            let on_diagonal = cols > 0 && i / cols == i % cols;
            (if on_diagonal { 1.0 } else { 0.0 }, 0.0)
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Validate options against this engine before any allocation.
    fn prepare(&self, op: &'static str, shape: &Shape, options: &NativeOptions) -> NativeResult<()> {
        self.inner.allocator.check_device(options.device)?;
        if options.layout != Layout::Strided {
            return Err(NativeError::UnsupportedLayout {
                op,
                layout: options.layout,
            });
        }
        if options.pinned_memory && !options.device.is_cpu() {
            return Err(NativeError::PinnedMemory(options.device));
        }
        if options.memory_format == MemoryFormat::ChannelsLast && shape.ndim() != 4 {
            return Err(NativeError::InvalidArgument(format!(
                "{op}: channels_last memory format requires a 4-D shape, got {shape}"
            )));
        }
        if options.requires_grad && !options.kind.supports_grad() {
            return Err(NativeError::GradOnNonFloating(options.kind));
        }
        let numel = shape.checked_numel().ok_or(NativeError::AllocationFailed {
            kind: options.kind,
            numel: usize::MAX,
        })?;
        Allocator::check_size(options.kind, numel)
    }

    fn filled<V: Into<Value>>(
        &self,
        op: &'static str,
        shape: &Shape,
        options: &NativeOptions,
        f: impl Fn(usize) -> V + Send + Sync,
    ) -> NativeResult<RawTensor> {
        self.prepare(op, shape, options)?;
        let pool = self.inner.pool.read().clone();
        let buffer = match pool {
            Some(pool) => Buffer::par_from_fn(&pool, options.kind, shape.numel(), f),
            None => Buffer::from_fn(options.kind, shape.numel(), f),
        };
        Ok(self.finish(op, buffer, shape.clone(), options))
    }

    /// Draw real and imaginary parts independently; real kinds discard the latter.
    fn sampled(
        &self,
        op: &'static str,
        shape: &Shape,
        options: &NativeOptions,
        mut sample: impl FnMut(&mut StdRng) -> f64,
    ) -> NativeResult<RawTensor> {
        self.prepare(op, shape, options)?;
        let complex = options.kind.is_complex();
        let mut guard = self.inner.rng.lock();
        let rng: &mut StdRng = &mut guard;
        let buffer = Buffer::from_fn(options.kind, shape.numel(), |_| {
            let re = sample(&mut *rng);
            let im = if complex { sample(&mut *rng) } else { 0.0 };
            (re, im)
        });
        drop(guard);
        Ok(self.finish(op, buffer, shape.clone(), options))
    }

    pub(crate) fn finish(
        &self,
        op: &'static str,
        buffer: Buffer,
        shape: Shape,
        options: &NativeOptions,
    ) -> RawTensor {
        tracing::trace!(op, shape = %shape, options = %options, "native constructor");
        let storage = Storage::new(
            &self.inner.allocator,
            buffer,
            options.device,
            options.pinned_memory,
        );
        RawTensor::new(storage, shape, options)
    }
}

fn require_kind(op: &'static str, kind: Kind, allowed: fn(&Kind) -> bool) -> NativeResult<()> {
    if allowed(&kind) {
        Ok(())
    } else {
        Err(NativeError::UnsupportedKind(op, kind))
    }
}

fn inconsistent_range(start: impl Display, end: impl Display, step: impl Display) -> NativeError {
    NativeError::InvalidArgument(format!(
        "arange: upper bound {end} and lower bound {start} inconsistent with step sign {step}"
    ))
}

fn is_real(kind: &Kind) -> bool {
    !matches!(kind, Kind::Bool | Kind::ComplexFloat | Kind::ComplexDouble)
}

fn linspace_point(start: f64, end: f64, steps: usize) -> impl Fn(usize) -> f64 + Send + Sync {
    let step = if steps > 1 {
        (end - start) / (steps - 1) as f64
    } else {
        0.0
    };
    move |i| {
        if steps > 1 && i == steps - 1 {
            end
        } else {
            start + i as f64 * step
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("num_threads", &self.num_threads())
            .field("live_allocations", &self.live_allocations())
            .finish()
    }
}
