use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use half::{bf16, f16};
use num_complex::Complex;
use rayon::prelude::*;

use crate::element::{NativeElement, Value};
use crate::{Device, Kind, NativeError, NativeResult};

/// Typed element buffer backing one native resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    Bool(Vec<bool>),
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Half(Vec<f16>),
    BFloat16(Vec<bf16>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ComplexFloat(Vec<Complex<f32>>),
    ComplexDouble(Vec<Complex<f64>>),
}

/// Run `$body` with `$T` aliased to the host type for `$kind`.
macro_rules! with_element {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            Kind::Bool => { type $T = bool; $body }
            Kind::Uint8 => { type $T = u8; $body }
            Kind::Int8 => { type $T = i8; $body }
            Kind::Int16 => { type $T = i16; $body }
            Kind::Int32 => { type $T = i32; $body }
            Kind::Int64 => { type $T = i64; $body }
            Kind::Half => { type $T = f16; $body }
            Kind::BFloat16 => { type $T = bf16; $body }
            Kind::Float => { type $T = f32; $body }
            Kind::Double => { type $T = f64; $body }
            Kind::ComplexFloat => { type $T = Complex<f32>; $body }
            Kind::ComplexDouble => { type $T = Complex<f64>; $body }
        }
    };
}

macro_rules! match_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            Buffer::Bool($v) => $body,
            Buffer::Uint8($v) => $body,
            Buffer::Int8($v) => $body,
            Buffer::Int16($v) => $body,
            Buffer::Int32($v) => $body,
            Buffer::Int64($v) => $body,
            Buffer::Half($v) => $body,
            Buffer::BFloat16($v) => $body,
            Buffer::Float($v) => $body,
            Buffer::Double($v) => $body,
            Buffer::ComplexFloat($v) => $body,
            Buffer::ComplexDouble($v) => $body,
        }
    };
}

impl Buffer {
    pub fn kind(&self) -> Kind {
        match self {
            Buffer::Bool(_) => Kind::Bool,
            Buffer::Uint8(_) => Kind::Uint8,
            Buffer::Int8(_) => Kind::Int8,
            Buffer::Int16(_) => Kind::Int16,
            Buffer::Int32(_) => Kind::Int32,
            Buffer::Int64(_) => Kind::Int64,
            Buffer::Half(_) => Kind::Half,
            Buffer::BFloat16(_) => Kind::BFloat16,
            Buffer::Float(_) => Kind::Float,
            Buffer::Double(_) => Kind::Double,
            Buffer::ComplexFloat(_) => Kind::ComplexFloat,
            Buffer::ComplexDouble(_) => Kind::ComplexDouble,
        }
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        match_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nbytes(&self) -> usize {
        self.len() * self.kind().element_size()
    }

    /// Element `index` as `(re, im)`.
    pub fn parts(&self, index: usize) -> Option<(f64, f64)> {
        match_buffer!(self, v => v.get(index).map(|x| x.to_parts()))
    }

    /// Build a buffer sequentially; used by generators that carry state (RNGs).
    pub fn from_fn<V: Into<Value>>(kind: Kind, numel: usize, mut f: impl FnMut(usize) -> V) -> Self {
        with_element!(kind, T => {
            let data: Vec<T> = (0..numel).map(|i| T::from_value(f(i).into())).collect();
            T::into_buffer(data)
        })
    }

    /// Build a buffer in parallel on `pool`; `f` must be a pure function of the index.
    pub fn par_from_fn<V: Into<Value>>(
        pool: &rayon::ThreadPool,
        kind: Kind,
        numel: usize,
        f: impl Fn(usize) -> V + Send + Sync,
    ) -> Self {
        with_element!(kind, T => {
            let data: Vec<T> = pool.install(|| {
                (0..numel)
                    .into_par_iter()
                    .map(|i| T::from_value(f(i).into()))
                    .collect()
            });
            T::into_buffer(data)
        })
    }

    /// Element-wise conversion into another kind.
    pub fn cast(&self, kind: Kind) -> Self {
        if kind == self.kind() {
            return self.clone();
        }
        match_buffer!(self, v => Buffer::from_fn(kind, v.len(), |i| v[i].to_value()))
    }

    /// Concatenate row-major blocks: `parts[j]` holds `outer * sizes[j] * inner` elements.
    ///
    /// Returns `None` if the parts do not share one kind.
    pub fn concat(parts: &[&Buffer], outer: usize, sizes: &[usize], inner: usize) -> Option<Self> {
        let first = parts.first()?;
        with_element!(first.kind(), T => concat_typed::<T>(parts, outer, sizes, inner))
    }

    /// Typed view of the elements.
    pub fn as_slice<T: NativeElement>(&self) -> Option<&[T]> {
        T::slice(self)
    }
}

fn concat_typed<T: NativeElement>(
    parts: &[&Buffer],
    outer: usize,
    sizes: &[usize],
    inner: usize,
) -> Option<Buffer> {
    let slices = parts
        .iter()
        .map(|b| T::slice(b))
        .collect::<Option<Vec<&[T]>>>()?;
    let total: usize = sizes.iter().sum();
    let mut out = Vec::with_capacity(outer * total * inner);
    for o in 0..outer {
        for (src, &n) in slices.iter().zip(sizes) {
            let start = o * n * inner;
            out.extend_from_slice(&src[start..start + n * inner]);
        }
    }
    Some(T::into_buffer(out))
}

/// Per-runtime bookkeeping of live native allocations.
#[derive(Debug)]
pub(crate) struct Allocator {
    live: AtomicUsize,
    live_bytes: AtomicUsize,
    accelerators: usize,
}

impl Allocator {
    pub(crate) fn new(accelerators: usize) -> Self {
        Self {
            live: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            accelerators,
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Acquire)
    }

    /// Reject devices this runtime cannot place memory on.
    pub(crate) fn check_device(&self, device: Device) -> NativeResult<()> {
        match device {
            Device::Cpu => Ok(()),
            Device::Cuda(idx) if idx < self.accelerators => Ok(()),
            other => Err(NativeError::UnsupportedDevice(other)),
        }
    }

    /// Reject element counts whose byte size cannot be addressed.
    pub(crate) fn check_size(kind: Kind, numel: usize) -> NativeResult<()> {
        match numel.checked_mul(kind.element_size()) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(()),
            _ => Err(NativeError::AllocationFailed { kind, numel }),
        }
    }
}

/// One native allocation: elements plus placement. Dropping it releases the slot.
#[derive(Debug)]
pub struct Storage {
    buffer: Buffer,
    device: Device,
    pinned: bool,
    allocator: Arc<Allocator>,
}

impl Storage {
    pub(crate) fn new(allocator: &Arc<Allocator>, buffer: Buffer, device: Device, pinned: bool) -> Self {
        allocator.live.fetch_add(1, Ordering::AcqRel);
        allocator.live_bytes.fetch_add(buffer.nbytes(), Ordering::AcqRel);
        Self {
            buffer,
            device,
            pinned,
            allocator: Arc::clone(allocator),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn kind(&self) -> Kind {
        self.buffer.kind()
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn numel(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn allocator(&self) -> &Arc<Allocator> {
        &self.allocator
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        self.allocator.live.fetch_sub(1, Ordering::AcqRel);
        self.allocator
            .live_bytes
            .fetch_sub(self.buffer.nbytes(), Ordering::AcqRel);
        tracing::trace!(
            kind = %self.buffer.kind(),
            numel = self.buffer.len(),
            device = %self.device,
            "native storage released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_and_parts() {
        let b = Buffer::from_fn(Kind::Int32, 4, |i| (i as f64 * 2.0, 0.0));
        assert_eq!(b.kind(), Kind::Int32);
        assert_eq!(b.as_slice::<i32>().unwrap(), &[0, 2, 4, 6]);
        assert_eq!(b.parts(3), Some((6.0, 0.0)));
        assert_eq!(b.parts(4), None);
        assert_eq!(b.nbytes(), 16);
    }

    #[test]
    fn test_cast() {
        let b = Buffer::Float(vec![1.5, -2.0, 0.0]);
        let c = b.cast(Kind::Int64);
        assert_eq!(c.as_slice::<i64>().unwrap(), &[1, -2, 0]);
        let z = b.cast(Kind::Bool);
        assert_eq!(z.as_slice::<bool>().unwrap(), &[true, true, false]);
    }

    #[test]
    fn test_integer_casts_skip_f64() {
        let big = (1i64 << 53) + 1;
        let b = Buffer::Int64(vec![big, -1]);
        assert_eq!(b.cast(Kind::Int32).as_slice::<i32>().unwrap(), &[1, -1]);
        assert_eq!(b.cast(Kind::Uint8).as_slice::<u8>().unwrap(), &[1, 255]);

        let exact = Buffer::from_fn(Kind::Int64, 2, |i| big + i as i64);
        assert_eq!(exact.as_slice::<i64>().unwrap(), &[big, big + 1]);
    }

    #[test]
    fn test_concat_blocks() {
        // two [2, 2] tensors joined along axis 1
        let a = Buffer::Float(vec![1.0, 2.0, 3.0, 4.0]);
        let b = Buffer::Float(vec![5.0, 6.0, 7.0, 8.0]);
        let c = Buffer::concat(&[&a, &b], 2, &[2, 2], 1).unwrap();
        assert_eq!(
            c.as_slice::<f32>().unwrap(),
            &[1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 7.0, 8.0]
        );
    }

    #[test]
    fn test_concat_rejects_mixed_kinds() {
        let a = Buffer::Float(vec![1.0]);
        let b = Buffer::Int64(vec![1]);
        assert!(Buffer::concat(&[&a, &b], 1, &[1, 1], 1).is_none());
    }

    #[test]
    fn test_allocator_accounting() {
        let alloc = Arc::new(Allocator::new(0));
        {
            let _s = Storage::new(&alloc, Buffer::Double(vec![0.0; 4]), Device::Cpu, false);
            assert_eq!(alloc.live(), 1);
            assert_eq!(alloc.live_bytes(), 32);
        }
        assert_eq!(alloc.live(), 0);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn test_device_check() {
        let alloc = Allocator::new(1);
        assert!(alloc.check_device(Device::Cpu).is_ok());
        assert!(alloc.check_device(Device::Cuda(0)).is_ok());
        assert_eq!(
            alloc.check_device(Device::Cuda(1)),
            Err(NativeError::UnsupportedDevice(Device::Cuda(1)))
        );
    }
}
