//! The typed tensor handle.

use std::fmt;
use std::marker::PhantomData;

use kiln_native::{Device, Layout, MemoryFormat, RawTensor, Shape};

use crate::{DType, Element, KilnError, Result};

const DISPLAY_LIMIT: usize = 8;

/// Owned handle to one native tensor whose elements are of type `D`.
///
/// The runtime tag of the underlying resource equals `D::DTYPE` for the whole
/// life of the handle: handles are built through [`Tensor::try_from_raw`],
/// which reads the tag back from the resource, or by infallible conversions
/// that assert it. No operation on a handle changes the tag in place.
/// Dropping the handle releases the resource.
///
/// `Clone` is a deep copy: the clone owns a fresh native allocation.
pub struct Tensor<D: Element> {
    raw: RawTensor,
    _dtype: PhantomData<D>,
}

impl<D: Element> Tensor<D> {
    /// Checked construction from a native resource.
    ///
    /// Fails with [`KilnError::ResourceInvariantViolation`] when the resource
    /// holds some other element type. The resource is released in that case.
    pub fn try_from_raw(raw: RawTensor) -> Result<Self> {
        let actual = DType::from_kind(raw.kind());
        if actual != D::DTYPE {
            tracing::warn!(declared = %D::DTYPE, %actual, "rejected native resource with foreign element tag");
            return Err(KilnError::ResourceInvariantViolation {
                declared: D::DTYPE,
                actual,
            });
        }
        Ok(Self {
            raw,
            _dtype: PhantomData,
        })
    }

    /// Wrap a resource an infallible conversion just produced for `D`.
    ///
    /// # Panics
    ///
    /// If the native conversion returned some other element type.
    fn from_converted(raw: RawTensor) -> Self {
        assert_eq!(
            DType::from_kind(raw.kind()),
            D::DTYPE,
            "native conversion produced a foreign element tag"
        );
        Self {
            raw,
            _dtype: PhantomData,
        }
    }

    pub(crate) fn native(&self) -> &RawTensor {
        &self.raw
    }

    /// Give up the typed view and return the native resource.
    pub fn into_raw(self) -> RawTensor {
        self.raw
    }

    /// Element type, read from the native resource.
    ///
    /// # Panics
    ///
    /// If the resource's tag no longer matches `D`, which checked
    /// construction rules out.
    pub fn dtype(&self) -> DType {
        let live = DType::from_kind(self.raw.kind());
        assert_eq!(
            live,
            D::DTYPE,
            "tensor declared as {} holds {} elements",
            D::DTYPE,
            live
        );
        live
    }

    pub fn device(&self) -> Device {
        self.raw.device()
    }

    pub fn layout(&self) -> Layout {
        self.raw.layout()
    }

    pub fn shape(&self) -> &Shape {
        self.raw.shape()
    }

    pub fn dims(&self) -> &[usize] {
        self.raw.shape().dims()
    }

    pub fn ndim(&self) -> usize {
        self.raw.shape().ndim()
    }

    pub fn numel(&self) -> usize {
        self.raw.numel()
    }

    pub fn requires_grad(&self) -> bool {
        self.raw.requires_grad()
    }

    pub fn memory_format(&self) -> MemoryFormat {
        self.raw.memory_format()
    }

    pub fn is_pinned(&self) -> bool {
        self.raw.is_pinned()
    }

    pub fn strides(&self) -> Vec<usize> {
        self.raw.strides().to_vec()
    }

    /// Whether both handles own the same native resource.
    pub fn shares_storage<E: Element>(&self, other: &Tensor<E>) -> bool {
        self.raw.shares_storage(&other.raw)
    }

    /// Copy onto `device`. The copy is a new resource even when the device is
    /// unchanged.
    pub fn to(&self, device: Device) -> Result<Tensor<D>> {
        Tensor::try_from_raw(self.raw.to_device(device)?)
    }

    /// Element-wise conversion to `E`.
    pub fn to_dtype<E: Element>(&self) -> Tensor<E> {
        Tensor::from_converted(self.raw.to_kind(E::DTYPE.kind()))
    }

    /// Independent copy on the same device.
    pub fn deep_clone(&self) -> Tensor<D> {
        Self::from_converted(self.raw.deep_clone())
    }

    /// Elements in logical order. CPU tensors only.
    pub fn to_vec(&self) -> Result<Vec<D>> {
        Ok(self.raw.to_vec::<D>()?)
    }
}

impl<D: Element> Clone for Tensor<D> {
    fn clone(&self) -> Self {
        self.deep_clone()
    }
}

impl<D: Element> fmt::Debug for Tensor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(shape={}, dtype={}, device={}, layout={}, requires_grad={})",
            self.shape(),
            self.dtype(),
            self.device(),
            self.layout(),
            self.requires_grad(),
        )
    }
}

impl<D: Element> fmt::Display for Tensor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor(")?;
        match self.raw.to_vec::<D>() {
            Ok(data) => {
                let shown: Vec<String> = data
                    .iter()
                    .take(DISPLAY_LIMIT)
                    .map(|v| format!("{v:?}"))
                    .collect();
                write!(f, "[{}", shown.join(", "))?;
                if data.len() > DISPLAY_LIMIT {
                    write!(f, ", ... ({} total)", data.len())?;
                }
                write!(f, "], ")?;
            }
            Err(_) => write!(f, "<{}>, ", self.device())?,
        }
        write!(f, "shape={}, dtype={})", self.shape(), self.dtype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_native::{Kind, NativeOptions, Runtime, RuntimeConfig, Scalar};

    fn rt() -> Runtime {
        Runtime::new(RuntimeConfig::default().with_num_threads(1).with_accelerators(1))
    }

    fn raw_ones(rt: &Runtime, kind: Kind, dims: &[usize]) -> RawTensor {
        rt.ones(&Shape::new(dims), &NativeOptions::new(kind)).unwrap()
    }

    #[test]
    fn test_checked_construction() {
        let rt = rt();
        let t = Tensor::<f32>::try_from_raw(raw_ones(&rt, Kind::Float, &[2, 2])).unwrap();
        assert_eq!(t.dtype(), DType::Float32);
        assert_eq!(t.dims(), &[2, 2]);
        assert_eq!(t.numel(), 4);
        assert_eq!(t.strides(), vec![2, 1]);
    }

    #[test]
    fn test_mismatched_resource_is_rejected_and_released() {
        let rt = rt();
        let raw = raw_ones(&rt, Kind::Int32, &[3]);
        assert_eq!(rt.live_allocations(), 1);
        let err = Tensor::<f64>::try_from_raw(raw).unwrap_err();
        assert_eq!(
            err,
            KilnError::ResourceInvariantViolation {
                declared: DType::Float64,
                actual: DType::Int32,
            }
        );
        assert_eq!(rt.live_allocations(), 0);
    }

    #[test]
    fn test_clone_is_deep() {
        let rt = rt();
        let t = Tensor::<i64>::try_from_raw(raw_ones(&rt, Kind::Int64, &[4])).unwrap();
        let c = t.clone();
        assert!(!c.shares_storage(&t));
        assert_eq!(rt.live_allocations(), 2);
        drop(t);
        assert_eq!(c.to_vec().unwrap(), vec![1; 4]);
        drop(c);
        assert_eq!(rt.live_allocations(), 0);
    }

    #[test]
    fn test_to_device_always_copies() {
        let rt = rt();
        let t = Tensor::<f32>::try_from_raw(raw_ones(&rt, Kind::Float, &[2])).unwrap();
        let same = t.to(Device::Cpu).unwrap();
        assert!(!same.shares_storage(&t));
        let acc = t.to(Device::Cuda(0)).unwrap();
        assert_eq!(acc.device(), Device::Cuda(0));
        assert!(matches!(acc.to_vec(), Err(KilnError::Native(_))));
        assert!(t.to(Device::Cuda(3)).is_err());
    }

    #[test]
    fn test_to_dtype() {
        let rt = rt();
        let raw = rt
            .full(&Shape::new(&[3]), Scalar::Float(2.75), &NativeOptions::new(Kind::Float))
            .unwrap();
        let t = Tensor::<f32>::try_from_raw(raw).unwrap();
        let i: Tensor<i32> = t.to_dtype();
        assert_eq!(i.dtype(), DType::Int32);
        assert_eq!(i.to_vec().unwrap(), vec![2; 3]);
        let b = t.to_dtype::<bool>();
        assert_eq!(b.to_vec().unwrap(), vec![true; 3]);

        let big = rt
            .full(&Shape::new(&[1]), Scalar::Int((1 << 40) + 3), &NativeOptions::new(Kind::Int64))
            .unwrap();
        let wide = Tensor::<i64>::try_from_raw(big).unwrap();
        assert_eq!(wide.to_dtype::<i32>().to_vec().unwrap(), vec![3]);
    }

    #[test]
    fn test_conversions_keep_the_tag() {
        let rt = rt();
        let t = Tensor::<f32>::try_from_raw(raw_ones(&rt, Kind::Float, &[2])).unwrap();
        let half = t.to_dtype::<half::f16>().into_raw();
        assert_eq!(half.kind(), Kind::Half);
        assert!(Tensor::<half::f16>::try_from_raw(half).is_ok());
        assert_eq!(t.deep_clone().into_raw().kind(), Kind::Float);
    }

    #[test]
    #[should_panic(expected = "foreign element tag")]
    fn test_converted_tag_is_asserted() {
        let rt = rt();
        let _ = Tensor::<f64>::from_converted(raw_ones(&rt, Kind::Float, &[1]));
    }

    #[test]
    fn test_formatting() {
        let rt = rt();
        let t = Tensor::<i64>::try_from_raw(raw_ones(&rt, Kind::Int64, &[10])).unwrap();
        assert_eq!(
            format!("{t:?}"),
            "Tensor(shape=[10], dtype=int64, device=cpu, layout=strided, requires_grad=false)"
        );
        assert_eq!(
            t.to_string(),
            "tensor([1, 1, 1, 1, 1, 1, 1, 1, ... (10 total)], shape=[10], dtype=int64)"
        );
    }
}
