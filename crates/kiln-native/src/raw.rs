use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::element::NativeElement;
use crate::grad::is_grad_enabled;
use crate::storage::{Buffer, Storage};
use crate::{Device, Kind, Layout, MemoryFormat, NativeError, NativeOptions, NativeResult, Shape};

/// Handle to one native tensor resource.
///
/// The handle is not `Clone`: copies are explicit. [`RawTensor::deep_clone`]
/// allocates an independent resource, while [`RawTensor::shallow_clone`]
/// aliases the same storage, which is what codecs hand out. The storage is
/// released when its last handle drops.
pub struct RawTensor {
    storage: Arc<Storage>,
    shape: Shape,
    layout: Layout,
    memory_format: MemoryFormat,
    requires_grad: bool,
}

impl RawTensor {
    pub(crate) fn new(storage: Storage, shape: Shape, options: &NativeOptions) -> Self {
        debug_assert_eq!(storage.numel(), shape.numel());
        Self {
            storage: Arc::new(storage),
            shape,
            layout: options.layout,
            memory_format: options.memory_format,
            requires_grad: options.requires_grad && is_grad_enabled(),
        }
    }

    /// Runtime element-type tag.
    pub fn kind(&self) -> Kind {
        self.storage.kind()
    }

    pub fn device(&self) -> Device {
        self.storage.device()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn memory_format(&self) -> MemoryFormat {
        self.memory_format
    }

    pub fn is_pinned(&self) -> bool {
        self.storage.is_pinned()
    }

    /// Strides (in elements) implied by the memory format.
    pub fn strides(&self) -> SmallVec<[usize; 4]> {
        match self.memory_format {
            MemoryFormat::ChannelsLast => self
                .shape
                .channels_last_strides()
                .unwrap_or_else(|| self.shape.contiguous_strides()),
            MemoryFormat::Contiguous | MemoryFormat::Preserve => self.shape.contiguous_strides(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        self.storage.buffer()
    }

    /// Whether both handles refer to the same native storage.
    pub fn shares_storage(&self, other: &RawTensor) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Second handle onto the same storage. No allocation takes place.
    pub fn shallow_clone(&self) -> RawTensor {
        RawTensor {
            storage: Arc::clone(&self.storage),
            shape: self.shape.clone(),
            layout: self.layout,
            memory_format: self.memory_format,
            requires_grad: self.requires_grad,
        }
    }

    /// Independent copy on the same device.
    pub fn deep_clone(&self) -> RawTensor {
        self.copy_into(self.storage.buffer().clone(), self.device(), self.is_pinned())
    }

    /// Copy onto `device`. Always allocates, even when the device is unchanged.
    pub fn to_device(&self, device: Device) -> NativeResult<RawTensor> {
        self.storage.allocator().check_device(device)?;
        tracing::trace!(from = %self.device(), to = %device, shape = %self.shape, "native to_device");
        Ok(self.copy_into(self.storage.buffer().clone(), device, false))
    }

    /// Element-wise conversion into a new allocation of `kind`.
    pub fn to_kind(&self, kind: Kind) -> RawTensor {
        let mut out = self.copy_into(self.storage.buffer().cast(kind), self.device(), self.is_pinned());
        out.requires_grad &= kind.supports_grad();
        out
    }

    fn copy_into(&self, buffer: Buffer, device: Device, pinned: bool) -> RawTensor {
        let storage = Storage::new(self.storage.allocator(), buffer, device, pinned);
        RawTensor {
            storage: Arc::new(storage),
            shape: self.shape.clone(),
            layout: self.layout,
            memory_format: self.memory_format,
            requires_grad: self.requires_grad && is_grad_enabled(),
        }
    }

    /// Host copy of the elements in logical order. CPU tensors only.
    pub fn to_vec<T: NativeElement>(&self) -> NativeResult<Vec<T>> {
        if !self.device().is_cpu() {
            return Err(NativeError::DeviceMismatch {
                op: "to_vec",
                expected: Device::Cpu,
                got: self.device(),
            });
        }
        T::slice(self.storage.buffer())
            .map(<[T]>::to_vec)
            .ok_or(NativeError::DTypeMismatch {
                op: "to_vec",
                expected: T::KIND,
                got: self.kind(),
            })
    }
}

impl fmt::Debug for RawTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawTensor(shape={}, dtype={}, device={}, layout={}, requires_grad={})",
            self.shape,
            self.kind(),
            self.device(),
            self.layout,
            self.requires_grad,
        )
    }
}
