use std::fmt;

use kiln_native::{Device, Layout, MemoryFormat, NativeOptions};
use serde::{Deserialize, Serialize};

use crate::DType;

/// Fully resolved creation options. Every field is concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorOptions {
    pub dtype: DType,
    pub layout: Layout,
    pub device: Device,
    pub requires_grad: bool,
    pub pin_memory: bool,
    pub memory_format: MemoryFormat,
}

/// Compose resolved slot values into one options value.
///
/// Pure: no validation happens here. Illegal combinations are rejected by
/// the native call the options are handed to.
pub fn compose(
    dtype: DType,
    layout: Layout,
    device: Device,
    requires_grad: bool,
    pin_memory: bool,
    memory_format: MemoryFormat,
) -> TensorOptions {
    TensorOptions {
        dtype,
        layout,
        device,
        requires_grad,
        pin_memory,
        memory_format,
    }
}

impl TensorOptions {
    /// `dtype` with every other field at its default.
    pub fn new(dtype: DType) -> Self {
        compose(
            dtype,
            Layout::default(),
            Device::default(),
            false,
            false,
            MemoryFormat::default(),
        )
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    pub(crate) fn to_native(self) -> NativeOptions {
        NativeOptions {
            kind: self.dtype.kind(),
            layout: self.layout,
            device: self.device,
            requires_grad: self.requires_grad,
            pinned_memory: self.pin_memory,
            memory_format: self.memory_format,
        }
    }
}

impl Default for TensorOptions {
    fn default() -> Self {
        Self::new(DType::DEFAULT_FLOAT)
    }
}

impl fmt::Display for TensorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dtype={}, layout={}, device={}, requires_grad={}",
            self.dtype, self.layout, self.device, self.requires_grad
        )?;
        if self.pin_memory {
            f.write_str(", pin_memory=true")?;
        }
        if self.memory_format != MemoryFormat::Contiguous {
            write!(f, ", memory_format={:?}", self.memory_format)?;
        }
        Ok(())
    }
}
