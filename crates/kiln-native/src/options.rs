use std::fmt;

use crate::{Device, Kind, Layout, MemoryFormat};

/// Fully resolved descriptor consumed by every native constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeOptions {
    pub kind: Kind,
    pub layout: Layout,
    pub device: Device,
    pub requires_grad: bool,
    pub pinned_memory: bool,
    pub memory_format: MemoryFormat,
}

impl NativeOptions {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            layout: Layout::Strided,
            device: Device::Cpu,
            requires_grad: false,
            pinned_memory: false,
            memory_format: MemoryFormat::Contiguous,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }
}

impl fmt::Display for NativeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(dtype={}, layout={}, device={}, requires_grad={}, pinned={}, format={:?})",
            self.kind,
            self.layout,
            self.device,
            self.requires_grad,
            self.pinned_memory,
            self.memory_format
        )
    }
}
