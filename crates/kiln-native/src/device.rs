use std::fmt;

use serde::{Deserialize, Serialize};

/// Compute device a native resource lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Cpu,
    /// Accelerator with device ordinal
    Cuda(usize),
}

impl Device {
    /// Whether this is a CPU device.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Whether this is an accelerator device.
    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }

    /// Accelerator ordinal; CPU carries none.
    pub fn index(&self) -> Option<usize> {
        match self {
            Device::Cuda(idx) => Some(*idx),
            Device::Cpu => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(idx) => write!(f, "cuda:{idx}"),
        }
    }
}

/// In-memory storage scheme of a tensor's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    Strided,
    SparseCoo,
    SparseCsr,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Strided => write!(f, "strided"),
            Layout::SparseCoo => write!(f, "sparse_coo"),
            Layout::SparseCsr => write!(f, "sparse_csr"),
        }
    }
}

/// Physical ordering of dense dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemoryFormat {
    #[default]
    Contiguous,
    /// NHWC ordering for 4-D tensors
    ChannelsLast,
    /// Keep whatever format the source tensor had
    Preserve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_properties() {
        assert!(Device::Cpu.is_cpu());
        assert!(!Device::Cpu.is_cuda());
        assert!(Device::Cuda(0).is_cuda());
        assert_eq!(Device::Cuda(1).index(), Some(1));
        assert_eq!(Device::Cpu.index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Device::Cpu), "cpu");
        assert_eq!(format!("{}", Device::Cuda(0)), "cuda:0");
        assert_eq!(Layout::SparseCoo.to_string(), "sparse_coo");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Device::default(), Device::Cpu);
        assert_eq!(Layout::default(), Layout::Strided);
        assert_eq!(MemoryFormat::default(), MemoryFormat::Contiguous);
    }
}
