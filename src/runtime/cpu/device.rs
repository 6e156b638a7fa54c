//! CPU device implementation

use crate::runtime::{Device, DeviceType};

/// CPU device
///
/// The host has a single address space, but buffers can still be tagged with
/// a logical device id (for example one per NUMA node). Buffers on CPU
/// devices with different ids are treated as living on different devices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice {
    id: usize,
}

impl CpuDevice {
    /// Create the default CPU device (id 0)
    pub fn new() -> Self {
        Self { id: 0 }
    }

    /// Create a logical CPU device with an explicit id
    pub fn with_id(id: usize) -> Self {
        Self { id }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn name(&self) -> String {
        if self.id == 0 {
            "cpu".to_string()
        } else {
            format!("cpu:{}", self.id)
        }
    }
}
