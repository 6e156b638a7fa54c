//! Trait for device identification

use std::fmt;

/// Class of compute device a runtime places buffers on
///
/// Compressed sparse tensors accept only [`DeviceType::Cpu`] and
/// [`DeviceType::Cuda`] buffers; every other class is rejected at
/// construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Host memory
    Cpu,
    /// NVIDIA CUDA device memory
    Cuda,
    /// WebGPU buffers
    Wgpu,
    /// Shape-only placeholder device with no backing memory
    Meta,
}

impl DeviceType {
    /// Lower-case backend name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Wgpu => "wgpu",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for device identification
pub trait Device: Clone + fmt::Debug + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Device class
    fn device_type(&self) -> DeviceType;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.device_type() == other.device_type() && self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("{}:{}", self.device_type(), self.id())
    }
}
