//! CPU runtime implementation
//!
//! The CPU runtime uses aligned heap allocation and provides the reference
//! implementation of the buffer primitives every tensor is built on.

mod device;
mod runtime;

pub use device::CpuDevice;
pub use runtime::CpuRuntime;
