//! Runtime backends for tensor buffers
//!
//! This module defines the `Runtime` trait and the reference CPU backend.
//! A runtime allocates, copies and frees the flat memory that `Storage`
//! wraps, so every dense and compressed tensor is generic over one.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific CPU/GPU, carries its DeviceType)
//! └── allocate / copy / deallocate (raw memory management)
//! ```

mod traits;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use traits::{Device, DeviceType, Runtime};
