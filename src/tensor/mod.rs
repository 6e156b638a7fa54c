//! Tensor types and operations
//!
//! This module provides the dense `Tensor` type, which represents an
//! n-dimensional array stored on a compute device, and the metadata types
//! shared with compressed sparse tensors.

mod core;
mod layout;
mod meta;
mod shape;
mod storage;
mod strides;

pub use core::Tensor;
pub use layout::Layout;
pub use meta::{SizesStridesPolicy, TensorMeta, TensorMetadata};
pub use shape::Shape;
pub use storage::Storage;
pub use strides::Strides;
