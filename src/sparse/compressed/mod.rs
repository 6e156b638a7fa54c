//! Compressed sparse tensor descriptor
//!
//! - `core`: struct, construction, accessors
//! - `resize`: `resize_`, `resize_and_clear_`, `resize_as_sparse_csr_tensor_`
//! - `members`: `set_member_tensors`
//! - `strided`: `TensorMetadata` impl rejecting strided queries
//! - `validate`: structural checks over the three arrays

mod core;
mod members;
mod resize;
mod strided;
mod validate;

pub use core::{CompressedTensor, check_device_type};
pub use validate::validate_compressed_parts;
