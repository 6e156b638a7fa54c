//! Compressed sparse tensors
//!
//! This module provides the compressed sparse tensor descriptor: a sparse
//! matrix (or batch of matrices) stored as three dense arrays that must
//! stay consistent with each other under construction, resize and member
//! replacement.
//!
//! # Layouts
//!
//! - **CSR** (Compressed Sparse Row): row pointers + column indices + values.
//! - **CSC** (Compressed Sparse Column): column pointers + row indices + values.
//! - **BSR** / **BSC**: the block variants, where every stored value is a
//!   dense `bh x bw` block and the compressed axis counts blocks.
//!
//! # Usage
//!
//! ```
//! use numr_compressed::prelude::*;
//!
//! let device = CpuDevice::new();
//! let mut csr = CompressedTensor::<CpuRuntime>::empty(CompressedLayout::Csr, DType::F32, &device)?;
//!
//! // Room for 5 entries in a 3x4 matrix
//! csr.resize_(5, &[3, 4])?;
//! assert_eq!(csr.crow_indices().shape(), &[4]);
//! assert_eq!(csr.nnz(), 5);
//!
//! // Strided queries are not defined for compressed layouts
//! assert!(csr.strides().is_err());
//! # Ok::<(), numr_compressed::error::Error>(())
//! ```

mod compressed;
mod layout;
mod options;

pub use compressed::{CompressedTensor, check_device_type, validate_compressed_parts};
pub use layout::CompressedLayout;
pub use options::CompressedOptions;
