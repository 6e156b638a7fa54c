//! # numr-compressed
//!
//! **Compressed sparse (CSR/CSC/BSR/BSC) tensors with invariant-checked
//! resize and member installation.**
//!
//! A compressed sparse tensor keeps three co-dependent dense arrays:
//! compressed indices, plain indices and values. This crate owns the
//! descriptor that holds them and keeps them consistent (same device,
//! declared dtype, matching lengths) across construction, the resize
//! family and caller-driven replacement of the arrays.
//!
//! ## Features
//!
//! - **Dense tensors**: device buffers with views, resize, fill
//! - **Compressed tensors**: CSR, CSC, BSR, BSC with batch and dense dims
//! - **Metadata interface**: one trait for dense and compressed tensors;
//!   strided queries fail with a typed error on compressed layouts
//! - **Validation**: full structural checks of the index arrays
//!
//! ## Quick Start
//!
//! ```
//! use numr_compressed::prelude::*;
//!
//! let device = CpuDevice::new();
//! let mut bsr = CompressedTensor::<CpuRuntime>::from_slices(
//!     CompressedLayout::Bsr,
//!     &[0, 1, 1],
//!     &[0],
//!     &[1.0f32, 2.0, 3.0, 4.0],
//!     &[1, 2, 2],
//!     &[4, 4],
//!     &device,
//! )?;
//!
//! bsr.resize_and_clear_(2, &[6, 6])?;
//! assert_eq!(bsr.crow_indices().to_vec::<i64>(), [0, 0, 0, 0]);
//! assert_eq!(bsr.values().shape(), &[0, 2, 2]);
//! # Ok::<(), numr_compressed::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `f16`: Half-precision floats (F16, BF16) via the `half` crate

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod runtime;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::runtime::{Device, DeviceType, Runtime};
    pub use crate::sparse::{CompressedLayout, CompressedOptions, CompressedTensor};
    pub use crate::tensor::{Layout, Tensor, TensorMetadata};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuDevice, CpuRuntime};
}
