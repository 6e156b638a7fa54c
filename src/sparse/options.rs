//! Construction options for compressed sparse tensors

use crate::dtype::DType;
use crate::error::{Error, Result};

/// Options for default-empty construction
///
/// # Example
///
/// ```
/// use numr_compressed::prelude::*;
///
/// let opts = CompressedOptions::new().with_index_dtype(DType::I32);
/// assert_eq!(opts.index_dtype(), DType::I32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedOptions {
    index_dtype: DType,
}

impl CompressedOptions {
    /// Default options: `I64` indices
    pub fn new() -> Self {
        Self {
            index_dtype: DType::default_int(),
        }
    }

    /// Use `dtype` for both index arrays
    ///
    /// Only `I64` and `I32` are accepted; the check runs when the options
    /// are used.
    pub fn with_index_dtype(mut self, dtype: DType) -> Self {
        self.index_dtype = dtype;
        self
    }

    /// Element type of the index arrays
    pub fn index_dtype(&self) -> DType {
        self.index_dtype
    }

    /// Check that the options describe a valid tensor
    pub fn validate(&self) -> Result<()> {
        if !self.index_dtype.is_index() {
            return Err(Error::invalid_argument(
                "index_dtype",
                format!("expected i64 or i32, got {}", self.index_dtype),
            ));
        }
        Ok(())
    }
}

impl Default for CompressedOptions {
    fn default() -> Self {
        Self::new()
    }
}
