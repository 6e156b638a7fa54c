//! Dense metadata interface for compressed tensors
//!
//! Size queries are answered from the tensor's metadata. Compressed
//! tensors have no strides, storage offset or contiguity, so every strided
//! query and mutator fails with `UnsupportedOperation`.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{SizesStridesPolicy, TensorMetadata};

use super::core::CompressedTensor;

impl<R: Runtime> TensorMetadata for CompressedTensor<R> {
    fn sizes(&self) -> &[usize] {
        self.meta.sizes()
    }

    fn numel(&self) -> usize {
        self.meta.numel()
    }

    fn dtype(&self) -> DType {
        self.meta.dtype()
    }

    fn sizes_strides_policy(&self) -> SizesStridesPolicy {
        self.meta.sizes_strides_policy()
    }

    fn is_non_overlapping_and_dense(&self) -> bool {
        self.meta.is_non_overlapping_and_dense()
    }

    fn strides(&self) -> Result<&[isize]> {
        Err(Error::unsupported(self.layout, "strides"))
    }

    fn storage_offset(&self) -> Result<usize> {
        Err(Error::unsupported(self.layout, "storage_offset"))
    }

    fn is_contiguous(&self) -> Result<bool> {
        Err(Error::unsupported(self.layout, "is_contiguous"))
    }

    fn set_size(&mut self, _dim: usize, _size: usize) -> Result<()> {
        Err(Error::unsupported(self.layout, "set_size"))
    }

    fn set_stride(&mut self, _dim: usize, _stride: isize) -> Result<()> {
        Err(Error::unsupported(self.layout, "set_stride"))
    }

    fn set_storage_offset(&mut self, _offset: usize) -> Result<()> {
        Err(Error::unsupported(self.layout, "set_storage_offset"))
    }
}
