//! Installing caller-provided arrays into a compressed tensor

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{Tensor, TensorMeta};

use super::core::{CompressedTensor, check_same_device};

impl<R: Runtime> CompressedTensor<R> {
    /// Replace all three arrays and the logical size
    ///
    /// The values must have the declared dtype and all arrays must share a
    /// device. Nothing is installed unless every check passes. Index
    /// contents are not checked; use [`Self::validate`] for that.
    ///
    /// # Errors
    ///
    /// - `SymbolicShape` if the size is symbolic
    /// - `ValuesDTypeMismatch` if `values.dtype()` differs from the declared dtype
    /// - `DeviceMismatch` if an index array is on another device
    /// - `InvalidArgument` if the element count of `size` overflows
    pub fn set_member_tensors(
        &mut self,
        crow_indices: Tensor<R>,
        col_indices: Tensor<R>,
        values: Tensor<R>,
        size: &[usize],
    ) -> Result<()> {
        self.ensure_concrete_sizes("set_member_tensors")?;

        if values.dtype() != self.dtype() {
            return Err(Error::ValuesDTypeMismatch {
                layout: self.layout,
                expected: self.dtype(),
                got: values.dtype(),
            });
        }
        check_same_device(self.layout, &crow_indices, &col_indices, &values)?;
        TensorMeta::checked_numel(size)?;

        self.crow_indices = crow_indices;
        self.col_indices = col_indices;
        self.values = values;
        self.record_sizes(size);
        Ok(())
    }

    /// Fail with [`Error::SymbolicShape`] if the sizes are symbolic
    pub(crate) fn ensure_concrete_sizes(&self, op: &'static str) -> Result<()> {
        if self.meta.has_symbolic_sizes() {
            return Err(Error::SymbolicShape {
                layout: self.layout,
                op,
            });
        }
        Ok(())
    }

    /// Record a logical size whose element count is known not to overflow
    pub(crate) fn record_sizes(&mut self, size: &[usize]) {
        self.meta.set_sizes(size);
        self.meta.refresh_numel();
    }
}
