//! Resize operations: structural resize, resize-and-clear, resize-as

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{Shape, TensorMeta};

use super::core::CompressedTensor;

impl<R: Runtime> CompressedTensor<R> {
    /// Resize to logical `size` with room for `nnz` specified entries
    ///
    /// `size` is `batch + [rows, cols]`. The compressed indices become
    /// `batch + [rows + 1]`, keeping their existing flat prefix. New trailing
    /// entries on the last axis are set to `nnz`; when the axis shrinks, the
    /// entry at `rows` is set to `min(nnz, rows * cols)`. Plain indices and
    /// values are resized to `min(nnz, rows * cols)` entries per batch,
    /// values keeping their block and dense dims.
    ///
    /// Interior compressed indices are left as they are; the result is
    /// structurally valid only if the caller fills the arrays afterwards.
    ///
    /// # Errors
    ///
    /// - `SymbolicShape` if the size is symbolic
    /// - `InvalidArgument` if `size` has fewer than 2 dimensions, its
    ///   element count overflows, or a value written into the compressed
    ///   indices does not fit their index dtype
    pub fn resize_(&mut self, nnz: usize, size: &[usize]) -> Result<()> {
        self.ensure_concrete_sizes("resize_")?;

        let ndim = size.len();
        if ndim < 2 {
            return Err(Error::invalid_argument(
                "size",
                format!("expected at least 2 dimensions, got {ndim}"),
            ));
        }
        TensorMeta::checked_numel(size)?;

        let batch = &size[..ndim - 2];
        let (rows, cols) = (size[ndim - 2], size[ndim - 1]);
        let kept_nnz = nnz.min(rows.saturating_mul(cols));
        let row_ptrs_len = rows
            .checked_add(1)
            .ok_or_else(|| Error::invalid_argument("size", "row count overflows"))?;

        let old_len = self.crow_indices.size(-1).unwrap_or(0);
        let old_batch_dim = self.batch_dim();

        let mut crow_shape = Shape::from(batch);
        crow_shape.push(row_ptrs_len);
        let crow_indices = self.crow_indices.resize(&crow_shape)?;
        if row_ptrs_len >= old_len {
            let mut tail = crow_indices.narrow(-1, old_len, row_ptrs_len - old_len)?;
            tail.fill_index_(nnz)?;
        } else {
            let mut last = crow_indices.narrow(-1, rows, 1)?;
            last.fill_index_(kept_nnz)?;
        }

        let mut col_shape = Shape::from(batch);
        col_shape.push(kept_nnz);
        let col_indices = self.col_indices.resize(&col_shape)?;

        let mut values_shape = col_shape.clone();
        let trailing = self.values.shape().get(old_batch_dim + 1..).unwrap_or(&[]);
        values_shape.extend_from_slice(trailing);
        let values = self.values.resize(&values_shape)?;

        tracing::debug!(
            layout = %self.layout,
            nnz,
            kept_nnz,
            size = ?size,
            "resize_ compressed tensor"
        );

        self.crow_indices = crow_indices;
        self.col_indices = col_indices;
        self.values = values;
        self.record_sizes(size);
        Ok(())
    }

    /// Resize to logical `size` and drop every specified entry
    ///
    /// The first `sparse_dim - 2` entries of `size` are batch dims, the next
    /// two the sparse dims and the rest dense dims. Afterwards nnz is zero
    /// and the compressed indices are all zero with `extent + 1` entries per
    /// batch, where the extent is the compressed sparse dim (rows for
    /// CSR/BSR, columns for CSC/BSC). Block layouts keep the block shape of
    /// the current values and count the extent in blocks.
    ///
    /// # Errors
    ///
    /// - `SymbolicShape` if the size is symbolic
    /// - `InvalidArgument` if `sparse_dim < 2`, `size` has fewer than
    ///   `sparse_dim` dims, or a block layout has no usable block shape
    pub fn resize_and_clear_(&mut self, sparse_dim: usize, size: &[usize]) -> Result<()> {
        self.ensure_concrete_sizes("resize_and_clear_")?;

        if sparse_dim < 2 {
            return Err(Error::invalid_argument(
                "sparse_dim",
                format!("expected at least 2, got {sparse_dim}"),
            ));
        }
        if size.len() < sparse_dim {
            return Err(Error::invalid_argument(
                "size",
                format!(
                    "expected at least {sparse_dim} dimensions, got {}",
                    size.len()
                ),
            ));
        }
        TensorMeta::checked_numel(size)?;

        let batch_dim = sparse_dim - 2;
        let batch = &size[..batch_dim];
        let dense = &size[sparse_dim..];

        let mut values_shape = Shape::from(batch);
        values_shape.push(0);
        let mut col_shape = Shape::from(batch);
        col_shape.push(0);

        let mut extent = if self.layout.is_row_compressed() {
            size[batch_dim]
        } else {
            size[batch_dim + 1]
        };

        if self.layout.is_block() {
            let cur_batch_dim = self.batch_dim();
            let block = match self.values.shape().get(cur_batch_dim + 1..cur_batch_dim + 3) {
                Some(&[bh, bw]) => [bh, bw],
                _ => {
                    return Err(Error::invalid_argument(
                        "values",
                        format!(
                            "{} values need two block dimensions after the nnz axis, got shape {:?}",
                            self.layout,
                            self.values.shape()
                        ),
                    ));
                }
            };
            // BSR counts block rows, BSC block columns
            let divisor = if self.layout.is_row_compressed() {
                block[0]
            } else {
                block[1]
            };
            if divisor == 0 {
                return Err(Error::invalid_argument(
                    "values",
                    format!("block shape {block:?} has a zero extent"),
                ));
            }
            values_shape.extend_from_slice(&block);
            extent /= divisor;
        }
        values_shape.extend_from_slice(dense);

        let mut crow_shape = Shape::from(batch);
        crow_shape.push(
            extent
                .checked_add(1)
                .ok_or_else(|| Error::invalid_argument("size", "compressed extent overflows"))?,
        );

        let mut crow_indices = self.crow_indices.resize(&crow_shape)?;
        crow_indices.zero_()?;
        let col_indices = self.col_indices.resize(&col_shape)?;
        let values = self.values.resize(&values_shape)?;

        tracing::debug!(
            layout = %self.layout,
            sparse_dim,
            extent,
            size = ?size,
            "resize_and_clear_ compressed tensor"
        );

        self.crow_indices = crow_indices;
        self.col_indices = col_indices;
        self.values = values;
        self.record_sizes(size);
        Ok(())
    }

    /// Take the layout and sizes of `src` with fresh arrays of its shapes
    ///
    /// Every array is newly allocated with the shape, dtype and device of
    /// the corresponding array of `src`; contents are unspecified. The
    /// declared dtype follows `src`.
    ///
    /// # Errors
    ///
    /// `SymbolicShape` if this tensor's size is symbolic.
    pub fn resize_as_sparse_csr_tensor_(&mut self, src: &CompressedTensor<R>) -> Result<()> {
        self.ensure_concrete_sizes("resize_as_sparse_csr_tensor_")?;

        let crow_indices = src.crow_indices.empty_like()?;
        let col_indices = src.col_indices.empty_like()?;
        let values = src.values.empty_like()?;

        tracing::debug!(
            from = %self.layout,
            to = %src.layout,
            size = ?src.sizes(),
            "resize_as compressed tensor"
        );

        self.layout = src.layout;
        self.crow_indices = crow_indices;
        self.col_indices = col_indices;
        self.values = values;
        self.meta.set_dtype(src.dtype());
        self.record_sizes(src.sizes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};
    use crate::sparse::{CompressedLayout, CompressedOptions};
    use crate::tensor::Tensor;

    fn empty(layout: CompressedLayout) -> CompressedTensor<CpuRuntime> {
        CompressedTensor::empty(layout, DType::F32, &CpuDevice::new()).unwrap()
    }

    #[test]
    fn test_resize_grows_from_empty() {
        let mut t = empty(CompressedLayout::Csr);
        t.resize_(5, &[3, 4]).unwrap();

        assert_eq!(t.crow_indices().shape(), &[4]);
        assert_eq!(&t.crow_indices().to_vec::<i64>()[1..], &[5, 5, 5]);
        assert_eq!(t.col_indices().shape(), &[5]);
        assert_eq!(t.values().shape(), &[5]);
        assert_eq!(t.sizes(), &[3, 4]);
        assert_eq!(t.numel(), 12);
    }

    #[test]
    fn test_resize_caps_nnz_at_dense_count() {
        let mut t = empty(CompressedLayout::Csr);
        t.resize_(100, &[2, 3]).unwrap();
        assert_eq!(t.col_indices().shape(), &[6]);
        assert_eq!(t.values().shape(), &[6]);
        // New tail entries carry the requested nnz
        assert_eq!(&t.crow_indices().to_vec::<i64>()[1..], &[100, 100]);
    }

    #[test]
    fn test_resize_shrink_sets_last_entry() {
        let device = CpuDevice::new();
        let mut t = CompressedTensor::<CpuRuntime>::from_slices(
            CompressedLayout::Csr,
            &[0, 1, 2, 3, 4],
            &[0, 1, 2, 3],
            &[1.0f32, 2.0, 3.0, 4.0],
            &[4],
            &[4, 4],
            &device,
        )
        .unwrap();

        t.resize_(3, &[2, 4]).unwrap();
        assert_eq!(t.crow_indices().to_vec::<i64>(), [0, 1, 3]);
        assert_eq!(t.col_indices().to_vec::<i64>(), [0, 1, 2]);
        assert_eq!(t.values().to_vec::<f32>(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resize_keeps_block_dims() {
        let device = CpuDevice::new();
        let mut t = CompressedTensor::<CpuRuntime>::from_slices(
            CompressedLayout::Bsr,
            &[0, 1, 1],
            &[0],
            &[1.0f32; 4],
            &[1, 2, 2],
            &[4, 4],
            &device,
        )
        .unwrap();

        t.resize_(2, &[3, 3]).unwrap();
        assert_eq!(t.values().shape(), &[2, 2, 2]);
        assert_eq!(t.blocksize(), Some([2, 2]));
    }

    #[test]
    fn test_resize_writes_large_nnz_exactly() {
        let mut t = empty(CompressedLayout::Csr);
        let nnz = (1usize << 53) + 1;
        t.resize_(nnz, &[1, 1]).unwrap();

        assert_eq!(t.crow_indices().to_vec::<i64>(), [nnz as i64, nnz as i64]);
        assert_eq!(t.col_indices().shape(), &[1]);
    }

    #[test]
    fn test_resize_rejects_nnz_beyond_i32_indices() {
        let opts = CompressedOptions::new().with_index_dtype(DType::I32);
        let mut t = CompressedTensor::<CpuRuntime>::empty_with_options(
            CompressedLayout::Csr,
            DType::F32,
            &CpuDevice::new(),
            &opts,
        )
        .unwrap();

        let err = t.resize_(3_000_000_000, &[2, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "value", .. }));
        assert_eq!(t.sizes(), &[0]);
        assert_eq!(t.crow_indices().shape(), &[0]);

        // Shrinking writes the capped count, which fits
        t.resize_(4, &[2, 2]).unwrap();
        t.resize_(3_000_000_000, &[1, 2]).unwrap();
        assert_eq!(t.crow_indices().to_vec::<i32>(), [4, 2]);
    }

    #[test]
    fn test_resize_rejects_rank_one() {
        let mut t = empty(CompressedLayout::Csr);
        let err = t.resize_(1, &[4]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "size", .. }));
        // Untouched on failure
        assert_eq!(t.sizes(), &[0]);
        assert_eq!(t.crow_indices().shape(), &[0]);
    }

    #[test]
    fn test_resize_and_clear_bsr() {
        let device = CpuDevice::new();
        let crow = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);
        let col = Tensor::<CpuRuntime>::from_slice(&[0i64], &[1], &device);
        let values = Tensor::<CpuRuntime>::zeros(&[1, 2, 2], DType::F32, &device);
        let mut t = CompressedTensor::from_parts(
            DType::F32,
            crow.clone(),
            col.clone(),
            values.clone(),
            CompressedLayout::Bsr,
        )
        .unwrap();
        t.set_member_tensors(crow, col, values, &[2, 2]).unwrap();

        t.resize_and_clear_(2, &[6, 6]).unwrap();
        assert_eq!(t.crow_indices().to_vec::<i64>(), [0, 0, 0, 0]);
        assert_eq!(t.col_indices().shape(), &[0]);
        assert_eq!(t.values().shape(), &[0, 2, 2]);
        assert_eq!(t.nnz(), 0);
        assert_eq!(t.sizes(), &[6, 6]);
    }

    #[test]
    fn test_resize_and_clear_bsc_divides_by_block_width() {
        let device = CpuDevice::new();
        let crow = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);
        let col = Tensor::<CpuRuntime>::from_slice(&[0i64], &[1], &device);
        let values = Tensor::<CpuRuntime>::zeros(&[1, 2, 3], DType::F32, &device);
        let mut t =
            CompressedTensor::from_parts(DType::F32, crow, col, values, CompressedLayout::Bsc)
                .unwrap();

        t.resize_and_clear_(2, &[4, 9]).unwrap();
        // 9 columns / block width 3
        assert_eq!(t.crow_indices().shape(), &[4]);
        assert_eq!(t.values().shape(), &[0, 2, 3]);
    }

    #[test]
    fn test_resize_and_clear_batched_with_dense_dims() {
        let mut t = empty(CompressedLayout::Csc);
        t.resize_and_clear_(3, &[2, 5, 7, 3]).unwrap();

        // batch [2], sparse [5, 7], dense [3]; CSC compresses the 7 columns
        assert_eq!(t.crow_indices().shape(), &[2, 8]);
        assert!(t.crow_indices().to_vec::<i64>().iter().all(|&v| v == 0));
        assert_eq!(t.col_indices().shape(), &[2, 0]);
        assert_eq!(t.values().shape(), &[2, 0, 3]);
        assert_eq!(t.batch_dim(), 1);
        assert_eq!(t.dense_dim(), 1);
        assert_eq!(t.numel(), 210);
    }

    #[test]
    fn test_resize_and_clear_argument_checks() {
        let mut t = empty(CompressedLayout::Csr);
        assert!(matches!(
            t.resize_and_clear_(1, &[3, 3]),
            Err(Error::InvalidArgument {
                arg: "sparse_dim",
                ..
            })
        ));
        assert!(matches!(
            t.resize_and_clear_(3, &[3, 3]),
            Err(Error::InvalidArgument { arg: "size", .. })
        ));

        // Block layout without block dims in its values
        let mut b = empty(CompressedLayout::Bsr);
        assert!(matches!(
            b.resize_and_clear_(2, &[4, 4]),
            Err(Error::InvalidArgument { arg: "values", .. })
        ));
    }

    #[test]
    fn test_resize_as_copies_shapes_and_layout() {
        let device = CpuDevice::new();
        let src = CompressedTensor::<CpuRuntime>::from_slices(
            CompressedLayout::Csc,
            &[0, 1, 3],
            &[2, 0, 1],
            &[1.0f64, 2.0, 3.0],
            &[3],
            &[3, 2],
            &device,
        )
        .unwrap();

        let mut t = empty(CompressedLayout::Csr);
        t.resize_as_sparse_csr_tensor_(&src).unwrap();

        assert_eq!(t.layout(), CompressedLayout::Csc);
        assert_eq!(t.sizes(), src.sizes());
        assert_eq!(t.crow_indices().shape(), src.crow_indices().shape());
        assert_eq!(t.col_indices().shape(), src.col_indices().shape());
        assert_eq!(t.values().shape(), src.values().shape());
        assert_eq!(t.dtype(), DType::F64);
        assert!(!t.values().storage().same_allocation(src.values().storage()));
    }

    #[test]
    fn test_symbolic_sizes_block_resizes() {
        let mut t = empty(CompressedLayout::Csr);
        let src = empty(CompressedLayout::Csr);
        t.set_symbolic_sizes(true);

        assert!(matches!(
            t.resize_(1, &[2, 2]),
            Err(Error::SymbolicShape {
                layout: CompressedLayout::Csr,
                op: "resize_"
            })
        ));
        assert!(matches!(
            t.resize_and_clear_(2, &[2, 2]),
            Err(Error::SymbolicShape { .. })
        ));
        assert!(matches!(
            t.resize_as_sparse_csr_tensor_(&src),
            Err(Error::SymbolicShape { .. })
        ));
    }
}
