//! Structural validation of compressed sparse arrays

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{Tensor, TensorMeta};

use super::super::layout::CompressedLayout;

/// Check that three arrays form a well-formed compressed tensor of `size`
///
/// Checks, in order:
/// - both index arrays are `I64` or `I32` and agree on dtype
/// - ranks: index arrays share a rank, values carry the nnz axis (and the
///   block axes for BSR/BSC), `size` has batch + 2 sparse dims
/// - batch dims of all arrays equal the leading dims of `size`
/// - `values` and the plain indices agree on nnz
/// - block dims divide the sparse dims; trailing value dims match the
///   dense dims of `size`
/// - per batch slice: compressed indices have `extent + 1` entries, start
///   at 0, never decrease and end at nnz; plain indices lie in
///   `[0, plain extent)`
///
/// Index contents are read back to the host.
pub fn validate_compressed_parts<R: Runtime>(
    layout: CompressedLayout,
    crow_indices: &Tensor<R>,
    col_indices: &Tensor<R>,
    values: &Tensor<R>,
    size: &[usize],
) -> Result<()> {
    let compressed_name = layout.compressed_indices_name();
    let plain_name = layout.plain_indices_name();

    for (name, indices) in [(compressed_name, crow_indices), (plain_name, col_indices)] {
        if !indices.dtype().is_index() {
            return Err(Error::invalid_argument(
                "indices",
                format!("{name} must be i64 or i32, got {}", indices.dtype()),
            ));
        }
    }
    if crow_indices.dtype() != col_indices.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: crow_indices.dtype(),
            rhs: col_indices.dtype(),
        });
    }

    if crow_indices.ndim() == 0 {
        return Err(Error::invalid_argument(
            "indices",
            format!("{compressed_name} must have at least one dimension"),
        ));
    }
    let batch_dim = crow_indices.ndim() - 1;
    if col_indices.ndim() != crow_indices.ndim() {
        return Err(Error::invalid_argument(
            "indices",
            format!(
                "{plain_name} has {} dimensions but {compressed_name} has {}",
                col_indices.ndim(),
                crow_indices.ndim()
            ),
        ));
    }

    let block_ndim = if layout.is_block() { 2 } else { 0 };
    let min_values_ndim = batch_dim + 1 + block_ndim;
    if values.ndim() < min_values_ndim {
        return Err(Error::invalid_argument(
            "values",
            format!(
                "expected at least {min_values_ndim} dimensions for {layout}, got {}",
                values.ndim()
            ),
        ));
    }
    if size.len() < batch_dim + 2 {
        return Err(Error::invalid_argument(
            "size",
            format!(
                "expected at least {} dimensions, got {}",
                batch_dim + 2,
                size.len()
            ),
        ));
    }
    TensorMeta::checked_numel(size)?;

    let batch = &size[..batch_dim];
    for array in [crow_indices, col_indices, values] {
        if &array.shape()[..batch_dim] != batch {
            return Err(Error::shape_mismatch(batch, &array.shape()[..batch_dim]));
        }
    }

    let nnz = col_indices.shape()[batch_dim];
    let values_nnz = values.shape()[batch_dim];
    if values_nnz != nnz {
        return Err(Error::shape_mismatch(&[nnz], &[values_nnz]));
    }

    let (rows, cols) = (size[batch_dim], size[batch_dim + 1]);
    let (rows, cols) = if layout.is_block() {
        let (bh, bw) = (values.shape()[batch_dim + 1], values.shape()[batch_dim + 2]);
        if bh == 0 || bw == 0 {
            return Err(Error::invalid_argument(
                "values",
                format!("block dimensions must be positive, got {bh}x{bw}"),
            ));
        }
        if rows % bh != 0 || cols % bw != 0 {
            return Err(Error::invalid_argument(
                "size",
                format!("{rows}x{cols} is not divisible into {bh}x{bw} blocks"),
            ));
        }
        (rows / bh, cols / bw)
    } else {
        (rows, cols)
    };
    let (extent, plain_extent) = if layout.is_row_compressed() {
        (rows, cols)
    } else {
        (cols, rows)
    };

    let dense = &size[batch_dim + 2..];
    let values_dense = &values.shape()[min_values_ndim..];
    if values_dense != dense {
        return Err(Error::shape_mismatch(dense, values_dense));
    }

    let crow_len = crow_indices.shape()[batch_dim];
    let expected_len = extent
        .checked_add(1)
        .ok_or_else(|| Error::invalid_argument("size", "compressed extent overflows"))?;
    if crow_len != expected_len {
        return Err(Error::shape_mismatch(&[expected_len], &[crow_len]));
    }

    let crow_data = crow_indices.to_index_vec()?;
    let col_data = col_indices.to_index_vec()?;
    let batch_count: usize = batch.iter().product();

    for b in 0..batch_count {
        let crow_slice = &crow_data[b * crow_len..(b + 1) * crow_len];
        let col_slice = &col_data[b * nnz..(b + 1) * nnz];
        check_compressed_slice(compressed_name, crow_slice, nnz)?;
        check_plain_slice(plain_name, col_slice, plain_extent)?;
    }

    Ok(())
}

fn check_compressed_slice(name: &str, indices: &[i64], nnz: usize) -> Result<()> {
    let first = indices.first().copied().unwrap_or(0);
    if first != 0 {
        return Err(Error::invalid_argument(
            "indices",
            format!("{name}[0] must be 0, got {first}"),
        ));
    }

    if let Some(pos) = indices.windows(2).position(|w| w[1] < w[0]) {
        return Err(Error::invalid_argument(
            "indices",
            format!(
                "{name} must be non-decreasing, got {} after {} at position {}",
                indices[pos + 1],
                indices[pos],
                pos + 1
            ),
        ));
    }

    let last = indices.last().copied().unwrap_or(0);
    if usize::try_from(last).ok() != Some(nnz) {
        return Err(Error::invalid_argument(
            "indices",
            format!("{name}[-1] must equal nnz {nnz}, got {last}"),
        ));
    }
    Ok(())
}

fn check_plain_slice(name: &str, indices: &[i64], extent: usize) -> Result<()> {
    for &index in indices {
        let Ok(index) = usize::try_from(index) else {
            return Err(Error::invalid_argument(
                "indices",
                format!("{name} must be non-negative, got {index}"),
            ));
        };
        if index >= extent {
            return Err(Error::IndexOutOfBounds {
                index,
                size: extent,
            });
        }
    }
    Ok(())
}
