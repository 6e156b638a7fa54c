//! Core compressed tensor implementation: struct, construction, getters

use std::fmt;
use std::sync::Once;

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::{Device, DeviceType, Runtime};
use crate::tensor::{SizesStridesPolicy, Tensor, TensorMeta};

use super::super::layout::CompressedLayout;
use super::super::options::CompressedOptions;
use super::validate::validate_compressed_parts;

static BETA_WARNING: Once = Once::new();

/// Compressed sparse tensor (CSR, CSC, BSR or BSC)
///
/// A (batch of) sparse matrices stored as three dense arrays:
///
/// - `crow_indices`: compressed indices, shape `batch + [extent + 1]`
/// - `col_indices`: plain indices, shape `batch + [nnz]`
/// - `values`: shape `batch + [nnz] + block + dense`
///
/// Buffers are always replaced wholesale: every mutating operation builds
/// the new arrays first and installs them only once all checks passed.
///
/// For column-compressed layouts the two index arrays hold column pointers
/// and row indices; the accessor names follow the row-compressed case.
#[derive(Clone)]
pub struct CompressedTensor<R: Runtime> {
    pub(crate) crow_indices: Tensor<R>,
    pub(crate) col_indices: Tensor<R>,
    pub(crate) values: Tensor<R>,
    pub(crate) layout: CompressedLayout,
    pub(crate) meta: TensorMeta,
}

/// Reject device classes compressed tensors cannot live on
pub fn check_device_type(device_type: DeviceType) -> Result<()> {
    match device_type {
        DeviceType::Cpu | DeviceType::Cuda => Ok(()),
        other => Err(Error::invalid_argument(
            "device",
            format!("expected a cpu or cuda device, got {other}"),
        )),
    }
}

impl<R: Runtime> CompressedTensor<R> {
    /// Create an empty tensor with `I64` index arrays
    ///
    /// All three arrays are one-dimensional with length zero and the
    /// logical size is `[0]`.
    pub fn empty(layout: CompressedLayout, dtype: DType, device: &R::Device) -> Result<Self> {
        Self::empty_with_options(layout, dtype, device, &CompressedOptions::default())
    }

    /// Create an empty tensor with the given options
    pub fn empty_with_options(
        layout: CompressedLayout,
        dtype: DType,
        device: &R::Device,
        options: &CompressedOptions,
    ) -> Result<Self> {
        check_device_type(device.device_type())?;
        options.validate()?;

        let index_dtype = options.index_dtype();
        let crow_indices = Tensor::try_empty(&[0], index_dtype, device)?;
        let col_indices = Tensor::try_empty(&[0], index_dtype, device)?;
        let values = Tensor::try_empty(&[0], dtype, device)?;

        Self::from_parts(dtype, crow_indices, col_indices, values, layout)
    }

    /// Create a tensor from caller-provided arrays
    ///
    /// Checks the device class and that all three arrays share the values'
    /// device and that `values` has the declared `dtype`. The logical size
    /// starts as `[0]`; install the real size with
    /// [`Self::set_member_tensors`] or one of the resize operations.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the device class is neither CPU nor CUDA
    /// - `DeviceMismatch` if an index array is on another device
    /// - `ValuesDTypeMismatch` if `values.dtype() != dtype`
    pub fn from_parts(
        dtype: DType,
        crow_indices: Tensor<R>,
        col_indices: Tensor<R>,
        values: Tensor<R>,
        layout: CompressedLayout,
    ) -> Result<Self> {
        check_device_type(values.device().device_type())?;
        check_same_device(layout, &crow_indices, &col_indices, &values)?;
        if values.dtype() != dtype {
            return Err(Error::ValuesDTypeMismatch {
                layout,
                expected: dtype,
                got: values.dtype(),
            });
        }

        let mut meta = TensorMeta::new(dtype);
        meta.set_sizes_strides_policy(SizesStridesPolicy::CustomStrides);
        meta.set_non_overlapping_and_dense(false);

        BETA_WARNING.call_once(|| {
            tracing::warn!(
                layout = %layout,
                "Sparse compressed tensor support is in beta state and may change"
            );
        });

        Ok(Self {
            crow_indices,
            col_indices,
            values,
            layout,
            meta,
        })
    }

    /// Create a validated 2-D tensor from host slices
    ///
    /// `values_shape` is `[nnz]` for CSR/CSC and `[nnz, bh, bw]` for
    /// BSR/BSC; `size` is the logical `[rows, cols]` (plus any dense
    /// dimensions carried by `values_shape`). The structure is checked in
    /// full before the tensor is built.
    ///
    /// # Example
    ///
    /// ```
    /// use numr_compressed::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// // [1, 0, 2]
    /// // [0, 0, 3]
    /// let csr = CompressedTensor::<CpuRuntime>::from_slices(
    ///     CompressedLayout::Csr,
    ///     &[0, 2, 3],
    ///     &[0, 2, 2],
    ///     &[1.0f32, 2.0, 3.0],
    ///     &[3],
    ///     &[2, 3],
    ///     &device,
    /// )?;
    /// assert_eq!(csr.nnz(), 3);
    /// # Ok::<(), numr_compressed::error::Error>(())
    /// ```
    pub fn from_slices<T: Element>(
        layout: CompressedLayout,
        crow_indices: &[i64],
        col_indices: &[i64],
        values: &[T],
        values_shape: &[usize],
        size: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        check_device_type(device.device_type())?;

        let crow = Tensor::try_from_slice(crow_indices, &[crow_indices.len()], device)?;
        let col = Tensor::try_from_slice(col_indices, &[col_indices.len()], device)?;
        let vals = Tensor::try_from_slice(values, values_shape, device)?;

        validate_compressed_parts(layout, &crow, &col, &vals, size)?;

        let mut tensor = Self::from_parts(T::DTYPE, crow, col, vals, layout)?;
        tensor.record_sizes(size);
        Ok(tensor)
    }

    // ===== Accessors =====

    /// Returns the compressed index array
    pub fn crow_indices(&self) -> &Tensor<R> {
        &self.crow_indices
    }

    /// Returns the plain index array
    pub fn col_indices(&self) -> &Tensor<R> {
        &self.col_indices
    }

    /// Returns the values array
    pub fn values(&self) -> &Tensor<R> {
        &self.values
    }

    /// Returns the compressed layout
    pub fn layout(&self) -> CompressedLayout {
        self.layout
    }

    /// Declared element type of the values
    pub fn dtype(&self) -> DType {
        self.meta.dtype()
    }

    /// Device of the values array (shared by all three arrays)
    pub fn device(&self) -> &R::Device {
        self.values.device()
    }

    /// Logical sizes: batch dims, two sparse dims, then dense dims
    pub fn sizes(&self) -> &[usize] {
        self.meta.sizes()
    }

    /// Number of logical elements (including implicit zeros)
    pub fn numel(&self) -> usize {
        self.meta.numel()
    }

    /// Number of specified entries per batch slice
    pub fn nnz(&self) -> usize {
        self.col_indices.size(-1).unwrap_or(0)
    }

    /// Number of leading batch dimensions
    pub fn batch_dim(&self) -> usize {
        self.crow_indices.ndim().saturating_sub(1)
    }

    /// Number of sparse dimensions (always 2)
    pub fn sparse_dim(&self) -> usize {
        2
    }

    /// Number of trailing dense dimensions
    pub fn dense_dim(&self) -> usize {
        self.sizes()
            .len()
            .saturating_sub(self.batch_dim() + self.sparse_dim())
    }

    /// Block shape `[bh, bw]` for BSR/BSC, `None` otherwise
    pub fn blocksize(&self) -> Option<[usize; 2]> {
        if !self.layout.is_block() {
            return None;
        }
        let nnz_axis = self.batch_dim();
        match self.values.shape().get(nnz_axis + 1..nnz_axis + 3) {
            Some(&[bh, bw]) => Some([bh, bw]),
            _ => None,
        }
    }

    /// Name of the compressed index array for this layout
    pub fn compressed_indices_name(&self) -> &'static str {
        self.layout.compressed_indices_name()
    }

    /// Name of the plain index array for this layout
    pub fn plain_indices_name(&self) -> &'static str {
        self.layout.plain_indices_name()
    }

    /// Implementation type name
    pub fn type_name(&self) -> &'static str {
        "CompressedTensor"
    }

    /// Whether the logical size is still symbolic
    pub fn has_symbolic_sizes(&self) -> bool {
        self.meta.has_symbolic_sizes()
    }

    /// Mark the logical size as symbolic or concrete
    ///
    /// While symbolic, every resize and member installation fails.
    pub fn set_symbolic_sizes(&mut self, symbolic: bool) {
        self.meta.set_has_symbolic_sizes(symbolic);
    }

    /// Bytes of device memory held by the three arrays
    pub fn memory_usage(&self) -> usize {
        self.crow_indices.nbytes() + self.col_indices.nbytes() + self.values.nbytes()
    }

    /// Check the full sparse structure against the logical size
    ///
    /// Reads the index arrays back to the host. Resize operations and
    /// [`Self::set_member_tensors`] do not validate contents; call this
    /// after filling them.
    pub fn validate(&self) -> Result<()> {
        validate_compressed_parts(
            self.layout,
            &self.crow_indices,
            &self.col_indices,
            &self.values,
            self.sizes(),
        )
    }
}

/// Fail with `DeviceMismatch` unless both index arrays share the values' device
pub(crate) fn check_same_device<R: Runtime>(
    layout: CompressedLayout,
    crow_indices: &Tensor<R>,
    col_indices: &Tensor<R>,
    values: &Tensor<R>,
) -> Result<()> {
    if !values.device().is_same(crow_indices.device()) {
        return Err(Error::DeviceMismatch {
            layout,
            buffer: layout.compressed_indices_name(),
        });
    }
    if !values.device().is_same(col_indices.device()) {
        return Err(Error::DeviceMismatch {
            layout,
            buffer: layout.plain_indices_name(),
        });
    }
    Ok(())
}

impl<R: Runtime> fmt::Debug for CompressedTensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedTensor")
            .field("layout", &self.layout)
            .field("sizes", &self.sizes())
            .field("dtype", &self.dtype())
            .field(self.compressed_indices_name(), &self.crow_indices)
            .field(self.plain_indices_name(), &self.col_indices)
            .field("values", &self.values)
            .finish()
    }
}

impl<R: Runtime> fmt::Display for CompressedTensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompressedTensor(layout={}, size={:?}, nnz={}, dtype={})",
            self.layout,
            self.sizes(),
            self.nnz(),
            self.dtype()
        )
    }
}
