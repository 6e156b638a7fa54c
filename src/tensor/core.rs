//! Core Tensor type

use super::meta::{SizesStridesPolicy, TensorMeta, TensorMetadata};
use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::borrow::Cow;
use std::fmt;

/// N-dimensional dense array stored on a compute device
///
/// `Tensor` consists of:
/// - **Storage**: Reference-counted device memory
/// - **Layout**: Shape, strides, and offset defining the view into storage
/// - **DType**: Element type (determined at runtime)
///
/// Compressed sparse tensors hold their index and value arrays as dense
/// tensors, so this type provides the allocation, resize, fill and view
/// operations they are built from.
///
/// # Zero-Copy Views
///
/// `transpose` and `narrow` create new tensors that share the same
/// underlying storage. Writes through a view (for example `fill_`) are
/// visible through every tensor sharing that storage.
///
/// # Example
///
/// ```
/// use numr_compressed::prelude::*;
///
/// let device = CpuDevice::new();
/// let a = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3, 4], &[2, 2], &device);
/// let b = a.transpose(-1, -2).unwrap(); // Zero-copy, shares storage with a
/// assert_eq!(b.shape(), &[2, 2]);
/// ```
pub struct Tensor<R: Runtime> {
    /// Device memory
    storage: Storage<R>,
    /// Shape, strides, offset
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions,
    /// or if memory allocation fails.
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let expected_len = TensorMeta::checked_numel(shape)?;
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let storage = Storage::from_slice(data, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Create a tensor with unspecified contents
    ///
    /// # Panics
    ///
    /// Panics if allocation fails. For a fallible alternative, use [`Self::try_empty`].
    pub fn empty(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_empty(shape, dtype, device).expect("Tensor::empty failed")
    }

    /// Create a tensor with unspecified contents (fallible version)
    pub fn try_empty(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let len = TensorMeta::checked_numel(shape)?;
        let storage = Storage::new(len, dtype, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Fresh contiguous tensor with this tensor's shape, dtype and device
    ///
    /// Contents are unspecified and storage is never shared with `self`.
    pub fn empty_like(&self) -> Result<Self> {
        Self::try_empty(self.shape(), self.dtype(), self.device())
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_zeros(shape, dtype, device).expect("Tensor::zeros failed")
    }

    /// Create a tensor filled with zeros (fallible version)
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        Self::try_full_scalar(shape, dtype, 0.0, device)
    }

    /// Create a tensor filled with a scalar value
    ///
    /// The scalar is converted to the target dtype.
    pub fn full_scalar(shape: &[usize], dtype: DType, value: f64, device: &R::Device) -> Self {
        Self::try_full_scalar(shape, dtype, value, device).expect("Tensor::full_scalar failed")
    }

    /// Create a tensor filled with a scalar value (fallible version)
    pub fn try_full_scalar(
        shape: &[usize],
        dtype: DType,
        value: f64,
        device: &R::Device,
    ) -> Result<Self> {
        let len = TensorMeta::checked_numel(shape)?;
        if len == 0 {
            return Self::try_empty(shape, dtype, device);
        }

        let bytes = dtype.encode_scalar(value).repeat(len);
        let storage = Storage::from_bytes(&bytes, dtype, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Get size along a dimension (supports negative indexing)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout.dim(dim)
    }

    /// Bytes of device memory held by the underlying storage
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.storage.size_in_bytes()
    }

    // ===== View Operations (Zero-Copy) =====

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let new_layout =
            self.layout
                .transpose(dim0, dim1)
                .ok_or_else(|| Error::InvalidDimension {
                    dim: dim0,
                    ndim: self.ndim(),
                })?;

        Ok(Self::from_parts(self.storage.clone(), new_layout))
    }

    /// Narrow a dimension (zero-copy slice)
    ///
    /// Returns a view of the tensor narrowed to `length` elements starting
    /// at `start` along `dim` (negative indexing supported).
    ///
    /// # Example
    ///
    /// ```
    /// use numr_compressed::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let t = Tensor::<CpuRuntime>::zeros(&[4, 5, 6], DType::F32, &device);
    /// let narrowed = t.narrow(1, 1, 3).unwrap();
    /// assert_eq!(narrowed.shape(), &[4, 3, 6]);
    /// ```
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let dim_idx = self
            .layout
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;

        let new_layout =
            self.layout
                .narrow(dim, start, length)
                .ok_or_else(|| Error::ShapeMismatch {
                    expected: vec![self.shape()[dim_idx]],
                    got: vec![start, length],
                })?;

        Ok(Self::from_parts(self.storage.clone(), new_layout))
    }

    /// Make tensor contiguous (copy if needed)
    ///
    /// If the tensor is already contiguous, returns a view (zero-copy).
    /// Otherwise, allocates new storage and copies the data to a contiguous
    /// layout with `Runtime::copy_strided`.
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }

        let dtype = self.dtype();
        let device = self.storage.device();
        let new_storage = Storage::new(self.numel(), dtype, device)?;

        let elem_size = dtype.size_in_bytes();
        R::copy_strided(
            self.storage.ptr(),
            self.layout.offset() * elem_size,
            new_storage.ptr(),
            self.shape(),
            self.strides(),
            elem_size,
            device,
        )?;

        Ok(Self::from_parts(new_storage, Layout::contiguous(self.shape())))
    }

    // ===== Allocation-changing Operations =====

    /// Resize to `shape`, returning a fresh contiguous tensor
    ///
    /// The first `min(old, new)` elements in row-major order are carried
    /// over; any further elements are unspecified. The result never shares
    /// storage with `self`.
    pub fn resize(&self, shape: &[usize]) -> Result<Self> {
        let new_len = TensorMeta::checked_numel(shape)?;
        let src = if self.layout.has_contiguous_strides() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.contiguous()?)
        };

        let resized = Self::try_empty(shape, self.dtype(), self.device())?;
        let elem_size = self.dtype().size_in_bytes();
        let keep = src.numel().min(new_len);
        if keep > 0 {
            let src_ptr = src.storage.ptr() + (src.layout.offset() * elem_size) as u64;
            R::copy_within_device(
                src_ptr,
                resized.storage.ptr(),
                keep * elem_size,
                self.device(),
            )?;
        }

        Ok(resized)
    }

    /// Write `value` into every element addressed by this view
    ///
    /// Works on strided views: only the viewed elements of the shared
    /// storage change.
    pub fn fill_(&mut self, value: f64) -> Result<()> {
        let elem = self.dtype().encode_scalar(value);
        self.fill_bytes(&elem)
    }

    /// Write the index `value` into every element addressed by this view
    ///
    /// Unlike [`Self::fill_`] the value is encoded exactly, without a trip
    /// through `f64`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the dtype is not `I64`/`I32` or `value` does not
    /// fit in it. The check runs even when the view is empty.
    pub fn fill_index_(&mut self, value: usize) -> Result<()> {
        let dtype = self.dtype();
        let elem = match dtype {
            DType::I64 => i64::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
            DType::I32 => i32::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
            _ => {
                return Err(Error::invalid_argument(
                    "dtype",
                    format!("index fill needs i64 or i32, got {dtype}"),
                ));
            }
        }
        .ok_or_else(|| {
            Error::invalid_argument("value", format!("{value} does not fit in {dtype}"))
        })?;
        self.fill_bytes(&elem)
    }

    fn fill_bytes(&mut self, elem: &[u8]) -> Result<()> {
        let numel = self.numel();
        if numel == 0 {
            return Ok(());
        }

        let elem_size = elem.len();
        let device = self.storage.device();
        let base = self.storage.ptr() + (self.layout.offset() * elem_size) as u64;

        if self.layout.has_contiguous_strides() {
            return R::copy_to_device(&elem.repeat(numel), base, device);
        }

        let shape = self.layout.shape();
        let strides = self.layout.strides();
        let mut indices = vec![0usize; shape.len()];

        for _ in 0..numel {
            let elem_offset: isize = indices
                .iter()
                .zip(strides)
                .map(|(&idx, &stride)| idx as isize * stride)
                .sum();
            let dst = base.wrapping_add_signed(elem_offset as i64 * elem_size as i64);
            R::copy_to_device(elem, dst, device)?;

            // Increment indices (row-major order)
            for dim in (0..shape.len()).rev() {
                indices[dim] += 1;
                if indices[dim] < shape[dim] {
                    break;
                }
                indices[dim] = 0;
            }
        }
        Ok(())
    }

    /// Set every element addressed by this view to zero
    pub fn zero_(&mut self) -> Result<()> {
        self.fill_(0.0)
    }

    // ===== Data Access =====

    /// Copy tensor data to a Vec on the host
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the tensor's dtype. For a fallible
    /// alternative, use [`Self::try_to_vec`].
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        self.try_to_vec().expect("Tensor::to_vec failed")
    }

    /// Copy tensor data to a Vec on the host (fallible version)
    ///
    /// Elements come out in row-major order of the view, copying through a
    /// contiguous temporary when the view is strided.
    pub fn try_to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype(),
                rhs: T::DTYPE,
            });
        }

        let src = if self.layout.has_contiguous_strides() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.contiguous()?)
        };

        let numel = src.numel();
        let byte_offset = src.layout.offset() * std::mem::size_of::<T>();

        // Allocate with correct alignment for T, then cast to bytes for copy.
        let mut result = vec![T::zeroed(); numel];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        R::copy_from_device(
            src.storage.ptr() + byte_offset as u64,
            bytes,
            src.storage.device(),
        )?;
        Ok(result)
    }

    /// Copy an `I64` or `I32` tensor to the host as `i64`
    pub fn to_index_vec(&self) -> Result<Vec<i64>> {
        match self.dtype() {
            DType::I64 => self.try_to_vec::<i64>(),
            DType::I32 => Ok(self
                .try_to_vec::<i32>()?
                .into_iter()
                .map(i64::from)
                .collect()),
            other => Err(Error::invalid_argument(
                "indices",
                format!("expected an i64 or i32 tensor, got {other}"),
            )),
        }
    }

    /// Replace the layout after checking it stays inside the storage
    fn install_layout(&mut self, layout: Layout) -> Result<()> {
        let required = layout.required_storage_len().ok_or_else(|| {
            Error::invalid_argument("strides", "negative or overflowing strides")
        })?;
        if required > self.storage.len() {
            return Err(Error::invalid_argument(
                "layout",
                format!(
                    "view needs {required} elements but storage holds {}",
                    self.storage.len()
                ),
            ));
        }
        self.layout = layout;
        Ok(())
    }
}

impl<R: Runtime> TensorMetadata for Tensor<R> {
    fn sizes(&self) -> &[usize] {
        self.layout.shape()
    }

    fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    fn sizes_strides_policy(&self) -> SizesStridesPolicy {
        SizesStridesPolicy::Default
    }

    fn is_non_overlapping_and_dense(&self) -> bool {
        self.layout.is_non_overlapping_and_dense()
    }

    fn strides(&self) -> Result<&[isize]> {
        Ok(self.layout.strides())
    }

    fn storage_offset(&self) -> Result<usize> {
        Ok(self.layout.offset())
    }

    fn is_contiguous(&self) -> Result<bool> {
        Ok(self.layout.is_contiguous())
    }

    fn set_size(&mut self, dim: usize, size: usize) -> Result<()> {
        let layout = self
            .layout
            .with_size(dim, size)
            .ok_or(Error::InvalidDimension {
                dim: dim as isize,
                ndim: self.ndim(),
            })?;
        self.install_layout(layout)
    }

    fn set_stride(&mut self, dim: usize, stride: isize) -> Result<()> {
        let layout = self
            .layout
            .with_stride(dim, stride)
            .ok_or(Error::InvalidDimension {
                dim: dim as isize,
                ndim: self.ndim(),
            })?;
        self.install_layout(layout)
    }

    fn set_storage_offset(&mut self, offset: usize) -> Result<()> {
        let layout = self.layout.with_offset(offset);
        self.install_layout(layout)
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new tensor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype={})", self.shape(), self.dtype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_from_slice() {
        let device = CpuDevice::new();
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::<CpuRuntime>::from_slice(&data, &[2, 3], &device);

        assert_eq!(tensor.shape(), &[2, 3]);
        assert_eq!(tensor.dtype(), DType::F32);
        assert!(tensor.is_contiguous());
        assert_eq!(tensor.numel(), 6);

        let result: Vec<f32> = tensor.to_vec();
        assert_eq!(result, data);
    }

    #[test]
    fn test_try_from_slice_shape_mismatch() {
        let device = CpuDevice::new();
        let result = Tensor::<CpuRuntime>::try_from_slice(&[1i64, 2, 3], &[2, 2], &device);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_contiguous_from_transpose() {
        let device = CpuDevice::new();
        // Create a 2x3 matrix: [[1, 2, 3], [4, 5, 6]]
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::<CpuRuntime>::from_slice(&data, &[2, 3], &device);

        // Transpose to 3x2: [[1, 4], [2, 5], [3, 6]]
        let transposed = tensor.transpose(0, 1).unwrap();
        assert!(!transposed.is_contiguous());

        let contiguous = transposed.contiguous().unwrap();
        assert!(contiguous.is_contiguous());
        assert_eq!(contiguous.shape(), &[3, 2]);

        let result: Vec<f32> = contiguous.to_vec();
        assert_eq!(result, [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_full_scalar() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::full_scalar(&[2, 2], DType::I32, 42.0, &device);

        assert_eq!(tensor.shape(), &[2, 2]);
        assert_eq!(tensor.dtype(), DType::I32);

        let result: Vec<i32> = tensor.to_vec();
        assert_eq!(result, [42, 42, 42, 42]);
    }

    #[test]
    fn test_empty_like_does_not_share_storage() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3], &[3], &device);
        let like = tensor.empty_like().unwrap();

        assert_eq!(like.shape(), &[3]);
        assert_eq!(like.dtype(), DType::I64);
        assert!(!like.storage().same_allocation(tensor.storage()));
    }

    #[test]
    fn test_resize_grows_and_keeps_prefix() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3], &[3], &device);
        let grown = tensor.resize(&[2, 3]).unwrap();

        assert_eq!(grown.shape(), &[2, 3]);
        assert_eq!(&grown.to_vec::<i64>()[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_resize_shrinks() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[1i32, 2, 3, 4, 5], &[5], &device);
        let shrunk = tensor.resize(&[2]).unwrap();
        assert_eq!(shrunk.to_vec::<i32>(), [1, 2]);
    }

    #[test]
    fn test_resize_from_transposed_view() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3, 4], &[2, 2], &device);
        let transposed = tensor.transpose(0, 1).unwrap();
        let flat = transposed.resize(&[4]).unwrap();
        assert_eq!(flat.to_vec::<i64>(), [1, 3, 2, 4]);
    }

    #[test]
    fn test_fill_narrowed_view_writes_through() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[0i64; 8], &[2, 4], &device);

        // Last two entries of each row
        let mut tail = tensor.narrow(-1, 2, 2).unwrap();
        tail.fill_(7.0).unwrap();

        assert_eq!(tensor.to_vec::<i64>(), [0, 0, 7, 7, 0, 0, 7, 7]);
        assert_eq!(tail.to_vec::<i64>(), [7, 7, 7, 7]);
    }

    #[test]
    fn test_fill_index_is_exact() {
        let device = CpuDevice::new();
        let mut tensor = Tensor::<CpuRuntime>::from_slice(&[0i64; 2], &[2], &device);
        let big = (1usize << 53) + 1;
        tensor.fill_index_(big).unwrap();
        assert_eq!(tensor.to_vec::<i64>(), [big as i64, big as i64]);
    }

    #[test]
    fn test_fill_index_rejects_overflow() {
        let device = CpuDevice::new();
        let mut tensor = Tensor::<CpuRuntime>::from_slice(&[1i32, 2], &[2], &device);
        let err = tensor.fill_index_(i32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "value", .. }));
        assert_eq!(tensor.to_vec::<i32>(), [1, 2]);

        // Checked even when nothing would be written
        let mut empty = Tensor::<CpuRuntime>::empty(&[0], DType::I32, &device);
        assert!(empty.fill_index_(usize::MAX).is_err());

        let mut floats = Tensor::<CpuRuntime>::empty(&[1], DType::F32, &device);
        assert!(matches!(
            floats.fill_index_(1),
            Err(Error::InvalidArgument { arg: "dtype", .. })
        ));
    }

    #[test]
    fn test_zero_contiguous() {
        let device = CpuDevice::new();
        let mut tensor = Tensor::<CpuRuntime>::from_slice(&[1.5f64, 2.5], &[2], &device);
        tensor.zero_().unwrap();
        assert_eq!(tensor.to_vec::<f64>(), [0.0, 0.0]);
    }

    #[test]
    fn test_to_vec_dtype_mismatch() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::from_slice(&[1i32, 2], &[2], &device);
        assert!(matches!(
            tensor.try_to_vec::<i64>(),
            Err(Error::DTypeMismatch { .. })
        ));
        assert_eq!(tensor.to_index_vec().unwrap(), vec![1i64, 2]);
    }

    #[test]
    fn test_dense_metadata_mutators() {
        let device = CpuDevice::new();
        let mut tensor = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F32, &device);

        TensorMetadata::set_size(&mut tensor, 1, 2).unwrap();
        assert_eq!(TensorMetadata::sizes(&tensor), &[2, 2]);
        assert!(!TensorMetadata::is_contiguous(&tensor).unwrap());

        TensorMetadata::set_storage_offset(&mut tensor, 1).unwrap();
        assert_eq!(TensorMetadata::storage_offset(&tensor).unwrap(), 1);

        // Would address element 6 of a 6-element storage
        assert!(TensorMetadata::set_storage_offset(&mut tensor, 2).is_err());
        assert!(TensorMetadata::set_size(&mut tensor, 5, 1).is_err());
        assert_eq!(
            TensorMetadata::sizes_strides_policy(&tensor),
            SizesStridesPolicy::Default
        );
    }
}
