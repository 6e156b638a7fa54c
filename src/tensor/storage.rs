//! Storage: device memory management with Arc-based sharing

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::sync::Arc;

/// Storage for tensor data on a device
///
/// Storage wraps device memory with reference counting, enabling zero-copy
/// views (narrow, transpose) that share the underlying buffer.
///
/// Memory is automatically deallocated when the last reference is dropped.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device pointer (CPU ptr cast to u64)
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
    /// Device where memory is allocated
    device: R::Device,
}

impl<R: Runtime> Storage<R> {
    /// Create new storage with allocated memory
    ///
    /// Allocates `len` elements of type `dtype` on the specified device.
    pub fn new(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let size_bytes = len
            .checked_mul(dtype.size_in_bytes())
            .ok_or(Error::OutOfMemory { size: usize::MAX })?;
        let ptr = R::allocate(size_bytes, device)?;

        Ok(Self::wrap(ptr, len, dtype, device))
    }

    /// Create storage from existing data with inferred dtype
    ///
    /// Copies `data` to the device. The dtype is inferred from the Element type.
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;
        // Wrap first so the block is released if the copy fails
        let storage = Self::wrap(ptr, data.len(), T::DTYPE, device);

        R::copy_to_device(bytes, ptr, device)?;
        Ok(storage)
    }

    /// Create storage from raw bytes with explicit dtype
    ///
    /// `data.len()` must be a multiple of the dtype's element size.
    pub fn from_bytes(data: &[u8], dtype: DType, device: &R::Device) -> Result<Self> {
        let elem_size = dtype.size_in_bytes();
        if data.len() % elem_size != 0 {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "{} bytes is not a whole number of {} elements",
                    data.len(),
                    dtype
                ),
            ));
        }

        let ptr = R::allocate(data.len(), device)?;
        let storage = Self::wrap(ptr, data.len() / elem_size, dtype, device);

        R::copy_to_device(data, ptr, device)?;
        Ok(storage)
    }

    fn wrap(ptr: u64, len: usize, dtype: DType, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
            }),
        }
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * self.inner.dtype.size_in_bytes()
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if this is the only reference
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Check if two handles share one allocation
    #[inline]
    pub fn same_allocation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(
                self.ptr,
                self.len * self.dtype.size_in_bytes(),
                &self.device,
            );
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_from_slice_records_dtype_and_len() {
        let device = CpuDevice::new();
        let storage = Storage::<CpuRuntime>::from_slice(&[1i32, 2, 3], &device).unwrap();
        assert_eq!(storage.len(), 3);
        assert_eq!(storage.dtype(), DType::I32);
        assert_eq!(storage.size_in_bytes(), 12);
        assert!(storage.is_unique());
    }

    #[test]
    fn test_clone_shares_allocation() {
        let device = CpuDevice::new();
        let a = Storage::<CpuRuntime>::new(4, DType::F64, &device).unwrap();
        let b = a.clone();
        assert!(a.same_allocation(&b));
        assert_eq!(a.ref_count(), 2);

        let c = Storage::<CpuRuntime>::new(4, DType::F64, &device).unwrap();
        assert!(!a.same_allocation(&c));
    }

    #[test]
    fn test_from_bytes_rejects_partial_element() {
        let device = CpuDevice::new();
        let err = Storage::<CpuRuntime>::from_bytes(&[0u8; 6], DType::I32, &device).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "data", .. }));
    }

    #[test]
    fn test_empty_storage() {
        let device = CpuDevice::new();
        let storage = Storage::<CpuRuntime>::new(0, DType::I64, &device).unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.ptr(), 0);
    }
}
