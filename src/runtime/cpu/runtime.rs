//! CPU runtime implementation

use super::device::CpuDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

/// Alignment of every CPU allocation (AVX-512 friendly)
const ALIGN: usize = 64;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform.
/// Memory is allocated on the heap using the system allocator.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

fn alloc_layout(size_bytes: usize) -> Result<AllocLayout> {
    AllocLayout::from_size_align(size_bytes, ALIGN)
        .map_err(|_| Error::OutOfMemory { size: size_bytes })
}

impl Runtime for CpuRuntime {
    type Device = CpuDevice;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, _device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let layout = alloc_layout(size_bytes)?;
        let ptr = unsafe { alloc_zeroed(layout) };

        if ptr.is_null() {
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        Ok(ptr as u64)
    }

    fn deallocate(ptr: u64, size_bytes: usize, _device: &Self::Device) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }

        // The layout was valid when the block was allocated
        if let Ok(layout) = alloc_layout(size_bytes) {
            unsafe {
                dealloc(ptr as *mut u8, layout);
            }
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        _device: &Self::Device,
    ) -> Result<()> {
        if size_bytes == 0 || src == 0 || dst == 0 {
            return Ok(());
        }

        unsafe {
            // copy, not copy_nonoverlapping: src and dst may overlap
            std::ptr::copy(src as *const u8, dst as *mut u8, size_bytes);
        }
        Ok(())
    }

    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        _device: &Self::Device,
    ) -> Result<()> {
        if src_handle == 0 || dst_handle == 0 {
            return Ok(());
        }

        let numel: usize = shape.iter().product();
        if numel == 0 {
            return Ok(());
        }

        let src_base = (src_handle as usize + src_byte_offset) as *const u8;
        let dst_base = dst_handle as *mut u8;

        let mut indices = vec![0usize; shape.len()];

        for dst_offset in 0..numel {
            let src_elem_offset: isize = indices
                .iter()
                .zip(strides)
                .map(|(&idx, &stride)| idx as isize * stride)
                .sum();

            unsafe {
                std::ptr::copy_nonoverlapping(
                    src_base.offset(src_elem_offset * elem_size as isize),
                    dst_base.add(dst_offset * elem_size),
                    elem_size,
                );
            }

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

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_identity() {
        assert_eq!(CpuRuntime::name(), "cpu");
        assert_eq!(CpuRuntime::default_device(), CpuDevice::new());
    }

    #[test]
    fn test_allocate_zero_bytes_is_null() {
        let device = CpuDevice::new();
        assert_eq!(CpuRuntime::allocate(0, &device).unwrap(), 0);
    }

    #[test]
    fn test_round_trip_copy() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(4, &device).unwrap();

        CpuRuntime::copy_to_device(&[1, 2, 3, 4], ptr, &device).unwrap();
        let mut out = [0u8; 4];
        CpuRuntime::copy_from_device(ptr, &mut out, &device).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);

        CpuRuntime::deallocate(ptr, 4, &device);
    }

    #[test]
    fn test_copy_strided_transposes() {
        let device = CpuDevice::new();
        // [[1, 2, 3], [4, 5, 6]] read with transposed strides
        let src: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let src_ptr = CpuRuntime::allocate(6, &device).unwrap();
        let dst_ptr = CpuRuntime::allocate(6, &device).unwrap();
        CpuRuntime::copy_to_device(&src, src_ptr, &device).unwrap();

        CpuRuntime::copy_strided(src_ptr, 0, dst_ptr, &[3, 2], &[1, 3], 1, &device).unwrap();

        let mut out = [0u8; 6];
        CpuRuntime::copy_from_device(dst_ptr, &mut out, &device).unwrap();
        assert_eq!(out, [1, 4, 2, 5, 3, 6]);

        CpuRuntime::deallocate(src_ptr, 6, &device);
        CpuRuntime::deallocate(dst_ptr, 6, &device);
    }
}
