//! Common test utilities
#![allow(dead_code)]

use numr_compressed::dtype::DType;
use numr_compressed::runtime::cpu::{CpuDevice, CpuRuntime};
use numr_compressed::sparse::{CompressedLayout, CompressedTensor};
use numr_compressed::tensor::Tensor;

/// Create the default CPU device for testing
pub fn cpu_device() -> CpuDevice {
    CpuDevice::new()
}

/// Default-empty compressed tensor on the default CPU device
pub fn empty_compressed(layout: CompressedLayout, dtype: DType) -> CompressedTensor<CpuRuntime> {
    CompressedTensor::empty(layout, dtype, &cpu_device()).expect("empty compressed tensor")
}

/// 3x3 CSR matrix
///
/// ```text
/// [1, 0, 2]
/// [0, 0, 3]
/// [4, 5, 0]
/// ```
pub fn csr_3x3() -> CompressedTensor<CpuRuntime> {
    CompressedTensor::from_slices(
        CompressedLayout::Csr,
        &[0, 2, 3, 5],
        &[0, 2, 2, 0, 1],
        &[1.0f32, 2.0, 3.0, 4.0, 5.0],
        &[5],
        &[3, 3],
        &cpu_device(),
    )
    .expect("valid 3x3 CSR")
}

/// 4x4 BSR matrix with 2x2 blocks, one block in the top-left corner
pub fn bsr_4x4() -> CompressedTensor<CpuRuntime> {
    CompressedTensor::from_slices(
        CompressedLayout::Bsr,
        &[0, 1, 1],
        &[0],
        &[1.0f32, 2.0, 3.0, 4.0],
        &[1, 2, 2],
        &[4, 4],
        &cpu_device(),
    )
    .expect("valid 4x4 BSR")
}

/// Assert all three arrays of `t` live on `t.device()`
pub fn assert_same_device(t: &CompressedTensor<CpuRuntime>) {
    assert_eq!(t.crow_indices().device(), t.device());
    assert_eq!(t.col_indices().device(), t.device());
    assert_eq!(t.values().device(), t.device());
}

/// Index array as host `i64`s, whatever its index dtype
pub fn indices(t: &Tensor<CpuRuntime>) -> Vec<i64> {
    t.to_index_vec().expect("index tensor")
}
