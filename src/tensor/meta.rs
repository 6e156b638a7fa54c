//! Tensor metadata shared by dense and compressed tensors
//!
//! [`TensorMeta`] is the bookkeeping every tensor kind carries: logical
//! sizes, cached element count, declared element type and the flags that
//! tell generic code which parts of the dense interface apply.
//! [`TensorMetadata`] is the capability interface over it. Dense tensors
//! answer every query; layouts without strides reject the strided ones.

use super::shape::{Shape, checked_numel};
use crate::dtype::DType;
use crate::error::{Error, Result};

/// Which size and stride queries a tensor answers itself
///
/// Ordered from least to most customized: a tensor with custom sizes
/// also customizes strides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SizesStridesPolicy {
    /// Sizes and strides come straight from the dense layout
    #[default]
    Default,
    /// Sizes are plain, stride queries are overridden
    CustomStrides,
    /// Both size and stride queries are overridden
    CustomSizes,
}

/// Logical metadata of a tensor, independent of its buffers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorMeta {
    sizes: Shape,
    numel: usize,
    dtype: DType,
    policy: SizesStridesPolicy,
    non_overlapping_and_dense: bool,
    symbolic_sizes: bool,
}

impl TensorMeta {
    /// Metadata of a one-dimensional tensor of size zero
    pub fn new(dtype: DType) -> Self {
        Self {
            sizes: Shape::from([0]),
            numel: 0,
            dtype,
            policy: SizesStridesPolicy::Default,
            non_overlapping_and_dense: true,
            symbolic_sizes: false,
        }
    }

    /// Logical sizes
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Cached element count, as of the last [`Self::refresh_numel`]
    #[inline]
    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Number of logical dimensions
    #[inline]
    pub fn dim(&self) -> usize {
        self.sizes.ndim()
    }

    /// Declared element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Replace the declared element type
    pub fn set_dtype(&mut self, dtype: DType) {
        self.dtype = dtype;
    }

    /// Replace the logical sizes
    ///
    /// Does not touch the cached element count.
    pub fn set_sizes(&mut self, sizes: &[usize]) {
        self.sizes = Shape::from(sizes);
    }

    /// Recompute the cached element count from the sizes
    ///
    /// Saturates on overflow; callers validate sizes with
    /// [`TensorMeta::checked_numel`] before installing them.
    pub fn refresh_numel(&mut self) {
        self.numel = self
            .sizes
            .iter()
            .fold(1usize, |acc, &d| acc.saturating_mul(d));
    }

    /// Element count of `sizes`, rejecting products that overflow
    pub fn checked_numel(sizes: &[usize]) -> Result<usize> {
        checked_numel(sizes).ok_or_else(|| {
            Error::invalid_argument("size", format!("element count of {sizes:?} overflows"))
        })
    }

    /// Current sizes/strides policy
    #[inline]
    pub fn sizes_strides_policy(&self) -> SizesStridesPolicy {
        self.policy
    }

    /// Replace the sizes/strides policy
    pub fn set_sizes_strides_policy(&mut self, policy: SizesStridesPolicy) {
        self.policy = policy;
    }

    /// Whether the elements form one dense, non-overlapping block
    #[inline]
    pub fn is_non_overlapping_and_dense(&self) -> bool {
        self.non_overlapping_and_dense
    }

    /// Set the dense-block flag
    pub fn set_non_overlapping_and_dense(&mut self, value: bool) {
        self.non_overlapping_and_dense = value;
    }

    /// Whether the sizes are symbolic (not yet concrete)
    #[inline]
    pub fn has_symbolic_sizes(&self) -> bool {
        self.symbolic_sizes
    }

    /// Mark the sizes as symbolic or concrete
    pub fn set_has_symbolic_sizes(&mut self, value: bool) {
        self.symbolic_sizes = value;
    }
}

/// Metadata interface common to every tensor kind
///
/// The size queries always succeed. The strided queries and mutators
/// succeed only for tensors with a dense strided layout; other layouts
/// return [`Error::UnsupportedOperation`].
pub trait TensorMetadata {
    /// Logical sizes
    fn sizes(&self) -> &[usize];

    /// Number of logical elements
    fn numel(&self) -> usize;

    /// Number of logical dimensions
    fn dim(&self) -> usize {
        self.sizes().len()
    }

    /// Declared element type
    fn dtype(&self) -> DType;

    /// Which size and stride queries the tensor overrides
    fn sizes_strides_policy(&self) -> SizesStridesPolicy;

    /// Whether the elements form one dense, non-overlapping block
    fn is_non_overlapping_and_dense(&self) -> bool;

    /// Element strides of each dimension
    fn strides(&self) -> Result<&[isize]>;

    /// Element offset of the first element in storage
    fn storage_offset(&self) -> Result<usize>;

    /// Whether the layout is row-major contiguous
    fn is_contiguous(&self) -> Result<bool>;

    /// Change the size of one dimension in place
    fn set_size(&mut self, dim: usize, size: usize) -> Result<()>;

    /// Change the stride of one dimension in place
    fn set_stride(&mut self, dim: usize, stride: isize) -> Result<()>;

    /// Change the storage offset in place
    fn set_storage_offset(&mut self, offset: usize) -> Result<()>;
}
