//! Layout: shape, strides, and offset for tensor memory layout

use super::shape::Shape;
use super::strides::Strides;
use std::fmt;

/// Layout describes the memory layout of a tensor
///
/// A tensor's elements are stored in a contiguous buffer, but not necessarily
/// in row-major order. The layout specifies how to compute the memory address
/// of any element given its indices.
///
/// Address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    /// Shape: size along each dimension
    shape: Shape,
    /// Strides: offset (in elements) between consecutive elements along each dimension
    strides: Strides,
    /// Offset: starting element index in the underlying storage
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout from a shape
    ///
    /// # Example
    /// ```
    /// use numr_compressed::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape = Shape::from(shape);
        let strides = Self::compute_contiguous_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Compute contiguous strides for a given shape (row-major order)
    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides = Strides::with_capacity(shape.len());
        let mut stride = 1isize;

        // Compute strides from last dimension to first
        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride = stride.wrapping_mul(dim as isize);
        }

        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if memory is contiguous (row-major order) and starts at offset 0
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.has_contiguous_strides()
    }

    /// Check if the strides are row-major for the shape, ignoring the offset
    pub fn has_contiguous_strides(&self) -> bool {
        self.strides == Self::compute_contiguous_strides(&self.shape)
    }

    /// Check if the addressed elements cover a dense block without overlap,
    /// in any dimension order
    pub fn is_non_overlapping_and_dense(&self) -> bool {
        if self.ndim() == 1 {
            return self.shape[0] < 2 || self.strides[0] == 1;
        }

        let mut perm: Vec<usize> = (0..self.ndim()).collect();
        perm.sort_by_key(|&d| (self.strides[d].unsigned_abs(), self.shape[d]));

        let mut required = 1isize;
        for d in perm {
            let size = self.shape[d];
            if size == 1 {
                continue;
            }
            if self.strides[d] != required {
                return false;
            }
            required = required.wrapping_mul(size as isize);
        }
        true
    }

    /// Get size along a specific dimension
    ///
    /// Supports negative indexing: -1 is the last dimension
    pub fn dim(&self, d: isize) -> Option<usize> {
        let idx = self.normalize_dim(d)?;
        Some(self.shape[idx])
    }

    /// Normalize a dimension index (handle negative indices)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        if idx >= 0 && idx < ndim {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Minimum storage length (in elements) this layout can address
    ///
    /// Zero when the layout holds no elements. Returns `None` for negative
    /// strides or on overflow.
    pub fn required_storage_len(&self) -> Option<usize> {
        if self.shape.iter().any(|&s| s == 0) {
            return Some(0);
        }

        let mut last = self.offset;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()) {
            let stride = usize::try_from(stride).ok()?;
            last = last.checked_add((size - 1).checked_mul(stride)?)?;
        }
        last.checked_add(1)
    }

    /// Create a transposed layout (swap two dimensions)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();

        new_shape.swap(d0, d1);
        new_strides.swap(d0, d1);

        Some(Self {
            shape: new_shape,
            strides: new_strides,
            offset: self.offset,
        })
    }

    /// Create a layout viewing `length` elements of `dim` starting at `start`
    ///
    /// Returns None if the dimension is invalid or the range exceeds it.
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Option<Self> {
        let d = self.normalize_dim(dim)?;
        if start.checked_add(length)? > self.shape[d] {
            return None;
        }

        let mut new_shape = self.shape.clone();
        new_shape[d] = length;

        // A zero-length view addresses nothing, so the offset shift is irrelevant
        let shift = if length == 0 {
            0
        } else {
            start * self.strides[d].unsigned_abs()
        };

        Some(Self {
            shape: new_shape,
            strides: self.strides.clone(),
            offset: self.offset + shift,
        })
    }

    /// Same layout with the size of `dim` replaced
    pub fn with_size(&self, dim: usize, size: usize) -> Option<Self> {
        if dim >= self.ndim() {
            return None;
        }
        let mut layout = self.clone();
        layout.shape[dim] = size;
        Some(layout)
    }

    /// Same layout with the stride of `dim` replaced
    pub fn with_stride(&self, dim: usize, stride: isize) -> Option<Self> {
        if dim >= self.ndim() {
            return None;
        }
        let mut layout = self.clone();
        layout.strides[dim] = stride;
        Some(layout)
    }

    /// Same layout starting at another storage offset
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_layout() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        assert_eq!(layout.shape(), &[2, 3, 4]);
        assert_eq!(layout.strides(), &[12, 4, 1]);
        assert_eq!(layout.elem_count(), 24);
        assert!(layout.is_contiguous());
        assert!(layout.is_non_overlapping_and_dense());
        assert_eq!(layout.required_storage_len(), Some(24));
    }

    #[test]
    fn test_transpose() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        let transposed = layout.transpose(-1, -2).unwrap();
        assert_eq!(transposed.shape(), &[2, 4, 3]);
        assert_eq!(transposed.strides(), &[12, 1, 4]);
        assert!(!transposed.is_contiguous());
        // Permuted but still a dense block
        assert!(transposed.is_non_overlapping_and_dense());
    }

    #[test]
    fn test_narrow_last_dim() {
        let layout = Layout::contiguous(&[2, 5]);
        let narrowed = layout.narrow(-1, 3, 2).unwrap();
        assert_eq!(narrowed.shape(), &[2, 2]);
        assert_eq!(narrowed.strides(), &[5, 1]);
        assert_eq!(narrowed.offset(), 3);
        assert!(!narrowed.is_contiguous());
        assert!(!narrowed.is_non_overlapping_and_dense());
        assert_eq!(narrowed.required_storage_len(), Some(10));
    }

    #[test]
    fn test_narrow_out_of_range() {
        let layout = Layout::contiguous(&[4]);
        assert!(layout.narrow(0, 3, 2).is_none());
        assert!(layout.narrow(1, 0, 1).is_none());
        assert_eq!(layout.narrow(0, 4, 0).unwrap().shape(), &[0]);
    }

    #[test]
    fn test_offset_breaks_contiguity_only() {
        let layout = Layout::contiguous(&[3]).with_offset(1);
        assert!(!layout.is_contiguous());
        assert!(layout.has_contiguous_strides());
    }

    #[test]
    fn test_overlapping_strides() {
        let layout = Layout::contiguous(&[2, 3]).with_stride(0, 1).unwrap();
        assert!(!layout.is_non_overlapping_and_dense());
        assert_eq!(layout.required_storage_len(), Some(4));
        assert!(Layout::contiguous(&[2]).with_stride(0, -1).unwrap().required_storage_len().is_none());
    }

    #[test]
    fn test_empty_layout_needs_no_storage() {
        let layout = Layout::contiguous(&[0, 7]).with_offset(100);
        assert_eq!(layout.required_storage_len(), Some(0));
    }
}
