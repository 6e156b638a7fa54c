//! Error types for numr-compressed

use crate::dtype::DType;
use crate::sparse::CompressedLayout;
use thiserror::Error;

/// Result type alias using the crate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Callers use this to tell caller bugs (bad arguments), broken buffer
/// invariants (device/dtype disagreement) and misuse of the dense metadata
/// interface apart without matching on every variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed shape, dimension, option or device class
    InvalidArgument,
    /// Buffers disagree on device or element type
    InvariantViolation,
    /// Operation is not defined for this tensor in its current state
    UnsupportedOperation,
    /// Allocation or backend failure
    Runtime,
}

/// Errors that can occur in tensor and compressed sparse operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid dimension index
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// DType mismatch between two buffers
    #[error("DType mismatch: {lhs} vs {rhs}")]
    DTypeMismatch {
        /// Expected dtype
        lhs: DType,
        /// Actual dtype
        rhs: DType,
    },

    /// Values of a compressed tensor disagree with its declared dtype
    #[error("Sparse {layout}: dtype of values ({got}) must match dtype of sparse tensor ({expected})")]
    ValuesDTypeMismatch {
        /// Active compressed layout
        layout: CompressedLayout,
        /// Declared dtype of the sparse tensor
        expected: DType,
        /// Dtype of the values buffer
        got: DType,
    },

    /// Buffers that must share a device live on different devices
    #[error("Sparse {layout}: values and {buffer} need to be on the same device")]
    DeviceMismatch {
        /// Active compressed layout
        layout: CompressedLayout,
        /// The index buffer that disagrees with `values`
        buffer: &'static str,
    },

    /// Dense-layout operation invoked on a compressed sparse tensor
    #[error("Sparse {} tensors do not have {op}", .layout.name())]
    UnsupportedOperation {
        /// Active compressed layout
        layout: CompressedLayout,
        /// The rejected operation
        op: &'static str,
    },

    /// Mutation requested while the shape is still symbolic
    #[error("Sparse {layout}: {op} called on tensor with symbolic shape")]
    SymbolicShape {
        /// Active compressed layout
        layout: CompressedLayout,
        /// The rejected operation
        op: &'static str,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported operation error for a compressed layout
    pub fn unsupported(layout: CompressedLayout, op: &'static str) -> Self {
        Self::UnsupportedOperation { layout, op }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. }
            | Self::InvalidDimension { .. }
            | Self::IndexOutOfBounds { .. }
            | Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::DTypeMismatch { .. }
            | Self::ValuesDTypeMismatch { .. }
            | Self::DeviceMismatch { .. } => ErrorKind::InvariantViolation,
            Self::UnsupportedOperation { .. } | Self::SymbolicShape { .. } => {
                ErrorKind::UnsupportedOperation
            }
            Self::OutOfMemory { .. } => ErrorKind::Runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_layout() {
        let err = Error::unsupported(CompressedLayout::Bsc, "strides");
        assert_eq!(err.to_string(), "Sparse BSC tensors do not have strides");
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::DeviceMismatch {
                layout: CompressedLayout::Csr,
                buffer: "crow_indices"
            }
            .kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            Error::DTypeMismatch {
                lhs: DType::F32,
                rhs: DType::F64
            }
            .kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            Error::invalid_argument("sparse_dim", "must be at least 2").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::SymbolicShape {
                layout: CompressedLayout::Csr,
                op: "resize_"
            }
            .kind(),
            ErrorKind::UnsupportedOperation
        );
    }

    #[test]
    fn test_invariant_messages_name_layout() {
        let err = Error::ValuesDTypeMismatch {
            layout: CompressedLayout::Bsc,
            expected: DType::F32,
            got: DType::F64,
        };
        assert_eq!(
            err.to_string(),
            "Sparse BSC: dtype of values (f64) must match dtype of sparse tensor (f32)"
        );
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        let err = Error::DeviceMismatch {
            layout: CompressedLayout::Csc,
            buffer: "row_indices",
        };
        assert_eq!(
            err.to_string(),
            "Sparse CSC: values and row_indices need to be on the same device"
        );

        let err = Error::SymbolicShape {
            layout: CompressedLayout::Bsr,
            op: "resize_",
        };
        assert_eq!(
            err.to_string(),
            "Sparse BSR: resize_ called on tensor with symbolic shape"
        );
    }

    #[test]
    fn test_dtype_mismatch_uses_short_names() {
        let err = Error::DTypeMismatch {
            lhs: DType::I64,
            rhs: DType::I32,
        };
        assert_eq!(err.to_string(), "DType mismatch: i64 vs i32");
    }
}
