//! Compressed sparse layout definitions

use std::fmt;

/// Compressed sparse storage layout
///
/// All four layouts store a compressed index array, a plain index array and
/// a values array. They differ in which axis is compressed and whether each
/// stored entry is a scalar or a dense block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressedLayout {
    /// Compressed Sparse Row
    ///
    /// Row pointers + column indices + values.
    /// Storage: O(2 * nnz + nrows + 1)
    Csr,

    /// Compressed Sparse Column
    ///
    /// Column pointers + row indices + values.
    /// Storage: O(2 * nnz + ncols + 1)
    Csc,

    /// Block Compressed Sparse Row
    ///
    /// Like CSR over block rows; every value is a dense block.
    Bsr,

    /// Block Compressed Sparse Column
    ///
    /// Like CSC over block columns; every value is a dense block.
    Bsc,
}

impl CompressedLayout {
    /// Every compressed layout
    pub const ALL: [CompressedLayout; 4] = [Self::Csr, Self::Csc, Self::Bsr, Self::Bsc];

    /// Returns true if rows are the compressed axis (CSR, BSR)
    #[inline]
    pub fn is_row_compressed(&self) -> bool {
        matches!(self, Self::Csr | Self::Bsr)
    }

    /// Returns true if values are dense blocks (BSR, BSC)
    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Bsr | Self::Bsc)
    }

    /// Returns the layout name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Csr => "CSR",
            Self::Csc => "CSC",
            Self::Bsr => "BSR",
            Self::Bsc => "BSC",
        }
    }

    /// Name of the compressed index array
    pub fn compressed_indices_name(&self) -> &'static str {
        if self.is_row_compressed() {
            "crow_indices"
        } else {
            "ccol_indices"
        }
    }

    /// Name of the plain index array
    pub fn plain_indices_name(&self) -> &'static str {
        if self.is_row_compressed() {
            "col_indices"
        } else {
            "row_indices"
        }
    }
}

impl fmt::Display for CompressedLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
