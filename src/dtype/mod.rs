//! Data type system for tensor buffers
//!
//! This module provides the `DType` enum representing all supported element
//! types, the `Element` trait linking Rust types to it, and the scalar
//! encoding used by fill operations.

mod element;

pub use element::Element;

use std::fmt;

// ============================================================================
// DType Enum
// ============================================================================

/// Data types supported by tensor buffers
///
/// This enum represents the element type of a buffer at runtime. A compressed
/// sparse tensor declares one dtype for its values buffer and carries its
/// index buffers in an integer dtype.
///
/// # Discriminant Values (Serialization Stability)
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Signed ints: 10-19 (I64=10, I32=11, I16=12, I8=13)
/// - Unsigned ints: 20-29 (U64=20, U32=21, U16=22, U8=23)
/// - Bool: 30
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    // Floating point types (0-9)
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,

    // Integer types
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
    /// 16-bit signed integer
    I16 = 12,
    /// 8-bit signed integer
    I8 = 13,

    // Unsigned integer types
    /// 64-bit unsigned integer
    U64 = 20,
    /// 32-bit unsigned integer
    U32 = 21,
    /// 16-bit unsigned integer
    U16 = 22,
    /// 8-bit unsigned integer
    U8 = 23,

    /// Boolean type
    Bool = 30,
}

impl DType {
    /// Every dtype, in discriminant order
    pub const ALL: [DType; 13] = [
        Self::F64,
        Self::F32,
        Self::F16,
        Self::BF16,
        Self::I64,
        Self::I32,
        Self::I16,
        Self::I8,
        Self::U64,
        Self::U32,
        Self::U16,
        Self::U8,
        Self::Bool,
    ];

    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 | Self::U64 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::BF16 | Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 | Self::Bool => 1,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true if this is a signed integer type
    #[inline]
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I64 | Self::I32 | Self::I16 | Self::I8)
    }

    /// Returns true if this is an unsigned integer type
    #[inline]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U64 | Self::U32 | Self::U16 | Self::U8)
    }

    /// Returns true if this dtype may hold compressed-format indices
    #[inline]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::I64 | Self::I32)
    }

    /// Get the default dtype for integer operations
    #[inline]
    pub const fn default_int() -> Self {
        Self::I64
    }

    /// Short name for display (e.g., "f32", "i64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::I64 => "i64",
            Self::I32 => "i32",
            Self::I16 => "i16",
            Self::I8 => "i8",
            Self::U64 => "u64",
            Self::U32 => "u32",
            Self::U16 => "u16",
            Self::U8 => "u8",
            Self::Bool => "bool",
        }
    }

    /// Encode `value` as one element of this dtype, in native byte order
    ///
    /// Integer targets saturate (`as` semantics). Used by fill operations,
    /// which write the encoded element into every addressed slot.
    pub fn encode_scalar(self, value: f64) -> Vec<u8> {
        #[inline]
        fn bytes_of<T: Element>(value: f64) -> Vec<u8> {
            bytemuck::bytes_of(&T::from_f64(value)).to_vec()
        }

        match self {
            Self::F64 => bytes_of::<f64>(value),
            Self::F32 => bytes_of::<f32>(value),
            Self::F16 | Self::BF16 => {
                #[cfg(feature = "f16")]
                {
                    if self == Self::F16 {
                        bytes_of::<half::f16>(value)
                    } else {
                        bytes_of::<half::bf16>(value)
                    }
                }
                #[cfg(not(feature = "f16"))]
                {
                    half_from_f32(value as f32, self).to_ne_bytes().to_vec()
                }
            }
            Self::I64 => bytes_of::<i64>(value),
            Self::I32 => bytes_of::<i32>(value),
            Self::I16 => bytes_of::<i16>(value),
            Self::I8 => bytes_of::<i8>(value),
            Self::U64 => bytes_of::<u64>(value),
            Self::U32 => bytes_of::<u32>(value),
            Self::U16 => bytes_of::<u16>(value),
            Self::U8 => bytes_of::<u8>(value),
            Self::Bool => vec![u8::from(value != 0.0)],
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Convert f32 to half-precision bit representation
///
/// Handles the common cases only. For full IEEE 754 compliance enable the
/// `f16` feature, which routes through the `half` crate.
#[cfg(not(feature = "f16"))]
fn half_from_f32(value: f32, dtype: DType) -> u16 {
    let bits = value.to_bits();
    let sign = (bits >> 31) & 1;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let frac = bits & 0x7FFFFF;

    if dtype == DType::BF16 {
        return ((bits >> 16) & 0xFFFF) as u16;
    }

    if exp == 0 {
        (sign << 15) as u16
    } else if exp == 0xFF {
        ((sign << 15) | 0x7C00 | if frac != 0 { 0x200 } else { 0 }) as u16
    } else {
        let new_exp = exp - 127 + 15;
        if new_exp <= 0 {
            (sign << 15) as u16
        } else if new_exp >= 31 {
            ((sign << 15) | 0x7C00) as u16
        } else {
            ((sign << 15) | ((new_exp as u32) << 10) | (frac >> 13)) as u16
        }
    }
}
