use std::fmt;
use std::str::FromStr;

use crate::error::TensorError;

/// Element formats the pipeline can compute in.
///
/// Operands are always stored as `f32`; the narrower formats describe the
/// precision values are rounded to before they reach the multiply-accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit IEEE floating point. No conversion.
    #[default]
    F32,
    /// TensorFloat-32: f32 exponent, 10 explicit mantissa bits.
    Tf32,
    /// bfloat16: f32 exponent, 7 explicit mantissa bits.
    Bf16,
    /// IEEE 754 half precision (via the `half` crate).
    F16,
}

impl DType {
    /// Returns the storage size in bytes of a single element.
    ///
    /// TF32 occupies a full 32-bit word even though only 19 bits are significant.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F32 | DType::Tf32 => 4,
            DType::Bf16 | DType::F16 => 2,
        }
    }

    /// Number of explicit mantissa bits kept by this format.
    pub fn mantissa_bits(&self) -> u32 {
        match self {
            DType::F32 => 23,
            DType::Tf32 | DType::F16 => 10,
            DType::Bf16 => 7,
        }
    }

    /// Returns true if values must be rounded before use in this format.
    pub fn is_narrow(&self) -> bool {
        !matches!(self, DType::F32)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::Tf32 => write!(f, "tf32"),
            DType::Bf16 => write!(f, "bf16"),
            DType::F16 => write!(f, "f16"),
        }
    }
}

impl FromStr for DType {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float32" => Ok(DType::F32),
            "tf32" | "tfloat32" => Ok(DType::Tf32),
            "bf16" | "bfloat16" => Ok(DType::Bf16),
            "f16" | "half" | "float16" => Ok(DType::F16),
            other => Err(TensorError::UnsupportedDType(other.to_string())),
        }
    }
}
