use half::{bf16, f16};
use sg_tensor::DType;

/// Mantissa bits TF32 drops from an `f32` (23 explicit bits down to 10).
pub const TF32_DROPPED_BITS: u32 = 13;

/// Round `x` to a format that keeps the top `23 - dropped_bits` mantissa bits,
/// using round-half-to-nearest-even.
///
/// With `lsb` the lowest kept bit, `round` the first dropped bit and `sticky`
/// any lower dropped bit: the kept mantissa is incremented by one ulp when
/// `round && (sticky || lsb)`, otherwise truncated. The dropped bits are
/// cleared either way. A carry out of the mantissa bumps the exponent, which
/// is the correctly rounded result (up to infinity at the top of the range).
///
/// NaN and infinity pass through unchanged.
pub fn round_mantissa(x: f32, dropped_bits: u32) -> f32 {
    assert!(dropped_bits < 23, "cannot drop {dropped_bits} mantissa bits");
    if !x.is_finite() || dropped_bits == 0 {
        return x;
    }
    let bits = x.to_bits();
    let lsb = 1u32 << dropped_bits;
    let round = lsb >> 1;
    let sticky_mask = round - 1;

    let round_set = bits & round != 0;
    let sticky_set = bits & sticky_mask != 0;
    let lsb_set = bits & lsb != 0;

    let mut rounded = bits;
    if round_set && (sticky_set || lsb_set) {
        rounded += lsb;
    }
    f32::from_bits(rounded & !(lsb - 1))
}

/// Round an `f32` to TF32 precision.
pub fn to_tf32(x: f32) -> f32 {
    round_mantissa(x, TF32_DROPPED_BITS)
}

/// Conversion applied to register fragments before the multiply-accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Identity: operands are used at full `f32` precision.
    #[default]
    None,
    Tf32,
    Bf16,
    F16,
}

impl Rounding {
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            Rounding::None => x,
            Rounding::Tf32 => to_tf32(x),
            Rounding::Bf16 => bf16::from_f32(x).to_f32(),
            Rounding::F16 => f16::from_f32(x).to_f32(),
        }
    }

    /// Round every element of `values` in place.
    pub fn apply_slice(&self, values: &mut [f32]) {
        if matches!(self, Rounding::None) {
            return;
        }
        for v in values.iter_mut() {
            *v = self.apply(*v);
        }
    }
}

impl From<DType> for Rounding {
    fn from(dtype: DType) -> Self {
        match dtype {
            DType::F32 => Rounding::None,
            DType::Tf32 => Rounding::Tf32,
            DType::Bf16 => Rounding::Bf16,
            DType::F16 => Rounding::F16,
        }
    }
}
