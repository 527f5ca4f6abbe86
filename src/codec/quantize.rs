
//! Conversion between floating point samples and block-floating-point integers.
//! All samples of one block share the exponent of the largest magnitude,
//! and each sample is stored as an integer relative to that exponent.
//! Quantization reads the IEEE fields directly and is exact for every finite input,
//! including subnormal numbers.

use bit_field::BitField;
use super::sample::{Float, Integer, Unsigned};
use crate::math::floor_log_2;


/// The components of a finite sample, `(-1)^negative * mantissa * 2^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Components {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

/// Whether the biased exponent field is not reserved for infinity and NaN.
pub fn is_finite<F: Float>(value: F) -> bool {
    biased_exponent(value) != (1 << F::EXPONENT_BITS) - 1
}

fn biased_exponent<F: Float>(value: F) -> i32 {
    let mantissa_bits = F::MANTISSA_BITS as usize;
    value.to_raw_bits().get_bits(mantissa_bits .. mantissa_bits + F::EXPONENT_BITS as usize) as i32
}

fn components<F: Float>(value: F) -> Components {
    let bits = value.to_raw_bits();
    let mantissa_bits = F::MANTISSA_BITS as usize;
    let fraction = bits.get_bits(0 .. mantissa_bits);
    let negative = bits.get_bit(mantissa_bits + F::EXPONENT_BITS as usize);
    let field = biased_exponent(value);

    // the unbiased exponent of the lowest mantissa bit
    if field == 0 {
        Components { negative, mantissa: fraction, exponent: 1 - F::EXPONENT_BIAS - F::MANTISSA_BITS as i32 }
    }
    else {
        Components {
            negative, mantissa: fraction | (1 << mantissa_bits),
            exponent: field - F::EXPONENT_BIAS - F::MANTISSA_BITS as i32
        }
    }
}

/// The exponent `e` such that `|value| < 2^e`, as returned by `frexp`.
/// Subnormal numbers return the exponent of the smallest normal number,
/// and zero returns `-EXPONENT_BIAS`.
pub fn exponent<F: Float>(value: F) -> i32 {
    let components = components(value);

    if components.mantissa == 0 { -F::EXPONENT_BIAS }
    else if biased_exponent(value) == 0 { 1 - F::EXPONENT_BIAS }
    else { components.exponent + F::MANTISSA_BITS as i32 + 1 }
}

/// The common exponent of all samples in a block, `emax`.
/// Returns `-EXPONENT_BIAS` for a block without any non-zero sample.
pub fn block_exponent<F: Float>(block: &[F]) -> i32 {
    block.iter().map(|&value| exponent(value))
        .max().unwrap_or(-F::EXPONENT_BIAS)
}

/// Convert each sample to an integer with `BITS - 2` bits of magnitude,
/// `trunc(value * 2^(BITS - 2 - max_exponent))`.
/// Requires finite samples with magnitudes below `2^max_exponent`.
pub fn quantize_block<F: Float>(block: &[F], max_exponent: i32, integers: &mut [F::Int]) {
    debug_assert_eq!(block.len(), integers.len());
    let precision = <F::Int as Integer>::BITS as i32;

    for (&value, integer) in block.iter().zip(integers) {
        let components = components(value);
        let shift = components.exponent + precision - 2 - max_exponent;

        let magnitude =
            if shift >= 0 { components.mantissa << shift }
            else { components.mantissa >> (-shift).min(63) };

        debug_assert!(magnitude < 1 << (precision - 2), "quantized sample exceeds block exponent");

        let signed = magnitude as i64;
        *integer = F::Int::from_i64(if components.negative { -signed } else { signed });
    }
}

/// Convert integers back to samples, `integer * 2^(max_exponent - BITS + 2)`.
pub fn dequantize_block<F: Float>(integers: &[F::Int], max_exponent: i32, block: &mut [F]) {
    debug_assert_eq!(block.len(), integers.len());
    let exponent = max_exponent - <F::Int as Integer>::BITS as i32 + 2;

    for (&integer, value) in integers.iter().zip(block) {
        *value = F::scale_integer(integer, exponent);
    }
}

/// Whether quantizing and dequantizing with the given exponent reproduces every bit of every sample.
pub fn is_lossless<F: Float>(block: &[F], max_exponent: i32, integers: &mut [F::Int]) -> bool {
    quantize_block(block, max_exponent, integers);

    block.iter().zip(integers.iter()).all(|(&value, &integer)| {
        let exponent = max_exponent - <F::Int as Integer>::BITS as i32 + 2;
        F::scale_integer(integer, exponent).to_raw_bits() == value.to_raw_bits()
    })
}

/// Reinterpret the raw bits of each sample as an integer,
/// such that the integers are ordered like the samples.
/// Works for any bit pattern, including infinities, NaN and negative zero.
pub fn reinterpret_block<F: Float>(block: &[F], integers: &mut [F::Int]) {
    let magnitude_bits = sign_bit::<F>();

    for (&value, integer) in block.iter().zip(integers) {
        let mut bits = value.to_raw_bits();
        if bits.get_bit(magnitude_bits) { bits ^= (1 << magnitude_bits) - 1; }
        *integer = F::Int::from_unsigned_bits(Unsigned::from_u64(bits));
    }
}

/// Exact inverse of `reinterpret_block`.
pub fn uninterpret_block<F: Float>(integers: &[F::Int], block: &mut [F]) {
    let magnitude_bits = sign_bit::<F>();

    for (&integer, value) in integers.iter().zip(block) {
        let mut bits = integer.to_unsigned_bits().to_u64();
        if bits.get_bit(magnitude_bits) { bits ^= (1 << magnitude_bits) - 1; }
        *value = F::from_raw_bits(bits);
    }
}

#[inline]
fn sign_bit<F: Float>() -> usize {
    (F::EXPONENT_BITS + F::MANTISSA_BITS) as usize
}

/// Number of bits used to store the precision of a reversible block, `log2(BITS)`.
pub fn precision_header_bits<I: Integer>() -> u32 {
    floor_log_2(I::BITS)
}
