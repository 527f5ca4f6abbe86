
//! Numeric traits that make the codec generic over the sample width.
//! Each floating point type is paired with a signed integer of the same width,
//! which in turn is paired with an unsigned integer of the same width.

use std::fmt::Debug;
use half::f16;
use crate::stream::BitStream;
use crate::io::Word;
use crate::error::Result;
use crate::parameters::Parameters;
use super::Rank;


/// A value type that blocks can be compressed from.
/// Implemented for `f16`, `f32`, `f64`, `i32` and `i64`.
pub trait Sample: Copy + Default + Debug + PartialEq + Send + Sync + 'static {

    /// Number of bits of the integers that the samples are coded as.
    const PRECISION: u32;

    /// The largest number of bits a block header of this type can use.
    fn header_bits(reversible: bool) -> u32;

    /// An upper bound for the number of bits a single block may use.
    /// Each coefficient uses at most one bit per bit plane, plus one bit to find it.
    fn max_block_bits(rank: Rank, parameters: &Parameters) -> u32 {
        let values = rank.block_size() as u32;

        let planes =
            if parameters.reversible { Self::PRECISION }
            else { parameters.max_precision.min(Self::PRECISION) };

        let bits = Self::header_bits(parameters.reversible) + values * planes + values - 1;
        bits.min(parameters.max_bits).max(parameters.min_bits)
    }

    /// Write one block, including the padding up to `min_bits`. Returns the number of bits written.
    /// Does not validate the parameters, see `codec::compress_block` instead.
    fn encode_block<W: Word>(
        stream: &mut BitStream<'_, W>, block: &[Self], rank: Rank, parameters: &Parameters
    ) -> Result<u32>;

    /// Read one block, including the padding up to `min_bits`. Returns the number of bits read.
    /// Does not validate the parameters, see `codec::decompress_block` instead.
    fn decode_block<W: Word>(
        stream: &mut BitStream<'_, W>, block: &mut [Self], rank: Rank, parameters: &Parameters
    ) -> Result<u32>;
}


/// An unsigned integer holding one sign-mapped coefficient.
pub trait Unsigned: Copy + Default + Debug + PartialEq + Send + Sync + 'static {

    /// Number of bits, also the number of bit planes of a coefficient.
    const BITS: u32;

    /// The alternating bit pattern `0b1010...` used for negabinary conversion.
    const NEGABINARY_MASK: Self;

    /// Zero-extend to 64 bits.
    fn to_u64(self) -> u64;

    /// Keep the lowest `Self::BITS` bits of the value.
    fn from_u64(value: u64) -> Self;
}

/// A signed integer holding one quantized sample or one transform coefficient.
/// All arithmetic wraps, so that decoding garbage never panics.
pub trait Integer: Copy + Default + Debug + PartialEq + Send + Sync + 'static {

    /// The unsigned integer of the same width.
    type Unsigned: Unsigned;

    /// Number of bits of this integer, called `p` in the quantization formulas.
    const BITS: u32;

    /// Wrapping addition.
    fn add(self, other: Self) -> Self;

    /// Wrapping subtraction.
    fn sub(self, other: Self) -> Self;

    /// Arithmetic shift right by one bit, rounding towards negative infinity.
    fn halve(self) -> Self;

    /// Wrapping shift left by one bit.
    fn double(self) -> Self;

    /// Keep the lowest `Self::BITS` bits of the value.
    fn from_i64(value: i64) -> Self;

    /// Sign-extend to 64 bits.
    fn to_i64(self) -> i64;

    /// Reinterpret the two's complement bits as an unsigned integer.
    fn to_unsigned_bits(self) -> Self::Unsigned;

    /// Reinterpret the bits of an unsigned integer as two's complement.
    fn from_unsigned_bits(bits: Self::Unsigned) -> Self;

    /// Map two's complement to negabinary, such that small magnitudes only use low bits.
    fn to_negabinary(self) -> Self::Unsigned;

    /// Map negabinary back to two's complement. Exact inverse of `to_negabinary`.
    fn from_negabinary(value: Self::Unsigned) -> Self;
}


macro_rules! implement_integer_for_primitive {
    ($int: ident, $uint: ident, $mask: expr) => {
        impl Unsigned for $uint {
            const BITS: u32 = $uint::BITS;
            const NEGABINARY_MASK: Self = $mask;

            #[inline] fn to_u64(self) -> u64 { self as u64 }
            #[inline] fn from_u64(value: u64) -> Self { value as $uint }
        }

        impl Integer for $int {
            type Unsigned = $uint;
            const BITS: u32 = $int::BITS;

            #[inline] fn add(self, other: Self) -> Self { self.wrapping_add(other) }
            #[inline] fn sub(self, other: Self) -> Self { self.wrapping_sub(other) }
            #[inline] fn halve(self) -> Self { self >> 1 }
            #[inline] fn double(self) -> Self { self.wrapping_shl(1) }
            #[inline] fn from_i64(value: i64) -> Self { value as $int }
            #[inline] fn to_i64(self) -> i64 { self as i64 }
            #[inline] fn to_unsigned_bits(self) -> $uint { self as $uint }
            #[inline] fn from_unsigned_bits(bits: $uint) -> Self { bits as $int }

            #[inline]
            fn to_negabinary(self) -> $uint {
                (self as $uint).wrapping_add($mask) ^ $mask
            }

            #[inline]
            fn from_negabinary(value: $uint) -> Self {
                (value ^ $mask).wrapping_sub($mask) as $int
            }
        }
    };
}

implement_integer_for_primitive!(i16, u16, 0xaaaa);
implement_integer_for_primitive!(i32, u32, 0xaaaa_aaaa);
implement_integer_for_primitive!(i64, u64, 0xaaaa_aaaa_aaaa_aaaa);


/// An IEEE 754 binary floating point sample.
/// The codec only inspects the raw bits, so no floating point library functions are needed.
pub trait Float: Copy + Default + Debug + PartialEq + PartialOrd + Send + Sync + 'static {

    /// The signed integer of the same width, holding the quantized samples.
    type Int: Integer;

    /// Number of bits of the biased exponent field.
    const EXPONENT_BITS: u32;

    /// Number of bits of the fraction field, not including the implicit leading one.
    const MANTISSA_BITS: u32;

    /// The exponent bias, `2^(EXPONENT_BITS - 1) - 1`.
    const EXPONENT_BIAS: i32 = (1 << (Self::EXPONENT_BITS - 1)) - 1;

    /// The raw bits, zero-extended to 64 bits.
    fn to_raw_bits(self) -> u64;

    /// Construct from raw bits, using only the lowest bits.
    fn from_raw_bits(bits: u64) -> Self;

    /// Compute `value * 2^exponent`, rounding only once.
    fn scale_integer(value: Self::Int, exponent: i32) -> Self;
}


macro_rules! implement_float_for_primitive {
    ($float: ident, $int: ident, $bits: ident, $exponent_bits: expr, $mantissa_bits: expr) => {
        impl Float for $float {
            type Int = $int;
            const EXPONENT_BITS: u32 = $exponent_bits;
            const MANTISSA_BITS: u32 = $mantissa_bits;

            #[inline] fn to_raw_bits(self) -> u64 { self.to_bits() as u64 }
            #[inline] fn from_raw_bits(bits: u64) -> Self { $float::from_bits(bits as $bits) }

            fn scale_integer(value: $int, exponent: i32) -> Self {
                let max_exponent = Self::EXPONENT_BIAS;
                let min_exponent = 1 - Self::EXPONENT_BIAS;

                // only valid for normal powers of two
                let power_of_two = |exponent: i32| {
                    debug_assert!(exponent >= min_exponent && exponent <= max_exponent);
                    $float::from_bits(((exponent + Self::EXPONENT_BIAS) as $bits) << $mantissa_bits)
                };

                let mut result = value as $float;
                let mut remaining = exponent;

                while remaining > max_exponent {
                    result *= power_of_two(max_exponent);
                    remaining -= max_exponent;
                }

                // scale the integer down in exact steps first, so that the final step rounds only once
                while remaining < min_exponent {
                    let step = (remaining - min_exponent).max(min_exponent);
                    result *= power_of_two(step);
                    remaining -= step;
                }

                result * power_of_two(remaining)
            }
        }
    };
}

implement_float_for_primitive!(f32, i32, u32, 8, 23);
implement_float_for_primitive!(f64, i64, u64, 11, 52);

impl Float for f16 {
    type Int = i16;
    const EXPONENT_BITS: u32 = 5;
    const MANTISSA_BITS: u32 = 10;

    #[inline] fn to_raw_bits(self) -> u64 { self.to_bits() as u64 }
    #[inline] fn from_raw_bits(bits: u64) -> Self { f16::from_bits(bits as u16) }

    fn scale_integer(value: i16, exponent: i32) -> Self {
        // every 16 bit integer and every reachable scale is exact in 32 bit,
        // so converting the result is the only rounding step
        f16::from_f32(f32::scale_integer(i32::from(value), exponent))
    }
}
