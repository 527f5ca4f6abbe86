
//! The layout of a single compressed block.
//!
//! A lossy floating point block starts with one bit that is set for non-zero blocks,
//! followed by the biased common exponent. The transform coefficients follow as bit planes.
//! Integer blocks have no header.
//! Reversible float blocks use a second bit to tell whether the common exponent is lossless,
//! or whether the raw bits of the samples follow instead.
//! Reversible blocks store the number of non-zero bit planes before the coefficients.
//! Blocks that use fewer than `min_bits` are padded with zeroes.

use smallvec::SmallVec;
use half::f16;

use super::sample::{Float, Integer, Sample, Unsigned};
use super::quantize::*;
use super::lift::{forward_transform, inverse_transform, Lifting};
use super::order::{forward_order, inverse_order};
use super::planes::{encode_planes, decode_planes};
use super::{Rank, MAX_BLOCK_VALUES};
use crate::stream::BitStream;
use crate::io::Word;
use crate::error::{Error, Result};
use crate::parameters::Parameters;


type Scratch<T> = SmallVec<[T; MAX_BLOCK_VALUES]>;

fn scratch<T: Copy + Default>(size: usize) -> Scratch<T> {
    SmallVec::from_elem(T::default(), size)
}


fn pad_to_min_bits<W: Word>(stream: &mut BitStream<'_, W>, bits: u32, min_bits: u32) -> Result<u32> {
    if bits < min_bits {
        stream.pad((min_bits - bits) as usize)?;
        Ok(min_bits)
    }
    else { Ok(bits) }
}

fn skip_to_min_bits<W: Word>(stream: &mut BitStream<'_, W>, bits: u32, min_bits: u32) -> Result<u32> {
    if bits < min_bits {
        stream.skip((min_bits - bits) as usize)?;
        Ok(min_bits)
    }
    else { Ok(bits) }
}


fn encode_coefficients<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, coefficients: &[I], rank: Rank, max_bits: u32, max_precision: u32
) -> Result<u32>
{
    let mut unsigned: Scratch<I::Unsigned> = scratch(coefficients.len());
    forward_order(coefficients, &mut unsigned, rank);
    encode_planes(stream, max_bits, max_precision, &unsigned)
}

fn decode_coefficients<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, coefficients: &mut [I], rank: Rank, max_bits: u32, max_precision: u32
) -> Result<u32>
{
    let mut unsigned: Scratch<I::Unsigned> = scratch(coefficients.len());
    let bits = decode_planes(stream, max_bits, max_precision, &mut unsigned)?;
    inverse_order(&unsigned, coefficients, rank);
    Ok(bits)
}


/// Transform the integers in place and code all their non-zero bit planes.
fn encode_reversible_integers<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, integers: &mut [I], rank: Rank, max_bits: u32
) -> Result<u32>
{
    forward_transform(integers, rank, Lifting::Reversible);

    let mut unsigned: Scratch<I::Unsigned> = scratch(integers.len());
    forward_order(integers, &mut unsigned, rank);

    let all_bits = unsigned.iter().fold(0_u64, |all_bits, value| all_bits | value.to_u64());
    let precision = (I::BITS - all_bits.trailing_zeros().min(I::BITS)).max(1);

    let header_bits = precision_header_bits::<I>();
    stream.write_bits(u64::from(precision - 1), header_bits)?;

    let bits = encode_planes(stream, max_bits.saturating_sub(header_bits), precision, &unsigned)?;
    Ok(header_bits + bits)
}

fn decode_reversible_integers<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, integers: &mut [I], rank: Rank, max_bits: u32
) -> Result<u32>
{
    let header_bits = precision_header_bits::<I>();
    let precision = stream.read_bits(header_bits)? as u32 + 1;

    let bits = decode_coefficients(stream, integers, rank, max_bits.saturating_sub(header_bits), precision)?;
    inverse_transform(integers, rank, Lifting::Reversible);
    Ok(header_bits + bits)
}


fn encode_float_block<F: Float, W: Word>(
    stream: &mut BitStream<'_, W>, block: &[F], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    let mut integers: Scratch<F::Int> = scratch(block.len());
    let finite = block.iter().all(|&value| is_finite(value));

    if parameters.reversible {
        let max_exponent = block_exponent(block);

        return if finite && is_lossless(block, max_exponent, &mut integers) {
            // only positive zeroes
            if integers.iter().all(|&integer| integer == F::Int::default()) {
                stream.write_bit(false)?;
                return Ok(1);
            }

            // non-zero, lossless
            stream.write_bits(0b11, 2)?;
            stream.write_bits((max_exponent + F::EXPONENT_BIAS) as u64, F::EXPONENT_BITS)?;

            let header_bits = 2 + F::EXPONENT_BITS;
            let max_bits = parameters.max_bits.saturating_sub(header_bits);
            Ok(header_bits + encode_reversible_integers(stream, &mut integers, rank, max_bits)?)
        }
        else {
            // code the raw bits, which also covers negative zero, infinity and nan
            stream.write_bits(0b01, 2)?;
            reinterpret_block(block, &mut integers);

            let max_bits = parameters.max_bits.saturating_sub(2);
            Ok(2 + encode_reversible_integers(stream, &mut integers, rank, max_bits)?)
        };
    }

    if !finite {
        return Err(Error::unsupported("infinity and nan samples require reversible mode"));
    }

    let max_exponent = block_exponent(block);
    let precision = parameters.precision(max_exponent, rank);
    let biased_exponent = if precision > 0 { max_exponent + F::EXPONENT_BIAS } else { 0 };

    if biased_exponent == 0 {
        stream.write_bit(false)?;
        return Ok(1);
    }

    let header_bits = 1 + F::EXPONENT_BITS;
    stream.write_bits(2 * biased_exponent as u64 + 1, header_bits)?;

    quantize_block(block, max_exponent, &mut integers);
    forward_transform(&mut integers, rank, Lifting::Decorrelating);

    let max_bits = parameters.max_bits.saturating_sub(header_bits);
    Ok(header_bits + encode_coefficients(stream, &integers, rank, max_bits, precision)?)
}

fn decode_float_block<F: Float, W: Word>(
    stream: &mut BitStream<'_, W>, block: &mut [F], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    let mut integers: Scratch<F::Int> = scratch(block.len());

    if parameters.reversible {
        if !stream.read_bit()? {
            for value in block.iter_mut() { *value = F::default(); }
            return Ok(1);
        }

        return if stream.read_bit()? {
            let max_exponent = stream.read_bits(F::EXPONENT_BITS)? as i32 - F::EXPONENT_BIAS;

            let header_bits = 2 + F::EXPONENT_BITS;
            let max_bits = parameters.max_bits.saturating_sub(header_bits);
            let bits = decode_reversible_integers(stream, &mut integers, rank, max_bits)?;

            dequantize_block(&integers, max_exponent, block);
            Ok(header_bits + bits)
        }
        else {
            let max_bits = parameters.max_bits.saturating_sub(2);
            let bits = decode_reversible_integers(stream, &mut integers, rank, max_bits)?;

            uninterpret_block(&integers, block);
            Ok(2 + bits)
        };
    }

    if !stream.read_bit()? {
        for value in block.iter_mut() { *value = F::default(); }
        return Ok(1);
    }

    let max_exponent = stream.read_bits(F::EXPONENT_BITS)? as i32 - F::EXPONENT_BIAS;
    let precision = parameters.precision(max_exponent, rank);

    let header_bits = 1 + F::EXPONENT_BITS;
    let max_bits = parameters.max_bits.saturating_sub(header_bits);
    let bits = decode_coefficients(stream, &mut integers, rank, max_bits, precision)?;

    inverse_transform(&mut integers, rank, Lifting::Decorrelating);
    dequantize_block(&integers, max_exponent, block);
    Ok(header_bits + bits)
}

fn float_header_bits<F: Float>(reversible: bool) -> u32 {
    if reversible { 2 + F::EXPONENT_BITS + precision_header_bits::<F::Int>() }
    else { 1 + F::EXPONENT_BITS }
}


fn encode_integer_block<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, block: &[I], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    let mut integers: Scratch<I> = SmallVec::from_slice(block);

    if parameters.reversible {
        return encode_reversible_integers(stream, &mut integers, rank, parameters.max_bits);
    }

    // the lossy transform needs two bits of headroom
    let limit = 1_i64 << (I::BITS - 2);
    if block.iter().any(|value| value.to_i64() < -limit || value.to_i64() >= limit) {
        return Err(Error::unsupported("integer samples exceed the range of lossy mode"));
    }

    forward_transform(&mut integers, rank, Lifting::Decorrelating);
    encode_coefficients(stream, &integers, rank, parameters.max_bits, parameters.max_precision)
}

fn decode_integer_block<I: Integer, W: Word>(
    stream: &mut BitStream<'_, W>, block: &mut [I], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    if parameters.reversible {
        return decode_reversible_integers(stream, block, rank, parameters.max_bits);
    }

    let bits = decode_coefficients(stream, block, rank, parameters.max_bits, parameters.max_precision)?;
    inverse_transform(block, rank, Lifting::Decorrelating);
    Ok(bits)
}

fn integer_header_bits<I: Integer>(reversible: bool) -> u32 {
    if reversible { precision_header_bits::<I>() } else { 0 }
}


macro_rules! implement_sample {
    ($kind: ty, $integer: ty, $header_bits: ident, $encode: ident, $decode: ident) => {
        impl Sample for $kind {
            const PRECISION: u32 = <$integer as Integer>::BITS;

            fn header_bits(reversible: bool) -> u32 {
                $header_bits::<$kind>(reversible)
            }

            fn encode_block<W: Word>(
                stream: &mut BitStream<'_, W>, block: &[Self], rank: Rank, parameters: &Parameters
            ) -> Result<u32>
            {
                debug_assert_eq!(block.len(), rank.block_size());
                let bits = $encode(stream, block, rank, parameters)?;
                pad_to_min_bits(stream, bits, parameters.min_bits)
            }

            fn decode_block<W: Word>(
                stream: &mut BitStream<'_, W>, block: &mut [Self], rank: Rank, parameters: &Parameters
            ) -> Result<u32>
            {
                debug_assert_eq!(block.len(), rank.block_size());
                let bits = $decode(stream, block, rank, parameters)?;
                skip_to_min_bits(stream, bits, parameters.min_bits)
            }
        }
    };
}

implement_sample!(f16, i16, float_header_bits, encode_float_block, decode_float_block);
implement_sample!(f32, i32, float_header_bits, encode_float_block, decode_float_block);
implement_sample!(f64, i64, float_header_bits, encode_float_block, decode_float_block);
implement_sample!(i32, i32, integer_header_bits, encode_integer_block, decode_integer_block);
implement_sample!(i64, i64, integer_header_bits, encode_integer_block, decode_integer_block);
