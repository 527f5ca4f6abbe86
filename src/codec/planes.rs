
//! Embedded coding of unsigned coefficients, one bit plane at a time,
//! from the most significant plane down.
//!
//! Within each plane, the bits of coefficients that were already found significant
//! are emitted verbatim. The remaining bits are coded with a group test,
//! followed by a unary run length up to the next one bit.
//! Any prefix of the output decodes to a valid approximation.

use super::sample::Unsigned;
use super::MAX_BLOCK_VALUES;
use crate::stream::BitStream;
use crate::io::Word;
use crate::error::Result;


/// Write the bit planes of the coefficients, stopping after `max_bits` bits
/// or after `max_precision` planes, whichever comes first.
/// Returns the number of bits written.
pub fn encode_planes<U: Unsigned, W: Word>(
    stream: &mut BitStream<'_, W>, max_bits: u32, max_precision: u32, coefficients: &[U]
) -> Result<u32>
{
    let size = coefficients.len();
    assert!(size <= MAX_BLOCK_VALUES, "one plane must fit into 64 bits");

    let min_plane = U::BITS.saturating_sub(max_precision);
    let mut bits = max_bits;
    let mut significant = 0_usize;
    let mut plane = U::BITS;

    while bits > 0 && plane > min_plane {
        plane -= 1;

        let mut plane_bits = coefficients.iter().enumerate()
            .fold(0_u64, |plane_bits, (index, coefficient)| {
                plane_bits | (((coefficient.to_u64() >> plane) & 1) << index)
            });

        let verbatim = (significant as u32).min(bits);
        bits -= verbatim;
        plane_bits = stream.write_bits(plane_bits, verbatim)?;

        // group test, then run length to the next one bit
        while significant < size && bits > 0 {
            bits -= 1;
            if !stream.write_bit(plane_bits != 0)? { break; }

            while significant < size - 1 && bits > 0 {
                bits -= 1;
                if stream.write_bit(plane_bits & 1 != 0)? { break; }

                plane_bits >>= 1;
                significant += 1;
            }

            plane_bits >>= 1;
            significant += 1;
        }
    }

    Ok(max_bits - bits)
}

/// Read bit planes written by `encode_planes` with the same bit budget and precision.
/// Bits missing from truncated planes are zero.
/// Returns the number of bits read.
pub fn decode_planes<U: Unsigned, W: Word>(
    stream: &mut BitStream<'_, W>, max_bits: u32, max_precision: u32, coefficients: &mut [U]
) -> Result<u32>
{
    let size = coefficients.len();
    assert!(size <= MAX_BLOCK_VALUES, "one plane must fit into 64 bits");

    for coefficient in coefficients.iter_mut() {
        *coefficient = U::default();
    }

    let min_plane = U::BITS.saturating_sub(max_precision);
    let mut bits = max_bits;
    let mut significant = 0_usize;
    let mut plane = U::BITS;

    while bits > 0 && plane > min_plane {
        plane -= 1;

        let verbatim = (significant as u32).min(bits);
        bits -= verbatim;
        let mut plane_bits = stream.read_bits(verbatim)?;

        while significant < size && bits > 0 {
            bits -= 1;
            if !stream.read_bit()? { break; }

            // the one bit after the last value is implied
            let mut terminated = true;
            while significant < size - 1 {
                if bits == 0 { terminated = false; break; }

                bits -= 1;
                if stream.read_bit()? { break; }
                significant += 1;
            }

            // the run was cut off before its one bit
            if !terminated { break; }

            plane_bits += 1 << significant;
            significant += 1;
        }

        let mut index = 0;
        while plane_bits != 0 {
            if plane_bits & 1 != 0 {
                let coefficient = &mut coefficients[index];
                *coefficient = U::from_u64(coefficient.to_u64() | (1 << plane));
            }

            plane_bits >>= 1;
            index += 1;
        }
    }

    Ok(max_bits - bits)
}


#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn encode(coefficients: &[u32], max_bits: u32, max_precision: u32) -> (Vec<u64>, u32) {
        let mut words = vec![0_u64; 80];
        let mut stream = BitStream::open(&mut words);
        let bits = encode_planes(&mut stream, max_bits, max_precision, coefficients).unwrap();
        assert_eq!(stream.write_position(), bits as usize);
        stream.flush().unwrap();
        (words, bits)
    }

    fn decode(words: &mut [u64], size: usize, max_bits: u32, max_precision: u32) -> (Vec<u32>, u32) {
        let mut stream = BitStream::open(words);
        let mut coefficients = vec![0_u32; size];
        let bits = decode_planes(&mut stream, max_bits, max_precision, &mut coefficients).unwrap();
        assert_eq!(stream.read_position(), bits as usize);
        (coefficients, bits)
    }

    #[test]
    fn all_zero_planes(){
        // one failed group test per plane
        let (_, bits) = encode(&[0; 16], 4096, 32);
        assert_eq!(bits, 32);

        let (_, bits) = encode(&[0; 16], 4096, 5);
        assert_eq!(bits, 5);

        let (_, bits) = encode(&[0; 16], 3, 32);
        assert_eq!(bits, 3);
    }

    #[test]
    fn single_top_bit(){
        let mut coefficients = [0_u32; 4];
        coefficients[0] = 1 << 31;

        // group test, run length bit, group test for the remaining values
        let (mut words, bits) = encode(&coefficients, 4096, 1);
        assert_eq!(bits, 3);
        assert_eq!(words[0], 0b011);

        let (decoded, read) = decode(&mut words, 4, 4096, 1);
        assert_eq!(read, 3);
        assert_eq!(decoded, coefficients);
    }

    #[test]
    fn lossless_with_full_budget(){
        let mut random = StdRng::seed_from_u64(3);

        for &size in &[4, 16, 64] {
            let coefficients: Vec<u32> = (0 .. size).map(|_| random.random()).collect();
            let (mut words, bits) = encode(&coefficients, 4096, 32);
            let (decoded, read) = decode(&mut words, size, 4096, 32);
            assert_eq!(read, bits);
            assert_eq!(decoded, coefficients);
        }
    }

    #[test]
    fn truncated_planes_are_prefixes(){
        let mut random = StdRng::seed_from_u64(5);
        let coefficients: Vec<u32> = (0 .. 16).map(|_| random.random::<u32>() >> random.random_range(0 .. 32)).collect();
        let (mut words, full_bits) = encode(&coefficients, 4096, 32);

        let mut previous_error = u64::MAX;
        for max_bits in 1 ..= full_bits {
            let (decoded, read) = decode(&mut words, 16, max_bits, 32);
            assert!(read <= max_bits);

            let error: u64 = coefficients.iter().zip(&decoded).map(|(&original, &decoded)| {
                // the decoded value only lacks lower bits of the original
                assert_eq!(original & decoded, decoded);
                u64::from(original - decoded)
            }).sum();

            assert!(error <= previous_error, "error grew to {} with {} bits", error, max_bits);
            previous_error = error;
        }

        assert_eq!(previous_error, 0);
    }

    #[test]
    fn cut_off_run_decodes_as_zero(){
        let coefficients = [0, 0, 0, 1_u32 << 31];

        // group test and three run length bits, the last one bit is implied
        let (mut words, full_bits) = encode(&coefficients, 4096, 1);
        assert_eq!(full_bits, 4);

        for max_bits in 1 .. full_bits {
            let (decoded, read) = decode(&mut words, 4, max_bits, 1);
            assert_eq!(read, max_bits);
            assert_eq!(decoded, [0; 4], "with {} bits", max_bits);
        }

        let (decoded, read) = decode(&mut words, 4, full_bits, 1);
        assert_eq!(read, full_bits);
        assert_eq!(decoded, coefficients);

        // with all planes, the budget may also run out in a later plane
        let (mut words, full_bits) = encode(&coefficients, 4096, 32);
        for max_bits in 1 ..= full_bits {
            let (decoded, _) = decode(&mut words, 4, max_bits, 32);
            let expected = if max_bits < 4 { [0; 4] } else { coefficients };
            assert_eq!(decoded, expected, "with {} bits", max_bits);
        }
    }

    #[test]
    fn budget_is_never_exceeded(){
        let mut random = StdRng::seed_from_u64(11);

        for max_bits in 1 .. 200 {
            let coefficients: Vec<u32> = (0 .. 64).map(|_| random.random()).collect();
            let (mut words, bits) = encode(&coefficients, max_bits, 32);
            assert!(bits <= max_bits);

            let (_, read) = decode(&mut words, 64, max_bits, 32);
            assert_eq!(read, bits);
        }
    }

    #[test]
    fn wide_coefficients(){
        let coefficients = [u64::MAX, 0, 1, 1 << 63];
        let mut words = vec![0_u64; 8];

        let bits = {
            let mut stream = BitStream::open(&mut words);
            let bits = encode_planes(&mut stream, 4096, 64, &coefficients).unwrap();
            stream.flush().unwrap();
            bits
        };

        let mut stream = BitStream::open(&mut words);
        let mut decoded = [0_u64; 4];
        assert_eq!(decode_planes(&mut stream, 4096, 64, &mut decoded).unwrap(), bits);
        assert_eq!(decoded, coefficients);
    }
}
