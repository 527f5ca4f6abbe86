
//! Compression and decompression of single blocks of 4, 16 or 64 samples.
//! A block is quantized to integers with a common exponent, decorrelated,
//! reordered by sequency, and finally coded one bit plane at a time.

pub mod sample;
pub mod quantize;
pub mod lift;
pub mod order;
pub mod planes;

// private module makes non-breaking changes easier
mod block;

use std::convert::TryFrom;
use smallvec::SmallVec;

use crate::stream::BitStream;
use crate::io::Word;
use crate::error::{Error, Result, UnitResult};
use crate::parameters::Parameters;

pub use self::sample::{Sample, Float, Integer, Unsigned};


/// The number of samples in the largest block, a block of rank three.
pub const MAX_BLOCK_VALUES: usize = 64;

/// The samples of one block. Does not allocate.
pub type BlockValues<T> = SmallVec<[T; MAX_BLOCK_VALUES]>;


/// The number of dimensions of an array, and therefore of its blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {

    /// Blocks of 4 samples.
    One = 1,

    /// Blocks of 4 by 4 samples.
    Two = 2,

    /// Blocks of 4 by 4 by 4 samples.
    Three = 3,
}

impl Rank {

    /// The number of dimensions, between one and three.
    #[inline]
    pub fn dimensions(self) -> u32 { self as u32 }

    /// The number of samples in one block, `4^dimensions`.
    #[inline]
    pub fn block_size(self) -> usize { 1 << (2 * self.dimensions()) }
}

impl TryFrom<u32> for Rank {
    type Error = Error;

    fn try_from(dimensions: u32) -> Result<Self> {
        match dimensions {
            1 => Ok(Rank::One),
            2 => Ok(Rank::Two),
            3 => Ok(Rank::Three),
            _ => Err(Error::invalid("rank must be one, two or three")),
        }
    }
}


fn validate_block<T: Sample>(length: usize, rank: Rank, parameters: &Parameters) -> UnitResult {
    if length != rank.block_size() {
        return Err(Error::invalid("sample count does not match the block rank"));
    }

    parameters.validate_for::<T>()
}

/// Compress one block of `4^rank` samples, x varying fastest.
/// Returns the number of bits written, which is at least `min_bits` and at most `max_bits`.
/// Parameters are validated before anything is written.
pub fn compress_block<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, samples: &[T], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    validate_block::<T>(samples.len(), rank, parameters)?;

    let bits = T::encode_block(stream, samples, rank, parameters)?;
    log::trace!("compressed block of rank {} into {} bits", rank.dimensions(), bits);
    Ok(bits)
}

/// Decompress one block that was compressed with the same rank and parameters.
pub fn decompress_block<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, rank: Rank, parameters: &Parameters
) -> Result<BlockValues<T>>
{
    let mut block = SmallVec::from_elem(T::default(), rank.block_size());
    decompress_block_into(stream, &mut block, rank, parameters)?;
    Ok(block)
}

/// Decompress one block into the specified slice of `4^rank` samples.
/// Returns the number of bits read, which equals the number of bits the compressor wrote.
pub fn decompress_block_into<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, block: &mut [T], rank: Rank, parameters: &Parameters
) -> Result<u32>
{
    validate_block::<T>(block.len(), rank, parameters)?;

    let bits = T::decode_block(stream, block, rank, parameters)?;
    log::trace!("decompressed block of rank {} from {} bits", rank.dimensions(), bits);
    Ok(bits)
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ranks(){
        assert_eq!(Rank::try_from(2_u32).unwrap(), Rank::Two);
        assert!(Rank::try_from(0_u32).is_err());
        assert!(Rank::try_from(4_u32).is_err());

        assert_eq!(Rank::One.block_size(), 4);
        assert_eq!(Rank::Two.block_size(), 16);
        assert_eq!(Rank::Three.block_size(), MAX_BLOCK_VALUES);
    }

    #[test]
    fn reject_wrong_block_length(){
        let mut words = [0_u32; 4];
        let mut stream = BitStream::open(&mut words);

        let result = compress_block(&mut stream, &[1.0_f32; 15], Rank::Two, &Parameters::default());
        assert!(matches!(result, Err(Error::Invalid(_))));
        assert_eq!(stream.write_position(), 0);
    }

    #[test]
    fn reject_parameters_before_writing(){
        let mut words = [0_u32; 4];
        let mut stream = BitStream::open(&mut words);

        let parameters = Parameters { min_bits: 10, max_bits: 5, .. Parameters::default() };
        assert!(compress_block(&mut stream, &[1.0_f32; 4], Rank::One, &parameters).is_err());
        assert_eq!(stream.write_position(), 0);
    }

    #[test]
    fn overrun_is_an_error(){
        let mut words = [0_u8; 2];
        let mut stream = BitStream::open(&mut words);

        let samples = [1.0_f64, -2.0, 3.0, -4.0];
        let result = compress_block(&mut stream, &samples, Rank::One, &Parameters::default());
        assert!(matches!(result, Err(Error::BufferOverrun { capacity_bits: 16, .. })));
    }

    #[test]
    fn block_round_trip(){
        let samples: Vec<f32> = (0 .. 16).map(|index| index as f32).collect();
        let mut words = [0_u16; 64];

        let bits = {
            let mut stream = BitStream::open(&mut words);
            let bits = compress_block(&mut stream, &samples, Rank::Two, &Parameters::default()).unwrap();
            stream.close().unwrap();
            bits
        };

        let mut stream = BitStream::open(&mut words);
        let decoded: BlockValues<f32> = decompress_block(&mut stream, Rank::Two, &Parameters::default()).unwrap();
        assert_eq!(stream.read_position(), bits as usize);
        assert_eq!(decoded.as_slice(), samples.as_slice());
    }
}
