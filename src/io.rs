
//! Storage words of a bit stream, and their little endian byte representation.
//! Uses the error handling for this crate.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;
use std::fmt::Debug;
use crate::error::{Error, Result, UnitResult};
use crate::math::RoundingMode;


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];


/// An unsigned integer that a bit stream is made of.
/// The word size is the granularity at which bits are flushed to the buffer.
/// Writer and reader of the same bits must use the same word type.
pub trait Word: Sized + Copy + Default + Debug + PartialEq + Send + Sync + 'static {

    /// Number of bits in one word, also known as `stream_word_bits`.
    const BITS: u32;

    /// Number of bytes in one word.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Keep the lowest `Self::BITS` bits of the value.
    fn from_bits(bits: u64) -> Self;

    /// Zero-extend to 64 bits.
    fn to_bits(self) -> u64;

    /// Write all words of that slice in little endian byte order.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult;

    /// Read as many words as fit into the specified slice.
    /// Returns `Error::Invalid` if the reader does not contain enough bytes.
    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> UnitResult;
}


macro_rules! implement_word_for_primitive {
    ($kind: ident) => {
        impl Word for $kind {
            const BITS: u32 = $kind::BITS;

            #[inline]
            fn from_bits(bits: u64) -> Self { bits as $kind }

            #[inline]
            fn to_bits(self) -> u64 { self as u64 }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult {
                write.write_as_little_endian(slice)?;
                Ok(())
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> UnitResult {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }
        }
    };
}

implement_word_for_primitive!(u8);
implement_word_for_primitive!(u16);
implement_word_for_primitive!(u32);
implement_word_for_primitive!(u64);


/// The number of words required to hold the specified number of bits.
#[inline]
pub fn word_count<W: Word>(bit_count: usize) -> usize {
    RoundingMode::Up.divide(bit_count, W::BITS as usize)
}

/// Serialize stream words to little endian bytes,
/// so that a stream can be stored by the container independent of the host endianness.
pub fn words_to_bytes<W: Word>(words: &[W]) -> Result<ByteVec> {
    let mut bytes = Vec::with_capacity(words.len() * W::BYTE_SIZE);
    W::write_slice(&mut bytes, words)?;
    Ok(bytes)
}

/// Deserialize little endian bytes into stream words.
/// Returns `Error::Invalid` if the byte count is not a multiple of the word size.
pub fn bytes_to_words<W: Word>(mut bytes: Bytes<'_>) -> Result<Vec<W>> {
    if bytes.len() % W::BYTE_SIZE != 0 {
        return Err(Error::invalid("byte count is not a multiple of the stream word size"));
    }

    let mut words = vec![W::default(); bytes.len() / W::BYTE_SIZE];
    W::read_slice(&mut bytes, &mut words)?;
    Ok(words)
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn word_bits(){
        assert_eq!(u8::BITS, 8);
        assert_eq!(<u16 as Word>::BITS, 16);
        assert_eq!(<u64 as Word>::BYTE_SIZE, 8);
        assert_eq!(<u8 as Word>::from_bits(0x1ff), 0xff);
        assert_eq!(<u32 as Word>::from_bits(0x1_0000_0002), 2);
    }

    #[test]
    fn word_counts(){
        assert_eq!(word_count::<u64>(0), 0);
        assert_eq!(word_count::<u64>(1), 1);
        assert_eq!(word_count::<u64>(64), 1);
        assert_eq!(word_count::<u64>(65), 2);
        assert_eq!(word_count::<u8>(17), 3);
        assert_eq!(word_count::<u64>(usize::MAX), usize::MAX / 64 + 1);
    }

    #[test]
    fn bytes_are_little_endian(){
        let bytes = words_to_bytes(&[0x0403_0201_u32, 0x0807_0605]).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let words: Vec<u16> = bytes_to_words(&bytes).unwrap();
        assert_eq!(words, vec![0x0201, 0x0403, 0x0605, 0x0807]);
    }

    #[test]
    fn reject_partial_words(){
        assert!(bytes_to_words::<u32>(&[1, 2, 3]).is_err());
        assert!(bytes_to_words::<u8>(&[1, 2, 3]).is_ok());
    }
}
