
//! Bit-addressable reading and writing over a caller-owned buffer of words.
//! Bits are stored least significant bit first within each word.
//! The stream never allocates and never grows its buffer:
//! moving any cursor past the capacity is reported as `Error::BufferOverrun`
//! and leaves the stream unchanged.

use crate::error::{Error, Result, UnitResult};
use crate::io::Word;


/// Mask for the lowest `count` bits, where `count <= 64`.
#[inline]
fn low_bits(count: u32) -> u64 {
    if count >= 64 { u64::MAX } else { (1_u64 << count) - 1 }
}

/// Shift right, producing zero where `count >= 64`.
#[inline]
fn shift_right(value: u64, count: u32) -> u64 {
    if count >= 64 { 0 } else { value >> count }
}


/// Cursor state of one direction of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cursor {

    /// Index of the next word to be loaded from or stored into the buffer.
    word_index: usize,

    /// Bits that have been loaded but not consumed yet (reading),
    /// or bits that have been appended but not stored yet (writing).
    /// Only the lowest `bit_count` bits are used.
    buffer: u64,

    /// Number of valid bits in `buffer`, always less than the word size while writing.
    bit_count: u32,
}


/// Reads and writes individual bits from and to a word buffer.
/// Read and write cursors are independent.
/// One stream serves one pass at a time: it is not shared across threads.
#[derive(Debug)]
pub struct BitStream<'b, W: Word> {
    words: &'b mut [W],
    read: Cursor,
    write: Cursor,
}


impl<'b, W: Word> BitStream<'b, W> {

    /// Open a stream over the caller-owned buffer.
    /// Both cursors start at bit offset zero.
    pub fn open(words: &'b mut [W]) -> Self {
        BitStream { words, read: Cursor::default(), write: Cursor::default() }
    }

    /// Flush all pending bits and release the buffer.
    /// Returns the number of bytes that have been written.
    pub fn close(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.size_bytes())
    }

    /// The number of bits in each word, also known as `stream_word_bits`.
    #[inline]
    pub fn word_bits(&self) -> u32 { W::BITS }

    /// The buffer, including bits that were not yet flushed.
    pub fn words(&self) -> &[W] { self.words }

    /// The number of bits the buffer can hold.
    #[inline]
    pub fn capacity_bits(&self) -> usize { self.words.len() * W::BITS as usize }

    /// The number of bytes the buffer can hold.
    #[inline]
    pub fn capacity_bytes(&self) -> usize { self.words.len() * W::BYTE_SIZE }

    /// The number of bytes that have been stored in the buffer.
    /// Bits that were not flushed yet are not included.
    #[inline]
    pub fn size_bytes(&self) -> usize { self.write.word_index * W::BYTE_SIZE }

    /// Bit offset of the next bit to be read.
    #[inline]
    pub fn read_position(&self) -> usize {
        self.read.word_index * W::BITS as usize - self.read.bit_count as usize
    }

    /// Bit offset of the next bit to be written.
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write.word_index * W::BITS as usize + self.write.bit_count as usize
    }

    /// Move both cursors to the start of the buffer. Pending written bits are discarded.
    pub fn rewind(&mut self) {
        self.read = Cursor::default();
        self.write = Cursor::default();
    }

    #[inline]
    fn check_capacity(&self, end_bit: usize) -> UnitResult {
        let capacity = self.capacity_bits();
        if end_bit > capacity { Err(Error::overrun(end_bit, capacity)) }
        else { Ok(()) }
    }


    // ---- writing ----

    /// Append a single bit. Returns the bit that was written.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<bool> {
        self.check_capacity(self.write_position() + 1)?;

        self.write.buffer |= (bit as u64) << self.write.bit_count;
        self.write.bit_count += 1;

        if self.write.bit_count == W::BITS {
            self.store_word();
        }

        Ok(bit)
    }

    /// Append the lowest `count <= 64` bits of the value, least significant bit first.
    /// Returns the remaining bits, `value >> count`, that were not written.
    pub fn write_bits(&mut self, value: u64, count: u32) -> Result<u64> {
        debug_assert!(count <= 64, "at most 64 bits can be written at once");
        self.check_capacity(self.write_position() + count as usize)?;

        let mut remaining_value = value;
        let mut remaining_count = count;

        while remaining_count > 0 {
            let free_bits = W::BITS - self.write.bit_count;
            let chunk_bits = free_bits.min(remaining_count);

            self.write.buffer |= (remaining_value & low_bits(chunk_bits)) << self.write.bit_count;
            self.write.bit_count += chunk_bits;

            remaining_value = shift_right(remaining_value, chunk_bits);
            remaining_count -= chunk_bits;

            if self.write.bit_count == W::BITS {
                self.store_word();
            }
        }

        Ok(shift_right(value, count))
    }

    /// Append `count` zero bits.
    pub fn pad(&mut self, count: usize) -> UnitResult {
        self.check_capacity(self.write_position() + count)?;

        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(64);
            self.write_bits(0, chunk as u32)?;
            remaining -= chunk;
        }

        Ok(())
    }

    /// Store pending bits, padding with zeroes up to the next word boundary.
    /// Returns the number of padding bits.
    pub fn flush(&mut self) -> Result<u32> {
        if self.write.bit_count == 0 { return Ok(0) }

        let padding = W::BITS - self.write.bit_count;
        self.pad(padding as usize)?;
        Ok(padding)
    }

    /// Position the write cursor at the specified bit offset.
    /// Bits already stored before the offset within the same word are kept.
    /// Pending bits that were not flushed yet are discarded.
    pub fn seek_write(&mut self, bit_offset: usize) -> UnitResult {
        self.check_capacity(bit_offset)?;

        let word_bits = W::BITS as usize;
        let word_index = bit_offset / word_bits;
        let bit_count = (bit_offset % word_bits) as u32;

        let buffer = if bit_count > 0 {
            self.words[word_index].to_bits() & low_bits(bit_count)
        } else { 0 };

        self.write = Cursor { word_index, buffer, bit_count };
        Ok(())
    }

    #[inline]
    fn store_word(&mut self) {
        debug_assert!(self.write.word_index < self.words.len(), "capacity check bug");

        self.words[self.write.word_index] = W::from_bits(self.write.buffer);
        self.write.word_index += 1;
        self.write.buffer = 0;
        self.write.bit_count = 0;
    }


    // ---- reading ----

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.check_capacity(self.read_position() + 1)?;

        if self.read.bit_count == 0 {
            self.load_word();
        }

        let bit = self.read.buffer & 1 != 0;
        self.read.buffer >>= 1;
        self.read.bit_count -= 1;
        Ok(bit)
    }

    /// Read `count <= 64` bits. The first bit read is the least significant bit of the result.
    pub fn read_bits(&mut self, count: u32) -> Result<u64> {
        debug_assert!(count <= 64, "at most 64 bits can be read at once");
        self.check_capacity(self.read_position() + count as usize)?;

        let mut value = 0_u64;
        let mut filled = 0_u32;

        while filled < count {
            if self.read.bit_count == 0 {
                self.load_word();
            }

            let chunk_bits = (count - filled).min(self.read.bit_count);
            value |= (self.read.buffer & low_bits(chunk_bits)) << filled;

            self.read.buffer = shift_right(self.read.buffer, chunk_bits);
            self.read.bit_count -= chunk_bits;
            filled += chunk_bits;
        }

        Ok(value)
    }

    /// Skip over the next `count` bits without reading them.
    pub fn skip(&mut self, count: usize) -> UnitResult {
        self.seek_read(self.read_position() + count)
    }

    /// Skip to the next word boundary, if the read cursor is not already on one.
    pub fn align(&mut self) {
        self.read.buffer = 0;
        self.read.bit_count = 0;
    }

    /// Position the read cursor at the specified bit offset.
    pub fn seek_read(&mut self, bit_offset: usize) -> UnitResult {
        self.check_capacity(bit_offset)?;

        let word_bits = W::BITS as usize;
        let word_index = bit_offset / word_bits;
        let skipped_bits = (bit_offset % word_bits) as u32;

        self.read = Cursor { word_index, buffer: 0, bit_count: 0 };

        if skipped_bits > 0 {
            self.load_word();
            self.read.buffer >>= skipped_bits;
            self.read.bit_count -= skipped_bits;
        }

        Ok(())
    }

    #[inline]
    fn load_word(&mut self) {
        debug_assert!(self.read.word_index < self.words.len(), "capacity check bug");

        self.read.buffer = self.words[self.read.word_index].to_bits();
        self.read.bit_count = W::BITS;
        self.read.word_index += 1;
    }
}
