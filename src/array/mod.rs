
//! Compression of whole arrays, one block after another.
//! Blocks are visited with x varying fastest, then y, then z.
//! Blocks that extend past the border of the array are padded
//! by repeating samples from inside the array.

#[cfg(feature = "rayon")]
pub mod parallel;

use smallvec::SmallVec;
use std::convert::TryFrom;

use crate::codec::{Rank, Sample, BlockValues};
use crate::codec::lift::Line;
use crate::stream::BitStream;
use crate::io::{Word, ByteVec, Bytes, word_count, words_to_bytes, bytes_to_words};
use crate::math::{Vec3, RoundingMode};
use crate::error::{Error, Result, UnitResult, usize_to_u32};
use crate::parameters::Parameters;


/// The dimensions of an array, and where each sample is located in the sample buffer.
/// The sample at `(x, y, z)` is located at index `x * strides.0 + y * strides.1 + z * strides.2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rank: Rank,
    size: Vec3<usize>,
    strides: Vec3<usize>,
}

/// The part of the array that one block covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRegion {

    /// The position of the first sample of the block in the array.
    pub origin: Vec3<usize>,

    /// The number of samples in each dimension that lie inside the array, at most 4.
    /// Unused dimensions are 1.
    pub valid: Vec3<usize>,
}

impl BlockRegion {

    /// Whether the block extends past the border of the array.
    pub fn is_partial(&self, rank: Rank) -> bool {
        let full = match rank {
            Rank::One => Vec3(4, 1, 1),
            Rank::Two => Vec3(4, 4, 1),
            Rank::Three => Vec3(4, 4, 4),
        };

        self.valid != full
    }
}


impl Shape {

    /// A dense array with the specified number of samples per dimension, x first.
    /// Returns an error if there are not between one and three dimensions.
    pub fn new(size: &[usize]) -> Result<Self> {
        let rank = Rank::try_from(usize_to_u32(size.len(), "too many dimensions")?)?;
        let at = |index: usize| size.get(index).cloned().unwrap_or(1);
        Ok(Self::dense(rank, Vec3(at(0), at(1), at(2))))
    }

    /// A dense array of one dimension.
    pub fn one_dimensional(size_x: usize) -> Self {
        Self::dense(Rank::One, Vec3(size_x, 1, 1))
    }

    /// A dense array of two dimensions, x varying fastest.
    pub fn two_dimensional(size_x: usize, size_y: usize) -> Self {
        Self::dense(Rank::Two, Vec3(size_x, size_y, 1))
    }

    /// A dense array of three dimensions, x varying fastest, z varying slowest.
    pub fn three_dimensional(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self::dense(Rank::Three, Vec3(size_x, size_y, size_z))
    }

    fn dense(rank: Rank, size: Vec3<usize>) -> Self {
        // saturated strides are rejected later by `buffer_len`
        let strides = Vec3(1, size.0, size.0.saturating_mul(size.1));
        Shape { rank, size, strides }
    }

    /// Use custom distances between samples, for example to compress a slice of a larger array.
    pub fn with_strides(self, strides: impl Into<Vec3<usize>>) -> Self {
        Shape { strides: strides.into(), .. self }
    }

    /// The number of dimensions.
    pub fn rank(&self) -> Rank { self.rank }

    /// Number of samples in each dimension. Unused dimensions are 1.
    pub fn size(&self) -> Vec3<usize> { self.size }

    /// Distance between two neighbouring samples in each dimension.
    pub fn strides(&self) -> Vec3<usize> { self.strides }

    /// Number of samples in the array, saturating at `usize::MAX`.
    pub fn sample_count(&self) -> usize { self.size.checked_volume().unwrap_or(usize::MAX) }

    /// Number of blocks in each dimension.
    pub fn block_counts(&self) -> Vec3<usize> {
        self.size.map(|size| RoundingMode::Up.divide(size, 4))
    }

    /// Number of blocks in the array, saturating at `usize::MAX`.
    pub fn block_count(&self) -> usize { self.block_counts().checked_volume().unwrap_or(usize::MAX) }

    /// All blocks, x varying fastest.
    pub fn blocks(&self) -> impl Iterator<Item = BlockRegion> {
        let size = self.size;
        let counts = self.block_counts();

        (0 .. counts.z()).flat_map(move |block_z| {
            (0 .. counts.y()).flat_map(move |block_y| {
                (0 .. counts.x()).map(move |block_x| {
                    let origin = Vec3(block_x, block_y, block_z).map(|block| block * 4);
                    let valid = (size - origin).map(|remaining| remaining.min(4));
                    BlockRegion { origin, valid }
                })
            })
        })
    }

    /// The smallest length of a sample buffer that contains all samples of this array.
    pub fn buffer_len(&self) -> Result<usize> {
        match self.size.checked_volume() {
            None => return Err(Error::invalid("array has too many samples")),
            Some(0) => return Err(Error::invalid("array size must not be zero")),
            Some(_) => {},
        }

        let last = self.size - Vec3(1, 1, 1);
        let overflow = || Error::invalid("array strides are too large");

        let x = last.x().checked_mul(self.strides.x()).ok_or_else(overflow)?;
        let y = last.y().checked_mul(self.strides.y()).ok_or_else(overflow)?;
        let z = last.z().checked_mul(self.strides.z()).ok_or_else(overflow)?;

        x.checked_add(y).and_then(|sum| sum.checked_add(z))
            .and_then(|sum| sum.checked_add(1))
            .ok_or_else(overflow)
    }

    fn validate(&self, buffer_len: usize) -> UnitResult {
        if self.buffer_len()? > buffer_len {
            return Err(Error::invalid("sample buffer is smaller than the array"));
        }

        Ok(())
    }
}


/// Fill the remaining values of a line with values from inside the array.
/// Position 3 repeats position 0, such that the line stays smooth after the transform.
pub(crate) fn pad_line<T: Copy + Default>(block: &mut [T], line: Line, valid: usize) {
    let [p0, p1, p2, p3] = line.indices();

    if valid == 0 { block[p0] = T::default(); }
    if valid <= 1 { block[p1] = block[p0]; }
    if valid <= 2 { block[p2] = block[p1]; }
    if valid <= 3 { block[p3] = block[p0]; }
}

/// Pad a partially filled block along x, then along y, then along z.
pub(crate) fn pad_block<T: Copy + Default>(block: &mut [T], rank: Rank, valid: Vec3<usize>) {
    for z in 0 .. valid.z() {
        for y in 0 .. valid.y() {
            pad_line(block, Line { start: 4 * y + 16 * z, stride: 1 }, valid.x());
        }
    }

    if rank >= Rank::Two {
        for z in 0 .. valid.z() {
            for x in 0 .. 4 {
                pad_line(block, Line { start: x + 16 * z, stride: 4 }, valid.y());
            }
        }
    }

    if rank >= Rank::Three {
        for y in 0 .. 4 {
            for x in 0 .. 4 {
                pad_line(block, Line { start: x + 4 * y, stride: 16 }, valid.z());
            }
        }
    }
}

/// Copy the samples of one block out of the array, padding partial blocks.
pub(crate) fn gather_block<T: Copy + Default>(data: &[T], shape: &Shape, region: BlockRegion, block: &mut [T]) {
    let valid = region.valid;

    for z in 0 .. valid.z() {
        for y in 0 .. valid.y() {
            for x in 0 .. valid.x() {
                let position = region.origin + Vec3(x, y, z);
                block[x + 4 * y + 16 * z] = data[position.dot(shape.strides)];
            }
        }
    }

    if region.is_partial(shape.rank) {
        pad_block(block, shape.rank, valid);
    }
}

/// Copy the samples of one block into the array, ignoring padded samples.
pub(crate) fn scatter_block<T: Copy>(block: &[T], shape: &Shape, region: BlockRegion, data: &mut [T]) {
    let valid = region.valid;

    for z in 0 .. valid.z() {
        for y in 0 .. valid.y() {
            for x in 0 .. valid.x() {
                let position = region.origin + Vec3(x, y, z);
                data[position.dot(shape.strides)] = block[x + 4 * y + 16 * z];
            }
        }
    }
}


/// Compress the specified blocks, without validating anything.
pub(crate) fn compress_blocks<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, data: &[T], shape: &Shape,
    regions: impl Iterator<Item = BlockRegion>, parameters: &Parameters
) -> Result<usize>
{
    let rank = shape.rank();
    let mut block: BlockValues<T> = SmallVec::from_elem(T::default(), rank.block_size());
    let mut bits = 0;

    for region in regions {
        gather_block(data, shape, region, &mut block);
        bits += T::encode_block(stream, &block, rank, parameters)? as usize;
    }

    Ok(bits)
}

/// Compress all blocks of the array. Returns the number of bits written.
/// The sample buffer and parameters are validated before anything is written.
pub fn compress_array<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, data: &[T], shape: &Shape, parameters: &Parameters
) -> Result<usize>
{
    parameters.validate_for::<T>()?;
    shape.validate(data.len())?;

    let bits = compress_blocks(stream, data, shape, shape.blocks(), parameters)?;

    log::debug!(
        "compressed {} samples in {} blocks into {} bits",
        shape.sample_count(), shape.block_count(), bits
    );

    Ok(bits)
}

/// Decompress all blocks of an array that was compressed with the same shape and parameters.
/// Only the samples inside the array are written to the buffer.
/// Returns the number of bits read.
pub fn decompress_array<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, data: &mut [T], shape: &Shape, parameters: &Parameters
) -> Result<usize>
{
    parameters.validate_for::<T>()?;
    shape.validate(data.len())?;

    let rank = shape.rank();
    let mut block: BlockValues<T> = SmallVec::from_elem(T::default(), rank.block_size());
    let mut bits = 0;

    for region in shape.blocks() {
        bits += T::decode_block(stream, &mut block, rank, parameters)? as usize;
        scatter_block(&block, shape, region, data);
    }

    log::debug!(
        "decompressed {} samples in {} blocks from {} bits",
        shape.sample_count(), shape.block_count(), bits
    );

    Ok(bits)
}

/// The number of bits that suffices to compress any array of this shape with these parameters,
/// saturating at `usize::MAX`.
pub fn max_compressed_bits<T: Sample>(shape: &Shape, parameters: &Parameters) -> usize {
    shape.block_count().saturating_mul(T::max_block_bits(shape.rank(), parameters) as usize)
}

/// Compress a dense array into little endian bytes, padded to whole 64-bit words.
pub fn compress<T: Sample>(data: &[T], shape: &Shape, parameters: &Parameters) -> Result<ByteVec> {
    parameters.validate_for::<T>()?;
    shape.validate(data.len())?;

    let mut words = vec![0_u64; word_count::<u64>(max_compressed_bits::<T>(shape, parameters))];

    let byte_count = {
        let mut stream = BitStream::open(&mut words);
        compress_array(&mut stream, data, shape, parameters)?;
        stream.close()?
    };

    words.truncate(byte_count / <u64 as Word>::BYTE_SIZE);
    words_to_bytes(&words)
}

/// Decompress bytes produced by `compress` with the same shape and parameters.
/// The returned samples are laid out with the strides of the shape.
pub fn decompress<T: Sample>(bytes: Bytes<'_>, shape: &Shape, parameters: &Parameters) -> Result<Vec<T>> {
    let mut words: Vec<u64> = bytes_to_words(bytes)?;
    let mut data = vec![T::default(); shape.buffer_len()?];

    let mut stream = BitStream::open(&mut words);
    decompress_array(&mut stream, &mut data, shape, parameters)?;
    Ok(data)
}
