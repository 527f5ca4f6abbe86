
//! Compress the blocks of an array on a thread pool.
//! Consecutive blocks are grouped into chunks, each chunk is compressed into a private stream,
//! and the chunks are appended to the output stream in their original order.
//! The result is bit-identical to sequential compression.

use super::{Shape, BlockRegion, compress_blocks};
use crate::codec::Sample;
use crate::stream::BitStream;
use crate::io::{Word, word_count};
use crate::error::{Result, UnitResult};
use crate::parameters::Parameters;
use crate::math::RoundingMode;


/// Number of chunks per thread, such that threads that finish early can take more work.
const CHUNKS_PER_THREAD: usize = 4;


/// Compress all blocks of the array on a new thread pool.
/// Falls back to compressing sequentially if no thread pool can be created.
/// Returns the number of bits written.
pub fn compress_array<T: Sample, W: Word>(
    stream: &mut BitStream<'_, W>, data: &[T], shape: &Shape, parameters: &Parameters
) -> Result<usize>
{
    let pool = rayon_core::ThreadPoolBuilder::new()
        .thread_name(|index| format!("zfp-block compression thread #{}", index))
        .build();

    let pool = match pool {
        Ok(pool) => pool,
        Err(error) => {
            log::warn!("compressing sequentially, thread pool unavailable: {}", error);
            return super::compress_array(stream, data, shape, parameters);
        }
    };

    compress_array_on(&pool, stream, data, shape, parameters)
}

/// Compress all blocks of the array on an existing thread pool.
/// Returns the number of bits written.
pub fn compress_array_on<T: Sample, W: Word>(
    pool: &rayon_core::ThreadPool,
    stream: &mut BitStream<'_, W>, data: &[T], shape: &Shape, parameters: &Parameters
) -> Result<usize>
{
    parameters.validate_for::<T>()?;
    shape.validate(data.len())?;

    let regions: Vec<BlockRegion> = shape.blocks().collect();
    let chunk_count = pool.current_num_threads() * CHUNKS_PER_THREAD;
    let chunk_size = RoundingMode::Down.divide(regions.len(), chunk_count).max(1);
    let max_chunk_bits = T::max_block_bits(shape.rank(), parameters) as usize * chunk_size;

    let (sender, receiver) = flume::unbounded();

    pool.scope_fifo(|scope| {
        for (index, chunk) in regions.chunks(chunk_size).enumerate() {
            let sender = sender.clone();

            scope.spawn_fifo(move |_| {
                let mut words = vec![0_u64; word_count::<u64>(max_chunk_bits)];

                let result = {
                    let mut chunk_stream = BitStream::open(&mut words);
                    compress_blocks(&mut chunk_stream, data, shape, chunk.iter().cloned(), parameters)
                        .and_then(|bits| { chunk_stream.flush()?; Ok(bits) })
                };

                // the receiver is alive until the scope ends
                let _ = sender.send((index, result.map(|bits| (words, bits))));
            });
        }
    });

    drop(sender);

    let mut chunks: Vec<_> = receiver.into_iter().collect();
    chunks.sort_unstable_by_key(|(index, _)| *index);

    let mut bits = 0;
    for (_, chunk) in chunks {
        let (words, chunk_bits) = chunk?;
        append_bits(stream, &words, chunk_bits)?;
        bits += chunk_bits;
    }

    log::debug!(
        "compressed {} samples in {} blocks into {} bits on {} threads",
        shape.sample_count(), regions.len(), bits, pool.current_num_threads()
    );

    Ok(bits)
}

/// Copy the first `bit_count` bits of the words into the stream.
fn append_bits<W: Word>(stream: &mut BitStream<'_, W>, words: &[u64], bit_count: usize) -> UnitResult {
    let mut remaining = bit_count;

    for &word in words {
        if remaining == 0 { break; }

        let count = remaining.min(64);
        stream.write_bits(word, count as u32)?;
        remaining -= count;
    }

    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn sequential_and_parallel<T: Sample>(data: &[T], shape: &Shape, parameters: &Parameters) {
        let capacity = word_count::<u32>(super::super::max_compressed_bits::<T>(shape, parameters));

        let mut sequential_words = vec![0_u32; capacity];
        let sequential_bits = {
            let mut stream = BitStream::open(&mut sequential_words);
            let bits = super::super::compress_array(&mut stream, data, shape, parameters).unwrap();
            stream.close().unwrap();
            bits
        };

        let mut parallel_words = vec![0_u32; capacity];
        let parallel_bits = {
            let mut stream = BitStream::open(&mut parallel_words);
            let bits = compress_array(&mut stream, data, shape, parameters).unwrap();
            stream.close().unwrap();
            bits
        };

        assert_eq!(sequential_bits, parallel_bits);
        assert_eq!(sequential_words, parallel_words);
    }

    #[test]
    fn parallel_equals_sequential(){
        let mut random = StdRng::seed_from_u64(17);

        let shape = Shape::three_dimensional(21, 18, 9);
        let data: Vec<f32> = (0 .. shape.sample_count()).map(|_| random.random_range(-100.0 .. 100.0)).collect();

        sequential_and_parallel(&data, &shape, &Parameters::default());
        sequential_and_parallel(&data, &shape, &Parameters::fixed_accuracy(0.01));
        sequential_and_parallel(&data, &shape, &Parameters::reversible());
        sequential_and_parallel(&data, &shape, &Parameters::fixed_rate::<f32>(3.0, shape.rank()).unwrap());
    }

    #[test]
    fn parallel_integers(){
        let mut random = StdRng::seed_from_u64(19);

        let shape = Shape::two_dimensional(33, 30);
        let data: Vec<i64> = (0 .. shape.sample_count()).map(|_| random.random_range(-1000 .. 1000)).collect();
        sequential_and_parallel(&data, &shape, &Parameters::reversible());
    }

    #[test]
    fn append_partial_words(){
        let mut words = vec![0_u8; 4];
        let mut stream = BitStream::open(&mut words);

        append_bits(&mut stream, &[0b1011], 3).unwrap();
        append_bits(&mut stream, &[u64::MAX], 5).unwrap();
        stream.close().unwrap();

        assert_eq!(words[0], 0b1111_1011);
        assert_eq!(words[1], 0);
    }
}
