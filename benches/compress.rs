#[macro_use]
extern crate bencher;

extern crate zfp_block;
use zfp_block::prelude::*;

use bencher::Bencher;


fn field() -> (Vec<f32>, Shape) {
    let shape = Shape::three_dimensional(64, 64, 64);
    let mut samples = Vec::with_capacity(shape.sample_count());

    for z in 0 .. 64 {
        for y in 0 .. 64 {
            for x in 0 .. 64 {
                let (x, y, z) = (x as f32, y as f32, z as f32);
                samples.push((x * 0.1).sin() + (y * 0.07).cos() * (z * 0.05).sin());
            }
        }
    }

    (samples, shape)
}

fn compress_fixed_rate(bench: &mut Bencher) {
    let (samples, shape) = field();
    let parameters = Parameters::fixed_rate::<f32>(8.0, shape.rank()).unwrap();

    bench.iter(||{
        let bytes = compress(&samples, &shape, &parameters).unwrap();
        bencher::black_box(bytes);
    })
}

fn compress_fixed_accuracy(bench: &mut Bencher) {
    let (samples, shape) = field();
    let parameters = Parameters::fixed_accuracy(1.0e-4);

    bench.iter(||{
        let bytes = compress(&samples, &shape, &parameters).unwrap();
        bencher::black_box(bytes);
    })
}

fn compress_reversible(bench: &mut Bencher) {
    let (samples, shape) = field();
    let parameters = Parameters::reversible();

    bench.iter(||{
        let bytes = compress(&samples, &shape, &parameters).unwrap();
        bencher::black_box(bytes);
    })
}

fn compress_parallel(bench: &mut Bencher) {
    let (samples, shape) = field();
    let parameters = Parameters::fixed_accuracy(1.0e-4);
    let mut words = vec![0_u64; zfp_block::io::word_count::<u64>(max_compressed_bits::<f32>(&shape, &parameters))];

    bench.iter(||{
        let mut stream = BitStream::open(&mut words);
        let bits = parallel::compress_array(&mut stream, &samples, &shape, &parameters).unwrap();
        bencher::black_box(bits);
    })
}

fn decompress_fixed_accuracy(bench: &mut Bencher) {
    let (samples, shape) = field();
    let parameters = Parameters::fixed_accuracy(1.0e-4);
    let bytes = compress(&samples, &shape, &parameters).unwrap();

    bench.iter(||{
        let decoded: Vec<f32> = decompress(&bytes, &shape, &parameters).unwrap();
        bencher::black_box(decoded);
    })
}

benchmark_group!(compression,
    compress_fixed_rate,
    compress_fixed_accuracy,
    compress_reversible,
    compress_parallel,
    decompress_fixed_accuracy
);

benchmark_main!(compression);
