
//! Embedded block-floating-point compression for one, two and three dimensional arrays
//! of `f16`, `f32`, `f64`, `i32` and `i64` samples, without any unsafe code.
//!
//! Arrays are split into blocks of `4^rank` samples. Each block is coded independently,
//! first its most important information, then finer and finer details.
//! Stopping early at any point still yields a usable approximation,
//! so the size of each block can be controlled precisely:
//!
//! ```
//! use zfp_block::prelude::*;
//!
//! let shape = Shape::two_dimensional(16, 16);
//! let samples: Vec<f32> = (0 .. 256)
//!     .map(|index| ((index % 16) as f32 * 0.2).sin() + ((index / 16) as f32 * 0.3).cos())
//!     .collect();
//!
//! // eight bits per sample
//! let parameters = Parameters::fixed_rate::<f32>(8.0, shape.rank()).unwrap();
//! let bytes = compress(&samples, &shape, &parameters).unwrap();
//! assert_eq!(bytes.len(), 256);
//!
//! let decoded: Vec<f32> = decompress(&bytes, &shape, &parameters).unwrap();
//! assert!(samples.iter().zip(&decoded).all(|(a, b)| (a - b).abs() < 0.05));
//! ```
//!
//! Use `Parameters::reversible()` to reconstruct every sample bit-exactly.

#![forbid(unsafe_code)]
#![forbid(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
)]

// TODO #![warn(missing_docs)]


pub mod io;
pub mod math;
pub mod error;
pub mod stream;
pub mod parameters;
pub mod codec;
pub mod array;


pub mod prelude {

    // main exports
    pub use crate::array::{compress, decompress, compress_array, decompress_array, max_compressed_bits, Shape};
    pub use crate::codec::{compress_block, decompress_block, decompress_block_into, Rank, Sample};
    pub use crate::parameters::{Parameters, Mode};
    pub use crate::stream::BitStream;

    #[cfg(feature = "rayon")]
    pub use crate::array::parallel;

    // secondary data types
    pub use crate::error::{self, Error};
    pub use crate::io::{Word, words_to_bytes, bytes_to_words};

    // re-export external stuff
    pub use half::f16;
}
