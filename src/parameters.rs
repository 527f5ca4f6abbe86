
//! Describes how many bits each block may use, and how precise it should be.
//! The presets correspond to the usual compression modes:
//! fixed rate, fixed precision, fixed accuracy and reversible.

use crate::codec::{Rank, Sample};
use crate::error::{Error, Result, UnitResult};
use crate::codec::quantize::exponent;


/// The smallest number of bits a block can be compressed to.
pub const MIN_BITS: u32 = 1;

/// The number of bits that suffices for any lossy block of up to 64-bit samples,
/// `1 + 11 + 64 * 64 + 63`.
pub const MAX_BITS: u32 = 4171;

/// The number of bits that suffices for any reversible block of up to 64-bit samples,
/// which additionally store whether the common exponent is lossless and the number of bit planes.
pub const MAX_REVERSIBLE_BITS: u32 = MAX_BITS + 7;

/// The maximum number of bit planes of a coefficient.
pub const MAX_PRECISION: u32 = 64;

/// The exponent of the smallest positive 64-bit float.
pub const MIN_EXPONENT: i32 = -1074;


/// Per-block limits shared by the compressor and the decompressor.
/// The decompressor must use exactly the parameters the compressor used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameters {

    /// Blocks that use fewer bits are padded with zeroes up to this number of bits.
    /// Equal to `max_bits` in fixed rate mode, which makes every block the same size.
    pub min_bits: u32,

    /// The compressor stops coding a block when this number of bits is reached.
    pub max_bits: u32,

    /// The maximum number of bit planes to code per block.
    pub max_precision: u32,

    /// Bit planes below this power of two are not coded,
    /// which bounds the absolute error.
    pub min_exponent: i32,

    /// Use the exactly invertible transform and code all bit planes,
    /// such that the reconstruction is bit-exact.
    pub reversible: bool,
}

/// The compression mode that a set of parameters corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {

    /// Every block uses exactly this number of bits.
    FixedRate { bits_per_block: u32 },

    /// Every block codes this number of bit planes.
    FixedPrecision { precision: u32 },

    /// Every block codes all bit planes down to this exponent.
    FixedAccuracy { min_exponent: i32 },

    /// Every block is coded without loss.
    Reversible,

    /// Any other combination.
    Expert,
}


impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            min_bits: MIN_BITS,
            max_bits: MAX_BITS,
            max_precision: MAX_PRECISION,
            min_exponent: MIN_EXPONENT,
            reversible: false,
        }
    }
}

impl Parameters {

    /// Use exactly `round(4^rank * rate)` bits per block, where `rate` is the number of bits per sample.
    /// Floating point blocks use at least enough bits to store the exponent.
    pub fn fixed_rate<T: Sample>(rate: f64, rank: Rank) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::invalid("rate must be a positive number of bits per sample"));
        }

        let block_size = rank.block_size() as f64;
        let bits = ((block_size * rate + 0.5).floor() as u32) // saturating cast
            .max(T::header_bits(false))
            .max(MIN_BITS);

        Ok(Parameters { min_bits: bits, max_bits: bits, .. Self::default() })
    }

    /// Code the specified number of bit planes per block, or all if it exceeds the sample width.
    pub fn fixed_precision(precision: u32) -> Self {
        Parameters { max_precision: precision.min(MAX_PRECISION), .. Self::default() }
    }

    /// Code all bit planes above the tolerance, such that the absolute error
    /// is roughly bounded by the tolerance. A tolerance of zero codes all bit planes.
    pub fn fixed_accuracy(tolerance: f64) -> Self {
        let min_exponent =
            if tolerance > 0.0 { exponent(tolerance) - 1 }
            else { MIN_EXPONENT };

        Parameters { min_exponent, .. Self::default() }
    }

    /// Reconstruct every sample bit-exactly, including infinities, NaN and negative zero.
    pub fn reversible() -> Self {
        Parameters { max_bits: MAX_REVERSIBLE_BITS, reversible: true, .. Self::default() }
    }

    /// Specify all limits explicitly. Returns an error if they contradict each other.
    pub fn expert(min_bits: u32, max_bits: u32, max_precision: u32, min_exponent: i32) -> Result<Self> {
        let parameters = Parameters { min_bits, max_bits, max_precision, min_exponent, reversible: false };
        parameters.validate()?;
        Ok(parameters)
    }

    /// Classify these parameters.
    pub fn mode(&self) -> Mode {
        if self.reversible {
            Mode::Reversible
        }
        else if self.min_bits == self.max_bits && self.max_bits >= 1 && self.max_bits <= MAX_BITS
            && self.max_precision >= MAX_PRECISION && self.min_exponent <= MIN_EXPONENT
        {
            Mode::FixedRate { bits_per_block: self.max_bits }
        }
        else if self.min_bits <= MIN_BITS && self.max_bits >= MAX_BITS
            && self.max_precision >= 1 && self.max_precision <= MAX_PRECISION
            && self.min_exponent <= MIN_EXPONENT
        {
            Mode::FixedPrecision { precision: self.max_precision }
        }
        else if self.min_bits <= MIN_BITS && self.max_bits >= MAX_BITS
            && self.max_precision >= MAX_PRECISION
        {
            Mode::FixedAccuracy { min_exponent: self.min_exponent }
        }
        else {
            Mode::Expert
        }
    }

    /// The average number of bits per sample in fixed rate mode.
    pub fn rate(&self, rank: Rank) -> f64 {
        f64::from(self.max_bits) / rank.block_size() as f64
    }

    /// Returns an error if the limits contradict each other.
    pub fn validate(&self) -> UnitResult {
        if self.max_bits == 0 {
            return Err(Error::invalid("maximum bits per block must not be zero"));
        }

        if self.max_precision == 0 || self.max_precision > MAX_PRECISION {
            return Err(Error::invalid("maximum precision must be between 1 and 64"));
        }

        if self.min_bits > self.max_bits {
            return Err(Error::invalid("minimum bits per block exceed maximum bits per block"));
        }

        Ok(())
    }

    /// Returns an error if the limits contradict each other,
    /// or if the maximum bits per block can not even hold the block header of the sample type.
    pub fn validate_for<T: Sample>(&self) -> UnitResult {
        self.validate()?;

        if self.max_bits < T::header_bits(self.reversible) {
            return Err(Error::invalid("maximum bits per block are too few for the block header"));
        }

        Ok(())
    }

    /// The number of bit planes to code for a block with the specified common exponent,
    /// `min(max_precision, max(0, max_exponent - min_exponent + 2 (rank + 1)))`.
    pub(crate) fn precision(&self, max_exponent: i32, rank: Rank) -> u32 {
        let dimensions = i64::from(rank.dimensions());
        let precision = i64::from(max_exponent) - i64::from(self.min_exponent) + 2 * (dimensions + 1);
        precision.max(0).min(i64::from(self.max_precision)) as u32
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use half::f16;

    #[test]
    fn default_codes_everything(){
        let parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.mode(), Mode::FixedPrecision { precision: 64 });
        assert_eq!(parameters.precision(1, Rank::Three), 64);
    }

    #[test]
    fn fixed_rate_bits(){
        let parameters = Parameters::fixed_rate::<f32>(8.0, Rank::Three).unwrap();
        assert_eq!(parameters.min_bits, 512);
        assert_eq!(parameters.max_bits, 512);
        assert_eq!(parameters.mode(), Mode::FixedRate { bits_per_block: 512 });
        assert_eq!(parameters.rate(Rank::Three), 8.0);

        let parameters = Parameters::fixed_rate::<f64>(1.5, Rank::One).unwrap();
        assert_eq!(parameters.max_bits, 12);

        let parameters = Parameters::fixed_rate::<i32>(0.1, Rank::One).unwrap();
        assert_eq!(parameters.max_bits, 1);

        assert!(Parameters::fixed_rate::<f32>(0.0, Rank::Two).is_err());
        assert!(Parameters::fixed_rate::<f32>(f64::NAN, Rank::Two).is_err());
        assert!(Parameters::fixed_rate::<f16>(1.0, Rank::Two).unwrap().validate_for::<f16>().is_ok());
    }

    #[test]
    fn fixed_accuracy_exponent(){
        let parameters = Parameters::fixed_accuracy(1.0e-3);
        assert_eq!(parameters.min_exponent, -10);
        assert_eq!(parameters.mode(), Mode::FixedAccuracy { min_exponent: -10 });

        // a block with values below 1.0 codes the planes down to about 2^-10
        assert_eq!(parameters.precision(0, Rank::Two), 16);
        assert_eq!(parameters.precision(-40, Rank::Two), 0);

        assert_eq!(Parameters::fixed_accuracy(0.0).min_exponent, MIN_EXPONENT);
    }

    #[test]
    fn fixed_precision_is_clamped(){
        assert_eq!(Parameters::fixed_precision(16).mode(), Mode::FixedPrecision { precision: 16 });
        assert_eq!(Parameters::fixed_precision(100).max_precision, 64);
        assert_eq!(Parameters::fixed_precision(16).precision(100, Rank::One), 16);
    }

    #[test]
    fn reversible_mode(){
        let parameters = Parameters::reversible();
        assert_eq!(parameters.mode(), Mode::Reversible);
        assert!(parameters.validate_for::<f64>().is_ok());
        assert_eq!(f64::max_block_bits(Rank::Three, &parameters), MAX_REVERSIBLE_BITS);
    }

    #[test]
    fn reject_contradictions(){
        assert!(Parameters::expert(1, 0, 64, MIN_EXPONENT).is_err());
        assert!(Parameters::expert(1, 100, 0, MIN_EXPONENT).is_err());
        assert!(Parameters::expert(1, 100, 65, MIN_EXPONENT).is_err());
        assert!(Parameters::expert(200, 100, 64, MIN_EXPONENT).is_err());

        let parameters = Parameters::expert(1, 8, 64, MIN_EXPONENT).unwrap();
        assert_eq!(parameters.mode(), Mode::Expert);
        assert!(parameters.validate_for::<f32>().is_err());
        assert!(parameters.validate_for::<i32>().is_ok());
        assert!(Parameters::expert(1, 9, 64, MIN_EXPONENT).unwrap().validate_for::<f32>().is_ok());
    }
}
