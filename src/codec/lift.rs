
//! The decorrelating block transform.
//! A separable lifting step is applied to every line of four values,
//! along each axis of the block in turn.

use super::sample::Integer;
use super::Rank;


/// Four values of a block, `start`, `start + stride`, `start + 2 stride` and `start + 3 stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {

    /// Index of the first value.
    pub start: usize,

    /// Distance between two consecutive values.
    pub stride: usize,
}

impl Line {

    /// The indices of the four values of this line.
    #[inline]
    pub fn indices(self) -> [usize; 4] {
        let Line { start, stride } = self;
        [start, start + stride, start + 2 * stride, start + 3 * stride]
    }
}

/// All lines of a block along one axis, in ascending order of their first value.
/// The stride of axis `a` is `4^a`.
pub fn lines(rank: Rank, axis: u32) -> impl Iterator<Item = Line> {
    debug_assert!(axis < rank.dimensions(), "axis exceeds block rank");
    let stride = 1 << (2 * axis);

    (0 .. rank.block_size())
        .filter(move |index| (index / stride) % 4 == 0)
        .map(move |start| Line { start, stride })
}


/// Apply a lifting step to a whole line.
#[inline]
fn lift_line<I: Integer>(values: &mut [I], line: Line, lift: impl Fn([I; 4]) -> [I; 4]) {
    let [a, b, c, d] = line.indices();
    let [x, y, z, w] = lift([values[a], values[b], values[c], values[d]]);
    values[a] = x; values[b] = y; values[c] = z; values[d] = w;
}

/// The non-orthogonal decorrelating transform, loosely approximating a discrete cosine transform.
/// Halves the magnitude of the values on each pass, so that results keep two bits of headroom.
pub fn forward_lift<I: Integer>([mut x, mut y, mut z, mut w]: [I; 4]) -> [I; 4] {
    x = x.add(w); x = x.halve(); w = w.sub(x);
    z = z.add(y); z = z.halve(); y = y.sub(z);
    x = x.add(z); x = x.halve(); z = z.sub(x);
    w = w.add(y); w = w.halve(); y = y.sub(w);
    w = w.add(y.halve()); y = y.sub(w.halve());
    [x, y, z, w]
}

/// Inverse of `forward_lift`, exact except for the lowest bits dropped by the forward halving.
pub fn inverse_lift<I: Integer>([mut x, mut y, mut z, mut w]: [I; 4]) -> [I; 4] {
    y = y.add(w.halve()); w = w.sub(y.halve());
    y = y.add(w); w = w.double(); w = w.sub(y);
    z = z.add(x); x = x.double(); x = x.sub(z);
    y = y.add(z); z = z.double(); z = z.sub(y);
    w = w.add(x); x = x.double(); x = x.sub(w);
    [x, y, z, w]
}

/// An integer-to-integer lifting transform that is exactly invertible for all inputs,
/// at the cost of less decorrelation and a growing magnitude.
pub fn forward_reversible_lift<I: Integer>([x, mut y, mut z, mut w]: [I; 4]) -> [I; 4] {
    w = w.sub(z); z = z.sub(y); y = y.sub(x);
    w = w.sub(z); z = z.sub(y);
    w = w.sub(z);
    [x, y, z, w]
}

/// Exact inverse of `forward_reversible_lift`.
pub fn inverse_reversible_lift<I: Integer>([x, mut y, mut z, mut w]: [I; 4]) -> [I; 4] {
    w = w.add(z);
    z = z.add(y); w = w.add(z);
    y = y.add(x); z = z.add(y); w = w.add(z);
    [x, y, z, w]
}


/// Which lifting step a block is transformed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifting {

    /// The default lossy transform.
    Decorrelating,

    /// The exactly invertible transform of reversible mode.
    Reversible,
}

/// Transform all lines along the x axis, then along the y axis, then along the z axis.
pub fn forward_transform<I: Integer>(block: &mut [I], rank: Rank, lifting: Lifting) {
    debug_assert_eq!(block.len(), rank.block_size());

    for axis in 0 .. rank.dimensions() {
        for line in lines(rank, axis) {
            match lifting {
                Lifting::Decorrelating => lift_line(block, line, forward_lift),
                Lifting::Reversible => lift_line(block, line, forward_reversible_lift),
            }
        }
    }
}

/// Transform all lines along the z axis, then along the y axis, then along the x axis.
pub fn inverse_transform<I: Integer>(block: &mut [I], rank: Rank, lifting: Lifting) {
    debug_assert_eq!(block.len(), rank.block_size());

    for axis in (0 .. rank.dimensions()).rev() {
        for line in lines(rank, axis) {
            match lifting {
                Lifting::Decorrelating => lift_line(block, line, inverse_lift),
                Lifting::Reversible => lift_line(block, line, inverse_reversible_lift),
            }
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn line_layout(){
        let starts: Vec<usize> = lines(Rank::Two, 0).map(|line| line.start).collect();
        assert_eq!(starts, vec![0, 4, 8, 12]);

        let starts: Vec<usize> = lines(Rank::Two, 1).map(|line| line.start).collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);

        let z_lines: Vec<Line> = lines(Rank::Three, 2).collect();
        assert_eq!(z_lines.len(), 16);
        assert!(z_lines.iter().all(|line| line.stride == 16 && line.start < 16));

        let y_lines: Vec<usize> = lines(Rank::Three, 1).map(|line| line.start).collect();
        assert_eq!(&y_lines[.. 5], &[0, 1, 2, 3, 16]);

        assert_eq!(Line { start: 1, stride: 4 }.indices(), [1, 5, 9, 13]);
        assert_eq!(lines(Rank::One, 0).count(), 1);
    }

    #[test]
    fn constant_line_has_single_coefficient(){
        let value = 1_i32 << 29;
        assert_eq!(forward_lift([value; 4]), [value, 0, 0, 0]);
        assert_eq!(inverse_lift([value, 0, 0, 0]), [value; 4]);
    }

    #[test]
    fn constant_block_keeps_headroom(){
        let value = (1_i32 << 30) - 1;

        for &rank in &[Rank::One, Rank::Two, Rank::Three] {
            let mut block = vec![value; rank.block_size()];
            forward_transform(&mut block, rank, Lifting::Decorrelating);
            assert!(block[0] > 0 && block[0] <= value, "dc coefficient {} overflows", block[0]);
        }
    }

    #[test]
    fn lossy_lift_is_exact_for_coarse_values(){
        let mut random = StdRng::seed_from_u64(7);

        for &rank in &[Rank::One, Rank::Two, Rank::Three] {
            for _ in 0 .. 256 {
                let original: Vec<i32> = (0 .. rank.block_size())
                    .map(|_| random.random_range(-(1 << 13) .. (1 << 13)) << 16)
                    .collect();

                let mut block = original.clone();
                forward_transform(&mut block, rank, Lifting::Decorrelating);
                inverse_transform(&mut block, rank, Lifting::Decorrelating);
                assert_eq!(block, original);
            }
        }
    }

    #[test]
    fn lossy_lift_error_is_small(){
        let mut random = StdRng::seed_from_u64(0);

        for _ in 0 .. 1024 {
            let original: [i64; 4] = [
                random.random_range(-(1 << 60) .. (1 << 60)),
                random.random_range(-(1 << 60) .. (1 << 60)),
                random.random_range(-(1 << 60) .. (1 << 60)),
                random.random_range(-(1 << 60) .. (1 << 60)),
            ];

            let restored = inverse_lift(forward_lift(original));
            for (original, restored) in original.iter().zip(restored.iter()) {
                assert!((original - restored).abs() <= 8, "{} became {}", original, restored);
            }
        }
    }

    #[test]
    fn reversible_lift_is_exact_for_all_values(){
        let mut random = StdRng::seed_from_u64(42);

        for &rank in &[Rank::One, Rank::Two, Rank::Three] {
            for _ in 0 .. 256 {
                let original: Vec<i32> = (0 .. rank.block_size()).map(|_| random.random()).collect();

                let mut block = original.clone();
                forward_transform(&mut block, rank, Lifting::Reversible);
                inverse_transform(&mut block, rank, Lifting::Reversible);
                assert_eq!(block, original);
            }
        }

        let extremes = [i64::MIN, i64::MAX, -1, i64::MIN];
        assert_eq!(inverse_reversible_lift(forward_reversible_lift(extremes)), extremes);
    }

    #[test]
    fn reversible_lift_of_linear_ramp(){
        // the fourth coefficient is the third difference, which vanishes for polynomials of degree two
        assert_eq!(forward_reversible_lift([3_i32, 5, 7, 9]), [3, 2, 0, 0]);
        assert_eq!(forward_reversible_lift([0_i32, 1, 4, 9]), [0, 1, 2, 0]);
    }
}
