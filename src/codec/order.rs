
//! Reordering of transform coefficients by sequency,
//! and conversion between signed coefficients and negabinary unsigned integers.

use super::sample::Integer;
use super::Rank;


const fn index_2d(x: u8, y: u8) -> u8 { x + 4 * y }
const fn index_3d(x: u8, y: u8, z: u8) -> u8 { x + 4 * y + 16 * z }

/// Coefficient order of one-dimensional blocks.
pub const PERMUTATION_1D: [u8; 4] = [0, 1, 2, 3];

/// Coefficient order of two-dimensional blocks,
/// ascending by the total sequency `x + y`.
pub const PERMUTATION_2D: [u8; 16] = [
    index_2d(0, 0),

    index_2d(1, 0), index_2d(0, 1),

    index_2d(1, 1),
    index_2d(2, 0), index_2d(0, 2),

    index_2d(2, 1), index_2d(1, 2),
    index_2d(3, 0), index_2d(0, 3),

    index_2d(2, 2),
    index_2d(3, 1), index_2d(1, 3),

    index_2d(3, 2), index_2d(2, 3),

    index_2d(3, 3),
];

/// Coefficient order of three-dimensional blocks,
/// ascending by the total sequency `x + y + z`.
pub const PERMUTATION_3D: [u8; 64] = [
    index_3d(0, 0, 0),

    index_3d(1, 0, 0), index_3d(0, 1, 0), index_3d(0, 0, 1),

    index_3d(0, 1, 1), index_3d(1, 0, 1), index_3d(1, 1, 0),
    index_3d(2, 0, 0), index_3d(0, 2, 0), index_3d(0, 0, 2),

    index_3d(1, 1, 1),
    index_3d(2, 1, 0), index_3d(2, 0, 1), index_3d(0, 2, 1),
    index_3d(1, 2, 0), index_3d(1, 0, 2), index_3d(0, 1, 2),
    index_3d(3, 0, 0), index_3d(0, 3, 0), index_3d(0, 0, 3),

    index_3d(2, 1, 1), index_3d(1, 2, 1), index_3d(1, 1, 2),
    index_3d(0, 2, 2), index_3d(2, 0, 2), index_3d(2, 2, 0),
    index_3d(3, 1, 0), index_3d(3, 0, 1), index_3d(0, 3, 1),
    index_3d(1, 3, 0), index_3d(1, 0, 3), index_3d(0, 1, 3),

    index_3d(1, 2, 2), index_3d(2, 1, 2), index_3d(2, 2, 1),
    index_3d(3, 1, 1), index_3d(1, 3, 1), index_3d(1, 1, 3),
    index_3d(3, 2, 0), index_3d(3, 0, 2), index_3d(0, 3, 2),
    index_3d(2, 3, 0), index_3d(2, 0, 3), index_3d(0, 2, 3),

    index_3d(2, 2, 2),
    index_3d(3, 2, 1), index_3d(3, 1, 2), index_3d(1, 3, 2),
    index_3d(2, 3, 1), index_3d(2, 1, 3), index_3d(1, 2, 3),
    index_3d(0, 3, 3), index_3d(3, 0, 3), index_3d(3, 3, 0),

    index_3d(3, 2, 2), index_3d(2, 3, 2), index_3d(2, 2, 3),
    index_3d(1, 3, 3), index_3d(3, 1, 3), index_3d(3, 3, 1),

    index_3d(2, 3, 3), index_3d(3, 2, 3), index_3d(3, 3, 2),

    index_3d(3, 3, 3),
];

/// The table that maps the position in the stream to the position in the block.
pub fn permutation(rank: Rank) -> &'static [u8] {
    match rank {
        Rank::One => &PERMUTATION_1D,
        Rank::Two => &PERMUTATION_2D,
        Rank::Three => &PERMUTATION_3D,
    }
}

/// Gather the coefficients in sequency order and convert them to negabinary.
pub fn forward_order<I: Integer>(coefficients: &[I], unsigned: &mut [I::Unsigned], rank: Rank) {
    debug_assert_eq!(coefficients.len(), unsigned.len());

    for (target, &source) in unsigned.iter_mut().zip(permutation(rank)) {
        *target = coefficients[source as usize].to_negabinary();
    }
}

/// Convert negabinary back to signed coefficients and scatter them to their block positions.
pub fn inverse_order<I: Integer>(unsigned: &[I::Unsigned], coefficients: &mut [I], rank: Rank) {
    debug_assert_eq!(coefficients.len(), unsigned.len());

    for (&source, &target) in unsigned.iter().zip(permutation(rank)) {
        coefficients[target as usize] = I::from_negabinary(source);
    }
}
