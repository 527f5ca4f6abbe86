
//! Simple math utilities.


/// Simple three-dimensional vector of any numerical type.
/// Supports only few mathematical operations
/// as this is used mainly as data struct for sizes, positions and strides.
/// Unused dimensions of lower rank arrays are `1` for sizes and `0` for positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec3<T> (pub T, pub T, pub T);

impl<T> Vec3<T> {

    /// Maps all components of this vector to a new type, yielding a vector of that new type.
    pub fn map<B>(self, map: impl Fn(T) -> B) -> Vec3<B> {
        Vec3(map(self.0), map(self.1), map(self.2))
    }

    /// The x coordinate.
    #[inline] pub fn x(self) -> T { self.0 }

    /// The y coordinate.
    #[inline] pub fn y(self) -> T { self.1 }

    /// The z coordinate.
    #[inline] pub fn z(self) -> T { self.2 }
}

impl Vec3<usize> {

    /// Seeing this vector as a dimension or size,
    /// this returns the volume that this dimensions contains (`x * y * z`),
    /// or `None` if it does not fit into a `usize`.
    pub fn checked_volume(self) -> Option<usize> {
        self.0.checked_mul(self.1)?.checked_mul(self.2)
    }

    /// Sum of the component-wise products, the flat index of a position with these strides.
    #[inline]
    pub fn dot(self, other: Vec3<usize>) -> usize {
        self.0 * other.0 + self.1 * other.1 + self.2 * other.2
    }
}

impl<T: std::ops::Add<T>> std::ops::Add<Vec3<T>> for Vec3<T> {
    type Output = Vec3<T::Output>;
    fn add(self, other: Vec3<T>) -> Self::Output {
        Vec3(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

impl<T: std::ops::Sub<T>> std::ops::Sub<Vec3<T>> for Vec3<T> {
    type Output = Vec3<T::Output>;
    fn sub(self, other: Vec3<T>) -> Self::Output {
        Vec3(self.0 - other.0, self.1 - other.1, self.2 - other.2)
    }
}

impl<T> From<(T, T, T)> for Vec3<T> {
    fn from((x, y, z): (T, T, T)) -> Self { Vec3(x, y, z) }
}

impl<T> From<Vec3<T>> for (T, T, T) {
    fn from(vec3: Vec3<T>) -> Self { (vec3.0, vec3.1, vec3.2) }
}


/// Computes `floor(log(x)/log(2))`. Returns 0 where argument is 0.
pub(crate) fn floor_log_2(number: u32) -> u32 {
    if number == 0 { 0 } else { 31 - number.leading_zeros() }
}


/// Round up or down in specific calculations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RoundingMode {

    /// Round down.
    Down,

    /// Round up.
    Up,
}

impl RoundingMode {
    pub(crate) fn divide(self, dividend: usize, divisor: usize) -> usize {
        match self {
            RoundingMode::Up => dividend / divisor + usize::from(dividend % divisor != 0),
            RoundingMode::Down => dividend / divisor,
        }
    }
}
