
//! Error type definitions.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::error;
use std::fmt;
use std::convert::TryFrom;
pub use std::io::Error as IoError;


/// A result that may contain a codec error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a codec error.
pub type UnitResult = Result<()>;


/// An error that may happen while compressing or decompressing.
/// Running out of bit budget is never an error,
/// it only reduces the precision of the reconstruction.
#[derive(Debug)]
pub enum Error {

    /// The bit stream would have to move past the end of its buffer.
    /// The stream cursor has not been moved.
    BufferOverrun {

        /// The stream offset, in bits, that the operation would have reached.
        requested_bits: usize,

        /// The number of bits the buffer can hold.
        capacity_bits: usize,
    },

    /// The samples can not be represented by the selected compression mode,
    /// for example infinities in lossy mode.
    NotSupported(Cow<'static, str>),

    /// The parameters, the shape, or the data are contradicting or insufficient.
    Invalid(Cow<'static, str>),

    /// The underlying byte stream could not be read or written successfully.
    Io(IoError),
}


impl Error {

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }

    /// Create an error of the variant `NotSupported`.
    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Error::NotSupported(message.into())
    }

    /// Create an error of the variant `BufferOverrun`.
    pub(crate) fn overrun(requested_bits: usize, capacity_bits: usize) -> Self {
        Error::BufferOverrun { requested_bits, capacity_bits }
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::invalid("reference to missing bytes")
        }
        else {
            Error::Io(error)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferOverrun { requested_bits, capacity_bits } => write!(
                formatter, "bit stream overrun: offset {} exceeds capacity of {} bits",
                requested_bits, capacity_bits
            ),

            Error::NotSupported(message) => write!(formatter, "not supported: {}", message),
            Error::Invalid(message) => write!(formatter, "invalid: {}", message),
            Error::Io(error) => error.fmt(formatter),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}


/// Return error on invalid range.
#[inline]
pub(crate) fn usize_to_u32(value: usize, error_message: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::invalid(error_message))
}
