use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ZeroDimension { width: usize, height: usize },
    SizeMismatch { expected: usize, actual: usize },
    UnsupportedFormat(u8),
    InvalidStride,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { width, height } => {
                write!(f, "zero image dimension: {width}x{height}")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::UnsupportedFormat(code) => {
                write!(f, "unsupported pixel format code {code}")
            }
            Self::InvalidStride => write!(f, "invalid stride"),
        }
    }
}

impl std::error::Error for Error {}
