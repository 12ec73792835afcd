//! Shapes of flattened buffers
//!
//! Images travel as flattened byte buffers. A [`BufferShape`] records the
//! original dimensions (for example `height x width x channels`) so a
//! decryption can check that it received the number of bytes it expects.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::error::SessionError;

/// Dimensions of a flattened buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferShape {
    dims: Vec<usize>,
}

/// Errors parsing a shape such as `512x512x3`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeParseError {
    /// No dimensions given
    #[error("shape is empty")]
    Empty,

    /// A dimension is not an unsigned integer
    #[error("invalid dimension {text:?}")]
    InvalidDimension {
        /// Offending text
        text: String,
    },
}

impl BufferShape {
    /// Shape with the given dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Dimensions, outermost first.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of bytes the shape covers, `None` on overflow.
    pub fn byte_len(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d))
    }

    /// Checks that `len` bytes fill the shape exactly.
    pub fn check(&self, len: usize) -> Result<(), SessionError> {
        let Some(expected) = self.byte_len() else {
            return Err(SessionError::configuration(format!("shape {self} overflows usize")));
        };
        if expected != len {
            return Err(SessionError::LengthMismatch { expected, actual: len });
        }
        Ok(())
    }
}

impl fmt::Display for BufferShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for d in &self.dims {
            if !first {
                f.write_str("x")?;
            }
            write!(f, "{d}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for BufferShape {
    type Err = ShapeParseError;

    /// Accepts `x`, `,` or whitespace between dimensions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims = s
            .split(|c: char| c == 'x' || c == 'X' || c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| ShapeParseError::InvalidDimension { text: part.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if dims.is_empty() {
            return Err(ShapeParseError::Empty);
        }
        Ok(Self { dims })
    }
}
