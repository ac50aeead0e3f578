//! Encoding Error Types

use thiserror::Error;

/// Errors while building or decoding a tensor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// Element count does not match the declared shape
    #[error("Shape {shape:?} holds {expected} elements, got {actual}")]
    ShapeMismatch {
        shape: Vec<u64>,
        expected: u64,
        actual: usize,
    },

    /// Product of the dimensions does not fit in 64 bits
    #[error("Shape {0:?} overflows the element count")]
    ShapeOverflow(Vec<u64>),

    /// Shape carried on the wire is not a concrete shape
    #[error("Invalid tensor shape: {0}")]
    InvalidShape(String),

    /// Element type has no typed representation here
    #[error("Unsupported tensor dtype: {0}")]
    UnsupportedDtype(String),

    /// `tensor_content` length is not a multiple of the element width
    #[error("Malformed {dtype} tensor content: {len} bytes is not a multiple of {width}")]
    MalformedContent {
        dtype: &'static str,
        len: usize,
        width: usize,
    },
}
