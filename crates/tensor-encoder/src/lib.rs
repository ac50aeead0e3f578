//! Tensor Encoder
//!
//! Turns raw input bytes into well-typed, shape-annotated tensor values and
//! converts them to and from the wire `TensorProto`. The element type of a
//! [`TensorValue`] is carried by its data variant, so a value can never
//! claim one dtype while holding another.

mod convert;
mod encode;
mod error;
mod value;

pub use convert::MAX_BROADCAST_ELEMENTS;
pub use encode::{encode_batch, encode_image};
pub use error::EncodingError;
pub use value::{TensorData, TensorShape, TensorValue};
