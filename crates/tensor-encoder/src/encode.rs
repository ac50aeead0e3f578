//! Raw Input Encoding

use crate::error::EncodingError;
use crate::value::{TensorShape, TensorValue};
use tracing::debug;

/// Encode one file's bytes as a batch of size one.
///
/// The result is a `DT_STRING` tensor of shape `[1]` whose only element is
/// the whole input. Empty input encodes fine; rejecting it is the server's
/// call. The shape check cannot fail here, so an error means the encoder
/// itself is broken rather than the input.
pub fn encode_image(raw: Vec<u8>) -> Result<TensorValue, EncodingError> {
    debug!("Encoding {} input bytes as a single-element string tensor", raw.len());
    TensorValue::strings(vec![raw], TensorShape::vector(1))
}

/// Encode several inputs along a leading batch dimension of size `items.len()`
pub fn encode_batch(items: Vec<Vec<u8>>) -> Result<TensorValue, EncodingError> {
    let batch = items.len() as u64;
    debug!("Encoding batch of {} string elements", batch);
    TensorValue::strings(items, TensorShape::vector(batch))
}
