//! Inference Invoker
//!
//! Assembles a versioned `PredictRequest` around encoded tensors and
//! performs exactly one remote `Predict` call over a caller-owned channel.
//! Failures are classified as encoding, request, connection or remote
//! errors and handed back to the caller; nothing here exits the process.

mod channel;
mod error;
mod invoker;
mod request;
mod selector;

pub use channel::{ChannelConfig, GrpcChannel, PredictionChannel};
pub use error::InvokerError;
pub use invoker::{CallContext, Invoker};
pub use request::{InferenceRequest, InferenceRequestBuilder};
pub use selector::ModelSelector;

pub use serving_proto::PredictResponse as InferenceResponse;

/// Input slot the inception `predict_images` signature expects
pub const DEFAULT_INPUT_SLOT: &str = "images";
