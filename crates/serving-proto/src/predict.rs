//! Predict request/response envelopes from `tensorflow_serving/apis`.

use crate::tensor::TensorProto;

/// Metadata for an inference request such as the model name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelSpec {
    /// Required servable name.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// Optional choice of which version of the model to use. Encoded as a
    /// `google.protobuf.Int64Value`; when absent the server picks the latest.
    #[prost(message, optional, tag = "2")]
    pub version: ::core::option::Option<i64>,
    /// A named signature to evaluate. If unspecified, the default signature
    /// will be used.
    #[prost(string, tag = "3")]
    pub signature_name: ::prost::alloc::string::String,
}

/// PredictRequest specifies which TensorFlow model to run, as well as
/// how inputs are mapped to tensors and how outputs are filtered before
/// returning to user.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PredictRequest {
    #[prost(message, optional, tag = "1")]
    pub model_spec: ::core::option::Option<ModelSpec>,
    /// Input tensors, keyed by the alias the signature exposes.
    #[prost(map = "string, message", tag = "2")]
    pub inputs: ::std::collections::HashMap<::prost::alloc::string::String, TensorProto>,
    /// Output filter. Names must match the output aliases of the signature;
    /// empty means every output is returned.
    #[prost(string, repeated, tag = "3")]
    pub output_filter: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// Response for PredictRequest on successful run.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PredictResponse {
    /// Effective Model Specification used to process PredictRequest.
    #[prost(message, optional, tag = "2")]
    pub model_spec: ::core::option::Option<ModelSpec>,
    /// Output tensors.
    #[prost(map = "string, message", tag = "1")]
    pub outputs: ::std::collections::HashMap<::prost::alloc::string::String, TensorProto>,
}
