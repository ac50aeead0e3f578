//! TensorFlow Serving Wire Types
//!
//! Protobuf messages for the `PredictionService/Predict` call and a unary
//! gRPC client over a tonic channel. Field numbers follow
//! `tensorflow_serving/apis/predict.proto`, `model.proto` and the
//! `tensorflow/core/framework` tensor protos, so requests built here are
//! accepted by a stock model server.

mod client;
mod predict;
mod tensor;

pub use client::{PredictionServiceClient, PREDICT_METHOD, PREDICTION_SERVICE};
pub use predict::{ModelSpec, PredictRequest, PredictResponse};
pub use tensor::{tensor_shape_proto, DataType, TensorProto, TensorShapeProto};
