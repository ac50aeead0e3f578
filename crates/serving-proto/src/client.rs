//! Unary gRPC client for `tensorflow.serving.PredictionService`.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{GrpcMethod, IntoRequest, Response, Status};

use crate::predict::{PredictRequest, PredictResponse};

/// Fully qualified service name
pub const PREDICTION_SERVICE: &str = "tensorflow.serving.PredictionService";
/// Predict method name
pub const PREDICT_METHOD: &str = "Predict";

/// PredictionService provides access to machine-learned models loaded by
/// model servers.
#[derive(Debug, Clone)]
pub struct PredictionServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl PredictionServiceClient {
    /// Wrap an established channel
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Predict -- provides access to loaded TensorFlow model.
    pub async fn predict(
        &mut self,
        request: impl IntoRequest<PredictRequest>,
    ) -> Result<Response<PredictResponse>, Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("Service was not ready: {}", e)))?;

        let codec = tonic_prost::ProstCodec::default();
        let path = PathAndQuery::from_static("/tensorflow.serving.PredictionService/Predict");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(PREDICTION_SERVICE, PREDICT_METHOD));

        self.inner.unary(req, path, codec).await
    }
}
