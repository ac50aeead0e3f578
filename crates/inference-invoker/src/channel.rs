//! Prediction Channels

use std::time::Duration;

use async_trait::async_trait;
use serving_proto::{PredictRequest, PredictResponse, PredictionServiceClient};
use tonic::transport::{Channel, Endpoint};
use tonic::Status;
use tracing::{debug, info};

use crate::error::InvokerError;

/// Default TensorFlow Serving gRPC address
pub const DEFAULT_SERVING_ADDRESS: &str = "localhost:9000";

/// A connection able to carry one `Predict` call.
///
/// Implementations perform exactly one delivery attempt per call and report
/// failures as gRPC statuses.
#[async_trait]
pub trait PredictionChannel: Send + Sync {
    /// Send a request and wait for the complete response
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, Status>;
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// `host:port` or a full `http://` URI
    pub address: String,
    /// Give up connecting after this long
    pub connect_timeout: Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVING_ADDRESS.to_string(),
            connect_timeout: None,
        }
    }
}

impl ChannelConfig {
    /// Config for `address` with no connect timeout
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: None,
        }
    }

    /// Address as a URI, adding a plaintext scheme when none is given
    pub fn uri(&self) -> String {
        if self.address.contains("://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        }
    }

    /// Build the tonic endpoint
    pub fn endpoint(&self) -> Result<Endpoint, InvokerError> {
        let mut endpoint = Endpoint::from_shared(self.uri()).map_err(|e| {
            InvokerError::Connection(format!("invalid serving address {:?}: {}", self.address, e))
        })?;
        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }
        Ok(endpoint)
    }
}

/// gRPC channel to a model server
#[derive(Debug, Clone)]
pub struct GrpcChannel {
    client: PredictionServiceClient,
}

impl GrpcChannel {
    /// Connect eagerly, so an unreachable server fails here rather than on
    /// the first call
    pub async fn connect(config: &ChannelConfig) -> Result<Self, InvokerError> {
        let endpoint = config.endpoint()?;
        info!("Connecting to model server at {}", config.uri());

        let channel = endpoint.connect().await?;
        debug!("Channel established");
        Ok(Self::from_channel(channel))
    }

    /// Wrap an already established tonic channel
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: PredictionServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl PredictionChannel for GrpcChannel {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, Status> {
        let mut client = self.client.clone();
        let response = client.predict(request).await?;
        Ok(response.into_inner())
    }
}
