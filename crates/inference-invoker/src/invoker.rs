//! Single-shot Predict Dispatch

use std::time::Duration;

use serving_proto::PredictResponse;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channel::PredictionChannel;
use crate::error::InvokerError;
use crate::request::{InferenceRequest, InferenceRequestBuilder};

/// Per-call controls: an optional deadline and a cancellation token
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl CallContext {
    /// No deadline, never cancelled unless the token is triggered
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the call if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a token shared with the caller (e.g. tripped on Ctrl-C)
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Deadline, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Dispatches predict requests over a borrowed channel
pub struct Invoker<'a, C: PredictionChannel + ?Sized> {
    channel: &'a C,
}

impl<'a, C: PredictionChannel + ?Sized> Invoker<'a, C> {
    /// Create an invoker sharing `channel` for the duration of its calls
    pub fn new(channel: &'a C) -> Self {
        Self { channel }
    }

    /// Send `request` once and return the response untouched.
    ///
    /// There are no retries. Cancellation and deadline expiry drop the
    /// in-flight call and surface as [`InvokerError::Connection`].
    pub async fn invoke(
        &self,
        request: InferenceRequest,
        ctx: &CallContext,
    ) -> Result<PredictResponse, InvokerError> {
        let selector = request.selector().clone();
        info!(
            model = %selector.name,
            signature = %selector.signature,
            version = ?selector.version,
            inputs = request.inputs().len(),
            "Dispatching predict request"
        );

        if ctx.cancellation().is_cancelled() {
            warn!("Call cancelled before dispatch");
            return Err(InvokerError::Connection("call cancelled before dispatch".to_string()));
        }

        let start = std::time::Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => {
                warn!("Predict call cancelled");
                Err(InvokerError::Connection("call cancelled".to_string()))
            }
            result = self.dispatch(request, ctx.timeout()) => result,
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(response) => info!(
                outputs = response.outputs.len(),
                latency_ms, "Predict call succeeded"
            ),
            Err(e) => error!(latency_ms, "Predict call failed: {}", e),
        }
        outcome
    }

    /// Validate the request in `builder` and send it.
    ///
    /// A request that fails validation is never handed to the channel.
    pub async fn submit(
        &self,
        builder: InferenceRequestBuilder,
        ctx: &CallContext,
    ) -> Result<PredictResponse, InvokerError> {
        let request = builder.build().inspect_err(|e| warn!("Request rejected: {}", e))?;
        self.invoke(request, ctx).await
    }

    async fn dispatch(
        &self,
        request: InferenceRequest,
        timeout: Option<Duration>,
    ) -> Result<PredictResponse, InvokerError> {
        let call = self.channel.predict(request.into_proto());
        let result = match timeout {
            Some(limit) => {
                debug!("Call deadline {}ms", limit.as_millis());
                tokio::time::timeout(limit, call).await.map_err(|_| {
                    InvokerError::Connection(format!(
                        "deadline of {}ms exceeded",
                        limit.as_millis()
                    ))
                })?
            }
            None => call.await,
        };
        result.map_err(InvokerError::from_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ModelSelector;
    use async_trait::async_trait;
    use serving_proto::{DataType, PredictRequest, TensorProto};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tensor_encoder::encode_image;
    use tonic::Status;

    /// Records requests and answers with a fixed result
    struct MockChannel {
        calls: AtomicUsize,
        seen: Mutex<Vec<PredictRequest>>,
        reply: Result<PredictResponse, (tonic::Code, &'static str)>,
    }

    impl MockChannel {
        fn replying(reply: Result<PredictResponse, (tonic::Code, &'static str)>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PredictionChannel for MockChannel {
        async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Ok(response) => Ok(response.clone()),
                Err((code, message)) => Err(Status::new(*code, *message)),
            }
        }
    }

    /// Never answers
    struct StalledChannel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionChannel for StalledChannel {
        async fn predict(&self, _request: PredictRequest) -> Result<PredictResponse, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn image_request(bytes: Vec<u8>) -> InferenceRequest {
        InferenceRequest::builder(ModelSelector::inception())
            .input("images", encode_image(bytes).unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_echo_response_returned() {
        let channel = MockChannel::replying(Ok(PredictResponse::default()));
        let invoker = Invoker::new(&channel);

        let response = invoker
            .invoke(image_request(vec![0x01, 0x02, 0x03]), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(response, PredictResponse::default());
        assert_eq!(channel.calls(), 1);

        let seen = channel.seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.model_spec.as_ref().unwrap().name, "inception");
        let images = &sent.inputs["images"];
        assert_eq!(images.dtype(), DataType::DtString);
        assert_eq!(images.string_val, vec![vec![0x01, 0x02, 0x03]]);
    }

    #[tokio::test]
    async fn test_response_passed_through_unchanged() {
        let mut expected = PredictResponse::default();
        expected.outputs.insert(
            "scores".to_string(),
            TensorProto {
                dtype: DataType::DtFloat as i32,
                float_val: vec![0.9, 0.1],
                ..Default::default()
            },
        );
        let channel = MockChannel::replying(Ok(expected.clone()));

        let response = Invoker::new(&channel)
            .invoke(image_request(b"png".to_vec()), &CallContext::new())
            .await
            .unwrap();
        assert_eq!(response, expected);
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let channel = MockChannel::replying(Err((tonic::Code::Unavailable, "connection refused")));

        let err = Invoker::new(&channel)
            .invoke(image_request(vec![1, 2, 3]), &CallContext::new())
            .await
            .unwrap_err();

        assert!(err.is_connection());
        assert_eq!(channel.calls(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_reported_verbatim() {
        let channel = MockChannel::replying(Err((
            tonic::Code::FailedPrecondition,
            "Serving signature name: \"predict_images\" not found",
        )));

        let err = Invoker::new(&channel)
            .invoke(image_request(vec![1]), &CallContext::new())
            .await
            .unwrap_err();

        match err {
            InvokerError::Remote { code, message } => {
                assert_eq!(code, tonic::Code::FailedPrecondition);
                assert_eq!(message, "Serving signature name: \"predict_images\" not found");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert_eq!(channel.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_selector_never_dispatches() {
        let channel = MockChannel::replying(Ok(PredictResponse::default()));
        let selector = ModelSelector {
            name: "inception".to_string(),
            signature: String::new(),
            version: Some(1),
        };

        let builder =
            InferenceRequest::builder(selector).input("images", encode_image(vec![1]).unwrap());

        let result = Invoker::new(&channel).submit(builder, &CallContext::new()).await;

        assert!(matches!(result, Err(InvokerError::InvalidRequest(_))));
        assert_eq!(channel.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_dispatches_valid_request() {
        let channel = MockChannel::replying(Ok(PredictResponse::default()));
        let builder = InferenceRequest::builder(ModelSelector::inception())
            .input("images", encode_image(b"png".to_vec()).unwrap())
            .output_filter(["classes"]);

        let response = Invoker::new(&channel)
            .submit(builder, &CallContext::new())
            .await
            .unwrap();

        assert_eq!(response, PredictResponse::default());
        assert_eq!(channel.calls(), 1);
        assert_eq!(channel.seen.lock().unwrap()[0].output_filter, vec!["classes"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_is_connection_error() {
        let channel = StalledChannel {
            calls: AtomicUsize::new(0),
        };
        let ctx = CallContext::new().with_timeout(Duration::from_millis(250));

        let err = Invoker::new(&channel)
            .invoke(image_request(vec![1]), &ctx)
            .await
            .unwrap_err();

        assert!(err.is_connection());
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_call() {
        let channel = StalledChannel {
            calls: AtomicUsize::new(0),
        };
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = Invoker::new(&channel)
            .invoke(image_request(vec![1]), &ctx)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_dispatch() {
        let channel = MockChannel::replying(Ok(PredictResponse::default()));
        let token = CancellationToken::new();
        token.cancel();

        let err = Invoker::new(&channel)
            .invoke(image_request(vec![1]), &CallContext::new().with_cancellation(token))
            .await
            .unwrap_err();

        assert!(err.is_connection());
        assert_eq!(channel.calls(), 0);
    }
}
