//! Serving Client
//!
//! Reads one image, sends it to a TensorFlow Serving model and returns the
//! prediction. [`run`] returns errors annotated with the stage that failed;
//! [`execute`] reports them and turns the outcome into an exit status.

use std::path::Path;

use anyhow::Context;
use inference_invoker::{GrpcChannel, InferenceRequest, Invoker, InvokerError};
use serving_proto::PredictResponse;
use tensor_encoder::encode_image;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod cli;
pub mod output;
pub mod settings;

pub use cli::Cli;
pub use output::{render, OutputFormat};
pub use settings::Settings;

/// Exit status of a successful run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status of any failure, including a missing image argument
pub const EXIT_FAILURE: u8 = 1;

/// Initialize logging on stderr, honouring `RUST_LOG` (default `info`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Encode `image`, connect, and perform one predict call
pub async fn run(
    settings: &Settings,
    image: &Path,
    cancel: CancellationToken,
) -> anyhow::Result<PredictResponse> {
    let raw = tokio::fs::read(image)
        .await
        .with_context(|| format!("reading image {}", image.display()))?;
    info!("Read {} bytes from {}", raw.len(), image.display());

    let tensor = encode_image(raw)
        .map_err(InvokerError::from)
        .context("encoding image tensor")?;
    let request = InferenceRequest::builder(settings.selector())
        .input(settings.input_slot.as_str(), tensor)
        .output_filter(settings.output_filter.iter().cloned())
        .build()
        .context("assembling predict request")?;

    let channel = GrpcChannel::connect(&settings.channel_config())
        .await
        .with_context(|| format!("connecting to {}", settings.serving_address))?;

    let ctx = settings.call_context().with_cancellation(cancel);
    let response = Invoker::new(&channel)
        .invoke(request, &ctx)
        .await
        .context("predict call")?;

    Ok(response)
}

/// Run the client for parsed arguments and print the outcome.
///
/// The response goes to stdout; usage and errors go to stderr. Returns the
/// process exit status.
pub async fn execute(cli: &Cli, cancel: CancellationToken) -> u8 {
    let image = match cli.image_path() {
        Ok(path) => path.to_path_buf(),
        Err(usage) => {
            eprintln!("{}", usage);
            return EXIT_FAILURE;
        }
    };

    init_logging();
    info!("=== Serving Client v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::load(cli) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid settings: {}", e);
            eprintln!("Error: invalid settings: {}", e);
            return EXIT_FAILURE;
        }
    };

    let response = match run(&settings, &image, cancel).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    match render(&response, settings.format) {
        Ok(text) => {
            println!("{}", text);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: rendering response: {:#}", e);
            EXIT_FAILURE
        }
    }
}
