//! Command-line Arguments

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::output::OutputFormat;

/// Send one image to a TensorFlow Serving model and print the prediction
#[derive(Debug, Clone, Parser)]
#[command(name = "serving-client", version, about)]
pub struct Cli {
    /// Image file to send
    pub image: Option<PathBuf>,

    /// The tensorflow serving address [default: localhost:9000]
    #[arg(long, value_name = "ADDR")]
    pub serving_address: Option<String>,

    /// Model name [default: inception]
    #[arg(long)]
    pub model_name: Option<String>,

    /// Signature to evaluate [default: predict_images]
    #[arg(long)]
    pub signature_name: Option<String>,

    /// Model version to pin; 0 lets the server pick the latest [default: 1]
    #[arg(long)]
    pub model_version: Option<i64>,

    /// Input slot the image is bound to [default: images]
    #[arg(long)]
    pub input_slot: Option<String>,

    /// Only return these outputs (repeatable)
    #[arg(long = "output-filter", value_name = "NAME")]
    pub output_filter: Vec<String>,

    /// Abort the predict call after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Abort connecting after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,

    /// How to print the response [default: debug]
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// TOML settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Image path, or the usage line when it was not given
    pub fn image_path(&self) -> Result<&Path, String> {
        self.image.as_deref().ok_or_else(|| usage(&program_name()))
    }
}

/// Usage line shown when the image argument is missing
pub fn usage(program: &str) -> String {
    format!("Usage: {} --serving-address localhost:9000 path/to/img.png", program)
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| "serving-client".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_yields_usage() {
        let cli = Cli::try_parse_from(["serving-client"]).unwrap();
        let usage = cli.image_path().unwrap_err();
        assert!(usage.starts_with("Usage: "));
        assert!(usage.contains("--serving-address localhost:9000 path/to/img.png"));
    }

    #[test]
    fn test_flags_parsed() {
        let cli = Cli::try_parse_from([
            "serving-client",
            "--serving-address",
            "serving:8500",
            "--model-version",
            "3",
            "--output-filter",
            "classes",
            "--output-filter",
            "scores",
            "--format",
            "json",
            "cat.jpg",
        ])
        .unwrap();

        assert_eq!(cli.image_path().unwrap(), Path::new("cat.jpg"));
        assert_eq!(cli.serving_address.as_deref(), Some("serving:8500"));
        assert_eq!(cli.model_version, Some(3));
        assert_eq!(cli.output_filter, vec!["classes", "scores"]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_extra_positional_rejected() {
        assert!(Cli::try_parse_from(["serving-client", "a.png", "b.png"]).is_err());
    }
}
