//! Model Selection

use crate::error::InvokerError;
use serving_proto::ModelSpec;

/// Which deployed model, signature and version a request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    /// Servable name
    pub name: String,
    /// Signature to evaluate
    pub signature: String,
    /// Pinned model version; `None` lets the server pick the latest
    pub version: Option<i64>,
}

impl ModelSelector {
    /// Create a selector, validating it up front
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        version: Option<i64>,
    ) -> Result<Self, InvokerError> {
        let selector = Self {
            name: name.into(),
            signature: signature.into(),
            version,
        };
        selector.validate()?;
        Ok(selector)
    }

    /// The inception example model: `inception`/`predict_images`, version 1
    pub fn inception() -> Self {
        Self {
            name: "inception".to_string(),
            signature: "predict_images".to_string(),
            version: Some(1),
        }
    }

    /// Check that name and signature are present and version is positive
    pub fn validate(&self) -> Result<(), InvokerError> {
        if self.name.trim().is_empty() {
            return Err(InvokerError::InvalidRequest("model name is empty".to_string()));
        }
        if self.signature.trim().is_empty() {
            return Err(InvokerError::InvalidRequest("signature name is empty".to_string()));
        }
        if let Some(version) = self.version {
            if version <= 0 {
                return Err(InvokerError::InvalidRequest(format!(
                    "model version must be positive, got {}",
                    version
                )));
            }
        }
        Ok(())
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::inception()
    }
}

impl From<ModelSelector> for ModelSpec {
    fn from(selector: ModelSelector) -> Self {
        ModelSpec {
            name: selector.name,
            version: selector.version,
            signature_name: selector.signature,
        }
    }
}
