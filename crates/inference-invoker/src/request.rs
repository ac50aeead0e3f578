//! Predict Request Assembly

use std::collections::BTreeMap;

use crate::error::InvokerError;
use crate::selector::ModelSelector;
use serving_proto::{PredictRequest, TensorProto};
use tensor_encoder::{EncodingError, TensorData, TensorShape, TensorValue};

/// A validated predict request: selector plus named input tensors.
///
/// Whether the slot names match the model's signature is only known to the
/// server; a mismatch comes back as a remote error.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    selector: ModelSelector,
    inputs: BTreeMap<String, TensorValue>,
    output_filter: Vec<String>,
}

impl InferenceRequest {
    /// Start building a request for `selector`
    pub fn builder(selector: ModelSelector) -> InferenceRequestBuilder {
        InferenceRequestBuilder {
            selector,
            inputs: BTreeMap::new(),
            output_filter: Vec::new(),
            encoding_error: None,
        }
    }

    /// Target model
    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Input tensors by slot name
    pub fn inputs(&self) -> &BTreeMap<String, TensorValue> {
        &self.inputs
    }

    /// Requested outputs; empty means all
    pub fn output_filter(&self) -> &[String] {
        &self.output_filter
    }

    /// Wire form of the request
    pub fn into_proto(self) -> PredictRequest {
        PredictRequest {
            model_spec: Some(self.selector.into()),
            inputs: self
                .inputs
                .into_iter()
                .map(|(slot, value)| (slot, TensorProto::from(value)))
                .collect(),
            output_filter: self.output_filter,
        }
    }
}

/// Builder for [`InferenceRequest`]
#[derive(Debug, Clone)]
pub struct InferenceRequestBuilder {
    selector: ModelSelector,
    inputs: BTreeMap<String, TensorValue>,
    output_filter: Vec<String>,
    encoding_error: Option<EncodingError>,
}

impl InferenceRequestBuilder {
    /// Bind a tensor to an input slot. A repeated slot replaces the earlier tensor.
    pub fn input(mut self, slot: impl Into<String>, value: TensorValue) -> Self {
        self.inputs.insert(slot.into(), value);
        self
    }

    /// Build a tensor from raw parts and bind it to `slot`.
    ///
    /// A data/shape mismatch is held back and reported by [`build`](Self::build)
    /// as [`InvokerError::Encoding`].
    pub fn tensor(
        mut self,
        slot: impl Into<String>,
        data: TensorData,
        shape: impl Into<TensorShape>,
    ) -> Self {
        match TensorValue::new(data, shape) {
            Ok(value) => self.input(slot, value),
            Err(e) => {
                self.encoding_error.get_or_insert(e);
                self
            }
        }
    }

    /// Bind several slots at once
    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = (S, TensorValue)>,
        S: Into<String>,
    {
        self.inputs
            .extend(inputs.into_iter().map(|(slot, value)| (slot.into(), value)));
        self
    }

    /// Restrict which outputs the server returns
    pub fn output_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_filter = names.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and produce the request. Never touches the network.
    pub fn build(self) -> Result<InferenceRequest, InvokerError> {
        self.selector.validate()?;
        if let Some(e) = self.encoding_error {
            return Err(e.into());
        }

        if self.inputs.is_empty() {
            return Err(InvokerError::InvalidRequest("no input tensors".to_string()));
        }
        if self.inputs.keys().any(|slot| slot.trim().is_empty()) {
            return Err(InvokerError::InvalidRequest("input slot name is empty".to_string()));
        }
        if self.output_filter.iter().any(|name| name.trim().is_empty()) {
            return Err(InvokerError::InvalidRequest("output filter name is empty".to_string()));
        }

        Ok(InferenceRequest {
            selector: self.selector,
            inputs: self.inputs,
            output_filter: self.output_filter,
        })
    }
}
