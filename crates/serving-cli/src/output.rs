//! Response Rendering

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serving_proto::PredictResponse;
use tensor_encoder::{TensorData, TensorValue};

/// How the response is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Protobuf debug dump
    Debug,
    /// Decoded outputs as JSON
    Json,
}

impl OutputFormat {
    /// Settings/CLI spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Debug => "debug",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseReport {
    model: Option<ModelReport>,
    outputs: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct ModelReport {
    name: String,
    signature_name: String,
    version: Option<i64>,
}

/// Render a response for the terminal
pub fn render(response: &PredictResponse, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Debug => Ok(format!("{:#?}", response)),
        OutputFormat::Json => {
            let report = ResponseReport {
                model: response.model_spec.as_ref().map(|spec| ModelReport {
                    name: spec.name.clone(),
                    signature_name: spec.signature_name.clone(),
                    version: spec.version,
                }),
                outputs: response
                    .outputs
                    .iter()
                    .map(|(name, tensor)| (name.clone(), tensor_json(tensor.clone())))
                    .collect(),
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// One output tensor as JSON; tensors that cannot be decoded carry the reason
fn tensor_json(tensor: serving_proto::TensorProto) -> Value {
    let dtype = tensor.dtype().as_str_name();
    match TensorValue::try_from(tensor) {
        Ok(value) => {
            let values = match value.data() {
                TensorData::Strings(v) => json!(v
                    .iter()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect::<Vec<_>>()),
                TensorData::Floats(v) => json!(v),
                TensorData::Doubles(v) => json!(v),
                TensorData::Int32s(v) => json!(v),
                TensorData::Int64s(v) => json!(v),
                TensorData::Bools(v) => json!(v),
            };
            json!({
                "dtype": dtype,
                "shape": value.shape().dims(),
                "values": values,
            })
        }
        Err(e) => json!({
            "dtype": dtype,
            "error": e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serving_proto::{DataType, ModelSpec, TensorProto};
    use tensor_encoder::TensorValue;

    fn inception_response() -> PredictResponse {
        let mut response = PredictResponse {
            model_spec: Some(ModelSpec {
                name: "inception".to_string(),
                version: Some(1),
                signature_name: "predict_images".to_string(),
            }),
            ..Default::default()
        };
        response.outputs.insert(
            "classes".to_string(),
            TensorValue::strings(vec![b"tabby".to_vec(), b"tiger cat".to_vec()], vec![1, 2])
                .unwrap()
                .into(),
        );
        response.outputs.insert(
            "scores".to_string(),
            TensorValue::floats(vec![0.75, 0.25], vec![1, 2]).unwrap().into(),
        );
        response
    }

    #[test]
    fn test_json_report() {
        let text = render(&inception_response(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed["model"]["name"], "inception");
        assert_eq!(parsed["model"]["version"], 1);
        assert_eq!(parsed["outputs"]["classes"]["dtype"], "DT_STRING");
        assert_eq!(parsed["outputs"]["classes"]["values"][1], "tiger cat");
        assert_eq!(parsed["outputs"]["scores"]["shape"], json!([1, 2]));
        assert_eq!(parsed["outputs"]["scores"]["values"][0], 0.75);
    }

    #[test]
    fn test_undecodable_output_reports_error() {
        let mut response = PredictResponse::default();
        response.outputs.insert(
            "half".to_string(),
            TensorProto {
                dtype: DataType::DtHalf as i32,
                ..Default::default()
            },
        );

        let text = render(&response, OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["outputs"]["half"]["dtype"], "DT_HALF");
        assert!(parsed["outputs"]["half"]["error"].is_string());
    }

    #[test]
    fn test_oversized_broadcast_reports_error() {
        let mut response = PredictResponse::default();
        response.outputs.insert(
            "scores".to_string(),
            TensorProto {
                dtype: DataType::DtFloat as i32,
                tensor_shape: Some(tensor_encoder::TensorShape::vector(1 << 40).into()),
                float_val: vec![1.0],
                ..Default::default()
            },
        );

        let text = render(&response, OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["outputs"]["scores"]["dtype"], "DT_FLOAT");
        assert!(parsed["outputs"]["scores"]["error"]
            .as_str()
            .unwrap()
            .contains("exceeds limit"));
    }

    #[test]
    fn test_debug_dump_names_outputs() {
        let text = render(&inception_response(), OutputFormat::Debug).unwrap();
        assert!(text.contains("PredictResponse"));
        assert!(text.contains("scores"));
    }
}
