//! TensorProto Conversion

use crate::error::EncodingError;
use crate::value::{TensorData, TensorShape, TensorValue};
use serving_proto::{tensor_shape_proto, DataType, TensorProto, TensorShapeProto};
use tracing::debug;

/// Largest element count a single broadcast value may be expanded to
pub const MAX_BROADCAST_ELEMENTS: usize = 1 << 24;

impl From<TensorShape> for TensorShapeProto {
    fn from(shape: TensorShape) -> Self {
        TensorShapeProto {
            dim: shape
                .dims()
                .iter()
                .map(|&size| tensor_shape_proto::Dim {
                    size: size as i64,
                    name: String::new(),
                })
                .collect(),
            unknown_rank: false,
        }
    }
}

impl TryFrom<Option<TensorShapeProto>> for TensorShape {
    type Error = EncodingError;

    fn try_from(proto: Option<TensorShapeProto>) -> Result<Self, Self::Error> {
        let Some(proto) = proto else {
            return Ok(TensorShape::scalar());
        };
        if proto.unknown_rank {
            return Err(EncodingError::InvalidShape("unknown rank".to_string()));
        }
        let dims = proto
            .dim
            .iter()
            .map(|d| {
                u64::try_from(d.size).map_err(|_| {
                    EncodingError::InvalidShape(format!("dimension size {}", d.size))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TensorShape::new(dims))
    }
}

impl From<TensorValue> for TensorProto {
    fn from(value: TensorValue) -> Self {
        let dtype = value.dtype();
        let (shape, data) = value.into_parts();
        let mut proto = TensorProto {
            dtype: dtype as i32,
            tensor_shape: Some(shape.into()),
            ..Default::default()
        };
        match data {
            TensorData::Strings(v) => proto.string_val = v,
            TensorData::Floats(v) => proto.float_val = v,
            TensorData::Doubles(v) => proto.double_val = v,
            TensorData::Int32s(v) => proto.int_val = v,
            TensorData::Int64s(v) => proto.int64_val = v,
            TensorData::Bools(v) => proto.bool_val = v,
        }
        proto
    }
}

impl TryFrom<TensorProto> for TensorValue {
    type Error = EncodingError;

    /// Decode a tensor returned by the server.
    ///
    /// Numeric values may arrive either in the typed repeated field or packed
    /// little-endian in `tensor_content`. A single typed value with a larger
    /// shape is broadcast, the way the server fills constant tensors.
    fn try_from(proto: TensorProto) -> Result<Self, Self::Error> {
        let dtype = DataType::try_from(proto.dtype)
            .map_err(|_| EncodingError::UnsupportedDtype(format!("enum value {}", proto.dtype)))?;
        let shape = TensorShape::try_from(proto.tensor_shape)?;
        let expected = usize::try_from(shape.num_elements()?).map_err(|_| {
            EncodingError::InvalidShape(format!("{:?} does not fit in memory", shape.dims()))
        })?;
        let content = proto.tensor_content;

        let data = match dtype {
            DataType::DtString => TensorData::Strings(fill(proto.string_val, expected)?),
            DataType::DtFloat => TensorData::Floats(typed_or_content(
                proto.float_val,
                &content,
                expected,
                "DT_FLOAT",
                |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            )?),
            DataType::DtDouble => TensorData::Doubles(typed_or_content(
                proto.double_val,
                &content,
                expected,
                "DT_DOUBLE",
                |b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
            )?),
            DataType::DtInt32 => TensorData::Int32s(typed_or_content(
                proto.int_val,
                &content,
                expected,
                "DT_INT32",
                |b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            )?),
            DataType::DtInt64 => TensorData::Int64s(typed_or_content(
                proto.int64_val,
                &content,
                expected,
                "DT_INT64",
                |b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
            )?),
            DataType::DtBool => TensorData::Bools(typed_or_content(
                proto.bool_val,
                &content,
                expected,
                "DT_BOOL",
                |b| b[0] != 0,
            )?),
            other => return Err(EncodingError::UnsupportedDtype(other.as_str_name().to_string())),
        };

        TensorValue::new(data, shape)
    }
}

/// Repeat a lone value to fill `expected` slots
fn fill<T: Clone>(mut values: Vec<T>, expected: usize) -> Result<Vec<T>, EncodingError> {
    if values.len() == 1 && expected > 1 {
        if expected > MAX_BROADCAST_ELEMENTS {
            return Err(EncodingError::InvalidShape(format!(
                "broadcast to {} elements exceeds limit of {}",
                expected, MAX_BROADCAST_ELEMENTS
            )));
        }
        debug!("Broadcasting single value to {} elements", expected);
        let first = values[0].clone();
        values.resize(expected, first);
    }
    Ok(values)
}

fn typed_or_content<T: Clone>(
    typed: Vec<T>,
    content: &[u8],
    expected: usize,
    dtype: &'static str,
    read: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>, EncodingError> {
    if content.is_empty() {
        return fill(typed, expected);
    }
    let width = std::mem::size_of::<T>();
    if content.len() % width != 0 {
        return Err(EncodingError::MalformedContent {
            dtype,
            len: content.len(),
            width,
        });
    }
    Ok(content.chunks_exact(width).map(read).collect())
}
