//! Typed Tensor Values

use crate::error::EncodingError;
use serving_proto::DataType;

/// Ordered, non-negative dimension sizes. An empty shape is a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TensorShape {
    dims: Vec<u64>,
}

impl TensorShape {
    /// Create a shape from its dimensions, outermost first
    pub fn new(dims: Vec<u64>) -> Self {
        Self { dims }
    }

    /// Zero-dimensional shape holding a single element
    pub fn scalar() -> Self {
        Self::default()
    }

    /// One-dimensional shape of length `len`
    pub fn vector(len: u64) -> Self {
        Self { dims: vec![len] }
    }

    /// Dimension sizes
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total element count, or an error if it overflows
    pub fn num_elements(&self) -> Result<u64, EncodingError> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| EncodingError::ShapeOverflow(self.dims.clone()))
    }
}

impl From<Vec<u64>> for TensorShape {
    fn from(dims: Vec<u64>) -> Self {
        Self::new(dims)
    }
}

/// Flattened tensor elements, row-major. The variant fixes the dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Opaque byte strings (`DT_STRING`)
    Strings(Vec<Vec<u8>>),
    /// `DT_FLOAT`
    Floats(Vec<f32>),
    /// `DT_DOUBLE`
    Doubles(Vec<f64>),
    /// `DT_INT32`
    Int32s(Vec<i32>),
    /// `DT_INT64`
    Int64s(Vec<i64>),
    /// `DT_BOOL`
    Bools(Vec<bool>),
}

impl TensorData {
    /// Wire dtype for this variant
    pub fn dtype(&self) -> DataType {
        match self {
            TensorData::Strings(_) => DataType::DtString,
            TensorData::Floats(_) => DataType::DtFloat,
            TensorData::Doubles(_) => DataType::DtDouble,
            TensorData::Int32s(_) => DataType::DtInt32,
            TensorData::Int64s(_) => DataType::DtInt64,
            TensorData::Bools(_) => DataType::DtBool,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            TensorData::Strings(v) => v.len(),
            TensorData::Floats(v) => v.len(),
            TensorData::Doubles(v) => v.len(),
            TensorData::Int32s(v) => v.len(),
            TensorData::Int64s(v) => v.len(),
            TensorData::Bools(v) => v.len(),
        }
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A tensor whose element count always agrees with its shape.
///
/// Only the checked constructors below produce values, so every
/// `TensorValue` in circulation is well formed.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorValue {
    shape: TensorShape,
    data: TensorData,
}

impl TensorValue {
    /// Pair data with a shape, checking the element count
    pub fn new(data: TensorData, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        let shape = shape.into();
        let expected = shape.num_elements()?;
        if expected != data.len() as u64 {
            return Err(EncodingError::ShapeMismatch {
                shape: shape.dims().to_vec(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Byte-string tensor
    pub fn strings(values: Vec<Vec<u8>>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Strings(values), shape)
    }

    /// f32 tensor
    pub fn floats(values: Vec<f32>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Floats(values), shape)
    }

    /// f64 tensor
    pub fn doubles(values: Vec<f64>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Doubles(values), shape)
    }

    /// i32 tensor
    pub fn int32s(values: Vec<i32>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Int32s(values), shape)
    }

    /// i64 tensor
    pub fn int64s(values: Vec<i64>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Int64s(values), shape)
    }

    /// bool tensor
    pub fn bools(values: Vec<bool>, shape: impl Into<TensorShape>) -> Result<Self, EncodingError> {
        Self::new(TensorData::Bools(values), shape)
    }

    /// Element type
    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    /// Shape
    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    /// Elements
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Byte-string elements, if this is a string tensor
    pub fn as_strings(&self) -> Option<&[Vec<u8>]> {
        match &self.data {
            TensorData::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Split into shape and data
    pub fn into_parts(self) -> (TensorShape, TensorData) {
        (self.shape, self.data)
    }
}
