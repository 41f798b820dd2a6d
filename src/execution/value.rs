//! Numeric values exchanged with the engine.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{BctError, Result};

/// Dense n-dimensional array of `f64`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(BctError::MalformedData(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(BctError::MalformedData("ragged rows".into()));
        }
        Self::new(vec![n_rows, n_cols], rows.into_iter().flatten().collect())
    }

    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn scalar(value: f64) -> Self {
        Self {
            shape: vec![1, 1],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.shape.len() == 2 && self.shape[0] == self.shape[1]
    }

    /// Element at `(row, col)` of a 2-D array.
    pub fn get2(&self, row: usize, col: usize) -> Option<f64> {
        if self.shape.len() != 2 || row >= self.shape[0] || col >= self.shape[1] {
            return None;
        }
        self.data.get(row * self.shape[1] + col).copied()
    }

    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.shape[0];
        (0..n).all(|i| (i + 1..n).all(|j| self.get2(i, j) == self.get2(j, i)))
    }

    /// Nested JSON lists, one level per dimension.
    pub fn to_json(&self) -> Value {
        fn nest(shape: &[usize], data: &[f64]) -> Value {
            match shape.split_first() {
                None => number(data.first().copied().unwrap_or(f64::NAN)),
                Some((_, [])) => Value::Array(data.iter().copied().map(number).collect()),
                Some((&n, rest)) => {
                    let stride: usize = rest.iter().product();
                    Value::Array(
                        (0..n)
                            .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                            .collect(),
                    )
                }
            }
        }
        nest(&self.shape, &self.data)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let mut shape = Vec::new();
        let mut cursor = value;
        while let Value::Array(items) = cursor {
            shape.push(items.len());
            match items.first() {
                Some(first) => cursor = first,
                None => break,
            }
        }
        let mut data = Vec::with_capacity(element_count(&shape)?);
        flatten(value, 0, &shape, &mut data)?;
        Self::new(shape, data)
    }
}

/// Number of elements a shape holds; overflow means the shape is bogus.
pub fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| BctError::MalformedData(format!("shape {shape:?} is too large")))
}

fn flatten(value: &Value, depth: usize, shape: &[usize], out: &mut Vec<f64>) -> Result<()> {
    match (value, shape.get(depth)) {
        (Value::Array(items), Some(&n)) if items.len() == n => {
            for item in items {
                flatten(item, depth + 1, shape, out)?;
            }
            Ok(())
        }
        (Value::Array(_), _) => Err(BctError::MalformedData("ragged nested array".into())),
        (scalar, None) => {
            out.push(scalar_from_json(scalar)?);
            Ok(())
        }
        (_, Some(_)) => Err(BctError::MalformedData("ragged nested array".into())),
    }
}

// JSON has no NaN; serde_json writes it as null and we read it back the same way.
fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn scalar_from_json(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| BctError::MalformedData(format!("unrepresentable number {n}"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(f64::NAN),
        other => Err(BctError::MalformedData(format!("expected a number, got {other}"))),
    }
}

impl Serialize for NumericArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NumericArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

/// A parameter or result crossing the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Scalar(f64),
    Array(NumericArray),
}

impl EngineValue {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Scalar(_) => vec![1, 1],
            Self::Array(a) => a.shape().to_vec(),
        }
    }

    /// The single element of a scalar or one-element array.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Array(a) if a.len() == 1 => a.data().first().copied(),
            Self::Array(_) => None,
        }
    }

    pub fn into_array(self) -> NumericArray {
        match self {
            Self::Scalar(v) => NumericArray::scalar(v),
            Self::Array(a) => a,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(v) => number(*v),
            Self::Array(a) => a.to_json(),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(_) => NumericArray::from_json(value).map(Self::Array),
            other => scalar_from_json(other).map(Self::Scalar),
        }
    }
}

impl From<f64> for EngineValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<NumericArray> for EngineValue {
    fn from(a: NumericArray) -> Self {
        Self::Array(a)
    }
}

impl Serialize for EngineValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EngineValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(NumericArray::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_nested_json_shape() {
        let a = NumericArray::from_json(&json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]]])).unwrap();
        assert_eq!(a.shape(), &[2, 2, 2]);
        assert_eq!(a.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(a.to_json(), json!([[[1.0, 2.0], [3.0, 4.0]], [[5.0, 6.0], [7.0, 8.0]]]));
    }

    #[test]
    fn test_oversized_shape_is_malformed() {
        let err = NumericArray::new(vec![usize::MAX, 2], Vec::new()).unwrap_err();
        assert!(matches!(err, BctError::MalformedData(_)));
        assert_eq!(element_count(&[2, 3, 4]).unwrap(), 24);
    }

    #[test]
    fn test_null_reads_as_nan() {
        let a = NumericArray::from_json(&json!([1, null])).unwrap();
        assert!(a.data()[1].is_nan());
    }

    #[test]
    fn test_symmetry() {
        let sym = NumericArray::from_rows(vec![vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        let dir = NumericArray::from_rows(vec![vec![0.0, 2.0], vec![1.0, 0.0]]).unwrap();
        assert!(sym.is_symmetric());
        assert!(!dir.is_symmetric());
        assert!(!NumericArray::vector(vec![1.0, 2.0]).is_symmetric());
    }

    #[test]
    fn test_engine_value_scalar_access() {
        assert_eq!(EngineValue::Scalar(0.5).as_scalar(), Some(0.5));
        assert_eq!(EngineValue::Array(NumericArray::scalar(3.0)).as_scalar(), Some(3.0));
        assert_eq!(EngineValue::Array(NumericArray::vector(vec![1.0, 2.0])).as_scalar(), None);
        assert_eq!(EngineValue::from_json(&json!(0.42)).unwrap(), EngineValue::Scalar(0.42));
    }
}
