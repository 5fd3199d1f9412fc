//! Batched key-value container of tensors.
//!
//! A [`StepRecord`] carries observations, actions, rewards and termination
//! flags between environment calls. Every tensor in a record shares the
//! leading dimensions given by the batch size of the record; a record with
//! batch size `[]` holds a single step, a record with batch size `[T]` holds
//! a trajectory of `T` steps.
//!
//! ```
//! use gridplan_core::{StepRecord, Tensor};
//! use ndarray::{arr1, ArrayD, IxDyn};
//!
//! let mut record = StepRecord::new(vec![]);
//! record.insert("action", arr1(&[0f32, 1.0, 0.0, 0.0]).into_dyn()).unwrap();
//!
//! let mut next = StepRecord::new(vec![]);
//! next.insert("reward", ArrayD::from_elem(IxDyn(&[1]), -1f32)).unwrap();
//! record.insert_record("next", next).unwrap();
//!
//! assert_eq!(record.get_f32("next.reward").unwrap()[[0]], -1.0);
//! ```
use crate::error::GridplanError;
use ndarray::{ArrayD, ArrayViewD, Axis};
use std::{collections::BTreeMap, fmt};

/// A tensor stored in a [`StepRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// 32-bit floating point values.
    F32(ArrayD<f32>),

    /// 64-bit integer values.
    I64(ArrayD<i64>),

    /// Boolean values.
    Bool(ArrayD<bool>),
}

impl Tensor {
    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(a) => a.shape(),
            Self::I64(a) => a.shape(),
            Self::Bool(a) => a.shape(),
        }
    }

    /// Name of the element type.
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::I64(_) => "i64",
            Self::Bool(_) => "bool",
        }
    }

    fn stack(key: &str, tensors: &[&Tensor]) -> Result<Tensor, GridplanError> {
        fn stack_arrays<T: Clone>(
            key: &str,
            views: Vec<ArrayViewD<T>>,
        ) -> Result<ArrayD<T>, GridplanError> {
            ndarray::stack(Axis(0), &views)
                .map_err(|e| GridplanError::StackError(format!("{}: {}", key, e)))
        }

        let type_error = || GridplanError::StackError(format!("{}: mixed element types", key));

        match tensors.first() {
            None => Err(GridplanError::StackError("no records".to_string())),
            Some(Tensor::F32(_)) => {
                let views = tensors
                    .iter()
                    .map(|t| match t {
                        Tensor::F32(a) => Ok(a.view()),
                        _ => Err(type_error()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tensor::F32(stack_arrays(key, views)?))
            }
            Some(Tensor::I64(_)) => {
                let views = tensors
                    .iter()
                    .map(|t| match t {
                        Tensor::I64(a) => Ok(a.view()),
                        _ => Err(type_error()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tensor::I64(stack_arrays(key, views)?))
            }
            Some(Tensor::Bool(_)) => {
                let views = tensors
                    .iter()
                    .map(|t| match t {
                        Tensor::Bool(a) => Ok(a.view()),
                        _ => Err(type_error()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tensor::Bool(stack_arrays(key, views)?))
            }
        }
    }

    /// Overwrites the `i`-th slice along the first axis with `src`.
    fn assign_row(&mut self, key: &str, i: usize, src: &Tensor) -> Result<(), GridplanError> {
        let shape = self.shape();
        if shape.is_empty() || i >= shape[0] || shape[1..] != *src.shape() {
            return Err(GridplanError::BatchSizeMismatch {
                key: format!("{}[{}]", key, i),
                shape: src.shape().to_vec(),
                batch_size: shape.to_vec(),
            });
        }

        match (self, src) {
            (Tensor::F32(a), Tensor::F32(b)) => a.index_axis_mut(Axis(0), i).assign(b),
            (Tensor::I64(a), Tensor::I64(b)) => a.index_axis_mut(Axis(0), i).assign(b),
            (Tensor::Bool(a), Tensor::Bool(b)) => a.index_axis_mut(Axis(0), i).assign(b),
            (dst, _) => {
                return Err(GridplanError::FieldTypeError {
                    key: key.to_string(),
                    expected: dst.dtype().to_string(),
                })
            }
        }
        Ok(())
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(a: ArrayD<f32>) -> Self {
        Self::F32(a)
    }
}

impl From<ArrayD<i64>> for Tensor {
    fn from(a: ArrayD<i64>) -> Self {
        Self::I64(a)
    }
}

impl From<ArrayD<bool>> for Tensor {
    fn from(a: ArrayD<bool>) -> Self {
        Self::Bool(a)
    }
}

/// A value in a [`StepRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A tensor.
    Tensor(Tensor),

    /// A nested record sharing the batch size of its parent.
    Record(StepRecord),
}

/// A batched key-value container of tensors.
///
/// Nested values are addressed with dotted paths, e.g., `"next.observation"`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    batch_size: Vec<usize>,
    fields: BTreeMap<String, Field>,
}

impl StepRecord {
    /// Creates an empty record with the given batch size.
    pub fn new(batch_size: impl Into<Vec<usize>>) -> Self {
        Self {
            batch_size: batch_size.into(),
            fields: BTreeMap::new(),
        }
    }

    /// The batch size shared by all fields.
    pub fn batch_size(&self) -> &[usize] {
        &self.batch_size
    }

    /// Returns `true` if the record has no field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys of the top-level fields in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Dotted paths of all tensors, including those in nested records.
    pub fn leaf_keys(&self) -> Vec<String> {
        let mut keys = vec![];
        for (k, v) in self.fields.iter() {
            match v {
                Field::Tensor(_) => keys.push(k.clone()),
                Field::Record(r) => keys.extend(
                    r.leaf_keys()
                        .into_iter()
                        .map(|sub| format!("{}.{}", k, sub)),
                ),
            }
        }
        keys
    }

    /// Inserts a tensor.
    ///
    /// The leading dimensions of the tensor must be equal to the batch size.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        tensor: impl Into<Tensor>,
    ) -> Result<(), GridplanError> {
        let key = key.into();
        let tensor = tensor.into();
        let shape = tensor.shape();
        let n = self.batch_size.len();

        if shape.len() < n || shape[..n] != self.batch_size[..] {
            return Err(GridplanError::BatchSizeMismatch {
                key,
                shape: shape.to_vec(),
                batch_size: self.batch_size.clone(),
            });
        }

        self.fields.insert(key, Field::Tensor(tensor));
        Ok(())
    }

    /// Inserts a tensor and returns the record.
    pub fn with(
        mut self,
        key: impl Into<String>,
        tensor: impl Into<Tensor>,
    ) -> Result<Self, GridplanError> {
        self.insert(key, tensor)?;
        Ok(self)
    }

    /// Inserts a nested record, which must have the same batch size.
    pub fn insert_record(
        &mut self,
        key: impl Into<String>,
        record: StepRecord,
    ) -> Result<(), GridplanError> {
        let key = key.into();
        if record.batch_size != self.batch_size {
            return Err(GridplanError::BatchSizeMismatch {
                key,
                shape: record.batch_size,
                batch_size: self.batch_size.clone(),
            });
        }
        self.fields.insert(key, Field::Record(record));
        Ok(())
    }

    /// Removes a top-level field.
    pub fn remove(&mut self, key: &str) -> Option<Field> {
        self.fields.remove(key)
    }

    /// Returns `true` if a value exists at the path.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Gets the value at a dotted path.
    pub fn get(&self, path: &str) -> Result<&Field, GridplanError> {
        let not_found = || GridplanError::FieldNotFound(path.to_string());
        let mut parts = path.split('.');
        let first = parts.next().ok_or_else(not_found)?;
        let mut field = self.fields.get(first).ok_or_else(not_found)?;

        for part in parts {
            field = match field {
                Field::Record(r) => r.fields.get(part).ok_or_else(not_found)?,
                Field::Tensor(_) => return Err(not_found()),
            };
        }

        Ok(field)
    }

    fn get_mut(&mut self, path: &str) -> Result<&mut Field, GridplanError> {
        let not_found = || GridplanError::FieldNotFound(path.to_string());
        let mut parts = path.split('.');
        let first = parts.next().ok_or_else(not_found)?;
        let mut field = self.fields.get_mut(first).ok_or_else(not_found)?;

        for part in parts {
            field = match field {
                Field::Record(r) => r.fields.get_mut(part).ok_or_else(not_found)?,
                Field::Tensor(_) => return Err(not_found()),
            };
        }

        Ok(field)
    }

    /// Gets the tensor at a dotted path.
    pub fn get_tensor(&self, path: &str) -> Result<&Tensor, GridplanError> {
        match self.get(path)? {
            Field::Tensor(t) => Ok(t),
            Field::Record(_) => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "tensor".to_string(),
            }),
        }
    }

    /// Gets the nested record at a dotted path.
    pub fn get_record(&self, path: &str) -> Result<&StepRecord, GridplanError> {
        match self.get(path)? {
            Field::Record(r) => Ok(r),
            Field::Tensor(_) => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "record".to_string(),
            }),
        }
    }

    /// Gets an `f32` tensor at a dotted path.
    pub fn get_f32(&self, path: &str) -> Result<&ArrayD<f32>, GridplanError> {
        match self.get_tensor(path)? {
            Tensor::F32(a) => Ok(a),
            _ => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "f32".to_string(),
            }),
        }
    }

    /// Gets an `i64` tensor at a dotted path.
    pub fn get_i64(&self, path: &str) -> Result<&ArrayD<i64>, GridplanError> {
        match self.get_tensor(path)? {
            Tensor::I64(a) => Ok(a),
            _ => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "i64".to_string(),
            }),
        }
    }

    /// Gets a `bool` tensor at a dotted path.
    pub fn get_bool(&self, path: &str) -> Result<&ArrayD<bool>, GridplanError> {
        match self.get_tensor(path)? {
            Tensor::Bool(a) => Ok(a),
            _ => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "bool".to_string(),
            }),
        }
    }

    /// Writes `tensor` into the `i`-th batch element of the tensor at `path`.
    ///
    /// The record must have a one-dimensional batch size, as trajectories do.
    pub fn set_row(
        &mut self,
        path: &str,
        i: usize,
        tensor: impl Into<Tensor>,
    ) -> Result<(), GridplanError> {
        let tensor = tensor.into();
        match self.get_mut(path)? {
            Field::Tensor(t) => t.assign_row(path, i, &tensor),
            Field::Record(_) => Err(GridplanError::FieldTypeError {
                key: path.to_string(),
                expected: "tensor".to_string(),
            }),
        }
    }

    /// Returns a record with the given top-level keys only.
    pub fn select(&self, keys: &[&str]) -> Result<StepRecord, GridplanError> {
        let mut record = StepRecord::new(self.batch_size.clone());
        for &k in keys {
            let field = self
                .fields
                .get(k)
                .ok_or_else(|| GridplanError::FieldNotFound(k.to_string()))?;
            record.fields.insert(k.to_string(), field.clone());
        }
        Ok(record)
    }

    /// Stacks records along a new leading batch dimension.
    ///
    /// All records must have the same batch size and the same structure.
    pub fn stack(records: &[StepRecord]) -> Result<StepRecord, GridplanError> {
        let first = records
            .first()
            .ok_or_else(|| GridplanError::StackError("no records".to_string()))?;

        for r in records.iter() {
            if r.batch_size != first.batch_size {
                return Err(GridplanError::StackError(format!(
                    "batch size {:?} differs from {:?}",
                    r.batch_size, first.batch_size
                )));
            }
            if r.fields.keys().ne(first.fields.keys()) {
                return Err(GridplanError::StackError("keys differ".to_string()));
            }
        }

        let mut batch_size = vec![records.len()];
        batch_size.extend(first.batch_size.iter());
        let mut stacked = StepRecord::new(batch_size);

        for (k, v) in first.fields.iter() {
            let field = match v {
                Field::Tensor(_) => {
                    let tensors = records
                        .iter()
                        .map(|r| r.get_tensor(k))
                        .collect::<Result<Vec<_>, _>>()?;
                    Field::Tensor(Tensor::stack(k, &tensors)?)
                }
                Field::Record(_) => {
                    let subs = records
                        .iter()
                        .map(|r| r.get_record(k).map(|s| s.clone()))
                        .collect::<Result<Vec<_>, _>>()?;
                    Field::Record(StepRecord::stack(&subs)?)
                }
            };
            stacked.fields.insert(k.clone(), field);
        }

        Ok(stacked)
    }

    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        writeln!(f, "StepRecord(")?;
        writeln!(f, "{}    fields={{", pad)?;
        for (k, v) in self.fields.iter() {
            match v {
                Field::Tensor(t) => writeln!(
                    f,
                    "{}        {}: Tensor(shape={:?}, dtype={}),",
                    pad,
                    k,
                    t.shape(),
                    t.dtype()
                )?,
                Field::Record(r) => {
                    write!(f, "{}        {}: ", pad, k)?;
                    r.fmt_indent(f, indent + 8)?;
                }
            }
        }
        writeln!(f, "{}    }},", pad)?;
        writeln!(f, "{}    batch_size={:?})", pad, self.batch_size)
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indent(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array, IxDyn};

    fn step(obs: usize, reward: f32) -> StepRecord {
        let mut o = Array::zeros(IxDyn(&[4]));
        o[[obs]] = 1f32;
        let mut next = StepRecord::new(vec![]);
        next.insert("observation", o).unwrap();
        next.insert("reward", ArrayD::from_elem(IxDyn(&[1]), reward))
            .unwrap();
        next.insert("done", ArrayD::from_elem(IxDyn(&[1]), false))
            .unwrap();
        let mut r = StepRecord::new(vec![]);
        r.insert("action", ArrayD::from_elem(IxDyn(&[1]), 2i64))
            .unwrap();
        r.insert_record("next", next).unwrap();
        r
    }

    #[test]
    fn test_nested_get() {
        let r = step(1, -1.0);
        assert_eq!(r.get_f32("next.reward").unwrap()[[0]], -1.0);
        assert_eq!(r.get_i64("action").unwrap()[[0]], 2);
        assert!(r.contains("next.done"));
        assert!(!r.contains("next.missing"));
        assert!(!r.contains("action.inner"));
        assert!(matches!(
            r.get_f32("action"),
            Err(GridplanError::FieldTypeError { .. })
        ));
        assert!(matches!(
            r.get_record("action"),
            Err(GridplanError::FieldTypeError { .. })
        ));
    }

    #[test]
    fn test_leaf_keys() {
        let r = step(0, 0.0);
        assert_eq!(
            r.leaf_keys(),
            vec![
                "action".to_string(),
                "next.done".to_string(),
                "next.observation".to_string(),
                "next.reward".to_string()
            ]
        );
    }

    #[test]
    fn test_batch_size_is_checked() {
        let mut r = StepRecord::new(vec![3]);
        assert!(r
            .insert("reward", ArrayD::<f32>::zeros(IxDyn(&[3])))
            .is_ok());
        assert!(r
            .insert("observation", ArrayD::<f32>::zeros(IxDyn(&[3, 48])))
            .is_ok());
        assert!(matches!(
            r.insert("bad", ArrayD::<f32>::zeros(IxDyn(&[2, 48]))),
            Err(GridplanError::BatchSizeMismatch { .. })
        ));
        assert!(r.insert_record("next", StepRecord::new(vec![])).is_err());
    }

    #[test]
    fn test_stack() {
        let records = vec![step(0, -1.0), step(1, -1.0), step(3, -100.0)];
        let stacked = StepRecord::stack(&records).unwrap();
        assert_eq!(stacked.batch_size(), &[3]);
        assert_eq!(stacked.get_f32("next.observation").unwrap().shape(), &[3, 4]);
        assert_eq!(stacked.get_f32("next.reward").unwrap().shape(), &[3, 1]);
        assert_eq!(stacked.get_f32("next.reward").unwrap()[[2, 0]], -100.0);
        assert_eq!(stacked.get_f32("next.observation").unwrap()[[1, 1]], 1.0);
        assert_eq!(stacked.get_record("next").unwrap().batch_size(), &[3]);
    }

    #[test]
    fn test_stack_rejects_different_keys() {
        let mut other = step(0, 0.0);
        other.remove("action");
        assert!(StepRecord::stack(&[step(0, 0.0), other]).is_err());
        assert!(StepRecord::stack(&[]).is_err());
    }

    #[test]
    fn test_set_row() {
        let mut r = StepRecord::new(vec![2]);
        r.insert("obs", ArrayD::<f32>::zeros(IxDyn(&[2, 3]))).unwrap();
        r.insert("mask", ArrayD::from_elem(IxDyn(&[2]), false))
            .unwrap();
        r.set_row("obs", 1, arr1(&[0f32, 1.0, 0.0]).into_dyn())
            .unwrap();
        r.set_row("mask", 0, ArrayD::from_elem(IxDyn(&[]), true))
            .unwrap();
        assert_eq!(r.get_f32("obs").unwrap()[[1, 1]], 1.0);
        assert_eq!(r.get_f32("obs").unwrap()[[0, 1]], 0.0);
        assert!(r.get_bool("mask").unwrap()[[0]]);
        assert!(r.set_row("obs", 2, arr1(&[0f32, 1.0, 0.0]).into_dyn()).is_err());
        assert!(r.set_row("obs", 0, arr1(&[0f32, 1.0]).into_dyn()).is_err());
        assert!(r
            .set_row("obs", 0, ArrayD::from_elem(IxDyn(&[3]), 1i64))
            .is_err());
    }

    #[test]
    fn test_select() {
        let r = step(2, -1.0);
        let s = r.select(&["next"]).unwrap();
        assert!(!s.contains("action"));
        assert!(s.contains("next.observation"));
        assert!(r.select(&["missing"]).is_err());
    }

    #[test]
    fn test_display() {
        let s = format!("{}", step(0, 0.0));
        assert!(s.contains("action: Tensor(shape=[1], dtype=i64)"));
        assert!(s.contains("reward: Tensor(shape=[1], dtype=f32)"));
        assert!(s.contains("batch_size=[]"));
    }
}
