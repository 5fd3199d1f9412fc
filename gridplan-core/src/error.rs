//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum GridplanError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// An action index outside of the action space.
    #[error("Invalid action {action}, the action space has {n} actions")]
    InvalidAction {
        /// The given action index.
        action: usize,
        /// The number of actions.
        n: usize,
    },

    /// An index that cannot be one-hot encoded in the space.
    #[error("Index {index} is out of range [{start}, {end})")]
    IndexOutOfRange {
        /// The given index.
        index: usize,
        /// The first valid index.
        start: usize,
        /// One past the last valid index.
        end: usize,
    },

    /// A vector that is not a valid one-hot encoding.
    #[error("Invalid one-hot vector: {0}")]
    InvalidOneHot(String),

    /// The requested environment is not registered.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// A field of a step record was not found.
    #[error("Field not found in step record: {0}")]
    FieldNotFound(String),

    /// A field of a step record has an unexpected type.
    #[error("Field {key} is not {expected}")]
    FieldTypeError {
        /// Key of the field.
        key: String,
        /// Expected type.
        expected: String,
    },

    /// A tensor does not agree with the batch size of a step record.
    #[error("Shape {shape:?} of field {key} does not start with batch size {batch_size:?}")]
    BatchSizeMismatch {
        /// Key of the field.
        key: String,
        /// Shape of the tensor.
        shape: Vec<usize>,
        /// Batch size of the record.
        batch_size: Vec<usize>,
    },

    /// Records with different structures cannot be stacked.
    #[error("Cannot stack step records: {0}")]
    StackError(String),
}
