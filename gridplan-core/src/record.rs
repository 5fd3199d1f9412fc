//! Key-value records for logging metrics.
//!
//! Environments return a [`Record`] at every step, the planner summarises
//! each episode into a [`Record`], and [`Recorder`]s write them somewhere.
//!
//! ```rust
//! use gridplan_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("episode_return", RecordValue::Scalar(-13.0));
//! record.insert("child_q_values", RecordValue::Array1(vec![-14.0, -13.0, -15.0, -14.0]));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), -13.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
