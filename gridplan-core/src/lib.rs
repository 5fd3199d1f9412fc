#![warn(missing_docs)]
//! Core components of gridplan.
//!
//! * [`Env`], [`Obs`], [`Act`], [`Step`] and [`Policy`] describe the interaction
//!   between an environment and whatever drives it.
//! * [`Discrete`] is the discrete space used for actions and observations of
//!   the toy-text environments, including one-hot encoding of indices.
//! * [`StepRecord`] is a batched key-value container of tensors used to pass
//!   observations, actions, rewards and termination flags between steps.
//! * [`record`] holds key-value records for logging metrics.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Configurable, DiscreteEnv, Env, Info, Obs, Policy, Step};

mod embedding;
pub use embedding::ObservationEmbedding;

mod space;
pub use space::Discrete;

mod step_record;
pub use step_record::{Field, StepRecord, Tensor};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
