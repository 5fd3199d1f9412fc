//! Tree search planning on toy-text gridworlds.
//!
//! gridplan consists of the following crates:
//!
//! * [gridplan-core](gridplan_core) provides the traits of environments and
//!   policies, discrete spaces with one-hot encoding, step records and
//!   key-value records for metrics.
//! * [gridplan-toy-text](gridplan_toy_text) has the CliffWalking and
//!   FrozenLake environments and a wrapper driving them with step records.
//! * [gridplan-mcts](gridplan_mcts) is Monte Carlo tree search over copies of
//!   an environment and the episode runner built on it.
//! * [gridplan-tensorboard](gridplan_tensorboard) writes records to
//!   TensorBoard.
//!
//! This crate holds the commands of the `gridplan` binary.
pub mod plan;
pub mod probe;
pub mod random;
