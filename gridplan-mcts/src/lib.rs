//! Monte Carlo tree search for environments with discrete actions.
//!
//! The search tree is an arena of [`Node`]s indexed by [`NodeId`]. Each node
//! keeps a snapshot of the environment in its state, so that the planner can
//! step copies of the environment without touching the real one.
//!
//! ```
//! use gridplan_core::Env;
//! use gridplan_mcts::{evaluator::RandomRolloutEvaluator, policy::Uct, Mcts};
//! use gridplan_toy_text::make;
//!
//! let mut env = make("CliffWalking-v0", 0).unwrap();
//! let obs = env.reset().unwrap();
//! let mut mcts = Mcts::new(Uct::new(1.0), RandomRolloutEvaluator::new(20, 0));
//! let tree = mcts.search(&env, 64, obs, 0.0).unwrap();
//! assert_eq!(tree.root_node().visits, 64);
//! ```
pub mod error;
pub mod evaluator;
pub mod policy;

mod config;
mod mcts;
mod node;
mod runner;
pub use config::{EvaluatorKind, MctsConfig, SelectionKind, TreeEvaluationKind};
pub use mcts::Mcts;
pub use node::{Node, NodeId, Tree};
pub use runner::{episode_record, run_episode, EpisodeConfig};
