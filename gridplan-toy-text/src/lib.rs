//! Toy-text gridworld environments.
//!
//! * `CliffWalking-v0`: a 4x12 grid where the agent walks from the bottom-left
//!   corner to the bottom-right corner along a cliff.
//! * `FrozenLake-v1` and `FrozenLake8x8-v1`: a frozen lake with holes, optionally
//!   slippery.
//!
//! Environments are plain Rust values. Cloning a [`ToyTextEnv`] gives an
//! independent copy, including the state of its random number generator,
//! which is what tree search relies on to simulate actions ahead.
//!
//! ```
//! use gridplan_core::Env as _;
//! use gridplan_toy_text::{ToyTextAct, ToyTextEnv, ToyTextEnvConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ToyTextEnvConfig::registered("CliffWalking-v0")?;
//! let mut env = ToyTextEnv::build(&config, 0)?;
//! let obs = env.reset()?;
//! assert_eq!(obs.state, 36);
//!
//! let (step, _) = env.step(&ToyTextAct::new(0))?;
//! assert_eq!(step.obs.state, 24);
//! assert_eq!(step.reward, -1.0);
//! # Ok(())
//! # }
//! ```
mod act;
mod config;
mod embedding;
mod env;
mod obs;
mod policy;
mod record_env;
pub use act::ToyTextAct;
pub use config::{ToyTextEnvConfig, REGISTERED_ENVS};
pub use embedding::{CoordinateEmbedding, OneHotEmbedding};
pub use env::{make, Grid, ToyTextEnv, ToyTextInfo};
pub use obs::ToyTextObs;
pub use policy::{RandomPolicy, RandomPolicyConfig};
pub use record_env::RecordEnv;
