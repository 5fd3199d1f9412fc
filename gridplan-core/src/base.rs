//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::{DiscreteEnv, Env};
pub use policy::{Configurable, Policy};
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Environments are not vectorized, thus [`Obs::len()`] returns 1 unless
/// an implementation packs several observations.
pub trait Obs: Clone + Debug {
    /// Returns the number of observations in the object.
    fn len(&self) -> usize {
        1
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    fn len(&self) -> usize {
        1
    }
}
