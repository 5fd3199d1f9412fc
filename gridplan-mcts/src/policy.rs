//! Policies acting on the search tree.
//!
//! * [`SelectionPolicy`] walks down the tree during search.
//! * [`ExpansionPolicy`] picks which unexplored action to add to the tree.
//! * [`TreeEvaluationPolicy`] turns the statistics at the root into a
//!   [`Categorical`] distribution to act with.
mod categorical;
mod expansion;
mod selection;
mod tree_evaluation;
pub use categorical::Categorical;
pub use expansion::{DefaultExpansionPolicy, ExpansionPolicy};
pub use selection::{Puct, SelectionPolicy, Uct};
pub use tree_evaluation::{GreedyPolicy, TreeEvaluationPolicy, VisitationPolicy};
