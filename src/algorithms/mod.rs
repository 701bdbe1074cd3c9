//! Algorithms built on the traversal engines: reachability, strongly connected
//! components, nested depth-first emptiness checks for Büchi acceptance and safety
//! checks. Each of them is a [`Run`], so it can be started alone or under the control
//! of a [`Cancel`] predicate.
use crate::{Cancel, Never};

mod answer;
pub use answer::{Answer, TraceError, Witness};

mod reachability;
pub use reachability::{Reachability, Reached};

mod scc;
pub use scc::{SccDecomposition, StronglyConnected};

mod safety;
pub use safety::Safety;

mod emptiness;
pub use emptiness::{ColoredNestedDfs, NaiveNestedDfs, TwoPhaseNestedDfs};

/// A computation that can be cancelled cooperatively.
pub trait Run {
    /// The result of the computation. A cancelled run returns the partial result it had
    /// accumulated.
    type Output;

    /// Runs the computation, polling `cancel` once per step.
    fn run(&self, cancel: &dyn Cancel) -> Self::Output;

    /// Runs the computation to its end.
    fn run_alone(&self) -> Self::Output {
        self.run(&Never)
    }
}
