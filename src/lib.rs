//! Library for exhaustively exploring implicit, lazily generated state graphs.
//!
//! Graphs are never materialized: a [`RootedGraph`] only hands out its roots and,
//! on demand, the neighbours of a vertex. On top of that contract the crate offers
//! depth-first and breadth-first traversal engines with callback hooks, and the
//! classical algorithms of an explicit-state model checker built from them:
//! strongly connected components, nested depth-first Büchi emptiness checks and
//! safety checks with counterexample reconstruction.
//!
//! Every algorithm runs on the calling thread and can be stopped cooperatively
//! through a [`Cancel`] predicate that is polled once per step.
#![warn(missing_docs)]

/// Hash map used throughout the crate.
#[cfg(feature = "ahash")]
pub type Map<K, V> = ahash::HashMap<K, V>;
/// Hash set used throughout the crate.
#[cfg(feature = "ahash")]
pub type Set<K> = ahash::HashSet<K>;

/// Hash map used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Map<K, V> = std::collections::HashMap<K, V>;
/// Hash set used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Set<K> = std::collections::HashSet<K>;

mod cancel;
pub use cancel::{Cancel, CancelFlag, Never, StepBudget};

pub mod graph;
pub use graph::{Adjacency, FnGraph, ReRooted, RootedGraph};

pub mod known;
pub use known::{Forgetful, Identity, KnownSet, ProbingSet, Reduce, ReduceWith, Visited};

pub mod relation;
pub use relation::{
    DependentRelation, DeterministicRelation, Determinized, GuardedBuchi, Lifted, Policy,
    RelationGraph, SemanticRelation, Sequencer, Step, SynchronousProduct,
};

pub mod traversal;
pub use traversal::{
    BfsAction, BfsConfiguration, Control, DepthFirst, DfsAction, DfsConfiguration, Hooks,
    Outcome, Traversal,
};

pub mod algorithms;
pub use algorithms::{
    Answer, ColoredNestedDfs, NaiveNestedDfs, Reachability, Reached, Run, Safety,
    SccDecomposition, StronglyConnected, TraceError, TwoPhaseNestedDfs, Witness,
};

/// Re-exports the traits and types that are needed in most uses of the crate.
pub mod prelude {
    pub use super::{
        algorithms::{
            Answer, ColoredNestedDfs, NaiveNestedDfs, Reachability, Run, Safety,
            SccDecomposition, StronglyConnected, TwoPhaseNestedDfs, Witness,
        },
        cancel::{Cancel, CancelFlag, Never, StepBudget},
        graph::{Adjacency, FnGraph, ReRooted, RootedGraph},
        known::{Identity, KnownSet, Reduce, ReduceWith},
        relation::{
            DependentRelation, DeterministicRelation, SemanticRelation, Sequencer, Step,
        },
        traversal::{Control, DepthFirst, Hooks, Outcome, Traversal},
        Map, Set,
    };
}
