//! Transition relations over (action, configuration) pairs and their combinators.
//!
//! A [`SemanticRelation`] describes a possibly nondeterministic system by its initial
//! configurations, the actions enabled in a configuration and the configurations an
//! action leads to. Relations compose: [`SynchronousProduct`] runs a system in lockstep
//! with a [`DependentRelation`] that observes every [`Step`] of the system, which is how
//! a property automaton such as [`GuardedBuchi`] is synchronized with a model.
//! [`RelationGraph`] turns any relation into a [`crate::RootedGraph`] so that all the
//! traversal engines and checks apply to it, while [`Determinized`] and [`Sequencer`]
//! produce single simulation runs.
use std::fmt::Debug;

use impl_tools::autoimpl;

mod buchi;
pub use buchi::GuardedBuchi;

mod graph;
pub use graph::{Lifted, RelationGraph};

mod policy;
pub use policy::{Determinized, Policy};

mod product;
pub use product::SynchronousProduct;

mod sequencer;
pub use sequencer::Sequencer;

/// A transition relation given by its initial configurations, the actions enabled in
/// a configuration and the effect of executing an action.
///
/// [`SemanticRelation::actions`] must not change the configuration it is given. The
/// order of the returned collections is the order in which graph views enumerate
/// successors.
#[autoimpl(for<T: trait + ?Sized> &T)]
pub trait SemanticRelation {
    /// The type of actions.
    type Action: Clone + Debug;
    /// The type of configurations.
    type Configuration: Clone + Debug;

    /// The initial configurations.
    fn initial(&self) -> Vec<Self::Configuration>;

    /// The actions enabled in `configuration`.
    fn actions(&self, configuration: &Self::Configuration) -> Vec<Self::Action>;

    /// The configurations reached by executing `action` in `configuration`.
    fn execute(
        &self,
        action: &Self::Action,
        configuration: &Self::Configuration,
    ) -> Vec<Self::Configuration>;

    /// All steps leaving `configuration`, in the order of its actions and their targets.
    fn steps(
        &self,
        configuration: &Self::Configuration,
    ) -> Vec<Step<Self::Action, Self::Configuration>> {
        let mut steps = Vec::new();
        for action in self.actions(configuration) {
            for end in self.execute(&action, configuration) {
                steps.push(Step::new(configuration.clone(), Some(action.clone()), end));
            }
        }
        steps
    }
}

/// A relation with at most one initial configuration, at most one enabled action and at
/// most one successor per action.
///
/// [`DeterministicRelation::execute`] consumes the configuration, so implementations are
/// free to mutate it in place and hand it back. An action that yields no successor
/// returns the configuration unchanged as the error.
#[autoimpl(for<T: trait + ?Sized> &T)]
pub trait DeterministicRelation {
    /// The type of actions.
    type Action;
    /// The type of configurations.
    type Configuration;

    /// The initial configuration, if any.
    fn initial(&self) -> Option<Self::Configuration>;

    /// The action enabled in `configuration`, `None` for a deadlock.
    fn actions(&self, configuration: &Self::Configuration) -> Option<Self::Action>;

    /// Executes `action`, returning the successor configuration, or `configuration`
    /// itself if `action` has no successor.
    fn execute(
        &self,
        action: Self::Action,
        configuration: Self::Configuration,
    ) -> Result<Self::Configuration, Self::Configuration>;
}

/// A relation whose actions and successors depend on an input, typically a step of
/// another relation it is synchronized with.
pub trait DependentRelation<I> {
    /// The type of actions.
    type Action: Clone + Debug;
    /// The type of configurations.
    type Configuration: Clone + Debug;

    /// The initial configurations.
    fn initial(&self) -> Vec<Self::Configuration>;

    /// The actions enabled in `configuration` when `input` is observed.
    fn actions(&self, input: &I, configuration: &Self::Configuration) -> Vec<Self::Action>;

    /// The configurations reached by executing `action` on `input` in `configuration`.
    fn execute(
        &self,
        input: &I,
        action: &Self::Action,
        configuration: &Self::Configuration,
    ) -> Vec<Self::Configuration>;
}

impl<I, D: DependentRelation<I> + ?Sized> DependentRelation<I> for &D {
    type Action = D::Action;
    type Configuration = D::Configuration;

    fn initial(&self) -> Vec<Self::Configuration> {
        D::initial(self)
    }

    fn actions(&self, input: &I, configuration: &Self::Configuration) -> Vec<Self::Action> {
        D::actions(self, input, configuration)
    }

    fn execute(
        &self,
        input: &I,
        action: &Self::Action,
        configuration: &Self::Configuration,
    ) -> Vec<Self::Configuration> {
        D::execute(self, input, action, configuration)
    }
}

/// A materialized transition `start --action--> end`. A step without an action is a
/// stutter step, which leaves the configuration unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step<A, C> {
    /// The configuration the step leaves.
    pub start: C,
    /// The executed action, `None` for a stutter step.
    pub action: Option<A>,
    /// The configuration the step reaches.
    pub end: C,
}

impl<A, C> Step<A, C> {
    /// Creates a step.
    pub fn new(start: C, action: Option<A>, end: C) -> Self {
        Self { start, action, end }
    }

    /// Returns `true` if no action was executed.
    pub fn is_stutter(&self) -> bool {
        self.action.is_none()
    }
}

impl<A, C: Clone> Step<A, C> {
    /// The stutter step on `configuration`.
    pub fn stutter(configuration: C) -> Self {
        Self {
            start: configuration.clone(),
            action: None,
            end: configuration,
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        testing::{Counter, Op},
        SemanticRelation, Step,
    };

    #[test]
    fn steps_enumerate_actions_and_targets() {
        let counter = Counter { modulus: 5 };
        assert_eq!(
            counter.steps(&2),
            vec![
                Step::new(2, Some(Op::Inc), 3),
                Step::new(2, Some(Op::Double), 4),
            ]
        );
        assert_eq!(
            (&counter).steps(&4),
            vec![
                Step::new(4, Some(Op::Inc), 0),
                Step::new(4, Some(Op::Double), 3),
            ]
        );
        assert!(Step::<Op, u32>::stutter(7).is_stutter());
    }
}
