use itertools::iproduct;
use tracing::trace;

use super::{DependentRelation, SemanticRelation, Step};

/// The synchronous product of a relation with a relation observing its steps.
///
/// Every product action pairs a step of the left relation with an action the right
/// relation takes in reaction to that step. If the left relation is deadlocked, the
/// right relation reacts to the stutter step on the left configuration instead, so an
/// observer still sees that nothing happened.
#[derive(Debug, Clone)]
pub struct SynchronousProduct<L, R> {
    left: L,
    right: R,
}

impl<L, R> SynchronousProduct<L, R> {
    /// Creates the product of `left` and `right`.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// The observed relation.
    pub fn left(&self) -> &L {
        &self.left
    }

    /// The observing relation.
    pub fn right(&self) -> &R {
        &self.right
    }
}

impl<L, R> SemanticRelation for SynchronousProduct<L, R>
where
    L: SemanticRelation,
    R: DependentRelation<Step<L::Action, L::Configuration>>,
{
    type Action = (Step<L::Action, L::Configuration>, R::Action);
    type Configuration = (L::Configuration, R::Configuration);

    fn initial(&self) -> Vec<Self::Configuration> {
        iproduct!(self.left.initial(), self.right.initial()).collect()
    }

    fn actions(&self, configuration: &Self::Configuration) -> Vec<Self::Action> {
        let (left, right) = configuration;
        let mut steps = self.left.steps(left);
        if steps.is_empty() {
            trace!("{:?} is deadlocked, stuttering", left);
            steps.push(Step::stutter(left.clone()));
        }
        steps
            .into_iter()
            .flat_map(|step| {
                self.right
                    .actions(&step, right)
                    .into_iter()
                    .map(move |action| (step.clone(), action))
            })
            .collect()
    }

    fn execute(
        &self,
        action: &Self::Action,
        configuration: &Self::Configuration,
    ) -> Vec<Self::Configuration> {
        let (step, reaction) = action;
        self.right
            .execute(step, reaction, &configuration.1)
            .into_iter()
            .map(|right| (step.end.clone(), right))
            .collect()
    }
}
