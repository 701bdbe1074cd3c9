use tracing::debug;

use crate::{Cancel, Run};

use super::DeterministicRelation;

/// Interprets a deterministic relation: starting from its initial configuration, it
/// executes the enabled action over and over until none is enabled or the run is
/// cancelled, and returns the configuration reached last.
///
/// The run yields `None` only if the relation has no initial configuration. An enabled
/// action without a successor ends the run at the configuration it was enabled in.
#[derive(Debug, Clone)]
pub struct Sequencer<D> {
    relation: D,
}

impl<D> Sequencer<D> {
    /// Creates a sequencer for `relation`.
    pub fn new(relation: D) -> Self {
        Self { relation }
    }

    /// The interpreted relation.
    pub fn relation(&self) -> &D {
        &self.relation
    }
}

impl<D: DeterministicRelation> Sequencer<D> {
    /// Like [`Run::run`], but also reports every configuration before an action is
    /// executed on it.
    pub fn run_observed<F>(&self, cancel: &dyn Cancel, mut observe: F) -> Option<D::Configuration>
    where
        F: FnMut(&D::Configuration, &D::Action),
    {
        let mut current = self.relation.initial()?;
        let mut steps = 0usize;
        loop {
            if cancel.is_cancelled() {
                debug!("sequencer cancelled after {steps} steps");
                return Some(current);
            }
            let Some(action) = self.relation.actions(&current) else {
                debug!("sequencer reached a fixpoint after {steps} steps");
                return Some(current);
            };
            observe(&current, &action);
            current = match self.relation.execute(action, current) {
                Ok(next) => next,
                Err(stuck) => {
                    debug!("sequencer got stuck after {steps} steps");
                    return Some(stuck);
                }
            };
            steps += 1;
        }
    }
}

impl<D: DeterministicRelation> Run for Sequencer<D> {
    type Output = Option<D::Configuration>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        self.run_observed(cancel, |_, _| {})
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Sequencer;
    use crate::{
        relation::testing::{Counter, Op},
        DeterministicRelation, Determinized, Policy, Run, SemanticRelation, StepBudget,
    };

    /// Counts down to zero.
    struct Countdown(u32);

    impl DeterministicRelation for Countdown {
        type Action = ();
        type Configuration = u32;

        fn initial(&self) -> Option<u32> {
            Some(self.0)
        }

        fn actions(&self, configuration: &u32) -> Option<()> {
            (*configuration > 0).then_some(())
        }

        fn execute(&self, _action: (), configuration: u32) -> Result<u32, u32> {
            Ok(configuration - 1)
        }
    }

    struct Nothing;

    impl DeterministicRelation for Nothing {
        type Action = ();
        type Configuration = ();

        fn initial(&self) -> Option<()> {
            None
        }

        fn actions(&self, _configuration: &()) -> Option<()> {
            Some(())
        }

        fn execute(&self, _action: (), _configuration: ()) -> Result<(), ()> {
            Ok(())
        }
    }

    /// Always enabled, but cannot count past three.
    #[derive(Debug, Clone, Copy)]
    struct Stuck;

    impl SemanticRelation for Stuck {
        type Action = ();
        type Configuration = u32;

        fn initial(&self) -> Vec<u32> {
            vec![0]
        }

        fn actions(&self, _configuration: &u32) -> Vec<()> {
            vec![()]
        }

        fn execute(&self, _action: &(), configuration: &u32) -> Vec<u32> {
            if *configuration < 3 {
                vec![configuration + 1]
            } else {
                vec![]
            }
        }
    }

    #[test]
    fn runs_to_fixpoint() {
        assert_eq!(Sequencer::new(Countdown(5)).run_alone(), Some(0));
        assert_eq!(Sequencer::new(Nothing).run_alone(), None);
    }

    #[test]
    fn dead_end_keeps_last_configuration() {
        let stuck = Sequencer::new(Determinized::new(Stuck, Policy::First));
        assert_eq!(stuck.run_alone(), Some(3));

        let mut observed = vec![];
        let reached = stuck.run_observed(&|| false, |c, _| observed.push(*c));
        assert_eq!(observed, vec![0, 1, 2, 3]);
        assert_eq!(reached, Some(3));
    }

    #[test]
    fn cancellation_returns_last_configuration() {
        let sequencer = Sequencer::new(Countdown(5));
        assert_eq!(sequencer.run(&StepBudget::new(2)), Some(3));
        assert_eq!(sequencer.run(&|| true), Some(5));
    }

    #[test]
    fn simulates_determinized_relation() {
        let simulation = Sequencer::new(Determinized::new(Counter { modulus: 7 }, Policy::Last));
        let mut trace = vec![];
        let reached = simulation.run_observed(&StepBudget::new(4), |c, a| trace.push((*c, *a)));
        assert_eq!(
            trace,
            vec![
                (0, Op::Double),
                (0, Op::Double),
                (0, Op::Double),
                (0, Op::Double),
            ]
        );
        assert_eq!(reached, Some(0));

        let first = Sequencer::new(Determinized::new(Counter { modulus: 7 }, Policy::First));
        assert_eq!(first.run(&StepBudget::new(9)), Some(2));
    }
}
