use std::fmt::Debug;

use crate::Set;

use super::DependentRelation;

type Guard<I> = Box<dyn Fn(&I) -> bool>;

struct Transition<I> {
    source: usize,
    guard: Guard<I>,
    target: usize,
}

/// An explicit Büchi automaton whose transitions are guarded by predicates over the
/// observed input. States are numbered from zero.
///
/// As a [`DependentRelation`] the automaton reads one input per step, its actions are
/// the indices of the transitions whose guard holds. Synchronized with a system, it
/// rejects a run by having no enabled transition, and it accepts an infinite run if the
/// run visits accepting states infinitely often.
pub struct GuardedBuchi<I> {
    states: usize,
    initial: Vec<usize>,
    accepting: Set<usize>,
    transitions: Vec<Transition<I>>,
}

impl<I> GuardedBuchi<I> {
    /// Creates an automaton with `states` states and neither initial states nor
    /// transitions.
    pub fn new(states: usize) -> Self {
        Self {
            states,
            initial: Vec::new(),
            accepting: Set::default(),
            transitions: Vec::new(),
        }
    }

    /// Marks `state` as initial.
    pub fn with_initial(mut self, state: usize) -> Self {
        debug_assert!(state < self.states);
        self.initial.push(state);
        self
    }

    /// Marks `state` as accepting.
    pub fn with_accepting(mut self, state: usize) -> Self {
        debug_assert!(state < self.states);
        self.accepting.insert(state);
        self
    }

    /// Adds a transition from `source` to `target` that is enabled whenever `guard`
    /// holds for the observed input. Returns the index of the transition.
    pub fn add_transition<F>(&mut self, source: usize, guard: F, target: usize) -> usize
    where
        F: Fn(&I) -> bool + 'static,
    {
        debug_assert!(source < self.states && target < self.states);
        self.transitions.push(Transition {
            source,
            guard: Box::new(guard),
            target,
        });
        self.transitions.len() - 1
    }

    /// Builder variant of [`GuardedBuchi::add_transition`].
    pub fn with_transition<F>(mut self, source: usize, guard: F, target: usize) -> Self
    where
        F: Fn(&I) -> bool + 'static,
    {
        self.add_transition(source, guard, target);
        self
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states
    }

    /// Returns `true` if `state` is accepting.
    pub fn is_accepting(&self, state: &usize) -> bool {
        self.accepting.contains(state)
    }

    /// The source and target of the transition with the given index.
    pub fn endpoints(&self, transition: usize) -> Option<(usize, usize)> {
        self.transitions
            .get(transition)
            .map(|t| (t.source, t.target))
    }
}

impl<I> DependentRelation<I> for GuardedBuchi<I> {
    type Action = usize;
    type Configuration = usize;

    fn initial(&self) -> Vec<usize> {
        self.initial.clone()
    }

    fn actions(&self, input: &I, configuration: &usize) -> Vec<usize> {
        self.transitions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.source == *configuration && (t.guard)(input))
            .map(|(index, _)| index)
            .collect()
    }

    fn execute(&self, _input: &I, action: &usize, configuration: &usize) -> Vec<usize> {
        self.transitions
            .get(*action)
            .filter(|t| t.source == *configuration)
            .map(|t| t.target)
            .into_iter()
            .collect()
    }
}

impl<I> Debug for GuardedBuchi<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Büchi automaton with {} states, initial {:?}, accepting {:?}",
            self.states, self.initial, self.accepting
        )?;
        for (index, t) in self.transitions.iter().enumerate() {
            writeln!(f, "  {index}: {} --[guard]--> {}", t.source, t.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::GuardedBuchi;
    use crate::DependentRelation;

    /// Accepts the words over integers that contain infinitely many zeros.
    fn infinitely_many_zeros() -> GuardedBuchi<u32> {
        GuardedBuchi::new(2)
            .with_initial(0)
            .with_accepting(1)
            .with_transition(0, |x: &u32| *x != 0, 0)
            .with_transition(0, |x: &u32| *x == 0, 1)
            .with_transition(1, |x: &u32| *x != 0, 0)
            .with_transition(1, |x: &u32| *x == 0, 1)
    }

    #[test]
    fn guards_select_transitions() {
        let aut = infinitely_many_zeros();
        assert_eq!(aut.initial(), vec![0]);
        assert_eq!(aut.actions(&3, &0), vec![0]);
        assert_eq!(aut.actions(&0, &0), vec![1]);
        assert_eq!(aut.execute(&0, &1, &0), vec![1]);
        assert!(aut.execute(&0, &1, &1).is_empty());
        assert!(aut.is_accepting(&1));
        assert!(!aut.is_accepting(&0));
        assert_eq!(aut.endpoints(2), Some((1, 0)));
        assert_eq!(aut.endpoints(4), None);
    }
}
