use std::cell::RefCell;

use super::{DeterministicRelation, SemanticRelation};

/// How [`Determinized`] resolves a choice between several candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// Always the first candidate.
    #[default]
    First,
    /// Always the last candidate.
    Last,
    /// Some candidate, the cheapest one to pick.
    Any,
    /// A uniformly random candidate, drawn from a generator seeded with the given value.
    Uniform(u64),
}

/// A nondeterministic relation turned into a deterministic one by resolving every
/// choice with a [`Policy`]. An empty set of candidates stays empty.
#[derive(Debug)]
pub struct Determinized<N> {
    relation: N,
    policy: Policy,
    rng: RefCell<fastrand::Rng>,
}

impl<N> Determinized<N> {
    /// Wraps `relation`, resolving choices according to `policy`.
    pub fn new(relation: N, policy: Policy) -> Self {
        let seed = match policy {
            Policy::Uniform(seed) => seed,
            _ => 0,
        };
        Self {
            relation,
            policy,
            rng: RefCell::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// The wrapped relation.
    pub fn inner(&self) -> &N {
        &self.relation
    }

    /// The policy in use.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Picks one of `candidates`.
    pub fn pick<T>(&self, mut candidates: Vec<T>) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        match self.policy {
            Policy::First | Policy::Any => Some(candidates.swap_remove(0)),
            Policy::Last => candidates.pop(),
            Policy::Uniform(_) => {
                let index = self.rng.borrow_mut().usize(..candidates.len());
                Some(candidates.swap_remove(index))
            }
        }
    }
}

impl<N: Clone> Clone for Determinized<N> {
    fn clone(&self) -> Self {
        Self {
            relation: self.relation.clone(),
            policy: self.policy,
            rng: RefCell::new(self.rng.borrow().clone()),
        }
    }
}

impl<N: SemanticRelation> DeterministicRelation for Determinized<N> {
    type Action = N::Action;
    type Configuration = N::Configuration;

    fn initial(&self) -> Option<Self::Configuration> {
        self.pick(self.relation.initial())
    }

    fn actions(&self, configuration: &Self::Configuration) -> Option<Self::Action> {
        self.pick(self.relation.actions(configuration))
    }

    fn execute(
        &self,
        action: Self::Action,
        configuration: Self::Configuration,
    ) -> Result<Self::Configuration, Self::Configuration> {
        self.pick(self.relation.execute(&action, &configuration))
            .ok_or(configuration)
    }
}
