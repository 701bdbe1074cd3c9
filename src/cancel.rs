use std::{
    cell::Cell,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// A cooperative cancellation predicate. Every algorithm polls it once per step it
/// takes and stops as soon as it returns `true`, handing back whatever partial result
/// it has accumulated so far.
///
/// Any `Fn() -> bool` closure is a cancellation predicate. A controller that wants to
/// pause a run can block inside the closure until it is resumed.
pub trait Cancel {
    /// Returns `true` if the running algorithm should stop.
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> Cancel for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A predicate that never cancels. Running with it is the same as running alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Never;

impl Cancel for Never {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A shareable stop switch. Clones observe the same flag, so a clone can be handed to
/// another thread which calls [`CancelFlag::cancel`] to stop the run.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not yet raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. This cannot be undone.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Cancel for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Cancels once it has been polled a fixed number of times.
#[derive(Debug, Clone)]
pub struct StepBudget {
    remaining: Cell<usize>,
}

impl StepBudget {
    /// Allows `steps` polls to pass before the budget reports cancellation.
    pub fn new(steps: usize) -> Self {
        Self {
            remaining: Cell::new(steps),
        }
    }

    /// The number of polls left before cancellation.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Cancel for StepBudget {
    fn is_cancelled(&self) -> bool {
        match self.remaining.get() {
            0 => true,
            n => {
                self.remaining.set(n - 1);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_runs_out() {
        let budget = StepBudget::new(2);
        assert!(!budget.is_cancelled());
        assert!(!budget.is_cancelled());
        assert!(budget.is_cancelled());
        assert!(budget.is_cancelled());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn closures_and_never() {
        let always = || true;
        assert!(always.is_cancelled());
        assert!(!Never.is_cancelled());
    }
}
