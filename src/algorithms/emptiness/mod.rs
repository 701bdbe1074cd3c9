//! Nested depth-first searches deciding emptiness of a Büchi acceptance condition.
//!
//! All three checks answer whether a cycle through an accepting vertex is reachable
//! from a root. A primary search explores the graph and launches secondary searches
//! from accepting vertices, which look for a way back. They differ in when the
//! secondary searches are launched and in how much they remember between them:
//!
//! * [`NaiveNestedDfs`] starts an independent secondary search whenever it discovers
//!   an accepting vertex.
//! * [`TwoPhaseNestedDfs`] starts an independent secondary search whenever it finishes
//!   an accepting vertex, and recognizes the way back one edge early.
//! * [`ColoredNestedDfs`] keeps one coloring of the vertices for the whole run, so
//!   that no vertex is explored by more than one secondary search.
//!
//! A violated answer carries a lasso: its trace leads from a root into a cycle that
//! the witness edge closes, see [`crate::Answer`].

mod colored;
pub use colored::ColoredNestedDfs;

mod naive;
pub use naive::NaiveNestedDfs;

mod two_phase;
pub use two_phase::TwoPhaseNestedDfs;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ColoredNestedDfs, NaiveNestedDfs, TwoPhaseNestedDfs};
    use crate::{graph::samples, Adjacency, Run};

    fn agree(graph: &Adjacency<u32>, accepting: impl Fn(&u32) -> bool + Copy) -> bool {
        let naive = NaiveNestedDfs::new(graph, accepting).run_alone();
        let two_phase = TwoPhaseNestedDfs::new(graph, accepting).run_alone();
        let colored = ColoredNestedDfs::new(graph, accepting).run_alone();
        let late = ColoredNestedDfs::new(graph, accepting)
            .with_early_detection(false)
            .run_alone();
        for answer in [&naive, &two_phase, &colored, &late] {
            assert_eq!(
                answer.validate_lasso(graph, accepting),
                Ok(()),
                "{answer:?}"
            );
        }
        naive.holds() == two_phase.holds()
            && naive.holds() == colored.holds()
            && naive.holds() == late.holds()
    }

    #[test]
    fn samples_agree() {
        for graph in [
            samples::root_cycle_3(),
            samples::two_roots_two_graphs(),
            samples::sharing_2(),
            samples::diamond(),
        ] {
            for accepting in 0..13u32 {
                assert!(agree(&graph, move |v: &u32| *v == accepting));
            }
            assert!(agree(&graph, |_: &u32| false));
            assert!(agree(&graph, |_: &u32| true));
        }
    }
}
