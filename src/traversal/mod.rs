//! Depth-first and breadth-first traversal engines.
//!
//! Both engines are state machines over a configuration. From any configuration
//! exactly one action is enabled: following an edge to an already known vertex
//! ([`DfsAction::Known`]), following an edge to a new vertex ([`DfsAction::Unknown`]),
//! retreating from an exhausted vertex, or ending the traversal. The engines can be
//! driven imperatively, by materializing and executing action objects, or as a
//! [`crate::DeterministicRelation`]; all drivers produce the same sequence of actions.
//!
//! Algorithms hook into a traversal through [`Hooks`], whose methods fire exactly
//! when the corresponding action is executed and can abort the whole traversal.
use std::{fmt::Debug, hash::Hash};

mod bfs;
pub use bfs::{BfsAction, BfsConfiguration};

mod dfs;
pub use dfs::{DfsAction, DfsConfiguration, Frame};

mod relation;
pub use relation::{BreadthFirstRelation, DepthFirstRelation};

/// What a hook wants the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Keep going.
    Continue,
    /// Stop the traversal right away, leaving the configuration as it is.
    Abort,
}

impl Control {
    /// Returns `true` for [`Control::Abort`].
    pub fn is_abort(self) -> bool {
        matches!(self, Control::Abort)
    }
}

/// How a driven traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every reachable vertex (within the depth bound) was explored.
    Exhausted,
    /// A hook aborted the traversal.
    Aborted,
    /// The cancellation predicate stopped the traversal.
    Cancelled,
}

/// Read access to a running traversal, as seen by [`Hooks`].
pub trait Traversal {
    /// The type of vertices.
    type Vertex: Clone + Debug;
    /// The canonical form vertices are identified by.
    type Key: Clone + Eq + Hash + Debug;
    /// The bookkeeping kept for a vertex whose neighbours are being enumerated.
    type Frame;

    /// Computes the canonical form of `vertex`.
    fn key(&self, vertex: &Self::Vertex) -> Self::Key;

    /// The vertex whose neighbours are currently being enumerated. For a depth-first
    /// traversal this is the top of the stack, for a breadth-first traversal the
    /// vertex taken from the frontier last.
    fn current(&self) -> Option<&Self::Vertex>;

    /// The number of vertices discovered so far.
    fn discovered(&self) -> usize;
}

/// A traversal that maintains the path from a root to the vertex it is exploring.
pub trait DepthFirst: Traversal {
    /// The vertices on the stack, from the root to the top.
    fn path(&self) -> Vec<Self::Vertex>;

    /// The number of vertices on the stack.
    fn depth(&self) -> usize;
}

/// Callbacks fired by the traversal engines. Each returns whether the traversal
/// should continue; the default implementations do nothing and continue.
pub trait Hooks<C: Traversal + ?Sized> {
    /// Fired when `target` is discovered through an edge from `source`, before it is
    /// pushed (or enqueued). `source` is `None` for roots.
    fn on_entry(
        &mut self,
        _source: Option<&C::Vertex>,
        _target: &C::Vertex,
        _search: &C,
    ) -> Control {
        Control::Continue
    }

    /// Fired when an edge from `source` leads to the already known `target`.
    fn on_known(
        &mut self,
        _source: Option<&C::Vertex>,
        _target: &C::Vertex,
        _search: &C,
    ) -> Control {
        Control::Continue
    }

    /// Fired when the traversal is done with `vertex` and has dropped its `frame`. For a
    /// depth-first traversal `search.current()` is then the parent of `vertex`. The
    /// frame still holds the neighbours a depth bound kept the traversal from visiting.
    fn on_exit(&mut self, _vertex: &C::Vertex, _frame: &C::Frame, _search: &C) -> Control {
        Control::Continue
    }
}

impl<C: Traversal + ?Sized> Hooks<C> for () {}

impl<C: Traversal + ?Sized, H: Hooks<C> + ?Sized> Hooks<C> for &mut H {
    fn on_entry(&mut self, source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        H::on_entry(self, source, target, search)
    }

    fn on_known(&mut self, source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        H::on_known(self, source, target, search)
    }

    fn on_exit(&mut self, vertex: &C::Vertex, frame: &C::Frame, search: &C) -> Control {
        H::on_exit(self, vertex, frame, search)
    }
}

/// An iterator that always holds its next element, so that it can be inspected
/// through a shared reference.
#[derive(Debug, Clone)]
pub struct Lookahead<I: Iterator> {
    head: Option<I::Item>,
    rest: I,
}

impl<I: Iterator> Lookahead<I> {
    /// Wraps `rest`, pulling its first element right away.
    pub fn new(mut rest: I) -> Self {
        Self {
            head: rest.next(),
            rest,
        }
    }

    /// The next element, without consuming it.
    pub fn peek(&self) -> Option<&I::Item> {
        self.head.as_ref()
    }
}

impl<I: Iterator> Iterator for Lookahead<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.head.take()?;
        self.head = self.rest.next();
        Some(head)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Control, Hooks, Traversal};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        Entry(Option<u32>, u32),
        Known(Option<u32>, u32),
        Exit(u32),
    }

    /// Records every hook invocation, optionally aborting on entry of one vertex.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub events: Vec<Event>,
        pub abort_on: Option<u32>,
    }

    impl Recorder {
        pub fn discoveries(&self) -> Vec<u32> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    Event::Entry(_, v) => Some(*v),
                    _ => None,
                })
                .collect()
        }

        pub fn finished(&self) -> Vec<u32> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    Event::Exit(v) => Some(*v),
                    _ => None,
                })
                .collect()
        }
    }

    impl<C: Traversal<Vertex = u32> + ?Sized> Hooks<C> for Recorder {
        fn on_entry(&mut self, source: Option<&u32>, target: &u32, _search: &C) -> Control {
            self.events.push(Event::Entry(source.copied(), *target));
            if self.abort_on == Some(*target) {
                Control::Abort
            } else {
                Control::Continue
            }
        }

        fn on_known(&mut self, source: Option<&u32>, target: &u32, _search: &C) -> Control {
            self.events.push(Event::Known(source.copied(), *target));
            Control::Continue
        }

        fn on_exit(&mut self, vertex: &u32, _frame: &C::Frame, _search: &C) -> Control {
            self.events.push(Event::Exit(*vertex));
            Control::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::Lookahead;

    #[test]
    fn lookahead_peeks_without_consuming() {
        let mut it = Lookahead::new(1..4);
        assert_eq!(it.peek(), Some(&1));
        assert_eq!(it.peek(), Some(&1));
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.peek(), Some(&2));
        assert_eq!(it.collect_vec(), vec![2, 3]);
    }
}
