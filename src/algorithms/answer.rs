use std::fmt::Display;

use crate::RootedGraph;

/// The evidence a check points at: the bad vertex itself, or the edge through which it
/// was reached or a cycle was closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Witness<V> {
    /// A single vertex, used for bad roots.
    Vertex(V),
    /// An edge, i.e. a step without an action from `source` to `target`.
    Edge {
        /// Where the edge starts.
        source: V,
        /// Where the edge ends.
        target: V,
    },
}

impl<V> Witness<V> {
    /// The vertex the witness points at.
    pub fn target(&self) -> &V {
        match self {
            Witness::Vertex(target) | Witness::Edge { target, .. } => target,
        }
    }

    /// Applies `f` to every vertex of the witness.
    pub fn map<W, F: FnMut(V) -> W>(self, mut f: F) -> Witness<W> {
        match self {
            Witness::Vertex(v) => Witness::Vertex(f(v)),
            Witness::Edge { source, target } => Witness::Edge {
                source: f(source),
                target: f(target),
            },
        }
    }
}

/// The result of a safety or emptiness check.
///
/// If the property holds there is neither witness nor trace. Otherwise the trace is a
/// path starting at a root in discovery order. For safety checks it ends at the bad
/// vertex. For emptiness checks it runs through a cycle which the witness edge closes:
/// either the trace ends with the witness target, which occurs earlier in the trace, or
/// it ends with the witness source and the target lies on the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer<V> {
    holds: bool,
    witness: Option<Witness<V>>,
    trace: Vec<V>,
}

impl<V> Default for Answer<V> {
    fn default() -> Self {
        Self::satisfied()
    }
}

impl<V> Answer<V> {
    /// The answer of a check that found no counterexample.
    pub fn satisfied() -> Self {
        Self {
            holds: true,
            witness: None,
            trace: Vec::new(),
        }
    }

    /// The answer of a check that found a counterexample.
    pub fn violated(witness: Witness<V>, trace: Vec<V>) -> Self {
        Self {
            holds: false,
            witness: Some(witness),
            trace,
        }
    }

    /// Returns `true` if no counterexample was found.
    pub fn holds(&self) -> bool {
        self.holds
    }

    /// The witness of the counterexample.
    pub fn witness(&self) -> Option<&Witness<V>> {
        self.witness.as_ref()
    }

    /// The counterexample trace, empty if the property holds.
    pub fn trace(&self) -> &[V] {
        &self.trace
    }

    /// Consumes the answer and returns its trace.
    pub fn into_trace(self) -> Vec<V> {
        self.trace
    }

    /// Transforms the vertices of the answer without recomputing it.
    pub fn map<W, F: FnMut(V) -> W>(self, mut f: F) -> Answer<W> {
        Answer {
            holds: self.holds,
            witness: self.witness.map(|witness| witness.map(&mut f)),
            trace: self.trace.into_iter().map(f).collect(),
        }
    }
}

impl<V: Clone + PartialEq> Answer<V> {
    /// Checks that the answer is consistent with `graph`: a counterexample trace must be
    /// a path from a root, and the witness must sit at its end. Enumerates the roots of
    /// `graph`, which therefore must be finite.
    pub fn validate<G>(&self, graph: &G) -> Result<(), TraceError>
    where
        G: RootedGraph<Vertex = V>,
    {
        if self.holds {
            return match (&self.witness, self.trace.is_empty()) {
                (None, true) => Ok(()),
                _ => Err(TraceError::UnexpectedCounterexample),
            };
        }
        let (Some(witness), Some(first), Some(last)) =
            (&self.witness, self.trace.first(), self.trace.last())
        else {
            return Err(TraceError::Empty);
        };
        if !graph.roots().any(|root| &root == first) {
            return Err(TraceError::NotRooted);
        }
        if let Some(index) = self
            .trace
            .windows(2)
            .position(|pair| !is_edge(graph, &pair[0], &pair[1]))
        {
            return Err(TraceError::Disconnected { index });
        }
        let consistent = match witness {
            Witness::Vertex(vertex) => vertex == last,
            Witness::Edge { source, target } => {
                let before_last = self.trace.len().checked_sub(2).map(|i| &self.trace[i]);
                is_edge(graph, source, target)
                    && (source == last || (target == last && before_last == Some(source)))
            }
        };
        if consistent {
            Ok(())
        } else {
            Err(TraceError::WitnessMismatch)
        }
    }

    /// Like [`Answer::validate`], and additionally checks that the witness edge closes a
    /// cycle of the trace that contains a vertex satisfying `accepting`.
    pub fn validate_lasso<G, F>(&self, graph: &G, accepting: F) -> Result<(), TraceError>
    where
        G: RootedGraph<Vertex = V>,
        F: Fn(&V) -> bool,
    {
        self.validate(graph)?;
        if self.holds {
            return Ok(());
        }
        let Some(Witness::Edge { source, target }) = &self.witness else {
            return Err(TraceError::NotALasso);
        };
        // with the target at the end, the cycle starts at an earlier occurrence
        let (closed_by_target, searched) = match self.trace.split_last() {
            Some((last, init)) if last == target && last != source => (true, init),
            Some((last, init)) if last == target && init.last() == Some(source) => (true, init),
            _ => (false, &self.trace[..]),
        };
        let Some(start) = searched.iter().position(|v| v == target) else {
            return Err(TraceError::NotALasso);
        };
        let cycle = if closed_by_target {
            &searched[start..]
        } else {
            &self.trace[start..]
        };
        if cycle.iter().any(accepting) {
            Ok(())
        } else {
            Err(TraceError::NotAccepting)
        }
    }
}

fn is_edge<G: RootedGraph>(graph: &G, source: &G::Vertex, target: &G::Vertex) -> bool
where
    G::Vertex: PartialEq,
{
    graph.neighbours(source).any(|n| &n == target)
}

/// The ways in which an [`Answer`] can be inconsistent with a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The property holds, yet there is a witness or a trace.
    UnexpectedCounterexample,
    /// The property is violated, yet the witness or the trace is missing.
    Empty,
    /// The trace does not start at a root.
    NotRooted,
    /// The trace has no edge between the elements at `index` and `index + 1`.
    Disconnected {
        /// The position of the first element of the missing edge.
        index: usize,
    },
    /// The witness is not an edge of the graph or does not sit at the end of the trace.
    WitnessMismatch,
    /// The witness does not close a cycle of the trace.
    NotALasso,
    /// The cycle closed by the witness has no accepting vertex.
    NotAccepting,
}

impl Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::UnexpectedCounterexample => {
                write!(f, "A satisfied property must not have a counterexample")
            }
            TraceError::Empty => write!(f, "Counterexample without trace or witness"),
            TraceError::NotRooted => write!(f, "Trace does not start at a root"),
            TraceError::Disconnected { index } => {
                write!(
                    f,
                    "Trace has no edge from position {} to {}",
                    index,
                    index + 1
                )
            }
            TraceError::WitnessMismatch => write!(f, "Witness does not match the trace"),
            TraceError::NotALasso => write!(f, "Witness does not close a cycle"),
            TraceError::NotAccepting => write!(f, "Cycle has no accepting vertex"),
        }
    }
}

impl std::error::Error for TraceError {}
