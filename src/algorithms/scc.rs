use std::fmt::Debug;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    Cancel, Control, DfsConfiguration, Hooks, Identity, Map, Outcome, Reduce, RootedGraph, Set,
    Traversal,
};

use super::Run;

/// Computes the strongly connected components reachable from the roots of a graph with
/// a single depth-first traversal, using the one-stack variant of Tarjan's algorithm.
#[derive(Debug, Clone)]
pub struct StronglyConnected<'g, G, R = Identity> {
    graph: &'g G,
    reduce: R,
}

impl<'g, G: RootedGraph> StronglyConnected<'g, G> {
    /// Decomposes the reachable part of `graph`.
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            reduce: Identity,
        }
    }
}

impl<'g, G: RootedGraph, R> StronglyConnected<'g, G, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> StronglyConnected<'g, G, S> {
        StronglyConnected {
            graph: self.graph,
            reduce,
        }
    }
}

/// The strongly connected components found by [`StronglyConnected`], in the order in
/// which they were completed. Every component lists its vertices in discovery order,
/// and a component is completed only after all components it can reach.
#[derive(Clone, PartialEq, Eq)]
pub struct SccDecomposition<V> {
    components: Vec<Vec<V>>,
    trivial: Vec<bool>,
    complete: bool,
}

impl<V> SccDecomposition<V> {
    /// The components.
    pub fn components(&self) -> &[Vec<V>] {
        &self.components
    }

    /// The number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no vertex is reachable.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if the component at `index` is a single vertex without a self-loop,
    /// i.e. no cycle passes through it.
    pub fn is_trivial(&self, index: usize) -> bool {
        self.trivial.get(index).copied().unwrap_or(false)
    }

    /// `false` if the run was cancelled. The components found so far are complete, but
    /// some reachable components may be missing.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Iterates over the components.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<V>> {
        self.components.iter()
    }
}

impl<V: PartialEq> SccDecomposition<V> {
    /// The index of the component containing `vertex`.
    pub fn component_of(&self, vertex: &V) -> Option<usize> {
        self.components
            .iter()
            .position(|component| component.contains(vertex))
    }

    /// Returns `true` if `a` and `b` lie in the same component.
    pub fn same_component(&self, a: &V, b: &V) -> bool {
        match (self.component_of(a), self.component_of(b)) {
            (Some(i), Some(j)) => i == j,
            _ => false,
        }
    }
}

impl<V: Debug> Debug for SccDecomposition<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let braced = |component: &Vec<V>| {
            let members = component.iter().map(|v| format!("{v:?}")).join(", ");
            format!("{{{members}}}")
        };
        write!(f, "[{}]", self.components.iter().map(braced).join(", "))
    }
}

#[derive(Debug, Clone)]
struct VertexData<K, V> {
    index: usize,
    low: usize,
    lead: bool,
    looping: bool,
    representative: Option<K>,
    vertex: V,
}

/// The side-table of the traversal. Finished vertices have a low value of
/// `usize::MAX`, so that edges into completed components never lower a low value.
#[derive(Debug)]
struct Tarjan<K, V> {
    time: usize,
    data: Map<K, VertexData<K, V>>,
    followers: Vec<K>,
    components: Vec<Vec<V>>,
    trivial: Vec<bool>,
}

impl<K: Clone + Eq + std::hash::Hash, V: Clone> Tarjan<K, V> {
    fn new() -> Self {
        Self {
            time: 0,
            data: Map::default(),
            followers: Vec::new(),
            components: Vec::new(),
            trivial: Vec::new(),
        }
    }

    fn low(&self, key: &K) -> Option<usize> {
        self.data.get(key).map(|data| data.low)
    }

    /// `source` reaches `target`, so it can reach whatever `target` reaches.
    fn retreat(&mut self, source: &K, target: &K) {
        let Some(low) = self
            .data
            .get(target)
            .filter(|data| data.representative.is_none())
            .map(|data| data.low)
        else {
            return;
        };
        if let Some(data) = self.data.get_mut(source) {
            if low < data.low {
                data.low = low;
                data.lead = false;
            }
        }
    }

    fn complete(&mut self, lead: K) {
        let Some(bound) = self.low(&lead) else {
            return;
        };
        let mut members = vec![lead.clone()];
        while let Some(follower) = self.followers.last() {
            if self.low(follower).map_or(true, |low| low < bound) {
                break;
            }
            members.extend(self.followers.pop());
        }

        let mut component = Vec::with_capacity(members.len());
        let mut looping = false;
        for key in &members {
            if let Some(data) = self.data.get_mut(key) {
                data.representative = Some(lead.clone());
                data.low = usize::MAX;
                looping |= data.looping;
                component.push((data.index, data.vertex.clone()));
            }
        }
        component.sort_by_key(|(index, _)| *index);
        self.trivial.push(component.len() == 1 && !looping);
        self.components
            .push(component.into_iter().map(|(_, vertex)| vertex).collect());
    }
}

impl<C: Traversal + ?Sized> Hooks<C> for Tarjan<C::Key, C::Vertex> {
    fn on_entry(&mut self, _source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        self.time += 1;
        self.data.insert(
            search.key(target),
            VertexData {
                index: self.time,
                low: self.time,
                lead: true,
                looping: false,
                representative: None,
                vertex: target.clone(),
            },
        );
        Control::Continue
    }

    fn on_known(&mut self, source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        if let Some(source) = source {
            let (source, target) = (search.key(source), search.key(target));
            if source == target {
                if let Some(data) = self.data.get_mut(&source) {
                    data.looping = true;
                }
            }
            self.retreat(&source, &target);
        }
        Control::Continue
    }

    fn on_exit(&mut self, vertex: &C::Vertex, _frame: &C::Frame, search: &C) -> Control {
        let key = search.key(vertex);
        if let Some(parent) = search.current() {
            self.retreat(&search.key(parent), &key);
        }
        if self.data.get(&key).is_some_and(|data| data.lead) {
            trace!("{:?} completes a component", vertex);
            self.complete(key);
        } else {
            self.followers.push(key);
        }
        Control::Continue
    }
}

impl<'g, G, R> Run for StronglyConnected<'g, G, R>
where
    G: RootedGraph,
    R: Reduce<G::Vertex> + Clone,
{
    type Output = SccDecomposition<G::Vertex>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        let mut tarjan = Tarjan::new();
        let mut search = DfsConfiguration::with_parts(
            self.graph,
            self.reduce.clone(),
            Set::<R::Canonical>::default(),
        );
        let outcome = search.run(&mut tarjan, cancel);
        debug!(
            "found {} strongly connected components among {} vertices",
            tarjan.components.len(),
            tarjan.data.len()
        );
        SccDecomposition {
            components: tarjan.components,
            trivial: tarjan.trivial,
            complete: outcome == Outcome::Exhausted,
        }
    }
}
