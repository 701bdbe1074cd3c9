use crate::{DeterministicRelation, Identity, Reduce, RootedGraph, Visited};

use super::{BfsAction, BfsConfiguration, DfsAction, DfsConfiguration};

/// The depth-first traversal of a graph as a deterministic relation: configurations are
/// [`DfsConfiguration`]s and the single enabled action is the one computed by
/// [`DfsConfiguration::action`]. Driving it with a [`crate::Sequencer`] visits the
/// vertices in the same order as [`DfsConfiguration::run`].
#[derive(Debug, Clone)]
pub struct DepthFirstRelation<'g, G, R = Identity> {
    graph: &'g G,
    reduce: R,
    bound: Option<usize>,
}

impl<'g, G: RootedGraph> DepthFirstRelation<'g, G> {
    /// The relation of the plain depth-first traversal of `graph`.
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            reduce: Identity,
            bound: None,
        }
    }
}

impl<'g, G: RootedGraph, R> DepthFirstRelation<'g, G, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> DepthFirstRelation<'g, G, S> {
        DepthFirstRelation {
            graph: self.graph,
            reduce,
            bound: self.bound,
        }
    }

    /// Bounds the depth of the traversal.
    pub fn with_depth_bound(mut self, bound: usize) -> Self {
        self.bound = Some(bound);
        self
    }
}

impl<'g, G, R> DeterministicRelation for DepthFirstRelation<'g, G, R>
where
    G: RootedGraph,
    R: Reduce<G::Vertex> + Clone,
{
    type Action = DfsAction<G::Vertex>;
    type Configuration = DfsConfiguration<'g, G, R, Visited<R::Canonical>>;

    fn initial(&self) -> Option<Self::Configuration> {
        Some(
            DfsConfiguration::with_parts(
                self.graph,
                self.reduce.clone(),
                Visited::for_graph(self.graph),
            )
            .with_optional_bound(self.bound),
        )
    }

    fn actions(&self, configuration: &Self::Configuration) -> Option<Self::Action> {
        configuration.action()
    }

    fn execute(
        &self,
        action: Self::Action,
        mut configuration: Self::Configuration,
    ) -> Result<Self::Configuration, Self::Configuration> {
        configuration.execute(action, &mut ());
        Ok(configuration)
    }
}

/// The breadth-first counterpart of [`DepthFirstRelation`].
#[derive(Debug, Clone)]
pub struct BreadthFirstRelation<'g, G, R = Identity> {
    graph: &'g G,
    reduce: R,
}

impl<'g, G: RootedGraph> BreadthFirstRelation<'g, G> {
    /// The relation of the plain breadth-first traversal of `graph`.
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            reduce: Identity,
        }
    }
}

impl<'g, G: RootedGraph, R> BreadthFirstRelation<'g, G, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> BreadthFirstRelation<'g, G, S> {
        BreadthFirstRelation {
            graph: self.graph,
            reduce,
        }
    }
}

impl<'g, G, R> DeterministicRelation for BreadthFirstRelation<'g, G, R>
where
    G: RootedGraph,
    R: Reduce<G::Vertex> + Clone,
{
    type Action = BfsAction<G::Vertex>;
    type Configuration = BfsConfiguration<'g, G, R, Visited<R::Canonical>>;

    fn initial(&self) -> Option<Self::Configuration> {
        Some(BfsConfiguration::with_parts(
            self.graph,
            self.reduce.clone(),
            Visited::for_graph(self.graph),
        ))
    }

    fn actions(&self, configuration: &Self::Configuration) -> Option<Self::Action> {
        configuration.action()
    }

    fn execute(
        &self,
        action: Self::Action,
        mut configuration: Self::Configuration,
    ) -> Result<Self::Configuration, Self::Configuration> {
        configuration.execute(action, &mut ());
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{BreadthFirstRelation, DepthFirstRelation};
    use crate::{
        graph::samples, traversal::DfsAction, BfsConfiguration, DeterministicRelation,
        DfsConfiguration, Never, ReduceWith, Run, Sequencer, StepBudget, Traversal,
    };

    #[test]
    fn sequencing_the_depth_first_relation() {
        let graph = samples::sharing_2();
        let relation = DepthFirstRelation::new(&graph);
        let mut discoveries = vec![];
        let finished = Sequencer::new(&relation)
            .run_observed(&Never, |_, action| {
                if let DfsAction::Unknown { target, .. } = action {
                    discoveries.push(*target);
                }
            });
        assert_eq!(discoveries, vec![1, 2, 3, 4, 5]);

        let finished = finished.map(|c| c.is_exhausted());
        assert_eq!(finished, Some(true));

        let mut direct = DfsConfiguration::new(&graph);
        direct.run(&mut (), &Never);
        let sequenced = Sequencer::new(relation).run_alone();
        assert_eq!(
            sequenced.as_ref().and_then(|c| c.known().remembered()),
            direct.known().remembered()
        );
    }

    #[test]
    fn relations_honour_bounds_and_reductions() {
        let graph = samples::root_cycle_3();
        let bounded =
            Sequencer::new(DepthFirstRelation::new(&graph).with_depth_bound(1)).run_alone();
        assert_eq!(bounded.map(|c| c.discovered()), Some(1));

        let parity = DepthFirstRelation::new(&graph).with_reduction(ReduceWith(|v: &u32| v % 2));
        let reduced = Sequencer::new(parity).run_alone();
        assert_eq!(reduced.map(|c| c.discovered()), Some(2));
    }

    #[test]
    fn sequencing_the_breadth_first_relation() {
        let graph = samples::two_roots_two_graphs();
        let relation = BreadthFirstRelation::new(&graph);
        let initial = relation.initial();
        assert!(initial.as_ref().is_some_and(|c| !c.is_exhausted()));

        let partial = Sequencer::new(&relation).run(&StepBudget::new(3));
        assert_eq!(partial.map(|c| c.discovered()), Some(2));

        let mut direct = BfsConfiguration::new(&graph);
        direct.run(&mut (), &Never);
        let complete = Sequencer::new(&relation).run_alone();
        assert_eq!(
            complete.as_ref().and_then(|c| c.known().remembered()),
            direct.known().remembered()
        );
    }
}
