use std::fmt::Debug;

use crate::RootedGraph;

use super::{DeterministicRelation, SemanticRelation};

/// A [`SemanticRelation`] seen as a rooted graph: the roots are its initial
/// configurations and the neighbours of a configuration are all configurations one
/// step away, in the order of the enabled actions.
#[derive(Debug, Clone)]
pub struct RelationGraph<S> {
    relation: S,
}

impl<S: SemanticRelation> RelationGraph<S> {
    /// Creates the graph of `relation`.
    pub fn new(relation: S) -> Self {
        Self { relation }
    }

    /// The underlying relation.
    pub fn relation(&self) -> &S {
        &self.relation
    }
}

impl<S: SemanticRelation> RootedGraph for RelationGraph<S> {
    type Vertex = S::Configuration;

    type Roots<'a> = std::vec::IntoIter<S::Configuration>
    where
        Self: 'a;

    type Neighbours<'a> = std::vec::IntoIter<S::Configuration>
    where
        Self: 'a;

    fn roots(&self) -> Self::Roots<'_> {
        self.relation.initial().into_iter()
    }

    fn neighbours(&self, vertex: &S::Configuration) -> Self::Neighbours<'_> {
        self.relation
            .actions(vertex)
            .iter()
            .flat_map(|action| self.relation.execute(action, vertex))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// A deterministic relation viewed as a [`SemanticRelation`] with at most one of each.
#[derive(Debug, Clone)]
pub struct Lifted<D>(pub D);

impl<D> SemanticRelation for Lifted<D>
where
    D: DeterministicRelation,
    D::Action: Clone + Debug,
    D::Configuration: Clone + Debug,
{
    type Action = D::Action;
    type Configuration = D::Configuration;

    fn initial(&self) -> Vec<Self::Configuration> {
        self.0.initial().into_iter().collect()
    }

    fn actions(&self, configuration: &Self::Configuration) -> Vec<Self::Action> {
        self.0.actions(configuration).into_iter().collect()
    }

    fn execute(
        &self,
        action: &Self::Action,
        configuration: &Self::Configuration,
    ) -> Vec<Self::Configuration> {
        self.0
            .execute(action.clone(), configuration.clone())
            .ok()
            .into_iter()
            .collect()
    }
}
