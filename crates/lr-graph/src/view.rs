//! The read-only graph capability shared by the base graph and its overlays.
//!
//! Search code is written against [`GraphView`] and never needs to know
//! whether it runs on the plain [`RoadGraph`] or on a
//! [`PoisonedGraph`](crate::PoisonedGraph) layered over it.

use lr_core::{EdgeId, NodeId};

use crate::{CostModel, Dijkstra, RoadGraph};

pub trait GraphView: Send + Sync {
    /// The underlying topology and edge attributes.
    fn graph(&self) -> &RoadGraph;

    /// Extra cost factor on `edge`; 1.0 unless overridden.
    #[inline]
    fn penalty(&self, _edge: EdgeId) -> f64 {
        1.0
    }

    #[inline]
    fn edge_cost(&self, edge: EdgeId, model: &CostModel) -> f64 {
        model.edge_cost(self.graph(), edge) * self.penalty(edge)
    }

    /// Lazy shortest-path expansion from `source`, stopping at paths longer
    /// than `max_length_km`.
    fn generate(&self, source: NodeId, model: CostModel, max_length_km: f64) -> Dijkstra<'_, Self>
    where
        Self: Sized,
    {
        Dijkstra::new(self, [source], model, max_length_km)
    }
}

impl GraphView for RoadGraph {
    #[inline]
    fn graph(&self) -> &RoadGraph {
        self
    }
}
