//! Shared, build-once routing state.
//!
//! A [`RoutingContext`] bundles the road graph with the bucket grid used to
//! snap coordinates onto road segments, and remembers which roads each POI
//! was attached to.  Construct it once at startup, wrap it in an `Arc`, and
//! hand clones to request handlers.  Apart from edge ratings nothing in it
//! changes after construction.

use std::collections::BTreeMap;

use log::info;

use lr_core::{Category, EngineSettings, GeoPoint, NodeId, PoiId};
use lr_graph::{Poi, RoadGraph, RoadGraphBuilder};
use lr_spatial::{
    Area, Bounds, BucketGrid, JoinPoi, JoinResult, JoinSegment, areas_near_points, nearest_segment, spatial_join,
};

use crate::RoutingResult;

pub const AUTO_CELLS_PER_AXIS: usize = 200;

pub struct RoutingContext {
    graph: RoadGraph,
    grid: BucketGrid<(NodeId, NodeId)>,
    poi_roads: BTreeMap<PoiId, Vec<(NodeId, NodeId)>>,
    node_pois: BTreeMap<NodeId, Vec<PoiId>>,
}

impl RoutingContext {
    /// Index `graph` for nearest-edge lookups.
    ///
    /// A non-positive `settings.cell_size_km` sizes cells so the longer side
    /// of the graph spans [`AUTO_CELLS_PER_AXIS`] of them.
    pub fn new(graph: RoadGraph, settings: &EngineSettings) -> RoutingResult<Self> {
        let padding = settings.padding_km;
        let bounds = Bounds::from_points(graph.node_xy.iter().copied())
            .unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0))
            .padded(padding);
        let cell_size = if settings.cell_size_km > 0.0 {
            settings.cell_size_km
        } else {
            BucketGrid::<(NodeId, NodeId)>::cell_size_for(bounds, AUTO_CELLS_PER_AXIS)
        };
        let mut grid = BucketGrid::build(bounds, cell_size)?;

        let mut segments = 0usize;
        for (a, b) in graph.segments() {
            let area = Bounds::around(graph.node_xy[a.index()], graph.node_xy[b.index()], padding);
            grid.insert(area, (a, b));
            segments += 1;
        }

        info!(
            "routing context ready: {segments} segments in a {}x{} grid ({} entries)",
            grid.width(),
            grid.height(),
            grid.entry_count()
        );
        Ok(Self { graph, grid, poi_roads: BTreeMap::new(), node_pois: BTreeMap::new() })
    }

    /// Tag roads with nearby POIs, freeze the graph and index it.
    pub fn from_builder(
        mut builder: RoadGraphBuilder,
        pois: &[Poi],
        settings: &EngineSettings,
    ) -> RoutingResult<Self> {
        if pois.is_empty() {
            return Self::new(builder.build()?, settings);
        }
        let join = tag_pois(&builder, pois, settings.padding_km);
        let node_pois = join.node_pois();
        builder.apply_tags(join.segment_tags);
        let mut ctx = Self::new(builder.build()?, settings)?;
        info!("{} of {} POIs attached to roads", join.poi_segments.len(), pois.len());
        ctx.poi_roads = join.poi_segments;
        ctx.node_pois = node_pois;
        Ok(ctx)
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn grid(&self) -> &BucketGrid<(NodeId, NodeId)> {
        &self.grid
    }

    /// POIs attached to a road ending at `node`.
    pub fn pois_near(&self, node: NodeId) -> &[PoiId] {
        self.node_pois.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Roads, as `(low, high)` node pairs, that `poi` was attached to.
    pub fn poi_roads(&self, poi: PoiId) -> &[(NodeId, NodeId)] {
        self.poi_roads.get(&poi).map_or(&[], Vec::as_slice)
    }

    /// Endpoints of the road segment closest to `pos`, looking only at the
    /// grid cell `pos` falls in.
    pub fn nearest_edge(&self, pos: GeoPoint) -> Option<(NodeId, NodeId)> {
        let p = self.graph.projector().project(pos);
        let xy = &self.graph.node_xy;
        nearest_segment(p, self.grid.query_point(p), |&(a, b)| (xy[a.index()], xy[b.index()])).copied()
    }
}

/// Spatial join of `pois` against the roads added to `builder` so far.
///
/// Keys are `(low, high)` node pairs, one per road regardless of direction.
pub fn tag_pois(builder: &RoadGraphBuilder, pois: &[Poi], padding_km: f64) -> JoinResult<(NodeId, NodeId)> {
    let projector = builder.projector();
    let mut pairs: Vec<(NodeId, NodeId)> = builder
        .edge_pairs()
        .filter(|&(a, b)| a != b && a.max(b).index() < builder.node_count())
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();
    pairs.sort_unstable();
    pairs.dedup();

    let segments: Vec<JoinSegment<(NodeId, NodeId)>> = pairs
        .into_iter()
        .map(|(a, b)| JoinSegment {
            key: (a, b),
            a: projector.project(builder.node_pos(a)),
            b: projector.project(builder.node_pos(b)),
        })
        .collect();
    let join_pois: Vec<JoinPoi> = pois
        .iter()
        .map(|p| JoinPoi { id: p.id, at: projector.project(p.pos), category: p.category })
        .collect();

    spatial_join(&segments, &join_pois, padding_km)
}

/// A park or water body outline in geographic coordinates.
#[derive(Clone, Debug)]
pub struct AreaOutline {
    pub category: Category,
    pub outline: Vec<GeoPoint>,
}

/// Flag nodes lying within `max_distance_km` of a park or water area.
/// Other categories are ignored.  Returns the number of nodes flagged.
pub fn annotate_areas(
    builder: &mut RoadGraphBuilder,
    areas: &[AreaOutline],
    max_distance_km: f64,
) -> RoutingResult<usize> {
    let projector = builder.projector();
    let points: Vec<_> = (0..builder.node_count())
        .map(|i| projector.project(builder.node_pos(NodeId(i as u32))))
        .collect();
    let areas: Vec<Area> = areas
        .iter()
        .filter(|a| matches!(a.category, Category::Park | Category::Water))
        .map(|a| Area { category: a.category, outline: a.outline.iter().map(|&p| projector.project(p)).collect() })
        .collect();

    let near = areas_near_points(&points, &areas, max_distance_km)?;
    let flagged = near.iter().filter(|set| !set.is_empty()).count();
    builder.flag_nodes(&near);
    info!("{flagged} of {} nodes lie near {} park/water areas", points.len(), areas.len());
    Ok(flagged)
}
