//! Road graph arena and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  The
//! outgoing edges of `NodeId n` are the EdgeIds
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! and within that range edges are sorted by target node.  That ordering is
//! load-bearing: `connections(n)` is a stable, ascending list of neighbours,
//! which the path-tag codec relies on to turn a transition into a digit.
//!
//! Everything is immutable after `build()` except the per-edge rating cells.

use log::info;

use lr_core::{Category, EdgeId, GeoPoint, NodeId, Point2, Projector, TagSet};

use crate::rating::EdgeRating;
use crate::{GraphError, GraphResult};

// ── Node flags ────────────────────────────────────────────────────────────────

/// Landscape flags attached to a node during ingestion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub near_water: bool,
    pub near_park: bool,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format.
///
/// Fields are `pub` for indexed access on hot paths.  Build with
/// [`RoadGraphBuilder`].
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    pub node_pos: Vec<GeoPoint>,
    /// Planar projection of `node_pos`, computed once at build.
    pub node_xy: Vec<Point2>,
    pub node_flags: Vec<NodeFlags>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Great-circle length in kilometres.
    pub edge_length_km: Vec<f64>,
    /// Highway weight, see [`road_class_weight`](crate::road_class_weight).
    pub edge_road_class: Vec<f32>,
    pub edge_tags: Vec<TagSet>,
    pub edge_rating: Vec<EdgeRating>,

    projector: Projector,
}

impl RoadGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Highest node id in the graph, `None` when empty.
    pub fn largest_node_id(&self) -> Option<NodeId> {
        self.node_count().checked_sub(1).map(|n| NodeId(n as u32))
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.connections(node).len()
    }

    /// Neighbours of `node` in ascending id order.
    #[inline]
    pub fn connections(&self, node: NodeId) -> &[NodeId] {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        &self.edge_to[start..end]
    }

    /// The edge `from → to`, if present.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains(from) {
            return None;
        }
        let start = self.node_out_start[from.index()];
        self.connections(from)
            .binary_search(&to)
            .ok()
            .map(|offset| EdgeId(start + offset as u32))
    }

    pub fn edge(&self, from: NodeId, to: NodeId) -> GraphResult<EdgeId> {
        self.find_edge(from, to).ok_or(GraphError::EdgeNotFound { from, to })
    }

    /// Sum of edge lengths along `path`.  Fails on the first pair that is not
    /// an edge.
    pub fn path_length(&self, path: &[NodeId]) -> GraphResult<f64> {
        path.windows(2)
            .map(|w| self.edge(w[0], w[1]).map(|e| self.edge_length_km[e.index()]))
            .sum()
    }

    /// One representative edge per road: `a → b` with `a < b`, plus one-way
    /// edges whose reverse does not exist.
    pub fn segments(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        (0..self.edge_count()).filter_map(move |i| {
            let (from, to) = (self.edge_from[i], self.edge_to[i]);
            (from < to || self.find_edge(to, from).is_none()).then_some((from, to))
        })
    }

    // ── Ratings ───────────────────────────────────────────────────────────

    /// Record a user rating (0..=5) on the edge `from → to`.
    pub fn update_rating(&self, from: NodeId, to: NodeId, value: f32) -> GraphResult<()> {
        if !(0.0..=5.0).contains(&value) {
            return Err(GraphError::RatingOutOfRange(value));
        }
        let edge = self.edge(from, to)?;
        self.edge_rating[edge.index()].add(value);
        Ok(())
    }

    pub fn average_rating(&self, edge: EdgeId) -> Option<f32> {
        self.edge_rating[edge.index()].average()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// ```
/// use lr_core::GeoPoint;
/// use lr_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(51.05, 3.72));
/// let c = b.add_node(GeoPoint::new(51.06, 3.72));
/// b.add_road(a, c, 0.3);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.edge_count(), 2); // both directions
/// ```
pub struct RoadGraphBuilder {
    nodes: Vec<RawNode>,
    raw_edges: Vec<RawEdge>,
}

struct RawNode {
    pos: GeoPoint,
    flags: NodeFlags,
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    road_class: f32,
    tags: TagSet,
    rating: (f32, u32),
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        self.add_node_with_flags(pos, NodeFlags::default())
    }

    pub fn add_node_with_flags(&mut self, pos: GeoPoint, flags: NodeFlags) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RawNode { pos, flags });
        id
    }

    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, road_class: f32) {
        self.add_rated_edge(from, to, road_class, 0.0, 0);
    }

    /// Directed edge carrying an existing rating history.
    pub fn add_rated_edge(&mut self, from: NodeId, to: NodeId, road_class: f32, sum: f32, count: u32) {
        self.raw_edges.push(RawEdge {
            from,
            to,
            road_class,
            tags: TagSet::EMPTY,
            rating: (sum, count),
        });
    }

    /// Edges in both directions for an ordinary two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, road_class: f32) {
        self.add_directed_edge(a, b, road_class);
        self.add_directed_edge(b, a, road_class);
    }

    /// Add `tags` to the edges `a → b` and `b → a` added so far.
    pub fn tag_road(&mut self, a: NodeId, b: NodeId, tags: TagSet) {
        for e in &mut self.raw_edges {
            if (e.from, e.to) == (a, b) || (e.from, e.to) == (b, a) {
                e.tags = e.tags.union(tags);
            }
        }
    }

    /// Apply many road tags at once; cheaper than repeated [`tag_road`](Self::tag_road).
    pub fn apply_tags<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = ((NodeId, NodeId), TagSet)>,
    {
        let mut by_pair: rustc_hash::FxHashMap<(NodeId, NodeId), TagSet> = Default::default();
        for ((a, b), set) in tags {
            let key = (a.min(b), a.max(b));
            let slot = by_pair.entry(key).or_default();
            *slot = slot.union(set);
        }
        for e in &mut self.raw_edges {
            if let Some(set) = by_pair.get(&(e.from.min(e.to), e.from.max(e.to))) {
                e.tags = e.tags.union(*set);
            }
        }
    }

    /// Raise water/park proximity flags from per-node category sets,
    /// indexed by node id.  Flags already set stay set.
    pub fn flag_nodes(&mut self, near: &[TagSet]) {
        for (node, set) in self.nodes.iter_mut().zip(near) {
            node.flags.near_water |= set.contains(Category::Water);
            node.flags.near_park |= set.contains(Category::Park);
        }
    }

    pub fn node_flags(&self, id: NodeId) -> NodeFlags {
        self.nodes[id.index()].flags
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()].pos
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Projector fitted to the nodes added so far.
    pub fn projector(&self) -> Projector {
        Projector::fit(self.nodes.iter().map(|n| n.pos))
    }

    /// Directed edges added so far, as `(from, to)` pairs.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.raw_edges.iter().map(|e| (e.from, e.to))
    }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Edges referencing unknown nodes are an error.  Self-loops are dropped
    /// and duplicate `(from, to)` pairs collapse onto the first one added.
    pub fn build(self) -> GraphResult<RoadGraph> {
        let node_count = self.nodes.len();
        let added = self.raw_edges.len();

        let mut raw = self.raw_edges;
        for e in &raw {
            for n in [e.from, e.to] {
                if n.index() >= node_count {
                    return Err(GraphError::NodeNotFound(n));
                }
            }
        }
        raw.retain(|e| e.from != e.to);
        // Stable sort keeps insertion order among duplicates.
        raw.sort_by_key(|e| (e.from, e.to));
        raw.dedup_by_key(|e| (e.from, e.to));

        let projector = Projector::fit(self.nodes.iter().map(|n| n.pos));
        let node_pos: Vec<GeoPoint> = self.nodes.iter().map(|n| n.pos).collect();
        let node_xy: Vec<Point2> = node_pos.iter().map(|&p| projector.project(p)).collect();
        let node_flags: Vec<NodeFlags> = self.nodes.iter().map(|n| n.flags).collect();

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_km: Vec<f64> = raw
            .iter()
            .map(|e| node_pos[e.from.index()].distance_km(node_pos[e.to.index()]))
            .collect();
        let edge_road_class: Vec<f32> = raw.iter().map(|e| e.road_class).collect();
        let edge_tags: Vec<TagSet> = raw
            .iter()
            .map(|e| {
                let (a, b) = (node_flags[e.from.index()], node_flags[e.to.index()]);
                let mut tags = e.tags;
                if a.near_water && b.near_water {
                    tags.insert(Category::Water);
                }
                if a.near_park && b.near_park {
                    tags.insert(Category::Park);
                }
                tags
            })
            .collect();
        let edge_rating: Vec<EdgeRating> = raw
            .iter()
            .map(|e| EdgeRating::new(e.rating.0, e.rating.1))
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        info!(
            "road graph built: {} nodes, {} edges ({} dropped as loops or duplicates)",
            node_count,
            raw.len(),
            added - raw.len()
        );

        Ok(RoadGraph {
            node_pos,
            node_xy,
            node_flags,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_km,
            edge_road_class,
            edge_tags,
            edge_rating,
            projector,
        })
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
