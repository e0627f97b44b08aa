//! CSV graph and POI loaders.
//!
//! # CSV formats
//!
//! Nodes (`water` and `park` are optional and default to `false`):
//!
//! ```csv
//! id,lat,lon,water,park
//! 1001,51.0543,3.7174,false,true
//! 1002,51.0551,3.7190,false,false
//! ```
//!
//! Edges, one row per road (`oneway` and the rating columns are optional):
//!
//! ```csv
//! from,to,highway,oneway,rating_sum,rating_count
//! 1001,1002,residential,false,8.0,2
//! ```
//!
//! POIs:
//!
//! ```csv
//! id,lat,lon,category
//! 0,51.0547,3.7180,park
//! ```
//!
//! Node ids in the file are arbitrary integers; they are renumbered densely
//! in row order.  Roads whose highway type is not walkable are skipped, as
//! are POIs with an unknown category.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use lr_core::{Category, GeoPoint, NodeId, PoiId};

use crate::network::NodeFlags;
use crate::{GraphError, GraphResult, RoadGraphBuilder, road_class_weight};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id: u64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    water: bool,
    #[serde(default)]
    park: bool,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from: u64,
    to: u64,
    highway: String,
    #[serde(default)]
    oneway: bool,
    #[serde(default)]
    rating_sum: f32,
    #[serde(default)]
    rating_count: u32,
}

#[derive(Deserialize)]
struct PoiRecord {
    id: u32,
    lat: f64,
    lon: f64,
    category: String,
}

/// A point of interest ready for the spatial join.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    pub pos: GeoPoint,
    pub category: Category,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load nodes and edges from two CSV files into a builder.
///
/// A builder rather than a graph is returned so callers can attach POI tags
/// before freezing it.
pub fn load_graph_csv(nodes: &Path, edges: &Path) -> GraphResult<RoadGraphBuilder> {
    load_graph_reader(File::open(nodes)?, File::open(edges)?)
}

/// Like [`load_graph_csv`] but accepts any `Read` sources.
pub fn load_graph_reader<N: Read, E: Read>(nodes: N, edges: E) -> GraphResult<RoadGraphBuilder> {
    let mut builder = RoadGraphBuilder::new();
    let mut ids: FxHashMap<u64, NodeId> = FxHashMap::default();

    for result in csv::Reader::from_reader(nodes).deserialize::<NodeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let flags = NodeFlags { near_water: row.water, near_park: row.park };
        let id = builder.add_node_with_flags(GeoPoint::new(row.lat, row.lon), flags);
        if ids.insert(row.id, id).is_some() {
            return Err(GraphError::Parse(format!("duplicate node id {}", row.id)));
        }
    }

    let lookup = |raw: u64| {
        ids.get(&raw)
            .copied()
            .ok_or_else(|| GraphError::Parse(format!("edge references unknown node {raw}")))
    };

    let mut skipped = 0usize;
    for result in csv::Reader::from_reader(edges).deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let (from, to) = (lookup(row.from)?, lookup(row.to)?);
        let Some(class) = road_class_weight(&row.highway) else {
            skipped += 1;
            continue;
        };
        builder.add_rated_edge(from, to, class, row.rating_sum, row.rating_count);
        if !row.oneway {
            builder.add_rated_edge(to, from, class, row.rating_sum, row.rating_count);
        }
    }

    info!(
        "loaded {} nodes, {} directed edges ({skipped} non-walkable roads skipped)",
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder)
}

pub fn load_pois_csv(path: &Path) -> GraphResult<Vec<Poi>> {
    load_pois_reader(File::open(path)?)
}

pub fn load_pois_reader<R: Read>(reader: R) -> GraphResult<Vec<Poi>> {
    let mut pois = Vec::new();
    for result in csv::Reader::from_reader(reader).deserialize::<PoiRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        match row.category.parse::<Category>() {
            Ok(category) => pois.push(Poi {
                id: PoiId(row.id),
                pos: GeoPoint::new(row.lat, row.lon),
                category,
            }),
            Err(()) => debug!("skipping POI {} with category {:?}", row.id, row.category),
        }
    }
    Ok(pois)
}
