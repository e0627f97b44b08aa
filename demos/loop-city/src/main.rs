//! loop-city: end-to-end demo of the lightning-rod route engine.
//!
//! Builds a synthetic walking city, synthesizes a loop from its centre,
//! rates it, and then asks for a way home from half-way round.
//!
//! Request parameters can be given as `key=value` arguments, e.g.
//!
//! ```text
//! RUST_LOG=info cargo run -p loop-city -- min_length=3 max_length=6 measure_park=2 seed=7
//! ```

mod city;

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::info;
use serde_json::json;

use lr_core::{EngineSettings, GeoPoint, RoutingConfig};
use lr_graph::{load_graph_reader, load_pois_reader};
use lr_routing::{Route, RouteEngine, RoutingContext, annotate_areas};

use city::{POIS_CSV, areas, city_csv};

// ── Constants ─────────────────────────────────────────────────────────────────

const START: GeoPoint = GeoPoint { lat: 52.2055, lon: 0.1240 };
const RATING: f32 = 4.5;

fn route_json(route: &Route, engine: &RouteEngine) -> serde_json::Value {
    let coords: Vec<[f64; 2]> = route
        .coordinates(engine.context().graph())
        .into_iter()
        .map(|p| [p.lat, p.lon])
        .collect();
    json!({
        "tag": route.tag,
        "length_km": route.length_km,
        "nodes": route.nodes.len(),
        "coordinates": coords,
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let params: HashMap<String, String> = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect();
    let config = RoutingConfig::from_params(&params)?;
    let settings = EngineSettings { seed: config.seed, ..EngineSettings::default() };

    println!("=== loop-city: lightning-rod loops ===");
    println!(
        "Window: {}..{} km  |  Workers: {}  |  Attempt budget: {}",
        config.min_length,
        config.max_length,
        settings.workers,
        settings.attempt_budget()
    );
    println!();

    // 1. Load the city through the CSV loaders.
    let (nodes_csv, edges_csv) = city_csv();
    let mut builder = load_graph_reader(Cursor::new(nodes_csv), Cursor::new(edges_csv))?;
    let pois = load_pois_reader(Cursor::new(POIS_CSV))?;

    // 2. Flag nodes by the common and the pond.
    let flagged = annotate_areas(&mut builder, &areas(), settings.area_distance_km)?;
    println!("Area outlines flagged {flagged} nodes");

    // 3. Tag roads with POIs, freeze and index.
    let t0 = Instant::now();
    let ctx = Arc::new(RoutingContext::from_builder(builder, &pois, &settings)?);
    println!(
        "Road graph: {} nodes, {} edges, {} POIs  (ready in {:.1} ms)",
        ctx.graph().node_count(),
        ctx.graph().edge_count(),
        pois.len(),
        t0.elapsed().as_secs_f64() * 1e3
    );
    let engine = RouteEngine::new(ctx, settings)?;

    // 4. A loop from the city centre.
    let t0 = Instant::now();
    let route = engine.synthesize_loop(START, &config)?;
    println!(
        "Loop: {} nodes, {:.2} km  (found in {:.1} ms)",
        route.nodes.len(),
        route.length_km,
        t0.elapsed().as_secs_f64() * 1e3
    );
    println!("{}", serde_json::to_string_pretty(&route_json(&route, &engine))?);
    println!();

    // 5. Rate it.
    let rated = engine.rate(&route.tag, RATING)?;
    println!("Rated {rated} edges with {RATING}");

    // 6. Head home from half-way round, by the shortest route found.
    let graph = engine.context().graph();
    let midway = graph.node_pos[route.nodes[route.nodes.len() / 2].index()];
    let home = engine.return_home(&route.tag, midway, 0.0, &config)?;
    info!("return-home tag {}", home.tag);
    println!(
        "Way home from {midway}: {} nodes, {:.2} km in total",
        home.nodes.len(),
        home.length_km
    );

    // 7. Tags are self-contained.
    let parsed = engine.parse_tag(&home.tag)?;
    println!("Parsed tag back into {} nodes", parsed.nodes.len());

    Ok(())
}
