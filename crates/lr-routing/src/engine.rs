//! The route engine: request entry points and the attempt race.
//!
//! # Concurrency
//!
//! Synthesis is stochastic and an attempt may find no loop in the length
//! window.  Each request therefore races attempts on a bounded Rayon pool:
//!
//! - `workers` attempts start immediately;
//! - results arrive on an mpsc channel in completion order;
//! - the first attempt that produced a route wins and the request returns;
//! - every empty result is replaced by a fresh attempt until
//!   `workers * retry_factor` attempts have been submitted.
//!
//! Once a request is decided a shared flag tells attempts still queued on
//! the pool to skip their work; anything that still completes is dropped
//! with the channel.  Attempts only read the shared [`RoutingContext`]; the
//! poisoned overlays they build are private to them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use lr_core::{EngineSettings, GeoPoint, NodeId, RouteRng, RoutingConfig};
use lr_graph::RoadGraph;

use crate::rod::{Candidate, close_rod, generate_rod, orient_rod};
use crate::{RoutingContext, RoutingError, RoutingResult, decode_tag, encode_tag};

// ── Route ─────────────────────────────────────────────────────────────────────

/// A route handed back to a client.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub length_km: f64,
    /// Opaque tag the client resubmits for rating or heading home.
    pub tag: String,
}

impl Route {
    pub fn coordinates(&self, graph: &RoadGraph) -> Vec<GeoPoint> {
        self.nodes.iter().map(|n| graph.node_pos[n.index()]).collect()
    }
}

/// How the winning attempt picks among its candidates.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Selection {
    Uniform,
    Shortest,
}

/// First candidate, in selection order, that can be tagged.
fn select(graph: &RoadGraph, mut candidates: Vec<Candidate>, how: Selection, rng: &mut RouteRng) -> Option<Route> {
    match how {
        Selection::Uniform => rng.shuffle(&mut candidates),
        Selection::Shortest => candidates.sort_by(|a, b| a.length_km.total_cmp(&b.length_km)),
    }
    candidates.into_iter().find_map(|c| match encode_tag(graph, &c.nodes) {
        Ok(tag) => Some(Route { nodes: c.nodes, length_km: c.length_km, tag }),
        Err(e) => {
            debug!("dropping untaggable candidate: {e}");
            None
        }
    })
}

// ── RouteEngine ───────────────────────────────────────────────────────────────

pub struct RouteEngine {
    ctx: Arc<RoutingContext>,
    pool: ThreadPool,
    settings: EngineSettings,
}

impl RouteEngine {
    pub fn new(ctx: Arc<RoutingContext>, settings: EngineSettings) -> RoutingResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.workers.max(1))
            .thread_name(|i| format!("lr-attempt-{i}"))
            .build()
            .map_err(|e| RoutingError::Pool(e.to_string()))?;
        Ok(Self { ctx, pool, settings })
    }

    pub fn context(&self) -> &Arc<RoutingContext> {
        &self.ctx
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// A loop through the road nearest `start`.
    pub fn synthesize_loop(&self, start: GeoPoint, config: &RoutingConfig) -> RoutingResult<Route> {
        config.validate()?;
        let (a, b) = self.ctx.nearest_edge(start).ok_or(RoutingError::NoNearbyEdge(start))?;
        info!("loop request at {start}: start edge {a} - {b}, window {}..{} km", config.min_length, config.max_length);

        let cfg = config.clone();
        let route = self.race(config.seed, move |ctx, rng| {
            let graph = ctx.graph();
            let rod = generate_rod(graph, a, &cfg, rng)?;
            let (rod, end) = orient_rod(rod, a, b);
            let candidates = close_rod(graph, end, &rod, &cfg, &rod).ok()?;
            debug!("{} routes found from a {}-node rod", candidates.len(), rod.len());
            select(graph, candidates, Selection::Uniform, rng)
        })?;

        info!("route selected: {} nodes, {:.2} km", route.nodes.len(), route.length_km);
        Ok(route)
    }

    /// Replace the rest of the route in `tag` with a way home from `current`.
    ///
    /// The new leg runs from the user's position on the route back to the
    /// route's first node and is `distance_km` long, up to
    /// `config.return_tolerance`.  A distance of 0 asks for the shortest leg
    /// the search can find instead.
    pub fn return_home(
        &self,
        tag: &str,
        current: GeoPoint,
        distance_km: f64,
        config: &RoutingConfig,
    ) -> RoutingResult<Route> {
        let graph = self.ctx.graph();
        let path = decode_tag(graph, tag)?;
        let edge = self.ctx.nearest_edge(current).ok_or(RoutingError::NoNearbyEdge(current))?;
        let ind = locate_on_path(graph, &path, edge).ok_or(RoutingError::NotOnRoute)?;

        let here = path[ind];
        let origin = path[0];
        let (min, max, how) = if distance_km <= 0.0 {
            let crow = graph.node_pos[here.index()].distance_km(graph.node_pos[origin.index()]);
            (0.0, config.max_length.max(3.0 * crow + config.return_tolerance), Selection::Shortest)
        } else {
            (distance_km, distance_km + config.return_tolerance, Selection::Uniform)
        };
        let cfg = config.with_window(min, max);
        cfg.validate()?;
        info!("return-home from {here} (step {ind} of {}), window {min:.2}..{max:.2} km", path.len());

        let travelled: Vec<NodeId> = path[..=ind].iter().rev().copied().collect();
        let kept: Vec<NodeId> = path[..ind].to_vec();
        let kept_km = graph.path_length(&path[..=ind])?;
        let route = self.race(config.seed, move |ctx, rng| {
            let graph = ctx.graph();
            let rod = generate_rod(graph, origin, &cfg, rng)?;
            let mut avoid = travelled.clone();
            avoid.extend_from_slice(&rod);
            let legs = close_rod(graph, here, &avoid, &cfg, &rod).ok()?;
            debug!("{} homeward legs found", legs.len());
            // Each leg runs origin → … → here; the user walks it backwards.
            let candidates = legs
                .into_iter()
                .map(|leg| {
                    let mut nodes = kept.clone();
                    nodes.extend(leg.nodes.iter().rev());
                    Candidate { nodes, length_km: kept_km + leg.length_km }
                })
                .collect();
            select(graph, candidates, how, rng)
        })?;

        info!("way home selected: {} nodes, {:.2} km", route.nodes.len(), route.length_km);
        Ok(route)
    }

    /// Apply a 0..=5 rating to every edge of the route in `tag`.  Returns the
    /// number of edges rated.
    pub fn rate(&self, tag: &str, value: f32) -> RoutingResult<usize> {
        if !(0.0..=5.0).contains(&value) {
            return Err(RoutingError::RatingOutOfRange(value));
        }
        let graph = self.ctx.graph();
        let path = decode_tag(graph, tag)?;
        for w in path.windows(2) {
            graph.update_rating(w[0], w[1], value)?;
        }
        info!("rated {} edges with {value}", path.len().saturating_sub(1));
        Ok(path.len().saturating_sub(1))
    }

    /// Expand a tag back into a full route.
    pub fn parse_tag(&self, tag: &str) -> RoutingResult<Route> {
        let graph = self.ctx.graph();
        let nodes = decode_tag(graph, tag)?;
        let length_km = graph.path_length(&nodes)?;
        Ok(Route { nodes, length_km, tag: tag.trim().to_string() })
    }

    // ── Attempt race ──────────────────────────────────────────────────────

    /// Run `attempt` on the pool until one returns `Some` or the attempt
    /// budget is spent.
    fn race<T, F>(&self, seed: Option<u64>, attempt: F) -> RoutingResult<T>
    where
        T: Send + 'static,
        F: Fn(&RoutingContext, &mut RouteRng) -> Option<T> + Send + Sync + 'static,
    {
        let seed = seed.or(self.settings.seed);
        let budget = self.settings.attempt_budget();
        let attempt = Arc::new(attempt);
        let decided = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<Option<T>>();

        let submit = |n: usize| {
            let tx = tx.clone();
            let ctx = Arc::clone(&self.ctx);
            let attempt = Arc::clone(&attempt);
            let decided = Arc::clone(&decided);
            self.pool.spawn(move || {
                if decided.load(Ordering::Acquire) {
                    return;
                }
                let mut rng = RouteRng::for_attempt(seed, n as u64);
                // The receiver is gone once the request is decided.
                let _ = tx.send((*attempt)(&ctx, &mut rng));
            });
        };

        let mut submitted = 0;
        while submitted < self.settings.workers.max(1).min(budget) {
            submit(submitted);
            submitted += 1;
        }

        let mut finished = 0;
        while finished < submitted {
            let result = rx
                .recv()
                .map_err(|_| RoutingError::Pool("attempt channel closed".into()))?;
            finished += 1;
            if let Some(found) = result {
                decided.store(true, Ordering::Release);
                debug!("request decided after {finished} of {submitted} attempts");
                return Ok(found);
            }
            if submitted < budget {
                submit(submitted);
                submitted += 1;
            }
        }

        warn!("no route after {submitted} attempts");
        Err(RoutingError::NoRoute { attempts: submitted })
    }
}

/// Index of the route node the user is at, given the road `edge` they are
/// nearest to.
///
/// Prefers a route step along that road (taking the node ahead), then any
/// occurrence of either endpoint, then a route node adjacent to one.
pub(crate) fn locate_on_path(graph: &RoadGraph, path: &[NodeId], edge: (NodeId, NodeId)) -> Option<usize> {
    let (a, b) = edge;
    if let Some(i) = path
        .windows(2)
        .position(|w| (w[0], w[1]) == (a, b) || (w[0], w[1]) == (b, a))
    {
        return Some(i + 1);
    }
    if let Some(i) = path.iter().position(|&n| n == a || n == b) {
        return Some(i);
    }
    path.iter().position(|&n| {
        let near = graph.connections(n);
        near.binary_search(&a).is_ok() || near.binary_search(&b).is_ok()
    })
}
