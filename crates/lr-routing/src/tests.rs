//! Unit tests for lr-routing.
//!
//! Test graphs sit near the equator; a 0.003° lattice step is about 0.33 km,
//! so a 20 × 20 lattice spans a little over 6 km each way.

#[cfg(test)]
pub(crate) mod helpers {
    use lr_core::{GeoPoint, NodeId};
    use lr_graph::{RoadGraph, RoadGraphBuilder};

    pub const STEP: f64 = 0.003;

    /// `side × side` lattice builder; node `r * side + c` sits at `(r, c) * step`.
    pub fn lattice_builder(side: usize, step: f64) -> RoadGraphBuilder {
        let mut b = RoadGraphBuilder::new();
        for r in 0..side {
            for c in 0..side {
                b.add_node(GeoPoint::new(r as f64 * step, c as f64 * step));
            }
        }
        let id = |r: usize, c: usize| NodeId((r * side + c) as u32);
        for r in 0..side {
            for c in 0..side {
                if c + 1 < side {
                    b.add_road(id(r, c), id(r, c + 1), 0.3);
                }
                if r + 1 < side {
                    b.add_road(id(r, c), id(r + 1, c), 0.3);
                }
            }
        }
        b
    }

    pub fn lattice(side: usize, step: f64) -> RoadGraph {
        lattice_builder(side, step).build().unwrap()
    }

    /// Hub node 0 with `spokes` one-edge neighbours.
    pub fn star(spokes: usize) -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let hub = b.add_node(GeoPoint::new(0.0, 0.0));
        for i in 0..spokes {
            let angle = i as f64 * std::f64::consts::TAU / spokes as f64;
            let s = b.add_node(GeoPoint::new(0.001 * angle.sin(), 0.001 * angle.cos()));
            b.add_road(hub, s, 0.3);
        }
        b.build().unwrap()
    }

    /// `n` nodes in an east-west line.
    pub fn line(n: usize) -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let ids: Vec<NodeId> = (0..n).map(|i| b.add_node(GeoPoint::new(0.0, i as f64 * 0.001))).collect();
        for w in ids.windows(2) {
            b.add_road(w[0], w[1], 0.3);
        }
        b.build().unwrap()
    }

    pub fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().map(|&n| NodeId(n)).collect()
    }

    /// Every consecutive pair is a graph edge and `length_km` matches the
    /// summed edge lengths.
    pub fn assert_walkable(graph: &RoadGraph, nodes: &[NodeId], length_km: f64) {
        let measured = graph.path_length(nodes).unwrap();
        assert!((measured - length_km).abs() < 1e-6, "{measured} != {length_km}");
    }
}

// ── Path-tag codec ────────────────────────────────────────────────────────────

#[cfg(test)]
mod codec {
    use rustc_hash::FxHashSet;

    use lr_core::{NodeId, RouteRng};

    use super::helpers::{ids, lattice, line, star};
    use crate::{TagError, decode_tag, encode_tag};

    #[test]
    fn roundtrip_on_lattice() {
        let graph = lattice(5, 0.001);
        let path = ids(&[0, 1, 2, 7, 12, 11, 6, 1]);
        let tag = encode_tag(&graph, &path).unwrap();
        assert_eq!(decode_tag(&graph, &tag).unwrap(), path);
    }

    #[test]
    fn tag_uses_url_safe_alphabet_without_padding() {
        let graph = lattice(5, 0.001);
        let tag = encode_tag(&graph, &ids(&[0, 1, 2, 3, 4, 9, 14, 19, 24])).unwrap();
        assert!(!tag.is_empty());
        assert!(tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '*' || c == '-'));
    }

    #[test]
    fn single_node_paths() {
        let graph = lattice(5, 0.001);
        for n in [0u32, 3, 24] {
            let tag = encode_tag(&graph, &[NodeId(n)]).unwrap();
            assert_eq!(decode_tag(&graph, &tag).unwrap(), vec![NodeId(n)]);
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let graph = lattice(5, 0.001);
        let path = ids(&[5, 6, 7]);
        let tag = format!("  {}\n", encode_tag(&graph, &path).unwrap());
        assert_eq!(decode_tag(&graph, &tag).unwrap(), path);
    }

    #[test]
    fn encode_errors() {
        let graph = lattice(5, 0.001);
        assert_eq!(encode_tag(&graph, &[]), Err(TagError::EmptyPath));
        assert_eq!(encode_tag(&graph, &[NodeId(99)]), Err(TagError::UnknownNode(99)));
        assert_eq!(
            encode_tag(&graph, &ids(&[0, 6])),
            Err(TagError::NotAdjacent { from: NodeId(0), to: NodeId(6) })
        );
    }

    #[test]
    fn tenth_neighbour_cannot_be_encoded() {
        let graph = star(10);
        assert!(encode_tag(&graph, &ids(&[0, 9])).is_ok());
        assert_eq!(
            encode_tag(&graph, &ids(&[0, 10])),
            Err(TagError::TooManyConnections { node: NodeId(0), index: 10 })
        );
    }

    #[test]
    fn corrupt_tag() {
        let graph = lattice(5, 0.001);
        assert_eq!(decode_tag(&graph, "not base64!"), Err(TagError::Corrupt));
    }

    #[test]
    fn empty_and_zero_padded_tags_are_corrupt() {
        let graph = lattice(5, 0.001);
        assert_eq!(decode_tag(&graph, ""), Err(TagError::Corrupt));
        assert_eq!(decode_tag(&graph, "   "), Err(TagError::Corrupt));
        // Three zero bytes; the encoder writes the value 0 as a single byte.
        assert_eq!(decode_tag(&graph, "AAAA"), Err(TagError::Corrupt));
        assert_eq!(decode_tag(&graph, "AA").unwrap(), vec![NodeId(0)]);
    }

    #[test]
    fn random_walks_roundtrip() {
        let graph = lattice(5, 0.001);
        let last = graph.largest_node_id().unwrap();
        for seed in 0..40u64 {
            let mut rng = RouteRng::new(seed, 0);
            let start = match seed % 4 {
                0 => last,
                1 => NodeId(0),
                _ => NodeId((rng.unit() * graph.node_count() as f64) as u32),
            };
            let mut walk = vec![start];
            let mut seen: FxHashSet<NodeId> = walk.iter().copied().collect();
            let steps = 1 + (rng.unit() * 12.0) as usize;
            for _ in 0..steps {
                let open: Vec<NodeId> = graph
                    .connections(*walk.last().unwrap())
                    .iter()
                    .copied()
                    .filter(|n| !seen.contains(n))
                    .collect();
                if open.is_empty() {
                    break;
                }
                let next = open[(rng.unit() * open.len() as f64) as usize];
                seen.insert(next);
                walk.push(next);
            }
            let tag = encode_tag(&graph, &walk).unwrap();
            assert_eq!(decode_tag(&graph, &tag).unwrap(), walk, "seed {seed}, tag {tag}");
        }
    }

    #[test]
    fn digit_past_neighbour_list() {
        // Both graphs have ten nodes, so the modulus matches.
        let tag = encode_tag(&star(9), &ids(&[0, 9])).unwrap();
        assert_eq!(
            decode_tag(&line(10), &tag),
            Err(TagError::ConnectionOutOfRange { node: NodeId(0), index: 9 })
        );
    }
}

// ── Routing context ───────────────────────────────────────────────────────────

#[cfg(test)]
mod context {
    use lr_core::{Category, EngineSettings, GeoPoint, NodeId, PoiId};
    use lr_graph::Poi;

    use super::helpers::{STEP, lattice, lattice_builder};
    use crate::{AreaOutline, RoutingContext, annotate_areas};

    #[test]
    fn nearest_edge_on_segment_midpoint() {
        let ctx = RoutingContext::new(lattice(6, STEP), &EngineSettings::default()).unwrap();
        let hit = ctx.nearest_edge(GeoPoint::new(0.0, STEP / 2.0));
        assert_eq!(hit, Some((NodeId(0), NodeId(1))));
    }

    #[test]
    fn nearest_edge_at_node_touches_it() {
        let ctx = RoutingContext::new(lattice(6, STEP), &EngineSettings::default()).unwrap();
        let (a, b) = ctx.nearest_edge(GeoPoint::new(2.0 * STEP, 3.0 * STEP)).unwrap();
        assert!(a == NodeId(15) || b == NodeId(15));
    }

    #[test]
    fn automatic_cell_size() {
        let settings = EngineSettings { cell_size_km: 0.0, ..EngineSettings::default() };
        let ctx = RoutingContext::new(lattice(6, STEP), &settings).unwrap();
        let longest = ctx.grid().width().max(ctx.grid().height());
        assert!((200..=202).contains(&longest), "{longest}");
        assert_eq!(ctx.nearest_edge(GeoPoint::new(0.0, STEP / 2.0)), Some((NodeId(0), NodeId(1))));
    }

    #[test]
    fn nothing_near_a_far_point() {
        let ctx = RoutingContext::new(lattice(6, STEP), &EngineSettings::default()).unwrap();
        assert_eq!(ctx.nearest_edge(GeoPoint::new(10.0, 10.0)), None);
    }

    #[test]
    fn pois_tag_nearby_roads_both_ways() {
        let pois = [Poi {
            id: PoiId(0),
            pos: GeoPoint::new(0.0002, STEP / 2.0),
            category: Category::Park,
        }];
        let ctx = RoutingContext::from_builder(lattice_builder(6, STEP), &pois, &EngineSettings::default()).unwrap();
        let graph = ctx.graph();

        for (a, b) in [(0, 1), (1, 0)] {
            let e = graph.find_edge(NodeId(a), NodeId(b)).unwrap();
            assert!(graph.edge_tags[e.index()].contains(Category::Park));
        }
        let far = graph.find_edge(NodeId(28), NodeId(29)).unwrap();
        assert!(graph.edge_tags[far.index()].is_empty());

        assert!(ctx.poi_roads(PoiId(0)).contains(&(NodeId(0), NodeId(1))));
        assert!(ctx.pois_near(NodeId(0)).contains(&PoiId(0)));
        assert!(ctx.pois_near(NodeId(35)).is_empty());
        assert!(ctx.poi_roads(PoiId(7)).is_empty());
    }

    #[test]
    fn context_without_pois_has_no_associations() {
        let ctx = RoutingContext::from_builder(lattice_builder(3, STEP), &[], &EngineSettings::default()).unwrap();
        assert!(ctx.pois_near(NodeId(0)).is_empty());
        assert!(ctx.poi_roads(PoiId(0)).is_empty());
    }

    #[test]
    fn park_outline_flags_the_roads_inside_it() {
        let square = |lo: f64, hi: f64| {
            vec![
                GeoPoint::new(lo * STEP, lo * STEP),
                GeoPoint::new(lo * STEP, hi * STEP),
                GeoPoint::new(hi * STEP, hi * STEP),
                GeoPoint::new(hi * STEP, lo * STEP),
            ]
        };
        let areas = [
            AreaOutline { category: Category::Park, outline: square(1.9, 3.1) },
            // Only parks and water flag nodes.
            AreaOutline { category: Category::Tourism, outline: square(-1.0, 9.0) },
        ];
        let settings = EngineSettings::default();
        let mut builder = lattice_builder(6, STEP);
        let flagged = annotate_areas(&mut builder, &areas, settings.area_distance_km).unwrap();
        assert_eq!(flagged, 4);
        for n in [14, 15, 20, 21] {
            assert!(builder.node_flags(NodeId(n)).near_park, "node {n}");
        }
        assert!(!builder.node_flags(NodeId(13)).near_park);

        let ctx = RoutingContext::from_builder(builder, &[], &settings).unwrap();
        let graph = ctx.graph();
        let inside = graph.find_edge(NodeId(14), NodeId(15)).unwrap();
        let leaving = graph.find_edge(NodeId(13), NodeId(14)).unwrap();
        assert!(graph.edge_tags[inside.index()].contains(Category::Park));
        assert!(!graph.edge_tags[leaving.index()].contains(Category::Park));
        assert!(!graph.edge_tags[inside.index()].contains(Category::Tourism));
    }
}

// ── Rod generation and closing ────────────────────────────────────────────────

#[cfg(test)]
mod rod {
    use lr_core::{NodeId, RouteRng, RoutingConfig};

    use super::helpers::{STEP, assert_walkable, ids, lattice};
    use crate::{annotate_rod, close_rod, generate_rod, orient_rod};

    #[test]
    fn annotate_accumulates_length_and_keeps_first_visit() {
        let graph = lattice(3, 0.001);
        let rod = ids(&[0, 1, 2, 1]);
        let marks = annotate_rod(&graph, &rod).unwrap();
        assert_eq!(marks.len(), 3);
        assert_eq!(marks[&NodeId(0)].length, 0.0);
        assert_eq!(marks[&NodeId(1)].index, 1);
        let one = graph.path_length(&ids(&[0, 1])).unwrap();
        let two = graph.path_length(&ids(&[0, 1, 2])).unwrap();
        assert!((marks[&NodeId(1)].length - one).abs() < 1e-12);
        assert!((marks[&NodeId(2)].length - two).abs() < 1e-12);
    }

    #[test]
    fn annotate_rejects_broken_rod() {
        let graph = lattice(3, 0.001);
        assert!(annotate_rod(&graph, &ids(&[0, 4])).is_err());
    }

    #[test]
    fn orient_drops_a_step_along_the_start_edge() {
        let (rod, end) = orient_rod(ids(&[0, 1, 2]), NodeId(0), NodeId(1));
        assert_eq!(rod, ids(&[1, 2]));
        assert_eq!(end, NodeId(0));

        let (rod, end) = orient_rod(ids(&[0, 3, 6]), NodeId(0), NodeId(1));
        assert_eq!(rod, ids(&[0, 3, 6]));
        assert_eq!(end, NodeId(1));
    }

    #[test]
    fn rod_from_unknown_node() {
        let graph = lattice(3, 0.001);
        let mut rng = RouteRng::new(1, 0);
        assert_eq!(generate_rod(&graph, NodeId(50), &RoutingConfig::default(), &mut rng), None);
    }

    #[test]
    fn rod_is_a_walkable_path_from_start() {
        let graph = lattice(20, STEP);
        let config = RoutingConfig::default();
        for attempt in 0..5 {
            let mut rng = RouteRng::new(11, attempt);
            let rod = generate_rod(&graph, NodeId(210), &config, &mut rng).unwrap();
            assert_eq!(rod[0], NodeId(210));
            assert!(rod.len() > 1);
            let length = graph.path_length(&rod).unwrap();
            assert!(length <= config.max_length + 1e-9);
        }
    }

    #[test]
    fn loops_from_a_lattice_node_fit_the_window() {
        let graph = lattice(20, STEP);
        let config = RoutingConfig::default().with_window(5.0, 10.0);
        let start = NodeId(210);

        let mut found = 0;
        for attempt in 0..40 {
            let mut rng = RouteRng::new(3, attempt);
            let rod = generate_rod(&graph, start, &config, &mut rng).unwrap();
            for c in close_rod(&graph, start, &rod, &config, &rod).unwrap() {
                assert_eq!(c.nodes.first(), Some(&start));
                assert_eq!(c.nodes.last(), Some(&start));
                assert!(5.0 < c.length_km && c.length_km < 10.0, "{}", c.length_km);
                assert_walkable(&graph, &c.nodes, c.length_km);
                found += 1;
            }
        }
        assert!(found > 0);
    }
}

// ── Route engine ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use std::sync::Arc;

    use lr_core::{EngineSettings, GeoPoint, NodeId, RoutingConfig};

    use super::helpers::{STEP, assert_walkable, ids, lattice};
    use crate::engine::locate_on_path;
    use crate::{RouteEngine, RoutingContext, RoutingError, TagError};

    fn engine(workers: usize, retry_factor: usize, seed: Option<u64>) -> RouteEngine {
        let settings = EngineSettings { workers, retry_factor, seed, ..EngineSettings::default() };
        let ctx = RoutingContext::new(lattice(20, STEP), &settings).unwrap();
        RouteEngine::new(Arc::new(ctx), settings).unwrap()
    }

    fn centre() -> GeoPoint {
        GeoPoint::new(10.0 * STEP, 10.0 * STEP)
    }

    #[test]
    fn loop_closes_over_the_start_edge() {
        let engine = engine(2, 20, Some(5));
        let route = engine.synthesize_loop(centre(), &RoutingConfig::default()).unwrap();
        let graph = engine.context().graph();

        assert!(5.0 < route.length_km && route.length_km < 10.0);
        assert_walkable(graph, &route.nodes, route.length_km);
        let (first, last) = (route.nodes[0], *route.nodes.last().unwrap());
        assert!(graph.find_edge(last, first).is_some());
        assert!(first == NodeId(210) || last == NodeId(210));
        assert_eq!(route.coordinates(graph).len(), route.nodes.len());
    }

    #[test]
    fn single_worker_with_seed_is_repeatable() {
        let config = RoutingConfig::default();
        let a = engine(1, 20, Some(42)).synthesize_loop(centre(), &config).unwrap();
        let b = engine(1, 20, Some(42)).synthesize_loop(centre(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn request_seed_overrides_engine_seed() {
        let config = RoutingConfig { seed: Some(9), ..RoutingConfig::default() };
        let a = engine(1, 20, Some(1)).synthesize_loop(centre(), &config).unwrap();
        let b = engine(1, 20, Some(2)).synthesize_loop(centre(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn impossible_window_exhausts_the_budget() {
        let engine = engine(2, 3, Some(1));
        let config = RoutingConfig::default().with_window(500.0, 600.0);
        match engine.synthesize_loop(centre(), &config) {
            Err(RoutingError::NoRoute { attempts }) => assert_eq!(attempts, 6),
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_racing() {
        let engine = engine(1, 1, None);
        let config = RoutingConfig::default().with_window(8.0, 3.0);
        assert!(matches!(engine.synthesize_loop(centre(), &config), Err(RoutingError::Config(_))));
    }

    #[test]
    fn start_far_from_any_road() {
        let engine = engine(1, 1, None);
        let err = engine.synthesize_loop(GeoPoint::new(5.0, 5.0), &RoutingConfig::default());
        assert!(matches!(err, Err(RoutingError::NoNearbyEdge(_))));
    }

    #[test]
    fn rating_reaches_every_edge_of_the_route() {
        let engine = engine(1, 1, None);
        let graph = engine.context().graph();
        let path = ids(&[0, 1, 2, 22]);
        let tag = crate::encode_tag(graph, &path).unwrap();

        assert_eq!(engine.rate(&tag, 4.0).unwrap(), 3);
        assert_eq!(engine.rate(&tag, 2.0).unwrap(), 3);
        for w in path.windows(2) {
            let e = graph.find_edge(w[0], w[1]).unwrap();
            assert_eq!(graph.average_rating(e), Some(3.0));
        }
        let reverse = graph.find_edge(NodeId(1), NodeId(0)).unwrap();
        assert_eq!(graph.average_rating(reverse), None);

        assert!(matches!(engine.rate(&tag, 5.5), Err(RoutingError::RatingOutOfRange(_))));
        assert!(matches!(engine.rate("@@", 3.0), Err(RoutingError::Tag(TagError::Corrupt))));
    }

    #[test]
    fn parse_tag_recovers_route() {
        let engine = engine(1, 20, Some(8));
        let route = engine.synthesize_loop(centre(), &RoutingConfig::default()).unwrap();
        let parsed = engine.parse_tag(&route.tag).unwrap();
        assert_eq!(parsed.nodes, route.nodes);
        assert!((parsed.length_km - route.length_km).abs() < 1e-6);
    }

    #[test]
    fn shortest_way_home_ends_at_the_origin() {
        let engine = engine(2, 20, Some(13));
        let graph = engine.context().graph();
        let route = engine.synthesize_loop(centre(), &RoutingConfig::default()).unwrap();
        let midway = graph.node_pos[route.nodes[route.nodes.len() / 2].index()];

        let home = engine.return_home(&route.tag, midway, 0.0, &RoutingConfig::default()).unwrap();
        assert_eq!(home.nodes[0], route.nodes[0]);
        assert_eq!(home.nodes.last(), Some(&route.nodes[0]));
        assert_walkable(graph, &home.nodes, home.length_km);
        assert_eq!(engine.parse_tag(&home.tag).unwrap().nodes, home.nodes);
    }

    #[test]
    fn way_home_of_requested_length() {
        let engine = engine(2, 20, Some(21));
        let graph = engine.context().graph();
        // Row 10, eastwards from column 5 to column 12.
        let path = ids(&[205, 206, 207, 208, 209, 210, 211, 212]);
        let tag = crate::encode_tag(graph, &path).unwrap();
        let between_208_and_209 = GeoPoint::new(10.0 * STEP, 8.5 * STEP);
        let config = RoutingConfig::default();

        let home = engine.return_home(&tag, between_208_and_209, 3.0, &config).unwrap();
        assert_eq!(home.nodes[..5], path[..5]);
        assert_eq!(home.nodes.last(), Some(&path[0]));
        assert_walkable(graph, &home.nodes, home.length_km);

        let leg = home.length_km - graph.path_length(&path[..5]).unwrap();
        assert!(3.0 < leg && leg < 3.0 + config.return_tolerance, "leg {leg} km");
        assert_eq!(engine.parse_tag(&home.tag).unwrap().nodes, home.nodes);
    }

    #[test]
    fn locating_the_user_on_a_route() {
        let graph = lattice(5, 0.001);
        let path = ids(&[0, 1, 2, 3]);
        // Along a step, either direction: the node ahead.
        assert_eq!(locate_on_path(&graph, &path, (NodeId(1), NodeId(2))), Some(2));
        assert_eq!(locate_on_path(&graph, &path, (NodeId(2), NodeId(1))), Some(2));
        // Road leaving the route.
        assert_eq!(locate_on_path(&graph, &path, (NodeId(2), NodeId(7))), Some(2));
        // Road next to the route.
        assert_eq!(locate_on_path(&graph, &path, (NodeId(7), NodeId(12))), Some(2));
        assert_eq!(locate_on_path(&graph, &path, (NodeId(20), NodeId(21))), None);
    }

    #[test]
    fn return_home_off_route() {
        let engine = engine(1, 1, None);
        let graph = engine.context().graph();
        let tag = crate::encode_tag(graph, &ids(&[0, 1, 2])).unwrap();
        let far_corner = graph.node_pos[399];
        let err = engine.return_home(&tag, far_corner, 0.0, &RoutingConfig::default());
        assert!(matches!(err, Err(RoutingError::NotOnRoute)));
    }
}
