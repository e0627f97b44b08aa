//! Unit tests for lr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, PoiId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
        assert!(!PoiId::INVALID.is_valid());
        assert!(PoiId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoPoint, Point2, Projector};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(52.52, 13.40);
        assert!(p.distance_km(p) < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_km(b);
        assert!((d - 111.195).abs() < 0.5, "got {d}");
    }

    #[test]
    fn projection_axes_point_east_and_north() {
        let proj = Projector::fit([GeoPoint::new(0.0, 0.0)]);
        let east = proj.project(GeoPoint::new(0.0, 0.01));
        let north = proj.project(GeoPoint::new(0.01, 0.0));
        assert!(east.x > 1.0 && east.y.abs() < 1e-6, "{east:?}");
        assert!(north.y > 1.0 && north.x.abs() < 1e-6, "{north:?}");
    }

    #[test]
    fn projection_preserves_local_distances() {
        let pts = [
            GeoPoint::new(48.85, 2.35),
            GeoPoint::new(48.86, 2.36),
            GeoPoint::new(48.84, 2.33),
        ];
        let proj = Projector::fit(pts);
        let (a, b) = (pts[1], pts[2]);
        let planar = proj.project(a).distance2(proj.project(b)).sqrt();
        let sphere = a.distance_km(b);
        assert!((planar - sphere).abs() < 0.01, "planar {planar} vs {sphere}");
    }

    #[test]
    fn empty_fit_uses_null_island() {
        let proj = Projector::fit(std::iter::empty());
        let p = proj.project(GeoPoint::new(0.0, 0.0));
        assert_eq!(p, Point2::new(0.0, 0.0));
    }
}

#[cfg(test)]
mod tags {
    use crate::{Category, TagSet};

    #[test]
    fn parse_known_and_aliases() {
        assert_eq!("Park".parse::<Category>(), Ok(Category::Park));
        assert_eq!("memorial".parse::<Category>(), Ok(Category::Monument));
        assert!("bakery".parse::<Category>().is_err());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = TagSet::EMPTY;
        assert!(set.insert(Category::Water));
        assert!(!set.insert(Category::Water));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn collect_and_iterate() {
        let set: TagSet = [Category::University, Category::Tourism, Category::Tourism]
            .into_iter()
            .collect();
        let back: Vec<_> = set.iter().collect();
        assert_eq!(back, vec![Category::Tourism, Category::University]);
        assert!(set.union(TagSet::EMPTY) == set);
    }
}

#[cfg(test)]
mod config {
    use std::collections::HashMap;

    use crate::{ConfigError, EngineSettings, RoutingConfig};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_for_missing_keys() {
        let cfg = RoutingConfig::from_params(&HashMap::new()).unwrap();
        assert_eq!(cfg, RoutingConfig::default());
        assert_eq!(cfg.min_length, 5.0);
        assert_eq!(cfg.max_length, 10.0);
        assert_eq!(cfg.measure_length, 1.0);
    }

    #[test]
    fn overrides_and_unknown_keys() {
        let cfg = RoutingConfig::from_params(&params(&[
            ("min_length", "2"),
            ("max_length", " 3.5 "),
            ("measure_park", "0.4"),
            ("colour", "blue"),
            ("seed", "99"),
        ]))
        .unwrap();
        assert_eq!(cfg.min_length, 2.0);
        assert_eq!(cfg.max_length, 3.5);
        assert_eq!(cfg.measure_park, 0.4);
        assert_eq!(cfg.seed, Some(99));
    }

    #[test]
    fn bad_number_is_reported() {
        let err = RoutingConfig::from_params(&params(&[("max_length", "far")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { key: "max_length".into(), value: "far".into() }
        );
        assert!(RoutingConfig::from_params(&params(&[("measure_water", "NaN")])).is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = RoutingConfig::from_params(&params(&[("min_length", "12")])).unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn json_uses_defaults_for_missing_fields() {
        let cfg: RoutingConfig = serde_json::from_str(r#"{"max_length": 7.0}"#).unwrap();
        assert_eq!(cfg.max_length, 7.0);
        assert_eq!(cfg.min_length, 5.0);
        let settings: EngineSettings = serde_json::from_str(r#"{"workers": 2}"#).unwrap();
        assert_eq!(settings.attempt_budget(), 20);
        assert_eq!(settings.area_distance_km, 0.01);
    }
}

#[cfg(test)]
mod rng {
    use crate::{RouteRng, WeightedChoice};

    #[test]
    fn same_seed_same_attempt_reproduces() {
        let mut a = RouteRng::new(7, 3);
        let mut b = RouteRng::new(7, 3);
        let xs: Vec<f64> = (0..8).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.unit()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn attempts_diverge() {
        let mut a = RouteRng::new(7, 0);
        let mut b = RouteRng::new(7, 1);
        let xs: Vec<f64> = (0..4).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..4).map(|_| b.unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn zero_weights_are_never_picked() {
        let mut rng = RouteRng::new(1, 0);
        for _ in 0..100 {
            let mut choice = WeightedChoice::new();
            choice.offer('a', 0.0, &mut rng);
            choice.offer('b', 2.0, &mut rng);
            choice.offer('c', f64::NAN, &mut rng);
            assert_eq!(choice.finish(), Some('b'));
        }
    }

    #[test]
    fn empty_stream_picks_nothing() {
        let choice: WeightedChoice<u8> = WeightedChoice::default();
        assert_eq!(choice.total(), 0.0);
        assert_eq!(choice.finish(), None);
    }

    #[test]
    fn picks_proportionally() {
        let mut rng = RouteRng::new(2024, 0);
        let mut heavy = 0;
        for _ in 0..10_000 {
            let mut choice = WeightedChoice::new();
            choice.offer(false, 1.0, &mut rng);
            choice.offer(true, 3.0, &mut rng);
            if choice.finish() == Some(true) {
                heavy += 1;
            }
        }
        let share = heavy as f64 / 10_000.0;
        assert!((share - 0.75).abs() < 0.03, "share {share}");
    }
}
