//! Synthetic city used by the demo.
//!
//! A 24 × 24 street lattice with 0.003° blocks (about 330 m) around
//! Cambridge, UK.  Every sixth street is a primary road, a footpath runs
//! along a river on column 7, and the outer ring is a motorway that walkers
//! cannot use.  The city is emitted as CSV text and read back through the
//! regular loaders.  A common in the south-east and a pond to the north
//! are given as outlines and flagged onto nodes at startup.

use std::fmt::Write;

use lr_core::{Category, GeoPoint};
use lr_routing::AreaOutline;

const SIDE: usize = 24;
const STEP: f64 = 0.003;
const ORIGIN: (f64, f64) = (52.190, 0.100);
const RIVER_COL: usize = 7;

pub const POIS_CSV: &str = "\
id,lat,lon,category\n\
0,52.2110,0.1165,park\n\
1,52.2015,0.1225,tourism\n\
2,52.2050,0.1300,monument\n\
3,52.2140,0.1410,university\n\
4,52.1985,0.1210,water\n\
5,52.2200,0.1260,library\n\
";

fn at(r: f64, c: f64) -> GeoPoint {
    GeoPoint::new(ORIGIN.0 + r * STEP, ORIGIN.1 + c * STEP)
}

/// Park and water outlines, in lattice coordinates.
pub fn areas() -> Vec<AreaOutline> {
    vec![
        AreaOutline {
            category: Category::Park,
            outline: vec![at(2.5, 15.5), at(2.5, 19.5), at(5.5, 20.5), at(6.5, 17.0), at(5.5, 15.5)],
        },
        AreaOutline {
            category: Category::Water,
            outline: vec![at(18.7, 10.7), at(18.7, 13.3), at(20.3, 13.3), at(20.3, 10.7)],
        },
    ]
}

fn node_id(r: usize, c: usize) -> usize {
    1_000 + r * SIDE + c
}

fn highway(r: usize, c: usize, horizontal: bool) -> &'static str {
    let edge_of_city = |i: usize| i == 0 || i == SIDE - 1;
    let line = if horizontal { r } else { c };
    if edge_of_city(line) {
        "motorway"
    } else if !horizontal && c == RIVER_COL {
        "footway"
    } else if line % 6 == 0 {
        "primary"
    } else if (r + c) % 5 == 0 {
        "tertiary"
    } else {
        "residential"
    }
}

/// `(nodes.csv, edges.csv)` text for the city.
pub fn city_csv() -> (String, String) {
    let mut nodes = String::from("id,lat,lon,water,park\n");
    let mut edges = String::from("from,to,highway,oneway\n");

    for r in 0..SIDE {
        for c in 0..SIDE {
            let lat = ORIGIN.0 + r as f64 * STEP;
            let lon = ORIGIN.1 + c as f64 * STEP;
            let water = c.abs_diff(RIVER_COL) <= 1;
            let park = (9..=12).contains(&r) && (14..=17).contains(&c);
            let _ = writeln!(nodes, "{},{lat:.6},{lon:.6},{water},{park}", node_id(r, c));
        }
    }
    for r in 0..SIDE {
        for c in 0..SIDE {
            if c + 1 < SIDE {
                // Row 3 is a one-way street heading east.
                let oneway = r == 3;
                let _ = writeln!(edges, "{},{},{},{oneway}", node_id(r, c), node_id(r, c + 1), highway(r, c, true));
            }
            if r + 1 < SIDE {
                let _ = writeln!(edges, "{},{},{},false", node_id(r, c), node_id(r + 1, c), highway(r, c, false));
            }
        }
    }
    (nodes, edges)
}
