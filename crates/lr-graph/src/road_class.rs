//! Highway-type weights for walking and running routes.
//!
//! The weight feeds `measure_highway` in the cost model: busier roads weigh
//! more, dedicated foot infrastructure weighs nothing.  Roads pedestrians may
//! not use return `None` and are left out of the graph.

/// Weight for an OSM `highway=*` value.
pub fn road_class_weight(highway: &str) -> Option<f32> {
    match highway.trim() {
        "motorway" | "motorway_link" | "trunk" | "trunk_link" => None,
        "primary"  | "primary_link"                            => Some(1.0),
        "secondary"| "secondary_link"                          => Some(0.8),
        "tertiary" | "tertiary_link"                           => Some(0.6),
        "unclassified" | "service"                             => Some(0.4),
        "residential"                                          => Some(0.3),
        "living_street" | "track" | "bridleway"                => Some(0.1),
        "steps"                                                => Some(0.5),
        "footway" | "path" | "pedestrian" | "cycleway"         => Some(0.0),
        // Unknown highway types are treated like a quiet local street.
        _                                                      => Some(0.3),
    }
}
