//! Routing parameters (per request) and engine settings (per process).
//!
//! Requests supply [`RoutingConfig`] as a flat string map, e.g. the query
//! string of a web request:
//!
//! ```
//! use std::collections::HashMap;
//! use lr_core::RoutingConfig;
//!
//! let params = HashMap::from([
//!     ("min_length".to_string(), "3".to_string()),
//!     ("max_length".to_string(), "4.5".to_string()),
//! ]);
//! let cfg = RoutingConfig::from_params(&params).unwrap();
//! assert_eq!(cfg.min_length, 3.0);
//! assert_eq!(cfg.measure_length, 1.0); // default
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Category, ConfigError, ConfigResult};

// ── RoutingConfig ─────────────────────────────────────────────────────────────

/// Knobs for one loop or return-home request.  Lengths are kilometres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Candidate loops must be strictly longer than this.
    pub min_length: f64,
    /// Candidate loops must be strictly shorter than this.
    pub max_length: f64,

    /// Radius (km) around a path within which edges are penalised.
    pub poison_max_distance: f64,
    /// Penalty factor applied on the path itself.
    pub poison_max_value: f64,

    // Cost-model weights.  Positive category weights make tagged edges cheaper.
    pub measure_length: f64,
    pub measure_highway: f64,
    pub measure_rating: f64,
    pub measure_tourism: f64,
    pub measure_monument: f64,
    pub measure_water: f64,
    pub measure_park: f64,
    pub measure_university: f64,

    /// Slack (km) added to the requested distance when heading home.
    pub return_tolerance: f64,

    /// Optional request seed; overrides [`EngineSettings::seed`].
    pub seed: Option<u64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            min_length:          5.0,
            max_length:          10.0,
            poison_max_distance: 1.0,
            poison_max_value:    50.0,
            measure_length:      1.0,
            measure_highway:     0.0,
            measure_rating:      0.0,
            measure_tourism:     0.0,
            measure_monument:    0.0,
            measure_water:       0.0,
            measure_park:        0.0,
            measure_university:  0.0,
            return_tolerance:    1.0,
            seed:                None,
        }
    }
}

impl RoutingConfig {
    /// Build from request parameters.  Missing keys keep their defaults and
    /// unknown keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> ConfigResult<Self> {
        let mut cfg = Self::default();
        for (key, value) in params {
            if key == "seed" {
                cfg.seed = Some(value.trim().parse().map_err(|_| invalid(key, value))?);
                continue;
            }
            let Some(slot) = cfg.field_mut(key) else { continue };
            let parsed: f64 = value.trim().parse().map_err(|_| invalid(key, value))?;
            if !parsed.is_finite() {
                return Err(invalid(key, value));
            }
            *slot = parsed;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut f64> {
        Some(match key {
            "min_length"          => &mut self.min_length,
            "max_length"          => &mut self.max_length,
            "poison_max_distance" => &mut self.poison_max_distance,
            "poison_max_value"    => &mut self.poison_max_value,
            "measure_length"      => &mut self.measure_length,
            "measure_highway"     => &mut self.measure_highway,
            "measure_rating"      => &mut self.measure_rating,
            "measure_tourism"     => &mut self.measure_tourism,
            "measure_monument"    => &mut self.measure_monument,
            "measure_water"       => &mut self.measure_water,
            "measure_park"        => &mut self.measure_park,
            "measure_university"  => &mut self.measure_university,
            "return_tolerance"    => &mut self.return_tolerance,
            _ => return None,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_length < 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "min_length {} is negative",
                self.min_length
            )));
        }
        if self.min_length >= self.max_length {
            return Err(ConfigError::Inconsistent(format!(
                "min_length {} must be below max_length {}",
                self.min_length, self.max_length
            )));
        }
        if self.poison_max_distance < 0.0 || self.return_tolerance < 0.0 {
            return Err(ConfigError::Inconsistent(
                "poison_max_distance and return_tolerance must be non-negative".into(),
            ));
        }
        if self.poison_max_value < 1.0 {
            return Err(ConfigError::Inconsistent(format!(
                "poison_max_value {} is below 1",
                self.poison_max_value
            )));
        }
        Ok(())
    }

    /// Weight the cost model gives to a POI category.
    pub fn category_weight(&self, category: Category) -> f64 {
        match category {
            Category::Tourism    => self.measure_tourism,
            Category::Monument   => self.measure_monument,
            Category::Water      => self.measure_water,
            Category::Park       => self.measure_park,
            Category::University => self.measure_university,
        }
    }

    /// Copy with a different length window (used by return-home).
    pub fn with_window(&self, min_length: f64, max_length: f64) -> Self {
        Self { min_length, max_length, ..self.clone() }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
}

// ── EngineSettings ────────────────────────────────────────────────────────────

/// Process-wide settings fixed when the engine starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Concurrent synthesis attempts (worker threads).
    pub workers: usize,
    /// Attempt budget per request is `workers * retry_factor`.
    pub retry_factor: usize,
    /// Side length (km) of a spatial grid cell.
    pub cell_size_km: f64,
    /// Padding (km) around segment and POI boxes.
    pub padding_km: f64,
    /// Nodes closer than this (km) to a park or water area get flagged.
    pub area_distance_km: f64,
    /// Default seed for requests that carry none.
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers:          4,
            retry_factor:     10,
            cell_size_km:     0.1,
            padding_km:       0.1,
            area_distance_km: 0.01,
            seed:             None,
        }
    }
}

impl EngineSettings {
    pub fn attempt_budget(&self) -> usize {
        self.workers.max(1) * self.retry_factor.max(1)
    }
}
