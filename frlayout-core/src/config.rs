//! Layout Configuration
//!
//! Run-scoped simulation parameters. `area` controls how far the layout
//! spreads, `gravity` how strongly nodes are pulled toward the origin.
//! The cooling-schedule speed is not configured here; the run controller
//! derives it from the iteration index.

use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Default spread of the layout.
pub const DEFAULT_AREA: f32 = 600.0;

/// Default pull-to-center strength.
pub const DEFAULT_GRAVITY: f64 = 5.0;

/// Default number of iterations used by [`crate::FruchtermanReingold::run`].
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Configuration for a layout run.
///
/// Missing fields fall back to their defaults when deserializing:
///
/// ```rust
/// use frlayout_core::LayoutConfig;
///
/// let config = LayoutConfig::from_json(r#"{ "gravity": 2.5, "threads": 4 }"#).unwrap();
/// assert_eq!(config.area, 600.0);
/// assert_eq!(config.threads, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Controls the spread of the layout.
    pub area: f32,
    /// Strength of the pull toward the origin.
    pub gravity: f64,
    /// Iterations performed by `run`.
    pub iterations: usize,
    /// Worker threads. `None` uses the available parallelism.
    pub threads: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            area: DEFAULT_AREA,
            gravity: DEFAULT_GRAVITY,
            iterations: DEFAULT_ITERATIONS,
            threads: None,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable by the simulation.
    pub fn validate(&self) -> Result<()> {
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "area must be positive and finite, got {}",
                self.area
            )));
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "gravity must be non-negative and finite, got {}",
                self.gravity
            )));
        }
        if self.threads == Some(0) {
            return Err(LayoutError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Thread count to use, resolving `None` to the available parallelism.
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}
