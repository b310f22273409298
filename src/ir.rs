use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One vertical subsurface sample record ("palito"), annotated along depth.
///
/// `depths` holds the interval breakpoints: `depths.len() - 1` layers, each
/// described by the geology entry of the same index (optionally prefixed by
/// an interpretation entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borehole {
    pub hole_id: String,
    #[serde(default)]
    pub max_depth: Option<f64>,
    /// Ground elevation ("COTA").
    #[serde(default)]
    pub z: Option<f64>,
    /// Water table depth; absent means the hole came up dry.
    #[serde(default)]
    pub water_level: Option<f64>,
    pub depths: Vec<f64>,
    pub geology: Vec<String>,
    #[serde(default)]
    pub interp: Option<Vec<String>>,
    pub nspt: NsptColumn,
}

/// Standard penetration test readings, one per `interval` metres starting at
/// `start_depth`. Values stay strings: field logs carry entries like "30/15".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NsptColumn {
    pub start_depth: f64,
    #[serde(default = "default_nspt_interval")]
    pub interval: f64,
    pub values: Vec<String>,
}

fn default_nspt_interval() -> f64 {
    1.0
}

impl Borehole {
    /// Number of depth intervals the geology/interp arrays annotate.
    pub fn segment_count(&self) -> usize {
        self.depths.len().saturating_sub(1)
    }

    /// Drilled depth of the hole; falls back to the last breakpoint.
    pub fn final_depth(&self) -> f64 {
        self.max_depth
            .unwrap_or_else(|| self.depths.last().copied().unwrap_or(0.0))
    }
}

/// Structurally invalid borehole input. Failures are attributable to one
/// hole so a batch can skip it and keep rendering the rest.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid borehole JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{hole_id}: at least two depth breakpoints required, found {found}")]
    TooFewDepths { hole_id: String, found: usize },
    #[error("{hole_id}: depths must not decrease (depths[{index}] = {value} is shallower than {previous})")]
    DepthsOutOfOrder {
        hole_id: String,
        index: usize,
        value: f64,
        previous: f64,
    },
    #[error("{hole_id}: {found} geology entries for {expected} intervals")]
    MissingGeology {
        hole_id: String,
        expected: usize,
        found: usize,
    },
    #[error("{hole_id}: {found} interpretation entries for {expected} intervals")]
    MissingInterp {
        hole_id: String,
        expected: usize,
        found: usize,
    },
}

impl InputError {
    /// Hole the error is attributable to, when there is one.
    pub fn hole_id(&self) -> Option<&str> {
        match self {
            InputError::Json(_) => None,
            InputError::TooFewDepths { hole_id, .. }
            | InputError::DepthsOutOfOrder { hole_id, .. }
            | InputError::MissingGeology { hole_id, .. }
            | InputError::MissingInterp { hole_id, .. } => Some(hole_id),
        }
    }
}
