/// One depth interval and its resolved description label.
#[derive(Debug, Clone)]
pub struct Interval {
    /// Position within the borehole's interval sequence.
    pub index: usize,
    /// Physical depth bounds, `to > from` for non-degenerate layers.
    pub from: f64,
    pub to: f64,
    /// Upper-cased description, interpretation-prefixed when present.
    pub label: String,
    /// Character-count estimate of the vertical space the label needs.
    pub estimated_text_height: f64,
}

impl Interval {
    pub fn original_height(&self) -> f64 {
        self.to - self.from
    }
}

/// Per-interval comparison of estimated label height against physical height.
#[derive(Debug, Clone, Copy)]
pub struct ConflictRecord {
    pub index: usize,
    pub has_overflow: bool,
    /// Label height in excess of the interval, zero when it fits.
    pub overflow: f64,
    /// Signed slack: negative exactly when the interval overflows.
    pub available_space: f64,
}

/// Final allocation for one interval of a cluster.
#[derive(Debug, Clone)]
pub struct LayerSize {
    pub layer_index: usize,
    pub original_height: f64,
    pub text_height: f64,
    pub final_height: f64,
    pub from: f64,
    pub to: f64,
}

/// A maximal contiguous run of intervals merged to satisfy one overflowing
/// interval's space demand, or a singleton left untouched.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Inclusive bounds into the interval sequence.
    pub start_index: usize,
    pub end_index: usize,
    /// Member interval indices, ascending.
    pub layers: Vec<usize>,
    /// Seed overflow that triggered the cluster.
    pub total_needed: f64,
    /// Non-negative slack absorbed from merged neighbors (for `unchanged`
    /// singletons: the interval's own signed slack).
    pub total_available: f64,
    /// Space manufactured by stretching the track beyond the original span.
    pub needs_extra_space: f64,
    pub layer_sizes: Vec<LayerSize>,
    /// Single non-conflicting interval kept at its original height.
    pub unchanged: bool,
}

impl Cluster {
    /// Physical depth where the cluster's rendering starts.
    pub fn start_depth(&self) -> f64 {
        self.layer_sizes.first().map(|l| l.from).unwrap_or(0.0)
    }

    /// Sum of the members' physical heights.
    pub fn original_span(&self) -> f64 {
        self.layer_sizes.iter().map(|l| l.original_height).sum()
    }

    /// Sum of the members' allocated heights. May exceed
    /// `original_span() + needs_extra_space` when the per-layer floor beat
    /// the proportional share; the divergence is deliberate and inspectable.
    pub fn allocated_span(&self) -> f64 {
        self.layer_sizes.iter().map(|l| l.final_height).sum()
    }

    /// Sum of the members' estimated label heights.
    pub fn text_demand(&self) -> f64 {
        self.layer_sizes.iter().map(|l| l.text_height).sum()
    }
}

/// Allocation result for one borehole: clusters sorted by `start_index`,
/// partitioning the interval sequence exactly once.
#[derive(Debug, Clone)]
pub struct TrackLayout {
    pub clusters: Vec<Cluster>,
    /// Y (in depth units below the track origin) where the rendered track
    /// ends: the last cluster's start depth plus its allocated span. Exceeds
    /// the physical depth when clusters stretched the track.
    pub track_bottom: f64,
}

impl TrackLayout {
    pub fn interval_count(&self) -> usize {
        self.clusters.iter().map(|c| c.layers.len()).sum()
    }

    /// Total allocated height across all clusters, for diagnostics.
    pub fn total_allocated(&self) -> f64 {
        self.clusters.iter().map(|c| c.allocated_span()).sum()
    }
}
