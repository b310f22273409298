use crate::layout::TrackLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Allocation diagnostics for one borehole: how much space each cluster
/// demanded versus what it was given, down to the per-layer heights.
#[derive(Debug, Serialize)]
pub struct AllocationDump {
    pub hole_id: String,
    pub track_bottom: f64,
    pub total_allocated: f64,
    pub clusters: Vec<ClusterDump>,
}

#[derive(Debug, Serialize)]
pub struct ClusterDump {
    pub start_index: usize,
    pub end_index: usize,
    pub layers: Vec<usize>,
    pub unchanged: bool,
    pub total_needed: f64,
    pub total_available: f64,
    pub needs_extra_space: f64,
    pub original_span: f64,
    pub allocated_span: f64,
    pub text_demand: f64,
    pub layer_sizes: Vec<LayerSizeDump>,
}

#[derive(Debug, Serialize)]
pub struct LayerSizeDump {
    pub layer_index: usize,
    pub from: f64,
    pub to: f64,
    pub original_height: f64,
    pub text_height: f64,
    pub final_height: f64,
}

impl AllocationDump {
    pub fn from_track(hole_id: &str, track: &TrackLayout) -> Self {
        let clusters = track
            .clusters
            .iter()
            .map(|cluster| ClusterDump {
                start_index: cluster.start_index,
                end_index: cluster.end_index,
                layers: cluster.layers.clone(),
                unchanged: cluster.unchanged,
                total_needed: cluster.total_needed,
                total_available: cluster.total_available,
                needs_extra_space: cluster.needs_extra_space,
                original_span: cluster.original_span(),
                allocated_span: cluster.allocated_span(),
                text_demand: cluster.text_demand(),
                layer_sizes: cluster
                    .layer_sizes
                    .iter()
                    .map(|size| LayerSizeDump {
                        layer_index: size.layer_index,
                        from: size.from,
                        to: size.to,
                        original_height: size.original_height,
                        text_height: size.text_height,
                        final_height: size.final_height,
                    })
                    .collect(),
            })
            .collect();

        AllocationDump {
            hole_id: hole_id.to_string(),
            track_bottom: track.track_bottom,
            total_allocated: track.total_allocated(),
            clusters,
        }
    }
}

pub fn write_allocation_dump(path: &Path, dumps: &[AllocationDump]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dumps)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Borehole, NsptColumn};
    use crate::layout::compute_track_layout;

    #[test]
    fn dump_mirrors_the_track() {
        let hole = Borehole {
            hole_id: "SP-09".to_string(),
            max_depth: None,
            z: None,
            water_level: None,
            depths: vec![0.0, 0.3, 3.0],
            geology: vec![
                "argila siltosa mole cinza com areia fina e pedregulhos esparsos".into(),
                "areia".into(),
            ],
            interp: None,
            nspt: NsptColumn {
                start_depth: 1.0,
                interval: 1.0,
                values: Vec::new(),
            },
        };
        let track = compute_track_layout(&hole, &LayoutConfig::default()).unwrap();
        let dump = AllocationDump::from_track(&hole.hole_id, &track);
        assert_eq!(dump.hole_id, "SP-09");
        assert_eq!(
            dump.clusters.len(),
            track.clusters.len(),
        );
        let merged = dump.clusters.iter().find(|c| !c.unchanged).unwrap();
        assert!(merged.allocated_span >= merged.text_demand);
        let json = serde_json::to_string(&dump).unwrap();
        assert!(json.contains("needs_extra_space"));
    }
}
