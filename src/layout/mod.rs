mod cluster;
mod conflict;
mod text;
pub(crate) mod types;

pub use types::*;
// The emitter re-resolves labels from the source arrays; keep both sides on
// the same resolution rules.
pub(crate) use text::resolve_label;

use crate::config::LayoutConfig;
use crate::ir::{Borehole, InputError};
use cluster::AllocationContext;

/// Run the space-allocation engine for one borehole: interval construction,
/// conflict analysis, cluster building, proportional distribution.
///
/// Purely a function of the borehole's arrays; no state survives the call.
/// Structural problems (missing labels, bad depth ordering) fail here,
/// before any drawing happens, so a batch can isolate the failure to this
/// borehole.
pub fn compute_track_layout(
    borehole: &Borehole,
    config: &LayoutConfig,
) -> Result<TrackLayout, InputError> {
    let intervals = build_intervals(borehole, config)?;
    let conflicts = conflict::analyze_conflicts(&intervals);
    let mut ctx = AllocationContext::new(&intervals, &conflicts);
    let clusters = cluster::build_clusters(&mut ctx, config);

    // Rendering restarts each cluster at its physical start depth, so the
    // track ends where the last cluster's allocation runs out.
    let track_bottom = clusters
        .last()
        .map(|c| c.start_depth() + c.allocated_span())
        .unwrap_or(0.0);

    Ok(TrackLayout {
        clusters,
        track_bottom,
    })
}

/// Build the ordered interval sequence for one borehole, resolving each
/// layer's label and estimating its text height.
fn build_intervals(
    borehole: &Borehole,
    config: &LayoutConfig,
) -> Result<Vec<Interval>, InputError> {
    let segments = borehole.segment_count();
    if segments == 0 {
        return Err(InputError::TooFewDepths {
            hole_id: borehole.hole_id.clone(),
            found: borehole.depths.len(),
        });
    }
    for (index, pair) in borehole.depths.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(InputError::DepthsOutOfOrder {
                hole_id: borehole.hole_id.clone(),
                index: index + 1,
                value: pair[1],
                previous: pair[0],
            });
        }
    }
    if borehole.geology.len() < segments {
        return Err(InputError::MissingGeology {
            hole_id: borehole.hole_id.clone(),
            expected: segments,
            found: borehole.geology.len(),
        });
    }
    if let Some(interp) = &borehole.interp
        && interp.len() < segments
    {
        return Err(InputError::MissingInterp {
            hole_id: borehole.hole_id.clone(),
            expected: segments,
            found: interp.len(),
        });
    }

    let max_depth = borehole.final_depth();
    let intervals = (0..segments)
        .map(|index| {
            let from = borehole.depths[index];
            let mut to = borehole.depths[index + 1];
            if index == segments - 1 && max_depth < to {
                // The hole stopped short of the last logged breakpoint.
                to = max_depth.max(from);
            }
            let interp = borehole
                .interp
                .as_ref()
                .map(|entries| entries[index].as_str());
            let label = text::resolve_label(&borehole.geology[index], interp);
            let estimated_text_height = text::estimate_text_height(&label, config);
            Interval {
                index,
                from,
                to,
                label,
                estimated_text_height,
            }
        })
        .collect();
    Ok(intervals)
}
