use super::types::{ConflictRecord, Interval};

/// Compare every interval's estimated label height against its physical
/// height. Output is aligned 1:1 with the input order; nothing is filtered.
pub(super) fn analyze_conflicts(intervals: &[Interval]) -> Vec<ConflictRecord> {
    intervals
        .iter()
        .map(|interval| {
            let height = interval.original_height();
            let has_overflow = interval.estimated_text_height > height;
            let overflow = if has_overflow {
                interval.estimated_text_height - height
            } else {
                0.0
            };
            ConflictRecord {
                index: interval.index,
                has_overflow,
                overflow,
                available_space: height - interval.estimated_text_height,
            }
        })
        .collect()
}
