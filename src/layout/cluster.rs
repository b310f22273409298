use crate::config::LayoutConfig;

use super::types::{Cluster, ConflictRecord, Interval, LayerSize};

/// All state the builder threads through one allocation pass: the immutable
/// interval/conflict arrays plus the claimed set that guarantees every
/// interval is absorbed by at most one cluster.
pub(super) struct AllocationContext<'a> {
    intervals: &'a [Interval],
    conflicts: &'a [ConflictRecord],
    claimed: Vec<bool>,
}

impl<'a> AllocationContext<'a> {
    pub(super) fn new(intervals: &'a [Interval], conflicts: &'a [ConflictRecord]) -> Self {
        debug_assert_eq!(intervals.len(), conflicts.len());
        Self {
            intervals,
            conflicts,
            claimed: vec![false; conflicts.len()],
        }
    }

    fn slack(&self, index: usize) -> f64 {
        self.conflicts[index].available_space
    }
}

/// Partition the interval sequence into clusters: every overflowing interval
/// seeds one, absorbing slack from immediately adjacent unclaimed neighbors;
/// whatever stays unclaimed afterwards becomes an `unchanged` singleton.
///
/// Seeds are visited in ascending index order, so a cluster can only find a
/// claimed interval on its left side. Each interval is claimed at most once,
/// which bounds the whole pass to one visit per interval.
pub(super) fn build_clusters(ctx: &mut AllocationContext<'_>, config: &LayoutConfig) -> Vec<Cluster> {
    let n = ctx.conflicts.len();
    let mut clusters: Vec<Cluster> = Vec::new();

    for seed in 0..n {
        if !ctx.conflicts[seed].has_overflow || ctx.claimed[seed] {
            continue;
        }
        ctx.claimed[seed] = true;

        let mut cluster = Cluster {
            start_index: seed,
            end_index: seed,
            layers: vec![seed],
            total_needed: ctx.conflicts[seed].overflow,
            total_available: 0.0,
            needs_extra_space: 0.0,
            layer_sizes: Vec::new(),
            unchanged: false,
        };

        while cluster.total_available < cluster.total_needed {
            let can_grow_up = cluster.start_index > 0 && !ctx.claimed[cluster.start_index - 1];
            let can_grow_down = cluster.end_index + 1 < n;
            if !can_grow_up && !can_grow_down {
                break;
            }
            // Greedy best-fit: take the side with more slack. On an exact
            // tie the cluster grows toward the start.
            let grow_down = if !can_grow_up {
                true
            } else if !can_grow_down {
                false
            } else {
                ctx.slack(cluster.start_index - 1) < ctx.slack(cluster.end_index + 1)
            };

            let neighbor = if grow_down {
                cluster.end_index += 1;
                cluster.layers.push(cluster.end_index);
                cluster.end_index
            } else {
                cluster.start_index -= 1;
                cluster.layers.insert(0, cluster.start_index);
                cluster.start_index
            };
            // An overflowing neighbor contributes nothing, never a deficit.
            cluster.total_available += ctx.slack(neighbor).max(0.0);
            ctx.claimed[neighbor] = true;
        }

        // Neighbors exhausted: manufacture the rest by stretching the track.
        cluster.needs_extra_space = (cluster.total_needed - cluster.total_available).max(0.0);
        distribute_space(&mut cluster, ctx.intervals, config);
        clusters.push(cluster);
    }

    for index in 0..n {
        if ctx.claimed[index] {
            continue;
        }
        let interval = &ctx.intervals[index];
        clusters.push(Cluster {
            start_index: index,
            end_index: index,
            layers: vec![index],
            total_needed: 0.0,
            total_available: ctx.conflicts[index].available_space,
            needs_extra_space: 0.0,
            layer_sizes: vec![LayerSize {
                layer_index: index,
                original_height: interval.original_height(),
                text_height: interval.estimated_text_height,
                final_height: interval.original_height(),
                from: interval.from,
                to: interval.to,
            }],
            unchanged: true,
        });
    }

    clusters.sort_by_key(|cluster| cluster.start_index);
    clusters
}

/// Split the cluster's final space among its members in proportion to their
/// label-height demand, flooring each member at `text_height + fixed_margin`
/// so its own label always fits. The floor may push the allocated span past
/// the proportional total; that divergence is kept, not rebalanced.
pub(super) fn distribute_space(
    cluster: &mut Cluster,
    intervals: &[Interval],
    config: &LayoutConfig,
) {
    let total_original: f64 = cluster
        .layers
        .iter()
        .map(|&i| intervals[i].original_height())
        .sum();
    let total_text: f64 = cluster
        .layers
        .iter()
        .map(|&i| intervals[i].estimated_text_height)
        .sum();
    let final_total_space = total_original + cluster.needs_extra_space;

    cluster.layer_sizes = cluster
        .layers
        .iter()
        .map(|&i| {
            let interval = &intervals[i];
            let text_height = interval.estimated_text_height;
            let final_height = if total_text <= 0.0 {
                // Nothing demands space: keep the physical heights.
                interval.original_height()
            } else {
                let proportional = final_total_space * text_height / total_text;
                proportional.max(text_height + config.fixed_margin)
            };
            LayerSize {
                layer_index: i,
                original_height: interval.original_height(),
                text_height,
                final_height,
                from: interval.from,
                to: interval.to,
            }
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::conflict::analyze_conflicts;
    use crate::layout::text::estimate_text_height;

    fn intervals_from(bounds: &[(f64, f64)], label_lengths: &[usize]) -> Vec<Interval> {
        let config = LayoutConfig::default();
        bounds
            .iter()
            .zip(label_lengths)
            .enumerate()
            .map(|(index, (&(from, to), &len))| {
                let label = "A".repeat(len);
                let estimated_text_height = estimate_text_height(&label, &config);
                Interval {
                    index,
                    from,
                    to,
                    label,
                    estimated_text_height,
                }
            })
            .collect()
    }

    fn run(bounds: &[(f64, f64)], label_lengths: &[usize]) -> Vec<Cluster> {
        let config = LayoutConfig::default();
        let intervals = intervals_from(bounds, label_lengths);
        let conflicts = analyze_conflicts(&intervals);
        let mut ctx = AllocationContext::new(&intervals, &conflicts);
        build_clusters(&mut ctx, &config)
    }

    fn assert_partition(clusters: &[Cluster], n: usize) {
        let mut seen = vec![0usize; n];
        for cluster in clusters {
            assert_eq!(
                cluster.layers,
                (cluster.start_index..=cluster.end_index).collect::<Vec<_>>()
            );
            for &layer in &cluster.layers {
                seen[layer] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1), "partition broken: {seen:?}");
        for pair in clusters.windows(2) {
            assert!(pair[0].start_index < pair[1].start_index);
        }
    }

    #[test]
    fn overflowing_middle_absorbs_both_neighbors() {
        // 0.35 / 2.6 / 0.35 of text against three 1 m layers: the middle
        // needs 1.6 extra, the neighbors offer 0.65 each.
        let clusters = run(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)], &[10, 200, 10]);
        assert_partition(&clusters, 3);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert!(!cluster.unchanged);
        assert_eq!((cluster.start_index, cluster.end_index), (0, 2));
        assert!((cluster.total_available - 1.3).abs() < 1e-9);
        assert!((cluster.needs_extra_space - 0.3).abs() < 1e-9);
    }

    #[test]
    fn fitting_single_interval_stays_unchanged() {
        let clusters = run(&[(0.0, 1.0)], &[5]);
        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].unchanged);
        assert_eq!(clusters[0].layer_sizes[0].final_height, 1.0);
    }

    #[test]
    fn uniformly_overflowing_sequence_collapses_into_one_stretched_cluster() {
        let bounds = [(0.0, 0.3), (0.3, 0.6), (0.6, 0.9), (0.9, 1.2)];
        let clusters = run(&bounds, &[40, 40, 40, 40]);
        assert_partition(&clusters, 4);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert!(cluster.needs_extra_space > 0.0);
        let original: f64 = cluster.original_span();
        assert!(cluster.allocated_span() > original);
    }

    #[test]
    fn no_conflicts_yields_only_unchanged_singletons() {
        let clusters = run(&[(0.0, 2.0), (2.0, 4.0), (4.0, 7.0)], &[10, 10, 10]);
        assert_partition(&clusters, 3);
        assert_eq!(clusters.len(), 3);
        for cluster in &clusters {
            assert!(cluster.unchanged);
            assert_eq!(
                cluster.layer_sizes[0].final_height,
                cluster.layer_sizes[0].original_height
            );
        }
    }

    #[test]
    fn equal_slack_tie_expands_toward_start() {
        // Middle layer barely overflows; both neighbors offer 0.65.
        let clusters = run(&[(0.0, 1.0), (1.0, 1.2), (1.2, 2.2)], &[10, 12, 10]);
        assert_partition(&clusters, 3);
        let merged = clusters.iter().find(|c| !c.unchanged).unwrap();
        assert_eq!((merged.start_index, merged.end_index), (0, 1));
        assert!(clusters.iter().any(|c| c.unchanged && c.start_index == 2));
    }

    #[test]
    fn claimed_left_neighbor_blocks_expansion() {
        // Layers 1 and 3 overflow. Seed 1 grabs layer 2 (more slack than
        // layer 0), so seed 3 can only grow downward into layer 4.
        let bounds = [(0.0, 0.6), (0.6, 0.8), (0.8, 2.8), (2.8, 3.0), (3.0, 4.0)];
        let clusters = run(&bounds, &[10, 40, 10, 40, 10]);
        assert_partition(&clusters, 5);
        let second = clusters.iter().find(|c| c.start_index == 3).unwrap();
        assert_eq!((second.start_index, second.end_index), (3, 4));
    }

    #[test]
    fn overflowing_neighbor_contributes_zero_not_negative() {
        // Seed 0 can only grow into layer 1, which itself overflows; the
        // pool must stay at zero rather than going negative.
        let clusters = run(&[(0.0, 0.2), (0.2, 0.4)], &[40, 40]);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.total_available, 0.0);
        assert!((cluster.needs_extra_space - cluster.total_needed).abs() < 1e-9);
    }

    #[test]
    fn floor_guarantees_every_label_fits() {
        let config = LayoutConfig::default();
        for cluster in run(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)], &[10, 200, 10]) {
            for size in &cluster.layer_sizes {
                if !cluster.unchanged {
                    assert!(size.final_height >= size.text_height + config.fixed_margin - 1e-9);
                }
            }
        }
    }

    #[test]
    fn floor_may_exceed_proportional_total() {
        // 0.45 + 2.7 + 0.45 = 3.6 allocated against 3.3 of final space.
        let clusters = run(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)], &[10, 200, 10]);
        let cluster = &clusters[0];
        let final_total = cluster.original_span() + cluster.needs_extra_space;
        assert!(cluster.allocated_span() > final_total);
    }

    #[test]
    fn zero_text_demand_keeps_original_heights() {
        let config = LayoutConfig::default();
        let intervals = intervals_from(&[(0.0, 1.0), (1.0, 3.0)], &[0, 0]);
        let mut cluster = Cluster {
            start_index: 0,
            end_index: 1,
            layers: vec![0, 1],
            total_needed: 0.0,
            total_available: 0.0,
            needs_extra_space: 0.0,
            layer_sizes: Vec::new(),
            unchanged: false,
        };
        distribute_space(&mut cluster, &intervals, &config);
        assert_eq!(cluster.layer_sizes[0].final_height, 1.0);
        assert_eq!(cluster.layer_sizes[1].final_height, 2.0);
    }

    #[test]
    fn every_interval_is_claimed_exactly_once_in_worst_case() {
        // Alternating thin/thick layers, every odd layer overflowing.
        let mut bounds = Vec::new();
        let mut lengths = Vec::new();
        let mut depth = 0.0;
        for i in 0..20 {
            let height = if i % 2 == 0 { 2.0 } else { 0.2 };
            bounds.push((depth, depth + height));
            depth += height;
            lengths.push(if i % 2 == 0 { 10 } else { 40 });
        }
        let clusters = run(&bounds, &lengths);
        assert_partition(&clusters, 20);
    }
}
