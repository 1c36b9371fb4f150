use chrono::{DateTime, TimeDelta};
use photo_session_organize::component::session_organizer::{
    DensityClustering, GapGrouping, GroupingPolicy, time_distance,
};
use photo_session_organize::tools::PhotoItem;
use proptest::prelude::*;

/// 2024-01-01 00:00:00 UTC
const BASE: i64 = 1_704_067_200;

fn photos(offsets: &[i64]) -> Vec<PhotoItem> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            let timestamp = DateTime::from_timestamp(BASE + offset, 0)
                .unwrap()
                .fixed_offset();
            PhotoItem::new(timestamp, format!("/photos/{i:04}.jpg"))
        })
        .collect()
}

fn offset_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..200_000, 0..60)
}

proptest! {
    #[test]
    fn gap_groups_partition_input(offsets in offset_strategy(), gap in 1i64..20_000) {
        let input = photos(&offsets);
        let grouping = GapGrouping::new(TimeDelta::seconds(gap)).group(input.clone());

        prop_assert!(grouping.noise.is_empty());
        let mut flattened: Vec<PhotoItem> = grouping
            .groups
            .iter()
            .flat_map(|g| g.members().iter().cloned())
            .collect();
        let mut expected = input;
        flattened.sort();
        expected.sort();
        prop_assert_eq!(flattened, expected);
    }

    #[test]
    fn gap_groups_respect_threshold(offsets in offset_strategy(), gap in 1i64..20_000) {
        let grouping = GapGrouping::new(TimeDelta::seconds(gap)).group(photos(&offsets));
        let gap = gap as f64;

        for group in &grouping.groups {
            prop_assert!(!group.is_empty());
            for pair in group.members().windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
                prop_assert!(time_distance(pair[0].timestamp, pair[1].timestamp) < gap);
            }
        }

        for pair in grouping.groups.windows(2) {
            let last = pair[0].members().last().unwrap();
            let first = pair[1].representative();
            prop_assert!(first.timestamp - last.timestamp >= TimeDelta::seconds(gap as i64));
        }
    }

    #[test]
    fn density_clusters_are_chronological_and_connected(
        offsets in offset_strategy(),
        epsilon in 0u32..20_000,
        min_points in 1usize..5,
    ) {
        let epsilon = f64::from(epsilon);
        let input = photos(&offsets);
        let total = input.len();
        let grouping = DensityClustering::new(min_points, epsilon)
            .unwrap()
            .group(input);

        prop_assert_eq!(grouping.grouped_items() + grouping.noise.len(), total);

        for group in &grouping.groups {
            prop_assert!(!group.is_empty());
            for pair in group.members().windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
                prop_assert!(time_distance(pair[0].timestamp, pair[1].timestamp) <= epsilon);
            }
        }

        for pair in grouping.groups.windows(2) {
            prop_assert!(pair[0].representative() <= pair[1].representative());
        }

        if min_points == 1 {
            prop_assert!(grouping.noise.is_empty());
        }
    }

    #[test]
    fn sorted_sweep_matches_pairwise(
        offsets in offset_strategy(),
        epsilon in 0u32..20_000,
        min_points in 1usize..5,
    ) {
        let epsilon = f64::from(epsilon);
        let pairwise = DensityClustering::new(min_points, epsilon).unwrap();
        let sweep = DensityClustering::new(min_points, epsilon)
            .unwrap()
            .with_sorted_sweep();

        let expected = pairwise.group(photos(&offsets));
        let actual = sweep.group(photos(&offsets));

        prop_assert_eq!(actual.groups, expected.groups);
        prop_assert_eq!(actual.noise, expected.noise);
    }
}
