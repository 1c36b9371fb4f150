//! 密度分群（DBSCAN）
//!
//! 兩點距離不超過 `epsilon` 即互為鄰居；鄰居數（含自己）達到 `min_points`
//! 的點為核心點。核心點與其鄰居遞移相連形成叢集，無法由任何核心點抵達的點為雜訊。
//!
//! 鄰居搜尋有兩種：
//! - [`NeighborSearch::Pairwise`]：兩兩比較，O(n²)，適用任何度量
//! - [`NeighborSearch::SortedSweep`]：在依時間排序的序列上用雙指標找出連續視窗，
//!   直接以視窗標記叢集，時間與記憶體皆為 O(n)；只在距離隨排序單調遞增時成立
//!   （一維時間度量即是）

use super::grouping::{
    Group, Grouping, GroupingPolicy, sort_chronologically, sort_groups_chronologically,
};
use super::time_metric::{Distance, Timestamped};
use anyhow::{Result, bail};
use std::collections::VecDeque;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborSearch {
    #[default]
    Pairwise,
    SortedSweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct DensityClustering {
    min_points: usize,
    epsilon: f64,
    search: NeighborSearch,
}

impl DensityClustering {
    /// `min_points` 至少為 1；`epsilon` 需為非負有限值（秒）
    pub fn new(min_points: usize, epsilon: f64) -> Result<Self> {
        if min_points == 0 {
            bail!("min_points 至少需為 1");
        }
        if !epsilon.is_finite() || epsilon < 0.0 {
            bail!("epsilon 需為非負有限值: {epsilon}");
        }
        Ok(Self {
            min_points,
            epsilon,
            search: NeighborSearch::Pairwise,
        })
    }

    /// 改用排序後的雙指標鄰居搜尋，呼叫端需保證距離隨時間單調
    #[must_use]
    pub const fn with_sorted_sweep(mut self) -> Self {
        self.search = NeighborSearch::SortedSweep;
        self
    }

    /// 回傳每個點的標籤
    fn label<T: Distance>(&self, items: &[T]) -> Vec<Label> {
        match self.search {
            NeighborSearch::Pairwise => self.label_by_expansion(items),
            NeighborSearch::SortedSweep => self.label_by_windows(&self.sweep_windows(items)),
        }
    }

    /// 兩兩比較求鄰居，再由核心點向外擴張
    fn label_by_expansion<T: Distance>(&self, items: &[T]) -> Vec<Label> {
        let neighborhoods: Vec<Vec<usize>> = (0..items.len())
            .map(|i| {
                (0..items.len())
                    .filter(|&j| items[i].distance(&items[j]) <= self.epsilon)
                    .collect()
            })
            .collect();
        let mut labels = vec![Label::Unvisited; items.len()];
        let mut next_cluster = 0;

        for point in 0..items.len() {
            if labels[point] != Label::Unvisited {
                continue;
            }

            if neighborhoods[point].len() < self.min_points {
                labels[point] = Label::Noise;
                continue;
            }

            let cluster = next_cluster;
            next_cluster += 1;
            labels[point] = Label::Cluster(cluster);

            let mut queue: VecDeque<usize> = neighborhoods[point].iter().copied().collect();
            while let Some(neighbor) = queue.pop_front() {
                match labels[neighbor] {
                    // 先前被判為雜訊的點成為邊界點
                    Label::Noise => labels[neighbor] = Label::Cluster(cluster),
                    Label::Unvisited => {
                        labels[neighbor] = Label::Cluster(cluster);
                        if neighborhoods[neighbor].len() >= self.min_points {
                            queue.extend(neighborhoods[neighbor].iter().copied());
                        }
                    }
                    Label::Cluster(_) => {}
                }
            }
        }

        labels
    }

    /// 雙指標：對每個 i 找出 [lo, hi]，兩端指標都只會往前移動
    fn sweep_windows<T: Distance>(&self, items: &[T]) -> Vec<RangeInclusive<usize>> {
        let mut windows = Vec::with_capacity(items.len());
        let mut lo = 0;
        let mut hi = 0;

        for i in 0..items.len() {
            while items[lo].distance(&items[i]) > self.epsilon {
                lo += 1;
            }
            hi = hi.max(i);
            while hi + 1 < items.len() && items[i].distance(&items[hi + 1]) <= self.epsilon {
                hi += 1;
            }
            windows.push(lo..=hi);
        }

        windows
    }

    /// 直接在視窗上標記，時間與記憶體皆為 O(n)
    ///
    /// 一維時相鄰的核心點若互在視窗內即屬同一叢集，因此叢集是核心點序列上的連續區段。
    /// 邊界點先歸給左側最近的核心點，再考慮右側，與逐點擴張時先建立的叢集優先一致。
    fn label_by_windows(&self, windows: &[RangeInclusive<usize>]) -> Vec<Label> {
        let is_core: Vec<bool> = windows
            .iter()
            .map(|window| window.end() - window.start() + 1 >= self.min_points)
            .collect();
        let mut labels = vec![Label::Noise; windows.len()];

        let mut cluster_count = 0;
        let mut previous_core: Option<usize> = None;
        for i in (0..windows.len()).filter(|&i| is_core[i]) {
            let connected = previous_core.is_some_and(|p| i <= *windows[p].end());
            if !connected {
                cluster_count += 1;
            }
            labels[i] = Label::Cluster(cluster_count - 1);
            previous_core = Some(i);
        }

        let mut nearest_core: Option<usize> = None;
        for i in 0..windows.len() {
            if is_core[i] {
                nearest_core = Some(i);
            } else if let Some(core) = nearest_core.filter(|&c| c >= *windows[i].start()) {
                labels[i] = labels[core];
            }
        }

        nearest_core = None;
        for i in (0..windows.len()).rev() {
            if is_core[i] {
                nearest_core = Some(i);
            } else if labels[i] == Label::Noise {
                if let Some(core) = nearest_core.filter(|&c| c <= *windows[i].end()) {
                    labels[i] = labels[core];
                }
            }
        }

        labels
    }
}

impl<T: Timestamped + Distance + Ord> GroupingPolicy<T> for DensityClustering {
    fn name(&self) -> &'static str {
        "density"
    }

    fn group(&self, mut items: Vec<T>) -> Grouping<T> {
        // 雙指標搜尋需要排好序的輸入；兩種搜尋都排序以得到一致的結果
        sort_chronologically(&mut items);
        let labels = self.label(&items);

        let cluster_count = labels
            .iter()
            .filter_map(|label| match label {
                Label::Cluster(id) => Some(id + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        let mut clusters: Vec<Vec<T>> = (0..cluster_count).map(|_| Vec::new()).collect();
        let mut noise = Vec::new();

        for (item, label) in items.into_iter().zip(labels) {
            match label {
                Label::Cluster(id) => clusters[id].push(item),
                Label::Noise | Label::Unvisited => noise.push(item),
            }
        }

        let mut groups: Vec<Group<T>> = clusters.into_iter().filter_map(Group::new).collect();
        sort_groups_chronologically(&mut groups);

        Grouping { groups, noise }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::PhotoItem;
    use chrono::{DateTime, TimeDelta};

    fn minutes(offsets: &[i64]) -> Vec<PhotoItem> {
        let base = DateTime::parse_from_rfc3339("2024-03-05T00:00:00Z").unwrap();
        offsets
            .iter()
            .map(|m| PhotoItem::new(base + TimeDelta::minutes(*m), format!("/p/{m}.jpg")))
            .collect()
    }

    fn offsets(group: &Group<PhotoItem>) -> Vec<i64> {
        let base = DateTime::parse_from_rfc3339("2024-03-05T00:00:00Z").unwrap();
        group
            .members()
            .iter()
            .map(|item| (item.timestamp - base).num_minutes())
            .collect()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(DensityClustering::new(0, 10.0).is_err());
        assert!(DensityClustering::new(2, -1.0).is_err());
        assert!(DensityClustering::new(2, f64::NAN).is_err());
        assert!(DensityClustering::new(2, f64::INFINITY).is_err());
        assert!(DensityClustering::new(1, 0.0).is_ok());
    }

    #[test]
    fn test_two_clusters_and_noise() {
        // epsilon 10 分鐘；600 為孤立點
        let clustering = DensityClustering::new(2, 600.0).unwrap();
        let grouping = clustering.group(minutes(&[125, 0, 600, 5, 120, 10]));

        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(offsets(&grouping.groups[0]), vec![0, 5, 10]);
        assert_eq!(offsets(&grouping.groups[1]), vec![120, 125]);
        assert_eq!(grouping.noise.len(), 1);
    }

    #[test]
    fn test_clusters_are_emitted_chronologically() {
        let clustering = DensityClustering::new(2, 60.0).unwrap();
        let grouping = clustering.group(minutes(&[500, 501, 10, 11, 200, 201]));

        let firsts: Vec<i64> = grouping.groups.iter().map(|g| offsets(g)[0]).collect();
        assert_eq!(firsts, vec![10, 200, 500]);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // min_points 3：5 是核心點 (0,5,10)，0 與 10 只有兩個鄰居，是邊界點
        let clustering = DensityClustering::new(3, 300.0).unwrap();
        let grouping = clustering.group(minutes(&[0, 5, 10]));

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(offsets(&grouping.groups[0]), vec![0, 5, 10]);
        assert!(grouping.noise.is_empty());
    }

    #[test]
    fn test_single_item_boundaries() {
        let single = minutes(&[0]);

        let grouping = DensityClustering::new(1, 60.0).unwrap().group(single.clone());
        assert_eq!(grouping.groups.len(), 1);
        assert!(grouping.noise.is_empty());

        let grouping = DensityClustering::new(2, 60.0).unwrap().group(single);
        assert!(grouping.groups.is_empty());
        assert_eq!(grouping.noise.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let grouping = DensityClustering::new(2, 60.0)
            .unwrap()
            .group(Vec::<PhotoItem>::new());
        assert!(grouping.groups.is_empty());
        assert!(grouping.noise.is_empty());
    }

    #[test]
    fn test_zero_epsilon_groups_identical_instants() {
        let clustering = DensityClustering::new(2, 0.0).unwrap();
        let grouping = clustering.group(minutes(&[0, 0, 1]));

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].len(), 2);
        assert_eq!(grouping.noise.len(), 1);
    }

    #[test]
    fn test_sorted_sweep_matches_pairwise() {
        let items = minutes(&[0, 3, 7, 30, 31, 90, 91, 92, 93, 200, 205, 400]);
        for min_points in 1..=4 {
            for epsilon in [0.0, 60.0, 240.0, 600.0, 3_600.0] {
                let pairwise = DensityClustering::new(min_points, epsilon).unwrap();
                let sweep = pairwise.with_sorted_sweep();
                assert_eq!(
                    pairwise.group(items.clone()),
                    sweep.group(items.clone()),
                    "min_points={min_points} epsilon={epsilon}"
                );
            }
        }
    }

    #[test]
    fn test_sorted_sweep_handles_one_dense_session() {
        // 五萬張照片全落在同一個 epsilon 內，每個視窗都涵蓋整個序列
        let base = DateTime::parse_from_rfc3339("2024-03-05T00:00:00Z").unwrap();
        let items: Vec<PhotoItem> = (0..50_000)
            .map(|i| PhotoItem::new(base + TimeDelta::milliseconds(i), format!("/p/{i:05}.jpg")))
            .collect();

        let grouping = DensityClustering::new(2, 4.0 * 3_600.0)
            .unwrap()
            .with_sorted_sweep()
            .group(items);

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].len(), 50_000);
        assert!(grouping.noise.is_empty());
    }

    #[test]
    fn test_sorted_sweep_border_between_two_clusters_goes_left() {
        // min_points 4、epsilon 10 分鐘：17 只有 8、17、26 三個鄰居，是兩側叢集共用的邊界點
        let items = minutes(&[0, 2, 4, 6, 8, 17, 26, 28, 30, 32, 34]);
        let pairwise = DensityClustering::new(4, 600.0).unwrap();
        let sweep = pairwise.with_sorted_sweep();

        let expected = pairwise.group(items.clone());
        let actual = sweep.group(items);

        assert_eq!(actual, expected);
        assert_eq!(offsets(&actual.groups[0]), vec![0, 2, 4, 6, 8, 17]);
        assert_eq!(offsets(&actual.groups[1]), vec![26, 28, 30, 32, 34]);
    }
}
