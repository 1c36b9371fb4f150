//! 分組策略的共用型別

use super::density_clusterer::DensityClustering;
use super::gap_grouper::GapGrouping;
use super::time_metric::Timestamped;
use crate::config::{GroupingPolicyKind, GroupingSettings};
use crate::tools::PhotoItem;
use anyhow::Result;
use chrono::TimeDelta;

/// 一組照片（同一次拍攝）
///
/// 成員依時間遞增排列且不為空，第一個成員即為代表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    members: Vec<T>,
}

impl<T: Timestamped + Ord> Group<T> {
    /// 由成員建立群組，成員為空時回傳 `None`
    #[must_use]
    pub fn new(mut members: Vec<T>) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        sort_chronologically(&mut members);
        Some(Self { members })
    }
}

impl<T> Group<T> {
    #[must_use]
    pub fn members(&self) -> &[T] {
        &self.members
    }

    /// 最早的成員，用於命名
    #[must_use]
    pub fn representative(&self) -> &T {
        &self.members[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// 分組結果；只有密度分群會產生雜訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<T> {
    pub groups: Vec<Group<T>>,
    pub noise: Vec<T>,
}

impl<T> Default for Grouping<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            noise: Vec::new(),
        }
    }
}

impl<T> Grouping<T> {
    #[must_use]
    pub fn grouped_items(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

/// 分組策略
pub trait GroupingPolicy<T>: Send + Sync {
    fn name(&self) -> &'static str;
    fn group(&self, items: Vec<T>) -> Grouping<T>;
}

/// 依時間排序，時間相同時以項目本身的順序決定，確保結果可重現
pub fn sort_chronologically<T: Timestamped + Ord>(items: &mut [T]) {
    items.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then_with(|| a.cmp(b)));
}

/// 群組依代表（最早成員）排序
pub fn sort_groups_chronologically<T: Timestamped + Ord>(groups: &mut [Group<T>]) {
    groups.sort_by(|a, b| {
        let (a, b) = (a.representative(), b.representative());
        a.timestamp().cmp(&b.timestamp()).then_with(|| a.cmp(b))
    });
}

/// 依設定建立照片的分組策略
pub fn build_policy(settings: &GroupingSettings) -> Result<Box<dyn GroupingPolicy<PhotoItem>>> {
    match settings.policy {
        GroupingPolicyKind::Gap => {
            let gap = TimeDelta::try_seconds(i64::try_from(settings.gap_seconds)?)
                .ok_or_else(|| anyhow::anyhow!("時間間隔過大: {} 秒", settings.gap_seconds))?;
            Ok(Box::new(GapGrouping::new(gap)))
        }
        GroupingPolicyKind::Density => Ok(Box::new(
            DensityClustering::new(settings.min_points, settings.epsilon_seconds)?
                .with_sorted_sweep(),
        )),
    }
}
