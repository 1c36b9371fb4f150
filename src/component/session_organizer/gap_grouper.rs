//! 依時間間隔分組
//!
//! 依時間排序後逐一掃描，與前一張相隔達到門檻就開新的一組

use super::grouping::{Group, Grouping, GroupingPolicy, sort_chronologically};
use super::time_metric::Timestamped;
use chrono::TimeDelta;

#[derive(Debug, Clone, Copy)]
pub struct GapGrouping {
    gap: TimeDelta,
}

impl GapGrouping {
    #[must_use]
    pub const fn new(gap: TimeDelta) -> Self {
        Self { gap }
    }
}

impl<T: Timestamped + Ord> GroupingPolicy<T> for GapGrouping {
    fn name(&self) -> &'static str {
        "gap"
    }

    fn group(&self, mut items: Vec<T>) -> Grouping<T> {
        sort_chronologically(&mut items);

        let mut groups: Vec<Group<T>> = Vec::new();
        let mut current: Vec<T> = Vec::new();

        for item in items {
            // 相隔恰好等於門檻也算新的一組
            let starts_new_group = current
                .last()
                .is_some_and(|previous| item.timestamp() - previous.timestamp() >= self.gap);

            if starts_new_group {
                groups.extend(Group::new(std::mem::take(&mut current)));
            }
            current.push(item);
        }
        groups.extend(Group::new(current));

        Grouping {
            groups,
            noise: Vec::new(),
        }
    }
}
