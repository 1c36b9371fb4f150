//! 複製計畫
//!
//! 將分組結果轉成每個群組的目標資料夾與每張照片的目標路徑

use super::group_namer::GroupNamer;
use super::grouping::{Group, Grouping, sort_groups_chronologically};
use crate::config::NoisePolicy;
use crate::tools::PhotoItem;
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// 一次拍攝，放在自己的子資料夾
    Session,
    /// 未分組的雜訊照片，直接放在目標根目錄
    Loose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    /// 來源沒有檔名時為群組資料夾本身，複製時會以失敗回報
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// 顯示用名稱（工作階段即資料夾名稱）
    pub label: String,
    pub directory: PathBuf,
    pub kind: GroupKind,
    pub copies: Vec<PlannedCopy>,
}

#[derive(Debug, Clone, Default)]
pub struct CopyPlan {
    pub groups: Vec<PlannedGroup>,
    /// 依雜訊策略捨棄的照片數
    pub dropped_noise: usize,
}

impl CopyPlan {
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.groups.iter().map(|g| g.copies.len()).sum()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.kind == GroupKind::Session)
            .count()
    }
}

/// 顯示於雜訊群組的標籤
pub const LOOSE_GROUP_LABEL: &str = "(ungrouped)";

pub struct CopyPlanner {
    destination_root: PathBuf,
    noise_policy: NoisePolicy,
}

impl CopyPlanner {
    #[must_use]
    pub fn new(destination_root: &Path) -> Self {
        Self {
            destination_root: destination_root.to_path_buf(),
            noise_policy: NoisePolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_noise_policy(mut self, noise_policy: NoisePolicy) -> Self {
        self.noise_policy = noise_policy;
        self
    }

    pub fn plan(&self, grouping: Grouping<PhotoItem>) -> CopyPlan {
        let Grouping { mut groups, noise } = grouping;
        let mut dropped_noise = 0;
        let mut loose = Vec::new();

        match self.noise_policy {
            NoisePolicy::Drop => {
                if !noise.is_empty() {
                    info!("依設定捨棄 {} 張未分群的照片", noise.len());
                }
                dropped_noise = noise.len();
            }
            NoisePolicy::Singleton => {
                groups.extend(noise.into_iter().filter_map(|item| Group::new(vec![item])));
                sort_groups_chronologically(&mut groups);
            }
            NoisePolicy::Root => loose = noise,
        }

        let names = GroupNamer::assign_names(&groups);
        let mut planned: Vec<PlannedGroup> = groups
            .into_iter()
            .zip(names)
            .map(|(group, name)| {
                let directory = self.destination_root.join(&name);
                let copies = Self::plan_copies(group.members(), &directory);
                PlannedGroup {
                    label: name,
                    directory,
                    kind: GroupKind::Session,
                    copies,
                }
            })
            .collect();

        if !loose.is_empty() {
            planned.push(PlannedGroup {
                label: LOOSE_GROUP_LABEL.to_string(),
                directory: self.destination_root.clone(),
                kind: GroupKind::Loose,
                copies: Self::plan_copies(&loose, &self.destination_root),
            });
        }

        CopyPlan {
            groups: planned,
            dropped_noise,
        }
    }

    fn plan_copies(items: &[PhotoItem], directory: &Path) -> Vec<PlannedCopy> {
        items
            .iter()
            .map(|item| {
                let destination = match item.path.file_name() {
                    Some(file_name) => directory.join(file_name),
                    None => {
                        warn!("來源路徑沒有檔名: {}", item.path.display());
                        directory.to_path_buf()
                    }
                };
                PlannedCopy {
                    source: item.path.clone(),
                    destination,
                }
            })
            .collect()
    }
}
