//! 複製執行器
//!
//! 依序處理每個群組：先建立資料夾，再複製成員。每個群組與每個檔案開始前檢查中斷訊號，
//! 已開始的複製會完成，但不會再開始新的複製。

use super::copy_planner::{CopyPlan, PlannedCopy};
use super::progress_reporter::{ItemPosition, ProgressEvent, ProgressReporter};
use crate::tools::{CopyStatus, copy_if_absent};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// 複製結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub groups_total: usize,
    /// 已開始處理的群組數
    pub groups_started: usize,
    pub items_total: usize,
    pub copied: usize,
    /// 目標已存在而跳過
    pub skipped: usize,
    pub failed: usize,
    pub bytes_copied: u64,
    /// 因中斷訊號而提前停止
    pub cancelled: bool,
}

#[derive(Default)]
struct Counters {
    copied: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    bytes_copied: AtomicU64,
}

pub struct CopyExecutor {
    shutdown_signal: Arc<AtomicBool>,
    jobs: usize,
    preserve_mtime: bool,
}

impl CopyExecutor {
    #[must_use]
    pub const fn new(shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            shutdown_signal,
            jobs: 1,
            preserve_mtime: true,
        }
    }

    /// 同一群組內同時複製的檔案數，小於 1 時視為 1
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    #[must_use]
    pub const fn with_preserve_mtime(mut self, preserve_mtime: bool) -> Self {
        self.preserve_mtime = preserve_mtime;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    pub fn execute(&self, plan: &CopyPlan, reporter: &dyn ProgressReporter) -> Result<CopySummary> {
        let pool = if self.jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.jobs)
                    .build()
                    .context("無法建立複製執行緒池")?,
            )
        } else {
            None
        };

        let group_count = plan.groups.len();
        let counters = Counters::default();
        let stopped = AtomicBool::new(false);
        let mut groups_started = 0;

        info!(
            "開始複製，共 {} 個群組、{} 個檔案（並行數 {}）",
            group_count,
            plan.total_items(),
            self.jobs
        );

        for (offset, group) in plan.groups.iter().enumerate() {
            if self.is_cancelled() {
                stopped.store(true, Ordering::SeqCst);
                break;
            }

            let group_index = offset + 1;
            groups_started += 1;

            reporter.report(&ProgressEvent::GroupStarted {
                group_index,
                group_count,
                label: group.label.clone(),
                directory: group.directory.clone(),
                item_count: group.copies.len(),
            });

            // 資料夾必須在任何成員複製前建立
            if let Err(e) = fs::create_dir_all(&group.directory) {
                error!("無法建立群組資料夾 {}: {e}", group.directory.display());
                counters
                    .failed
                    .fetch_add(group.copies.len(), Ordering::SeqCst);
                reporter.report(&ProgressEvent::GroupFailed {
                    group_index,
                    group_count,
                    directory: group.directory.clone(),
                    item_count: group.copies.len(),
                    error: e.to_string(),
                });
                continue;
            }

            let item_count = group.copies.len();
            let copy_one = |(item_offset, planned): (usize, &PlannedCopy)| {
                if self.is_cancelled() {
                    stopped.store(true, Ordering::SeqCst);
                    return;
                }
                let position = ItemPosition {
                    group_index,
                    group_count,
                    item_index: item_offset + 1,
                    item_count,
                };
                self.copy_item(position, planned, reporter, &counters);
            };

            match &pool {
                Some(pool) => {
                    pool.install(|| group.copies.par_iter().enumerate().for_each(&copy_one));
                }
                None => group.copies.iter().enumerate().for_each(&copy_one),
            }

            if stopped.load(Ordering::SeqCst) {
                break;
            }
        }

        let summary = CopySummary {
            groups_total: group_count,
            groups_started,
            items_total: plan.total_items(),
            copied: counters.copied.load(Ordering::SeqCst),
            skipped: counters.skipped.load(Ordering::SeqCst),
            failed: counters.failed.load(Ordering::SeqCst),
            bytes_copied: counters.bytes_copied.load(Ordering::SeqCst),
            cancelled: stopped.load(Ordering::SeqCst),
        };

        if summary.cancelled {
            warn!("收到中斷訊號，停止複製");
            reporter.report(&ProgressEvent::Cancelled);
        }

        info!(
            "複製結束 - 複製: {}, 跳過: {}, 失敗: {}, 位元組: {}",
            summary.copied, summary.skipped, summary.failed, summary.bytes_copied
        );
        reporter.report(&ProgressEvent::Finished(summary));

        Ok(summary)
    }

    fn copy_item(
        &self,
        position: ItemPosition,
        planned: &PlannedCopy,
        reporter: &dyn ProgressReporter,
        counters: &Counters,
    ) {
        match copy_if_absent(&planned.source, &planned.destination, self.preserve_mtime) {
            Ok(CopyStatus::Copied(bytes)) => {
                debug!(
                    "複製檔案: {} -> {}",
                    planned.source.display(),
                    planned.destination.display()
                );
                counters.copied.fetch_add(1, Ordering::SeqCst);
                counters.bytes_copied.fetch_add(bytes, Ordering::SeqCst);
                reporter.report(&ProgressEvent::ItemCopied {
                    position,
                    source: planned.source.clone(),
                    destination: planned.destination.clone(),
                    bytes,
                });
            }
            Ok(CopyStatus::AlreadyExists) => {
                debug!("跳過已存在的檔案: {}", planned.destination.display());
                counters.skipped.fetch_add(1, Ordering::SeqCst);
                reporter.report(&ProgressEvent::ItemSkipped {
                    position,
                    source: planned.source.clone(),
                    destination: planned.destination.clone(),
                });
            }
            Err(e) => {
                warn!("{e}");
                counters.failed.fetch_add(1, Ordering::SeqCst);
                reporter.report(&ProgressEvent::ItemFailed {
                    position,
                    source: planned.source.clone(),
                    destination: planned.destination.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}
