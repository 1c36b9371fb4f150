use crate::config::{FileTypeTable, TimestampSource};
use crate::tools::timestamp_reader::read_timestamp;
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use walkdir::WalkDir;

/// 掃描得到的照片：拍攝時間與來源路徑
///
/// 排序時先比較時間，再比較路徑
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhotoItem {
    pub timestamp: DateTime<FixedOffset>,
    pub path: PathBuf,
}

impl PhotoItem {
    #[must_use]
    pub fn new(timestamp: DateTime<FixedOffset>, path: impl Into<PathBuf>) -> Self {
        Self {
            timestamp,
            path: path.into(),
        }
    }
}

/// 掃描結果
#[derive(Debug, Default)]
pub struct ScanResult {
    /// 依時間排序的照片
    pub items: Vec<PhotoItem>,
    /// 無法讀取而跳過的項目數
    pub unreadable: usize,
    /// 掃描途中收到中斷訊號
    pub cancelled: bool,
}

/// 照片掃描器
pub struct PhotoScanner {
    file_type_table: FileTypeTable,
    shutdown_signal: Arc<AtomicBool>,
    timestamp_source: TimestampSource,
    /// 不進入的資料夾（已正規化）
    excluded_directories: Vec<PathBuf>,
}

impl PhotoScanner {
    #[must_use]
    pub fn new(file_type_table: FileTypeTable, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            file_type_table,
            shutdown_signal,
            timestamp_source: TimestampSource::default(),
            excluded_directories: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_timestamp_source(mut self, source: TimestampSource) -> Self {
        self.timestamp_source = source;
        self
    }

    /// 排除指定資料夾（例如位於來源內的目標資料夾）
    #[must_use]
    pub fn with_excluded_directory(mut self, directory: &Path) -> Self {
        if let Ok(canonical) = fs::canonicalize(directory) {
            self.excluded_directories.push(canonical);
        }
        self
    }

    /// 遞迴掃描資料夾中的照片並讀取時間戳記
    pub fn scan(&self, directory: &Path) -> Result<ScanResult> {
        info!("開始掃描目錄: {}", directory.display());

        let mut unreadable = 0;
        let mut candidates: Vec<(PathBuf, fs::Metadata)> = Vec::new();

        let walker = WalkDir::new(directory)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in walker {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                info!("收到中斷訊號，停止掃描");
                return Ok(ScanResult {
                    unreadable,
                    cancelled: true,
                    ..ScanResult::default()
                });
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("讀取目錄項目失敗: {e}");
                    unreadable += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.file_type_table.is_image_file(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => candidates.push((entry.into_path(), metadata)),
                Err(e) => {
                    warn!("無法讀取檔案資訊 {}: {e}", entry.path().display());
                    unreadable += 1;
                }
            }
        }

        let failed = AtomicUsize::new(0);

        // 平行讀取時間戳記
        let mut items: Vec<PhotoItem> = candidates
            .par_iter()
            .filter_map(|(path, metadata)| {
                if self.shutdown_signal.load(Ordering::SeqCst) {
                    return None;
                }

                match read_timestamp(path, metadata, self.timestamp_source) {
                    Ok(timestamp) => Some(PhotoItem::new(timestamp, path.clone())),
                    Err(e) => {
                        warn!("無法讀取時間戳記，跳過 {}: {e:#}", path.display());
                        failed.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                }
            })
            .collect();

        let cancelled = self.shutdown_signal.load(Ordering::SeqCst);
        items.sort();
        unreadable += failed.load(Ordering::SeqCst);

        info!(
            "掃描完成，找到 {} 張照片，跳過 {} 個無法讀取的項目",
            items.len(),
            unreadable
        );

        Ok(ScanResult {
            items,
            unreadable,
            cancelled,
        })
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        if self.excluded_directories.is_empty() || !entry.file_type().is_dir() {
            return false;
        }
        fs::canonicalize(entry.path())
            .is_ok_and(|canonical| self.excluded_directories.contains(&canonical))
    }
}
