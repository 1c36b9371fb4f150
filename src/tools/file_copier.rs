//! 單一檔案複製
//!
//! 目標已存在時跳過；以 create-new 開檔，確保平行複製時不會覆寫

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("無法開啟來源檔案 {path}: {source}")]
    OpenSource { path: PathBuf, source: io::Error },

    #[error("無法建立目標檔案 {path}: {source}")]
    CreateDestination { path: PathBuf, source: io::Error },

    #[error("寫入目標檔案失敗 {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("來源路徑沒有檔名: {path}")]
    MissingFileName { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// 已複製，附帶位元組數
    Copied(u64),
    /// 目標已存在，未動到任何檔案
    AlreadyExists,
}

/// 目標不存在時才複製
///
/// 寫入失敗時會刪除寫到一半的目標檔，避免下次執行誤判為已存在
pub fn copy_if_absent(
    source: &Path,
    destination: &Path,
    preserve_mtime: bool,
) -> Result<CopyStatus, CopyError> {
    if source.file_name().is_none() {
        return Err(CopyError::MissingFileName {
            path: source.to_path_buf(),
        });
    }

    if destination.exists() {
        return Ok(CopyStatus::AlreadyExists);
    }

    let source_file = File::open(source).map_err(|e| CopyError::OpenSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    let destination_file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(CopyStatus::AlreadyExists);
        }
        Err(e) => {
            return Err(CopyError::CreateDestination {
                path: destination.to_path_buf(),
                source: e,
            });
        }
    };

    match stream_copy(&source_file, &destination_file, preserve_mtime) {
        Ok(bytes) => Ok(CopyStatus::Copied(bytes)),
        Err(e) => {
            drop(destination_file);
            let _ = fs::remove_file(destination);
            Err(CopyError::Write {
                path: destination.to_path_buf(),
                source: e,
            })
        }
    }
}

fn stream_copy(source: &File, destination: &File, preserve_mtime: bool) -> io::Result<u64> {
    let mut reader = BufReader::new(source);
    let mut writer = BufWriter::new(destination);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    drop(writer);

    if preserve_mtime {
        let modified = source.metadata()?.modified()?;
        destination.set_modified(modified)?;
    }

    Ok(bytes)
}
