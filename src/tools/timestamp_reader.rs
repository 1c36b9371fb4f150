//! 照片時間戳記讀取
//!
//! 依設定從 EXIF、檔案建立時間或修改時間取得拍攝時間

use crate::config::TimestampSource;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use exif::{In, Reader, Tag, Value};
use log::debug;
use std::fs::{File, Metadata};
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

/// 依指定來源讀取檔案時間戳記
pub fn read_timestamp(
    path: &Path,
    metadata: &Metadata,
    source: TimestampSource,
) -> Result<DateTime<FixedOffset>> {
    match source {
        TimestampSource::Modified => {
            let modified = metadata
                .modified()
                .with_context(|| format!("無法取得修改時間: {}", path.display()))?;
            Ok(system_time_to_local(modified))
        }
        TimestampSource::Birth => birth_or_modified(path, metadata),
        TimestampSource::Exif => match read_exif_timestamp(path) {
            Some(timestamp) => Ok(timestamp),
            None => {
                debug!("找不到 EXIF 拍攝時間，改用檔案時間: {}", path.display());
                birth_or_modified(path, metadata)
            }
        },
    }
}

/// 優先使用建立時間，平台不支援時退回修改時間
fn birth_or_modified(path: &Path, metadata: &Metadata) -> Result<DateTime<FixedOffset>> {
    let time = metadata
        .created()
        .or_else(|_| metadata.modified())
        .with_context(|| format!("無法取得檔案時間: {}", path.display()))?;
    Ok(system_time_to_local(time))
}

#[must_use]
pub fn system_time_to_local(time: SystemTime) -> DateTime<FixedOffset> {
    DateTime::<Local>::from(time).fixed_offset()
}

/// 讀取 EXIF 的 `DateTimeOriginal`（或 `DateTime`），沒有時區資訊時視為本地時間
#[must_use]
pub fn read_exif_timestamp(path: &Path) -> Option<DateTime<FixedOffset>> {
    let file = File::open(path).ok()?;
    let mut buf_reader = BufReader::new(file);
    let exif_data = Reader::new().read_from_container(&mut buf_reader).ok()?;

    let (date_tag, offset_tag) = if exif_data
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .is_some()
    {
        (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal)
    } else {
        (Tag::DateTime, Tag::OffsetTime)
    };

    let field = exif_data.get_field(date_tag, In::PRIMARY)?;
    let raw = first_ascii(&field.value)?;
    let mut exif_time = exif::DateTime::from_ascii(raw).ok()?;

    if let Some(offset_field) = exif_data.get_field(offset_tag, In::PRIMARY) {
        if let Some(offset_raw) = first_ascii(&offset_field.value) {
            // 時區欄位格式錯誤時忽略，改用本地時區
            let _ = exif_time.parse_offset(offset_raw);
        }
    }

    let naive = NaiveDate::from_ymd_opt(
        i32::from(exif_time.year),
        u32::from(exif_time.month),
        u32::from(exif_time.day),
    )?
    .and_hms_nano_opt(
        u32::from(exif_time.hour),
        u32::from(exif_time.minute),
        u32::from(exif_time.second),
        exif_time.nanosecond.unwrap_or(0),
    )?;

    match exif_time.offset {
        Some(offset_minutes) => {
            let offset = FixedOffset::east_opt(i32::from(offset_minutes) * 60)?;
            offset.from_local_datetime(&naive).single()
        }
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
    }
}

fn first_ascii(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Ascii(values) => values.first().map(Vec::as_slice),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_modified_source_uses_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.jpg");
        fs::write(&path, "not really a jpeg").unwrap();

        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        let metadata = fs::metadata(&path).unwrap();
        let timestamp = read_timestamp(&path, &metadata, TimestampSource::Modified).unwrap();
        assert_eq!(timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_exif_source_falls_back_without_exif() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.png");
        fs::write(&path, "no exif here").unwrap();

        assert!(read_exif_timestamp(&path).is_none());

        let metadata = fs::metadata(&path).unwrap();
        assert!(read_timestamp(&path, &metadata, TimestampSource::Exif).is_ok());
    }

    #[test]
    fn test_missing_file_has_no_exif() {
        assert!(read_exif_timestamp(Path::new("/definitely/not/here.jpg")).is_none());
    }
}
