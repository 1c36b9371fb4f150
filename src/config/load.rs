use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 預設的使用者設定檔名稱
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

impl Config {
    /// 從指定的設定檔載入；設定檔不存在或無法解析時使用預設值
    pub fn load(settings_path: &Path) -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let settings = Self::load_settings(settings_path).unwrap_or_else(|e| {
            warn!("無法載入使用者設定，改用預設值: {e:#}");
            UserSettings::default()
        });

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::GroupingPolicyKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("settings.json")).unwrap();

        assert_eq!(config.settings.grouping.policy, GroupingPolicyKind::Gap);
        assert!(config.settings.recent_paths.is_empty());
        assert_eq!(config.file_type_table.image_file.len(), 4);
    }

    #[test]
    fn test_corrupt_settings_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.settings.copy.jobs, 1);
    }
}
