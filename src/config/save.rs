use crate::config::types::{MAX_RECENT_PATHS, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(path: &Path, settings: &UserSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 更新最近使用的路徑
/// 將新路徑加入最前面，去重並限制數量
pub fn add_recent_path(settings: &mut UserSettings, path: &str) {
    // 移除已存在的相同路徑
    settings.recent_paths.retain(|p| p != path);

    // 加入到最前面
    settings.recent_paths.insert(0, path.to_string());

    // 限制數量
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Config;
    use tempfile::TempDir;

    #[test]
    fn test_add_recent_path_dedup_and_truncate() {
        let mut settings = UserSettings::default();
        for i in 0..MAX_RECENT_PATHS + 3 {
            add_recent_path(&mut settings, &format!("/photos/{i}"));
        }
        add_recent_path(&mut settings, "/photos/5");

        assert_eq!(settings.recent_paths.len(), MAX_RECENT_PATHS);
        assert_eq!(settings.recent_paths[0], "/photos/5");
        assert_eq!(
            settings
                .recent_paths
                .iter()
                .filter(|p| p.as_str() == "/photos/5")
                .count(),
            1
        );
    }

    #[test]
    fn test_save_then_load_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.copy.jobs = 4;
        add_recent_path(&mut settings, "/mnt/card");
        save_settings(&path, &settings).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.settings.copy.jobs, 4);
        assert_eq!(config.settings.recent_paths, vec!["/mnt/card".to_string()]);
    }
}
