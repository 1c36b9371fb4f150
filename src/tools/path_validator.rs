use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    validate_directory_exists(path)
}

/// 確認資料夾可以讀取（不切換工作目錄）
pub fn validate_directory_accessible(path: &Path) -> Result<()> {
    fs::read_dir(path).with_context(|| format!("無法存取資料夾: {}", path.display()))?;
    Ok(())
}
