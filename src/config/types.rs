use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 10;

/// 預設的時間間隔門檻（3 小時）
pub const DEFAULT_GAP_SECONDS: u64 = 3 * 60 * 60;

/// 預設的密度分群半徑（4 小時）
pub const DEFAULT_EPSILON_SECONDS: f64 = 4.0 * 60.0 * 60.0;

/// 預設的核心點最少鄰居數（含自己）
pub const DEFAULT_MIN_POINTS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn image_extensions_set(&self) -> HashSet<String> {
        self.image_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        let image_extensions = self.image_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| image_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[serde(rename = "en-US")]
    #[value(name = "en-US")]
    EnUs,
    #[default]
    #[serde(rename = "zh-TW")]
    #[value(name = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

/// 照片時間戳記的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// 建立時間（平台不支援時退回修改時間）
    #[default]
    Birth,
    /// 僅使用修改時間
    Modified,
    /// EXIF 拍攝時間，讀不到時退回建立時間
    Exif,
}

/// 分組策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupingPolicyKind {
    /// 依相鄰照片的時間間隔切分
    #[default]
    Gap,
    /// 密度分群（可能產生雜訊點）
    Density,
}

/// 密度分群產生的雜訊照片處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoisePolicy {
    /// 不複製
    Drop,
    /// 每張雜訊照片自成一組
    #[default]
    Singleton,
    /// 直接複製到目標根目錄
    Root,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingSettings {
    pub policy: GroupingPolicyKind,
    pub gap_seconds: u64,
    pub epsilon_seconds: f64,
    pub min_points: usize,
    pub noise: NoisePolicy,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            policy: GroupingPolicyKind::default(),
            gap_seconds: DEFAULT_GAP_SECONDS,
            epsilon_seconds: DEFAULT_EPSILON_SECONDS,
            min_points: DEFAULT_MIN_POINTS,
            noise: NoisePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CopySettings {
    /// 同一組內同時複製的檔案數，1 為循序
    pub jobs: usize,
    /// 複製後保留原檔的修改時間
    pub preserve_mtime: bool,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            jobs: 1,
            preserve_mtime: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    pub timestamp_source: TimestampSource,
    pub grouping: GroupingSettings,
    pub copy: CopySettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
