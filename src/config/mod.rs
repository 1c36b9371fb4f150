pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, CopySettings, FileTypeTable, GroupingPolicyKind, GroupingSettings, Language,
    MAX_RECENT_PATHS, NoisePolicy, TimestampSource, UserSettings,
};
