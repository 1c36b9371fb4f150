use super::grouping::Group;
use super::time_metric::Timestamped;
use std::collections::HashMap;

/// 資料夾名稱格式：固定寬度、可依字典序排序、檔案系統安全
pub const GROUP_NAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// 群組命名器
pub struct GroupNamer;

impl GroupNamer {
    /// 以代表成員（最早的照片）的時間命名，使用時間戳記本身的時區
    #[must_use]
    pub fn name<T: Timestamped>(group: &Group<T>) -> String {
        group
            .representative()
            .timestamp()
            .format(GROUP_NAME_FORMAT)
            .to_string()
    }

    /// 為整個有序群組列表命名
    ///
    /// 代表時間落在同一秒的群組，第一個保留原名，之後依序加上 `_2`、`_3`…
    #[must_use]
    pub fn assign_names<T: Timestamped>(groups: &[Group<T>]) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();

        groups
            .iter()
            .map(|group| {
                let base = Self::name(group);
                let count = seen.entry(base.clone()).or_insert(0);
                *count += 1;
                if *count == 1 {
                    base
                } else {
                    format!("{base}_{count}")
                }
            })
            .collect()
    }
}
