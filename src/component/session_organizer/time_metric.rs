//! 時間距離度量
//!
//! 分群演算法只透過 [`Distance`] 取得兩點距離，換成多維度量時不需改動演算法

use crate::tools::PhotoItem;
use chrono::{DateTime, FixedOffset};

/// 具有時間戳記的項目
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<FixedOffset>;
}

/// 兩個項目之間的非負距離
pub trait Distance {
    fn distance(&self, other: &Self) -> f64;
}

/// 兩個時間點相差的秒數（絕對值，保留小數）
#[must_use]
pub fn time_distance(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>) -> f64 {
    let delta = a - b;
    let seconds = delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9;
    seconds.abs()
}

impl Timestamped for PhotoItem {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

impl Distance for PhotoItem {
    fn distance(&self, other: &Self) -> f64 {
        time_distance(self.timestamp, other.timestamp)
    }
}
