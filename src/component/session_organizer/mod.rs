//! 照片工作階段整理元件
//!
//! 依拍攝時間將照片分成多次拍攝（工作階段），每個工作階段複製到
//! 以最早照片時間命名的子資料夾。分組策略可選擇時間間隔或密度分群。

mod copy_executor;
mod copy_planner;
mod density_clusterer;
mod gap_grouper;
mod group_namer;
mod grouping;
mod main;
mod progress_reporter;
mod time_metric;

pub use copy_executor::{CopyExecutor, CopySummary};
pub use copy_planner::{
    CopyPlan, CopyPlanner, GroupKind, LOOSE_GROUP_LABEL, PlannedCopy, PlannedGroup,
};
pub use density_clusterer::{DensityClustering, NeighborSearch};
pub use gap_grouper::GapGrouping;
pub use group_namer::{GROUP_NAME_FORMAT, GroupNamer};
pub use grouping::{
    Group, Grouping, GroupingPolicy, build_policy, sort_chronologically,
    sort_groups_chronologically,
};
pub use main::{
    EXIT_FATAL, EXIT_INTERRUPTED, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS, OrganizeRequest,
    PhotoSessionOrganizer, RunOutcome,
};
pub use progress_reporter::{
    ConsoleReporter, ItemPosition, ProgressEvent, ProgressReporter, SilentReporter,
};
pub use time_metric::{Distance, Timestamped, time_distance};
