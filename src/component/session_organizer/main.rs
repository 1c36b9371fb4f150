use super::copy_executor::{CopyExecutor, CopySummary};
use super::copy_planner::{CopyPlan, CopyPlanner, GroupKind};
use super::grouping::build_policy;
use super::progress_reporter::ConsoleReporter;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{
    PhotoScanner, ensure_directory_exists, validate_directory_accessible,
    validate_directory_exists,
};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 正常完成
pub const EXIT_SUCCESS: u8 = 0;
/// 設定或路徑錯誤，未進行任何複製
pub const EXIT_FATAL: u8 = 1;
/// 已完成，但部分檔案複製失敗
pub const EXIT_PARTIAL_FAILURE: u8 = 3;
/// 使用者中斷
pub const EXIT_INTERRUPTED: u8 = 130;

/// 一次整理的輸入
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// 只列出計畫，不複製
    pub dry_run: bool,
    /// 複製前詢問使用者
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(CopySummary),
    Cancelled(CopySummary),
    DryRun { groups: usize, items: usize },
    /// 使用者在確認時選擇不複製
    Declined,
}

impl RunOutcome {
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Completed(summary) if summary.failed > 0 => EXIT_PARTIAL_FAILURE,
            Self::Completed(_) | Self::DryRun { .. } | Self::Declined => EXIT_SUCCESS,
            Self::Cancelled(_) => EXIT_INTERRUPTED,
        }
    }
}

/// 照片工作階段整理元件
pub struct PhotoSessionOrganizer {
    config: Config,
    settings_path: PathBuf,
    shutdown_signal: Arc<AtomicBool>,
}

impl PhotoSessionOrganizer {
    pub fn new(config: Config, settings_path: &Path, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            settings_path: settings_path.to_path_buf(),
            shutdown_signal,
        }
    }

    pub fn run(&self, request: &OrganizeRequest) -> Result<RunOutcome> {
        println!("{}", style(t!("organizer.title")).cyan().bold());

        validate_directory_exists(&request.source)?;
        validate_directory_accessible(&request.source)?;
        ensure_directory_exists(&request.destination)?;
        validate_directory_accessible(&request.destination)?;

        let settings = &self.config.settings;
        // 參數錯誤時在掃描前就失敗
        let policy = build_policy(&settings.grouping)?;

        println!("{}", style(t!("organizer.scanning")).dim());
        let scan = PhotoScanner::new(
            self.config.file_type_table.clone(),
            Arc::clone(&self.shutdown_signal),
        )
        .with_timestamp_source(settings.timestamp_source)
        .with_excluded_directory(&request.destination)
        .scan(&request.source)?;

        if scan.cancelled {
            warn!("收到中斷訊號，停止處理");
            println!("{}", style(t!("progress.cancelled")).red().bold());
            return Ok(RunOutcome::Cancelled(CopySummary {
                cancelled: true,
                ..CopySummary::default()
            }));
        }

        if scan.unreadable > 0 {
            println!(
                "{}",
                style(t!("organizer.unreadable", count = scan.unreadable)).yellow()
            );
        }

        if scan.items.is_empty() {
            println!("{}", style(t!("organizer.no_photos")).yellow());
            return Ok(RunOutcome::Completed(CopySummary::default()));
        }

        let photo_count = scan.items.len();
        let grouping = policy.group(scan.items);
        info!(
            "分組完成（{}）- 群組: {}, 未分群: {}",
            policy.name(),
            grouping.groups.len(),
            grouping.noise.len()
        );

        let plan = CopyPlanner::new(&request.destination)
            .with_noise_policy(settings.grouping.noise)
            .plan(grouping);

        self.print_plan_summary(&plan, photo_count, policy.name());

        if request.dry_run {
            self.print_plan(&plan);
            return Ok(RunOutcome::DryRun {
                groups: plan.groups.len(),
                items: plan.total_items(),
            });
        }

        if request.confirm && !self.confirm_copy()? {
            println!("{}", style(t!("organizer.declined")).yellow());
            return Ok(RunOutcome::Declined);
        }

        let reporter = ConsoleReporter::new(plan.total_items());
        let summary = CopyExecutor::new(Arc::clone(&self.shutdown_signal))
            .with_jobs(settings.copy.jobs)
            .with_preserve_mtime(settings.copy.preserve_mtime)
            .execute(&plan, &reporter)?;

        self.print_result(&summary);

        if summary.cancelled {
            Ok(RunOutcome::Cancelled(summary))
        } else {
            Ok(RunOutcome::Completed(summary))
        }
    }

    /// 互動模式：詢問來源與目標路徑（按 ESC 取消）
    pub fn prompt_request(
        &self,
        source: Option<PathBuf>,
        destination: Option<PathBuf>,
    ) -> Result<Option<OrganizeRequest>> {
        let source = match source {
            Some(path) => path,
            None => match self.prompt_path(&t!("organizer.prompt_source"))? {
                Some(path) => PathBuf::from(path),
                None => return Ok(None),
            },
        };

        let destination = match destination {
            Some(path) => path,
            None => match self.prompt_path(&t!("organizer.prompt_destination"))? {
                Some(path) => PathBuf::from(path),
                None => return Ok(None),
            },
        };

        self.remember_paths(&[source.as_path(), destination.as_path()]);

        Ok(Some(OrganizeRequest {
            source,
            destination,
            dry_run: false,
            confirm: true,
        }))
    }

    fn prompt_path(&self, prompt: &str) -> Result<Option<String>> {
        let recent_paths = &self.config.settings.recent_paths;

        // 如果沒有歷史路徑，直接輸入
        if recent_paths.is_empty() {
            let path: String = Input::new().with_prompt(prompt).interact_text()?;
            return Ok(Some(path.trim().to_string()));
        }

        // 建立選項清單：歷史路徑 + 輸入新路徑
        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let exists = Path::new(p).exists();
                let indicator = if exists { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("organizer.new_path").to_string());

        println!("{}", style(t!("common.esc_hint")).dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
            Some(_) => {
                let path: String = Input::new().with_prompt(prompt).interact_text()?;
                Ok(Some(path.trim().to_string()))
            }
        }
    }

    /// 更新路徑歷史並儲存
    fn remember_paths(&self, paths: &[&Path]) {
        let mut settings = self.config.settings.clone();
        for path in paths.iter().rev() {
            add_recent_path(&mut settings, &path.to_string_lossy());
        }
        if let Err(e) = save_settings(&self.settings_path, &settings) {
            warn!("無法儲存路徑歷史: {e}");
        }
    }

    fn confirm_copy(&self) -> Result<bool> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let confirm = Confirm::new()
            .with_prompt(t!("organizer.confirm"))
            .default(true)
            .interact()?;
        Ok(confirm)
    }

    fn print_plan_summary(&self, plan: &CopyPlan, photo_count: usize, policy_name: &str) {
        println!();
        println!(
            "{}",
            style(t!(
                "organizer.plan_summary",
                photos = photo_count,
                groups = plan.session_count(),
                policy = policy_name
            ))
            .green()
        );

        let loose: usize = plan
            .groups
            .iter()
            .filter(|g| g.kind == GroupKind::Loose)
            .map(|g| g.copies.len())
            .sum();
        if loose > 0 {
            println!(
                "  {} {}",
                style("→").dim(),
                t!("organizer.loose_items", count = loose)
            );
        }
        if plan.dropped_noise > 0 {
            println!(
                "  {} {}",
                style("→").yellow(),
                t!("organizer.dropped_noise", count = plan.dropped_noise)
            );
        }
        println!();
    }

    fn print_plan(&self, plan: &CopyPlan) {
        for (i, group) in plan.groups.iter().enumerate() {
            println!(
                "{} {} ({})",
                style(format!("[{}/{}]", i + 1, plan.groups.len())).dim(),
                style(&group.label).cyan(),
                t!("organizer.file_count", count = group.copies.len())
            );
            for copy in &group.copies {
                println!(
                    "  {} {} => {}",
                    style("→").dim(),
                    copy.source.display(),
                    copy.destination.display()
                );
            }
        }
    }

    fn print_result(&self, summary: &CopySummary) {
        let size_mb = summary.bytes_copied as f64 / 1024.0 / 1024.0;

        println!();
        println!("{}", style(t!("organizer.result_title")).cyan().bold());
        println!(
            "  {}",
            t!(
                "organizer.result_copied",
                count = style(summary.copied).green(),
                size = format!("{size_mb:.2}")
            )
        );

        if summary.skipped > 0 {
            println!(
                "  {}",
                t!("organizer.result_skipped", count = style(summary.skipped).yellow())
            );
        }

        if summary.failed > 0 {
            println!(
                "  {}",
                t!("organizer.result_failed", count = style(summary.failed).red())
            );
        }

        if summary.cancelled {
            println!(
                "  {}",
                t!(
                    "organizer.result_interrupted",
                    started = summary.groups_started,
                    total = summary.groups_total
                )
            );
        }

        info!(
            "整理完成 - 複製: {}, 跳過: {}, 失敗: {}, 中斷: {}",
            summary.copied, summary.skipped, summary.failed, summary.cancelled
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let ok = CopySummary {
            copied: 3,
            ..CopySummary::default()
        };
        let partial = CopySummary {
            copied: 2,
            failed: 1,
            ..CopySummary::default()
        };

        assert_eq!(RunOutcome::Completed(ok).exit_code(), EXIT_SUCCESS);
        assert_eq!(RunOutcome::Completed(partial).exit_code(), EXIT_PARTIAL_FAILURE);
        assert_eq!(RunOutcome::Cancelled(ok).exit_code(), EXIT_INTERRUPTED);
        assert_eq!(
            RunOutcome::DryRun { groups: 1, items: 3 }.exit_code(),
            EXIT_SUCCESS
        );
        assert_eq!(RunOutcome::Declined.exit_code(), EXIT_SUCCESS);
    }
}
