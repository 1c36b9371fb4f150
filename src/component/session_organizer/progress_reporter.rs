//! 進度回報
//!
//! 複製執行器透過 [`ProgressReporter`] 送出事件，不關心事件如何呈現

use super::copy_executor::CopySummary;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// 事件所屬的群組與項目位置（從 1 開始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    pub group_index: usize,
    pub group_count: usize,
    pub item_index: usize,
    pub item_count: usize,
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    GroupStarted {
        group_index: usize,
        group_count: usize,
        label: String,
        directory: PathBuf,
        item_count: usize,
    },
    /// 群組資料夾無法建立，整組視為失敗
    GroupFailed {
        group_index: usize,
        group_count: usize,
        directory: PathBuf,
        item_count: usize,
        error: String,
    },
    ItemCopied {
        position: ItemPosition,
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    ItemSkipped {
        position: ItemPosition,
        source: PathBuf,
        destination: PathBuf,
    },
    ItemFailed {
        position: ItemPosition,
        source: PathBuf,
        destination: PathBuf,
        error: String,
    },
    Cancelled,
    Finished(CopySummary),
}

pub trait ProgressReporter: Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// 不輸出任何東西
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: &ProgressEvent) {}
}

/// 終端機輸出：每個事件一行，另以進度條顯示整體進度
pub struct ConsoleReporter {
    progress_bar: ProgressBar,
}

impl ConsoleReporter {
    #[must_use]
    pub fn new(total_items: usize) -> Self {
        let progress_bar = ProgressBar::new(total_items as u64);
        if let Ok(progress_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            progress_bar.set_style(progress_style.progress_chars("#>-"));
        }
        Self { progress_bar }
    }

    fn line(&self, text: String) {
        self.progress_bar.suspend(|| println!("{text}"));
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::GroupStarted {
                group_index,
                group_count,
                label,
                directory,
                item_count,
            } => {
                self.line(format!(
                    "{}",
                    style(t!(
                        "progress.group_started",
                        index = group_index,
                        count = group_count,
                        label = label,
                        items = item_count,
                        directory = directory.display()
                    ))
                    .cyan()
                    .bold()
                ));
            }
            ProgressEvent::GroupFailed {
                group_index,
                group_count,
                directory,
                item_count,
                error,
            } => {
                self.line(format!(
                    "{}",
                    style(t!(
                        "progress.group_failed",
                        index = group_index,
                        count = group_count,
                        directory = directory.display(),
                        error = error
                    ))
                    .red()
                ));
                self.progress_bar.inc(*item_count as u64);
            }
            ProgressEvent::ItemCopied {
                position,
                source,
                destination,
                ..
            } => {
                self.line(item_line(position, source, destination));
                self.progress_bar.inc(1);
            }
            ProgressEvent::ItemSkipped {
                position,
                source,
                destination,
            } => {
                self.line(item_line(position, source, destination));
                self.line(format!(
                    "\t    {}",
                    style(t!("progress.already_exists")).yellow()
                ));
                self.progress_bar.inc(1);
            }
            ProgressEvent::ItemFailed {
                position,
                source,
                destination,
                error,
            } => {
                self.line(item_line(position, source, destination));
                self.line(format!(
                    "\t    {}",
                    style(t!("progress.item_failed", error = error)).red()
                ));
                self.progress_bar.inc(1);
            }
            ProgressEvent::Cancelled => {
                self.progress_bar.abandon();
                self.line(format!("{}", style(t!("progress.cancelled")).red().bold()));
            }
            ProgressEvent::Finished(_) => {
                self.progress_bar.finish_and_clear();
            }
        }
    }
}

fn item_line(position: &ItemPosition, source: &Path, destination: &Path) -> String {
    format!(
        "\t{}:{} {}:{}: [{}] => [{}]",
        position.group_index,
        position.group_count,
        position.item_index,
        position.item_count,
        source.display(),
        destination.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_reporter_receives_events() {
        let events = Mutex::new(Vec::new());
        let reporter = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());

        reporter.report(&ProgressEvent::Cancelled);
        reporter.report(&ProgressEvent::Finished(CopySummary::default()));

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::Cancelled));
    }

    #[test]
    fn test_item_line_format() {
        let position = ItemPosition {
            group_index: 1,
            group_count: 2,
            item_index: 3,
            item_count: 4,
        };
        let line = item_line(
            &position,
            Path::new("/src/a.jpg"),
            Path::new("/dest/2024-03-05-10-00-00/a.jpg"),
        );
        assert_eq!(
            line,
            "\t1:2 3:4: [/src/a.jpg] => [/dest/2024-03-05-10-00-00/a.jpg]"
        );
    }

    #[test]
    fn test_failed_group_advances_progress_bar() {
        let reporter = ConsoleReporter::new(3);

        reporter.report(&ProgressEvent::GroupFailed {
            group_index: 1,
            group_count: 2,
            directory: PathBuf::from("/dest/2024-03-05-10-00-00"),
            item_count: 2,
            error: "not a directory".to_string(),
        });

        assert_eq!(reporter.progress_bar.position(), 2);
    }
}
