use anyhow::Result;
use clap::Parser;
use console::style;
use log::{error, info};
use photo_session_organize::component::session_organizer::{
    EXIT_FATAL, EXIT_SUCCESS, OrganizeRequest, PhotoSessionOrganizer,
};
use photo_session_organize::config::load::DEFAULT_SETTINGS_FILE;
use photo_session_organize::config::{
    Config, GroupingPolicyKind, Language, NoisePolicy, TimestampSource,
};
use photo_session_organize::init;
use photo_session_organize::signal::setup_shutdown_signal;
use photo_session_organize::tools::parse_duration_seconds;
use rust_i18n::t;
use std::path::PathBuf;
use std::process::ExitCode;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

/// 依拍攝時間將照片分組，並複製到以工作階段命名的資料夾
#[derive(Debug, Parser)]
#[command(name = "photo_session_organize", version, about)]
struct Cli {
    /// 照片來源目錄（省略時進入互動模式）
    source: Option<PathBuf>,

    /// 目標目錄（不存在時自動建立）
    destination: Option<PathBuf>,

    /// 使用者設定檔
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// 分組策略
    #[arg(long, value_enum)]
    policy: Option<GroupingPolicyKind>,

    /// 時間間隔門檻，例如 3h、90m、10800
    #[arg(long, value_parser = parse_duration_seconds)]
    gap: Option<u64>,

    /// 密度分群的鄰域半徑，例如 4h
    #[arg(long, value_parser = parse_duration_seconds)]
    epsilon: Option<u64>,

    /// 密度分群的最少點數
    #[arg(long)]
    min_points: Option<usize>,

    /// 雜訊照片的處理方式
    #[arg(long, value_enum)]
    noise: Option<NoisePolicy>,

    /// 時間戳記來源
    #[arg(long, value_enum)]
    timestamp: Option<TimestampSource>,

    /// 同時複製的檔案數
    #[arg(long)]
    jobs: Option<usize>,

    /// 只列出複製計畫
    #[arg(long)]
    dry_run: bool,

    /// 不保留原始修改時間
    #[arg(long)]
    no_preserve_mtime: bool,

    /// 介面語言
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// 顯示 info 等級的日誌
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 命令列參數覆蓋設定檔
    fn apply_overrides(&self, config: &mut Config) {
        let settings = &mut config.settings;
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(source) = self.timestamp {
            settings.timestamp_source = source;
        }

        let grouping = &mut settings.grouping;
        if let Some(policy) = self.policy {
            grouping.policy = policy;
        }
        if let Some(gap) = self.gap {
            grouping.gap_seconds = gap;
        }
        if let Some(epsilon) = self.epsilon {
            grouping.epsilon_seconds = epsilon as f64;
        }
        if let Some(min_points) = self.min_points {
            grouping.min_points = min_points;
        }
        if let Some(noise) = self.noise {
            grouping.noise = noise;
        }

        if let Some(jobs) = self.jobs {
            settings.copy.jobs = jobs;
        }
        if self.no_preserve_mtime {
            settings.copy.preserve_mtime = false;
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::load(&cli.config)?;
    cli.apply_overrides(&mut config);
    rust_i18n::set_locale(config.settings.language.as_str());

    let organizer = PhotoSessionOrganizer::new(config, &cli.config, shutdown_signal);

    let request = match (cli.source, cli.destination) {
        (Some(source), Some(destination)) => OrganizeRequest {
            source,
            destination,
            dry_run: cli.dry_run,
            confirm: false,
        },
        // 缺少任一路徑時進入互動模式
        (source, destination) => match organizer.prompt_request(source, destination)? {
            Some(request) => OrganizeRequest {
                dry_run: cli.dry_run,
                ..request
            },
            None => {
                println!("\n{}", style(t!("main.goodbye")).green().bold());
                return Ok(EXIT_SUCCESS);
            }
        },
    };

    let outcome = organizer.run(&request)?;
    info!("Program exited with {outcome:?}");
    Ok(outcome.exit_code())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Program error: {e:#}");
            eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
            ExitCode::from(EXIT_FATAL)
        }
    }
}
