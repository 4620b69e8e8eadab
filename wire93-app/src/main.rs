use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use wire93_config::{AppConfig, ConfigError, ExportFormat, LineCountingMode, PenUpMode};
use wire93_frontend::ImportSummary;

/// 导入 1993 年共享软件光盘上的三维线框模型，输出顶点、边与彩色笔画。
#[derive(Debug, Parser)]
#[command(name = "wire93", version)]
struct Cli {
    /// 待导入的模型文件
    input: PathBuf,
    /// 显式指定配置文件
    #[arg(long)]
    config: Option<PathBuf>,
    /// 输出格式，覆盖配置
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// 写入文件而不是标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    line_counting: Option<LineCountingArg>,
    #[arg(long, value_enum)]
    pen_up: Option<PenUpArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LineCountingArg {
    Physical,
    Significant,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PenUpArg {
    Numeric,
    Textual,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            init_logging(&AppConfig::default());
            error!(error = %err, "加载指定配置失败");
            return ExitCode::from(2);
        }
    };
    let config = apply_overrides(config, &cli);
    init_logging(&config);
    info!("启动 wire93 导入器");

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "导入失败");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let format = match cli.format {
        Some(FormatArg::Text) => ExportFormat::Text,
        Some(FormatArg::Json) => ExportFormat::Json,
        None => config.export.format,
    };

    // 写入文件时先导出到内存，导入失败不会覆盖已有的输出文件。
    let summary = match &cli.output {
        Some(path) => {
            let mut buffer = Vec::new();
            let summary = import_into(cli, config, format, &mut buffer)?;
            fs::write(path, &buffer)
                .with_context(|| format!("无法写入输出文件 {}", path.display()))?;
            summary
        }
        None => import_into(cli, config, format, &mut io::stdout().lock())?,
    };
    if summary.stats.duplicates_skipped > 0 {
        warn!(
            skipped = summary.stats.duplicates_skipped,
            "存在重复连接，已跳过"
        );
    }
    Ok(())
}

fn import_into(
    cli: &Cli,
    config: &AppConfig,
    format: ExportFormat,
    out: &mut dyn Write,
) -> anyhow::Result<ImportSummary> {
    wire93_frontend::run_import(&cli.input, config, format, out)
        .with_context(|| format!("导入 {} 失败", cli.input.display()))
}

/// 显式路径加载失败视为错误；自动发现失败时回退到内建默认值。
fn load_configuration(override_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path),
        None => Ok(AppConfig::discover().unwrap_or_else(|err| {
            eprintln!("加载默认配置失败，使用内建默认值: {err}");
            AppConfig::default()
        })),
    }
}

fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(mode) = cli.line_counting {
        config.import.line_counting = match mode {
            LineCountingArg::Physical => LineCountingMode::Physical,
            LineCountingArg::Significant => LineCountingMode::Significant,
        };
    }
    if let Some(rule) = cli.pen_up {
        config.import.pen_up = match rule {
            PenUpArg::Numeric => PenUpMode::Numeric,
            PenUpArg::Textual => PenUpMode::Textual,
        };
    }
    config
}

/// 日志统一写到 stderr，stdout 只留给导出结果。
/// `RUST_LOG` 优先于配置中的 `[logging] level`；等级无法解析时退回 `info` 并给出警告。
fn init_logging(config: &AppConfig) {
    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(&config.logging.level) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new("info"), Some(config.logging.level.as_str())),
        },
    };
    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();
    if let (true, Some(level)) = (installed, rejected) {
        warn!(level, "日志等级无效，改用 info");
    }
}
