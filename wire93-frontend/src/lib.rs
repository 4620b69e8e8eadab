pub mod cli;
pub mod errors;
pub mod json;
pub mod loader;

use std::io::Write;
use std::path::Path;

use errors::FrontendError;
use tracing::info;
use wire93_config::{AppConfig, ExportFormat};
pub use wire93_engine::session::ImportSummary;

use crate::cli::TextReportExporter;
use crate::json::JsonExporter;

/// 按配置中的输出格式导入文件，并把结果写入 `out`。
pub fn run_import(
    path: &Path,
    config: &AppConfig,
    format: ExportFormat,
    out: &mut dyn Write,
) -> Result<ImportSummary, FrontendError> {
    info!(path = %path.display(), ?format, "开始导入");
    let summary = match format {
        ExportFormat::Text => {
            let mut exporter = TextReportExporter::new(&mut *out, config.export.line_width);
            loader::import_file(path, config, &mut exporter)?
        }
        ExportFormat::Json => {
            let mut exporter = JsonExporter::new(&mut *out, config.export.line_width);
            loader::import_file(path, config, &mut exporter)?
        }
    };
    out.flush()?;
    Ok(summary)
}
