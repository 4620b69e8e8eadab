use std::path::Path;

use wire93_config::{AppConfig, LineCountingMode, PenUpMode};
use wire93_engine::export::GeometryExporter;
use wire93_engine::pen::PenUpRule;
use wire93_engine::session::{ImportOptions, ImportSummary, Importer};
use wire93_io::{LineCounting, ReaderOptions, Wire93Facade};

use crate::errors::FrontendError;

pub fn reader_options(config: &AppConfig) -> ReaderOptions {
    let line_counting = match config.import.line_counting {
        LineCountingMode::Physical => LineCounting::Physical,
        LineCountingMode::Significant => LineCounting::Significant,
    };
    ReaderOptions::default().with_line_counting(line_counting)
}

pub fn import_options(config: &AppConfig) -> ImportOptions {
    let pen_up = match config.import.pen_up {
        PenUpMode::Numeric => PenUpRule::Numeric,
        PenUpMode::Textual => PenUpRule::Textual,
    };
    ImportOptions { pen_up }
}

/// 使用配置中的读取与抬笔规则导入文件。
pub fn import_file(
    path: &Path,
    config: &AppConfig,
    exporter: &mut dyn GeometryExporter,
) -> Result<ImportSummary, FrontendError> {
    let loader = Wire93Facade::with_options(reader_options(config));
    let importer = Importer::new(import_options(config));
    Ok(importer.import(&loader, path, exporter)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wire93_config::{ImportConfig, LineCountingMode, PenUpMode};
    use wire93_engine::export::CollectingExporter;

    use super::*;

    #[test]
    fn config_modes_map_to_engine_options() {
        let config = AppConfig {
            import: ImportConfig {
                line_counting: LineCountingMode::Significant,
                pen_up: PenUpMode::Textual,
            },
            ..AppConfig::default()
        };
        assert_eq!(
            reader_options(&config).line_counting,
            LineCounting::Significant
        );
        assert_eq!(import_options(&config).pen_up, PenUpRule::Textual);
    }

    #[test]
    fn significant_counting_accepts_commented_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "# header comment\n1\n0 0 1\n1\n1 2").expect("write fixture");

        let mut exporter = CollectingExporter::new();
        assert!(import_file(file.path(), &AppConfig::default(), &mut exporter).is_err());

        let config = AppConfig {
            import: ImportConfig {
                line_counting: LineCountingMode::Significant,
                pen_up: PenUpMode::Numeric,
            },
            ..AppConfig::default()
        };
        let summary = import_file(file.path(), &config, &mut exporter).expect("import");
        assert_eq!(summary.stats.accepted, 1);
        assert_eq!(exporter.graphs().len(), 1);
    }
}
