use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use wire93_core::model::{ColorCode, ConnectivityRecord, Document, Vertex, VertexIndex};

/// 划分文件段落的计数方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCounting {
    /// 注释行与空行虽然不携带数据，但仍占用行号（与旧导入脚本保持一致）。
    /// 若此类行出现在顶点段或记录段内部，会导致段落边界错位并以错误形式暴露。
    #[default]
    Physical,
    /// 仅统计有效数据行。
    Significant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderOptions {
    pub line_counting: LineCounting,
}

impl ReaderOptions {
    pub fn with_line_counting(mut self, line_counting: LineCounting) -> Self {
        self.line_counting = line_counting;
        self
    }
}

/// 文件段落，用于错误信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    VertexCount,
    Vertices,
    RecordCount,
    Records,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Section::VertexCount => "vertex count header",
            Section::Vertices => "vertex section",
            Section::RecordCount => "record count header",
            Section::Records => "record section",
        };
        f.write_str(label)
    }
}

/// 致命的格式错误，整个导入随之终止。行号均为从 1 开始的物理行号。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("line {line}: {section} is not a valid count (value: \"{value}\")")]
    InvalidHeader {
        section: Section,
        line: usize,
        value: String,
    },
    #[error("line {line}: {section} reached before its header was read")]
    MissingHeader { section: Section, line: usize },
    #[error("line {line}: invalid vertex: {reason}")]
    InvalidVertex { line: usize, reason: String },
    #[error("line {line}: invalid connectivity record: {reason}")]
    InvalidRecord { line: usize, reason: String },
    #[error("{section} truncated: expected {expected} lines, found {found}")]
    Truncated {
        section: Section,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: data after the declared {declared} records")]
    TrailingData { line: usize, declared: usize },
    #[error("line {line}: vertex index {index} outside [0, {declared}]")]
    IndexOutOfBounds {
        line: usize,
        index: i64,
        declared: usize,
    },
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document {path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// 基于文件系统的加载入口。
#[derive(Debug, Clone, Copy, Default)]
pub struct Wire93Facade {
    options: ReaderOptions,
}

impl Wire93Facade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }
}

impl DocumentLoader for Wire93Facade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        // 文件内容一次性读入，句柄在返回前即被释放，解析失败时同样如此。
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let name = document_name(&path.to_string_lossy());
        parse_document(&name, &data, self.options).map_err(|source| IoError::Format {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 解析内存中的文本，`name` 作为文档名称保存。
pub fn parse_document(
    name: &str,
    source: &str,
    options: ReaderOptions,
) -> Result<Document, FormatError> {
    Wire93Parser::new(source, options).parse(name)
}

/// 以 `\` 与 `/` 同时作为分隔符，取路径最后一段作为文档名。
pub fn document_name(path: &str) -> String {
    path.rsplit(['\\', '/']).next().unwrap_or(path).to_string()
}

struct Wire93Parser<'a> {
    lines: std::str::Lines<'a>,
    options: ReaderOptions,
    line_number: usize,
    significant_number: usize,
}

impl<'a> Wire93Parser<'a> {
    fn new(source: &'a str, options: ReaderOptions) -> Self {
        Self {
            lines: source.lines(),
            options,
            line_number: 0,
            significant_number: 0,
        }
    }

    /// 读取下一条有效数据行，返回（段落定位用的行位置，物理行号，词元）。
    fn next_significant(&mut self) -> Option<(usize, usize, Vec<&'a str>)> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.first() {
                None => continue,
                Some(first) if first.starts_with('#') => continue,
                Some(_) => {}
            }
            self.significant_number += 1;
            let position = match self.options.line_counting {
                LineCounting::Physical => self.line_number,
                LineCounting::Significant => self.significant_number,
            };
            return Some((position, self.line_number, tokens));
        }
        None
    }

    fn parse(mut self, name: &str) -> Result<Document, FormatError> {
        let mut document = Document::new(name);
        let mut vertex_count: Option<usize> = None;
        let mut record_count: Option<usize> = None;

        while let Some((position, line, tokens)) = self.next_significant() {
            if position == 1 {
                let count = parse_header(tokens[0], Section::VertexCount, line)?;
                // 段落边界为 count + 2，必须可表示。
                if count.checked_add(2).is_none() {
                    return Err(FormatError::InvalidHeader {
                        section: Section::VertexCount,
                        line,
                        value: tokens[0].to_string(),
                    });
                }
                document.set_declared_vertex_count(count);
                vertex_count = Some(count);
                continue;
            }

            let Some(declared_vertices) = vertex_count else {
                return Err(FormatError::MissingHeader {
                    section: Section::VertexCount,
                    line,
                });
            };

            if position < declared_vertices + 2 {
                let vertex = parse_vertex(&tokens, line)?;
                document.push_vertex(vertex);
            } else if position == declared_vertices + 2 {
                let count = parse_header(tokens[0], Section::RecordCount, line)?;
                document.set_declared_record_count(count);
                record_count = Some(count);
            } else {
                let Some(declared_records) = record_count else {
                    return Err(FormatError::MissingHeader {
                        section: Section::RecordCount,
                        line,
                    });
                };
                if document.records().len() >= declared_records {
                    return Err(FormatError::TrailingData {
                        line,
                        declared: declared_records,
                    });
                }
                let record = parse_record(&tokens, line, declared_vertices)?;
                document.push_record(record);
            }
        }

        let Some(declared_vertices) = vertex_count else {
            return Err(FormatError::MissingHeader {
                section: Section::VertexCount,
                line: self.line_number,
            });
        };
        let found_vertices = document.declared_vertices().len();
        if found_vertices < declared_vertices {
            return Err(FormatError::Truncated {
                section: Section::Vertices,
                expected: declared_vertices,
                found: found_vertices,
            });
        }
        let Some(declared_records) = record_count else {
            return Err(FormatError::MissingHeader {
                section: Section::RecordCount,
                line: self.line_number,
            });
        };
        if document.records().len() < declared_records {
            return Err(FormatError::Truncated {
                section: Section::Records,
                expected: declared_records,
                found: document.records().len(),
            });
        }

        debug!(
            name,
            vertices = declared_vertices,
            records = declared_records,
            lines = self.line_number,
            "文档解析完成"
        );
        Ok(document)
    }
}

fn parse_header(raw: &str, section: Section, line: usize) -> Result<usize, FormatError> {
    raw.parse::<usize>().map_err(|_| FormatError::InvalidHeader {
        section,
        line,
        value: raw.to_string(),
    })
}

fn parse_vertex(tokens: &[&str], line: usize) -> Result<Vertex, FormatError> {
    let [x, y, z] = match tokens {
        [x, y, z, ..] => [*x, *y, *z],
        _ => {
            return Err(FormatError::InvalidVertex {
                line,
                reason: format!("expected 3 coordinates, found {}", tokens.len()),
            });
        }
    };
    let coord = |raw: &str, axis: &str| {
        raw.parse::<f64>().map_err(|_| FormatError::InvalidVertex {
            line,
            reason: format!("{axis} coordinate \"{raw}\" is not a number"),
        })
    };
    Ok(Vertex::new(coord(x, "x")?, coord(y, "y")?, coord(z, "z")?))
}

fn parse_record(
    tokens: &[&str],
    line: usize,
    declared_vertices: usize,
) -> Result<ConnectivityRecord, FormatError> {
    let [index, color] = match tokens {
        [index, color, ..] => [*index, *color],
        _ => {
            return Err(FormatError::InvalidRecord {
                line,
                reason: format!("expected vertex index and color, found {} tokens", tokens.len()),
            });
        }
    };

    let index = index.parse::<i64>().map_err(|_| FormatError::InvalidRecord {
        line,
        reason: format!("vertex index \"{index}\" is not an integer"),
    })?;
    let target = u32::try_from(index)
        .ok()
        .filter(|&raw| raw as usize <= declared_vertices)
        .ok_or(FormatError::IndexOutOfBounds {
            line,
            index,
            declared: declared_vertices,
        })?;

    let color = parse_color(color).ok_or_else(|| FormatError::InvalidRecord {
        line,
        reason: format!("color code \"{color}\" is not an integer"),
    })?;

    Ok(ConnectivityRecord::new(VertexIndex::new(target), color).at_line(line))
}

/// 颜色代码允许写成带整数值的浮点数（如 `5.0`）。
fn parse_color(raw: &str) -> Option<ColorCode> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(ColorCode::new(value));
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(ColorCode::new(value as i64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Document, FormatError> {
        parse_document("test", source, ReaderOptions::default())
    }

    fn parse_significant(source: &str) -> Result<Document, FormatError> {
        parse_document(
            "test",
            source,
            ReaderOptions::default().with_line_counting(LineCounting::Significant),
        )
    }

    #[test]
    fn parses_minimal_document() {
        let doc = parse("2\n1 0 0\n1 1 0\n3\n1 5\n2 5\n1 0\n").expect("parse");
        assert_eq!(doc.declared_vertex_count(), 2);
        assert_eq!(doc.vertices().len(), 3);
        assert_eq!(doc.declared_record_count(), 3);
        assert_eq!(doc.records().len(), 3);
        assert!(doc.is_complete());

        let third = doc.records()[2];
        assert_eq!(third.target, VertexIndex::new(1));
        assert!(third.color.is_pen_up());
        assert_eq!(third.line, 7);
    }

    #[test]
    fn empty_sections_are_allowed() {
        let doc = parse("0\n0\n").expect("parse empty");
        assert_eq!(doc.vertices().len(), 1);
        assert!(doc.records().is_empty());
    }

    #[test]
    fn empty_input_reports_missing_header() {
        assert!(matches!(
            parse(""),
            Err(FormatError::MissingHeader {
                section: Section::VertexCount,
                ..
            })
        ));
    }

    #[test]
    fn non_integer_header_is_rejected() {
        let err = parse("two\n").unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidHeader {
                section: Section::VertexCount,
                line: 1,
                ..
            }
        ));
        let err = parse("1\n0 0 0\n-3\n").unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidHeader {
                section: Section::RecordCount,
                line: 3,
                ..
            }
        ));
    }

    #[test]
    fn oversized_vertex_count_is_rejected() {
        let source = format!("{}\n1 0 0\n", usize::MAX);
        let err = parse(&source).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidHeader {
                section: Section::VertexCount,
                line: 1,
                value: usize::MAX.to_string(),
            }
        );
        let source = format!("{}\n1 0 0\n", usize::MAX - 2);
        assert!(matches!(
            parse(&source),
            Err(FormatError::Truncated {
                section: Section::Vertices,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn truncated_vertex_section_is_rejected() {
        let err = parse("3\n0 0 0\n1 1 1\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                section: Section::Vertices,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn truncated_record_section_is_rejected() {
        let err = parse("1\n0 0 0\n2\n1 4\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                section: Section::Records,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn missing_record_header_is_rejected() {
        let err = parse("1\n0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingHeader {
                section: Section::RecordCount,
                ..
            }
        ));
    }

    #[test]
    fn records_beyond_declared_count_are_rejected() {
        let err = parse("1\n0 0 0\n1\n1 4\n1 0\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::TrailingData {
                line: 5,
                declared: 1
            }
        );
    }

    #[test]
    fn out_of_bounds_index_is_rejected() {
        let err = parse("2\n1 0 0\n1 1 0\n1\n3 5\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::IndexOutOfBounds {
                line: 5,
                index: 3,
                declared: 2,
            }
        );
        let err = parse("2\n1 0 0\n1 1 0\n1\n-1 5\n").unwrap_err();
        assert!(matches!(err, FormatError::IndexOutOfBounds { index: -1, .. }));
    }

    #[test]
    fn sentinel_and_last_index_are_in_bounds() {
        let doc = parse("2\n1 0 0\n1 1 0\n2\n0 5\n2 5\n").expect("parse");
        assert_eq!(doc.records()[0].target, VertexIndex::SENTINEL);
        assert_eq!(doc.records()[1].target, VertexIndex::new(2));
    }

    #[test]
    fn malformed_vertex_and_record_lines_are_rejected() {
        assert!(matches!(
            parse("1\n0 0\n0\n"),
            Err(FormatError::InvalidVertex { line: 2, .. })
        ));
        assert!(matches!(
            parse("1\n0 abc 0\n0\n"),
            Err(FormatError::InvalidVertex { line: 2, .. })
        ));
        assert!(matches!(
            parse("1\n0 0 0\n1\n1\n"),
            Err(FormatError::InvalidRecord { line: 4, .. })
        ));
        assert!(matches!(
            parse("1\n0 0 0\n1\n1 2.5\n"),
            Err(FormatError::InvalidRecord { line: 4, .. })
        ));
    }

    #[test]
    fn integral_float_color_is_accepted() {
        let doc = parse("1\n0 0 0\n1\n1 5.0\n").expect("parse");
        assert_eq!(doc.records()[0].color, ColorCode::new(5));
    }

    #[test]
    fn leading_comments_misalign_physical_counting() {
        let source = "# model\n2\n1 0 0\n1 1 0\n1\n1 5\n";
        assert!(matches!(
            parse(source),
            Err(FormatError::MissingHeader {
                section: Section::VertexCount,
                line: 2
            })
        ));
        let doc = parse_significant(source).expect("significant counting");
        assert_eq!(doc.declared_vertices().len(), 2);
        assert_eq!(doc.records().len(), 1);
        assert_eq!(doc.records()[0].line, 6);
    }

    #[test]
    fn comment_inside_vertex_section_truncates_under_physical_counting() {
        let source = "2\n1 0 0\n# gap\n1\n2 3\n";
        // 物理计数下注释占据了第二个顶点的位置，第 4 行被当作记录数。
        let err = parse(source).unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                section: Section::Vertices,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn blank_lines_between_sections_are_tolerated_when_counting_significant_lines() {
        let source = "2\n\n1 0 0\n   \n1 1 0\n\n# edges\n2\n1 5\n\n2 5\n";
        let doc = parse_significant(source).expect("parse");
        assert!(doc.is_complete());
        assert_eq!(doc.records()[1].line, 11);
    }

    #[test]
    fn trailing_blank_lines_and_comments_are_ignored() {
        let doc = parse("1\n0 0 0\n1\n1 5\n\n# end\n").expect("parse");
        assert_eq!(doc.records().len(), 1);
    }

    #[test]
    fn document_name_handles_both_separators() {
        assert_eq!(document_name(r"C:\disc\models\CUBE.3D"), "CUBE.3D");
        assert_eq!(document_name("/tmp/models/ship.txt"), "ship.txt");
        assert_eq!(document_name("mixed/dir\\plane"), "plane");
        assert_eq!(document_name("plain"), "plain");
    }
}
