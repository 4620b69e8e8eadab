use std::path::Path;

use tracing::{debug, info};
use wire93_core::model::Document;
use wire93_io::DocumentLoader;

use crate::errors::EngineError;
use crate::export::GeometryExporter;
use crate::graph::{BuildStats, GraphBuilder, WireGraph};
use crate::pen::{PenStateMachine, PenUpRule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub pen_up: PenUpRule,
}

/// 单次导入的概要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub name: String,
    pub vertices: usize,
    pub new_colors: usize,
    pub stats: BuildStats,
}

impl ImportSummary {
    fn from_graph(graph: &WireGraph) -> Self {
        Self {
            name: graph.name().to_string(),
            vertices: graph.vertices().len(),
            new_colors: graph.edges().iter().filter(|e| e.is_new_color).count(),
            stats: graph.stats(),
        }
    }
}

/// 导入入口：加载 → 构建线框图 → 交给导出器。
///
/// 每次调用都会新建笔状态机、图构建器和颜色登记表，不同导入之间不共享状态。
#[derive(Debug, Clone, Copy, Default)]
pub struct Importer {
    options: ImportOptions,
}

impl Importer {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// 由已解析的文档构建线框图。
    pub fn build(&self, document: &Document) -> WireGraph {
        let pen = PenStateMachine::new(self.options.pen_up);
        let candidates = pen.trace(document.records());
        debug!(
            name = document.name(),
            records = document.records().len(),
            candidates = candidates.len(),
            "笔状态机处理完成"
        );

        let mut builder = GraphBuilder::new(document.name(), document.vertices().to_vec());
        builder.extend(candidates);
        builder.finish()
    }

    /// 完整的导入流程。任何加载错误都会在导出器看到数据之前终止导入。
    pub fn import<L, E>(
        &self,
        loader: &L,
        path: &Path,
        exporter: &mut E,
    ) -> Result<ImportSummary, EngineError>
    where
        L: DocumentLoader + ?Sized,
        E: GeometryExporter + ?Sized,
    {
        let document = loader.load(path)?;
        let graph = self.build(&document);
        let summary = ImportSummary::from_graph(&graph);
        if summary.stats.duplicates_skipped > 0 {
            info!(
                path = %path.display(),
                skipped = summary.stats.duplicates_skipped,
                "导入时跳过了重复边"
            );
        }
        exporter.export(&graph)?;
        info!(
            path = %path.display(),
            vertices = summary.vertices,
            accepted = summary.stats.accepted,
            skipped = summary.stats.duplicates_skipped,
            degenerate = summary.stats.degenerate_discarded,
            colors = summary.new_colors,
            "导入完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wire93_core::model::{ColorCode, VertexIndex};
    use wire93_io::{FormatError, IoError, ReaderOptions, Wire93Facade, parse_document};

    use super::*;
    use crate::export::CollectingExporter;

    fn document(source: &str) -> Document {
        parse_document("scenario", source, ReaderOptions::default()).expect("parse scenario")
    }

    fn triples(graph: &WireGraph) -> Vec<(u32, u32, i64)> {
        graph
            .edges()
            .iter()
            .map(|accepted| {
                (
                    accepted.edge.from.get(),
                    accepted.edge.to.get(),
                    accepted.edge.color.get(),
                )
            })
            .collect()
    }

    #[test]
    fn two_vertex_scenario_builds_expected_edges() {
        let doc = document("2\n1 0 0\n1 1 0\n3\n1 5\n2 5\n1 0\n");
        let graph = Importer::default().build(&doc);

        assert_eq!(graph.vertices().len(), doc.declared_vertex_count() + 1);
        assert_eq!(triples(&graph), vec![(0, 1, 5), (1, 2, 5)]);
        assert!(graph.edges()[0].is_new_color);
        assert!(!graph.edges()[1].is_new_color);
        assert_eq!(graph.stats().candidates, 2);
        assert_eq!(graph.stats().duplicates_skipped, 0);
    }

    #[test]
    fn repeated_record_after_pen_up_is_skipped_once() {
        let doc = document("1\n1 0 0\n4\n1 5\n1 0\n1 5\n1 0\n");
        let graph = Importer::default().build(&doc);
        assert_eq!(triples(&graph), vec![(0, 1, 5)]);
        assert_eq!(graph.stats().duplicates_skipped, 1);
    }

    #[test]
    fn consecutive_repeat_is_degenerate_not_duplicate() {
        // 第二条 `1 5` 从游标 1 画向 1，属于退化边；之后抬笔再从原点画到 1 才是重复。
        let doc = document("1\n1 0 0\n3\n1 5\n1 5\n1 0\n");
        let graph = Importer::default().build(&doc);
        assert_eq!(triples(&graph), vec![(0, 1, 5)]);
        assert_eq!(graph.stats().degenerate_discarded, 1);
        assert_eq!(graph.stats().duplicates_skipped, 0);
    }

    #[test]
    fn no_accepted_edge_is_a_self_loop_or_pen_up_color() {
        let doc = document("3\n0 0 0\n1 0 0\n0 1 0\n8\n1 2\n1 2\n2 3\n3 0\n2 3\n3 3\n1 3\n1 3\n");
        let graph = Importer::default().build(&doc);
        assert!(graph.edges().iter().all(|accepted| !accepted.edge.is_degenerate()));
        assert!(graph.edges().iter().all(|accepted| !accepted.edge.color.is_pen_up()));
        assert_eq!(triples(&graph), vec![(0, 1, 2), (1, 2, 3), (0, 2, 3), (2, 3, 3), (3, 1, 3)]);
        assert_eq!(graph.stats().degenerate_discarded, 2);
        assert_eq!(graph.stats().duplicates_skipped, 0);
    }

    #[test]
    fn textual_rule_draws_pen_up_records() {
        let doc = document("2\n1 0 0\n1 1 0\n3\n1 5\n2 5\n1 0\n");
        let importer = Importer::new(ImportOptions {
            pen_up: PenUpRule::Textual,
        });
        let graph = importer.build(&doc);
        // 2 → 1 与 1 → 2 是同一条无序边，被当作重复跳过。
        assert_eq!(triples(&graph), vec![(0, 1, 5), (1, 2, 5)]);
        assert_eq!(graph.stats().duplicates_skipped, 1);
    }

    #[test]
    fn each_build_uses_a_fresh_color_registry() {
        let importer = Importer::default();
        let first = importer.build(&document("1\n1 0 0\n1\n1 9\n"));
        let second = importer.build(&document("1\n1 0 0\n1\n1 9\n"));
        assert!(first.edges()[0].is_new_color);
        assert!(second.edges()[0].is_new_color);
        assert_eq!(second.colors().slot_of(ColorCode::new(9)), Some(1));
    }

    #[test]
    fn import_hands_graph_to_exporter() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "2\n1 0 0\n1 1 0\n3\n1 5\n2 5\n1 0").expect("write fixture");

        let mut exporter = CollectingExporter::new();
        let summary = Importer::default()
            .import(&Wire93Facade::new(), file.path(), &mut exporter)
            .expect("import");
        assert_eq!(summary.vertices, 3);
        assert_eq!(summary.stats.accepted, 2);
        assert_eq!(summary.new_colors, 1);

        let graph = exporter.last().expect("exported graph");
        assert_eq!(graph.edges()[1].edge.to, VertexIndex::new(2));
    }

    #[test]
    fn format_error_aborts_before_export() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "2\n1 0 0\n1 1 0\n2\n1 5\n3 5").expect("write fixture");

        let mut exporter = CollectingExporter::new();
        let err = Importer::default()
            .import(&Wire93Facade::new(), file.path(), &mut exporter)
            .expect_err("out of bounds index");
        assert!(matches!(
            err,
            EngineError::Load(IoError::Format {
                source: FormatError::IndexOutOfBounds { index: 3, .. },
                ..
            })
        ));
        assert!(exporter.graphs().is_empty());
    }
}
