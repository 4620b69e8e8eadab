use std::io::Write;

use tracing::debug;
use wire93_engine::errors::ExportError;
use wire93_engine::export::{GeometryExporter, materials, strokes};
use wire93_engine::graph::WireGraph;

/// 以纯文本输出导入结果：顶点表、边表、材质与笔画概览。
pub struct TextReportExporter<W: Write> {
    out: W,
    line_width: f64,
}

impl<W: Write> TextReportExporter<W> {
    pub fn new(out: W, line_width: f64) -> Self {
        Self { out, line_width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GeometryExporter for TextReportExporter<W> {
    fn export(&mut self, graph: &WireGraph) -> Result<(), ExportError> {
        let stats = graph.stats();
        let out = &mut self.out;

        writeln!(out, "模型: {}", graph.name())?;
        writeln!(out, "顶点数（含哨兵）: {}", graph.vertices().len())?;
        for (index, vertex) in graph.vertices().iter().enumerate() {
            writeln!(
                out,
                "  v{index}: ({:.3}, {:.3}, {:.3})",
                vertex.position.x(),
                vertex.position.y(),
                vertex.position.z()
            )?;
        }

        writeln!(
            out,
            "边: 接受 {}, 跳过重复 {}, 丢弃退化 {}",
            stats.accepted, stats.duplicates_skipped, stats.degenerate_discarded
        )?;
        for accepted in graph.edges() {
            let marker = if accepted.is_new_color { " (新颜色)" } else { "" };
            writeln!(
                out,
                "  {} -> {} color={} slot={}{marker}",
                accepted.edge.from, accepted.edge.to, accepted.edge.color, accepted.slot
            )?;
        }

        let materials = materials(graph);
        writeln!(out, "材质: {}", materials.len())?;
        for material in &materials {
            writeln!(out, "  slot {}: {}", material.slot, material.name)?;
        }

        let strokes = strokes(graph, self.line_width);
        writeln!(out, "笔画: {} (线宽 {})", strokes.len(), self.line_width)?;
        debug!(name = graph.name(), strokes = strokes.len(), "文本报告已输出");
        Ok(())
    }
}
