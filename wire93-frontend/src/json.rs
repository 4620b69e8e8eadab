use std::io::Write;

use serde::Serialize;
use wire93_engine::errors::ExportError;
use wire93_engine::export::{GeometryExporter, materials, strokes};
use wire93_engine::graph::WireGraph;

#[derive(Debug, Serialize)]
pub struct SceneExport {
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
    pub edges: Vec<EdgeExport>,
    pub materials: Vec<MaterialExport>,
    pub strokes: Vec<StrokeExport>,
    pub stats: StatsExport,
}

#[derive(Debug, Serialize)]
pub struct EdgeExport {
    pub from: u32,
    pub to: u32,
    pub color: i64,
    pub is_new: bool,
    pub slot: usize,
}

#[derive(Debug, Serialize)]
pub struct MaterialExport {
    pub slot: usize,
    pub color: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StrokeExport {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub material_slot: usize,
    pub line_width: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsExport {
    pub candidates: usize,
    pub accepted: usize,
    pub duplicates_skipped: usize,
    pub degenerate_discarded: usize,
}

impl SceneExport {
    pub fn from_graph(graph: &WireGraph, line_width: f64) -> Self {
        let stats = graph.stats();
        Self {
            name: graph.name().to_string(),
            vertices: graph
                .vertices()
                .iter()
                .map(|vertex| vertex.position.to_array())
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|accepted| EdgeExport {
                    from: accepted.edge.from.get(),
                    to: accepted.edge.to.get(),
                    color: accepted.edge.color.get(),
                    is_new: accepted.is_new_color,
                    slot: accepted.slot,
                })
                .collect(),
            materials: materials(graph)
                .into_iter()
                .map(|material| MaterialExport {
                    slot: material.slot,
                    color: material.color.get(),
                    name: material.name,
                })
                .collect(),
            strokes: strokes(graph, line_width)
                .into_iter()
                .map(|stroke| StrokeExport {
                    start: stroke.start.to_array(),
                    end: stroke.end.to_array(),
                    material_slot: stroke.material_slot,
                    line_width: stroke.line_width,
                })
                .collect(),
            stats: StatsExport {
                candidates: stats.candidates,
                accepted: stats.accepted,
                duplicates_skipped: stats.duplicates_skipped,
                degenerate_discarded: stats.degenerate_discarded,
            },
        }
    }
}

/// 将线框图写成 JSON 场景描述，供外部三维工具重建网格与彩色笔画。
pub struct JsonExporter<W: Write> {
    out: W,
    line_width: f64,
}

impl<W: Write> JsonExporter<W> {
    pub fn new(out: W, line_width: f64) -> Self {
        Self { out, line_width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GeometryExporter for JsonExporter<W> {
    fn export(&mut self, graph: &WireGraph) -> Result<(), ExportError> {
        let scene = SceneExport::from_graph(graph, self.line_width);
        serde_json::to_writer_pretty(&mut self.out, &scene)
            .map_err(|err| ExportError::encode(err.to_string()))?;
        writeln!(self.out)?;
        Ok(())
    }
}
