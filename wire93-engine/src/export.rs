use wire93_core::geometry::Point3;
use wire93_core::model::ColorCode;

use crate::errors::ExportError;
use crate::graph::WireGraph;

/// 旧导入脚本中笔画的默认线宽。
pub const DEFAULT_LINE_WIDTH: f64 = 750.0;

/// 消费完成的线框图：每个顶点、每条边各生成一个几何图元，
/// 每条已接受的边生成一条带颜色的笔画。
pub trait GeometryExporter {
    fn export(&mut self, graph: &WireGraph) -> Result<(), ExportError>;
}

/// 以颜色代码命名的绘制材质，按槽位顺序创建。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub slot: usize,
    pub color: ColorCode,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub start: Point3,
    pub end: Point3,
    pub color: ColorCode,
    pub material_slot: usize,
    pub line_width: f64,
    /// 绘制该笔画前需要先创建材质。
    pub creates_material: bool,
}

/// 按边的接受顺序收集需要新建的材质。
pub fn materials(graph: &WireGraph) -> Vec<Material> {
    graph
        .edges()
        .iter()
        .filter(|accepted| accepted.is_new_color)
        .map(|accepted| Material {
            slot: accepted.slot,
            color: accepted.edge.color,
            name: accepted.edge.color.to_string(),
        })
        .collect()
}

pub fn strokes(graph: &WireGraph, line_width: f64) -> Vec<Stroke> {
    graph
        .edges()
        .iter()
        .filter_map(|accepted| {
            let (from, to) = graph.endpoints(&accepted.edge)?;
            Some(Stroke {
                start: from.position,
                end: to.position,
                color: accepted.edge.color,
                material_slot: accepted.slot,
                line_width,
                creates_material: accepted.is_new_color,
            })
        })
        .collect()
}

/// 保存每次导出的图，供嵌入方或测试检查。
#[derive(Debug, Default)]
pub struct CollectingExporter {
    graphs: Vec<WireGraph>,
}

impl CollectingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graphs(&self) -> &[WireGraph] {
        &self.graphs
    }

    pub fn last(&self) -> Option<&WireGraph> {
        self.graphs.last()
    }
}

impl GeometryExporter for CollectingExporter {
    fn export(&mut self, graph: &WireGraph) -> Result<(), ExportError> {
        self.graphs.push(graph.clone());
        Ok(())
    }
}
