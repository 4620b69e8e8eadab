use std::collections::HashSet;

use tracing::debug;
use wire93_core::color::ColorRegistry;
use wire93_core::model::{ColorCode, Edge, EdgeKey, Vertex};

/// 候选边的处理结果。重复边与退化边都是可恢复事件，不会中断构建。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Accepted { is_new_color: bool, slot: usize },
    Duplicate,
    Degenerate,
}

/// 构建过程中的计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub candidates: usize,
    pub accepted: usize,
    pub duplicates_skipped: usize,
    pub degenerate_discarded: usize,
}

/// 已接受的边，附带接受时颜色登记的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedEdge {
    pub edge: Edge,
    /// 该颜色是否在这条边上首次出现；导出端据此创建新的材质。
    pub is_new_color: bool,
    /// 颜色槽位序号，0 号为抬笔哨兵。
    pub slot: usize,
}

/// 最终的线框图：顶点（含哨兵）与按接受顺序排列的边。
#[derive(Debug, Clone)]
pub struct WireGraph {
    name: String,
    vertices: Vec<Vertex>,
    edges: Vec<AcceptedEdge>,
    colors: ColorRegistry,
    stats: BuildStats,
}

impl WireGraph {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[AcceptedEdge] {
        &self.edges
    }

    #[inline]
    pub fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// 返回边两端的顶点，边的端点在构建时已保证有效。
    pub fn endpoints(&self, edge: &Edge) -> Option<(&Vertex, &Vertex)> {
        let from = self.vertices.get(edge.from.as_usize())?;
        let to = self.vertices.get(edge.to.as_usize())?;
        Some((from, to))
    }
}

/// 累积顶点与去重后的边集合，并在接受边时登记颜色。
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    vertices: Vec<Vertex>,
    edges: Vec<AcceptedEdge>,
    seen: HashSet<EdgeKey>,
    colors: ColorRegistry,
    stats: BuildStats,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>) -> Self {
        Self {
            name: name.into(),
            vertices,
            edges: Vec::new(),
            seen: HashSet::new(),
            colors: ColorRegistry::new(),
            stats: BuildStats::default(),
        }
    }

    #[inline]
    pub fn contains(&self, edge: &Edge) -> bool {
        self.seen.contains(&edge.key())
    }

    pub fn offer(&mut self, edge: Edge) -> EdgeOutcome {
        self.stats.candidates += 1;

        if edge.is_degenerate() {
            self.stats.degenerate_discarded += 1;
            return EdgeOutcome::Degenerate;
        }

        if !self.seen.insert(edge.key()) {
            self.stats.duplicates_skipped += 1;
            debug!(from = %edge.from, to = %edge.to, color = %edge.color, "跳过重复边");
            return EdgeOutcome::Duplicate;
        }

        let is_new_color = self.colors.observe(edge.color);
        let slot = self.slot_of(edge.color);
        self.edges.push(AcceptedEdge {
            edge,
            is_new_color,
            slot,
        });
        self.stats.accepted += 1;
        EdgeOutcome::Accepted { is_new_color, slot }
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            self.offer(edge);
        }
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn finish(self) -> WireGraph {
        WireGraph {
            name: self.name,
            vertices: self.vertices,
            edges: self.edges,
            colors: self.colors,
            stats: self.stats,
        }
    }

    fn slot_of(&self, color: ColorCode) -> usize {
        // 刚刚登记过，必然存在。
        self.colors.slot_of(color).unwrap_or_default()
    }
}
