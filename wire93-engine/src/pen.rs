use wire93_core::model::{ConnectivityRecord, Edge, VertexIndex};

/// 判定抬笔的规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenUpRule {
    /// 颜色代码数值为 0 时抬笔。
    #[default]
    Numeric,
    /// 旧导入脚本用文本词元与数值 0 比较，条件永远不成立：
    /// 从不抬笔，颜色 0 的记录同样会画出边。
    Textual,
}

impl PenUpRule {
    #[inline]
    fn lifts(self, record: &ConnectivityRecord) -> bool {
        match self {
            PenUpRule::Numeric => record.color.is_pen_up(),
            PenUpRule::Textual => false,
        }
    }
}

/// 单游标的"连点成线"状态机。
///
/// 游标为 0 同时表示"抬笔"和"从哨兵原点开始绘制"，两者不作区分。
#[derive(Debug, Clone)]
pub struct PenStateMachine {
    cursor: VertexIndex,
    rule: PenUpRule,
}

impl PenStateMachine {
    pub fn new(rule: PenUpRule) -> Self {
        Self {
            cursor: VertexIndex::SENTINEL,
            rule,
        }
    }

    #[inline]
    pub fn cursor(&self) -> VertexIndex {
        self.cursor
    }

    #[inline]
    pub fn is_pen_up(&self) -> bool {
        self.cursor.is_sentinel()
    }

    /// 处理一条记录：抬笔时复位游标且不产生边，否则从游标画到目标顶点。
    pub fn step(&mut self, record: &ConnectivityRecord) -> Option<Edge> {
        if self.rule.lifts(record) {
            self.cursor = VertexIndex::SENTINEL;
            return None;
        }
        let edge = Edge::new(self.cursor, record.target, record.color);
        self.cursor = record.target;
        Some(edge)
    }

    /// 依次处理全部记录，返回候选边序列。
    pub fn trace(mut self, records: &[ConnectivityRecord]) -> Vec<Edge> {
        records.iter().filter_map(|record| self.step(record)).collect()
    }
}

impl Default for PenStateMachine {
    fn default() -> Self {
        Self::new(PenUpRule::default())
    }
}
