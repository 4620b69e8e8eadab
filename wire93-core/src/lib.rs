pub mod geometry {
    use glam::DVec3;
    use serde::{Deserialize, Serialize};

    /// 三维点，内部以 `glam::DVec3` 表示，保持与原始文本格式的双精度一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        pub const ORIGIN: Point3 = Point3(DVec3::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }

        #[inline]
        pub fn to_array(self) -> [f64; 3] {
            self.0.to_array()
        }
    }

    impl From<DVec3> for Point3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    impl From<[f64; 3]> for Point3 {
        fn from(value: [f64; 3]) -> Self {
            Self(DVec3::from_array(value))
        }
    }
}

pub mod model {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::Point3;

    /// 顶点序号。0 号为隐式的哨兵顶点（原点），文件中声明的顶点占用 1..=N。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct VertexIndex(u32);

    impl VertexIndex {
        pub const SENTINEL: VertexIndex = VertexIndex(0);

        #[inline]
        pub fn new(raw: u32) -> Self {
            Self(raw)
        }

        #[inline]
        pub fn get(self) -> u32 {
            self.0
        }

        #[inline]
        pub fn as_usize(self) -> usize {
            self.0 as usize
        }

        #[inline]
        pub fn is_sentinel(self) -> bool {
            self.0 == 0
        }
    }

    impl fmt::Display for VertexIndex {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    /// 颜色代码。0 表示抬笔，不会分配给真实的边。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct ColorCode(i64);

    impl ColorCode {
        pub const PEN_UP: ColorCode = ColorCode(0);

        #[inline]
        pub fn new(raw: i64) -> Self {
            Self(raw)
        }

        #[inline]
        pub fn get(self) -> i64 {
            self.0
        }

        #[inline]
        pub fn is_pen_up(self) -> bool {
            self.0 == 0
        }
    }

    impl fmt::Display for ColorCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vertex {
        pub position: Point3,
    }

    impl Vertex {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self {
                position: Point3::new(x, y, z),
            }
        }

        /// 固定位于原点的哨兵顶点。
        #[inline]
        pub fn sentinel() -> Self {
            Self {
                position: Point3::ORIGIN,
            }
        }
    }

    /// 文件中逐行读取的连接记录，尚未经过游标解释。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ConnectivityRecord {
        pub target: VertexIndex,
        pub color: ColorCode,
        /// 记录所在的物理行号（从 1 开始），仅用于诊断。
        #[serde(default)]
        pub line: usize,
    }

    impl ConnectivityRecord {
        #[inline]
        pub fn new(target: VertexIndex, color: ColorCode) -> Self {
            Self {
                target,
                color,
                line: 0,
            }
        }

        #[inline]
        pub fn at_line(mut self, line: usize) -> Self {
            self.line = line;
            self
        }
    }

    /// 由笔状态机推导出的有向边；去重时按无序端点对比较。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Edge {
        pub from: VertexIndex,
        pub to: VertexIndex,
        pub color: ColorCode,
    }

    impl Edge {
        #[inline]
        pub fn new(from: VertexIndex, to: VertexIndex, color: ColorCode) -> Self {
            Self { from, to, color }
        }

        #[inline]
        pub fn is_degenerate(&self) -> bool {
            self.from == self.to
        }

        #[inline]
        pub fn key(&self) -> EdgeKey {
            EdgeKey::new(self.from, self.to)
        }
    }

    /// 无序端点对，`EdgeKey::new(a, b) == EdgeKey::new(b, a)`。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EdgeKey(VertexIndex, VertexIndex);

    impl EdgeKey {
        #[inline]
        pub fn new(a: VertexIndex, b: VertexIndex) -> Self {
            if a <= b { Self(a, b) } else { Self(b, a) }
        }
    }

    /// 解析得到的结构化文档：声明计数、顶点表（含哨兵）与原始连接记录。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        name: String,
        declared_vertex_count: usize,
        vertices: Vec<Vertex>,
        declared_record_count: usize,
        records: Vec<ConnectivityRecord>,
    }

    impl Document {
        /// 创建只包含哨兵顶点的空文档。
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                declared_vertex_count: 0,
                vertices: vec![Vertex::sentinel()],
                declared_record_count: 0,
                records: Vec::new(),
            }
        }

        #[inline]
        pub fn name(&self) -> &str {
            &self.name
        }

        #[inline]
        pub fn declared_vertex_count(&self) -> usize {
            self.declared_vertex_count
        }

        pub fn set_declared_vertex_count(&mut self, count: usize) {
            self.declared_vertex_count = count;
        }

        #[inline]
        pub fn declared_record_count(&self) -> usize {
            self.declared_record_count
        }

        pub fn set_declared_record_count(&mut self, count: usize) {
            self.declared_record_count = count;
        }

        /// 追加一个声明顶点，返回其序号。
        pub fn push_vertex(&mut self, vertex: Vertex) -> VertexIndex {
            self.vertices.push(vertex);
            VertexIndex::new((self.vertices.len() - 1) as u32)
        }

        pub fn push_record(&mut self, record: ConnectivityRecord) {
            self.records.push(record);
        }

        /// 全部顶点，包括 0 号哨兵。
        #[inline]
        pub fn vertices(&self) -> &[Vertex] {
            &self.vertices
        }

        /// 仅文件中声明的顶点（1..=N）。
        #[inline]
        pub fn declared_vertices(&self) -> &[Vertex] {
            &self.vertices[1..]
        }

        #[inline]
        pub fn vertex(&self, index: VertexIndex) -> Option<&Vertex> {
            self.vertices.get(index.as_usize())
        }

        #[inline]
        pub fn records(&self) -> &[ConnectivityRecord] {
            &self.records
        }

        /// 声明计数与实际内容一致时返回 `true`。
        pub fn is_complete(&self) -> bool {
            self.declared_vertices().len() == self.declared_vertex_count
                && self.records.len() == self.declared_record_count
        }

        /// 记录引用的顶点是否落在 `[0, declared_vertex_count]` 内。
        #[inline]
        pub fn contains_index(&self, index: VertexIndex) -> bool {
            index.as_usize() <= self.declared_vertex_count
        }
    }
}

pub mod color {
    use serde::{Deserialize, Serialize};

    use crate::model::ColorCode;

    /// 按首次出现顺序记录颜色代码。0 号槽位固定为抬笔哨兵。
    ///
    /// 每次导入会话持有独立实例，颜色槽位不会在不同文档之间泄漏。
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ColorRegistry {
        slots: Vec<ColorCode>,
    }

    impl ColorRegistry {
        pub fn new() -> Self {
            Self {
                slots: vec![ColorCode::PEN_UP],
            }
        }

        /// 登记颜色，首次出现时返回 `true` 并分配下一个槽位。
        pub fn observe(&mut self, color: ColorCode) -> bool {
            if self.slots.contains(&color) {
                return false;
            }
            self.slots.push(color);
            true
        }

        #[inline]
        pub fn slot_of(&self, color: ColorCode) -> Option<usize> {
            self.slots.iter().position(|&seen| seen == color)
        }

        #[inline]
        pub fn contains(&self, color: ColorCode) -> bool {
            self.slots.contains(&color)
        }

        /// 所有槽位（含 0 号哨兵）。
        #[inline]
        pub fn slots(&self) -> &[ColorCode] {
            &self.slots
        }

        /// 已登记的真实颜色，按槽位顺序。
        pub fn colors(&self) -> impl Iterator<Item = ColorCode> + '_ {
            self.slots.iter().skip(1).copied()
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.slots.len()
        }

        /// 哨兵始终存在，因此只有在未登记任何真实颜色时才视为空。
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.slots.len() <= 1
        }
    }

    impl Default for ColorRegistry {
        fn default() -> Self {
            Self::new()
        }
    }
}
