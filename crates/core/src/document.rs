//! 文档库接口定义
//!
//! 引擎本身不理解输出文档的二进制结构，页面复制和序列化都委托给底层文档库。
//! 任何文档库后端都必须实现这两个 trait。

use crate::rotation::Rotation;
use crate::Result;

/// 文档库：负责解析字节和创建空白文档
pub trait DocumentLibrary {
    type Handle: DocumentHandle;

    /// 解析文档字节
    ///
    /// # 返回
    /// - 成功：可操作的文档句柄
    /// - 失败：字节无法解析为有效文档
    fn load(&self, bytes: &[u8]) -> Result<Self::Handle>;

    /// 创建一个没有任何页面的新文档
    fn create(&self) -> Result<Self::Handle>;
}

/// 已打开的文档
pub trait DocumentHandle: Sized {
    fn page_count(&self) -> usize;

    /// 页面上记录的旋转角度（原始值，可能为负或大于 360）
    fn rotation(&self, page_index: usize) -> Result<i64>;

    fn set_rotation(&mut self, page_index: usize, rotation: Rotation) -> Result<()>;

    /// 从另一个文档复制一页，追加到本文档末尾
    ///
    /// # 返回
    /// 新页面在本文档中的索引
    fn copy_page_from(&mut self, source: &Self, page_index: usize) -> Result<usize>;

    /// 序列化为字节
    fn save(&mut self) -> Result<Vec<u8>>;
}
