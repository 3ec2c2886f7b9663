//! 页面引用
//!
//! `PageRef` 是编辑状态的最小单元：一页、它来自哪个源文档的哪一页、
//! 用户施加的旋转增量以及是否包含在输出中。

use crate::rotation::{Rotation, RotationDirection};
use crate::source::SourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub(crate) u64);

impl PageId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// 页面引用
///
/// 来源（`source_id` + `source_page_index`）创建后不可变；
/// 只有旋转、包含标记和显示顺序会变化，且只能通过 `WorkingSet` 修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    id: PageId,
    source_id: SourceId,
    source_page_index: usize,
    rotation: Rotation,
    included: bool,
    display_order: usize,
}

impl PageRef {
    pub(crate) fn new(id: PageId, source_id: SourceId, source_page_index: usize) -> Self {
        Self {
            id,
            source_id,
            source_page_index,
            rotation: Rotation::R0,
            included: true,
            display_order: 0,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// 源文档中的页索引，从 0 开始
    pub fn source_page_index(&self) -> usize {
        self.source_page_index
    }

    /// 源文档中的页码，从 1 开始
    pub fn source_page_number(&self) -> usize {
        self.source_page_index + 1
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn included(&self) -> bool {
        self.included
    }

    pub fn display_order(&self) -> usize {
        self.display_order
    }

    pub(crate) fn rotate(&mut self, direction: RotationDirection) {
        self.rotation = self.rotation.rotate(direction);
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub(crate) fn set_included(&mut self, included: bool) {
        self.included = included;
    }

    pub(crate) fn set_display_order(&mut self, order: usize) {
        self.display_order = order;
    }
}
