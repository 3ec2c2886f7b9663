//! 工作集：用户可见的有序页面序列
//!
//! 所有修改都是纯状态操作，不感知任何观察者。
//! 每次改变顺序后都会在返回前重新编号全部 `display_order`，
//! 调用方永远观察不到部分重排的状态。

use crate::page::{PageId, PageRef};
use crate::rotation::{Rotation, RotationDirection};
use crate::source::SourceId;
use crate::{CoreError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone)]
pub struct WorkingSet {
    pages: Vec<PageRef>,
    next_id: u64,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一个源文档的每一页创建页面引用（尚未加入工作集）
    pub fn create_refs(&mut self, source_id: SourceId, page_count: usize) -> Vec<PageRef> {
        (0..page_count)
            .map(|index| {
                let id = PageId(self.next_id);
                self.next_id += 1;
                PageRef::new(id, source_id, index)
            })
            .collect()
    }

    /// 追加一批页面到末尾，保持批内顺序
    pub fn append(&mut self, refs: Vec<PageRef>) {
        self.pages.extend(refs);
        self.renumber();
    }

    /// 把页面移动到 `to_index`，超出范围时夹到 `[0, len-1]`
    pub fn move_page(&mut self, id: PageId, to_index: usize) -> Result<()> {
        let from = self.position(id)?;
        let to = to_index.min(self.pages.len() - 1);
        if from == to {
            return Ok(());
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.renumber();
        Ok(())
    }

    /// 彻底删除页面（合并工具的删除按钮，不可恢复）
    pub fn remove(&mut self, id: PageId) -> Result<PageRef> {
        let index = self.position(id)?;
        let page = self.pages.remove(index);
        self.renumber();
        Ok(page)
    }

    /// 设置是否包含在输出中（删除页面工具的标记删除，物化前可恢复）
    pub fn set_included(&mut self, id: PageId, included: bool) -> Result<()> {
        self.page_mut(id)?.set_included(included);
        Ok(())
    }

    pub fn toggle_included(&mut self, id: PageId) -> Result<bool> {
        let page = self.page_mut(id)?;
        let included = !page.included();
        page.set_included(included);
        Ok(included)
    }

    pub fn select_all(&mut self) {
        self.pages.iter_mut().for_each(|p| p.set_included(true));
    }

    pub fn deselect_all(&mut self) {
        self.pages.iter_mut().for_each(|p| p.set_included(false));
    }

    pub fn rotate(&mut self, id: PageId, direction: RotationDirection) -> Result<Rotation> {
        let page = self.page_mut(id)?;
        page.rotate(direction);
        Ok(page.rotation())
    }

    pub fn set_rotation(&mut self, id: PageId, rotation: Rotation) -> Result<()> {
        self.page_mut(id)?.set_rotation(rotation);
        Ok(())
    }

    /// 批量旋转；任何一个 id 不存在时不做任何修改
    pub fn rotate_many(&mut self, ids: &[PageId], direction: RotationDirection) -> Result<()> {
        for id in ids {
            self.position(*id)?;
        }
        for id in ids {
            self.page_mut(*id)?.rotate(direction);
        }
        Ok(())
    }

    /// 应用范围选择：显示位置（从 1 开始）在选择集合中的页面被包含，其余排除
    pub fn apply_range(&mut self, selection: &[usize]) {
        let selected: BTreeSet<usize> = selection.iter().copied().collect();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.set_included(selected.contains(&(index + 1)));
        }
    }

    pub fn included_count(&self) -> usize {
        self.pages.iter().filter(|p| p.included()).count()
    }

    pub fn included(&self) -> impl Iterator<Item = &PageRef> {
        self.pages.iter().filter(|p| p.included())
    }

    pub fn has_rotations(&self) -> bool {
        self.pages.iter().any(|p| !p.rotation().is_zero())
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    pub fn get(&self, id: PageId) -> Result<&PageRef> {
        self.pages
            .iter()
            .find(|p| p.id() == id)
            .ok_or(CoreError::PageNotFound(id))
    }

    /// 按显示位置（从 0 开始）取页面
    pub fn at(&self, index: usize) -> Option<&PageRef> {
        self.pages.get(index)
    }

    pub fn position(&self, id: PageId) -> Result<usize> {
        self.pages
            .iter()
            .position(|p| p.id() == id)
            .ok_or(CoreError::PageNotFound(id))
    }

    /// 工作集中引用到的源文档数量
    pub fn source_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.source_id())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut PageRef> {
        self.pages
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(CoreError::PageNotFound(id))
    }

    fn renumber(&mut self) {
        for (order, page) in self.pages.iter_mut().enumerate() {
            page.set_display_order(order);
        }
    }
}
