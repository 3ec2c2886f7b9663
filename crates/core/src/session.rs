//! 工具会话
//!
//! 每个工具持有一个 `Session`：源文档注册表 + 工作集 + 观察者。
//! 通过会话进行的每次修改成功后都会通知观察者（例如界面刷新）；
//! 工作集本身不感知观察者。

use crate::document::DocumentLibrary;
use crate::materialize::materialize;
use crate::ordering::WorkingSet;
use crate::page::PageId;
use crate::range::parse_page_range;
use crate::rotation::{Rotation, RotationDirection};
use crate::source::{SourceId, SourceRegistry};
use crate::{CoreError, Result};
use std::sync::Arc;

/// 工作集变化的观察者
pub trait SessionObserver {
    fn on_change(&mut self, working_set: &WorkingSet);
}

/// 批量加载中单个文件的失败
#[derive(Debug)]
pub struct FileFailure {
    pub name: String,
    pub error: CoreError,
}

/// 批量加载结果
#[derive(Debug, Default)]
pub struct BatchReport {
    pub loaded: Vec<SourceId>,
    pub added_pages: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
pub struct Session {
    registry: SourceRegistry,
    working_set: WorkingSet,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// 批量加载多个文件
    ///
    /// 文件逐个处理；单个文件失败只记录在报告中，不影响其他文件。
    /// 所有成功文件的页面按文件顺序、页序作为一批追加。
    pub fn load_batch<L: DocumentLibrary>(
        &mut self,
        library: &L,
        files: Vec<(String, Arc<[u8]>)>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut batch = Vec::new();

        for (name, bytes) in files {
            match self.registry.register(library, &name, bytes) {
                Ok(id) => {
                    let page_count = self.registry.page_count(id).unwrap_or_default();
                    batch.extend(self.working_set.create_refs(id, page_count));
                    report.loaded.push(id);
                    report.added_pages += page_count;
                }
                Err(error) => {
                    log::warn!("[Session] 无法加载 {}: {}", name, error);
                    report.failures.push(FileFailure { name, error });
                }
            }
        }

        if !batch.is_empty() {
            self.working_set.append(batch);
            self.notify();
        }
        report
    }

    /// 单文档工具加载：替换当前会话内容
    ///
    /// 解析失败时原有状态保持不变。
    pub fn load_single<L: DocumentLibrary>(
        &mut self,
        library: &L,
        name: &str,
        bytes: Arc<[u8]>,
    ) -> Result<SourceId> {
        let mut registry = SourceRegistry::new();
        let id = registry.register(library, name, bytes)?;
        let page_count = registry.page_count(id)?;

        self.registry = registry;
        self.working_set.clear();
        let refs = self.working_set.create_refs(id, page_count);
        self.working_set.append(refs);
        self.notify();
        Ok(id)
    }

    pub fn move_page(&mut self, id: PageId, to_index: usize) -> Result<()> {
        self.working_set.move_page(id, to_index)?;
        self.notify();
        Ok(())
    }

    pub fn remove(&mut self, id: PageId) -> Result<()> {
        self.working_set.remove(id)?;
        self.notify();
        Ok(())
    }

    pub fn set_included(&mut self, id: PageId, included: bool) -> Result<()> {
        self.working_set.set_included(id, included)?;
        self.notify();
        Ok(())
    }

    pub fn toggle_included(&mut self, id: PageId) -> Result<bool> {
        let included = self.working_set.toggle_included(id)?;
        self.notify();
        Ok(included)
    }

    pub fn select_all(&mut self) {
        self.working_set.select_all();
        self.notify();
    }

    pub fn deselect_all(&mut self) {
        self.working_set.deselect_all();
        self.notify();
    }

    pub fn rotate(&mut self, id: PageId, direction: RotationDirection) -> Result<Rotation> {
        let rotation = self.working_set.rotate(id, direction)?;
        self.notify();
        Ok(rotation)
    }

    pub fn rotate_many(&mut self, ids: &[PageId], direction: RotationDirection) -> Result<()> {
        self.working_set.rotate_many(ids, direction)?;
        self.notify();
        Ok(())
    }

    pub fn set_rotation(&mut self, id: PageId, rotation: Rotation) -> Result<()> {
        self.working_set.set_rotation(id, rotation)?;
        self.notify();
        Ok(())
    }

    /// 解析范围表达式并据此设置包含标记
    ///
    /// 表达式无效时返回 `CoreError::InvalidRange`，工作集不变。
    pub fn apply_range(&mut self, expression: &str) -> Result<Vec<usize>> {
        let selection = parse_page_range(expression, self.working_set.len())?;
        self.working_set.apply_range(&selection);
        self.notify();
        Ok(selection)
    }

    pub fn materialize<L: DocumentLibrary>(&self, library: &L) -> Result<Vec<u8>> {
        materialize(library, &self.registry, &self.working_set)
    }

    /// 清空会话；观察者保留
    pub fn reset(&mut self) {
        self.registry.clear();
        self.working_set.clear();
        self.notify();
    }

    fn notify(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.on_change(&self.working_set);
        }
    }
}
