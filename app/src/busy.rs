use folio_core::CoreError;
use std::cell::Cell;
use std::rc::Rc;

/// 处理中标记：加载或生成进行时拒绝重入
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    active: Rc<Cell<bool>>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.active.get()
    }

    /// 占用标记；已被占用时返回 `CoreError::Busy`
    pub fn acquire(&self) -> Result<BusyGuard, CoreError> {
        if self.active.replace(true) {
            return Err(CoreError::Busy);
        }
        Ok(BusyGuard {
            active: Rc::clone(&self.active),
        })
    }
}

/// 离开作用域时释放标记，包括出错提前返回的情况
#[derive(Debug)]
pub struct BusyGuard {
    active: Rc<Cell<bool>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.active.set(false);
    }
}
