use folio_core::{SessionObserver, WorkingSet};

/// 把工作集变化写入日志
#[derive(Debug, Default)]
pub struct LoggingObserver {
    changes: usize,
}

impl SessionObserver for LoggingObserver {
    fn on_change(&mut self, working_set: &WorkingSet) {
        self.changes += 1;
        log::debug!(
            "[Session] 变更 #{}: {} 页, 已选 {} 页, 来源 {} 个",
            self.changes,
            working_set.len(),
            working_set.included_count(),
            working_set.source_count()
        );
    }
}
