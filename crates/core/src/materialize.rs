//! 物化：把最终的有序、已过滤页面序列写成新的输出文档

use crate::document::{DocumentHandle, DocumentLibrary};
use crate::ordering::WorkingSet;
use crate::rotation::compose_rotation;
use crate::source::{SourceId, SourceRegistry};
use crate::{CoreError, Result};
use std::collections::HashMap;
use std::time::Instant;

/// 按当前显示顺序物化所有 `included` 页面
///
/// - 输出页序与调用时的显示顺序完全一致，无论多少个源文档交错
/// - 每个源文档在一次调用内最多解析一次，缓存随调用结束丢弃
/// - 旋转总是与源页面自带旋转叠加
///
/// 没有任何页面被包含时返回 `CoreError::EmptySelection`。
/// 任何源文档重新解析失败都会中止整个调用，不会输出缺页的文档。
pub fn materialize<L: DocumentLibrary>(
    library: &L,
    registry: &SourceRegistry,
    working_set: &WorkingSet,
) -> Result<Vec<u8>> {
    let included_count = working_set.included_count();
    if included_count == 0 {
        return Err(CoreError::EmptySelection);
    }

    let start = Instant::now();
    let mut cache: HashMap<SourceId, L::Handle> = HashMap::new();
    let mut output = library.create()?;

    for page in working_set.included() {
        let source_id = page.source_id();
        if !cache.contains_key(&source_id) {
            let source = registry.get(source_id)?;
            let handle = library
                .load(source.bytes())
                .map_err(|e| CoreError::load(source.name(), e))?;
            log::debug!("[Materialize] 解析 {} ({})", source.name(), source_id);
            cache.insert(source_id, handle);
        }
        let handle = cache
            .get(&source_id)
            .ok_or(CoreError::SourceNotFound(source_id))?;

        let page_count = handle.page_count();
        if page.source_page_index() >= page_count {
            return Err(CoreError::PageIndexOutOfRange {
                index: page.source_page_index(),
                page_count,
            });
        }

        let out_index = output.copy_page_from(handle, page.source_page_index())?;
        let intrinsic = output.rotation(out_index)?;
        let effective = compose_rotation(intrinsic, page.rotation());
        if i64::from(effective.degrees()) != intrinsic {
            output.set_rotation(out_index, effective)?;
        }
    }

    let bytes = output.save()?;
    log::info!(
        "[Materialize] 输出 {} 页（{} 个源文档），{} 字节，耗时 {} ms",
        included_count,
        cache.len(),
        bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(bytes)
}
