//! 源文档注册表
//!
//! 保存每个已加载源文档的原始字节。注册按缓冲区的分配身份去重，
//! 而不是按内容哈希：两个内容相同但分别读入的文件是两个独立的源。

use crate::document::{DocumentHandle, DocumentLibrary};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub(crate) u64);

impl SourceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// 已注册的源文档，注册后不可变
#[derive(Debug, Clone)]
pub struct SourceDocument {
    id: SourceId,
    name: String,
    bytes: Arc<[u8]>,
    page_count: usize,
}

impl SourceDocument {
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    documents: Vec<SourceDocument>,
    by_buffer: HashMap<usize, SourceId>,
    next_id: u64,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个源文档
    ///
    /// 同一个缓冲区（同一个 `Arc` 分配）重复注册时直接返回已有的 id，不会再次解析。
    /// 注册表持有该 `Arc` 的克隆，所以在清空之前该地址不会被其他分配复用。
    ///
    /// 字节无法解析为文档时返回 `CoreError::Load`，注册表保持不变。
    pub fn register<L: DocumentLibrary>(
        &mut self,
        library: &L,
        name: &str,
        bytes: Arc<[u8]>,
    ) -> Result<SourceId> {
        let key = buffer_identity(&bytes);
        if let Some(id) = self.by_buffer.get(&key) {
            log::debug!("[Registry] {} 已注册为 {}，跳过解析", name, id);
            return Ok(*id);
        }

        let handle = library
            .load(&bytes)
            .map_err(|e| CoreError::load(name, e))?;
        let page_count = handle.page_count();
        if page_count == 0 {
            return Err(CoreError::load(name, "document has no pages"));
        }

        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.documents.push(SourceDocument {
            id,
            name: name.to_string(),
            bytes,
            page_count,
        });
        self.by_buffer.insert(key, id);

        log::info!("[Registry] 注册 {} -> {} ({} 页)", name, id, page_count);
        Ok(id)
    }

    pub fn get(&self, id: SourceId) -> Result<&SourceDocument> {
        self.documents
            .iter()
            .find(|d| d.id == id)
            .ok_or(CoreError::SourceNotFound(id))
    }

    pub fn bytes(&self, id: SourceId) -> Result<&Arc<[u8]>> {
        self.get(id).map(SourceDocument::bytes)
    }

    pub fn page_count(&self, id: SourceId) -> Result<usize> {
        self.get(id).map(SourceDocument::page_count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.by_buffer.clear();
    }
}

fn buffer_identity(bytes: &Arc<[u8]>) -> usize {
    Arc::as_ptr(bytes) as *const u8 as usize
}
