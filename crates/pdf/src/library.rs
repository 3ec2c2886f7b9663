use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use folio_core::{DocumentHandle, DocumentLibrary, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::copy::{copy_page, ObjectMap};
use crate::metadata::set_producer_metadata;
use crate::utils::{collect_page_ids, get_page_rotation};
use crate::{PdfError, Result};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// 基于 lopdf 的文档库
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfLibrary {
    compress: bool,
}

impl LopdfLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存时是否压缩所有流
    pub fn with_compression(compress: bool) -> Self {
        Self { compress }
    }
}

impl DocumentLibrary for LopdfLibrary {
    type Handle = PdfHandle;

    fn load(&self, bytes: &[u8]) -> folio_core::Result<PdfHandle> {
        Ok(PdfHandle::load(bytes, self.compress)?)
    }

    fn create(&self) -> folio_core::Result<PdfHandle> {
        Ok(PdfHandle::create(self.compress))
    }
}

/// 已打开的 PDF 文档
pub struct PdfHandle {
    pub(crate) doc: Document,
    token: u64,
    pages: Vec<ObjectId>,
    pub(crate) pages_root: ObjectId,
    /// 按源文档句柄记录的对象号映射，共享资源只复制一次
    copied: HashMap<u64, ObjectMap>,
    compress: bool,
}

impl PdfHandle {
    pub fn load(bytes: &[u8], compress: bool) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        let root_id = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_root = doc
            .get_dictionary(root_id)?
            .get(b"Pages")?
            .as_reference()?;
        let pages = collect_page_ids(&doc, pages_root);

        log::debug!("[PDF] 解析完成: {} 页, 版本 {}", pages.len(), doc.version);
        Ok(Self {
            doc,
            token: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            pages,
            pages_root,
            copied: HashMap::new(),
            compress,
        })
    }

    pub fn create(compress: bool) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_root = doc.new_object_id();

        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set("Kids", Vec::<Object>::new());
        pages.set("Count", Object::Integer(0));
        doc.objects.insert(pages_root, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", "Catalog");
        catalog.set("Pages", pages_root);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            token: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            pages: Vec::new(),
            pages_root,
            copied: HashMap::new(),
            compress,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn page_ids(&self) -> &[ObjectId] {
        &self.pages
    }

    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or(PdfError::PageOutOfRange {
            index,
            page_count: self.pages.len(),
        })
    }

    /// 把已经插入文档的页面对象挂到根页面树末尾
    ///
    /// 根节点的 /Kids 为间接对象时直接修改被引用的数组。
    pub(crate) fn attach_page(&mut self, page_id: ObjectId) -> Result<usize> {
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Parent", self.pages_root);

        let root = self.doc.get_dictionary(self.pages_root)?;
        let count = root
            .get(b"Count")
            .and_then(|obj| match obj {
                Object::Reference(id) => self.doc.get_object(*id),
                other => Ok(other),
            })
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::InvalidStructure("page tree root has no readable /Count".to_string()))?;
        let kids_ref = match root.get(b"Kids") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Array(_)) => None,
            _ => {
                return Err(PdfError::InvalidStructure(
                    "page tree root has no readable /Kids".to_string(),
                ))
            }
        };

        let kids = match kids_ref {
            Some(id) => self.doc.get_object_mut(id)?,
            None => self.doc.get_dictionary_mut(self.pages_root)?.get_mut(b"Kids")?,
        };
        kids.as_array_mut()
            .map_err(|_| PdfError::InvalidStructure("/Kids is not an array".to_string()))?
            .push(Object::Reference(page_id));
        self.doc
            .get_dictionary_mut(self.pages_root)?
            .set("Count", Object::Integer(count + 1));

        self.pages.push(page_id);
        Ok(self.pages.len() - 1)
    }

    fn copy_from(&mut self, source: &PdfHandle, index: usize) -> Result<usize> {
        let page_id = source.page_id(index)?;
        let map = self.copied.entry(source.token).or_default();
        let new_page = copy_page(&source.doc, page_id, &mut self.doc, map)?;
        self.attach_page(new_page)
    }

    fn set_page_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
        let page_id = self.page_id(index)?;
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Rotate", Object::Integer(i64::from(rotation.degrees())));
        Ok(())
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>> {
        set_producer_metadata(&mut self.doc)?;
        if self.compress {
            self.doc.compress();
        }
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl DocumentHandle for PdfHandle {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn rotation(&self, page_index: usize) -> folio_core::Result<i64> {
        let page_id = self.page_id(page_index)?;
        Ok(get_page_rotation(&self.doc, page_id))
    }

    fn set_rotation(&mut self, page_index: usize, rotation: Rotation) -> folio_core::Result<()> {
        Ok(self.set_page_rotation(page_index, rotation)?)
    }

    fn copy_page_from(&mut self, source: &Self, page_index: usize) -> folio_core::Result<usize> {
        Ok(self.copy_from(source, page_index)?)
    }

    fn save(&mut self) -> folio_core::Result<Vec<u8>> {
        Ok(self.to_bytes()?)
    }
}
