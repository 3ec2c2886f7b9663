//! Page rendering for thumbnails.

mod pdfium;

pub use pdfium::PdfiumRenderer;

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("pdfium library unavailable: {0}")]
    Unavailable(String),
    #[error("failed to open document: {0}")]
    Load(String),
    #[error("failed to render page {index}: {message}")]
    Page { index: usize, message: String },
    #[error("invalid render scale: {0}")]
    InvalidScale(f32),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// 单页渲染结果，失败只影响该页
pub type PageRender = std::result::Result<DynamicImage, RenderError>;

/// 页面渲染器
pub trait Renderer {
    /// 按比例渲染文档每一页，`bytes` 的所有权交给渲染器
    fn render_pages(&self, bytes: Vec<u8>, scale: f32) -> Result<Vec<PageRender>>;

    /// 只渲染一页
    fn render(&self, bytes: Vec<u8>, page_index: usize, scale: f32) -> PageRender {
        self.render_pages(bytes, scale)?
            .into_iter()
            .nth(page_index)
            .unwrap_or(Err(RenderError::Page {
                index: page_index,
                message: "page out of range".to_string(),
            }))
    }
}

/// 缩略图
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub page_index: usize,
    pub image: DynamicImage,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// 生成文档全部页面的缩略图
///
/// 渲染器拿到的是字节副本，调用方持有的源数据不受影响。
/// 单页渲染失败时记录警告并跳过该页。
pub fn render_thumbnails<R: Renderer + ?Sized>(
    renderer: &R,
    bytes: &[u8],
    scale: f32,
) -> Result<Vec<Thumbnail>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::InvalidScale(scale));
    }

    let pages = renderer.render_pages(bytes.to_vec(), scale)?;
    let total = pages.len();
    let thumbnails: Vec<Thumbnail> = pages
        .into_iter()
        .enumerate()
        .filter_map(|(page_index, rendered)| match rendered {
            Ok(image) => Some(Thumbnail { page_index, image }),
            Err(e) => {
                log::warn!("[Thumbnail] 第 {} 页渲染失败，已跳过: {}", page_index + 1, e);
                None
            }
        })
        .collect();

    log::info!("[Thumbnail] 渲染完成: {}/{} 页", thumbnails.len(), total);
    Ok(thumbnails)
}
