//! 基于 pdfium-render 的页面渲染

use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

use crate::{PageRender, RenderError, Renderer, Result};

/// 获取 pdfium 库的搜索路径
fn get_pdfium_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            // 可执行文件同级的 libs 目录及同级目录
            paths.push(exe_dir.join("libs"));
            paths.push(exe_dir.to_path_buf());

            #[cfg(target_os = "linux")]
            {
                if let Ok(appdir) = std::env::var("APPDIR") {
                    let appdir_path = PathBuf::from(appdir);
                    paths.push(appdir_path.join("usr").join("lib"));
                }
            }
        }
    }

    paths.push(PathBuf::from("libs"));
    paths.push(PathBuf::from("./"));
    paths
}

/// 绑定 pdfium 库：先用显式路径，再依次尝试搜索路径，最后是系统库
fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium> {
    if let Some(path) = library_path {
        let lib_path = if path.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(path)
        } else {
            path.to_path_buf()
        };
        return Pdfium::bind_to_library(&lib_path)
            .map(Pdfium::new)
            .map_err(|e| RenderError::Unavailable(format!("{}: {}", lib_path.display(), e)));
    }

    for path in get_pdfium_search_paths() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
        log::debug!("[Render] 尝试加载 pdfium: {:?}", lib_path);

        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Render] 成功从 {:?} 加载 pdfium", path);
            return Ok(Pdfium::new(bindings));
        }
    }

    log::debug!("[Render] 尝试加载系统 pdfium 库");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| RenderError::Unavailable(e.to_string()))
}

/// pdfium 渲染器
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    pub fn new(library_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            pdfium: bind_pdfium(library_path)?,
        })
    }

    fn render_page(&self, document: &PdfDocument, index: usize, scale: f32) -> PageRender {
        let page_error = |e: PdfiumError| RenderError::Page {
            index,
            message: e.to_string(),
        };

        let page_index = u16::try_from(index).map_err(|_| RenderError::Page {
            index,
            message: "page index exceeds pdfium limit".to_string(),
        })?;
        let page = document.pages().get(page_index).map_err(page_error)?;

        // 页面尺寸单位为 pt，按比例换算为像素
        let target_width = ((page.width().value * scale) as i32).max(1);
        let target_height = ((page.height().value * scale) as i32).max(1);

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap = page.render_with_config(&render_config).map_err(page_error)?;
        Ok(bitmap.as_image())
    }
}

impl Renderer for PdfiumRenderer {
    fn render_pages(&self, bytes: Vec<u8>, scale: f32) -> Result<Vec<PageRender>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| RenderError::Load(e.to_string()))?;

        let page_count = usize::from(document.pages().len());
        log::debug!("[Render] {} 页, 比例 {}", page_count, scale);

        Ok((0..page_count)
            .map(|index| self.render_page(&document, index, scale))
            .collect())
    }

    fn render(&self, bytes: Vec<u8>, page_index: usize, scale: f32) -> PageRender {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| RenderError::Load(e.to_string()))?;
        self.render_page(&document, page_index, scale)
    }
}
