use folio_render::{render_thumbnails, Renderer};
use std::path::Path;

use super::{output_name, read_input, ToolContext, ToolResult};
use crate::sink::{Delivered, OutputSink};

/// 渲染文档每一页的缩略图并逐个输出为 PNG
///
/// `scale` 缺省时使用配置中的缩放比例；渲染失败的页面跳过。
pub async fn thumbnails<S: OutputSink, R: Renderer + ?Sized>(
    ctx: &ToolContext<S>,
    renderer: &R,
    file: &Path,
    scale: Option<f32>,
) -> ToolResult<Vec<Delivered>> {
    let _guard = ctx.busy.acquire()?;

    let (name, bytes) = read_input(file).await?;
    let scale = scale.unwrap_or(ctx.config.thumbnail_scale);
    let rendered = render_thumbnails(renderer, &bytes, scale)?;

    let mut delivered = Vec::with_capacity(rendered.len());
    for thumbnail in &rendered {
        let png = thumbnail.to_png()?;
        let file_name = output_name(&name, &format!("_page_{}", thumbnail.page_index + 1), "png");
        delivered.push(ctx.sink.deliver(png, &file_name).await?);
    }
    log::info!("[Thumbnail] {}: 输出 {} 张缩略图", name, delivered.len());
    Ok(delivered)
}
