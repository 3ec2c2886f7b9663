use folio_pdf::ImagePageLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "folio.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct FolioConfig {
    /// 输出目录
    pub output_directory: PathBuf,
    /// 缩略图缩放比例
    pub thumbnail_scale: f32,
    /// 保存时是否压缩流
    pub compress_output: bool,
    /// 图片页面边距（pt，宽高方向合计）
    pub image_page_margin: f32,
    /// pdfium 动态库路径，缺省时自动搜索
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            thumbnail_scale: 0.3,
            compress_output: false,
            image_page_margin: 50.0,
            pdfium_library_path: None,
        }
    }
}

impl FolioConfig {
    pub fn image_layout(&self) -> ImagePageLayout {
        ImagePageLayout {
            margin: self.image_page_margin,
            ..ImagePageLayout::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置文件路径：命令行参数优先，其次环境变量，最后是当前目录下的 folio.json
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// 读取配置，文件不存在时返回默认值
pub fn load_config(path: &Path) -> Result<FolioConfig, ConfigError> {
    if !path.exists() {
        log::debug!("[Config] {} 不存在，使用默认配置", path.display());
        return Ok(FolioConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(path: &Path, config: &FolioConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    log::info!("[Config] 已写入 {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.thumbnail_scale, 0.3);
        assert!(!config.compress_output);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        fs::write(&path, r#"{ "compressOutput": true, "outputDirectory": "out" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.compress_output);
        assert_eq!(config.output_directory, PathBuf::from("out"));
        assert_eq!(config.image_page_margin, 50.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("folio.json");
        let config = FolioConfig {
            thumbnail_scale: 0.5,
            pdfium_library_path: Some(PathBuf::from("/opt/pdfium")),
            ..FolioConfig::default()
        };
        save_config(&path, &config).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"thumbnailScale\": 0.5"));
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.pdfium_library_path, config.pdfium_library_path);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.json")));
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }
}
