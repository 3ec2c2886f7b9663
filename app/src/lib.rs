//! Command-line PDF page tools built on the folio engine.

pub mod busy;
pub mod cli;
pub mod config;
pub mod observer;
pub mod sink;
pub mod tools;

pub use busy::{BusyFlag, BusyGuard};
pub use config::{config_path, load_config, save_config, ConfigError, FolioConfig};
pub use observer::LoggingObserver;
pub use sink::{Delivered, DirectorySink, OutputSink};
pub use tools::{ToolContext, ToolError, ToolOutcome, ToolResult};

/// 初始化日志：`RUST_LOG` 优先，否则默认 info，`verbose` 时为 debug
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}
