//! 日志系统配置模块
//! 支持结构化日志和日志级别配置

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

pub type LoggingResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// 初始化日志系统
///
/// `RUST_LOG` 优先于配置中的级别；重复初始化返回错误
pub fn init_logging(config: &LoggingConfig) -> LoggingResult {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_ansi(config.ansi))
            .try_init()?;
    }

    tracing::debug!(level = %config.level, format = %config.format, "logging initialized");
    Ok(())
}

/// 简化初始化（使用默认配置），错误交给调用方处理
pub fn init_default_logging() -> LoggingResult {
    init_logging(&LoggingConfig::default())
}
