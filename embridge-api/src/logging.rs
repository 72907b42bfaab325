//! 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分层日志控制：每个桥接层
//! （session / cache / bridge / convert / runtime）有独立的 target，
//! 级别由 [`LogConfig`] 决定。

use std::io;
use std::path::Path;
use std::sync::Mutex;

use embridge_config::{Layer as BridgeLayer, LogConfig, LogLevel};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// 日志输出格式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    #[default]
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 日志初始化错误
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] io::Error),
    #[error("global subscriber already set")]
    AlreadyInitialized,
}

/// 使用默认格式初始化日志系统
pub fn init_logger(config: &LogConfig) -> Result<(), LoggingError> {
    init_with_file(config, LogFormat::default(), None::<&Path>)
}

/// 使用指定格式和日志配置初始化日志系统
///
/// 指定文件时同时输出到控制台和文件（文件不带 ANSI 颜色）。
pub fn init_with_file<P: AsRef<Path>>(
    config: &LogConfig,
    format: LogFormat,
    file: Option<P>,
) -> Result<(), LoggingError> {
    let targets = build_targets(config);

    let result = if let Some(path) = file {
        let file_handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let stdout_layer = create_format_layer(format, io::stdout).with_filter(targets.clone());
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file_handle))
            .with_filter(targets);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
    } else {
        let stdout_layer = create_format_layer(format, io::stdout).with_filter(targets);
        tracing_subscriber::registry().with(stdout_layer).try_init()
    };

    result.map_err(|_| LoggingError::AlreadyInitialized)
}

/// 初始化测试日志（输出被测试框架捕获，重复调用无副作用）
pub fn init_test_logger() {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(Targets::new().with_default(Level::DEBUG)),
        )
        .try_init();
}

/// 检查某一层的 debug 日志是否启用
pub fn is_enabled(layer: BridgeLayer) -> bool {
    match layer {
        BridgeLayer::Session => tracing::enabled!(target: "embridge::session", Level::DEBUG),
        BridgeLayer::Cache => tracing::enabled!(target: "embridge::cache", Level::DEBUG),
        BridgeLayer::Bridge => tracing::enabled!(target: "embridge::bridge", Level::DEBUG),
        BridgeLayer::Convert => tracing::enabled!(target: "embridge::convert", Level::DEBUG),
        BridgeLayer::Runtime => tracing::enabled!(target: "embridge::runtime", Level::DEBUG),
    }
}

/// 按层构建过滤规则
pub fn build_targets(config: &LogConfig) -> Targets {
    BridgeLayer::ALL.iter().fold(
        Targets::new().with_default(to_tracing_level(config.global)),
        |targets, layer| {
            targets.with_target(layer.target(), to_tracing_level(config.level_for(*layer)))
        },
    )
}

/// 配置级别映射到 tracing 级别
pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> impl Layer<tracing_subscriber::Registry>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
