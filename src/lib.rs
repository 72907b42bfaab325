//! Embridge - Native facade over an embedded dynamic-language runtime
//!
//! Embridge starts an in-process runtime, loads modules on demand, calls
//! named functions and methods with marshalled arguments, and converts the
//! results back into plain Rust values.
//!
//! # Architecture
//!
//! ```text
//! embridge-config/  - Pure configuration data (no logic)
//! embridge-core/    - Embedded runtime (values, modules, invocation)
//! embridge-api/     - Session, module cache, call bridge, converters
//! src/              - This umbrella crate
//! ```
//!
//! # Quick Start
//!
//! ```
//! use embridge::{args, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.start().unwrap();
//! {
//!     let kind = session.call("std", "type", &args![42]).unwrap();
//!     assert_eq!(kind.to_text().unwrap().as_deref(), Some("int"));
//! }
//! session.stop();
//! ```

use tracing::info;

pub use embridge_api::{
    args, config, logging, Arg, ArgSpec, Arity, BridgeError, ClassBuilder, ErrorReport,
    Exception, ExceptionKind, Facade, Handle, Layer, LogConfig, LogLevel, ModuleBuilder,
    Registry, RuntimeOptions, Session, SessionConfig, SpecChar, ValueList, ValueMap,
};

/// Embedded runtime types, for hosts that register native modules
pub use embridge_core as runtime;

/// 初始化全局配置和日志系统
///
/// # Panics
/// If the global config is already initialized
pub fn init(config: SessionConfig) -> Result<(), logging::LoggingError> {
    logging::init_logger(&config.log)?;
    info!(target: "embridge::session", preload = config.preload.len(), "embridge initialized");
    embridge_api::config::init(config);
    Ok(())
}

/// 使用全局配置创建并启动会话
pub fn start_session(registry: Registry) -> Result<Session, BridgeError> {
    embridge_api::start_session(registry)
}
