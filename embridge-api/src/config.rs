//! API 层配置
//!
//! 全局会话配置单例，供宿主在启动时一次性设置，之后由
//! `Session::from_global` 读取。

use embridge_config::SessionConfig;
use once_cell::sync::OnceCell;

// Global config singleton for host convenience
static GLOBAL_CONFIG: OnceCell<SessionConfig> = OnceCell::new();

/// Initialize global configuration (call once before creating sessions)
///
/// # Panics
/// If config is already initialized
pub fn init(config: SessionConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static SessionConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Global config, or the default when nothing was installed
pub fn get_or_default() -> SessionConfig {
    GLOBAL_CONFIG.get().cloned().unwrap_or_default()
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
