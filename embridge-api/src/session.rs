//! 解释器会话
//!
//! 会话拥有嵌入式运行时和模块缓存，整个进程同一时刻最多一个运行中的
//! 会话。生命周期：
//!
//! ```text
//! Stopped --start--> Running --stop--> Stopped
//! ```
//!
//! `start` 和 `stop` 都是幂等的。所有桥接操作在 Stopped 状态下返回
//! [`BridgeError::NotReady`]。`stop` 需要 `&mut self`，因此只要还有
//! [`Handle`](crate::Handle) 借用会话，就无法停止它。

use std::cell::RefCell;

use embridge_config::SessionConfig;
use embridge_core::{Registry, Runtime, Value};
use tracing::{debug, info, instrument, warn};

use crate::cache::ModuleCache;
use crate::error::BridgeError;

const TARGET: &str = "embridge::session";

/// 运行中的会话状态
struct Active {
    runtime: Runtime,
    cache: RefCell<ModuleCache>,
}

/// 解释器会话
pub struct Session {
    config: SessionConfig,
    registry: Registry,
    state: Option<Active>,
}

impl Session {
    /// 使用带 `std` 模块的默认注册表创建会话
    pub fn new(config: SessionConfig) -> Self {
        Self::with_registry(config, Registry::with_stdlib())
    }

    /// 使用指定注册表创建会话
    pub fn with_registry(config: SessionConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            state: None,
        }
    }

    /// 使用全局配置（未初始化时为默认配置）创建会话
    pub fn from_global(registry: Registry) -> Self {
        Self::with_registry(crate::config::get_or_default(), registry)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 启动会话；已运行时直接返回成功
    ///
    /// # Errors
    /// 进程内已有其他活动运行时时返回 `SessionConflict`
    #[instrument(target = "embridge::session", skip(self))]
    pub fn start(&mut self) -> Result<(), BridgeError> {
        if self.state.is_some() {
            debug!(target: TARGET, "session already running");
            return Ok(());
        }

        let runtime = Runtime::initialize(self.registry.clone(), self.config.runtime.clone())
            .map_err(|err| {
                warn!(target: TARGET, error = %err, "runtime initialization failed");
                BridgeError::SessionConflict
            })?;

        self.state = Some(Active {
            runtime,
            cache: RefCell::new(ModuleCache::new()),
        });
        info!(target: TARGET, "session started");

        for module in &self.config.preload {
            if let Err(err) = self.resolve_module(module) {
                warn!(target: TARGET, module = %module, error = %err, "preload failed");
            }
        }
        Ok(())
    }

    /// 停止会话：先释放模块缓存，再关闭运行时；未运行时什么也不做
    #[instrument(target = "embridge::session", skip(self))]
    pub fn stop(&mut self) {
        let Some(active) = self.state.take() else {
            debug!(target: TARGET, "session not running");
            return;
        };

        let released = active.cache.borrow_mut().release_all();
        active.runtime.finalize();
        info!(target: TARGET, released, "session stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// 已缓存的模块名；未运行时为空
    pub fn cached_modules(&self) -> Vec<String> {
        self.state
            .as_ref()
            .map(|active| active.cache.borrow().names())
            .unwrap_or_default()
    }

    /// 模块是否已缓存
    pub fn is_cached(&self, module: &str) -> bool {
        self.state
            .as_ref()
            .is_some_and(|active| active.cache.borrow().contains(module))
    }

    /// 运行时实际导入某模块的次数；未运行时为 0
    pub fn import_count(&self, module: &str) -> usize {
        self.state
            .as_ref()
            .map_or(0, |active| active.runtime.import_count(module))
    }

    // ==================== 内部接口 ====================

    pub(crate) fn runtime(&self) -> Result<&Runtime, BridgeError> {
        self.state
            .as_ref()
            .map(|active| &active.runtime)
            .ok_or(BridgeError::NotReady)
    }

    /// 通过模块缓存解析模块
    pub(crate) fn resolve_module(&self, name: &str) -> Result<Value, BridgeError> {
        let active = self.state.as_ref().ok_or(BridgeError::NotReady)?;
        let mut cache = active.cache.borrow_mut();
        cache.resolve(&active.runtime, name)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("running", &self.is_running())
            .field("cached_modules", &self.cached_modules())
            .field("registry", &self.registry)
            .finish()
    }
}
