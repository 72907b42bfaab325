//! 模块缓存
//!
//! 每个模块名在一个会话内最多导入一次；之后的解析直接返回缓存的
//! 模块对象的新引用。会话停止前通过 [`ModuleCache::release_all`]
//! 释放全部引用。

use std::collections::HashMap;

use embridge_core::{Runtime, Value};
use tracing::{debug, trace, warn};

use crate::error::BridgeError;

const TARGET: &str = "embridge::cache";

#[derive(Debug, Default)]
pub(crate) struct ModuleCache {
    modules: HashMap<String, Value>,
}

impl ModuleCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 解析模块，必要时导入
    ///
    /// 导入失败不会写入缓存，下次解析会重新尝试。
    pub(crate) fn resolve(&mut self, runtime: &Runtime, name: &str) -> Result<Value, BridgeError> {
        if let Some(module) = self.modules.get(name) {
            trace!(target: TARGET, module = name, "cache hit");
            return Ok(module.clone());
        }

        debug!(target: TARGET, module = name, "cache miss, importing");
        let module = runtime.import(name).map_err(|exception| {
            warn!(target: TARGET, module = name, error = %exception, "import failed");
            BridgeError::ModuleNotFound {
                module: name.to_string(),
                exception,
            }
        })?;

        self.modules.insert(name.to_string(), module.clone());
        Ok(module)
    }

    /// 释放全部缓存的模块引用，返回释放数量
    pub(crate) fn release_all(&mut self) -> usize {
        let released = self.modules.len();
        self.modules.clear();
        debug!(target: TARGET, released, "module cache released");
        released
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// 已缓存的模块名（排序后）
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
