//! 门面协议
//!
//! 上层门面（配置、消息、仓库 API）都遵循同一模式：调用一次构造器，
//! 保存返回的不透明对象，之后把每个操作转成该对象上的方法调用。
//! [`Facade`] 把这个模式实现一次。

use tracing::debug;

use crate::args::Arg;
use crate::error::BridgeError;
use crate::handle::Handle;
use crate::session::Session;
use crate::types::{ValueList, ValueMap};

const TARGET: &str = "embridge::bridge";

/// 包装一个运行时对象的门面
#[derive(Debug, Clone)]
pub struct Facade<'s> {
    name: String,
    handle: Handle<'s>,
}

impl<'s> Facade<'s> {
    /// 调用 `module.constructor(args)` 并保存结果
    pub fn create(
        session: &'s Session,
        module: &str,
        constructor: &str,
        args: &[Arg<'_>],
    ) -> Result<Self, BridgeError> {
        let handle = session.call(module, constructor, args)?;
        let name = format!("{}.{}", module, constructor);
        debug!(target: TARGET, facade = %name, object = handle.type_name(), "facade created");
        Ok(Self { name, handle })
    }

    /// 包装已有句柄
    pub fn from_handle(name: impl Into<String>, handle: Handle<'s>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Handle<'s> {
        &self.handle
    }

    /// 调用方法，返回原始结果
    pub fn invoke(&self, method: &str, args: &[Arg<'_>]) -> Result<Handle<'s>, BridgeError> {
        self.handle.call_method(method, args)
    }

    /// 调用方法并把结果解释为成功状态
    ///
    /// 真值即成功：任何真值结果都视为成功，假值视为失败；
    /// 真值判断有歧义时返回 `ConversionError` 而不是 `false`。
    pub fn invoke_status(&self, method: &str, args: &[Arg<'_>]) -> Result<bool, BridgeError> {
        self.invoke(method, args)?.is_truthy()
    }

    pub fn invoke_list(&self, method: &str, args: &[Arg<'_>]) -> Result<ValueList, BridgeError> {
        self.invoke(method, args)?.to_value_list()
    }

    pub fn invoke_map(&self, method: &str, args: &[Arg<'_>]) -> Result<ValueMap, BridgeError> {
        self.invoke(method, args)?.to_value_map()
    }

    pub fn invoke_text(
        &self,
        method: &str,
        args: &[Arg<'_>],
    ) -> Result<Option<String>, BridgeError> {
        self.invoke(method, args)?.to_text()
    }

    /// 调用返回映射的方法并查找单个键；键不存在时返回 `Ok(None)`
    pub fn lookup(
        &self,
        method: &str,
        args: &[Arg<'_>],
        key: &str,
    ) -> Result<Option<String>, BridgeError> {
        let map = self.invoke_map(method, args)?;
        Ok(map.get(key).map(str::to_string))
    }
}
