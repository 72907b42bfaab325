//! 运行时值句柄
//!
//! [`Handle`] 拥有一个运行时值的引用：克隆即获取新引用，drop 即释放。
//! 句柄借用创建它的 [`Session`]，因此不会比会话活得更久，也不能
//! 在句柄存活期间停止会话。

use std::fmt;

use embridge_core::Value;

use crate::session::Session;

/// 运行时值的拥有型句柄
#[derive(Clone)]
pub struct Handle<'s> {
    session: &'s Session,
    value: Value,
}

impl<'s> Handle<'s> {
    pub(crate) fn new(session: &'s Session, value: Value) -> Self {
        Self { session, value }
    }

    pub(crate) fn value(&self) -> &Value {
        &self.value
    }

    /// 创建该句柄的会话
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// 运行时类型名（实例为类名）
    pub fn type_name(&self) -> &str {
        self.value.type_name()
    }

    /// 是否为 none 单例
    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_callable(&self) -> bool {
        self.value.is_callable()
    }

    /// 底层对象的引用计数；内联标量返回 None
    pub fn ref_count(&self) -> Option<usize> {
        self.value.ref_count()
    }

    /// 两个句柄是否指向同一个对象
    pub fn is_same(&self, other: &Handle<'_>) -> bool {
        self.value.is_same(&other.value)
    }
}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:?})", self.value)
    }
}

impl fmt::Display for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
