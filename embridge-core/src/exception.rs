//! 运行时异常
//!
//! 运行时内部的每一种失败都表示为 `Exception`，由调用方（桥接层）
//! 决定如何归类。

use std::fmt;
use thiserror::Error;

/// 异常类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    TypeError,
    ValueError,
    AttributeError,
    ImportError,
    KeyError,
    IndexError,
    RecursionError,
    AssertionError,
    RuntimeError,
}

impl ExceptionKind {
    /// 类别名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::ValueError => "ValueError",
            ExceptionKind::AttributeError => "AttributeError",
            ExceptionKind::ImportError => "ImportError",
            ExceptionKind::KeyError => "KeyError",
            ExceptionKind::IndexError => "IndexError",
            ExceptionKind::RecursionError => "RecursionError",
            ExceptionKind::AssertionError => "AssertionError",
            ExceptionKind::RuntimeError => "RuntimeError",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 运行时抛出的异常
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct Exception {
    /// 异常类别
    pub kind: ExceptionKind,
    /// 人类可读的消息
    pub message: String,
}

impl Exception {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::AttributeError, message)
    }

    pub fn import_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ImportError, message)
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::RuntimeError, message)
    }
}

/// 运行时生命周期错误（初始化失败）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// 进程内已经有一个活动的运行时
    #[error("an embedded runtime is already active in this process")]
    AlreadyActive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_display() {
        let exc = Exception::type_error("len() of unsized object");
        assert_eq!(exc.to_string(), "TypeError: len() of unsized object");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ExceptionKind::ImportError.as_str(), "ImportError");
        assert_eq!(format!("{}", ExceptionKind::RecursionError), "RecursionError");
    }
}
