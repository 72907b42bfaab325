//! API 错误类型
//!
//! 桥接层的每个操作都返回精确的错误类别，而不是笼统的成功/失败。
//! 上层门面可以自行折叠为布尔值，但核心层从不把错误吞成默认值。

use embridge_core::Exception;
use serde::Serialize;
use thiserror::Error;

/// 桥接错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// 会话尚未启动
    #[error("session not started")]
    NotReady,

    /// 进程内已有活动的运行时（启动失败，不可恢复）
    #[error("another embedded runtime is already active in this process")]
    SessionConflict,

    /// 模块导入失败
    #[error("module '{module}' not found: {exception}")]
    ModuleNotFound { module: String, exception: Exception },

    /// 属性不存在或不可调用
    #[error("'{callable}' is not a callable attribute of {owner}")]
    CallableNotFound { owner: String, callable: String },

    /// 参数描述串非法（调用前检测）
    #[error("invalid argument spec {spec:?}: {reason}")]
    InvalidArgumentSpec { spec: String, reason: String },

    /// 运行时在调用过程中报告失败
    #[error("call to {target} failed: {exception}")]
    InvocationFailed { target: String, exception: Exception },

    /// 复合转换时运行时值的形状不符
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    /// 标量转换有歧义
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// ValueList 下标越界
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl BridgeError {
    /// 稳定的错误类别名（可用于程序化处理）
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::NotReady => "NotReady",
            BridgeError::SessionConflict => "SessionConflict",
            BridgeError::ModuleNotFound { .. } => "ModuleNotFound",
            BridgeError::CallableNotFound { .. } => "CallableNotFound",
            BridgeError::InvalidArgumentSpec { .. } => "InvalidArgumentSpec",
            BridgeError::InvocationFailed { .. } => "InvocationFailed",
            BridgeError::TypeMismatch { .. } => "TypeMismatch",
            BridgeError::ConversionError(_) => "ConversionError",
            BridgeError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
        }
    }

    /// 是否属于不可恢复的启动失败
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::SessionConflict)
    }

    /// 运行时异常（如果有）
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            BridgeError::ModuleNotFound { exception, .. }
            | BridgeError::InvocationFailed { exception, .. } => Some(exception),
            _ => None,
        }
    }

    /// 转换为结构化错误报告
    ///
    /// 适用于需要结构化数据的场景，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let (module, callable) = match self {
            BridgeError::ModuleNotFound { module, .. } => (Some(module.clone()), None),
            BridgeError::CallableNotFound { owner, callable } => {
                (Some(owner.clone()), Some(callable.clone()))
            }
            BridgeError::InvocationFailed { target, .. } => (None, Some(target.clone())),
            _ => (None, None),
        };

        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            module,
            callable,
            exception: self.exception().map(|exc| ExceptionReport {
                kind: exc.kind.as_str(),
                message: exc.message.clone(),
            }),
        }
    }
}

/// 结构化错误报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误类别
    pub kind: &'static str,
    /// 人类可读的错误消息
    pub message: String,
    /// 相关的模块（或方法调用的接收者）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 相关的可调用对象
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callable: Option<String>,
    /// 运行时异常
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionReport>,
}

/// 运行时异常摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionReport {
    pub kind: &'static str,
    pub message: String,
}

impl ErrorReport {
    /// 序列化为 JSON 文本
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
