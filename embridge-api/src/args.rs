//! 调用参数
//!
//! [`Arg`] 是类型化的参数枚举，由 [`args!`](crate::args) 宏从普通 Rust 值构造。
//! 旧式调用方可以额外提供参数描述串，[`ArgSpec`] 在任何导入或调用之前
//! 校验描述串本身以及它与实际参数的一致性。
//!
//! 描述串字符：
//!
//! | 字符 | 参数 |
//! |------|------|
//! | `s`  | 文本 |
//! | `z`  | 可空文本 |
//! | `i`  | 整数 |
//! | `b`  | 布尔 |
//! | `O`  | 运行时对象句柄 |
//! | `l`  | ValueList |
//! | `m`  | ValueMap |
//!
//! 空格和逗号被忽略，整个描述串可以包在一对括号里，例如 `"(s, O)"`。

use std::fmt;
use std::str::FromStr;

use embridge_core::Value;

use crate::convert;
use crate::error::BridgeError;
use crate::handle::Handle;
use crate::types::{ValueList, ValueMap};

/// 调用参数
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    /// none 单例
    None,
    /// 文本；None 映射为 none 单例
    Text(Option<&'a str>),
    Int(i64),
    Bool(bool),
    /// 已有的运行时对象
    Handle(&'a Handle<'a>),
    /// 转换为运行时列表
    List(&'a ValueList),
    /// 转换为运行时字典
    Map(&'a ValueMap),
}

impl Arg<'_> {
    /// 参数类别名（用于错误消息）
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::None => "none",
            Arg::Text(Some(_)) => "text",
            Arg::Text(None) => "null text",
            Arg::Int(_) => "int",
            Arg::Bool(_) => "bool",
            Arg::Handle(_) => "object",
            Arg::List(_) => "list",
            Arg::Map(_) => "map",
        }
    }

    /// 转换为运行时值（新引用）
    pub(crate) fn to_value(self) -> Value {
        match self {
            Arg::None | Arg::Text(None) => Value::None,
            Arg::Text(Some(text)) => Value::string(text),
            Arg::Int(n) => Value::Int(n),
            Arg::Bool(b) => Value::Bool(b),
            Arg::Handle(handle) => handle.value().clone(),
            Arg::List(list) => convert::list_to_value(list),
            Arg::Map(map) => convert::map_to_value(map),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(text: &'a str) -> Self {
        Arg::Text(Some(text))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(text: &'a String) -> Self {
        Arg::Text(Some(text.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(text: Option<&'a str>) -> Self {
        Arg::Text(text)
    }
}

impl From<i64> for Arg<'_> {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg<'_> {
    fn from(n: i32) -> Self {
        Arg::Int(i64::from(n))
    }
}

impl From<bool> for Arg<'_> {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl<'a> From<&'a Handle<'a>> for Arg<'a> {
    fn from(handle: &'a Handle<'a>) -> Self {
        Arg::Handle(handle)
    }
}

impl<'a> From<&'a ValueList> for Arg<'a> {
    fn from(list: &'a ValueList) -> Self {
        Arg::List(list)
    }
}

impl<'a> From<&'a ValueMap> for Arg<'a> {
    fn from(map: &'a ValueMap) -> Self {
        Arg::Map(map)
    }
}

/// 构造参数数组
///
/// ```ignore
/// session.call("overlay.api", "sync", &args!["gentoo", true])?;
/// ```
#[macro_export]
macro_rules! args {
    () => {
        []
    };
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Arg::from($arg)),+]
    };
}

// ==================== 参数描述串 ====================

/// 描述串中的单个参数类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecChar {
    Text,
    NullableText,
    Int,
    Bool,
    Object,
    List,
    Map,
}

impl SpecChar {
    fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(SpecChar::Text),
            'z' => Some(SpecChar::NullableText),
            'i' => Some(SpecChar::Int),
            'b' => Some(SpecChar::Bool),
            'O' => Some(SpecChar::Object),
            'l' => Some(SpecChar::List),
            'm' => Some(SpecChar::Map),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            SpecChar::Text => 's',
            SpecChar::NullableText => 'z',
            SpecChar::Int => 'i',
            SpecChar::Bool => 'b',
            SpecChar::Object => 'O',
            SpecChar::List => 'l',
            SpecChar::Map => 'm',
        }
    }

    /// 参数是否符合该类别；none 可以充当对象、列表和字典
    pub fn accepts(&self, arg: &Arg<'_>) -> bool {
        matches!(
            (self, arg),
            (SpecChar::Text, Arg::Text(Some(_)))
                | (SpecChar::NullableText, Arg::Text(_) | Arg::None)
                | (SpecChar::Int, Arg::Int(_))
                | (SpecChar::Bool, Arg::Bool(_))
                | (SpecChar::Object, Arg::Handle(_) | Arg::None)
                | (SpecChar::List, Arg::List(_) | Arg::None)
                | (SpecChar::Map, Arg::Map(_) | Arg::None)
        )
    }
}

/// 解析后的参数描述串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    source: String,
    chars: Vec<SpecChar>,
}

impl ArgSpec {
    /// 解析描述串
    ///
    /// # Errors
    /// 未知字符、括号不配对或嵌套括号时返回 `InvalidArgumentSpec`
    pub fn parse(spec: &str) -> Result<Self, BridgeError> {
        let invalid = |reason: String| BridgeError::InvalidArgumentSpec {
            spec: spec.to_string(),
            reason,
        };

        let trimmed = spec.trim();
        let body = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => return Err(invalid("unbalanced parentheses".to_string())),
        };

        let mut chars = Vec::new();
        for (pos, c) in body.char_indices() {
            match c {
                ' ' | ',' | '\t' => continue,
                '(' | ')' => return Err(invalid("nested tuples are not supported".to_string())),
                _ => {
                    let kind = SpecChar::from_char(c).ok_or_else(|| {
                        invalid(format!("unknown format character '{}' at position {}", c, pos))
                    })?;
                    chars.push(kind);
                }
            }
        }

        Ok(Self {
            source: spec.to_string(),
            chars,
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[SpecChar] {
        &self.chars
    }

    /// 校验实际参数与描述串一致
    pub fn check(&self, args: &[Arg<'_>]) -> Result<(), BridgeError> {
        let invalid = |reason: String| BridgeError::InvalidArgumentSpec {
            spec: self.source.clone(),
            reason,
        };

        if args.len() != self.chars.len() {
            return Err(invalid(format!(
                "spec describes {} arguments but {} were given",
                self.chars.len(),
                args.len()
            )));
        }

        for (pos, (kind, arg)) in self.chars.iter().zip(args).enumerate() {
            if !kind.accepts(arg) {
                return Err(invalid(format!(
                    "argument {} is {}, spec expects '{}'",
                    pos,
                    arg.kind(),
                    kind.as_char()
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for ArgSpec {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArgSpec::parse(s)
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.chars {
            write!(f, "{}", kind.as_char())?;
        }
        Ok(())
    }
}
