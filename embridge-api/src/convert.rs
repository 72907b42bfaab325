//! 值转换
//!
//! 标量：文本 / 整数 / 布尔，缺失的文本映射为 none 单例而不是空串。
//! 复合：[`ValueList`] ⇄ 运行时序列，[`ValueMap`] ⇄ 运行时字典。
//! 复合转换要么完整成功，要么返回错误，不会产生部分结果。

use embridge_core::{Dict, Value};
use tracing::{debug, trace};

use crate::error::BridgeError;
use crate::handle::Handle;
use crate::session::Session;
use crate::types::{ValueList, ValueMap};

const TARGET: &str = "embridge::convert";

// ==================== 原生 → 运行时 ====================

/// 构造新的运行时列表，每个槽位复制为新的文本值
pub(crate) fn list_to_value(list: &ValueList) -> Value {
    Value::list(
        list.iter()
            .map(|slot| slot.map_or(Value::None, Value::string))
            .collect(),
    )
}

/// 构造新的运行时字典；重复键以最后一次为准
pub(crate) fn map_to_value(map: &ValueMap) -> Value {
    let mut dict = Dict::new();
    for (key, value) in map.iter() {
        dict.insert_str(key, Value::string(value));
    }
    Value::dict(dict)
}

impl Session {
    /// none 单例
    pub fn none(&self) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        Ok(Handle::new(self, Value::None))
    }

    /// 文本；None 映射为 none 单例
    pub fn text(&self, text: Option<&str>) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        Ok(Handle::new(self, text.map_or(Value::None, Value::string)))
    }

    pub fn int(&self, n: i64) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        Ok(Handle::new(self, Value::Int(n)))
    }

    pub fn boolean(&self, b: bool) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        Ok(Handle::new(self, Value::Bool(b)))
    }

    /// ValueList → 运行时列表；None 映射为 none 单例
    pub fn from_value_list(&self, list: Option<&ValueList>) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        let value = list.map_or(Value::None, list_to_value);
        trace!(target: TARGET, len = list.map(ValueList::len), "list to runtime");
        Ok(Handle::new(self, value))
    }

    /// ValueMap → 运行时字典；None 映射为 none 单例
    pub fn from_value_map(&self, map: Option<&ValueMap>) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        let value = map.map_or(Value::None, map_to_value);
        trace!(target: TARGET, len = map.map(ValueMap::len), "map to runtime");
        Ok(Handle::new(self, value))
    }
}

// ==================== 运行时 → 原生 ====================

impl Handle<'_> {
    /// 文本；none 返回 `Ok(None)`
    pub fn to_text(&self) -> Result<Option<String>, BridgeError> {
        match self.value() {
            Value::None => Ok(None),
            Value::Str(s) => Ok(Some(s.to_string())),
            other => Err(mismatch("text", other)),
        }
    }

    pub fn to_int(&self) -> Result<i64, BridgeError> {
        self.value().as_int().ok_or_else(|| mismatch("int", self.value()))
    }

    /// 严格布尔：只接受真正的布尔值
    pub fn to_bool(&self) -> Result<bool, BridgeError> {
        self.value().as_bool().ok_or_else(|| mismatch("bool", self.value()))
    }

    /// 按运行时真值协议判断
    ///
    /// # Errors
    /// 运行时无法给出明确的真/假时返回 `ConversionError`
    pub fn is_truthy(&self) -> Result<bool, BridgeError> {
        let runtime = self.session().runtime()?;
        runtime.truthiness(self.value()).map_err(|exception| {
            debug!(target: TARGET, error = %exception, "ambiguous truthiness");
            BridgeError::ConversionError(format!(
                "truthiness of '{}' object is ambiguous: {}",
                self.type_name(),
                exception
            ))
        })
    }

    /// 运行时序列（列表或元组）→ ValueList（深拷贝）
    pub fn to_value_list(&self) -> Result<ValueList, BridgeError> {
        let slots = self
            .value()
            .with_sequence(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::None => Ok(None),
                        Value::Str(s) => Ok(Some(s.to_string())),
                        other => Err(BridgeError::TypeMismatch {
                            expected: "sequence of text",
                            found: format!("'{}' element at index {}", other.type_name(), i),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .ok_or_else(|| mismatch("sequence", self.value()))??;

        trace!(target: TARGET, len = slots.len(), "runtime to list");
        Ok(ValueList::from_slots(slots))
    }

    /// 运行时字典 → ValueMap（保持字典顺序）
    pub fn to_value_map(&self) -> Result<ValueMap, BridgeError> {
        let Value::Dict(dict) = self.value() else {
            return Err(mismatch("dict", self.value()));
        };

        let mut map = ValueMap::new();
        for (key, value) in dict.borrow().iter() {
            let key = key.as_str().ok_or_else(|| BridgeError::TypeMismatch {
                expected: "text key",
                found: key.to_value().type_name().to_string(),
            })?;
            let value = value.as_str().ok_or_else(|| BridgeError::TypeMismatch {
                expected: "text value",
                found: format!("'{}' value for key '{}'", value.type_name(), key),
            })?;
            map.append(key, value);
        }

        trace!(target: TARGET, len = map.len(), "runtime to map");
        Ok(map)
    }
}

fn mismatch(expected: &'static str, found: &Value) -> BridgeError {
    BridgeError::TypeMismatch {
        expected,
        found: found.type_name().to_string(),
    }
}
