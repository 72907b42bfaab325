//! API 类型定义
//!
//! 原生侧的复合数据：[`ValueList`] 是定长的可空文本槽位序列，
//! [`ValueMap`] 是允许重复键的文本键值对序列。两者都是纯 Rust 数据，
//! 与运行时无关，可以在会话之外构造和检查。

use std::fmt;

use crate::error::BridgeError;

// ==================== ValueList ====================

/// 定长文本列表，每个槽位可以为空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueList {
    slots: Vec<Option<String>>,
}

impl ValueList {
    /// 创建 `len` 个空槽位的列表
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 设置槽位
    ///
    /// # Errors
    /// 越界时返回 `IndexOutOfBounds`
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), BridgeError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BridgeError::IndexOutOfBounds { index, len })?;
        *slot = Some(value.into());
        Ok(())
    }

    /// 清空槽位
    pub fn clear(&mut self, index: usize) -> Result<(), BridgeError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BridgeError::IndexOutOfBounds { index, len })?;
        *slot = None;
        Ok(())
    }

    /// 读取槽位；越界或未设置都返回 None
    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.slots.iter().map(|slot| slot.as_deref())
    }

    pub(crate) fn from_slots(slots: Vec<Option<String>>) -> Self {
        Self { slots }
    }
}

impl<S: Into<String>> FromIterator<S> for ValueList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(|s| Some(s.into())).collect(),
        }
    }
}

impl fmt::Display for ValueList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(text) => write!(f, "{:?}", text)?,
                None => write!(f, "null")?,
            }
        }
        Ok(())
    }
}

// ==================== ValueMap ====================

/// 文本键值对序列（保持追加顺序，允许重复键）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: Vec<(String, String)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加键值对
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按键查找；重复键以最后一次追加为准
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
