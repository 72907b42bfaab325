//! 引用计数的运行时值
//!
//! `Value` 的克隆即获取一个引用，丢弃即释放。标量（null/bool/int/float）
//! 直接内联存储，其余都是 `Rc` 共享的堆对象。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::exception::Exception;
use crate::object::{BoundMethod, Class, Instance, Module, NativeFunction};

/// 运行时值
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<Dict>>),
    Module(Rc<Module>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<BoundMethod>),
}

impl Value {
    // ==================== 构造方法 ====================

    /// 创建字符串值
    pub fn string(text: &str) -> Self {
        Value::Str(Rc::from(text))
    }

    /// 创建列表值
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// 创建元组值
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::from(items))
    }

    /// 创建字典值
    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    /// 包装原生函数
    pub fn native(function: NativeFunction) -> Self {
        Value::Native(Rc::new(function))
    }

    // ==================== 类型检查与访问 ====================

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// 以切片形式访问列表或元组
    pub fn with_sequence<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Option<R> {
        match self {
            Value::List(items) => Some(f(&items.borrow())),
            Value::Tuple(items) => Some(f(items)),
            _ => None,
        }
    }

    /// 是否可调用
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Native(_) | Value::Class(_) | Value::BoundMethod(_)
        )
    }

    /// 运行时类型名
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Module(_) => "module",
            Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(inst) => inst.class().name.as_str(),
            Value::BoundMethod(_) => "method",
        }
    }

    /// 当前强引用计数；内联标量没有引用计数
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) => None,
            Value::Str(s) => Some(Rc::strong_count(s)),
            Value::List(l) => Some(Rc::strong_count(l)),
            Value::Tuple(t) => Some(Rc::strong_count(t)),
            Value::Dict(d) => Some(Rc::strong_count(d)),
            Value::Module(m) => Some(Rc::strong_count(m)),
            Value::Native(n) => Some(Rc::strong_count(n)),
            Value::Class(c) => Some(Rc::strong_count(c)),
            Value::Instance(i) => Some(Rc::strong_count(i)),
            Value::BoundMethod(b) => Some(Rc::strong_count(b)),
        }
    }

    /// 是否为同一个堆对象（标量按值比较）
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    fn fmt_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", &**s),
            other => write!(f, "{}", other),
        }
    }
}

// 容器按内容比较，对象按身份比较
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_repr(f)?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_repr(f)?;
                }
                write!(f, ")")
            }
            Value::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    key.to_value().fmt_repr(f)?;
                    write!(f, ": ")?;
                    value.fmt_repr(f)?;
                }
                write!(f, "}}")
            }
            Value::Module(m) => write!(f, "<module '{}'>", m.name),
            Value::Native(n) => write!(f, "<function {}>", n.name),
            Value::Class(c) => write!(f, "<class {}>", c.name),
            Value::Instance(i) => write!(f, "<{} instance>", i.class().name),
            Value::BoundMethod(b) => {
                write!(f, "<method {}.{}>", b.receiver.class().name, b.method.name)
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_repr(f)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::string(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ==================== 字典 ====================

/// 可哈希的字典键
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
}

impl HashKey {
    /// 从运行时值构造键；不可哈希的值抛出 TypeError
    pub fn from_value(value: &Value) -> Result<Self, Exception> {
        match value {
            Value::None => Ok(HashKey::None),
            Value::Bool(b) => Ok(HashKey::Bool(*b)),
            Value::Int(n) => Ok(HashKey::Int(*n)),
            Value::Str(s) => Ok(HashKey::Str(Rc::clone(s))),
            other => Err(Exception::type_error(format!(
                "unhashable type: '{}'",
                other.type_name()
            ))),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            HashKey::None => Value::None,
            HashKey::Bool(b) => Value::Bool(*b),
            HashKey::Int(n) => Value::Int(*n),
            HashKey::Str(s) => Value::Str(Rc::clone(s)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HashKey::Str(s) => Some(&**s),
            _ => None,
        }
    }
}

/// 保持插入顺序的字典；重复插入同一个键时原位替换值
#[derive(Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(HashKey, Value)>,
    index: HashMap<HashKey, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入键值对，返回被替换的旧值
    pub fn insert(&mut self, key: &Value, value: Value) -> Result<Option<Value>, Exception> {
        let key = HashKey::from_value(key)?;
        Ok(self.insert_key(key, value))
    }

    /// 以字符串为键插入
    pub fn insert_str(&mut self, key: &str, value: Value) -> Option<Value> {
        self.insert_key(HashKey::Str(Rc::from(key)), value)
    }

    fn insert_key(&mut self, key: HashKey, value: Value) -> Option<Value> {
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, Exception> {
        let key = HashKey::from_value(key)?;
        Ok(self.index.get(&key).map(|&slot| &self.entries[slot].1))
    }

    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.index
            .get(&HashKey::Str(Rc::from(key)))
            .map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&HashKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}
