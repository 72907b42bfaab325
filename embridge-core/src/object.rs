//! 堆对象定义
//!
//! 模块、原生函数、类、实例和绑定方法。所有对象都通过 `Rc` 共享，
//! 引用计数即对象的所有权。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::exception::Exception;
use crate::runtime::Runtime;
use crate::value::Value;

/// 原生函数类型
pub type NativeFn = dyn Fn(&Runtime, &[Value]) -> Result<Value, Exception>;

/// 原生方法类型（接收者为实例）
pub type NativeMethodFn = dyn Fn(&Runtime, &Rc<Instance>, &[Value]) -> Result<Value, Exception>;

/// 参数数量约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// 固定数量
    Fixed(usize),
    /// 任意数量
    Variadic,
}

impl Arity {
    /// 校验实参数量
    pub fn check(&self, name: &str, given: usize) -> Result<(), Exception> {
        match *self {
            Arity::Fixed(expected) if expected != given => Err(Exception::type_error(format!(
                "{}() takes exactly {} argument{} ({} given)",
                name,
                expected,
                if expected == 1 { "" } else { "s" },
                given
            ))),
            _ => Ok(()),
        }
    }
}

/// 模块对象 - 存储模块导出项
pub struct Module {
    /// 模块名
    pub name: String,
    exports: HashMap<String, Value>,
}

impl Module {
    pub(crate) fn new(name: String, exports: HashMap<String, Value>) -> Self {
        Self { name, exports }
    }

    /// 按名称获取导出项
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    /// 导出项名称（排序后）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// 原生函数对象 - 包装 Rust 闭包
pub struct NativeFunction {
    /// 函数名（用于调试和错误消息）
    pub name: String,
    /// 参数数量（用于校验）
    pub arity: Arity,
    function: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, arity: Arity, function: F) -> Self
    where
        F: Fn(&Runtime, &[Value]) -> Result<Value, Exception> + 'static,
    {
        Self {
            name: name.into(),
            arity,
            function: Box::new(function),
        }
    }

    pub(crate) fn invoke(&self, rt: &Runtime, args: &[Value]) -> Result<Value, Exception> {
        self.arity.check(&self.name, args.len())?;
        (self.function)(rt, args)
    }
}

/// 原生方法
pub struct NativeMethod {
    pub name: String,
    pub arity: Arity,
    function: Box<NativeMethodFn>,
}

impl NativeMethod {
    pub fn new<F>(name: impl Into<String>, arity: Arity, function: F) -> Self
    where
        F: Fn(&Runtime, &Rc<Instance>, &[Value]) -> Result<Value, Exception> + 'static,
    {
        Self {
            name: name.into(),
            arity,
            function: Box::new(function),
        }
    }

    pub(crate) fn invoke(
        &self,
        rt: &Runtime,
        receiver: &Rc<Instance>,
        args: &[Value],
    ) -> Result<Value, Exception> {
        self.arity.check(&self.name, args.len())?;
        (self.function)(rt, receiver, args)
    }
}

/// 类对象：名称 + 方法表
pub struct Class {
    pub name: String,
    methods: HashMap<String, Rc<NativeMethod>>,
}

impl Class {
    pub(crate) fn new(name: String, methods: HashMap<String, Rc<NativeMethod>>) -> Self {
        Self { name, methods }
    }

    pub fn method(&self, name: &str) -> Option<&Rc<NativeMethod>> {
        self.methods.get(name)
    }
}

/// 实例对象
pub struct Instance {
    class: Rc<Class>,
    attrs: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub(crate) fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            attrs: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// 读取实例属性（返回新引用）
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    /// 设置实例属性，返回被替换的旧值
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attrs.borrow_mut().insert(name.into(), value)
    }
}

/// 绑定方法：接收者 + 方法
pub struct BoundMethod {
    pub receiver: Rc<Instance>,
    pub method: Rc<NativeMethod>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("exports", &self.names())
            .finish()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
