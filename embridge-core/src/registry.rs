//! 模块注册表
//!
//! 注册表相当于"已安装的包"：模块名 → 初始化函数。运行时每次导入都会
//! 重新执行初始化函数，生成一个新的模块对象。

use std::collections::HashMap;
use std::rc::Rc;

use crate::exception::Exception;
use crate::object::{Arity, Class, Instance, Module, NativeFunction, NativeMethod};
use crate::runtime::Runtime;
use crate::stdlib;
use crate::value::Value;

/// 模块初始化函数
pub type ModuleInit = dyn Fn(&mut ModuleBuilder) -> Result<(), Exception>;

/// 模块注册表（克隆开销很小，初始化函数共享）
#[derive(Clone, Default)]
pub struct Registry {
    modules: HashMap<String, Rc<ModuleInit>>,
}

impl Registry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先注册了 `std` 模块的注册表
    pub fn with_stdlib() -> Self {
        let mut registry = Self::new();
        stdlib::register(&mut registry);
        registry
    }

    /// 注册模块；同名模块会被覆盖
    pub fn register<F>(&mut self, name: impl Into<String>, init: F) -> &mut Self
    where
        F: Fn(&mut ModuleBuilder) -> Result<(), Exception> + 'static,
    {
        self.modules.insert(name.into(), Rc::new(init));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// 已注册的模块名（排序后）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn get(&self, name: &str) -> Option<Rc<ModuleInit>> {
        self.modules.get(name).cloned()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("modules", &self.names())
            .finish()
    }
}

/// 模块构建器，交给初始化函数填充导出项
pub struct ModuleBuilder {
    name: String,
    exports: HashMap<String, Value>,
}

impl ModuleBuilder {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            exports: HashMap::new(),
        }
    }

    /// 正在构建的模块名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 导出原生函数
    pub fn function<F>(&mut self, name: &str, arity: Arity, function: F) -> &mut Self
    where
        F: Fn(&Runtime, &[Value]) -> Result<Value, Exception> + 'static,
    {
        let native = NativeFunction::new(name, arity, function);
        self.exports.insert(name.to_string(), Value::native(native));
        self
    }

    /// 导出常量值
    pub fn value(&mut self, name: &str, value: Value) -> &mut Self {
        self.exports.insert(name.to_string(), value);
        self
    }

    /// 导出类（以类名为导出名）
    pub fn class(&mut self, class: ClassBuilder) -> &mut Self {
        let class = class.build();
        self.exports
            .insert(class.name.clone(), Value::Class(class));
        self
    }

    pub(crate) fn build(self) -> Module {
        Module::new(self.name, self.exports)
    }
}

/// 类构建器
pub struct ClassBuilder {
    name: String,
    methods: HashMap<String, Rc<NativeMethod>>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// 添加方法；`__init__` 在实例化时调用，`__bool__` 参与真值判断
    pub fn method<F>(mut self, name: &str, arity: Arity, function: F) -> Self
    where
        F: Fn(&Runtime, &Rc<Instance>, &[Value]) -> Result<Value, Exception> + 'static,
    {
        self.methods
            .insert(name.to_string(), Rc::new(NativeMethod::new(name, arity, function)));
        self
    }

    pub fn build(self) -> Rc<Class> {
        Rc::new(Class::new(self.name, self.methods))
    }
}
