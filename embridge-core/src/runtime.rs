//! 嵌入式运行时
//!
//! 负责模块导入、属性解析、调用和真值判断。整个进程同一时刻最多一个
//! 活动运行时；值是 `!Send` 的，运行时状态留在创建它的线程内。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use embridge_config::RuntimeOptions;
use tracing::{debug, info, trace};

use crate::exception::{Exception, ExceptionKind, RuntimeError};
use crate::object::{BoundMethod, Instance};
use crate::registry::{ModuleBuilder, Registry};
use crate::value::Value;

const TARGET: &str = "embridge::runtime";

/// 进程级单例标记
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// 嵌入式运行时
pub struct Runtime {
    registry: Registry,
    options: RuntimeOptions,
    /// 每个模块名的导入次数（探针）
    imports: RefCell<HashMap<String, usize>>,
    /// 当前调用深度
    depth: Cell<usize>,
}

/// 调用深度守卫，退出时自动减一
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Runtime {
    /// 初始化运行时
    ///
    /// # Errors
    /// 进程内已有活动运行时（无论在哪个线程）时返回 `RuntimeError::AlreadyActive`
    pub fn initialize(registry: Registry, options: RuntimeOptions) -> Result<Self, RuntimeError> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RuntimeError::AlreadyActive);
        }

        info!(
            target: TARGET,
            modules = registry.names().len(),
            max_call_depth = options.max_call_depth,
            "runtime initialized"
        );

        Ok(Self {
            registry,
            options,
            imports: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
        })
    }

    /// 进程内是否有活动运行时
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }

    /// 关闭运行时（等价于 drop）
    pub fn finalize(self) {
        drop(self);
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ==================== 导入 ====================

    /// 导入模块：执行初始化函数并返回新的模块对象
    pub fn import(&self, name: &str) -> Result<Value, Exception> {
        let init = self
            .registry
            .get(name)
            .ok_or_else(|| Exception::import_error(format!("No module named '{}'", name)))?;

        *self.imports.borrow_mut().entry(name.to_string()).or_insert(0) += 1;

        let mut builder = ModuleBuilder::new(name);
        init(&mut builder)?;
        let module = builder.build();

        debug!(target: TARGET, module = name, exports = module.len(), "module imported");
        Ok(Value::Module(Rc::new(module)))
    }

    /// 模块被导入的次数
    pub fn import_count(&self, name: &str) -> usize {
        self.imports.borrow().get(name).copied().unwrap_or(0)
    }

    // ==================== 属性 ====================

    /// 解析属性，返回新引用
    pub fn get_attr(&self, object: &Value, name: &str) -> Result<Value, Exception> {
        let found = match object {
            Value::Module(module) => module.get(name).cloned(),
            Value::Instance(instance) => instance.get(name).or_else(|| {
                instance.class().method(name).map(|method| {
                    Value::BoundMethod(Rc::new(BoundMethod {
                        receiver: Rc::clone(instance),
                        method: Rc::clone(method),
                    }))
                })
            }),
            _ => None,
        };

        found.ok_or_else(|| {
            Exception::attribute_error(format!(
                "'{}' object has no attribute '{}'",
                object.type_name(),
                name
            ))
        })
    }

    pub fn has_attr(&self, object: &Value, name: &str) -> bool {
        self.get_attr(object, name).is_ok()
    }

    // ==================== 调用 ====================

    /// 调用可调用对象
    pub fn call(&self, callable: &Value, args: &[Value]) -> Result<Value, Exception> {
        let depth = self.depth.get() + 1;
        if depth > self.options.max_call_depth {
            return Err(Exception::new(
                ExceptionKind::RecursionError,
                "maximum call depth exceeded",
            ));
        }
        self.depth.set(depth);
        let guard = DepthGuard(&self.depth);

        trace!(target: TARGET, callee = %callable, argc = args.len(), depth, "call");

        let result = match callable {
            Value::Native(native) => native.invoke(self, args),
            Value::BoundMethod(bound) => bound.method.invoke(self, &bound.receiver, args),
            Value::Class(class) => {
                let instance = Rc::new(Instance::new(Rc::clone(class)));
                match class.method("__init__") {
                    Some(init) => init.invoke(self, &instance, args).map(|_| Value::Instance(instance)),
                    None if args.is_empty() => Ok(Value::Instance(instance)),
                    None => Err(Exception::type_error(format!(
                        "{}() takes no arguments ({} given)",
                        class.name,
                        args.len()
                    ))),
                }
            }
            other => Err(Exception::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        };

        drop(guard);
        result
    }

    /// 调用对象上的方法
    pub fn call_method(&self, object: &Value, name: &str, args: &[Value]) -> Result<Value, Exception> {
        let method = self.get_attr(object, name)?;
        self.call(&method, args)
    }

    // ==================== 真值 ====================

    /// 真值判断；实例的 `__bool__` 抛出异常或返回非布尔值时为歧义，返回 Err
    pub fn truthiness(&self, value: &Value) -> Result<bool, Exception> {
        match value {
            Value::None => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Float(x) => Ok(*x != 0.0),
            Value::Str(s) => Ok(!s.is_empty()),
            Value::List(items) => Ok(!items.borrow().is_empty()),
            Value::Tuple(items) => Ok(!items.is_empty()),
            Value::Dict(dict) => Ok(!dict.borrow().is_empty()),
            Value::Instance(instance) => match instance.class().method("__bool__") {
                None => Ok(true),
                Some(method) => {
                    // 走 call，受调用深度限制
                    let bound = Value::BoundMethod(Rc::new(BoundMethod {
                        receiver: Rc::clone(instance),
                        method: Rc::clone(method),
                    }));
                    match self.call(&bound, &[])? {
                        Value::Bool(b) => Ok(b),
                        other => Err(Exception::type_error(format!(
                            "__bool__ should return bool, returned {}",
                            other.type_name()
                        ))),
                    }
                }
            },
            Value::Module(_) | Value::Native(_) | Value::Class(_) | Value::BoundMethod(_) => Ok(true),
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
        info!(target: TARGET, "runtime finalized");
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}
