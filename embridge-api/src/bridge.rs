//! 调用桥
//!
//! 一次调用的流程：
//!
//! 1. 会话必须处于运行状态（否则 `NotReady`）
//! 2. 若提供了描述串，先校验描述串和参数（`InvalidArgumentSpec`），此时尚未导入任何模块
//! 3. 通过模块缓存解析模块（`ModuleNotFound`）
//! 4. 解析可调用属性（`CallableNotFound`）
//! 5. 转换参数并调用（`InvocationFailed`）
//!
//! 成功时返回结果的拥有型句柄；任何出口上已获取的中间引用都会随作用域释放。

use embridge_core::{Runtime, Value};
use tracing::{debug, instrument};

use crate::args::{Arg, ArgSpec};
use crate::error::BridgeError;
use crate::handle::Handle;
use crate::session::Session;

const TARGET: &str = "embridge::bridge";

impl Session {
    /// 调用模块中的函数（或类构造器）
    #[instrument(target = "embridge::bridge", skip(self, args), fields(argc = args.len()))]
    pub fn call(
        &self,
        module: &str,
        callable: &str,
        args: &[Arg<'_>],
    ) -> Result<Handle<'_>, BridgeError> {
        let runtime = self.runtime()?;
        let module_value = self.resolve_module(module)?;
        let target = resolve_callable(runtime, &module_value, callable, || {
            format!("module '{}'", module)
        })?;
        self.invoke(runtime, &target, args, || format!("{}.{}", module, callable))
    }

    /// 带参数描述串的 [`Session::call`]
    pub fn call_with_spec(
        &self,
        module: &str,
        callable: &str,
        spec: &str,
        args: &[Arg<'_>],
    ) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        ArgSpec::parse(spec)?.check(args)?;
        self.call(module, callable, args)
    }

    /// 调用已有对象上的方法
    #[instrument(
        target = "embridge::bridge",
        skip(self, object, args),
        fields(receiver = object.type_name(), argc = args.len())
    )]
    pub fn call_method(
        &self,
        object: &Handle<'_>,
        method: &str,
        args: &[Arg<'_>],
    ) -> Result<Handle<'_>, BridgeError> {
        let runtime = self.runtime()?;
        let target = resolve_callable(runtime, object.value(), method, || {
            format!("'{}' object", object.type_name())
        })?;
        self.invoke(runtime, &target, args, || {
            format!("{}.{}", object.type_name(), method)
        })
    }

    /// 带参数描述串的 [`Session::call_method`]
    pub fn call_method_with_spec(
        &self,
        object: &Handle<'_>,
        method: &str,
        spec: &str,
        args: &[Arg<'_>],
    ) -> Result<Handle<'_>, BridgeError> {
        self.runtime()?;
        ArgSpec::parse(spec)?.check(args)?;
        self.call_method(object, method, args)
    }

    fn invoke(
        &self,
        runtime: &Runtime,
        target: &Value,
        args: &[Arg<'_>],
        describe: impl FnOnce() -> String,
    ) -> Result<Handle<'_>, BridgeError> {
        let argv: Vec<Value> = args.iter().map(|arg| arg.to_value()).collect();

        match runtime.call(target, &argv) {
            Ok(result) => {
                debug!(target: TARGET, result = result.type_name(), "call succeeded");
                Ok(Handle::new(self, result))
            }
            Err(exception) => {
                let target = describe();
                debug!(target: TARGET, callee = %target, error = %exception, "call failed");
                Err(BridgeError::InvocationFailed { target, exception })
            }
        }
    }
}

impl<'s> Handle<'s> {
    /// 在该句柄上调用方法
    pub fn call_method(&self, method: &str, args: &[Arg<'_>]) -> Result<Handle<'s>, BridgeError> {
        self.session().call_method(self, method, args)
    }

    pub fn call_method_with_spec(
        &self,
        method: &str,
        spec: &str,
        args: &[Arg<'_>],
    ) -> Result<Handle<'s>, BridgeError> {
        self.session().call_method_with_spec(self, method, spec, args)
    }
}

/// 解析可调用属性；属性缺失或不可调用都视为 `CallableNotFound`
fn resolve_callable(
    runtime: &Runtime,
    owner: &Value,
    name: &str,
    describe_owner: impl FnOnce() -> String,
) -> Result<Value, BridgeError> {
    match runtime.get_attr(owner, name) {
        Ok(value) if value.is_callable() => Ok(value),
        _ => Err(BridgeError::CallableNotFound {
            owner: describe_owner(),
            callable: name.to_string(),
        }),
    }
}
