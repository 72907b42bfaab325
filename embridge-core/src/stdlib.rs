//! 标准库实现
//!
//! std 模块是 Rust 原生实现，通过 NativeFunction 包装暴露给运行时。
//! 扁平化设计：所有函数直接放在 std 下，不嵌套。

use crate::exception::{Exception, ExceptionKind};
use crate::object::Arity;
use crate::registry::{ModuleBuilder, Registry};
use crate::runtime::Runtime;
use crate::value::Value;

/// 注册 std 模块
pub fn register(registry: &mut Registry) {
    registry.register("std", build);
}

fn build(module: &mut ModuleBuilder) -> Result<(), Exception> {
    module
        .function("type", Arity::Fixed(1), type_fn)
        .function("to_string", Arity::Fixed(1), to_string_fn)
        .function("len", Arity::Fixed(1), len_fn)
        .function("keys", Arity::Fixed(1), keys_fn)
        .function("join", Arity::Fixed(2), join_fn)
        .function("split", Arity::Fixed(2), split_fn)
        .function("assert", Arity::Variadic, assert_fn);
    Ok(())
}

// ===== 核心函数实现 =====

fn type_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    Ok(Value::string(args[0].type_name()))
}

fn to_string_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    Ok(Value::string(&args[0].to_string()))
}

fn len_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    let len = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Dict(dict) => dict.borrow().len(),
        other => other.with_sequence(|items| items.len()).ok_or_else(|| {
            Exception::type_error(format!("object of type '{}' has no len()", other.type_name()))
        })?,
    };
    Ok(Value::Int(len as i64))
}

fn keys_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    match &args[0] {
        Value::Dict(dict) => Ok(Value::list(
            dict.borrow().iter().map(|(key, _)| key.to_value()).collect(),
        )),
        other => Err(Exception::type_error(format!(
            "keys() expects a dict, got '{}'",
            other.type_name()
        ))),
    }
}

// ===== 字符串函数实现 =====

fn join_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    let sep = args[0]
        .as_str()
        .ok_or_else(|| Exception::type_error("join() separator must be a string"))?;

    let parts = args[1]
        .with_sequence(|items| {
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Exception::type_error(format!(
                            "join() expects strings, found '{}'",
                            item.type_name()
                        ))
                    })
                })
                .collect::<Result<Vec<String>, Exception>>()
        })
        .ok_or_else(|| Exception::type_error("join() expects a list"))??;

    Ok(Value::string(&parts.join(sep)))
}

fn split_fn(_: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    match (args[0].as_str(), args[1].as_str()) {
        (Some(_), Some("")) => Err(Exception::value_error("empty separator")),
        (Some(text), Some(sep)) => Ok(Value::list(text.split(sep).map(Value::string).collect())),
        _ => Err(Exception::type_error("split() expects two strings")),
    }
}

fn assert_fn(rt: &Runtime, args: &[Value]) -> Result<Value, Exception> {
    let (cond, message) = match args {
        [cond] => (cond, "Assertion failed"),
        [cond, message] => (cond, message.as_str().unwrap_or("Assertion failed")),
        _ => {
            return Err(Exception::type_error(format!(
                "assert() takes 1 or 2 arguments ({} given)",
                args.len()
            )))
        }
    };

    if !rt.truthiness(cond)? {
        return Err(Exception::new(ExceptionKind::AssertionError, message));
    }
    Ok(Value::None)
}
