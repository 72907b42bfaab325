//! 测试辅助工具
//!
//! 提供端到端测试用的模块注册表：一个模拟的 overlay 管理包，
//! 包含配置对象、消息对象和仓库 API 对象，以及调用计数探针。

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use embridge::runtime::{Dict, Instance, Value};
use embridge::{Arity, ClassBuilder, Exception, Registry, Session, SessionConfig};

/// 同一进程最多一个活动会话，启动会话的测试持有此锁
static SESSION_LOCK: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    SESSION_LOCK.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// 已知的仓库
pub const REPOS: [&str; 3] = ["gentoo", "guru", "science"];

/// 调用计数探针
#[derive(Clone, Default)]
pub struct Probe {
    calls: Rc<Cell<usize>>,
}

impl Probe {
    pub fn hit(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

/// 构造测试注册表，所有原生函数共享同一个探针
pub fn overlay_registry(probe: &Probe) -> Registry {
    let mut registry = Registry::with_stdlib();

    let p = probe.clone();
    registry.register("overlay.config", move |m| {
        let p = p.clone();
        m.function("count_calls", Arity::Variadic, move |_, _| {
            p.hit();
            Ok(Value::None)
        })
        .class(config_class());
        Ok(())
    });

    registry.register("overlay.debug", |m| {
        m.class(message_class());
        Ok(())
    });

    registry.register("overlay.api", |m| {
        m.class(api_class());
        Ok(())
    });

    registry.register("overlay.broken", |_| {
        Err(Exception::runtime_error("package failed to initialize"))
    });

    registry
}

/// 启动一个使用测试注册表的会话
pub fn start_session(probe: &Probe) -> Session {
    embridge::logging::init_test_logger();
    let mut session = Session::with_registry(SessionConfig::default(), overlay_registry(probe));
    session.start().expect("session should start");
    session
}

// ==================== overlay.config ====================

fn defaults() -> Dict {
    let mut dict = Dict::new();
    dict.insert_str("storage", Value::string("/var/lib/overlays"));
    dict.insert_str("quietness", Value::string("4"));
    dict.insert_str("nocheck", Value::string("yes"));
    dict
}

/// `BareConfig(options)`：options 为 none 或 {str: str}
fn config_class() -> ClassBuilder {
    ClassBuilder::new("BareConfig")
        .method("__init__", Arity::Fixed(1), |_, this, args| {
            let mut options = defaults();
            match &args[0] {
                Value::None => {}
                Value::Dict(overrides) => {
                    for (key, value) in overrides.borrow().iter() {
                        options.insert(&key.to_value(), value.clone())?;
                    }
                }
                other => {
                    return Err(Exception::type_error(format!(
                        "options must be a dict, got '{}'",
                        other.type_name()
                    )))
                }
            }
            this.set("options", Value::dict(options));
            Ok(Value::None)
        })
        .method("get_option", Arity::Fixed(1), |_, this, args| {
            let key = args[0]
                .as_str()
                .ok_or_else(|| Exception::type_error("option name must be a string"))?;
            Ok(with_options(this, |options| {
                options.get_str(key).cloned().unwrap_or(Value::None)
            }))
        })
        .method("set_option", Arity::Fixed(2), |_, this, args| {
            let key = args[0]
                .as_str()
                .ok_or_else(|| Exception::type_error("option name must be a string"))?;
            if let Some(Value::Dict(options)) = this.get("options") {
                options.borrow_mut().insert_str(key, args[1].clone());
            }
            Ok(Value::Bool(true))
        })
        .method("get_defaults", Arity::Fixed(0), |_, _, _| Ok(Value::dict(defaults())))
        .method("keys", Arity::Fixed(0), |_, this, _| {
            Ok(with_options(this, |options| {
                Value::list(options.iter().map(|(key, _)| key.to_value()).collect())
            }))
        })
}

fn with_options(this: &Rc<Instance>, f: impl FnOnce(&Dict) -> Value) -> Value {
    match this.get("options") {
        Some(Value::Dict(options)) => f(&options.borrow()),
        _ => Value::None,
    }
}

// ==================== overlay.debug ====================

/// `Message(module, info_level, warn_level)`
fn message_class() -> ClassBuilder {
    ClassBuilder::new("Message")
        .method("__init__", Arity::Fixed(3), |_, this, args| {
            if args[0].as_str().is_none() {
                return Err(Exception::type_error("module name must be a string"));
            }
            this.set("module", args[0].clone());
            this.set("info_level", args[1].clone());
            this.set("warn_level", args[2].clone());
            this.set("color", Value::Bool(true));
            Ok(Value::None)
        })
        .method("set_info_level", Arity::Fixed(1), |_, this, args| {
            match args[0].as_int() {
                Some(level) if (0..=10).contains(&level) => {
                    this.set("info_level", Value::Int(level));
                    Ok(Value::Bool(true))
                }
                Some(_) => Ok(Value::Bool(false)),
                None => Err(Exception::type_error("level must be an int")),
            }
        })
        .method("get_info_level", Arity::Fixed(0), |_, this, _| {
            Ok(this.get("info_level").unwrap_or(Value::None))
        })
        .method("color_off", Arity::Fixed(0), |_, this, _| {
            this.set("color", Value::Bool(false));
            Ok(Value::None)
        })
        .method("has_color", Arity::Fixed(0), |_, this, _| {
            Ok(this.get("color").unwrap_or(Value::Bool(false)))
        })
}

// ==================== overlay.api ====================

/// `LayAPI(config, report_errors, output)`
fn api_class() -> ClassBuilder {
    let status = status_class().build();

    ClassBuilder::new("LayAPI")
        .method("__init__", Arity::Fixed(3), |_, this, args| {
            match &args[0] {
                Value::Instance(config) if config.class().name == "BareConfig" => {}
                other => {
                    return Err(Exception::type_error(format!(
                        "config must be a BareConfig, got '{}'",
                        other.type_name()
                    )))
                }
            }
            this.set("config", args[0].clone());
            this.set("installed", Value::list(vec![Value::string("gentoo")]));
            Ok(Value::None)
        })
        .method("is_repo", Arity::Fixed(1), |_, _, args| {
            let repo = args[0].as_str().unwrap_or_default();
            Ok(Value::Bool(REPOS.contains(&repo)))
        })
        .method("is_installed", Arity::Fixed(1), |_, this, args| {
            let repo = args[0].as_str().unwrap_or_default();
            let installed = match this.get("installed") {
                Some(Value::List(items)) => items
                    .borrow()
                    .iter()
                    .any(|item| item.as_str() == Some(repo)),
                _ => false,
            };
            Ok(Value::Bool(installed))
        })
        .method("get_available", Arity::Fixed(1), |_, _, _| {
            Ok(Value::list(REPOS.iter().map(|r| Value::string(r)).collect()))
        })
        .method("get_installed", Arity::Fixed(1), |_, this, _| {
            Ok(this.get("installed").unwrap_or_else(|| Value::list(vec![])))
        })
        .method("add_repos", Arity::Fixed(1), |_, this, args| {
            let Some(Value::List(installed)) = this.get("installed") else {
                return Ok(Value::Bool(false));
            };
            let added = args[0]
                .with_sequence(|repos| {
                    let mut added = 0;
                    for repo in repos {
                        let Some(name) = repo.as_str() else { continue };
                        if REPOS.contains(&name) {
                            installed.borrow_mut().push(Value::string(name));
                            added += 1;
                        }
                    }
                    added
                })
                .ok_or_else(|| Exception::type_error("add_repos() expects a list"))?;
            Ok(Value::Int(added))
        })
        .method("get_all_info", Arity::Fixed(1), |_, _, args| {
            let repo = args[0]
                .as_str()
                .ok_or_else(|| Exception::type_error("repo name must be a string"))?;
            if !REPOS.contains(&repo) {
                return Err(Exception::new(
                    embridge::ExceptionKind::KeyError,
                    format!("unknown repo '{}'", repo),
                ));
            }
            let mut info = Dict::new();
            info.insert_str("name", Value::string(repo));
            info.insert_str("owner_email", Value::string(&format!("{}@example.org", repo)));
            info.insert_str("quality", Value::string("stable"));
            Ok(Value::dict(info))
        })
        .method("get_info_counts", Arity::Fixed(0), |_, _, _| {
            // 值不是文本，不能转换为 ValueMap
            let mut info = Dict::new();
            info.insert_str("repos", Value::Int(REPOS.len() as i64));
            Ok(Value::dict(info))
        })
        .method("sync", Arity::Fixed(2), move |rt, _, args| {
            let repo = args[0].as_str().unwrap_or_default();
            let outcome = match repo {
                "flaky" => Value::string("unknown"),
                other => Value::Bool(REPOS.contains(&other)),
            };
            rt.call(&Value::Class(Rc::clone(&status)), &[outcome])
        })
}

/// `SyncStatus(outcome)`：`__bool__` 只有在 outcome 为布尔值时才有明确结果
fn status_class() -> ClassBuilder {
    ClassBuilder::new("SyncStatus")
        .method("__init__", Arity::Fixed(1), |_, this, args| {
            this.set("outcome", args[0].clone());
            Ok(Value::None)
        })
        .method("__bool__", Arity::Fixed(0), |_, this, _| {
            Ok(this.get("outcome").unwrap_or(Value::None))
        })
}
