//! Embridge Core - Embedded dynamic runtime
//!
//! Hosts the dynamic-language side of the bridge: reference-counted values,
//! modules built by native initializers, classes and instances, invocation
//! with arity checks, and the truthiness protocol.
//!
//! Everything here is runtime-specific. The API crate wraps these types so
//! native callers only ever see owned handles and plain Rust data.
//!
//! # Example
//! ```
//! use embridge_core::{Arity, Registry, Runtime, Value};
//! use embridge_config::RuntimeOptions;
//!
//! let mut registry = Registry::with_stdlib();
//! registry.register("greet", |m| {
//!     m.function("hello", Arity::Fixed(1), |_, args| {
//!         Ok(Value::string(&format!("hello {}", args[0])))
//!     });
//!     Ok(())
//! });
//!
//! let rt = Runtime::initialize(registry, RuntimeOptions::default()).unwrap();
//! let module = rt.import("greet").unwrap();
//! let out = rt.call_method(&module, "hello", &[Value::string("world")]).unwrap();
//! assert_eq!(out.as_str(), Some("hello world"));
//! ```

pub mod exception;
pub mod object;
pub mod registry;
pub mod runtime;
pub mod stdlib;
pub mod value;

// Re-export common types
pub use exception::{Exception, ExceptionKind, RuntimeError};
pub use object::{Arity, BoundMethod, Class, Instance, Module, NativeFunction, NativeMethod};
pub use registry::{ClassBuilder, ModuleBuilder, Registry};
pub use runtime::Runtime;
pub use value::{Dict, HashKey, Value};

// Re-export config types from embridge-config
pub use embridge_config::RuntimeOptions;
