//! Embridge API - Native facade over the embedded runtime
//!
//! Provides the bridge between native callers and the dynamic runtime:
//! - Interpreter session lifecycle (`Session::start` / `Session::stop`)
//! - Module cache (each module imported at most once per session)
//! - Call bridge (`call`, `call_method`, optional argument spec strings)
//! - Converters (text / int / bool, `ValueList`, `ValueMap`)
//! - Unified error handling (`BridgeError`)
//!
//! Runtime values never leave this crate as raw runtime types: callers hold
//! [`Handle`]s, which borrow their session, so a session cannot be stopped
//! while any handle is still alive.
//!
//! # Example
//! ```
//! use embridge_api::{args, Session, SessionConfig, ValueList};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.start()?;
//! {
//!     let parts = session.call("std", "split", &args!["a,b,c", ","])?;
//!     let list = parts.to_value_list()?;
//!     assert_eq!(list, ["a", "b", "c"].into_iter().collect::<ValueList>());
//! }
//! session.stop();
//! # Ok::<(), embridge_api::BridgeError>(())
//! ```

mod args;
mod bridge;
mod cache;
mod convert;
mod facade;
mod handle;
mod session;
mod types;

pub mod config;
pub mod error;
pub mod logging;


pub use args::{Arg, ArgSpec, SpecChar};
pub use error::{BridgeError, ErrorReport, ExceptionReport};
pub use facade::Facade;
pub use handle::Handle;
pub use session::Session;
pub use types::{ValueList, ValueMap};

// Re-export config types from embridge_config
pub use embridge_config::{Layer, LogConfig, LogLevel, RuntimeOptions, SessionConfig};

// Re-export the runtime types needed to register native modules
pub use embridge_core::{
    Arity, ClassBuilder, Exception, ExceptionKind, ModuleBuilder, Registry,
};

/// Create a session from the global config and start it
///
/// For library use, prefer constructing a [`Session`] with an explicit config.
pub fn start_session(registry: Registry) -> Result<Session, BridgeError> {
    let mut session = Session::from_global(registry);
    session.start()?;
    Ok(session)
}
