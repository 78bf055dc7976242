//! frontline - Minimal front-controller web micro-framework.
//!
//! This crate maps an incoming HTTP request URL to a controller, invokes
//! it with resolved parameters, and converts the result into an HTTP
//! response.
//!
//! # Features
//!
//! - **Pattern Router**: `<name>` / `<name:regex>` placeholders compiled
//!   to anchored regular expressions, first-match-wins in declaration
//!   order, reverse URL generation by route name
//! - **Polymorphic Controllers**: plain functions, handler objects,
//!   registered controller actions, per-HTTP-method tables
//! - **Bounded Error Recovery**: abort/redirect signals as explicit
//!   result variants, one nested error-route attempt per failure, a
//!   single top-level safety net
//! - **Explicit Request Snapshots**: requests built from injected
//!   sources, no ambient process state
//!
//! # Example
//!
//! ```rust,ignore
//! use frontline::{App, ControllerRef, RouteDef, RouteTable, Router, Request};
//! use frontline::transport::stdout;
//!
//! let table = RouteTable::new()
//!     .route("/", RouteDef::new(ControllerRef::from_fn(|_, _| Ok("home".into()))))
//!     .route("/user/<id:\\d+>", RouteDef::new(ControllerRef::named("Users:show")).name("user"));
//!
//! let request = Request::builder().url("/user/42").build();
//! let mut app = App::new(Router::new(table), request);
//! app.run(&mut stdout());
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod config;
pub mod controller;
pub mod core;
pub mod logging;
pub mod routing;
pub mod signal;
pub mod transport;
pub mod view;

// Re-exports for convenience
pub use app::App;
pub use config::{Config, ConfigError};
pub use controller::{
    Args, Controller, ControllerRef, ControllerResult, FnController, Handler, ParamSpec, Payload,
};
pub use crate::core::{Error, Params, Request, RequestBuilder, Response, ResponseBuilder, Result};
pub use routing::{Route, RouteDef, RouteTable, Router, Routes};
pub use signal::{HttpError, Signal};
pub use transport::{BufferTransport, Transport, WireTransport};
