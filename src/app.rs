//! Application dispatcher.
//!
//! `App` orchestrates one request lifecycle: resolve the route, resolve a
//! callable from its controller reference, bind arguments, invoke, and
//! normalize the result into a response. Abort and redirect signals are
//! recovered here; ordinary failures get exactly one nested error-route
//! attempt before propagating to the top-level safety net in [`App::run`].
//!
//! Each request gets its own `App` instance; the current-route field and
//! the request snapshot are per-instance state, never process-wide.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::controller::{
    bind_args, Args, Callable, Controller, ControllerFactory, ControllerRef, ControllerResult,
    FnController, Payload,
};
use crate::core::{Error, Params, Request, Response, Result};
use crate::routing::{Route, Routes};
use crate::signal::{failure_value, HttpError, Signal};
use crate::transport::Transport;
use crate::view;

/// Per-request dispatcher.
pub struct App {
    router: Box<dyn Routes>,
    request: Request,
    container: Option<Box<dyn Any + Send + Sync>>,
    registry: HashMap<String, ControllerFactory>,
    current_route: Option<Route>,
    debug: bool,
}

impl App {
    /// Create a dispatcher for one request.
    pub fn new(router: impl Routes + 'static, request: Request) -> Self {
        Self {
            router: Box::new(router),
            request,
            container: None,
            registry: HashMap::new(),
            current_route: None,
            debug: false,
        }
    }

    /// Enable debug output in failure reports.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Whether debug output is enabled.
    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The current request snapshot.
    #[inline]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Name of the most recently entered route.
    pub fn route_name(&self) -> Option<&str> {
        self.current_route.as_ref().and_then(|r| r.name.as_deref())
    }

    /// Store an opaque caller-supplied context object. The framework
    /// passes it through without interpreting it.
    pub fn set_container<T: Any + Send + Sync>(&mut self, container: T) {
        self.container = Some(Box::new(container));
    }

    /// Borrow the container, if one of the requested type was stored.
    pub fn container<T: Any>(&self) -> Option<&T> {
        self.container.as_ref().and_then(|c| c.downcast_ref())
    }

    /// Register a controller type under a name, for `Named` references.
    ///
    /// The factory runs once per dispatch that resolves to this name, so
    /// every request sees a fresh instance.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    ) {
        self.registry.insert(name.into(), Arc::new(factory));
    }

    /// Execute the request lifecycle and emit the outcome.
    ///
    /// This is the single outermost safety net: any failure still
    /// unhandled here becomes a generic 500 failure report.
    pub fn run(&mut self, transport: &mut dyn Transport) {
        let url = self.request.url(true);
        let route = self.router.parse_url(&url);

        match self.execute_route(route, None, false) {
            Ok(Payload::Response(response)) => response.flush(transport),
            Ok(Payload::Text(text)) => transport.send_body(text.as_bytes()),
            Ok(Payload::Empty) => {}
            Err(err) => self.failure_report(&err, transport),
        }
    }

    /// The execution algorithm.
    ///
    /// `forced` values override bound arguments positionally. `rethrow`
    /// bounds recovery: once the error route is executing for an ordinary
    /// failure, a second failure propagates instead of recursing again.
    fn execute_route(
        &mut self,
        route: Option<Route>,
        forced: Option<Vec<Value>>,
        rethrow: bool,
    ) -> Result<Payload> {
        match self.invoke_route(route, forced) {
            Ok(payload) => Ok(payload),

            Err(Signal::Redirect { url, status }) => {
                debug!(url, status = status.as_u16(), "redirect signal");
                Ok(Payload::Response(Response::redirect(&url, status)))
            }

            Err(Signal::Abort(err)) => {
                debug!(status = err.status().as_u16(), "recovering via error route");
                let forced = vec![err.as_value(), Value::from(err.status().as_u16())];
                let payload = self.execute_route(Some(self.error_route()), Some(forced), false)?;

                let mut response = match payload {
                    Payload::Response(response) => response,
                    Payload::Text(text) => {
                        Response::builder().status(err.status()).body(text).build()
                    }
                    Payload::Empty => Response::empty(err.status()),
                };
                for (name, value) in err.headers().iter() {
                    response.headers_mut().insert(name.clone(), value.clone());
                }
                Ok(Payload::Response(response))
            }

            Err(Signal::Failure(err)) => {
                if rethrow {
                    return Err(err);
                }
                warn!(error = %err, "controller failed, recovering via error route");
                let forced = vec![failure_value(&err), Value::from(500u16)];
                self.execute_route(Some(self.error_route()), Some(forced), true)
            }
        }
    }

    /// Steps 1-5: route check, current-route recording, resolution,
    /// binding, invocation.
    fn invoke_route(
        &mut self,
        route: Option<Route>,
        forced: Option<Vec<Value>>,
    ) -> ControllerResult {
        let route = match route {
            Some(route) => route,
            None => return Err(Signal::not_found("no route matched the requested url")),
        };

        self.current_route = Some(route.clone());

        let callable = route
            .controller
            .as_ref()
            .and_then(|c| self.resolve_controller(c));
        let callable = match callable {
            Some(callable) => callable,
            None => {
                return Err(Signal::not_found(format!(
                    "no controller found for route \"{}\"",
                    route.name.as_deref().unwrap_or("")
                )))
            }
        };

        let specs = callable.param_specs();
        let args = bind_args(&specs, &route.params, forced.as_deref());
        callable.invoke(self, args)
    }

    /// Resolve a controller reference to a callable.
    fn resolve_controller(&self, controller: &ControllerRef) -> Option<Callable> {
        match controller {
            ControllerRef::Function(func) => Some(Callable::Function(func.clone())),

            ControllerRef::Object(handler) => Some(Callable::Object(Arc::clone(handler))),

            ControllerRef::Named(name) => {
                if let Some((type_name, action)) = name.split_once(':') {
                    let factory = match self.registry.get(type_name) {
                        Some(factory) => factory,
                        None => {
                            debug!(controller = type_name, "controller type is not registered");
                            return None;
                        }
                    };
                    Some(Callable::Action(factory(), action.to_string()))
                } else {
                    let factory = self.registry.get(name.as_str())?;
                    let instance = factory();
                    if instance.is_invokable() {
                        Some(Callable::Instance(instance))
                    } else {
                        debug!(controller = name.as_str(), "controller is not invokable");
                        None
                    }
                }
            }

            ControllerRef::ByMethod(entries) => {
                let method = self.request.method();
                let inner = entries.iter().find(|(m, _)| m == method).map(|(_, c)| c)?;
                self.resolve_controller(inner)
            }
        }
    }

    /// The error route, with the built-in fallback handler patched in when
    /// no error controller is configured.
    fn error_route(&self) -> Route {
        let mut route = self.router.error_route();
        if route.controller.is_none() {
            route.controller = Some(ControllerRef::Function(FnController::new(
                builtin_error_controller,
            )));
        }
        route
    }

    /// Top-level failure report: minimal body, details only in debug mode.
    fn failure_report(&self, err: &Error, transport: &mut dyn Transport) {
        error!(error = %err, "unrecovered dispatch failure");

        if !transport.sent() {
            transport.send_status(StatusCode::INTERNAL_SERVER_ERROR);
        }

        let mut body = String::from("Error 500");
        if self.debug {
            body.push_str("\n\n");
            body.push_str(&err.detail());
        }
        transport.send_body(body.as_bytes());
    }

    // ------------------------------------------------------------------
    // Operations surfaced to controller code
    // ------------------------------------------------------------------

    /// Signal an HTTP error outcome.
    ///
    /// For header overlays or an application error code, build an
    /// [`HttpError`] and convert it into a signal instead.
    pub fn abort(&self, status: StatusCode, message: &str) -> Signal {
        Signal::Abort(HttpError::new(status).with_message(message))
    }

    /// Signal a redirect to another URL (302).
    pub fn redirect(&self, url: &str) -> Signal {
        Signal::redirect(url)
    }

    /// Signal a redirect with an explicit status.
    pub fn redirect_with(&self, url: &str, status: StatusCode) -> Signal {
        Signal::redirect_with(url, status)
    }

    /// Build a JSON response from a serializable value.
    pub fn json<T: Serialize>(&self, data: &T, status: StatusCode) -> Result<Response> {
        let body = serde_json::to_vec(data)?;
        Ok(Response::builder().status(status).json().body(body).build())
    }

    /// Build a URL by route name. The absolute form is prefixed with
    /// `scheme://host` from the current request when the host is known.
    pub fn build_url(&self, name: &str, params: &Params, absolute: bool) -> Option<String> {
        let url = self.router.build_url(name, params)?;
        if absolute {
            if let Some(host) = self.request.host() {
                return Some(format!("{}://{}{}", self.request.scheme(), host, url));
            }
        }
        Some(url)
    }

    /// Render a view file with a named-variable data mapping.
    pub fn render(&self, path: impl AsRef<Path>, data: &Params) -> Result<String> {
        view::render(path, data)
    }
}

/// Built-in fallback error controller.
///
/// Receives the forced `(signal value, status)` arguments and produces the
/// minimal failure body, with the signal's message and detail appended in
/// debug mode.
fn builtin_error_controller(app: &mut App, args: Args) -> ControllerResult {
    let status = args.value(1).as_u64().unwrap_or(500) as u16;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = format!("Error {}", status.as_u16());
    if app.debug() {
        if let Some(detail) = args.value(0).get("detail").and_then(Value::as_str) {
            body.push_str("\n\n");
            body.push_str(detail);
        } else if let Some(message) = args.value(0).get("message").and_then(Value::as_str) {
            body.push_str("\n\n");
            body.push_str(message);
        }
    }

    Ok(Payload::Response(
        Response::builder().status(status).body(body).build(),
    ))
}
