//! Controller model.
//!
//! A controller is whatever the route table points dispatch at: a plain
//! function, a shared handler object, a registered controller type (looked
//! up by name, optionally bound to one of its actions), or a per-HTTP-method
//! table of any of those. [`ControllerRef`] is the tagged reference the
//! router stores; the dispatcher resolves it to something callable at
//! request time.
//!
//! Controllers receive the dispatcher handle and an [`Args`] bundle: the
//! positional values bound from their [`ParamSpec`] descriptors plus named
//! access to the merged route parameters.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::app::App;
use crate::core::{Params, Response};
use crate::signal::Signal;

/// Normalized controller result payload.
#[derive(Debug)]
pub enum Payload {
    /// A full response, flushed through the transport.
    Response(Response),
    /// A raw scalar, written directly as the whole body.
    Text(String),
    /// No output.
    Empty,
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        Payload::Response(response)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// What a controller invocation returns.
pub type ControllerResult = Result<Payload, Signal>;

/// How one positional controller argument is filled.
///
/// These descriptors replace signature reflection: whatever adapts a native
/// function into a controller states, per argument slot, which route
/// parameter feeds it and what happens when the parameter is absent.
#[derive(Clone, Debug)]
pub enum ParamSpec {
    /// Route parameter by name; binds `null` when absent.
    Named(&'static str),
    /// Route parameter by name with a declared default.
    NamedOr(&'static str, Value),
}

static NULL: Value = Value::Null;

/// Bound arguments handed to a controller invocation.
#[derive(Clone, Debug, Default)]
pub struct Args {
    values: Vec<Value>,
    params: Params,
}

impl Args {
    pub(crate) fn new(values: Vec<Value>, params: Params) -> Self {
        Self { values, params }
    }

    /// Positional bound value; `null` for out-of-range slots.
    #[inline]
    pub fn value(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    /// Number of positional values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether no positional values were bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merged route parameter by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Merged route parameter as a string slice.
    #[inline]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.params.str(name)
    }

    /// The full merged route parameter set.
    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Bind positional arguments from descriptors, then overlay forced values.
///
/// Forced values are keyed positionally to the same slots and always win;
/// a forced list longer than the descriptor list extends the arguments.
pub(crate) fn bind_args(specs: &[ParamSpec], params: &Params, forced: Option<&[Value]>) -> Args {
    let mut values: Vec<Value> = specs
        .iter()
        .map(|spec| match spec {
            ParamSpec::Named(name) => params.get(name).cloned().unwrap_or(Value::Null),
            ParamSpec::NamedOr(name, default) => {
                params.get(name).cloned().unwrap_or_else(|| default.clone())
            }
        })
        .collect();

    if let Some(forced) = forced {
        for (idx, value) in forced.iter().enumerate() {
            if idx < values.len() {
                values[idx] = value.clone();
            } else {
                values.push(value.clone());
            }
        }
    }

    Args::new(values, params.clone())
}

/// A directly invokable handler object.
pub trait Handler: Send + Sync {
    /// Parameter descriptors used to bind positional arguments.
    fn param_specs(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Handle the request.
    fn call(&self, app: &mut App, args: Args) -> ControllerResult;
}

/// A controller type registered by name on the dispatcher.
///
/// A fresh instance is constructed for every dispatch that resolves to it,
/// mirroring per-request controller objects.
pub trait Controller: Send + Sync {
    /// Invoke a named action. `None` when the action is unknown.
    fn action(&self, name: &str, app: &mut App, args: Args) -> Option<ControllerResult>;

    /// Whether the controller can be invoked without naming an action.
    fn is_invokable(&self) -> bool {
        false
    }

    /// Invoke the controller itself. Only consulted when
    /// [`is_invokable`](Self::is_invokable) returns true.
    fn invoke(&self, _app: &mut App, _args: Args) -> Option<ControllerResult> {
        None
    }

    /// Parameter descriptors for an action (`None` for direct invocation).
    fn param_specs(&self, _action: Option<&str>) -> Vec<ParamSpec> {
        Vec::new()
    }
}

/// Factory constructing a fresh controller instance per dispatch.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

type ControllerFn = dyn Fn(&mut App, Args) -> ControllerResult + Send + Sync;

/// A plain function controller with its parameter descriptors.
#[derive(Clone)]
pub struct FnController {
    func: Arc<ControllerFn>,
    specs: Vec<ParamSpec>,
}

impl FnController {
    /// Wrap a function or closure.
    pub fn new(func: impl Fn(&mut App, Args) -> ControllerResult + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
            specs: Vec::new(),
        }
    }

    /// Declare the parameter descriptors for positional binding.
    pub fn with_params(mut self, specs: Vec<ParamSpec>) -> Self {
        self.specs = specs;
        self
    }

    #[inline]
    pub(crate) fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    #[inline]
    pub(crate) fn invoke(&self, app: &mut App, args: Args) -> ControllerResult {
        (self.func)(app, args)
    }
}

impl fmt::Debug for FnController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnController")
            .field("specs", &self.specs)
            .finish_non_exhaustive()
    }
}

/// Polymorphic controller reference stored in route definitions.
#[derive(Clone)]
pub enum ControllerRef {
    /// Plain function or closure.
    Function(FnController),
    /// Shared handler object.
    Object(Arc<dyn Handler>),
    /// Registered controller, `"Type"` or `"Type:action"`.
    Named(String),
    /// Per-HTTP-method table, resolved recursively.
    ByMethod(Vec<(Method, ControllerRef)>),
}

impl ControllerRef {
    /// Reference a plain function with no parameter descriptors.
    pub fn from_fn(
        func: impl Fn(&mut App, Args) -> ControllerResult + Send + Sync + 'static,
    ) -> Self {
        ControllerRef::Function(FnController::new(func))
    }

    /// Reference a shared handler object.
    pub fn object(handler: impl Handler + 'static) -> Self {
        ControllerRef::Object(Arc::new(handler))
    }

    /// Reference a registered controller by name.
    pub fn named(name: impl Into<String>) -> Self {
        ControllerRef::Named(name.into())
    }

    /// Reference a per-HTTP-method table.
    pub fn by_method(entries: Vec<(Method, ControllerRef)>) -> Self {
        ControllerRef::ByMethod(entries)
    }
}

impl fmt::Debug for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerRef::Function(c) => f.debug_tuple("Function").field(c).finish(),
            ControllerRef::Object(_) => f.write_str("Object(..)"),
            ControllerRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ControllerRef::ByMethod(entries) => {
                let methods: Vec<&Method> = entries.iter().map(|(m, _)| m).collect();
                f.debug_tuple("ByMethod").field(&methods).finish()
            }
        }
    }
}

impl From<FnController> for ControllerRef {
    fn from(func: FnController) -> Self {
        ControllerRef::Function(func)
    }
}

/// A resolved, ready-to-invoke callable.
pub(crate) enum Callable {
    Function(FnController),
    Object(Arc<dyn Handler>),
    /// Bound action on a freshly constructed controller.
    Action(Box<dyn Controller>, String),
    /// Freshly constructed invokable controller.
    Instance(Box<dyn Controller>),
}

impl Callable {
    pub(crate) fn param_specs(&self) -> Vec<ParamSpec> {
        match self {
            Callable::Function(c) => c.specs().to_vec(),
            Callable::Object(h) => h.param_specs(),
            Callable::Action(c, action) => c.param_specs(Some(action)),
            Callable::Instance(c) => c.param_specs(None),
        }
    }

    pub(crate) fn invoke(self, app: &mut App, args: Args) -> ControllerResult {
        match self {
            Callable::Function(c) => c.invoke(app, args),
            Callable::Object(h) => h.call(app, args),
            Callable::Action(c, action) => c.action(&action, app, args).unwrap_or_else(|| {
                Err(Signal::Failure(crate::core::Error::Resolve(format!(
                    "controller action \"{}\" is not defined",
                    action
                ))))
            }),
            Callable::Instance(c) => c.invoke(app, args).unwrap_or_else(|| {
                Err(Signal::Failure(crate::core::Error::Resolve(
                    "controller is not invokable".to_string(),
                )))
            }),
        }
    }
}
