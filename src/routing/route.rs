//! Route records and the route table.

use serde_json::Value;

use crate::controller::ControllerRef;
use crate::core::Params;

/// A resolved route: name, controller reference, parameter set.
///
/// Routes are created fresh from a table entry on every lookup and are not
/// mutated after being returned, with one exception: the dispatcher patches
/// its built-in fallback handler onto the error route when no error
/// controller was configured.
#[derive(Clone, Debug)]
pub struct Route {
    /// Route name, used for reverse lookup.
    pub name: Option<String>,
    /// Controller reference. `None` only on the error-route placeholder.
    pub controller: Option<ControllerRef>,
    /// Default params merged with values captured from the URL.
    pub params: Params,
}

impl Route {
    /// Create a route with a controller and no name or params.
    pub fn new(controller: ControllerRef) -> Self {
        Self {
            name: None,
            controller: Some(controller),
            params: Params::new(),
        }
    }
}

/// A route table entry: controller plus optional name and default params.
#[derive(Clone, Debug)]
pub struct RouteDef {
    controller: ControllerRef,
    name: Option<String>,
    params: Params,
}

impl RouteDef {
    /// Create a definition for a controller.
    pub fn new(controller: ControllerRef) -> Self {
        Self {
            controller,
            name: None,
            params: Params::new(),
        }
    }

    /// Name the route for reverse lookup.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a default (injected) parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.set(name, value);
        self
    }

    /// The route name, if any.
    #[inline]
    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The default params.
    #[inline]
    pub fn default_params(&self) -> &Params {
        &self.params
    }

    /// Materialize a fresh [`Route`] from this definition.
    pub fn to_route(&self) -> Route {
        Route {
            name: self.name.clone(),
            controller: Some(self.controller.clone()),
            params: self.params.clone(),
        }
    }
}

/// Ordered table of URL patterns and their route definitions.
///
/// Matching is strictly first-match-wins in declaration order: there is no
/// scoring, longest-match, or static-route priority. The order routes are
/// declared in is part of the caller's contract.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<(String, RouteDef)>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a pattern and its definition.
    ///
    /// Patterns contain literal text plus placeholders `<name>` (one or
    /// more non-slash characters) or `<name:regex>`.
    pub fn route(mut self, pattern: impl Into<String>, def: RouteDef) -> Self {
        self.entries.push((pattern.into(), def));
        self
    }

    /// Iterate entries in declaration order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteDef)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerRef, Payload};
    use serde_json::json;

    fn noop() -> ControllerRef {
        ControllerRef::from_fn(|_, _| Ok(Payload::Empty))
    }

    #[test]
    fn test_route_def_to_route_is_fresh() {
        let def = RouteDef::new(noop()).name("home").param("layout", "wide");

        let a = def.to_route();
        let mut b = def.to_route();
        b.params.set("layout", "narrow");

        // mutating one materialized route must not affect the next
        assert_eq!(a.params.str("layout"), Some("wide"));
        assert_eq!(def.default_params().get("layout"), Some(&json!("wide")));
        assert_eq!(a.name.as_deref(), Some("home"));
        assert!(a.controller.is_some());
    }

    #[test]
    fn test_table_preserves_declaration_order() {
        let table = RouteTable::new()
            .route("/b", RouteDef::new(noop()).name("b"))
            .route("/a", RouteDef::new(noop()).name("a"));

        let order: Vec<&str> = table.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec!["/b", "/a"]);
        assert_eq!(table.len(), 2);
    }
}
