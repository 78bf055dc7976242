//! URL routing.
//!
//! - [`RouteTable`] - ordered pattern table (declaration order is the
//!   matching contract)
//! - [`Router`] - compiles patterns, matches URLs, builds URLs by name
//! - [`Route`] - the resolved result handed to the dispatcher

mod route;
mod router;

pub use route::{Route, RouteDef, RouteTable};
pub use router::{params_from, Router, Routes, ERROR_ROUTE_NAME};
