//! Core types for request/response handling.
//!
//! This module provides the value objects consumed by the router and the
//! dispatcher:
//!
//! - [`Params`] - named parameter container
//! - [`Request`] - read-only request snapshot, built from injected sources
//! - [`Response`] - HTTP response with builder pattern
//! - [`Error`] - core error types

mod error;
mod params;
mod request;
mod response;

pub use error::{Error, Result};
pub use params::{plain_str, Params};
pub use request::{parse_cookies, parse_query_string, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
