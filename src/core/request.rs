//! HTTP request snapshot for one dispatch lifecycle.
//!
//! A `Request` is built explicitly from injected sources via
//! [`RequestBuilder`] (the framework never reads ambient process state)
//! and is treated as read-only for the duration of a dispatch.

use std::borrow::Cow;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};

use super::params::Params;

/// Lazily initialized custom header name.
static X_REQUESTED_WITH: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-requested-with"));

/// HTTP request snapshot.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
/// The dispatcher holds exactly one instance per run.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    query: Params,
    post: Params,
    cookies: Params,
    files: Params,
    secure: bool,
}

impl Request {
    /// Create a new request builder.
    #[inline]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Get the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the raw query string.
    #[inline]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get the full URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query parameters.
    #[inline]
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// Form (post) parameters.
    #[inline]
    pub fn post(&self) -> &Params {
        &self.post
    }

    /// Cookie parameters.
    #[inline]
    pub fn cookies(&self) -> &Params {
        &self.cookies
    }

    /// Uploaded file parameters.
    #[inline]
    pub fn files(&self) -> &Params {
        &self.files
    }

    /// Get the raw request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the hostname, from the Host header or the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri.host())
    }

    /// Check whether the request arrived over a secure channel.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure || self.uri.scheme_str() == Some("https")
    }

    /// Get the requested URL scheme.
    #[inline]
    pub fn scheme(&self) -> &str {
        if self.is_secure() {
            "https"
        } else {
            "http"
        }
    }

    /// Get the requested URL, relative by default or absolute when `full`.
    pub fn url(&self, full: bool) -> String {
        let relative = self
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| "/".to_string());

        if full {
            if let Some(host) = self.host() {
                return format!("{}://{}{}", self.scheme(), host, relative);
            }
        }
        relative
    }

    /// Get the referring URL.
    #[inline]
    pub fn referer(&self) -> Option<&str> {
        self.headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
    }

    /// Check if this is a GET request.
    #[inline]
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Check if this is a POST request.
    #[inline]
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Check if this is an ajax request.
    #[inline]
    pub fn is_xml_http_request(&self) -> bool {
        self.headers
            .get(&*X_REQUESTED_WITH)
            .and_then(|v| v.to_str().ok())
            == Some("XMLHttpRequest")
    }
}

impl Default for Request {
    fn default() -> Self {
        Request::builder().build()
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        RequestBuilder {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
            post: Params::new(),
            cookies: None,
            files: Params::new(),
            secure: false,
        }
        .build()
    }
}

/// Builder assembling a [`Request`] from injected sources.
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    post: Params,
    cookies: Option<Params>,
    files: Params,
    secure: bool,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a builder for a GET request to `/`.
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::from_static("/"),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            post: Params::new(),
            cookies: None,
            files: Params::new(),
            secure: false,
        }
    }

    /// Set the HTTP method.
    #[inline]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request URI. An unparseable value is ignored.
    pub fn url(mut self, url: &str) -> Self {
        if let Ok(uri) = url.parse::<Uri>() {
            self.uri = uri;
        }
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            http::HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the raw request body.
    #[inline]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a form (post) parameter.
    pub fn form(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.post.set(name, value);
        self
    }

    /// Add a cookie, overriding any value parsed from the Cookie header.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.cookies
            .get_or_insert_with(Params::new)
            .set(name, value);
        self
    }

    /// Add an uploaded-file parameter.
    pub fn file(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.files.set(name, value);
        self
    }

    /// Mark the request as arriving over a secure channel.
    #[inline]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Build the request, parsing query and cookie sources.
    pub fn build(self) -> Request {
        let query = self
            .uri
            .query()
            .map(parse_query_string)
            .unwrap_or_default();

        let mut cookies = self
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(parse_cookies)
            .unwrap_or_default();
        if let Some(explicit) = self.cookies {
            cookies.extend_from(&explicit);
        }

        Request {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            query,
            post: self.post,
            cookies,
            files: self.files,
            secure: self.secure,
        }
    }
}

/// Percent decode, avoiding work when no escapes are present.
#[inline]
fn decode(s: &str) -> Cow<'_, str> {
    if s.contains('%') {
        Cow::Owned(
            percent_encoding::percent_decode_str(s)
                .decode_utf8_lossy()
                .into_owned(),
        )
    } else {
        Cow::Borrowed(s)
    }
}

/// Parse a query string into decoded parameters.
pub fn parse_query_string(query: &str) -> Params {
    let mut params = Params::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        if !key.is_empty() {
            params.set(decode(key).into_owned(), decode(value).into_owned());
        }
    }

    params
}

/// Parse a Cookie header into name-value parameters.
pub fn parse_cookies(cookie_header: &str) -> Params {
    let mut cookies = Params::new();

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if cookie.is_empty() {
            continue;
        }

        let (name, value) = match cookie.find('=') {
            Some(pos) => (cookie[..pos].trim(), cookie[pos + 1..].trim()),
            None => continue,
        };

        if !name.is_empty() {
            cookies.set(name, decode(value).into_owned());
        }
    }

    cookies
}
