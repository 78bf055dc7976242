//! Pattern-based URL router.
//!
//! Patterns are compiled to anchored regular expressions at lookup time.
//! A placeholder `<name>` matches one or more non-slash characters; a
//! placeholder `<name:regex>` matches the given regex, with literal `(`
//! rewritten to `(?:` so user constraints cannot shift capture-group
//! indexing.

use std::sync::LazyLock;

use http::Uri;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::route::{Route, RouteTable};
use crate::controller::ControllerRef;
use crate::core::{plain_str, Params};

/// Name carried by the synthetic error route.
pub const ERROR_ROUTE_NAME: &str = "error";

/// Placeholder token: `<name>` or `<name:regex>` (regex may not contain `>`).
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(\w+)(?::([^>]*))?>").expect("placeholder pattern"));

/// Router seam between the dispatcher and a route-table implementation.
pub trait Routes {
    /// Parse a URL and return its route, or `None` when nothing matches.
    fn parse_url(&self, url: &str) -> Option<Route>;

    /// Build a URL by route name, or `None` when no entry is satisfiable.
    fn build_url(&self, name: &str, params: &Params) -> Option<String>;

    /// Get the route used for error recovery.
    fn error_route(&self) -> Route;
}

/// Table-driven router with first-match-wins semantics.
#[derive(Clone, Debug, Default)]
pub struct Router {
    table: RouteTable,
    error_controller: Option<ControllerRef>,
    base_url: Option<String>,
}

impl Router {
    /// Create a router over a route table.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            error_controller: None,
            base_url: None,
        }
    }

    /// Set the controller invoked by the error route. Without one the
    /// dispatcher falls back to its built-in failure report.
    pub fn with_error_controller(mut self, controller: ControllerRef) -> Self {
        self.error_controller = Some(controller);
        self
    }

    /// Set the base path prepended to every pattern (no trailing slash).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Compile one pattern into anchored regex source plus placeholder
    /// names in capture order.
    fn compile(&self, pattern: &str) -> (String, Vec<String>) {
        let mut source = String::from("^");
        if let Some(base) = &self.base_url {
            source.push_str(&regex::escape(base));
        }

        let mut names = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(pattern) {
            let token = caps.get(0).expect("match");
            source.push_str(&regex::escape(&pattern[last..token.start()]));

            names.push(caps[1].to_string());
            let constraint = match caps.get(2) {
                Some(c) => c.as_str().replace('(', "(?:"),
                None => String::from("[^/]+"),
            };
            source.push('(');
            source.push_str(&constraint);
            source.push(')');

            last = token.end();
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push_str("/?$");

        (source, names)
    }
}

impl Routes for Router {
    fn parse_url(&self, url: &str) -> Option<Route> {
        let path = normalize_path(url);

        for (pattern, def) in self.table.iter() {
            let (source, names) = self.compile(pattern);
            let matcher = match Regex::new(&source) {
                Ok(m) => m,
                Err(e) => {
                    warn!(pattern, error = %e, "skipping route with invalid constraint");
                    continue;
                }
            };

            if let Some(caps) = matcher.captures(&path) {
                let mut route = def.to_route();
                for (idx, name) in names.iter().enumerate() {
                    if let Some(m) = caps.get(idx + 1) {
                        // captured values overwrite same-named defaults
                        route.params.set(name.clone(), m.as_str());
                    }
                }
                debug!(pattern, route = route.name.as_deref().unwrap_or(""), "route matched");
                return Some(route);
            }
        }

        None
    }

    fn build_url(&self, name: &str, params: &Params) -> Option<String> {
        'entries: for (pattern, def) in self.table.iter() {
            if def.route_name() != Some(name) {
                continue;
            }

            // fixed default params act as a matching filter
            for (key, value) in params.iter() {
                if let Some(fixed) = def.default_params().get(key) {
                    if fixed != value {
                        continue 'entries;
                    }
                }
            }

            let mut url = String::new();
            let mut last = 0;
            for caps in PLACEHOLDER.captures_iter(pattern) {
                let token = caps.get(0).expect("match");
                url.push_str(&pattern[last..token.start()]);

                let value = match params.get(&caps[1]) {
                    Some(v) => plain_str(v),
                    None => continue 'entries,
                };
                if let Some(constraint) = caps.get(2).filter(|c| !c.as_str().is_empty()) {
                    match Regex::new(&format!("^{}$", constraint.as_str())) {
                        Ok(re) if re.is_match(&value) => {}
                        _ => continue 'entries,
                    }
                }
                url.push_str(&value);

                last = token.end();
            }
            url.push_str(&pattern[last..]);

            let mut full = match &self.base_url {
                Some(base) => format!("{}{}", base, url),
                None => url,
            };
            if full != "/" {
                full = collapse_slashes(&full);
                full.truncate(full.trim_end_matches('/').len());
                if full.is_empty() {
                    full.push('/');
                }
            }
            return Some(full);
        }

        None
    }

    fn error_route(&self) -> Route {
        Route {
            name: Some(ERROR_ROUTE_NAME.to_string()),
            controller: self.error_controller.clone(),
            params: Params::new(),
        }
    }
}

/// Reduce a URL to its path, with non-root trailing slashes stripped.
fn normalize_path(url: &str) -> String {
    let path = url
        .parse::<Uri>()
        .ok()
        .map(|uri| uri.path().to_string())
        .unwrap_or_default();

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collapse runs of slashes left behind by substitution.
fn collapse_slashes(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut prev_slash = false;
    for ch in url.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(ch);
    }
    out
}

/// Convenience conversion so route params can be supplied as pairs.
pub fn params_from<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Payload;
    use crate::routing::route::RouteDef;
    use serde_json::json;

    fn noop() -> ControllerRef {
        ControllerRef::from_fn(|_, _| Ok(Payload::Empty))
    }

    fn router(table: RouteTable) -> Router {
        Router::new(table)
    }

    // ========================================
    // parse_url
    // ========================================

    #[test]
    fn test_parse_static_pattern() {
        let r = router(
            RouteTable::new()
                .route("/", RouteDef::new(noop()).name("home"))
                .route("/about", RouteDef::new(noop()).name("about")),
        );

        let route = r.parse_url("/about").unwrap();
        assert_eq!(route.name.as_deref(), Some("about"));
        assert!(route.params.is_empty());

        let root = r.parse_url("/").unwrap();
        assert_eq!(root.name.as_deref(), Some("home"));
    }

    #[test]
    fn test_parse_extracts_placeholder() {
        let r = router(RouteTable::new().route("/test-<id>", RouteDef::new(noop()).name("t")));

        let route = r.parse_url("/test-123").unwrap();
        assert_eq!(route.params.str("id"), Some("123"));
    }

    #[test]
    fn test_parse_multiple_placeholders_in_order() {
        let r = router(
            RouteTable::new().route("/<section>/<slug>", RouteDef::new(noop()).name("page")),
        );

        let route = r.parse_url("/news/launch-day").unwrap();
        assert_eq!(route.params.str("section"), Some("news"));
        assert_eq!(route.params.str("slug"), Some("launch-day"));
    }

    #[test]
    fn test_constrained_placeholder_rejects() {
        let r = router(
            RouteTable::new().route("/help/<name:[a-z]+>", RouteDef::new(noop()).name("help")),
        );

        assert!(r.parse_url("/help/topic").is_some());
        // digits must fall through to no match
        assert!(r.parse_url("/help/1").is_none());
    }

    #[test]
    fn test_constraint_parens_rewritten_non_capturing() {
        let r = router(RouteTable::new().route(
            "/file/<name:([a-z]+)\\.(txt|md)>/<rev>",
            RouteDef::new(noop()).name("file"),
        ));

        let route = r.parse_url("/file/notes.txt/7").unwrap();
        // groups inside the constraint must not shift later captures
        assert_eq!(route.params.str("name"), Some("notes.txt"));
        assert_eq!(route.params.str("rev"), Some("7"));
    }

    #[test]
    fn test_first_match_wins_in_declaration_order() {
        let r = router(
            RouteTable::new()
                .route("/item/<id>", RouteDef::new(noop()).name("generic"))
                .route("/item/special", RouteDef::new(noop()).name("special")),
        );

        // the later, more specific entry never gets a chance
        let route = r.parse_url("/item/special").unwrap();
        assert_eq!(route.name.as_deref(), Some("generic"));
    }

    #[test]
    fn test_placeholder_does_not_cross_slash() {
        let r = router(RouteTable::new().route("/item/<id>", RouteDef::new(noop()).name("item")));
        assert!(r.parse_url("/item/1/extra").is_none());
    }

    #[test]
    fn test_trailing_slash_tolerated() {
        let r = router(RouteTable::new().route("/about", RouteDef::new(noop()).name("about")));

        assert!(r.parse_url("/about/").is_some());
        assert!(r.parse_url("/about///").is_some());
    }

    #[test]
    fn test_full_url_reduced_to_path() {
        let r = router(RouteTable::new().route("/about", RouteDef::new(noop()).name("about")));

        assert!(r.parse_url("http://example.test/about?tab=team").is_some());
    }

    #[test]
    fn test_no_match_returns_none() {
        let r = router(RouteTable::new().route("/only", RouteDef::new(noop())));
        assert!(r.parse_url("/other").is_none());
    }

    #[test]
    fn test_captured_value_overrides_default_param() {
        let r = router(RouteTable::new().route(
            "/post/<id>",
            RouteDef::new(noop()).name("post").param("id", "default").param("foo", "bar"),
        ));

        let route = r.parse_url("/post/42").unwrap();
        assert_eq!(route.params.str("id"), Some("42"));
        assert_eq!(route.params.str("foo"), Some("bar"));
    }

    #[test]
    fn test_base_url_prefix_required() {
        let r = router(RouteTable::new().route("/admin", RouteDef::new(noop()).name("admin")))
            .with_base_url("/app");

        assert!(r.parse_url("/app/admin").is_some());
        assert!(r.parse_url("/admin").is_none());
    }

    #[test]
    fn test_invalid_constraint_skipped() {
        let r = router(
            RouteTable::new()
                .route("/bad/<x:[unclosed>", RouteDef::new(noop()).name("bad"))
                .route("/bad/<x>", RouteDef::new(noop()).name("good")),
        );

        let route = r.parse_url("/bad/value").unwrap();
        assert_eq!(route.name.as_deref(), Some("good"));
    }

    // ========================================
    // build_url
    // ========================================

    #[test]
    fn test_build_url_substitutes_placeholder() {
        let r = router(RouteTable::new().route("/test/<id>", RouteDef::new(noop()).name("test")));

        let url = r.build_url("test", &params_from([("id", json!(123))]));
        assert_eq!(url.as_deref(), Some("/test/123"));
    }

    #[test]
    fn test_build_url_round_trip() {
        let r = router(RouteTable::new().route("/test/<id>", RouteDef::new(noop()).name("test")));

        let url = r.build_url("test", &params_from([("id", json!(123))])).unwrap();
        let route = r.parse_url(&url).unwrap();
        assert_eq!(route.params.str("id"), Some("123"));
    }

    #[test]
    fn test_build_url_static_pattern() {
        let r = router(RouteTable::new().route("/about", RouteDef::new(noop()).name("about")));
        assert_eq!(r.build_url("about", &Params::new()).as_deref(), Some("/about"));
    }

    #[test]
    fn test_build_url_unknown_name() {
        let r = router(RouteTable::new().route("/about", RouteDef::new(noop()).name("about")));
        assert!(r.build_url("missing", &Params::new()).is_none());
    }

    #[test]
    fn test_build_url_missing_placeholder_value() {
        let r = router(RouteTable::new().route("/test/<id>", RouteDef::new(noop()).name("test")));
        assert!(r.build_url("test", &Params::new()).is_none());
    }

    #[test]
    fn test_build_url_constraint_enforced() {
        let r = router(
            RouteTable::new().route("/help/<name:[a-z]+>", RouteDef::new(noop()).name("help")),
        );

        assert_eq!(
            r.build_url("help", &params_from([("name", json!("topic"))])).as_deref(),
            Some("/help/topic")
        );
        assert!(r.build_url("help", &params_from([("name", json!("topic1"))])).is_none());
    }

    #[test]
    fn test_build_url_fixed_params_filter() {
        let r = router(
            RouteTable::new()
                .route(
                    "/feed",
                    RouteDef::new(noop()).name("feed").param("format", "rss"),
                )
                .route(
                    "/feed.atom",
                    RouteDef::new(noop()).name("feed").param("format", "atom"),
                ),
        );

        // a supplied param contradicting the fixed default skips the entry
        assert_eq!(
            r.build_url("feed", &params_from([("format", json!("atom"))])).as_deref(),
            Some("/feed.atom")
        );
        assert_eq!(
            r.build_url("feed", &params_from([("format", json!("rss"))])).as_deref(),
            Some("/feed")
        );
    }

    #[test]
    fn test_build_url_collapses_and_trims_slashes() {
        let r = router(RouteTable::new().route("/dir/<path>/", RouteDef::new(noop()).name("d")));

        let url = r.build_url("d", &params_from([("path", json!("a"))]));
        assert_eq!(url.as_deref(), Some("/dir/a"));
    }

    #[test]
    fn test_build_url_with_base_url() {
        let r = router(RouteTable::new().route("/x/<id>", RouteDef::new(noop()).name("x")))
            .with_base_url("/app");

        let url = r.build_url("x", &params_from([("id", json!(9))]));
        assert_eq!(url.as_deref(), Some("/app/x/9"));
    }

    #[test]
    fn test_build_url_first_satisfiable_entry_wins() {
        let r = router(
            RouteTable::new()
                .route("/v1/<id:\\d+>", RouteDef::new(noop()).name("dual"))
                .route("/v1/<id>", RouteDef::new(noop()).name("dual")),
        );

        assert_eq!(
            r.build_url("dual", &params_from([("id", json!("42"))])).as_deref(),
            Some("/v1/42")
        );
        // non-numeric id fails the first entry's constraint, second accepts
        assert_eq!(
            r.build_url("dual", &params_from([("id", json!("abc"))])).as_deref(),
            Some("/v1/abc")
        );
    }

    // ========================================
    // error route
    // ========================================

    #[test]
    fn test_error_route_shape() {
        let r = router(RouteTable::new()).with_error_controller(noop());

        let route = r.error_route();
        assert_eq!(route.name.as_deref(), Some(ERROR_ROUTE_NAME));
        assert!(route.controller.is_some());
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_error_route_without_controller() {
        let r = router(RouteTable::new());
        assert!(r.error_route().controller.is_none());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("http://h/x/"), "/x");
    }
}
