//! Trie-backed request router.
//!
//! One segment trie per HTTP method, created on the first registration for
//! that method, plus a table from `"{METHOD}-{pattern}"` to the handler. The
//! trie answers *which pattern* matches; the table answers *what runs*.
//!
//! # Pattern syntax
//!
//! Segments are separated by `/`; empty segments are ignored, so `/a//b/`
//! and `/a/b` are the same route.
//!
//! - `:name` binds exactly one path component.
//! - `*name` binds every remaining component, joined by `/`. Segment
//!   collection stops at the first `*` segment: `/files/*path/ignored` is
//!   registered as `/files/*path`. Nothing after the wildcard is matched.
//!
//! Patterns are never rejected. See the `trie` module docs for how
//! overlapping wild and literal registrations resolve.
//!
//! # Methods
//!
//! Roots are keyed by the closed [`Method`] enum (the nine RFC 9110
//! methods). Extension methods such as `PURGE` or WebDAV verbs cannot be
//! registered; a request carrying one has no root and gets the 404 handler.

use std::collections::HashMap;

use crate::context::Context;
use crate::handler::{into_handler, HandlerFunc};
use crate::method::Method;
use crate::trie::Node;

#[derive(Default)]
pub(crate) struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<String, HandlerFunc>,
}

/// Splits a pattern or request path into its meaningful segments.
pub(crate) fn parse_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in pattern.split('/').filter(|s| !s.is_empty()) {
        parts.push(part);
        if part.starts_with('*') {
            break;
        }
    }
    parts
}

fn route_key(method: Method, pattern: &str) -> String {
    format!("{method}-{pattern}")
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` + `pattern`. Registering the same
    /// pattern again replaces the earlier handler.
    pub(crate) fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFunc) {
        let parts: Vec<String> = parse_pattern(pattern).into_iter().map(str::to_owned).collect();
        self.roots
            .entry(method)
            .or_insert_with(Node::root)
            .insert(pattern, &parts, 0);
        self.handlers.insert(route_key(method, pattern), handler);
    }

    /// Resolves `method` + `path` to the terminal trie node and the bound
    /// path parameters. `None` when the method is unknown, has no routes, or
    /// no registered pattern matches.
    pub(crate) fn get_route(
        &self,
        method: &str,
        path: &str,
    ) -> Option<(&Node, HashMap<String, String>)> {
        let method: Method = method.parse().ok()?;
        let root = self.roots.get(&method)?;

        let search_parts = parse_pattern(path);
        let node = root.search(&search_parts, 0)?;

        // The matched pattern may differ from the request path wherever it
        // has wild segments; bind those positions from the request.
        let mut params = HashMap::new();
        for (index, part) in parse_pattern(node.pattern()?).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if let Some(value) = search_parts.get(index) {
                    params.insert(name.to_owned(), (*value).to_owned());
                }
            } else if let Some(name) = part.strip_prefix('*') {
                let rest = search_parts.get(index..).unwrap_or_default();
                params.insert(name.to_owned(), rest.join("/"));
                break;
            }
        }

        Some((node, params))
    }

    /// Appends the resolved route handler (or the 404 handler) to the
    /// context's chain and binds its params.
    pub(crate) fn handle(&self, ctx: &mut Context) {
        let route = self.get_route(ctx.method(), ctx.path()).and_then(|(node, params)| {
            let method: Method = ctx.method().parse().ok()?;
            let handler = self.handlers.get(&route_key(method, node.pattern()?))?;
            Some((handler.clone(), params))
        });

        match route {
            Some((handler, params)) => {
                ctx.set_params(params);
                ctx.push_handler(handler);
            }
            None => ctx.push_handler(into_handler(not_found)),
        }
    }

    pub(crate) fn route_count(&self) -> usize {
        self.handlers.len()
    }
}

fn not_found(c: &mut Context) {
    let body = format!("404 NOT FOUND: {}\n", c.path());
    c.string(404, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    fn noop() -> HandlerFunc {
        into_handler(|_: &mut Context| {})
    }

    fn router(routes: &[(Method, &str)]) -> Router {
        let mut router = Router::new();
        for (method, pattern) in routes {
            router.add_route(*method, pattern, noop());
        }
        router
    }

    fn resolve(router: &Router, method: &str, path: &str) -> Option<(String, HashMap<String, String>)> {
        router.get_route(method, path)
            .map(|(node, params)| (node.pattern().unwrap_or_default().to_owned(), params))
    }

    #[test]
    fn parse_pattern_drops_empty_and_stops_at_wildcard() {
        assert_eq!(parse_pattern("/"), Vec::<&str>::new());
        assert_eq!(parse_pattern("//a///b/"), ["a", "b"]);
        assert_eq!(parse_pattern("/files/*path/ignored/too"), ["files", "*path"]);
    }

    #[test]
    fn static_routes_have_no_params() {
        let r = router(&[(Method::Get, "/"), (Method::Get, "/hello/world")]);

        let (pattern, params) = resolve(&r, "GET", "/hello/world").unwrap();
        assert_eq!(pattern, "/hello/world");
        assert!(params.is_empty());

        let (pattern, params) = resolve(&r, "GET", "/").unwrap();
        assert_eq!(pattern, "/");
        assert!(params.is_empty());
    }

    #[test]
    fn named_param() {
        let r = router(&[(Method::Get, "/user/:name")]);
        let (_, params) = resolve(&r, "GET", "/user/alice").unwrap();
        assert_eq!(params, HashMap::from([("name".to_owned(), "alice".to_owned())]));
    }

    #[test]
    fn wildcard_param_joins_tail() {
        let r = router(&[(Method::Get, "/assets/*filepath")]);
        let (_, params) = resolve(&r, "GET", "/assets/css/app.css").unwrap();
        assert_eq!(params["filepath"], "css/app.css");
    }

    #[test]
    fn trailing_text_after_wildcard_is_ignored() {
        let r = router(&[(Method::Get, "/dl/*file/meta")]);
        let (pattern, params) = resolve(&r, "GET", "/dl/a/b/meta/c").unwrap();
        assert_eq!(pattern, "/dl/*file/meta");
        assert_eq!(params["file"], "a/b/meta/c");
    }

    #[test]
    fn mixed_params() {
        let r = router(&[(Method::Get, "/:lang/docs/*page")]);
        let (_, params) = resolve(&r, "GET", "/en/docs/intro/install").unwrap();
        assert_eq!(params["lang"], "en");
        assert_eq!(params["page"], "intro/install");
    }

    #[test]
    fn misses() {
        let r = router(&[(Method::Get, "/user/:name")]);
        assert!(resolve(&r, "POST", "/user/alice").is_none());
        assert!(resolve(&r, "BREW", "/user/alice").is_none());
        assert!(resolve(&r, "GET", "/users").is_none());
    }

    #[test]
    fn extension_methods_never_match() {
        let r = router(&[(Method::Get, "/cache/*key"), (Method::Delete, "/cache/*key")]);
        assert!(resolve(&r, "GET", "/cache/a/b").is_some());
        assert!(resolve(&r, "PURGE", "/cache/a/b").is_none());
        assert!(resolve(&r, "PROPFIND", "/cache/a/b").is_none());
    }

    #[test]
    fn resolution_is_repeatable() {
        let r = router(&[(Method::Get, "/a/:x/*y")]);
        let first = resolve(&r, "GET", "/a/1/2/3");
        let second = resolve(&r, "GET", "/a/1/2/3");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn handle_pushes_not_found() {
        let r = router(&[(Method::Get, "/known")]);
        let mut ctx = Context::new(Request::new("GET", "/unknown/path"), Vec::new());
        r.handle(&mut ctx);
        ctx.next();

        let res = ctx.into_response();
        assert_eq!(res.status(), 404);
        assert_eq!(res.text(), "404 NOT FOUND: /unknown/path\n");
    }

    #[test]
    fn reregistration_replaces_handler() {
        let mut r = Router::new();
        r.add_route(Method::Get, "/v", into_handler(|c: &mut Context| c.string(200, "one")));
        r.add_route(Method::Get, "/v", into_handler(|c: &mut Context| c.string(200, "two")));
        assert_eq!(r.route_count(), 1);

        let mut ctx = Context::new(Request::new("GET", "/v"), Vec::new());
        r.handle(&mut ctx);
        ctx.next();
        assert_eq!(ctx.into_response().text(), "two");
    }
}
