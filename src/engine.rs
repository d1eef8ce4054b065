//! Route registration, middleware groups, and request dispatch.
//!
//! Setup and serving are two different types:
//!
//! - [`Engine`] is the mutable builder. It owns the route table and an arena
//!   of groups. Groups are addressed by [`GroupId`] and edited through a
//!   short-lived [`Group`] view.
//! - [`App`] is what [`Engine::build`] freezes it into. It has no mutating
//!   methods, is `Send + Sync`, and is shared by every request task.
//!
//! # Middleware selection
//!
//! Every group ever created lives in one flat list in creation order. For
//! each request, every group whose prefix is a textual prefix of the path
//! contributes all of its middleware, in that group's `use_middleware`
//! order. Ancestors have shorter prefixes of the same path, so outer
//! middleware runs before inner middleware. The match is purely textual:
//! groups `/v` and `/v1` both apply to `/v1/users`, and a group `/api`
//! applies to `/apis` too.

use std::path::PathBuf;

use tracing::info;

use crate::context::Context;
use crate::handler::{into_handler, HandlerFunc};
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::static_files;

/// Stable handle to a group inside one [`Engine`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GroupId(usize);

impl GroupId {
    /// The implicit root group, prefix `""`.
    pub const ROOT: GroupId = GroupId(0);
}

struct Scope {
    prefix: String,
    parent: Option<GroupId>,
    middlewares: Vec<HandlerFunc>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The setup-time builder.
///
/// Route and middleware helpers on `Engine` act on the root group.
///
/// ```rust
/// use burrow::{Context, Engine, Request};
///
/// let mut engine = Engine::new();
/// engine.get("/", |c: &mut Context| c.string(200, "home"));
///
/// let v1 = engine.group("/v1");
/// engine.scope(v1)
///     .use_middleware(|c: &mut Context| { c.set_header("x-api", "v1"); c.next(); })
///     .get("/users/:id", |c: &mut Context| {
///         let id = c.param("id").unwrap_or_default().to_owned();
///         c.string(200, id);
///     });
///
/// let app = engine.build();
/// let res = app.handle(Request::new("GET", "/v1/users/7"));
/// assert_eq!(res.text(), "7");
/// assert_eq!(res.header("x-api"), Some("v1"));
/// ```
pub struct Engine {
    router: Router,
    groups: Vec<Scope>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![Scope { prefix: String::new(), parent: None, middlewares: Vec::new() }],
        }
    }

    /// An engine with [`middleware::logger`] and [`middleware::recovery`]
    /// installed on the root group.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(middleware::logger()).use_middleware(middleware::recovery());
        engine
    }

    pub fn root(&mut self) -> Group<'_> {
        self.scope(GroupId::ROOT)
    }

    /// A view of the group `id` for registering middleware and routes.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this engine.
    pub fn scope(&mut self, id: GroupId) -> Group<'_> {
        assert!(id.0 < self.groups.len(), "group {id:?} does not belong to this engine");
        Group { engine: self, id }
    }

    /// Creates a child group of the root.
    pub fn group(&mut self, prefix: &str) -> GroupId {
        self.root().group(prefix)
    }

    pub fn prefix(&self, id: GroupId) -> Option<&str> {
        self.groups.get(id.0).map(|g| g.prefix.as_str())
    }

    pub fn parent(&self, id: GroupId) -> Option<GroupId> {
        self.groups.get(id.0).and_then(|g| g.parent)
    }

    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().use_middleware(middleware);
        self
    }

    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().add_route(method, pattern, handler);
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Get, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Post, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Put, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Delete, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Patch, pattern, handler)
    }

    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Head, pattern, handler)
    }

    pub fn options<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Options, pattern, handler)
    }

    pub fn static_dir(&mut self, relative: &str, root: impl Into<PathBuf>) -> &mut Self {
        self.root().static_dir(relative, root);
        self
    }

    /// Freezes the route table and group list.
    pub fn build(self) -> App {
        info!(routes = self.router.route_count(), groups = self.groups.len(), "route table frozen");
        App {
            router: self.router,
            groups: self.groups
                .into_iter()
                .map(|g| (g.prefix, g.middlewares))
                .collect(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// A borrowed view of one group of an [`Engine`].
///
/// Patterns registered through a group are prefixed with the group's
/// absolute prefix. Obtain one with [`Engine::scope`] or [`Engine::root`].
pub struct Group<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl Group<'_> {
    pub fn id(&self) -> GroupId { self.id }

    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.id.0].prefix
    }

    /// Creates a child group whose prefix is this group's prefix followed by
    /// `prefix`.
    pub fn group(&mut self, prefix: &str) -> GroupId {
        let prefix = format!("{}{prefix}", self.prefix());
        let id = GroupId(self.engine.groups.len());
        self.engine.groups.push(Scope {
            prefix,
            parent: Some(self.id),
            middlewares: Vec::new(),
        });
        id
    }

    /// Appends middleware to this group.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.engine.groups[self.id.0].middlewares.push(into_handler(middleware));
        self
    }

    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        let pattern = format!("{}{pattern}", self.prefix());
        info!(method = %method, pattern = %pattern, "route registered");
        self.engine.router.add_route(method, &pattern, into_handler(handler));
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Get, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Post, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Put, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Delete, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Patch, pattern, handler)
    }

    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Head, pattern, handler)
    }

    pub fn options<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::Options, pattern, handler)
    }

    /// Serves files below `root` at `{relative}/*filepath`.
    pub fn static_dir(&mut self, relative: &str, root: impl Into<PathBuf>) -> &mut Self {
        let pattern = format!("{}/*filepath", relative.trim_end_matches('/'));
        self.get(&pattern, static_files::serve_dir(root.into()))
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// A frozen, shareable dispatcher produced by [`Engine::build`].
pub struct App {
    router: Router,
    /// `(prefix, middlewares)` per group, in creation order.
    groups: Vec<(String, Vec<HandlerFunc>)>,
}

impl App {
    /// Dispatches one request through its middleware and route handler.
    ///
    /// Never fails: unmatched requests get the built-in 404 response.
    pub fn handle(&self, request: Request) -> Response {
        let middlewares = self.middlewares_for(request.path());
        let mut ctx = Context::new(request, middlewares);
        self.router.handle(&mut ctx);
        ctx.next();
        ctx.into_response()
    }

    fn middlewares_for(&self, path: &str) -> Vec<HandlerFunc> {
        self.groups
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .flat_map(|(_, middlewares)| middlewares.iter().cloned())
            .collect()
    }
}

impl From<Engine> for App {
    fn from(engine: Engine) -> Self {
        engine.build()
    }
}
