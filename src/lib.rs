//! # burrow
//!
//! A minimal HTTP routing library: a segment trie per method, middleware
//! scoped by path prefix, and an onion-style handler chain per request.
//!
//! ## Pieces
//!
//! - **Routes**: `/users/:id` binds one component, `/assets/*filepath`
//!   binds the rest of the path. First registered, first matched.
//! - **Groups**: a path prefix plus middleware. Every group whose prefix
//!   starts the request path contributes its middleware, outermost first.
//! - **Context**: the one argument every handler receives. Middleware calls
//!   [`Context::next`] to run the rest of the chain and [`Context::fail`] to
//!   stop it.
//!
//! Setup happens on a mutable [`Engine`]; [`Engine::build`] freezes it into
//! an [`App`] that serves requests concurrently without locks.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use burrow::{Context, Engine, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), burrow::Error> {
//!     let mut engine = Engine::with_defaults();
//!     engine.get("/", |c: &mut Context| c.html(200, "<h1>hello</h1>"));
//!
//!     let v1 = engine.group("/v1");
//!     engine.scope(v1)
//!         .use_middleware(only_with_token)
//!         .get("/users/:name", |c: &mut Context| {
//!             let name = c.param("name").unwrap_or_default().to_owned();
//!             c.json(200, &serde_json::json!({ "name": name }));
//!         });
//!
//!     Server::bind("0.0.0.0:9999")?.serve(engine).await
//! }
//!
//! fn only_with_token(c: &mut Context) {
//!     if c.header("authorization").is_none() {
//!         c.fail(401, "missing token");
//!     }
//! }
//! ```
//!
//! ## Concurrency
//!
//! All registration happens before [`Engine::build`]. The frozen [`App`] is
//! immutable and `Send + Sync`; each request gets its own [`Context`], and
//! the chain for one request runs on one call stack.

mod context;
mod engine;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod static_files;
mod trie;

pub mod middleware;

pub use context::Context;
pub use engine::{App, Engine, Group, GroupId};
pub use error::Error;
pub use handler::HandlerFunc;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, Response};
pub use server::Server;
