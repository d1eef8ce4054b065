//! Built-in middleware.
//!
//! Middleware is an ordinary handler that calls [`Context::next`] somewhere
//! in its body; see [`Context`] for the resulting execution order. Install
//! with [`Engine::use_middleware`](crate::Engine::use_middleware) or
//! [`Group::use_middleware`](crate::Group::use_middleware).
//!
//! - [`logger`] logs status, method, path and latency after the chain runs.
//! - [`recovery`] turns a panic anywhere further down the chain into a 500.
//!
//! [`Context`]: crate::Context
//! [`Context::next`]: crate::Context::next

mod logger;
mod recovery;

pub use logger::logger;
pub use recovery::recovery;
