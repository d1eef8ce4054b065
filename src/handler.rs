//! Handler type erasure.
//!
//! # How handlers are stored
//!
//! Routes and middleware are the same thing to the dispatcher: a function
//! over one [`Context`]. The router, every group, and every per-request
//! chain hold functions of *different* concrete closure types in a single
//! `Vec`, so each one is erased behind a trait object:
//!
//! ```text
//! |c: &mut Context| c.string(200, "hi")    ← user writes this
//!        ↓ engine.get("/", …)
//! into_handler(f)                         ← Arc::new(f)
//!        ↓  stored as HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>
//! Arc::clone(&handlers[i])(ctx)           ← one vtable call per step
//! ```
//!
//! `Arc` lets the frozen route table hand the same handler to every request
//! chain concurrently; building a chain costs one atomic increment per
//! handler.
//!
//! Handlers are synchronous. The chain for one request is a single call
//! stack, and [`Context::next`] is an ordinary nested call.

use std::sync::Arc;

use crate::context::Context;

/// A type-erased route handler or middleware.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// Erases a concrete handler into a [`HandlerFunc`].
pub(crate) fn into_handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}
