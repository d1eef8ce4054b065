//! Per-request state and the handler chain.
//!
//! # Execution order
//!
//! A request's chain is the matching group middleware followed by the route
//! handler (or the built-in 404 handler). [`Context::next`] runs the rest of
//! the chain and returns once it is exhausted, so code placed after the call
//! runs on the way back out:
//!
//! ```text
//! logger  ── before ─┐                      ┌─ after ── logger
//! auth    ── before ─┤                      ├─ after ── auth
//! handler            └─────── runs ─────────┘
//! ```
//!
//! "Before" code runs in registration order and "after" code in reverse.
//! A middleware that never calls `next` is still followed by the rest of the
//! chain once it returns; to stop the chain it must call [`Context::fail`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::error;

use crate::handler::HandlerFunc;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// The single capability every handler and middleware receives.
pub struct Context {
    request: Request,
    response: Response,
    params: HashMap<String, String>,
    handlers: Vec<HandlerFunc>,
    /// Index of the next handler to invoke. Only moves forward.
    cursor: usize,
    aborted: bool,
}

impl Context {
    pub(crate) fn new(request: Request, handlers: Vec<HandlerFunc>) -> Self {
        Self {
            request,
            response: Response::new(),
            params: HashMap::new(),
            handlers,
            cursor: 0,
            aborted: false,
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn push_handler(&mut self, handler: HandlerFunc) {
        self.handlers.push(handler);
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    // ── Chain control ─────────────────────────────────────────────────────────

    /// Runs every remaining handler in order, then returns.
    ///
    /// The cursor is advanced before each handler is called, so a handler
    /// that calls `next` itself resumes the chain after its own slot and no
    /// handler runs twice.
    pub fn next(&mut self) {
        while let Some(handler) = self.handlers.get(self.cursor).cloned() {
            self.cursor += 1;
            handler(self);
        }
    }

    /// Stops the chain and writes `{"message": message}` with `status` as
    /// the terminal response. Handlers already on the call stack still finish
    /// their "after" code.
    pub fn fail(&mut self, status: u16, message: &str) {
        self.cursor = self.handlers.len();
        self.aborted = true;
        self.json(status, &serde_json::json!({ "message": message }));
    }

    /// True once [`fail`](Self::fail) has stopped the chain.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// True once no handler is left to run, whether the chain ran to the end
    /// or was stopped by [`fail`](Self::fail).
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.handlers.len()
    }

    // ── Request accessors ─────────────────────────────────────────────────────

    pub fn request(&self) -> &Request { &self.request }
    pub fn method(&self) -> &str { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// A path parameter bound by a `:name` or `*name` segment.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// First value of `key` in the query string, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.query()?;
        lookup_urlencoded(query.as_bytes(), key)
    }

    /// First value of `key` in an `application/x-www-form-urlencoded` body.
    pub fn post_form(&self, key: &str) -> Option<String> {
        let is_form = self.request.header("content-type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if !is_form {
            return None;
        }
        lookup_urlencoded(self.request.body(), key)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    // ── Response writers ──────────────────────────────────────────────────────

    pub fn response(&self) -> &Response { &self.response }
    pub fn status_code(&self) -> u16 { self.response.status }

    pub fn status(&mut self, status: u16) {
        self.response.status = status;
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    pub fn string(&mut self, status: u16, body: impl Into<String>) {
        self.response.write(status, ContentType::Text, body.into().into_bytes());
    }

    pub fn html(&mut self, status: u16, markup: impl Into<String>) {
        self.response.write(status, ContentType::Html, markup.into().into_bytes());
    }

    pub fn data(&mut self, status: u16, content_type: ContentType, body: Vec<u8>) {
        self.response.write(status, content_type, body);
    }

    /// Serializes `value` as the JSON body. A serialization failure is logged
    /// and answered with a generic 500.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.response.write(status, ContentType::Json, body),
            Err(e) => {
                error!(path = %self.request.path(), "json serialization failed: {e}");
                self.response.write(500, ContentType::Text, b"Internal Server Error".to_vec());
            }
        }
    }
}

fn lookup_urlencoded(input: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
