use std::time::Instant;

use tracing::info;

use crate::context::Context;

/// Logs one `info` event per request once the rest of the chain returns.
pub fn logger() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        info!(
            status = c.status_code(),
            method = %c.method(),
            path = %c.path(),
            elapsed = ?start.elapsed(),
            "request"
        );
    }
}
