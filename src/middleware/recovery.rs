//! Panic recovery.
//!
//! A panic unwinds through the handler chain to the nearest `recovery`
//! middleware, which logs the panic message with a backtrace of the panic
//! site and answers `500 Internal Server Error`. The client never sees the
//! message or the trace.
//!
//! The backtrace is captured by a process-wide panic hook, installed the
//! first time [`recovery`] is called. It chains to whatever hook was set
//! before, so default panic output is unchanged. The hook sees every panic
//! in the process, not only those inside a handler chain, and captures with
//! [`Backtrace::capture`]: `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE` decide
//! whether a trace is actually collected.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::error;

use crate::context::Context;

thread_local! {
    static PANIC_TRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::capture()));
            previous(info);
        }));
    });
}

/// Catches panics raised by later handlers and converts them to a 500.
///
/// The first call installs a process-wide panic hook (see the module docs).
pub fn recovery() -> impl Fn(&mut Context) + Send + Sync + 'static {
    install_hook();
    |c: &mut Context| {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| c.next()));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            let trace = PANIC_TRACE
                .with(|slot| slot.borrow_mut().take())
                .map_or_else(|| "<unavailable>".to_owned(), |bt| bt.to_string());
            error!(path = %c.path(), "{message}\nTraceback:\n{trace}");
            c.fail(500, "Internal Server Error");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
