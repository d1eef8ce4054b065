//! Unified error type.

/// The error type returned by burrow's fallible operations.
///
/// Application-level errors (404, 403, 500) are written into the
/// [`Response`](crate::Response) by the handler chain, not returned as
/// `Error`s. This type surfaces setup and infrastructure failures: a bad bind
/// address, an unknown method string, or an I/O error from the listener.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),
}
