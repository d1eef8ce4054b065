//! Incoming HTTP request description.

use http_body_util::BodyExt;
use hyper::body::Body;
use percent_encoding::percent_decode_str;

/// An inbound request as seen by the handler chain.
///
/// The body is fully buffered before dispatch; handlers never await I/O.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    /// Builds a request from a method string and a request target such as
    /// `/search?q=rust`. Useful for driving [`App::handle`](crate::App::handle)
    /// without a socket.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        Self { method: method.into(), path, query, headers: Vec::new(), body: Vec::new() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Buffers a hyper request into a [`Request`].
    ///
    /// The path is percent-decoded before routing, so `:name` and `*name`
    /// bind decoded text; a path that does not decode to UTF-8 is kept as
    /// received. Headers whose value is not visible ASCII are skipped.
    pub(crate) async fn from_hyper<B>(req: hyper::Request<B>) -> Result<Self, B::Error>
    where
        B: Body,
    {
        let (parts, body) = req.into_parts();
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
            .collect();
        let body = body.collect().await?.to_bytes().to_vec();

        Ok(Self {
            method: parts.method.as_str().to_owned(),
            path: decode_path(parts.uri.path()),
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
        })
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn decode_path(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_owned(), |decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[test]
    fn target_splits_path_and_query() {
        let req = Request::new("GET", "/search?q=rust&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust&page=2"));

        let bare = Request::new("GET", "/plain");
        assert_eq!(bare.query(), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new("GET", "/").with_header("Content-Type", "text/plain");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("accept"), None);
    }

    #[tokio::test]
    async fn buffers_hyper_request() {
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("http://localhost/users?x=1")
            .header("x-id", "7")
            .body(Full::new(bytes::Bytes::from_static(b"name=alice")))
            .unwrap();

        let req = Request::from_hyper(hyper_req).await.unwrap();
        assert_eq!(req.method(), "POST");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query(), Some("x=1"));
        assert_eq!(req.header("X-Id"), Some("7"));
        assert_eq!(req.body(), b"name=alice");
    }

    #[tokio::test]
    async fn decodes_percent_encoded_path() {
        let hyper_req = hyper::Request::builder()
            .uri("http://localhost/user/al%20ice/caf%C3%A9")
            .body(Full::new(bytes::Bytes::new()))
            .unwrap();

        let req = Request::from_hyper(hyper_req).await.unwrap();
        assert_eq!(req.path(), "/user/al ice/café");
    }

    #[test]
    fn undecodable_path_is_kept_raw() {
        assert_eq!(decode_path("/bad/%FF%FE"), "/bad/%FF%FE");
        assert_eq!(decode_path("/plain"), "/plain");
    }
}
