//! Serves a real socket and speaks raw HTTP/1.1 to it.

use burrow::{Context, Engine, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn serves_routes_and_404_over_tcp() {
    let mut engine = Engine::new();
    engine.get("/hello/:name", |c: &mut Context| {
        let body = format!("hi {}", c.param("name").unwrap_or_default());
        c.string(200, body);
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::serve_on(listener, engine, async move {
        let _ = stopped.await;
    }));

    let ok = roundtrip(addr, "GET /hello/bob HTTP/1.1\r\nhost: t\r\nconnection: close\r\n\r\n").await;
    assert!(ok.starts_with("HTTP/1.1 200 OK"), "{ok}");
    assert!(ok.ends_with("hi bob"), "{ok}");

    let missing = roundtrip(addr, "GET /nope HTTP/1.1\r\nhost: t\r\nconnection: close\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");
    assert!(missing.contains("404 NOT FOUND: /nope"), "{missing}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn panicking_chain_without_recovery_still_answers() {
    let mut engine = Engine::new();
    engine
        .get("/boom", |_: &mut Context| panic!("no recovery installed"))
        .get("/files/*rest", |c: &mut Context| {
            let rest = c.param("rest").unwrap_or_default().to_owned();
            c.string(200, rest);
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::serve_on(listener, engine, async move {
        let _ = stopped.await;
    }));

    let boom = roundtrip(addr, "GET /boom HTTP/1.1\r\nhost: t\r\nconnection: close\r\n\r\n").await;
    assert!(boom.starts_with("HTTP/1.1 500 Internal Server Error"), "{boom}");
    assert!(!boom.contains("no recovery installed"), "{boom}");

    // The server keeps serving after the panic, and params arrive decoded.
    let file = roundtrip(addr, "GET /files/my%20notes/a.txt HTTP/1.1\r\nhost: t\r\nconnection: close\r\n\r\n").await;
    assert!(file.starts_with("HTTP/1.1 200 OK"), "{file}");
    assert!(file.ends_with("my notes/a.txt"), "{file}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[test]
fn bind_rejects_bad_address() {
    let err = Server::bind("not-an-address").err().unwrap();
    assert!(matches!(err, burrow::Error::InvalidAddress(ref a) if a == "not-an-address"));
    assert_eq!(Server::bind("127.0.0.1:9999").unwrap().addr().port(), 9999);
}
