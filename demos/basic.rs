//! Small burrow app: nested groups, a guard middleware, static files.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl http://localhost:9999/v1/hello/alice
//!   curl 'http://localhost:9999/v1/search?q=trie'
//!   curl http://localhost:9999/v2/admin/stats                 # 401
//!   curl -H 'authorization: t' http://localhost:9999/v2/admin/stats
//!   curl http://localhost:9999/assets/Cargo.toml
//!   curl http://localhost:9999/panic                          # 500

use burrow::{Context, Engine, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut engine = Engine::with_defaults();
    engine
        .get("/", |c: &mut Context| c.html(200, "<h1>burrow</h1>"))
        .get("/panic", |_: &mut Context| panic!("deliberate"))
        .static_dir("/assets", env!("CARGO_MANIFEST_DIR"));

    let v1 = engine.group("/v1");
    engine.scope(v1)
        .get("/hello/:name", hello)
        .get("/search", |c: &mut Context| {
            let q = c.query("q").unwrap_or_default();
            c.string(200, format!("searching for {q}\n"));
        });

    let v2 = engine.group("/v2");
    let admin = engine.scope(v2).group("/admin");
    engine.scope(admin)
        .use_middleware(require_token)
        .get("/stats", |c: &mut Context| c.json(200, &serde_json::json!({ "routes": 6 })));

    if let Err(e) = Server::bind("0.0.0.0:9999").expect("valid address").serve(engine).await {
        eprintln!("server error: {e}");
    }
}

fn hello(c: &mut Context) {
    let body = format!("hello {}, you're at {}\n", c.param("name").unwrap_or("stranger"), c.path());
    c.string(200, body);
}

fn require_token(c: &mut Context) {
    if c.header("authorization").is_none() {
        c.fail(401, "missing authorization header");
        return;
    }
    c.next();
}
