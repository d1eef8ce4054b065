//! Static directory serving.
//!
//! [`Group::static_dir`](crate::Group::static_dir) registers
//! `{relative}/*filepath` and this handler maps the captured `filepath` onto
//! a directory on disk. Only plain components are accepted; `..`, absolute
//! paths, and anything that is not a regular file answer 404.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::context::Context;
use crate::response::ContentType;

pub(crate) fn serve_dir(root: PathBuf) -> impl Fn(&mut Context) + Send + Sync + 'static {
    move |c: &mut Context| {
        let requested = c.param("filepath").unwrap_or_default();
        let Some(file) = resolve(&root, requested) else {
            c.status(404);
            return;
        };

        match std::fs::read(&file) {
            Ok(body) => {
                let content_type = file.extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(ContentType::OctetStream, ContentType::from_extension);
                c.data(200, content_type, body);
            }
            Err(e) => {
                debug!(file = %file.display(), "static file unavailable: {e}");
                c.status(404);
            }
        }
    }
}

fn resolve(root: &Path, requested: &str) -> Option<PathBuf> {
    let relative = Path::new(requested);
    if relative.as_os_str().is_empty()
        || !relative.components().all(|part| matches!(part, Component::Normal(_)))
    {
        return None;
    }
    let file = root.join(relative);
    file.is_file().then_some(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, Request};

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("burrow-static-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("css")).unwrap();
        std::fs::write(dir.join("css/app.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn serves_nested_file_with_content_type() {
        let dir = fixture_dir("nested");
        let mut engine = Engine::new();
        engine.static_dir("/assets", &dir);
        let app = engine.build();

        let res = app.handle(Request::new("GET", "/assets/css/app.css"));
        assert_eq!(res.status(), 200);
        assert_eq!(res.text(), "body{}");
        assert_eq!(res.header("content-type"), Some("text/css; charset=utf-8"));
    }

    #[test]
    fn missing_and_escaping_paths_are_404() {
        let dir = fixture_dir("escape");
        let mut engine = Engine::new();
        engine.static_dir("/assets/", &dir);
        let app = engine.build();

        assert_eq!(app.handle(Request::new("GET", "/assets/css/none.css")).status(), 404);
        assert_eq!(app.handle(Request::new("GET", "/assets/../etc/passwd")).status(), 404);
        assert_eq!(app.handle(Request::new("GET", "/assets/css")).status(), 404);
    }

    #[test]
    fn resolve_rejects_parent_components() {
        let root = Path::new("/srv/www");
        assert!(resolve(root, "../secret").is_none());
        assert!(resolve(root, "").is_none());
    }
}
