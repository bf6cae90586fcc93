//! Browser upload form served at `/`.
//!
//! The page keeps its own Idle/Submitted state: the submit button is
//! disabled while a request is in flight and re-enabled on any outcome.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
