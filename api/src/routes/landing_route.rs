use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// `GET /`: the demo chat page.
pub async fn landing_route() -> Html<&'static str> {
    Html(INDEX_HTML)
}
