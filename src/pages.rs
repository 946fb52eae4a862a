//! Minimal navigable pages. The real UI lives elsewhere; these exist so the
//! route guard has page routes to classify.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html("<!doctype html><title>Rookery</title><h1>Home</h1>")
}

pub async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Login - Rookery</title><h1>Login</h1>")
}

pub async fn protected() -> Html<&'static str> {
    Html("<!doctype html><title>Protected - Rookery</title><h1>Protected</h1>")
}
