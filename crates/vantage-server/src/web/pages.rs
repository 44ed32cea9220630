//! Shell documents for the browser-rendered pages this server owns. The
//! actual UI is a client bundle loaded by these shells.

use axum::response::Html;

const LOGIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body><div id="app" data-page="login"></div><script type="module" src="/assets/app.js"></script></body>
</html>
"#;

const ADMIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin console</title></head>
<body><div id="app" data-page="admin"></div><script type="module" src="/assets/app.js"></script></body>
</html>
"#;

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_SHELL)
}

/// GET /admin and everything below it. Only reached through the route
/// protector.
pub async fn admin_console() -> Html<&'static str> {
    Html(ADMIN_SHELL)
}
