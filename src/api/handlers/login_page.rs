use axum::response::Html;

const LOGIN_FORM: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Cedar Core admin</title>
</head>
<body>
  <main>
    <h1>Sign in</h1>
    <form method="post" action="/api/auth/login">
      <label>Email <input type="email" name="email" autocomplete="username" required></label>
      <label>Password <input type="password" name="password" autocomplete="current-password" required></label>
      <button type="submit">Sign in</button>
    </form>
  </main>
</body>
</html>
"#;

#[utoipa::path(
    get,
    path = "/admin/login",
    responses(
        (status = 200, description = "Admin login form", content_type = "text/html")
    ),
    tag = "auth"
)]
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_FORM)
}
