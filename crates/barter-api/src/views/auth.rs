use barter_types::models::Session;

use super::layout;

pub fn login_page(session: Option<&Session>) -> String {
    let body = r#"<section class="auth">
  <h1>Log in</h1>
  <form method="post" action="/auth/login" data-json-form data-success="/search">
    <div class="form-message" hidden></div>
    <label>Email <input type="email" name="email" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">Log in</button>
  </form>
  <p>No account yet? <a href="/auth/register">Register</a></p>
</section>"#;
    layout("Login", session, body)
}

pub fn register_page(session: Option<&Session>) -> String {
    let body = r#"<section class="auth">
  <h1>Register</h1>
  <form method="post" action="/auth/register" data-json-form data-success="/auth/login">
    <div class="form-message" hidden></div>
    <label>Name <input type="text" name="name" required></label>
    <label>Email <input type="email" name="email" required></label>
    <label>Password <input type="password" name="password" minlength="8" required></label>
    <p class="hint">At least 8 characters, with an uppercase letter, a lowercase letter and a number.</p>
    <button type="submit">Create account</button>
  </form>
  <p>Already registered? <a href="/auth/login">Log in</a></p>
</section>"#;
    layout("Register", session, body)
}
