//! Server-rendered HTML.
//!
//! Pages are plain `format!` templates around a shared [`layout`]. Every
//! user-supplied value goes through [`escape`] before it is written out.

pub mod account;
pub mod auth;
pub mod items;
pub mod swaps;

use std::fmt::Write;

use barter_types::categories::ITEM_CATEGORIES;
use barter_types::models::Session;

pub const SITE_NAME: &str = "Home Swap Platform";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the site chrome. The nav depends on whether a session is
/// present. A pending flash notice is shown above the content.
pub fn layout(title: &str, session: Option<&Session>, body: &str) -> String {
    let nav = match session {
        Some(s) => format!(
            r#"<a href="/search">Browse</a>
      <a href="/items/new">Post Item</a>
      <a href="/swaps/outgoing">My Requests</a>
      <a href="/swaps/incoming">Received</a>
      <a href="/account">{}</a>
      <form method="post" action="/auth/logout" class="inline"><button type="submit">Log out</button></form>"#,
            escape(&s.user.username)
        ),
        None => r#"<a href="/auth/login">Log in</a>
      <a href="/auth/register">Register</a>"#
            .to_string(),
    };

    let flash = session
        .and_then(|s| s.flash.as_deref())
        .map(|f| format!(r#"<div class="flash">{}</div>"#, escape(f)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | {site}</title>
  <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
  <header>
    <a class="brand" href="/">{site}</a>
    <nav>
      {nav}
    </nav>
  </header>
  <main>
    {flash}
    {body}
  </main>
  <script src="/static/js/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        site = SITE_NAME,
        nav = nav,
        flash = flash,
        body = body,
    )
}

pub fn error_page(title: &str, message: &str, detail: Option<&str>) -> String {
    let detail = detail
        .map(|d| format!("<pre class=\"error-detail\">{}</pre>", escape(d)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="error">
  <h1>{}</h1>
  <p>{}</p>
  {}
  <p><a href="/">Back to home</a></p>
</section>"#,
        escape(title),
        escape(message),
        detail
    );
    layout(title, None, &body)
}

pub fn not_found_page(session: Option<&Session>) -> String {
    let body = r#"<section class="error">
  <h1>Page Not Found</h1>
  <p>The page you are looking for does not exist.</p>
  <p><a href="/">Back to home</a></p>
</section>"#;
    layout("Page Not Found", session, body)
}

pub fn home_page(session: Option<&Session>) -> String {
    let cta = match session {
        Some(s) => format!(
            r#"<p>Welcome back, {}.</p>
  <p><a class="button" href="/search">Browse items</a> <a class="button" href="/items/new">Post an item</a></p>"#,
            escape(&s.user.username)
        ),
        None => r#"<p><a class="button" href="/auth/register">Get started</a> <a class="button" href="/auth/login">Log in</a></p>"#
            .to_string(),
    };

    let body = format!(
        r#"<section class="hero">
  <h1>{}</h1>
  <p>Trade the things you no longer need for the things you want. No money involved.</p>
  {}
</section>"#,
        SITE_NAME, cta
    );
    layout(SITE_NAME, session, &body)
}

pub fn styleguide_page(session: Option<&Session>) -> String {
    let badges: String = ["pending", "accepted", "rejected", "cancelled", "swapped"]
        .iter()
        .map(|b| format!(r#"<span class="badge {0}">{0}</span>"#, b))
        .collect();
    let errors = error_list(&["Title is required".to_string()]);

    let body = format!(
        r#"<section>
  <h1>Design System</h1>
  <h2>Buttons</h2>
  <p><button type="button">Primary</button> <a class="button" href="/styleguide">Link button</a> <button type="button" class="danger">Danger</button></p>
  <h2>Badges</h2>
  <p>{badges}</p>
  <h2>Notices</h2>
  <div class="flash">Swap request sent successfully!</div>
  <div class="error">Something went wrong.</div>
  {errors}
  <h2>Form controls</h2>
  <form class="styleguide" onsubmit="return false">
    <label>Title <input type="text" name="title" placeholder="Vintage camera"></label>
    <label>Category <select name="itemType"><option value="">Choose a category</option>{options}</select></label>
    <label>Description <textarea name="description"></textarea></label>
  </form>
</section>"#,
        badges = badges,
        errors = errors,
        options = category_options(None),
    );
    layout("Design System", session, &body)
}

/// `<ul>` of validation messages, empty when there are none.
pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"errors\">");
    for e in errors {
        let _ = write!(out, "<li>{}</li>", escape(e));
    }
    out.push_str("</ul>");
    out
}

/// `<option>`s for every category, with `selected` marked.
pub fn category_options(selected: Option<&str>) -> String {
    let mut out = String::new();
    for cat in ITEM_CATEGORIES {
        let sel = if selected.is_some_and(|s| s.eq_ignore_ascii_case(cat)) {
            " selected"
        } else {
            ""
        };
        let _ = write!(out, r#"<option value="{0}"{1}>{0}</option>"#, escape(cat), sel);
    }
    out
}

/// One checkbox per category for the wanted-categories field.
pub fn category_checkboxes(name: &str, checked: &[String]) -> String {
    let mut out = String::new();
    for cat in ITEM_CATEGORIES {
        let on = if checked.iter().any(|c| c.eq_ignore_ascii_case(cat)) {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            out,
            r#"<label class="check"><input type="checkbox" name="{}" value="{}"{}> {}</label>"#,
            escape(name),
            escape(cat),
            on,
            escape(cat)
        );
    }
    out
}

pub fn format_date(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn home_and_not_found_titles() {
        assert!(home_page(None).contains("<title>Home Swap Platform | Home Swap Platform</title>"));
        assert!(not_found_page(None).contains("<h1>Page Not Found</h1>"));
        assert!(styleguide_page(None).contains("<h1>Design System</h1>"));
    }

    #[test]
    fn options_mark_selection_case_insensitively() {
        let html = category_options(Some("books"));
        assert!(html.contains(r#"<option value="Books" selected>Books</option>"#));
        assert!(!html.contains(r#"value="Toys" selected"#));
    }
}
