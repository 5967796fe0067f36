use barter_types::models::{Item, Session, User};

use super::items::item_card;
use super::{error_list, escape, format_date, layout};

pub fn account_page(session: &Session, user: &User, items: &[Item]) -> String {
    let mut cards = String::new();
    for item in items {
        let actions = format!(r#"<a href="/items/{}/edit">Edit</a>"#, escape(&item.item_id));
        cards.push_str(&item_card(item, None, &actions));
    }
    if items.is_empty() {
        cards.push_str(r#"<p class="empty">You have not posted any items. <a href="/items/new">Post one</a>.</p>"#);
    }

    let body = format!(
        r#"<section>
  <h1>My Account</h1>
  <dl class="profile">
    <dt>Username</dt><dd>{username}</dd>
    <dt>Email</dt><dd>{email}</dd>
    <dt>Member since</dt><dd>{since}</dd>
  </dl>
  <p><a class="button" href="/account/edit">Edit account</a></p>
  <h2>My Items</h2>
  <div class="grid">{cards}</div>
</section>"#,
        username = escape(&user.username),
        email = escape(&user.email),
        since = format_date(user.created_at),
        cards = cards,
    );
    layout("My Account", Some(session), &body)
}

pub fn edit_account_page(session: &Session, username: &str, errors: &[String]) -> String {
    let body = format!(
        r#"<section>
  <h1>Edit Account</h1>
  {errors}
  <form method="post" action="/account/edit">
    <label>Username <input type="text" name="username" value="{username}" required></label>
    <label>New password <input type="password" name="password" autocomplete="new-password"></label>
    <label>Confirm new password <input type="password" name="confirmPassword" autocomplete="new-password"></label>
    <p class="hint">Leave the password fields blank to keep your current password.</p>
    <button type="submit">Save</button>
  </form>
</section>"#,
        errors = error_list(errors),
        username = escape(username),
    );
    layout("Edit Account", Some(session), &body)
}
