use std::fmt::Write;

use barter_db::models::UNKNOWN_USER;
use barter_types::models::{Item, Session, SwapRequest, SwapStatus, UserProfile};
use barter_types::validate::MAX_SWAP_MESSAGE_LEN;

use super::items::{ItemFormValues, item_card, item_fields};
use super::{error_list, escape, format_date, layout};

#[derive(Debug, Clone, Default)]
pub struct SwapFormValues {
    pub offered_item_id: String,
    pub message: String,
    pub create_new_item: bool,
    pub new_item: ItemFormValues,
}

pub struct OutgoingRow {
    pub swap: SwapRequest,
    pub target: Option<Item>,
    pub target_owner: String,
    pub offered: Option<Item>,
    pub offered_owner: String,
}

pub struct IncomingRow {
    pub swap: SwapRequest,
    pub target: Option<Item>,
    pub offered: Option<Item>,
    pub requester: Option<UserProfile>,
}

pub fn request_page(
    session: &Session,
    target: &Item,
    owner_name: &str,
    own_items: &[Item],
    values: &SwapFormValues,
    errors: &[String],
) -> String {
    let mut options = String::from(r#"<option value="">Choose one of your items</option>"#);
    for item in own_items.iter().filter(|i| !i.is_swapped()) {
        let sel = if item.item_id == values.offered_item_id { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{}"{}>{}</option>"#,
            escape(&item.item_id),
            sel,
            escape(&item.title)
        );
    }

    let body = format!(
        r#"<section>
  <h1>Request Swap</h1>
  {errors}
  {card}
  <form method="post" action="/swaps/{id}" enctype="multipart/form-data">
    <label>Offer one of your items
      <select name="offeredItemId">{options}</select>
    </label>
    <fieldset>
      <legend><label class="check"><input type="checkbox" name="createNewItem" value="true"{create}> Or offer a new item</label></legend>
      {new_item}
    </fieldset>
    <label>Message <textarea name="message" rows="4" maxlength="{max}">{message}</textarea></label>
    <button type="submit">Send request</button>
  </form>
</section>"#,
        errors = error_list(errors),
        card = item_card(target, Some(owner_name), ""),
        id = escape(&target.item_id),
        options = options,
        create = if values.create_new_item { " checked" } else { "" },
        new_item = item_fields(&values.new_item, false),
        max = MAX_SWAP_MESSAGE_LEN,
        message = escape(&values.message),
    );
    layout("Request Swap", Some(session), &body)
}

fn status_badge(status: SwapStatus) -> String {
    format!(r#"<span class="badge {0}">{0}</span>"#, status.as_str())
}

fn item_summary(item: Option<&Item>, owner: Option<&str>) -> String {
    match item {
        Some(item) => item_card(item, owner, ""),
        None => r#"<article class="item-card missing"><p>This item is no longer listed.</p></article>"#
            .to_string(),
    }
}

fn action_button(swap_id: &str, action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="/swaps/{}/{}" class="inline"><button type="submit">{}</button></form>"#,
        escape(swap_id),
        action,
        label
    )
}

pub fn outgoing_page(session: &Session, rows: &[OutgoingRow]) -> String {
    let mut list = String::new();
    for row in rows {
        let actions = if row.swap.status == SwapStatus::Pending {
            action_button(&row.swap.swap_request_id, "cancel", "Cancel request")
        } else {
            String::new()
        };
        let _ = write!(
            list,
            r#"<li class="swap">
  <header>{status} sent {date}</header>
  <div class="pair">
    <div><h4>You asked for</h4>{target}</div>
    <div><h4>You offered</h4>{offered}</div>
  </div>
  <blockquote>{message}</blockquote>
  {actions}
</li>"#,
            status = status_badge(row.swap.status),
            date = format_date(row.swap.created_at),
            target = item_summary(row.target.as_ref(), Some(&row.target_owner)),
            offered = item_summary(row.offered.as_ref(), Some(&row.offered_owner)),
            message = escape(&row.swap.message),
            actions = actions,
        );
    }

    let body = if rows.is_empty() {
        r#"<section><h1>My Swap Requests</h1><p class="empty">You have not sent any swap requests yet.</p></section>"#
            .to_string()
    } else {
        format!(r#"<section><h1>My Swap Requests</h1><ul class="swaps">{}</ul></section>"#, list)
    };
    layout("My Swap Requests", Some(session), &body)
}

pub fn incoming_page(session: &Session, rows: &[IncomingRow]) -> String {
    let mut list = String::new();
    for row in rows {
        let actions = if row.swap.status == SwapStatus::Pending {
            format!(
                "{}{}",
                action_button(&row.swap.swap_request_id, "accept", "Accept"),
                action_button(&row.swap.swap_request_id, "reject", "Reject")
            )
        } else {
            String::new()
        };
        let requester = row
            .requester
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or(UNKNOWN_USER);
        let _ = write!(
            list,
            r#"<li class="swap">
  <header>{status} from {requester} on {date}</header>
  <div class="pair">
    <div><h4>Your item</h4>{target}</div>
    <div><h4>They offer</h4>{offered}</div>
  </div>
  <blockquote>{message}</blockquote>
  {actions}
</li>"#,
            status = status_badge(row.swap.status),
            requester = escape(requester),
            date = format_date(row.swap.created_at),
            target = item_summary(row.target.as_ref(), None),
            offered = item_summary(row.offered.as_ref(), Some(requester)),
            message = escape(&row.swap.message),
            actions = actions,
        );
    }

    let body = if rows.is_empty() {
        r#"<section><h1>Received Swap Requests</h1><p class="empty">Nobody has asked for your items yet.</p></section>"#
            .to_string()
    } else {
        format!(r#"<section><h1>Received Swap Requests</h1><ul class="swaps">{}</ul></section>"#, list)
    };
    layout("Received Swap Requests", Some(session), &body)
}
