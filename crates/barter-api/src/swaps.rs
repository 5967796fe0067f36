use std::collections::HashSet;

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use barter_db::models::{TransitionOutcome, UNKNOWN_USER};
use barter_types::models::{Item, Session, SwapRequest, SwapStatus, new_id};
use barter_types::policy::{Action, Resource, authorize};
use barter_types::swap::{SwapAction, TransitionError};
use barter_types::validate::MAX_SWAP_MESSAGE_LEN;

use crate::error::AppError;
use crate::extract::SubmittedForm;
use crate::items::ItemInput;
use crate::middleware::set_flash;
use crate::state::AppState;
use crate::views::swaps::{IncomingRow, OutgoingRow, SwapFormValues, incoming_page, outgoing_page, request_page};

const DUPLICATE_REQUEST: &str =
    "You have already made a swap request for this item with the selected offering.";

/// Load the item being asked for and check it can be requested by `session`.
async fn swappable_target(state: &AppState, session: &Session, item_id: String) -> Result<Item, AppError> {
    let item = state
        .db(move |db| db.get_item(&item_id))
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "Item Not Found",
                "The item you are trying to swap with does not exist.",
            )
        })?;

    if item.is_swapped() {
        return Err(AppError::bad_request(
            "Item Already Swapped",
            "This item has already been swapped and is no longer available.",
        ));
    }

    authorize(&session.user.user_id, Action::RequestSwap, Resource::Item(&item))
        .map_err(|denied| AppError::bad_request("Invalid Request", denied.message))?;

    Ok(item)
}

async fn render_request_form(
    state: &AppState,
    session: &Session,
    target: &Item,
    values: &SwapFormValues,
    errors: &[String],
    status: StatusCode,
) -> Result<Response, AppError> {
    let owner_id = target.owner_id.clone();
    let user_id = session.user.user_id.clone();
    let (owner, own_items) = state
        .db(move |db| Ok((db.get_user_by_id(&owner_id)?, db.items_by_owner(&user_id)?)))
        .await?;

    let owner_name = owner.map(|u| u.username).unwrap_or_else(|| UNKNOWN_USER.to_string());
    let page = request_page(session, target, &owner_name, &own_items, values, errors);
    Ok((status, Html(page)).into_response())
}

pub async fn request_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let target = swappable_target(&state, &session, id).await?;
    render_request_form(&state, &session, &target, &SwapFormValues::default(), &[], StatusCode::OK)
        .await
}

/// What the requester is putting up for the swap.
enum Offer {
    Existing(Item),
    New(ItemInput),
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    mut form: SubmittedForm,
) -> Result<Response, AppError> {
    let target = swappable_target(&state, &session, id).await?;
    let requester_id = session.user.user_id.clone();

    let offered_item_id = form.text("offeredItemId");
    let create_new_item = form.flag("createNewItem");
    let message = form.text("message");

    let mut errors = Vec::new();
    if offered_item_id.is_empty() && !create_new_item {
        errors.push(
            "Please select an existing item or create a new one to offer for the swap.".to_string(),
        );
    }
    if message.is_empty() {
        errors.push("Please provide a message for your swap request.".to_string());
    }
    if message.chars().count() > MAX_SWAP_MESSAGE_LEN {
        errors.push("Message must be less than 1000 characters.".to_string());
    }

    let mut values = SwapFormValues {
        offered_item_id: offered_item_id.clone(),
        message: message.clone(),
        create_new_item,
        ..SwapFormValues::default()
    };

    let offer = if create_new_item {
        let input = ItemInput::parse(&mut form);
        values.new_item = input.values.clone();
        errors.extend(input.errors.iter().cloned());
        Some(Offer::New(input))
    } else if !offered_item_id.is_empty() {
        let lookup = offered_item_id.clone();
        let offered = state.db(move |db| db.get_item(&lookup)).await?;
        match offered {
            Some(item)
                if authorize(&requester_id, Action::OfferItem, Resource::Item(&item)).is_ok() =>
            {
                if item.is_swapped() {
                    errors.push("The item you offered has already been swapped.".to_string());
                }
                Some(Offer::Existing(item))
            }
            _ => {
                errors.push("Invalid item selection. Please choose one of your own items.".to_string());
                None
            }
        }
    } else {
        None
    };

    let offer = match offer {
        Some(offer) if errors.is_empty() => offer,
        _ => {
            return render_request_form(&state, &session, &target, &values, &errors, StatusCode::BAD_REQUEST)
                .await;
        }
    };

    let mut swap = SwapRequest {
        swap_request_id: new_id(),
        item_id: target.item_id.clone(),
        offered_item_id: String::new(),
        requester_id: requester_id.clone(),
        receiver_id: target.owner_id.clone(),
        message,
        image_url: None,
        status: SwapStatus::Pending,
        created_at: Utc::now(),
        accepted_at: None,
        rejected_at: None,
        cancelled_at: None,
    };

    let stored = match offer {
        Offer::Existing(item) => {
            swap.offered_item_id = item.item_id.clone();
            swap.image_url = item.display_image_url();

            let candidate = swap.clone();
            state
                .db(move |db| {
                    if db
                        .find_swap_request(&candidate.item_id, &candidate.requester_id, &candidate.offered_item_id)?
                        .is_some()
                    {
                        return Ok(false);
                    }
                    match db.insert_swap_request(&candidate) {
                        Err(barter_db::Error::Duplicate { .. }) => Ok(false),
                        other => other.map(|_| true),
                    }
                })
                .await?
        }
        Offer::New(input) => {
            let new_item = input.into_new_item(&requester_id);
            swap.offered_item_id = new_item.item_id.clone();
            swap.image_url = new_item.image_url.clone();

            let candidate = swap.clone();
            state
                .db(move |db| db.insert_swap_request_with_item(&new_item, &candidate))
                .await?;
            state.audit("ITEM_CREATE", Some(requester_id.clone()));
            true
        }
    };

    if !stored {
        let errors = vec![DUPLICATE_REQUEST.to_string()];
        return render_request_form(&state, &session, &target, &values, &errors, StatusCode::BAD_REQUEST)
            .await;
    }

    info!(
        "User {} requested item {} for item {}",
        requester_id, swap.item_id, swap.offered_item_id
    );
    state.audit("SWAP_REQUEST_CREATE", Some(requester_id));
    set_flash(&state, &session, "Swap request sent successfully!").await;
    Ok(Redirect::to("/search").into_response())
}

pub async fn outgoing(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    let user_id = session.user.user_id.clone();
    let rows = state
        .db(move |db| {
            let swaps = db.swap_requests_by_requester(&user_id)?;
            let item_ids = distinct(swaps.iter().flat_map(|s| [&s.item_id, &s.offered_item_id]));
            let items = db.items_by_ids(&item_ids)?;
            let owner_ids = distinct(items.values().map(|i| &i.owner_id));
            let owners = db.get_profiles(&owner_ids)?;

            let owner_of = |item: Option<&Item>| {
                item.and_then(|i| owners.get(&i.owner_id))
                    .map(|p| p.username.clone())
                    .unwrap_or_else(|| UNKNOWN_USER.to_string())
            };

            Ok(swaps
                .into_iter()
                .map(|swap| {
                    let target = items.get(&swap.item_id).cloned();
                    let offered = items.get(&swap.offered_item_id).cloned();
                    OutgoingRow {
                        target_owner: owner_of(target.as_ref()),
                        offered_owner: owner_of(offered.as_ref()),
                        swap,
                        target,
                        offered,
                    }
                })
                .collect::<Vec<_>>())
        })
        .await?;

    Ok(Html(outgoing_page(&session, &rows)))
}

pub async fn incoming(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    let user_id = session.user.user_id.clone();
    let rows = state
        .db(move |db| {
            let swaps = db.swap_requests_by_receiver(&user_id)?;
            let item_ids = distinct(swaps.iter().flat_map(|s| [&s.item_id, &s.offered_item_id]));
            let items = db.items_by_ids(&item_ids)?;
            let requester_ids = distinct(swaps.iter().map(|s| &s.requester_id));
            let requesters = db.get_profiles(&requester_ids)?;

            Ok(swaps
                .into_iter()
                .map(|swap| IncomingRow {
                    target: items.get(&swap.item_id).cloned(),
                    offered: items.get(&swap.offered_item_id).cloned(),
                    requester: requesters.get(&swap.requester_id).cloned(),
                    swap,
                })
                .collect::<Vec<_>>())
        })
        .await?;

    Ok(Html(incoming_page(&session, &rows)))
}

fn distinct<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

fn capitalized(verb: &str) -> String {
    let mut chars = verb.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn not_pending(current: SwapStatus, action: SwapAction) -> AppError {
    AppError::bad_request(
        format!("Cannot {}", capitalized(action.verb())),
        TransitionError { current, action }.to_string(),
    )
}

async fn transition(
    state: AppState,
    session: Session,
    swap_request_id: String,
    action: SwapAction,
) -> Result<Redirect, AppError> {
    let lookup = swap_request_id.clone();
    let swap = state
        .db(move |db| db.get_swap_request(&lookup))
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "Swap Request Not Found",
                format!("The swap request you are trying to {} does not exist.", action.verb()),
            )
        })?;

    if let Err(denied) = authorize(&session.user.user_id, Action::Swap(action), Resource::SwapRequest(&swap)) {
        warn!(
            "User {} attempted to {} swap request {}",
            session.user.user_id, action, swap_request_id
        );
        return Err(denied.into());
    }

    swap.status
        .apply(action)
        .map_err(|e| not_pending(e.current, e.action))?;

    let target = swap_request_id.clone();
    let outcome = state
        .db(move |db| db.transition_swap_request(&target, action, Utc::now()))
        .await?;

    match outcome {
        TransitionOutcome::Applied(_) => {}
        TransitionOutcome::NotFound => {
            return Err(AppError::not_found(
                "Swap Request Not Found",
                format!("The swap request you are trying to {} does not exist.", action.verb()),
            ));
        }
        TransitionOutcome::NotPending(current) => return Err(not_pending(current, action)),
        TransitionOutcome::ItemUnavailable => {
            return Err(AppError::conflict(
                "Item No Longer Available",
                "One of the items in this swap is no longer available.",
            ));
        }
    }

    info!(
        "User {} moved swap request {} to {}",
        session.user.user_id,
        swap_request_id,
        action.target()
    );
    state.audit(action.log_action(), Some(session.user.user_id.clone()));

    let (flash, back) = match action {
        SwapAction::Accept => ("Swap request accepted successfully!", "/swaps/incoming"),
        SwapAction::Reject => ("Swap request rejected.", "/swaps/incoming"),
        SwapAction::Cancel => ("Swap request cancelled successfully.", "/swaps/outgoing"),
    };
    set_flash(&state, &session, flash).await;
    Ok(Redirect::to(back))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    transition(state, session, id, SwapAction::Accept).await
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    transition(state, session, id, SwapAction::Reject).await
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    transition(state, session, id, SwapAction::Cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence() {
        let ids = ["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(distinct(ids.iter()), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn not_pending_message() {
        let err = not_pending(SwapStatus::Rejected, SwapAction::Cancel);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.title(), "Cannot Cancel");
        assert_eq!(
            err.message(),
            "Only pending swap requests can be cancelled. This request is already rejected."
        );
    }
}
