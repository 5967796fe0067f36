//! Ownership rules for every mutating route.
//!
//! Handlers load the entity, then call [`authorize`] with the session user's
//! id. A denial carries the message shown to the user.

use thiserror::Error;

use crate::models::{Item, Message, SwapRequest};
use crate::swap::SwapAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditItem,
    DeleteItem,
    /// Ask for someone else's item.
    RequestSwap,
    /// Put one of your own items up as the offer.
    OfferItem,
    Swap(SwapAction),
    DeleteMessage,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Item(&'a Item),
    SwapRequest(&'a SwapRequest),
    Message(&'a Message),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Denied {
    pub action: Action,
    pub message: &'static str,
}

pub fn authorize(actor_id: &str, action: Action, resource: Resource<'_>) -> Result<(), Denied> {
    let allowed = match (action, resource) {
        (Action::EditItem | Action::DeleteItem | Action::OfferItem, Resource::Item(item)) => {
            item.owner_id == actor_id
        }
        (Action::RequestSwap, Resource::Item(item)) => item.owner_id != actor_id,
        (Action::Swap(SwapAction::Accept | SwapAction::Reject), Resource::SwapRequest(req)) => {
            req.receiver_id == actor_id
        }
        (Action::Swap(SwapAction::Cancel), Resource::SwapRequest(req)) => {
            req.requester_id == actor_id
        }
        (Action::DeleteMessage, Resource::Message(msg)) => msg.sender_id == actor_id,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(Denied {
            action,
            message: denial_message(action),
        })
    }
}

fn denial_message(action: Action) -> &'static str {
    match action {
        Action::EditItem => "You can only edit your own items.",
        Action::DeleteItem => "You can only delete your own items.",
        Action::RequestSwap => "You cannot request to swap with your own item.",
        Action::OfferItem => "Invalid item selection. Please choose one of your own items.",
        Action::Swap(SwapAction::Accept) => "You are not authorized to accept this swap request.",
        Action::Swap(SwapAction::Reject) => "You are not authorized to reject this swap request.",
        Action::Swap(SwapAction::Cancel) => "You can only cancel your own swap requests.",
        Action::DeleteMessage => "You can only delete your own message",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{ItemStatus, SwapStatus};

    fn item(owner: &str) -> Item {
        let now = Utc::now();
        Item {
            item_id: "item-1".into(),
            title: "Tent".into(),
            description: "Two person".into(),
            owner_id: owner.into(),
            category: None,
            wanted_categories: vec![],
            image_url: None,
            has_image: false,
            status: ItemStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(requester: &str, receiver: &str) -> SwapRequest {
        SwapRequest {
            swap_request_id: "swap-1".into(),
            item_id: "item-1".into(),
            offered_item_id: "item-2".into(),
            requester_id: requester.into(),
            receiver_id: receiver.into(),
            message: "Trade?".into(),
            image_url: None,
            status: SwapStatus::Pending,
            created_at: Utc::now(),
            accepted_at: None,
            rejected_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn item_owner_may_edit_and_delete() {
        let it = item("alice");
        assert!(authorize("alice", Action::EditItem, Resource::Item(&it)).is_ok());
        assert!(authorize("alice", Action::DeleteItem, Resource::Item(&it)).is_ok());

        let err = authorize("bob", Action::EditItem, Resource::Item(&it)).unwrap_err();
        assert_eq!(err.message, "You can only edit your own items.");
    }

    #[test]
    fn cannot_request_own_item() {
        let it = item("alice");
        assert!(authorize("bob", Action::RequestSwap, Resource::Item(&it)).is_ok());
        assert!(authorize("alice", Action::RequestSwap, Resource::Item(&it)).is_err());
        assert!(authorize("bob", Action::OfferItem, Resource::Item(&it)).is_err());
    }

    #[test]
    fn only_receiver_accepts_or_rejects() {
        let req = request("bob", "alice");
        for action in [SwapAction::Accept, SwapAction::Reject] {
            assert!(authorize("alice", Action::Swap(action), Resource::SwapRequest(&req)).is_ok());
            assert!(authorize("bob", Action::Swap(action), Resource::SwapRequest(&req)).is_err());
            assert!(authorize("carol", Action::Swap(action), Resource::SwapRequest(&req)).is_err());
        }
    }

    #[test]
    fn only_requester_cancels() {
        let req = request("bob", "alice");
        let cancel = Action::Swap(SwapAction::Cancel);
        assert!(authorize("bob", cancel, Resource::SwapRequest(&req)).is_ok());
        let err = authorize("alice", cancel, Resource::SwapRequest(&req)).unwrap_err();
        assert_eq!(err.message, "You can only cancel your own swap requests.");
    }

    #[test]
    fn mismatched_resource_is_denied() {
        let it = item("alice");
        assert!(authorize("alice", Action::DeleteMessage, Resource::Item(&it)).is_err());
    }
}
