use crate::api::ApiError;
use crate::api::models::{Contact, Conversation, Message, SendMessage};
use crate::session::command::{Request, Ticket};
use crate::session::Loadable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction<'a> {
    Outgoing,
    /// `sender` is `None` when contacts are not loaded or the sender left the directory.
    Incoming { sender: Option<&'a Contact> },
}

impl Direction<'_> {
    pub fn is_outgoing(&self) -> bool {
        matches!(self, Direction::Outgoing)
    }
}

pub fn classify<'a>(message: &Message, me: Option<&Contact>, contacts: Option<&'a [Contact]>) -> Direction<'a> {
    if me.is_some_and(|me| me.id == message.sender) {
        return Direction::Outgoing;
    }
    let sender = contacts.and_then(|list| list.iter().find(|c| c.id == message.sender));
    Direction::Incoming { sender }
}

/// The active conversation and its message history.
#[derive(Debug, Default)]
pub struct ConversationController {
    active: Option<Conversation>,
    messages: Loadable<Vec<Message>>,
    // Sequence number at the last selection change.
    epoch: u64,
    // Newest message load applied for the current selection.
    applied: u64,
}

impl ConversationController {
    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    pub fn messages(&self) -> &Loadable<Vec<Message>> {
        &self.messages
    }

    /// Replaces the selection and clears messages before anything is fetched.
    pub(crate) fn select(&mut self, conversation: Option<Conversation>, epoch: u64) {
        self.messages = if conversation.is_some() { Loadable::Loading } else { Loadable::Absent };
        self.active = conversation;
        self.epoch = epoch;
        self.applied = epoch;
    }

    pub(crate) fn load_request(&self, provider: &str) -> Option<Request> {
        let conv = self.active.as_ref()?;
        Some(Request::Messages { provider: provider.to_string(), conversation: conv.id.clone() })
    }

    pub(crate) fn send_request(&self, provider: &str, body: &str) -> Option<Request> {
        let conv = self.active.as_ref()?;
        if body.trim().is_empty() {
            return None;
        }
        Some(Request::Send {
            provider: provider.to_string(),
            message: SendMessage { conversation_id: conv.id.clone(), body: body.to_string() },
        })
    }

    /// True while `conversation` is still the selection `ticket` was issued under.
    pub(crate) fn is_current(&self, ticket: Ticket, conversation: &str) -> bool {
        self.active.as_ref().is_some_and(|c| c.id == conversation) && ticket.seq() > self.epoch
    }

    pub(crate) fn apply_messages(&mut self, ticket: Ticket, result: Result<Vec<Message>, ApiError>) {
        if ticket.seq() <= self.applied {
            log::debug!("dropping superseded message load #{}", ticket.seq());
            return;
        }
        self.applied = ticket.seq();
        match result {
            Ok(list) => self.messages = Loadable::Ready(list),
            Err(e) => {
                log::warn!("failed to load messages: {e}");
                // A failed reload leaves the shown history in place.
                if self.messages.ready().is_none() {
                    self.messages = Loadable::Failed(e.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn message(sender: &str) -> Message {
        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Message { timestamp, body: Some("hi".into()), sender: sender.into() }
    }

    fn contact(id: &str, name: &str) -> Contact {
        Contact { id: id.into(), name: name.into(), avatar: String::new() }
    }

    fn conversation(id: &str) -> Conversation {
        Conversation { id: id.into(), name: id.into(), avatar: String::new(), last_active: None }
    }

    #[test]
    fn direction_follows_self_id() {
        let me = contact("u1", "Me");
        let contacts = vec![contact("u2", "Ada")];
        let dirs: Vec<bool> = [message("u1"), message("u2")]
            .iter()
            .map(|m| classify(m, Some(&me), Some(contacts.as_slice())).is_outgoing())
            .collect();
        assert_eq!(dirs, [true, false]);
    }

    #[test]
    fn unresolved_sender_is_anonymous_incoming() {
        let me = contact("u1", "Me");
        assert_eq!(classify(&message("u9"), Some(&me), Some(Vec::new().as_slice())), Direction::Incoming { sender: None });
        assert_eq!(classify(&message("u2"), Some(&me), None), Direction::Incoming { sender: None });
        // Without self loaded nothing can be ours.
        assert_eq!(classify(&message("u1"), None, None), Direction::Incoming { sender: None });
    }

    #[test]
    fn newer_load_wins_over_late_older_one() {
        let mut ctl = ConversationController::default();
        ctl.select(Some(conversation("c1")), 10);
        ctl.apply_messages(Ticket(12), Ok(vec![message("u1"), message("u2")]));
        ctl.apply_messages(Ticket(11), Ok(vec![]));
        assert_eq!(ctl.messages().ready().map(Vec::len), Some(2));
    }

    #[test]
    fn failed_reload_keeps_history() {
        let mut ctl = ConversationController::default();
        ctl.select(Some(conversation("c1")), 1);
        ctl.apply_messages(Ticket(2), Ok(vec![message("u2")]));
        ctl.apply_messages(Ticket(3), Err(ApiError::Status { status: 503, path: "/messages".into() }));
        assert_eq!(ctl.messages().ready().map(Vec::len), Some(1));
    }

    #[test]
    fn blank_body_is_not_sent() {
        let mut ctl = ConversationController::default();
        assert_eq!(ctl.send_request("p1", "hello"), None);
        ctl.select(Some(conversation("c1")), 1);
        assert_eq!(ctl.send_request("p1", "  \n"), None);
        assert!(ctl.send_request("p1", "hello").is_some());
    }
}
