use crate::api::ApiError;
use crate::api::models::{Contact, Conversation};
use crate::session::command::{Request, Ticket};
use crate::session::Loadable;

/// Provider-scoped presentation data: self, contacts and conversations.
#[derive(Debug, Default)]
pub struct SessionStore {
    me: Loadable<Contact>,
    contacts: Loadable<Vec<Contact>>,
    conversations: Loadable<Vec<Conversation>>,
    // Sequence number at the last provider change.
    epoch: u64,
    // Newest completion applied to each field.
    me_seq: u64,
    contacts_seq: u64,
    conversations_seq: u64,
}

impl SessionStore {
    pub fn me(&self) -> &Loadable<Contact> {
        &self.me
    }

    pub fn contacts(&self) -> &Loadable<Vec<Contact>> {
        &self.contacts
    }

    pub fn conversations(&self) -> &Loadable<Vec<Conversation>> {
        &self.conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.ready()?.iter().find(|c| c.id == id)
    }

    /// Drops everything for the previous provider. `Loading` when a provider is
    /// now active, `Absent` otherwise.
    pub(crate) fn reset(&mut self, provider_active: bool, epoch: u64) {
        self.epoch = epoch;
        self.me_seq = epoch;
        self.contacts_seq = epoch;
        self.conversations_seq = epoch;
        if provider_active {
            self.me = Loadable::Loading;
            self.contacts = Loadable::Loading;
            self.conversations = Loadable::Loading;
        } else {
            self.me = Loadable::Absent;
            self.contacts = Loadable::Absent;
            self.conversations = Loadable::Absent;
        }
    }

    pub(crate) fn requests(provider: &str) -> [Request; 3] {
        [
            Request::Whoami { provider: provider.to_string() },
            Request::Contacts { provider: provider.to_string() },
            Request::Conversations { provider: provider.to_string() },
        ]
    }

    /// Whether a completion for `provider` issued under `ticket` still applies.
    pub(crate) fn is_current(&self, ticket: Ticket, provider: &str, active: Option<&str>) -> bool {
        active == Some(provider) && ticket.seq() > self.epoch
    }

    /// Each `apply_*` returns false when a newer completion already filled the field.
    pub(crate) fn apply_whoami(&mut self, ticket: Ticket, result: Result<Contact, ApiError>) -> bool {
        settle(&mut self.me, &mut self.me_seq, ticket, result, "self")
    }

    pub(crate) fn apply_contacts(&mut self, ticket: Ticket, result: Result<Vec<Contact>, ApiError>) -> bool {
        settle(&mut self.contacts, &mut self.contacts_seq, ticket, result, "contacts")
    }

    pub(crate) fn apply_conversations(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Conversation>, ApiError>,
    ) -> bool {
        settle(&mut self.conversations, &mut self.conversations_seq, ticket, result, "conversations")
    }
}

// A failure replaces Loading with Failed; data already shown survives a failed refresh.
fn settle<T>(
    slot: &mut Loadable<T>,
    applied: &mut u64,
    ticket: Ticket,
    result: Result<T, ApiError>,
    what: &str,
) -> bool {
    if ticket.seq() <= *applied {
        log::debug!("dropping superseded {what} #{}", ticket.seq());
        return false;
    }
    *applied = ticket.seq();
    match result {
        Ok(value) => *slot = Loadable::Ready(value),
        Err(e) => {
            log::warn!("failed to load {what}: {e}");
            if slot.ready().is_none() {
                *slot = Loadable::Failed(e.to_string());
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str) -> Contact {
        Contact { id: id.into(), name: id.into(), avatar: String::new() }
    }

    #[test]
    fn reset_distinguishes_absent_from_loading() {
        let mut store = SessionStore::default();
        store.reset(true, 1);
        assert!(store.me().is_loading());
        assert!(store.conversations().is_loading());
        store.reset(false, 2);
        assert!(store.me().is_absent());
        assert!(store.contacts().is_absent());
    }

    #[test]
    fn one_failure_leaves_other_fields_alone() {
        let mut store = SessionStore::default();
        store.reset(true, 1);
        store.apply_contacts(Ticket(2), Err(ApiError::Unauthorized { status: 401 }));
        store.apply_whoami(Ticket(3), Ok(contact("u1")));
        assert!(matches!(store.contacts(), Loadable::Failed(_)));
        assert_eq!(store.me().ready().map(|c| c.id.as_str()), Some("u1"));
        assert!(store.conversations().is_loading());
    }

    #[test]
    fn failed_refresh_keeps_loaded_data() {
        let mut store = SessionStore::default();
        store.reset(true, 1);
        store.apply_contacts(Ticket(2), Ok(vec![contact("u2")]));
        store.apply_contacts(Ticket(5), Err(ApiError::Status { status: 503, path: "/contacts".into() }));
        assert_eq!(store.contacts().ready().map(Vec::len), Some(1));
    }

    #[test]
    fn older_completion_does_not_overwrite_newer_one() {
        let mut store = SessionStore::default();
        store.reset(true, 1);
        assert!(store.apply_contacts(Ticket(4), Ok(vec![contact("u2"), contact("u3")])));
        assert!(!store.apply_contacts(Ticket(3), Ok(vec![contact("u2")])));
        assert_eq!(store.contacts().ready().map(Vec::len), Some(2));

        // A late failure from an older request is dropped as well.
        assert!(!store.apply_whoami(Ticket(2), Err(ApiError::Unauthorized { status: 401 })));
        assert!(store.me().is_loading());
    }

    #[test]
    fn reset_starts_a_fresh_ordering() {
        let mut store = SessionStore::default();
        store.reset(true, 1);
        store.apply_conversations(Ticket(9), Ok(Vec::new()));
        store.reset(true, 10);
        assert!(store.apply_conversations(Ticket(11), Ok(Vec::new())));
    }

    #[test]
    fn staleness_uses_provider_and_epoch() {
        let mut store = SessionStore::default();
        store.reset(true, 5);
        assert!(!store.is_current(Ticket(4), "p1", Some("p1")));
        assert!(store.is_current(Ticket(6), "p1", Some("p1")));
        assert!(!store.is_current(Ticket(6), "p1", Some("p2")));
        assert!(!store.is_current(Ticket(6), "p1", None));
    }
}
