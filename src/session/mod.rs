//! Client-side session orchestration.
//!
//! [`Session`] is a synchronous state machine. Every user operation mutates
//! state immediately (clearing whatever the operation invalidates) and returns
//! the [`Command`]s that need executing. Completions are fed back through
//! [`Session::apply`] in whatever order they arrive; each carries the
//! [`Ticket`] it was issued under, and completions belonging to a provider or
//! conversation that is no longer active are dropped.

mod command;
mod conversation;
mod layout;
mod loadable;
mod provider;
mod store;

pub use command::{Command, Completion, Notice, Request, Response, Ticket, Update};
pub use conversation::{ConversationController, Direction, classify};
pub use layout::LayoutMode;
pub use loadable::Loadable;
pub use provider::{ActiveProvider, ProviderSelector};
pub use store::SessionStore;

use thiserror::Error;

use crate::api::models::{Contact, Conversation, Message, Provider};
use crate::storage::KeyValueStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("no conversation '{0}' for the active provider")]
    UnknownConversation(String),
    #[error("no provider selected")]
    NoProvider,
}

pub struct Session {
    selector: ProviderSelector,
    store: SessionStore,
    chat: ConversationController,
    seq: u64,
}

impl Session {
    /// Restores the persisted provider selection and catalog cache.
    pub fn new(prefs: Box<dyn KeyValueStore>) -> Self {
        let selector = ProviderSelector::restore(prefs);
        let mut store = SessionStore::default();
        store.reset(selector.active_id().is_some(), 0);
        Self { selector, store, chat: ConversationController::default(), seq: 0 }
    }

    /// Startup fetches: the provider catalog, plus the scoped data for a
    /// restored provider. Only the first call issues anything.
    pub fn start(&mut self) -> Vec<Command> {
        if !self.selector.take_catalog_request() {
            return Vec::new();
        }
        let mut commands = vec![self.issue(Request::Providers)];
        if let Some(provider) = self.selector.active_id().map(str::to_string) {
            commands.extend(SessionStore::requests(&provider).map(|r| self.issue(r)));
        }
        commands
    }

    /// Switches (or clears) the active provider. Re-selecting the active one is a no-op.
    pub fn select_provider(&mut self, id: Option<&str>) -> Result<Vec<Command>, SessionError> {
        if self.selector.active_id() == id {
            return Ok(Vec::new());
        }
        if let Some(id) = id {
            if !self.selector.accepts(id) {
                return Err(SessionError::UnknownProvider(id.to_string()));
            }
        }
        log::info!("switching provider {:?} -> {:?}", self.selector.active_id(), id);
        self.selector.set_active(id);

        let epoch = self.bump();
        self.store.reset(id.is_some(), epoch);
        self.chat.select(None, epoch);

        Ok(match id {
            Some(provider) => Vec::from(SessionStore::requests(provider).map(|r| self.issue(r))),
            None => Vec::new(),
        })
    }

    /// Re-fetches self, contacts and conversations without clearing them.
    pub fn refresh(&mut self) -> Vec<Command> {
        let Some(provider) = self.selector.active_id().map(str::to_string) else {
            return Vec::new();
        };
        Vec::from(SessionStore::requests(&provider).map(|r| self.issue(r)))
    }

    /// Selects a conversation from the loaded list, or deselects with `None`.
    /// Re-selecting the active conversation reloads it from scratch.
    pub fn select_conversation(&mut self, id: Option<&str>) -> Result<Vec<Command>, SessionError> {
        let conversation = match id {
            None => None,
            Some(id) => {
                if self.selector.active_id().is_none() {
                    return Err(SessionError::NoProvider);
                }
                let found = self
                    .store
                    .conversation(id)
                    .cloned()
                    .ok_or_else(|| SessionError::UnknownConversation(id.to_string()))?;
                Some(found)
            }
        };
        let epoch = self.bump();
        self.chat.select(conversation, epoch);
        Ok(self.load_messages().into_iter().collect())
    }

    /// Fetches the active conversation's messages, leaving current ones in place until they arrive.
    pub fn load_messages(&mut self) -> Option<Command> {
        let provider = self.selector.active_id()?;
        let request = self.chat.load_request(provider)?;
        Some(self.issue(request))
    }

    /// Submits `body` to the active conversation. Nothing is appended locally;
    /// history is reloaded once the server acknowledges.
    pub fn send_message(&mut self, body: &str) -> Option<Command> {
        let provider = self.selector.active_id()?;
        let request = self.chat.send_request(provider, body)?;
        Some(self.issue(request))
    }

    pub fn apply(&mut self, completion: Completion) -> Update {
        let Completion { ticket, request, response } = completion;
        let active = self.selector.active_id().map(str::to_string);
        let active = active.as_deref();
        let mut update = Update::default();

        match (request, response) {
            (Request::Providers, Response::Providers(result)) => self.selector.apply_catalog(result),
            (Request::Whoami { provider }, Response::Whoami(result)) => {
                if self.store.is_current(ticket, &provider, active) {
                    self.store.apply_whoami(ticket, result);
                } else {
                    discard(ticket, "self", &provider);
                }
            }
            (Request::Contacts { provider }, Response::Contacts(result)) => {
                if self.store.is_current(ticket, &provider, active) {
                    self.store.apply_contacts(ticket, result);
                } else {
                    discard(ticket, "contacts", &provider);
                }
            }
            (Request::Conversations { provider }, Response::Conversations(result)) => {
                if self.store.is_current(ticket, &provider, active) {
                    if self.store.apply_conversations(ticket, result) {
                        self.reconcile_selection();
                    }
                } else {
                    discard(ticket, "conversations", &provider);
                }
            }
            (Request::Messages { provider, conversation }, Response::Messages(result)) => {
                if self.store.is_current(ticket, &provider, active)
                    && self.chat.is_current(ticket, &conversation)
                {
                    self.chat.apply_messages(ticket, result);
                } else {
                    discard(ticket, "messages", &provider);
                }
            }
            (Request::Send { provider, message }, Response::Sent(result)) => match result {
                Ok(()) => {
                    let still_open = self.store.is_current(ticket, &provider, active)
                        && self.chat.is_current(ticket, &message.conversation_id);
                    if still_open {
                        update.commands.extend(self.load_messages());
                    }
                    update.notices.push(Notice::Sent { conversation: message.conversation_id });
                }
                Err(error) => {
                    log::warn!("send to {} failed: {error}", message.conversation_id);
                    update.notices.push(Notice::SendFailed {
                        conversation: message.conversation_id,
                        body: message.body,
                        error,
                    });
                }
            },
            (request, response) => {
                log::warn!("completion does not match its request: {request:?} / {response:?}");
            }
        }
        update
    }

    pub fn providers(&self) -> &Loadable<Vec<Provider>> {
        self.selector.catalog()
    }

    pub fn active_provider(&self) -> ActiveProvider<'_> {
        self.selector.active()
    }

    pub fn active_provider_id(&self) -> Option<&str> {
        self.selector.active_id()
    }

    pub fn me(&self) -> &Loadable<Contact> {
        self.store.me()
    }

    pub fn contacts(&self) -> &Loadable<Vec<Contact>> {
        self.store.contacts()
    }

    pub fn conversations(&self) -> &Loadable<Vec<Conversation>> {
        self.store.conversations()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.chat.active()
    }

    pub fn messages(&self) -> &Loadable<Vec<Message>> {
        self.chat.messages()
    }

    pub fn layout(&self) -> LayoutMode {
        LayoutMode::for_selection(self.chat.active())
    }

    pub fn direction<'a>(&'a self, message: &Message) -> Direction<'a> {
        classify(message, self.store.me().ready(), self.store.contacts().ready().map(Vec::as_slice))
    }

    fn bump(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn issue(&mut self, request: Request) -> Command {
        let ticket = Ticket(self.bump());
        log::debug!("issuing #{} {:?}", ticket.seq(), request);
        Command { ticket, request }
    }

    // A refreshed list may no longer contain the open conversation.
    fn reconcile_selection(&mut self) {
        let Some(active) = self.chat.active().map(|c| c.id.clone()) else {
            return;
        };
        if self.store.conversations().ready().is_some() && self.store.conversation(&active).is_none() {
            log::info!("conversation {active} disappeared, closing it");
            let epoch = self.bump();
            self.chat.select(None, epoch);
        }
    }
}

fn discard(ticket: Ticket, what: &str, provider: &str) {
    log::debug!("discarding stale {what} #{} for provider {provider}", ticket.seq());
}
