use std::sync::Arc;

use tokio::task::JoinSet;

use crate::api::{ApiError, Backend};
use crate::session::{Command, Completion, Notice, Request, Response, Session, SessionError};
use crate::storage::KeyValueStore;

/// Owns the [`Session`] and executes its commands against a [`Backend`].
///
/// Commands run as independent tokio tasks; their completions are collected
/// in finishing order and applied on the task that owns the `App`, one at a time.
/// Dropping the `App` aborts whatever is still running.
pub struct App<B: Backend> {
    session: Session,
    backend: Arc<B>,
    tasks: JoinSet<Completion>,
}

impl<B: Backend> App<B> {
    pub fn new(backend: Arc<B>, prefs: Box<dyn KeyValueStore>) -> Self {
        Self { session: Session::new(prefs), backend, tasks: JoinSet::new() }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn start(&mut self) {
        let commands = self.session.start();
        self.dispatch(commands);
    }

    pub fn select_provider(&mut self, id: Option<&str>) -> Result<(), SessionError> {
        let commands = self.session.select_provider(id)?;
        self.dispatch(commands);
        Ok(())
    }

    pub fn select_conversation(&mut self, id: Option<&str>) -> Result<(), SessionError> {
        let commands = self.session.select_conversation(id)?;
        self.dispatch(commands);
        Ok(())
    }

    /// Re-fetches provider data and the open conversation.
    pub fn refresh(&mut self) {
        let mut commands = self.session.refresh();
        commands.extend(self.session.load_messages());
        self.dispatch(commands);
    }

    /// Returns false when there was nothing to send (no conversation or blank body).
    pub fn send_message(&mut self, body: &str) -> bool {
        match self.session.send_message(body) {
            Some(command) => {
                self.dispatch(vec![command]);
                true
            }
            None => false,
        }
    }

    /// Waits for the next completion. `None` when nothing is in flight.
    pub async fn recv(&mut self) -> Option<Completion> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(completion) => return Some(completion),
                Err(e) => log::error!("request task lost: {e}"),
            }
        }
        None
    }

    pub fn apply(&mut self, completion: Completion) -> Vec<Notice> {
        let update = self.session.apply(completion);
        self.dispatch(update.commands);
        update.notices
    }

    /// Applies completions until no request is left in flight.
    pub async fn settle(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(completion) = self.recv().await {
            notices.extend(self.apply(completion));
        }
        notices
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.tasks.spawn(supervise(Arc::clone(&self.backend), command));
        }
    }
}

// Runs the command on its own task so a panicking backend still yields a completion.
async fn supervise<B: Backend>(backend: Arc<B>, command: Command) -> Completion {
    let fallback = command.clone();
    match tokio::spawn(async move { execute(backend.as_ref(), command).await }).await {
        Ok(completion) => completion,
        Err(e) => {
            log::error!("request #{} did not finish: {e}", fallback.ticket.seq());
            let response = fallback.request.failed(ApiError::Aborted(e.to_string()));
            fallback.complete(response)
        }
    }
}

/// Runs one command against the backend.
pub async fn execute<B: Backend + ?Sized>(backend: &B, command: Command) -> Completion {
    let response = match &command.request {
        Request::Providers => Response::Providers(backend.providers().await),
        Request::Whoami { provider } => Response::Whoami(backend.whoami(provider).await),
        Request::Contacts { provider } => Response::Contacts(backend.contacts(provider).await),
        Request::Conversations { provider } => {
            Response::Conversations(backend.conversations(provider).await)
        }
        Request::Messages { provider, conversation } => {
            Response::Messages(backend.messages(provider, conversation).await)
        }
        Request::Send { provider, message } => Response::Sent(backend.send_message(provider, message).await),
    };
    command.complete(response)
}
