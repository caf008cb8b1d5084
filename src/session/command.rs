use crate::api::ApiError;
use crate::api::models::{Contact, Conversation, Message, Provider, SendMessage};

/// Issue-order tag attached to every outbound request.
///
/// Sequence numbers grow monotonically per session. A provider or conversation
/// switch records the current sequence number as its epoch, so any completion
/// whose ticket is not newer than the epoch belongs to a superseded selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Providers,
    Whoami { provider: String },
    Contacts { provider: String },
    Conversations { provider: String },
    Messages { provider: String, conversation: String },
    Send { provider: String, message: SendMessage },
}

impl Request {
    /// The provider the request is scoped to, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Request::Providers => None,
            Request::Whoami { provider }
            | Request::Contacts { provider }
            | Request::Conversations { provider }
            | Request::Messages { provider, .. }
            | Request::Send { provider, .. } => Some(provider.as_str()),
        }
    }

    /// The response this request gets when it fails with `error`.
    pub fn failed(&self, error: ApiError) -> Response {
        match self {
            Request::Providers => Response::Providers(Err(error)),
            Request::Whoami { .. } => Response::Whoami(Err(error)),
            Request::Contacts { .. } => Response::Contacts(Err(error)),
            Request::Conversations { .. } => Response::Conversations(Err(error)),
            Request::Messages { .. } => Response::Messages(Err(error)),
            Request::Send { .. } => Response::Sent(Err(error)),
        }
    }
}

/// A request the session wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub ticket: Ticket,
    pub request: Request,
}

#[derive(Debug)]
pub enum Response {
    Providers(Result<Vec<Provider>, ApiError>),
    Whoami(Result<Contact, ApiError>),
    Contacts(Result<Vec<Contact>, ApiError>),
    Conversations(Result<Vec<Conversation>, ApiError>),
    Messages(Result<Vec<Message>, ApiError>),
    Sent(Result<(), ApiError>),
}

/// A finished command, handed back to the session in arrival order.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub request: Request,
    pub response: Response,
}

impl Command {
    pub fn complete(self, response: Response) -> Completion {
        Completion { ticket: self.ticket, request: self.request, response }
    }
}

/// Something the user should be told about, produced while applying a completion.
#[derive(Debug)]
pub enum Notice {
    Sent { conversation: String },
    SendFailed { conversation: String, body: String, error: ApiError },
}

/// Result of applying one completion.
#[derive(Debug, Default)]
pub struct Update {
    pub commands: Vec<Command>,
    pub notices: Vec<Notice>,
}
