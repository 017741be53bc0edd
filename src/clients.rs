//! Connected Clients
//!
//! The seam through which the policy reaches browser sessions: enumerating
//! them, pushing messages, and claiming control on activation. The host
//! adapter implements [`ClientHub`]; [`InMemoryClients`] serves hosts that
//! track sessions in-process, and the tests.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use spin::RwLock;

use crate::message::OutboundMessage;

/// Client session ID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// Create a new client ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client hub error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Enumerating connected sessions failed
    Enumeration(String),
    /// Delivery to a single session failed
    Delivery(String),
}

/// Connected-session seam implemented by the host adapter.
pub trait ClientHub: Send + Sync {
    /// Enumerate currently connected sessions
    fn connected(&self) -> Result<Vec<ClientId>, ClientError>;

    /// Push a message to one session
    fn post_message(&self, client: &ClientId, message: &OutboundMessage) -> Result<(), ClientError>;

    /// Take control of all open sessions immediately (no reload wait)
    fn claim(&self) -> Result<(), ClientError>;
}

impl<T: ClientHub> ClientHub for alloc::sync::Arc<T> {
    fn connected(&self) -> Result<Vec<ClientId>, ClientError> {
        (**self).connected()
    }

    fn post_message(&self, client: &ClientId, message: &OutboundMessage) -> Result<(), ClientError> {
        (**self).post_message(client, message)
    }

    fn claim(&self) -> Result<(), ClientError> {
        (**self).claim()
    }
}

/// One tracked session
#[derive(Debug, Clone)]
struct Session {
    id: ClientId,
    controlled: bool,
    inbox: Vec<OutboundMessage>,
}

/// In-memory client registry.
pub struct InMemoryClients {
    sessions: RwLock<Vec<Session>>,
}

impl InMemoryClients {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(Vec::new()),
        }
    }

    /// Register a connected session
    pub fn connect(&self, id: impl Into<String>) -> ClientId {
        let id = ClientId::new(id);
        let mut sessions = self.sessions.write();
        if !sessions.iter().any(|s| s.id == id) {
            sessions.push(Session {
                id: id.clone(),
                controlled: false,
                inbox: Vec::new(),
            });
        }
        id
    }

    /// Remove a session; returns whether it was connected
    pub fn disconnect(&self, id: &ClientId) -> bool {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|s| &s.id != id);
        sessions.len() != before
    }

    /// Messages delivered to a session so far
    pub fn inbox(&self, id: &ClientId) -> Vec<OutboundMessage> {
        self.sessions
            .read()
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.inbox.clone())
            .unwrap_or_default()
    }

    /// Check whether a session is controlled by the worker
    pub fn is_controlled(&self, id: &ClientId) -> bool {
        self.sessions
            .read()
            .iter()
            .any(|s| &s.id == id && s.controlled)
    }
}

impl Default for InMemoryClients {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientHub for InMemoryClients {
    fn connected(&self) -> Result<Vec<ClientId>, ClientError> {
        Ok(self.sessions.read().iter().map(|s| s.id.clone()).collect())
    }

    fn post_message(&self, client: &ClientId, message: &OutboundMessage) -> Result<(), ClientError> {
        let mut sessions = self.sessions.write();
        match sessions.iter_mut().find(|s| &s.id == client) {
            Some(session) => {
                session.inbox.push(message.clone());
                Ok(())
            }
            None => Err(ClientError::Delivery(client.as_str().to_string())),
        }
    }

    fn claim(&self) -> Result<(), ClientError> {
        for session in self.sessions.write().iter_mut() {
            session.controlled = true;
        }
        Ok(())
    }
}
