#![cfg(feature = "std")]
//! Shared table of live sessions.
//!
//! The registry hands out connection and session ids and remembers which
//! connections are bound to which session. It is cheap to clone and safe to
//! use from any task. A session stays registered for as long as its
//! [`SessionTicket`] is alive, so a session task that panics or returns
//! early is still removed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

/// Connection identifier, unique for the lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Session identifier, unique for the lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection already plays in a live session.
    AlreadyInSession {
        connection: ConnectionId,
        session: SessionId,
    },
    /// Both seats were given the same connection.
    SameConnection(ConnectionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyInSession {
                connection,
                session,
            } => write!(f, "{} is already playing in {}", connection, session),
            RegistryError::SameConnection(c) => {
                write!(f, "{} cannot play against itself", c)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Default)]
struct Inner {
    next_connection: u64,
    next_session: u64,
    sessions: HashMap<SessionId, [ConnectionId; 2]>,
    connections: HashMap<ConnectionId, SessionId>,
}

/// Registry of active sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: no critical section can panic halfway through.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A fresh id for an accepted connection.
    pub fn next_connection_id(&self) -> ConnectionId {
        let mut inner = self.lock();
        inner.next_connection += 1;
        ConnectionId(inner.next_connection)
    }

    /// Register a session for two connections.
    ///
    /// The returned ticket removes the session when dropped.
    pub fn begin(
        &self,
        one: ConnectionId,
        two: ConnectionId,
    ) -> Result<SessionTicket, RegistryError> {
        if one == two {
            return Err(RegistryError::SameConnection(one));
        }
        let mut inner = self.lock();
        for connection in [one, two] {
            if let Some(&session) = inner.connections.get(&connection) {
                return Err(RegistryError::AlreadyInSession {
                    connection,
                    session,
                });
            }
        }
        inner.next_session += 1;
        let id = SessionId(inner.next_session);
        inner.sessions.insert(id, [one, two]);
        inner.connections.insert(one, id);
        inner.connections.insert(two, id);
        info!("{} registered for {} and {}", id, one, two);
        Ok(SessionTicket {
            id,
            registry: self.clone(),
        })
    }

    fn end(&self, id: SessionId) {
        let mut inner = self.lock();
        if let Some(connections) = inner.sessions.remove(&id) {
            for connection in connections {
                inner.connections.remove(&connection);
            }
            debug!("{} removed from registry", id);
        }
    }

    pub fn active_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.lock().sessions.contains_key(&id)
    }

    /// The session `connection` currently plays in, if any.
    pub fn session_of(&self, connection: ConnectionId) -> Option<SessionId> {
        self.lock().connections.get(&connection).copied()
    }

    /// Ids of all live sessions, in creation order.
    pub fn sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.lock().sessions.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// Proof of registration for one session.
pub struct SessionTicket {
    id: SessionId,
    registry: SessionRegistry,
}

impl SessionTicket {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl fmt::Debug for SessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionTicket").field(&self.id).finish()
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.registry.end(self.id);
    }
}
