//! Outbound fan-out: one queue per connected client.
//!
//! Each connection handler registers an unbounded sender here; the
//! broadcast and rule-scan loops push events into those queues without
//! ever touching a socket. The handler task on the other end is the only
//! thing that writes to its WebSocket.

use std::collections::HashMap;

use ecopulse_protocol::{ServerEvent, SessionId};
use tokio::sync::mpsc;

/// Sender half of a client's outbound queue.
pub(crate) type ClientSender = mpsc::UnboundedSender<ServerEvent>;

/// Tracks the outbound queue of every connected client.
///
/// Not thread-safe by itself; lives behind a mutex in the shared server
/// state, same as the session store.
#[derive(Default)]
pub(crate) struct ClientRegistry {
    clients: HashMap<SessionId, ClientSender>,
}

impl ClientRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a client's outbound queue.
    pub(crate) fn insert(&mut self, id: SessionId, sender: ClientSender) {
        self.clients.insert(id, sender);
    }

    /// Drops a client's queue (at disconnect).
    pub(crate) fn remove(&mut self, id: SessionId) {
        self.clients.remove(&id);
    }

    /// Queues an event for one client.
    ///
    /// A missing or closed queue is not an error: the client is simply
    /// gone, and teardown will catch up shortly.
    pub(crate) fn send_to(&self, id: SessionId, event: ServerEvent) {
        match self.clients.get(&id) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    tracing::debug!(%id, "client queue closed, event dropped");
                }
            }
            None => {
                tracing::debug!(%id, "no client queue, event dropped");
            }
        }
    }

    /// Queues an event for every connected client. Returns how many
    /// queues accepted it.
    pub(crate) fn broadcast(&self, event: &ServerEvent) -> usize {
        let mut delivered = 0;
        for sender in self.clients.values() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of registered clients.
    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }
}
