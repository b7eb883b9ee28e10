//! Connected-client registry.
//!
//! The registry is the host's in-memory list of the handhelds connected right
//! now.  Each connection registers itself when its WebSocket handshake
//! completes and removes itself when its task ends, whatever the reason.
//!
//! The server keeps the registry behind a `Mutex`; it is only ever locked for
//! a single insert, update, or snapshot.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::SystemTime;

use uuid::Uuid;

/// What the host knows about one connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedClient {
    pub id: Uuid,
    pub peer: SocketAddr,
    pub connected_at: SystemTime,
    pub authorized: bool,
}

impl ConnectedClient {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            connected_at: SystemTime::now(),
            authorized: false,
        }
    }
}

/// In-memory registry of connected clients, keyed by connection id.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<Uuid, ConnectedClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client.  Returns its id.
    pub fn insert(&mut self, client: ConnectedClient) -> Uuid {
        let id = client.id;
        self.clients.insert(id, client);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&ConnectedClient> {
        self.clients.get(&id)
    }

    /// Records that the client typed the password.
    pub fn set_authorized(&mut self, id: Uuid, authorized: bool) {
        if let Some(client) = self.clients.get_mut(&id) {
            client.authorized = authorized;
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ConnectedClient> {
        self.clients.remove(&id)
    }

    /// Returns a snapshot of all clients, oldest connection first.
    pub fn all(&self) -> Vec<ConnectedClient> {
        let mut clients: Vec<_> = self.clients.values().cloned().collect();
        clients.sort_by_key(|c| c.connected_at);
        clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([192, 168, 1, 20], port))
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = ClientRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_insert_then_get() {
        // Arrange
        let mut registry = ClientRegistry::new();

        // Act
        let id = registry.insert(ConnectedClient::new(peer(50000)));

        // Assert
        let client = registry.get(id).expect("registered");
        assert_eq!(client.peer, peer(50000));
        assert!(!client.authorized);
    }

    #[test]
    fn test_each_connection_gets_its_own_id() {
        let mut registry = ClientRegistry::new();
        let a = registry.insert(ConnectedClient::new(peer(1)));
        let b = registry.insert(ConnectedClient::new(peer(1)));

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_set_authorized_updates_entry() {
        let mut registry = ClientRegistry::new();
        let id = registry.insert(ConnectedClient::new(peer(2)));

        registry.set_authorized(id, true);

        assert!(registry.get(id).unwrap().authorized);
    }

    #[test]
    fn test_set_authorized_on_unknown_id_is_noop() {
        let mut registry = ClientRegistry::new();
        registry.set_authorized(Uuid::new_v4(), true);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_deletes_client() {
        let mut registry = ClientRegistry::new();
        let id = registry.insert(ConnectedClient::new(peer(3)));

        let removed = registry.remove(id);

        assert_eq!(removed.map(|c| c.id), Some(id));
        assert!(registry.get(id).is_none());
    }
}
