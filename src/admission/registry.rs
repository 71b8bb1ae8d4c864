//! Client state registry with lazy, at-most-once provisioning.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::client::ClientState;
use crate::config::ClientLimits;

/// Maps client identifiers to their admission state.
///
/// The registry lock covers only the existence check and insertion of a
/// record, never an admission evaluation: callers receive the per-client
/// mutex and acquire it after the registry lock has been released, so the
/// two lock scopes are never nested and unrelated clients never contend.
///
/// Records live for the process lifetime. There is no eviction; this is an
/// intentional scope limit.
pub struct ClientRegistry {
    /// Per-client state indexed by client identifier
    clients: Mutex<HashMap<String, Arc<Mutex<ClientState>>>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the state for `client_id`, creating it from `limits` on
    /// first contact.
    ///
    /// The check-then-insert runs atomically under the registry lock, so at
    /// most one `ClientState` is ever created per identifier even when
    /// multiple callers race on the same new client.
    pub fn resolve(&self, client_id: &str, limits: ClientLimits) -> Arc<Mutex<ClientState>> {
        let mut clients = self.clients.lock();

        clients
            .entry(client_id.to_string())
            .or_insert_with(|| {
                debug!(
                    client_id = %client_id,
                    request_max = limits.request_max,
                    tokens_per_sec = limits.tokens_per_sec,
                    "Provisioning new client state"
                );
                Arc::new(Mutex::new(ClientState::new(limits)))
            })
            .clone()
    }

    /// Whether a record exists for `client_id`.
    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.lock().contains_key(client_id)
    }

    /// Number of provisioned clients.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Whether the registry has no provisioned clients.
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
