//! Admission service: the two public decision operations.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use super::client::ClientState;
use super::registry::ClientRegistry;
use crate::config::LimitsConfig;

/// Outcome of one admission call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request is within the client's limits.
    Admitted,
    /// The request was rejected for the given reason.
    Rejected(RejectReason),
}

impl Decision {
    /// Whether this decision admits the request.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The caller supplied an empty client identifier (contract violation).
    MissingClientId,
    /// The client reached its fixed-window request cap.
    WindowLimitExceeded,
    /// The client's token bucket is empty.
    NoTokensAvailable,
}

impl RejectReason {
    /// Human-readable reason text, suitable for a response body.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MissingClientId => "client identifier missing",
            RejectReason::WindowLimitExceeded => "window limit exceeded",
            RejectReason::NoTokensAvailable => "no tokens available",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// The admission-control core.
///
/// Holds the client registry and the resolved limits configuration, and
/// exposes the two decision operations. Thread-safe: the registry lock
/// guards provisioning, each client's own lock guards its evaluation, and
/// the two are never held together.
pub struct AdmissionService {
    /// Per-client state, provisioned lazily on first contact
    registry: ClientRegistry,
    /// Per-client limits from configuration; unknown clients get defaults
    limits: LimitsConfig,
}

impl AdmissionService {
    /// Create a service with the given limits configuration.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            registry: ClientRegistry::new(),
            limits,
        }
    }

    /// Decide a request under the fixed-window policy only.
    ///
    /// The first `request_max` calls within a one-second window are
    /// admitted; further calls are rejected until the window lapses. The
    /// window boundary is set lazily by the first call arriving at least
    /// one second after the previous boundary, so edge bursts are not
    /// smoothed.
    pub fn admit_fixed_window(&self, client_id: &str) -> Decision {
        if client_id.is_empty() {
            return Decision::Rejected(RejectReason::MissingClientId);
        }

        trace!(client_id = %client_id, "Fixed-window admission check");

        let state = self.client(client_id);
        let mut state = state.lock();

        if state.admit_window(Instant::now()) {
            Decision::Admitted
        } else {
            debug!(client_id = %client_id, "Window limit exceeded");
            Decision::Rejected(RejectReason::WindowLimitExceeded)
        }
    }

    /// Decide a request under the token-bucket policy, then the shared
    /// fixed-window policy.
    ///
    /// The bucket gates first: with no token available the request is
    /// rejected and nothing else changes. When a token is taken, the same
    /// window counter as [`admit_fixed_window`](Self::admit_fixed_window)
    /// is applied; a window rejection at that point does not return the
    /// token. Both the shared counter and the spent-token ordering are
    /// deliberate compatibility choices (see DESIGN.md).
    pub fn admit_token_bucket(&self, client_id: &str) -> Decision {
        if client_id.is_empty() {
            return Decision::Rejected(RejectReason::MissingClientId);
        }

        trace!(client_id = %client_id, "Token-bucket admission check");

        let state = self.client(client_id);
        let mut state = state.lock();
        let now = Instant::now();

        if !state.take_token(now) {
            debug!(client_id = %client_id, "No tokens available");
            return Decision::Rejected(RejectReason::NoTokensAvailable);
        }

        if state.admit_window(now) {
            Decision::Admitted
        } else {
            debug!(client_id = %client_id, "Window limit exceeded");
            Decision::Rejected(RejectReason::WindowLimitExceeded)
        }
    }

    /// Number of provisioned clients.
    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    /// Resolve a client's state, provisioning it from configuration (or
    /// defaults) on first contact. The registry lock is released before
    /// the caller takes the per-client lock.
    fn client(&self, client_id: &str) -> Arc<Mutex<ClientState>> {
        let limits = self.limits.resolve(client_id);
        self.registry.resolve(client_id, limits)
    }
}
