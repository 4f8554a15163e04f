use serde_json::Value;
use tracing::{error, info, warn};

use crate::chain::queries::{self, ACTIVE_ROOMS, LEADERBOARD};
use crate::chain::{ChainClient, ChainError, Operation, WalletInfo};
use crate::leaderboard::LeaderboardEntry;
use crate::room::Room;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(WalletInfo),
}

/// An explicitly owned connection to the arena application. Whoever needs
/// chain access is handed this object; its lifetime runs from `connect` to
/// `disconnect`.
pub struct ChainSession {
    client: Box<dyn ChainClient>,
    app_id: String,
    state: ConnectionState,
    error: Option<String>,
}

impl std::fmt::Debug for ChainSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSession")
            .field("app_id", &self.app_id)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl ChainSession {
    pub fn new(client: Box<dyn ChainClient>, app_id: impl Into<String>) -> Self {
        Self {
            client,
            app_id: app_id.into(),
            state: ConnectionState::Disconnected,
            error: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    pub fn wallet(&self) -> Option<&WalletInfo> {
        match &self.state {
            ConnectionState::Connected(w) => Some(w),
            _ => None,
        }
    }

    /// Last failure, as a single human-readable message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A failed attempt records its error and leaves the session in the
    /// state it had before, so an existing connection survives it.
    pub fn connect(&mut self) -> Result<WalletInfo, ChainError> {
        let previous = std::mem::replace(&mut self.state, ConnectionState::Connecting);
        self.error = None;

        match self.client.connect() {
            Ok(wallet) => {
                info!(chain_id = %wallet.chain_id, owner = %wallet.owner, "session connected");
                self.state = ConnectionState::Connected(wallet.clone());
                Ok(wallet)
            }
            Err(e) => {
                error!(error = %e, "failed to connect");
                self.error = Some(e.to_string());
                self.state = previous;
                Err(e)
            }
        }
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            self.client.disconnect();
            info!("session disconnected");
        }
        self.state = ConnectionState::Disconnected;
        self.error = None;
    }

    pub fn execute_operation(&mut self, operation: &Operation) -> Result<Value, ChainError> {
        if !self.is_connected() {
            return Err(self.record(ChainError::NotConnected, "operation"));
        }
        self.client
            .execute_operation(&self.app_id, operation)
            .map_err(|e| self.record(e, "operation"))
    }

    pub fn query_state(&mut self, query: &str) -> Result<Value, ChainError> {
        if !self.is_connected() {
            return Err(self.record(ChainError::NotConnected, "query"));
        }
        self.client
            .query(&self.app_id, query)
            .map_err(|e| self.record(e, "query"))
    }

    pub fn fetch_rooms(&mut self) -> Result<Vec<Room>, ChainError> {
        self.query_state(ACTIVE_ROOMS)
            .map(|value| queries::parse_rooms(&value))
    }

    pub fn fetch_leaderboard(&mut self) -> Result<Vec<LeaderboardEntry>, ChainError> {
        self.query_state(LEADERBOARD)
            .map(|value| queries::parse_leaderboard(&value))
    }

    fn record(&mut self, e: ChainError, what: &str) -> ChainError {
        warn!(error = %e, "{what} failed");
        self.error = Some(e.to_string());
        e
    }
}

impl Drop for ChainSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}
