//! Chain client abstraction.
//!
//! The room and leaderboard state this game reads and writes is owned by an
//! application on a remote chain. [`ChainClient`] is the capability the rest
//! of the crate talks to; [`RemoteChain`] relays it to a node service over
//! GraphQL and [`SimulatedChain`] answers it from memory for offline play.
//! Which one is used is decided once, from configuration.

pub mod queries;
pub mod remote;
pub mod simulated;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

pub use remote::RemoteChain;
pub use simulated::SimulatedChain;

/// Identity handed back by a successful connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub chain_id: String,
    pub owner: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("not connected to a chain")]
    NotConnected,

    #[error("no application id configured")]
    MissingApplication,

    #[error("request to node failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node returned errors: {0}")]
    GraphQl(String),

    #[error("unexpected response from node: {0}")]
    Response(String),

    #[error("operation rejected: {0}")]
    Rejected(String),
}

/// Operations understood by the arena application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateRoom {
        room_id: String,
        max_players: u8,
        rounds: u8,
    },
    JoinRoom {
        room_id: String,
        host_chain_id: String,
        player_name: String,
    },
    StartGame {
        room_id: String,
    },
    SubmitResult {
        room_id: String,
        host_chain_id: String,
        wpm: u32,
        accuracy: u32,
        time_ms: u64,
    },
    LeaveRoom {
        room_id: String,
        host_chain_id: String,
    },
}

impl Operation {
    pub fn room_id(&self) -> &str {
        match self {
            Operation::CreateRoom { room_id, .. }
            | Operation::JoinRoom { room_id, .. }
            | Operation::StartGame { room_id }
            | Operation::SubmitResult { room_id, .. }
            | Operation::LeaveRoom { room_id, .. } => room_id,
        }
    }

    /// The mutation a node service exposes for this operation
    pub fn to_graphql(&self) -> String {
        let body = match self {
            Operation::CreateRoom {
                room_id,
                max_players,
                rounds,
            } => format!(
                "createRoom(roomId: {}, maxPlayers: {max_players}, rounds: {rounds})",
                quote(room_id)
            ),
            Operation::JoinRoom {
                room_id,
                host_chain_id,
                player_name,
            } => format!(
                "joinRoom(roomId: {}, hostChainId: {}, playerName: {})",
                quote(room_id),
                quote(host_chain_id),
                quote(player_name)
            ),
            Operation::StartGame { room_id } => format!("startGame(roomId: {})", quote(room_id)),
            Operation::SubmitResult {
                room_id,
                host_chain_id,
                wpm,
                accuracy,
                time_ms,
            } => format!(
                "submitResult(roomId: {}, hostChainId: {}, wpm: {wpm}, accuracy: {accuracy}, timeMs: {time_ms})",
                quote(room_id),
                quote(host_chain_id)
            ),
            Operation::LeaveRoom {
                room_id,
                host_chain_id,
            } => format!(
                "leaveRoom(roomId: {}, hostChainId: {})",
                quote(room_id),
                quote(host_chain_id)
            ),
        };
        format!("mutation {{ {body} }}")
    }
}

fn quote(s: &str) -> String {
    // a JSON string literal is also a valid GraphQL string literal
    Value::String(s.to_string()).to_string()
}

/// Capability surface of a chain client. Response shapes are owned by the
/// remote application; this crate only relays.
pub trait ChainClient: Send {
    fn connect(&mut self) -> Result<WalletInfo, ChainError>;
    fn disconnect(&mut self);
    fn execute_operation(
        &mut self,
        app_id: &str,
        operation: &Operation,
    ) -> Result<Value, ChainError>;
    fn query(&mut self, app_id: &str, query: &str) -> Result<Value, ChainError>;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Simulated,
    Remote,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Backend::Simulated
        } else {
            Backend::Remote
        }
    }
}

/// Build the client for the configured backend
pub fn client_for(config: &Config) -> Box<dyn ChainClient> {
    match config.backend {
        Backend::Simulated => Box::new(SimulatedChain::new()),
        Backend::Remote => Box::new(RemoteChain::new(
            &config.node_url,
            &config.graphql_endpoint,
            config.chain_id.clone(),
            config.owner.clone(),
        )),
    }
}
