use std::sync::mpsc::{self, Sender};
use std::thread;

use serde_json::Value;
use tracing::debug;

use crate::chain::{Operation, WalletInfo};
use crate::leaderboard::LeaderboardEntry;
use crate::room::Room;
use crate::session::ChainSession;

/// Work the UI hands to the chain session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainRequest {
    Connect,
    Disconnect,
    FetchRooms,
    FetchLeaderboard,
    Execute(Operation),
}

/// Outcome of a [`ChainRequest`]; failures travel as their message only
#[derive(Debug, Clone, PartialEq)]
pub enum ChainReply {
    Connected(Result<WalletInfo, String>),
    Disconnected,
    Rooms(Result<Vec<Room>, String>),
    Leaderboard(Result<Vec<LeaderboardEntry>, String>),
    Executed {
        operation: Operation,
        result: Result<Value, String>,
    },
}

pub fn handle_request(session: &mut ChainSession, request: ChainRequest) -> ChainReply {
    match request {
        ChainRequest::Connect => ChainReply::Connected(session.connect().map_err(|e| e.to_string())),
        ChainRequest::Disconnect => {
            session.disconnect();
            ChainReply::Disconnected
        }
        ChainRequest::FetchRooms => ChainReply::Rooms(session.fetch_rooms().map_err(|e| e.to_string())),
        ChainRequest::FetchLeaderboard => {
            ChainReply::Leaderboard(session.fetch_leaderboard().map_err(|e| e.to_string()))
        }
        ChainRequest::Execute(operation) => {
            let result = session
                .execute_operation(&operation)
                .map_err(|e| e.to_string());
            ChainReply::Executed { operation, result }
        }
    }
}

/// Owns the session on a background thread and works through requests one
/// at a time, in order. There is no de-duplication, cancellation or timeout:
/// a request that never returns holds up everything queued behind it.
pub struct ChainWorker {
    tx: Sender<ChainRequest>,
}

impl ChainWorker {
    pub fn spawn<F>(mut session: ChainSession, deliver: F) -> Self
    where
        F: Fn(ChainReply) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<ChainRequest>();

        thread::spawn(move || {
            for request in rx {
                debug!(?request, "chain request");
                deliver(handle_request(&mut session, request));
            }
            session.disconnect();
        });

        Self { tx }
    }

    /// Queue a request. Returns false once the worker thread is gone.
    pub fn request(&self, request: ChainRequest) -> bool {
        self.tx.send(request).is_ok()
    }
}
