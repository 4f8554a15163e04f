use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tracing::debug;

use super::{ChainClient, ChainError, Operation, WalletInfo};
use crate::leaderboard::{rank_entries, LeaderboardEntry, PlayerStats};
use crate::room::{random_base36, Room, RoomSettings, RoomStatus};
use crate::scoring::calculate_score;

/// A wallet's place in one room's current game
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    owner: String,
    total_score: u32,
    rounds_completed: u8,
}

impl Member {
    fn new(owner: String) -> Self {
        Self {
            owner,
            total_score: 0,
            rounds_completed: 0,
        }
    }
}

/// In-memory stand-in for the arena application, for offline play and
/// development. It applies operations to local state roughly the way the
/// on-chain application would, without any of the cross-chain messaging.
#[derive(Debug)]
pub struct SimulatedChain {
    wallet: Option<WalletInfo>,
    rooms: Vec<Room>,
    // only wallets seen through this client; demo players are counts only
    members: HashMap<String, Vec<Member>>,
    stats: HashMap<String, PlayerStats>,
    seeded_board: Vec<LeaderboardEntry>,
    rng: StdRng,
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            wallet: None,
            rooms: demo_rooms(),
            members: HashMap::new(),
            stats: HashMap::new(),
            seeded_board: demo_leaderboard(),
            rng,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn player_stats(&self, owner: &str) -> Option<&PlayerStats> {
        self.stats.get(owner)
    }

    fn owner(&self) -> Result<String, ChainError> {
        self.wallet
            .as_ref()
            .map(|w| w.owner.clone())
            .ok_or(ChainError::NotConnected)
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut Room, ChainError> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ChainError::Rejected(format!("room {room_id} not found")))
    }

    fn apply(&mut self, operation: &Operation) -> Result<(), ChainError> {
        let owner = self.owner()?;
        match operation {
            Operation::CreateRoom {
                room_id,
                max_players,
                rounds,
            } => {
                RoomSettings {
                    max_players: *max_players,
                    rounds: *rounds,
                }
                .validate()
                .map_err(|e| ChainError::Rejected(e.to_string()))?;

                if self.rooms.iter().any(|r| &r.id == room_id) {
                    return Err(ChainError::Rejected(format!("room {room_id} already exists")));
                }
                self.rooms.push(Room {
                    id: room_id.clone(),
                    host: host_name(&owner),
                    player_count: 1,
                    max_players: *max_players,
                    status: RoomStatus::Lobby,
                    rounds: *rounds,
                });
                self.members.insert(room_id.clone(), vec![Member::new(owner)]);
            }
            Operation::JoinRoom { room_id, .. } => {
                if self.is_member(room_id, &owner) {
                    return Err(ChainError::Rejected(format!("already in room {room_id}")));
                }
                let room = self.room_mut(room_id)?;
                if !room.is_open() {
                    return Err(ChainError::Rejected(format!("room {room_id} is not open")));
                }
                room.player_count += 1;
                self.members
                    .entry(room_id.clone())
                    .or_default()
                    .push(Member::new(owner));
            }
            Operation::StartGame { room_id } => {
                let room = self.room_mut(room_id)?;
                if room.status != RoomStatus::Lobby {
                    return Err(ChainError::Rejected("game already started".into()));
                }
                if room.player_count < 2 {
                    return Err(ChainError::Rejected("need at least 2 players".into()));
                }
                room.status = RoomStatus::InProgress;
            }
            Operation::SubmitResult {
                room_id,
                wpm,
                accuracy,
                ..
            } => {
                let rounds = self.room_mut(room_id)?.rounds;
                let member = self
                    .members
                    .get_mut(room_id)
                    .and_then(|m| m.iter_mut().find(|m| m.owner == owner))
                    .ok_or_else(|| ChainError::Rejected(format!("not a player in room {room_id}")))?;
                member.total_score += calculate_score(*wpm, *accuracy);
                member.rounds_completed += 1;

                self.stats
                    .entry(owner)
                    .or_default()
                    .update_with_result(*wpm, *accuracy);

                self.end_game_if_complete(room_id, rounds);
            }
            Operation::LeaveRoom { room_id, .. } => {
                let room = self.room_mut(room_id)?;
                room.player_count = room.player_count.saturating_sub(1);
                let empty = room.player_count == 0;
                if let Some(members) = self.members.get_mut(room_id) {
                    members.retain(|m| m.owner != owner);
                }
                if empty {
                    self.rooms.retain(|r| &r.id != room_id);
                    self.members.remove(room_id);
                }
            }
        }
        Ok(())
    }

    fn is_member(&self, room_id: &str, owner: &str) -> bool {
        self.members
            .get(room_id)
            .is_some_and(|m| m.iter().any(|m| m.owner == owner))
    }

    /// Once every member has played all rounds, count the game for each of
    /// them, credit the highest total with the win and clear the scores so
    /// the room can host another game.
    fn end_game_if_complete(&mut self, room_id: &str, rounds: u8) {
        let Some(members) = self.members.get_mut(room_id) else {
            return;
        };
        if members.is_empty() || members.iter().any(|m| m.rounds_completed < rounds) {
            return;
        }

        if let Some(winner) = members.iter().max_by_key(|m| m.total_score) {
            self.stats.entry(winner.owner.clone()).or_default().games_won += 1;
        }
        for member in members.iter_mut() {
            self.stats.entry(member.owner.clone()).or_default().games_played += 1;
            member.total_score = 0;
            member.rounds_completed = 0;
        }
        debug!(room = room_id, "simulated game complete");
    }

    fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries = self.seeded_board.clone();
        entries.extend(
            self.stats
                .iter()
                .filter(|(_, stats)| stats.games_played > 0)
                .map(|(owner, stats)| stats.to_entry(host_name(owner))),
        );
        rank_entries(entries)
    }
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for SimulatedChain {
    fn connect(&mut self) -> Result<WalletInfo, ChainError> {
        let wallet = WalletInfo {
            chain_id: format!("dev_{}", random_base36(&mut self.rng, 7)),
            owner: format!("User:{}", random_base36(&mut self.rng, 8)),
        };
        debug!(chain_id = %wallet.chain_id, "simulated wallet connected");
        self.wallet = Some(wallet.clone());
        Ok(wallet)
    }

    fn disconnect(&mut self) {
        self.wallet = None;
    }

    fn execute_operation(
        &mut self,
        _app_id: &str,
        operation: &Operation,
    ) -> Result<Value, ChainError> {
        debug!(?operation, "simulated operation");
        self.apply(operation)?;
        Ok(json!({ "success": true, "mock": true }))
    }

    fn query(&mut self, _app_id: &str, query: &str) -> Result<Value, ChainError> {
        self.owner()?;
        debug!(query, "simulated query");
        if query.contains("activeRooms") {
            Ok(json!({ "activeRooms": self.rooms }))
        } else if query.contains("leaderboard") {
            Ok(json!({ "leaderboard": self.leaderboard() }))
        } else {
            Ok(Value::Null)
        }
    }
}

/// Display name derived from an owner id, e.g. `Player_User:abc`
pub fn host_name(owner: &str) -> String {
    format!("Player_{}", owner.chars().take(8).collect::<String>())
}

fn demo_rooms() -> Vec<Room> {
    let room = |id: &str, host: &str, count, max, status, rounds| Room {
        id: id.to_string(),
        host: host.to_string(),
        player_count: count,
        max_players: max,
        status,
        rounds,
    };
    vec![
        room("room_abc123", "Player_xyz", 2, 4, RoomStatus::Lobby, 3),
        room("room_def456", "TypeMaster", 3, 4, RoomStatus::Lobby, 5),
        room("room_ghi789", "SpeedDemon", 4, 4, RoomStatus::InProgress, 3),
    ]
}

fn demo_leaderboard() -> Vec<LeaderboardEntry> {
    [
        ("TypeMaster", 42, 50, 125, 98, 156),
        ("SpeedDemon", 38, 48, 118, 96, 142),
        ("KeyboardNinja", 35, 45, 112, 97, 138),
        ("FastFingers", 28, 40, 105, 94, 128),
        ("WordWarrior", 22, 35, 98, 95, 122),
        ("SwiftTyper", 18, 30, 92, 93, 115),
        ("QuickKeys", 15, 28, 88, 91, 108),
        ("RapidWriter", 12, 25, 82, 90, 102),
    ]
    .into_iter()
    .map(
        |(player, games_won, games_played, average_wpm, average_accuracy, best_wpm)| {
            LeaderboardEntry {
                rank: 0,
                player: player.to_string(),
                games_won,
                games_played,
                average_wpm,
                average_accuracy,
                best_wpm,
            }
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::queries::{parse_leaderboard, parse_rooms, ACTIVE_ROOMS, LEADERBOARD};
    use assert_matches::assert_matches;

    fn connected() -> SimulatedChain {
        let mut chain = SimulatedChain::seeded(1);
        chain.connect().unwrap();
        chain
    }

    #[test]
    fn test_connect_hands_out_dev_identity() {
        let mut chain = SimulatedChain::seeded(1);
        let wallet = chain.connect().unwrap();
        assert!(wallet.chain_id.starts_with("dev_"));
        assert_eq!(wallet.chain_id.len(), 11);
        assert!(wallet.owner.starts_with("User:"));
    }

    #[test]
    fn test_requires_connection() {
        let mut chain = SimulatedChain::seeded(1);
        assert_matches!(chain.query("", ACTIVE_ROOMS), Err(ChainError::NotConnected));
        let op = Operation::StartGame {
            room_id: "room_abc123".into(),
        };
        assert_matches!(chain.execute_operation("", &op), Err(ChainError::NotConnected));
    }

    #[test]
    fn test_operations_return_mock_marker() {
        let mut chain = connected();
        let op = Operation::CreateRoom {
            room_id: "room_new".into(),
            max_players: 4,
            rounds: 3,
        };
        let value = chain.execute_operation("", &op).unwrap();
        assert_eq!(value, json!({"success": true, "mock": true}));

        let rooms = parse_rooms(&chain.query("", ACTIVE_ROOMS).unwrap());
        let created = rooms.iter().find(|r| r.id == "room_new").unwrap();
        assert_eq!(created.player_count, 1);
        assert_eq!(created.status, RoomStatus::Lobby);
        assert!(created.host.starts_with("Player_User:"));
    }

    #[test]
    fn test_create_room_rejects_bad_settings_and_duplicates() {
        let mut chain = connected();
        let bad = Operation::CreateRoom {
            room_id: "r".into(),
            max_players: 1,
            rounds: 3,
        };
        assert_matches!(chain.execute_operation("", &bad), Err(ChainError::Rejected(_)));

        let dup = Operation::CreateRoom {
            room_id: "room_abc123".into(),
            max_players: 4,
            rounds: 3,
        };
        assert_matches!(chain.execute_operation("", &dup), Err(ChainError::Rejected(_)));
    }

    fn join(id: &str) -> Operation {
        Operation::JoinRoom {
            room_id: id.into(),
            host_chain_id: "dev_host".into(),
            player_name: "You".into(),
        }
    }

    fn submit(id: &str, wpm: u32) -> Operation {
        Operation::SubmitResult {
            room_id: id.into(),
            host_chain_id: "dev".into(),
            wpm,
            accuracy: 100,
            time_ms: 10_000,
        }
    }

    #[test]
    fn test_join_full_room_rejected() {
        let mut chain = connected();
        assert!(chain.execute_operation("", &join("room_def456")).is_ok());

        // a second wallet finds the room full
        chain.disconnect();
        chain.connect().unwrap();
        assert_matches!(
            chain.execute_operation("", &join("room_def456")),
            Err(ChainError::Rejected(msg)) if msg.contains("not open")
        );
        assert_matches!(
            chain.execute_operation("", &join("room_missing")),
            Err(ChainError::Rejected(_))
        );
    }

    #[test]
    fn test_same_wallet_cannot_join_twice() {
        let mut chain = connected();
        chain.execute_operation("", &join("room_abc123")).unwrap();
        assert_matches!(
            chain.execute_operation("", &join("room_abc123")),
            Err(ChainError::Rejected(msg)) if msg == "already in room room_abc123"
        );
        assert_eq!(chain.rooms()[0].player_count, 3);

        // the creator is already a member of a new room
        let create = Operation::CreateRoom {
            room_id: "room_mine".into(),
            max_players: 4,
            rounds: 1,
        };
        chain.execute_operation("", &create).unwrap();
        assert_matches!(
            chain.execute_operation("", &join("room_mine")),
            Err(ChainError::Rejected(_))
        );
    }

    #[test]
    fn test_submit_requires_membership() {
        let mut chain = connected();
        assert_matches!(
            chain.execute_operation("", &submit("room_abc123", 60)),
            Err(ChainError::Rejected(msg)) if msg == "not a player in room room_abc123"
        );
    }

    #[test]
    fn test_start_and_leave() {
        let mut chain = connected();
        let start = Operation::StartGame {
            room_id: "room_abc123".into(),
        };
        chain.execute_operation("", &start).unwrap();
        assert_eq!(chain.rooms()[0].status, RoomStatus::InProgress);
        assert_matches!(chain.execute_operation("", &start), Err(ChainError::Rejected(_)));

        for _ in 0..2 {
            chain
                .execute_operation(
                    "",
                    &Operation::LeaveRoom {
                        room_id: "room_abc123".into(),
                        host_chain_id: "dev".into(),
                    },
                )
                .unwrap();
        }
        assert!(chain.rooms().iter().all(|r| r.id != "room_abc123"));
    }

    #[test]
    fn test_submitted_results_reach_leaderboard() {
        let mut chain = connected();
        let owner = chain.owner().unwrap();
        chain.execute_operation("", &join("room_abc123")).unwrap();
        chain.execute_operation("", &submit("room_abc123", 60)).unwrap();
        chain.execute_operation("", &submit("room_abc123", 80)).unwrap();

        let stats = chain.player_stats(&owner).unwrap();
        assert_eq!(stats.average_wpm(), 70);
        assert_eq!(stats.best_wpm, 80);
        assert_eq!(stats.games_played, 0);

        // rounds alone don't make a game, so no row yet
        let board = parse_leaderboard(&chain.query("", LEADERBOARD).unwrap());
        assert_eq!(board.len(), 8);
        assert!(board.iter().all(|e| e.player != host_name(&owner)));

        chain.execute_operation("", &submit("room_abc123", 70)).unwrap();
        let stats = chain.player_stats(&owner).unwrap();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_won, 1);

        let board = parse_leaderboard(&chain.query("", LEADERBOARD).unwrap());
        assert_eq!(board.len(), 9);
        assert_eq!(board[0].player, "TypeMaster");
        let me = board.iter().find(|e| e.player == host_name(&owner)).unwrap();
        assert_eq!((me.games_played, me.games_won, me.win_rate()), (1, 1, 100));
    }

    #[test]
    fn test_completed_game_counts_for_every_member() {
        let mut chain = connected();
        let host = chain.owner().unwrap();
        let create = Operation::CreateRoom {
            room_id: "room_duel".into(),
            max_players: 2,
            rounds: 1,
        };
        chain.execute_operation("", &create).unwrap();

        chain.disconnect();
        let guest = chain.connect().unwrap().owner;
        chain.execute_operation("", &join("room_duel")).unwrap();
        chain.execute_operation("", &submit("room_duel", 90)).unwrap();

        // the host hasn't played its round, so the game is still open
        assert_eq!(chain.player_stats(&guest).unwrap().games_played, 0);
        assert!(chain.player_stats(&host).is_none());
    }

    #[test]
    fn test_unknown_query_is_null() {
        let mut chain = connected();
        assert_eq!(chain.query("", "query { somethingElse }").unwrap(), Value::Null);
    }

    #[test]
    fn test_disconnect_forgets_wallet() {
        let mut chain = connected();
        chain.disconnect();
        assert_matches!(chain.query("", LEADERBOARD), Err(ChainError::NotConnected));
    }
}
