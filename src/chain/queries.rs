use serde_json::Value;

use crate::leaderboard::LeaderboardEntry;
use crate::room::Room;

pub const ACTIVE_ROOMS: &str = "query { activeRooms { roomId host playerCount maxPlayers status totalRounds } }";

pub const LEADERBOARD: &str = "query { leaderboard(limit: 20) { player gamesWon gamesPlayed averageWpm averageAccuracy bestWpm } }";

/// Rooms from an `activeRooms` response. Rows that don't parse are skipped.
pub fn parse_rooms(value: &Value) -> Vec<Room> {
    rows(value, "activeRooms")
        .filter_map(|row| serde_json::from_value(row.clone()).ok())
        .collect()
}

/// Leaderboard rows in the order the service returned them, ranked from 1
pub fn parse_leaderboard(value: &Value) -> Vec<LeaderboardEntry> {
    rows(value, "leaderboard")
        .filter_map(|row| serde_json::from_value::<LeaderboardEntry>(row.clone()).ok())
        .enumerate()
        .map(|(i, mut entry)| {
            entry.rank = i + 1;
            entry
        })
        .collect()
}

fn rows<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}
