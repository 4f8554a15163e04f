use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 8;
pub const MIN_ROUNDS: u8 = 1;
pub const MAX_ROUNDS: u8 = 10;

/// Player counts offered by the create-room form
pub const PLAYER_CHOICES: [u8; 4] = [2, 4, 6, 8];
/// Round counts offered by the create-room form
pub const ROUND_CHOICES: [u8; 4] = [1, 3, 5, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum RoomStatus {
    // GraphQL services report enum values in SCREAMING_CASE
    #[serde(alias = "LOBBY")]
    Lobby,
    #[serde(alias = "IN_PROGRESS")]
    InProgress,
    #[serde(alias = "FINISHED")]
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "roomId")]
    pub id: String,
    pub host: String,
    pub player_count: u8,
    pub max_players: u8,
    pub status: RoomStatus,
    #[serde(rename = "totalRounds")]
    pub rounds: u8,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.player_count >= self.max_players
    }

    /// Joinable from the lobby
    pub fn is_open(&self) -> bool {
        self.status == RoomStatus::Lobby && !self.is_full()
    }

    fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.id.to_lowercase().contains(&query) || self.host.to_lowercase().contains(&query)
    }

    /// Short id for narrow displays
    pub fn short_id(&self) -> String {
        if self.id.chars().count() > 16 {
            format!("{}...", self.id.chars().take(16).collect::<String>())
        } else {
            self.id.clone()
        }
    }
}

/// Lobby rooms whose id or host contains `query`, case-insensitively
pub fn filter_open_rooms<'a>(rooms: &'a [Room], query: &str) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Lobby && r.matches_query(query))
        .collect()
}

/// `room_<unix millis>_<6 base36 chars>`
pub fn new_room_id<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> String {
    format!("room_{now_ms}_{}", random_base36(rng, 6))
}

pub fn random_base36<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("invalid player count {0} (2-8)")]
    PlayerCount(u8),
    #[error("invalid round count {0} (1-10)")]
    RoundCount(u8),
}

/// Create-room form state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub max_players: u8,
    pub rounds: u8,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 4,
            rounds: 3,
        }
    }
}

impl RoomSettings {
    pub fn validate(&self) -> Result<(), RoomError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(RoomError::PlayerCount(self.max_players));
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.rounds) {
            return Err(RoomError::RoundCount(self.rounds));
        }
        Ok(())
    }

    pub fn cycle_players(&mut self) {
        self.max_players = next_choice(&PLAYER_CHOICES, self.max_players);
    }

    pub fn cycle_rounds(&mut self) {
        self.rounds = next_choice(&ROUND_CHOICES, self.rounds);
    }
}

fn next_choice(choices: &[u8], current: u8) -> u8 {
    match choices.iter().position(|&c| c == current) {
        Some(i) => choices[(i + 1) % choices.len()],
        None => choices[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(id: &str, host: &str, count: u8, status: RoomStatus) -> Room {
        Room {
            id: id.to_string(),
            host: host.to_string(),
            player_count: count,
            max_players: 4,
            status,
            rounds: 3,
        }
    }

    fn sample_rooms() -> Vec<Room> {
        vec![
            room("room_abc123", "Player_xyz", 2, RoomStatus::Lobby),
            room("room_def456", "TypeMaster", 3, RoomStatus::Lobby),
            room("room_ghi789", "SpeedDemon", 4, RoomStatus::InProgress),
        ]
    }

    #[test]
    fn test_filter_keeps_lobby_rooms_only() {
        let rooms = sample_rooms();
        let open = filter_open_rooms(&rooms, "");
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|r| r.status == RoomStatus::Lobby));
    }

    #[test]
    fn test_filter_matches_id_or_host_case_insensitively() {
        let rooms = sample_rooms();
        assert_eq!(filter_open_rooms(&rooms, "TYPEMASTER")[0].id, "room_def456");
        assert_eq!(filter_open_rooms(&rooms, "abc")[0].host, "Player_xyz");
        assert!(filter_open_rooms(&rooms, "speeddemon").is_empty());
    }

    #[test]
    fn test_is_open() {
        assert!(room("a", "h", 1, RoomStatus::Lobby).is_open());
        assert!(!room("a", "h", 4, RoomStatus::Lobby).is_open());
        assert!(!room("a", "h", 1, RoomStatus::Finished).is_open());
    }

    #[test]
    fn test_new_room_id_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = new_room_id(1_700_000_000_000, &mut rng);
        let suffix = id.strip_prefix("room_1700000000000_").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_settings_validation() {
        assert!(RoomSettings::default().validate().is_ok());
        assert_matches!(
            RoomSettings {
                max_players: 9,
                rounds: 3
            }
            .validate(),
            Err(RoomError::PlayerCount(9))
        );
        assert_matches!(
            RoomSettings {
                max_players: 2,
                rounds: 0
            }
            .validate(),
            Err(RoomError::RoundCount(0))
        );
    }

    #[test]
    fn test_settings_cycle() {
        let mut s = RoomSettings::default();
        s.cycle_players();
        assert_eq!(s.max_players, 6);
        s.cycle_players();
        s.cycle_players();
        assert_eq!(s.max_players, 2);

        s.cycle_rounds();
        assert_eq!(s.rounds, 5);
        s.rounds = 10;
        s.cycle_rounds();
        assert_eq!(s.rounds, 1);
    }

    #[test]
    fn test_room_deserializes_from_query_shape() {
        let value = serde_json::json!({
            "roomId": "room_1",
            "host": "TypeMaster",
            "playerCount": 2,
            "maxPlayers": 4,
            "status": "Lobby",
            "totalRounds": 5
        });
        let room: Room = serde_json::from_value(value).unwrap();
        assert_eq!(room.id, "room_1");
        assert_eq!(room.rounds, 5);
        assert_eq!(room.status, RoomStatus::Lobby);
    }

    #[test]
    fn test_short_id() {
        let r = room("room_1700000000000_abcdef", "h", 1, RoomStatus::Lobby);
        assert_eq!(r.short_id(), "room_17000000000...");
        assert_eq!(room("room_1", "h", 1, RoomStatus::Lobby).short_id(), "room_1");
    }
}
