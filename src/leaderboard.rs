use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One row of the public leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub rank: usize,
    pub player: String,
    pub games_won: u32,
    pub games_played: u32,
    pub average_wpm: u32,
    pub average_accuracy: u32,
    pub best_wpm: u32,
}

impl LeaderboardEntry {
    pub fn win_rate(&self) -> u32 {
        if self.games_played == 0 {
            0
        } else {
            ((self.games_won as f64 / self.games_played as f64) * 100.0).round() as u32
        }
    }
}

/// Sort by games won, then average wpm, and number the rows from 1
pub fn rank_entries(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries
        .into_iter()
        .sorted_by(|a, b| {
            b.games_won
                .cmp(&a.games_won)
                .then(b.average_wpm.cmp(&a.average_wpm))
        })
        .enumerate()
        .map(|(i, mut e)| {
            e.rank = i + 1;
            e
        })
        .collect()
}

/// Running totals for one player, as the chain application keeps them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub total_wpm: u64,
    pub total_accuracy: u64,
    pub rounds_played: u32,
    pub best_wpm: u32,
    pub best_accuracy: u32,
}

impl PlayerStats {
    pub fn average_wpm(&self) -> u32 {
        if self.rounds_played == 0 {
            0
        } else {
            (self.total_wpm / self.rounds_played as u64) as u32
        }
    }

    pub fn average_accuracy(&self) -> u32 {
        if self.rounds_played == 0 {
            0
        } else {
            (self.total_accuracy / self.rounds_played as u64) as u32
        }
    }

    pub fn update_with_result(&mut self, wpm: u32, accuracy: u32) {
        self.rounds_played += 1;
        self.total_wpm += wpm as u64;
        self.total_accuracy += accuracy as u64;
        self.best_wpm = self.best_wpm.max(wpm);
        self.best_accuracy = self.best_accuracy.max(accuracy);
    }

    pub fn to_entry(&self, player: impl Into<String>) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            player: player.into(),
            games_won: self.games_won,
            games_played: self.games_played,
            average_wpm: self.average_wpm(),
            average_accuracy: self.average_accuracy(),
            best_wpm: self.best_wpm,
        }
    }
}
