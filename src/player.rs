use crate::scoring::RoundStats;

pub const LOCAL_PLAYER_ID: &str = "1";
pub const OPPONENT_ID: &str = "2";

/// One participant's standing in the current match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub score: u32,
    pub finished: bool,
    pub total_score: u32,
    pub rounds_completed: u8,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            wpm: 0,
            accuracy: 0,
            score: 0,
            finished: false,
            total_score: 0,
            rounds_completed: 0,
        }
    }

    /// Freeze this round's result and add it to the match totals.
    /// A player that already finished the round is left untouched.
    pub fn record(&mut self, stats: RoundStats) {
        if self.finished {
            return;
        }
        self.wpm = stats.wpm;
        self.accuracy = stats.accuracy;
        self.score = stats.score;
        self.finished = true;
        self.total_score += stats.score;
        self.rounds_completed += 1;
    }

    pub fn stats(&self) -> RoundStats {
        RoundStats {
            wpm: self.wpm,
            accuracy: self.accuracy,
            score: self.score,
        }
    }

    pub fn reset_round(&mut self) {
        self.wpm = 0;
        self.accuracy = 0;
        self.score = 0;
        self.finished = false;
    }

    pub fn reset_match(&mut self) {
        self.reset_round();
        self.total_score = 0;
        self.rounds_completed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(wpm: u32, accuracy: u32, score: u32) -> RoundStats {
        RoundStats {
            wpm,
            accuracy,
            score,
        }
    }

    #[test]
    fn test_new_player_is_blank() {
        let p = Player::new(LOCAL_PLAYER_ID, "You");
        assert_eq!(p.stats(), RoundStats::default());
        assert!(!p.finished);
        assert_eq!(p.total_score, 0);
    }

    #[test]
    fn test_record_freezes_round() {
        let mut p = Player::new(LOCAL_PLAYER_ID, "You");
        p.record(stats(60, 95, 54));
        p.record(stats(1, 1, 1));

        assert!(p.finished);
        assert_eq!(p.stats(), stats(60, 95, 54));
        assert_eq!(p.total_score, 54);
        assert_eq!(p.rounds_completed, 1);
    }

    #[test]
    fn test_totals_accumulate_across_rounds() {
        let mut p = Player::new(OPPONENT_ID, "SpeedTyper");
        p.record(stats(50, 100, 50));
        p.reset_round();
        p.record(stats(40, 100, 40));

        assert_eq!(p.total_score, 90);
        assert_eq!(p.rounds_completed, 2);

        p.reset_match();
        assert_eq!(p.total_score, 0);
        assert_eq!(p.rounds_completed, 0);
        assert!(!p.finished);
    }
}
