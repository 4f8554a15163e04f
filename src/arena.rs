use std::time::{Duration, SystemTime};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::opponent::OpponentSim;
use crate::player::{Player, LOCAL_PLAYER_ID, OPPONENT_ID};
use crate::prompts::random_prompt;
use crate::scoring::{self, RoundStats};

pub const COUNTDOWN_FROM: u8 = 3;
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
pub const OPPONENT_DELAY: Duration = Duration::from_millis(500);
pub const OPPONENT_NAME: &str = "SpeedTyper";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MatchStatus {
    Waiting,
    Countdown,
    Playing,
    Finished,
}

/// How a prompt character should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Current,
    Pending,
}

/// Client-side match: one local player racing a simulated opponent over
/// `total_rounds` prompts.
#[derive(Debug)]
pub struct Arena {
    room_id: String,
    status: MatchStatus,
    countdown: u8,
    prompt: String,
    input: String,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
    last_count_at: Option<SystemTime>,
    opponent_due: Option<SystemTime>,
    current_round: u8,
    total_rounds: u8,
    players: Vec<Player>,
    rng: StdRng,
    opponent: OpponentSim,
}

impl Arena {
    pub fn new(room_id: impl Into<String>, player_name: &str, total_rounds: u8) -> Self {
        Self::build(
            room_id.into(),
            player_name,
            total_rounds,
            StdRng::from_entropy(),
            OpponentSim::new(),
        )
    }

    /// Deterministic prompts and opponent results, for tests and replays
    pub fn with_seed(
        room_id: impl Into<String>,
        player_name: &str,
        total_rounds: u8,
        seed: u64,
    ) -> Self {
        Self::build(
            room_id.into(),
            player_name,
            total_rounds,
            StdRng::seed_from_u64(seed),
            OpponentSim::seeded(seed.wrapping_add(1)),
        )
    }

    fn build(
        room_id: String,
        player_name: &str,
        total_rounds: u8,
        rng: StdRng,
        opponent: OpponentSim,
    ) -> Self {
        Self {
            room_id,
            status: MatchStatus::Waiting,
            countdown: COUNTDOWN_FROM,
            prompt: String::new(),
            input: String::new(),
            started_at: None,
            ended_at: None,
            last_count_at: None,
            opponent_due: None,
            current_round: 1,
            total_rounds: total_rounds.max(1),
            players: vec![
                Player::new(LOCAL_PLAYER_ID, player_name),
                Player::new(OPPONENT_ID, OPPONENT_NAME),
            ],
            rng,
            opponent,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn countdown(&self) -> u8 {
        self.countdown
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<SystemTime> {
        self.ended_at
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u8 {
        self.total_rounds
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn local_player(&self) -> &Player {
        &self.players[0]
    }

    pub fn opponent_pending(&self) -> bool {
        self.opponent_due.is_some()
    }

    /// Leave `Waiting` (or replay from `Finished`) and begin the countdown
    /// on a freshly drawn prompt. Returns false if a round is already live.
    /// An opponent still due from the last round is settled first.
    pub fn start(&mut self, now: SystemTime) -> bool {
        match self.status {
            MatchStatus::Countdown | MatchStatus::Playing => return false,
            MatchStatus::Waiting => {}
            MatchStatus::Finished => {
                if self.opponent_due.is_some() {
                    self.resolve_opponent();
                }
                if self.match_over() {
                    self.current_round = 1;
                    self.players.iter_mut().for_each(Player::reset_match);
                } else {
                    self.current_round += 1;
                }
            }
        }

        self.prompt = random_prompt(&mut self.rng);
        self.input.clear();
        self.started_at = None;
        self.ended_at = None;
        self.opponent_due = None;
        self.countdown = COUNTDOWN_FROM;
        self.last_count_at = Some(now);
        self.players.iter_mut().for_each(Player::reset_round);
        self.status = MatchStatus::Countdown;

        debug!(
            room = %self.room_id,
            round = self.current_round,
            "countdown started"
        );
        true
    }

    /// Replay is only meaningful once the round is over
    pub fn replay(&mut self, now: SystemTime) -> bool {
        self.status == MatchStatus::Finished && self.start(now)
    }

    /// One count of the countdown. Reaching zero starts the round.
    pub fn on_countdown_tick(&mut self, now: SystemTime) {
        if self.status != MatchStatus::Countdown {
            return;
        }

        self.countdown = self.countdown.saturating_sub(1);
        self.last_count_at = Some(now);

        if self.countdown == 0 {
            self.status = MatchStatus::Playing;
            self.started_at = Some(now);
            debug!(room = %self.room_id, "round started");
        }
    }

    /// Drive time-based transitions; safe to call at any rate
    pub fn on_tick(&mut self, now: SystemTime) {
        if self.status == MatchStatus::Countdown {
            let due = self
                .last_count_at
                .map_or(true, |at| now.duration_since(at).unwrap_or_default() >= COUNTDOWN_STEP);
            if due {
                self.on_countdown_tick(now);
            }
        }

        if let Some(due) = self.opponent_due {
            if now >= due {
                self.resolve_opponent();
            }
        }
    }

    pub fn write(&mut self, c: char, now: SystemTime) {
        if self.status != MatchStatus::Playing {
            return;
        }
        self.input.push(c);
        self.check_completion(now);
    }

    pub fn backspace(&mut self) {
        if self.status == MatchStatus::Playing {
            self.input.pop();
        }
    }

    /// Replace the whole buffer, as a paste or an input widget would
    pub fn set_input(&mut self, value: &str, now: SystemTime) {
        if self.status != MatchStatus::Playing {
            return;
        }
        self.input = value.to_string();
        self.check_completion(now);
    }

    fn check_completion(&mut self, now: SystemTime) {
        if self.input == self.prompt {
            self.finish(now);
        }
    }

    fn finish(&mut self, now: SystemTime) {
        if self.ended_at.is_some() {
            return;
        }
        self.ended_at = Some(now);
        self.status = MatchStatus::Finished;

        let stats = scoring::compute(
            self.started_at.unwrap_or(now),
            now,
            &self.prompt,
            &self.input,
        );
        self.players[0].record(stats);
        self.opponent_due = Some(now + OPPONENT_DELAY);

        info!(
            room = %self.room_id,
            round = self.current_round,
            wpm = stats.wpm,
            accuracy = stats.accuracy,
            score = stats.score,
            "round finished"
        );
    }

    fn resolve_opponent(&mut self) {
        self.opponent_due = None;
        let simulated = self.opponent.simulate(self.players[0].stats());
        self.players[1].record(simulated);
    }

    /// Stats as they stand at `now`, frozen once the round has ended
    pub fn live_stats(&self, now: SystemTime) -> RoundStats {
        match self.started_at {
            Some(start) => scoring::compute(
                start,
                self.ended_at.unwrap_or(now),
                &self.prompt,
                &self.input,
            ),
            None => RoundStats::default(),
        }
    }

    pub fn elapsed_secs(&self, now: SystemTime) -> u64 {
        self.started_at.map_or(0, |start| {
            self.ended_at
                .unwrap_or(now)
                .duration_since(start)
                .unwrap_or_default()
                .as_secs()
        })
    }

    pub fn is_winner(&self) -> bool {
        let local = self.local_player().score;
        self.status == MatchStatus::Finished && self.players.iter().all(|p| local >= p.score)
    }

    pub fn match_over(&self) -> bool {
        self.status == MatchStatus::Finished && self.current_round >= self.total_rounds
    }

    /// Highest running total once the last round is done
    pub fn match_winner(&self) -> Option<&Player> {
        if !self.match_over() || self.opponent_pending() {
            return None;
        }
        self.players.iter().max_by_key(|p| p.total_score)
    }

    pub fn char_states(&self) -> Vec<(char, CharState)> {
        let typed: Vec<char> = self.input.chars().collect();
        self.prompt
            .chars()
            .enumerate()
            .map(|(idx, expected)| {
                let state = match typed.get(idx) {
                    Some(&c) if c == expected => CharState::Correct,
                    Some(_) => CharState::Incorrect,
                    None if idx == typed.len() => CharState::Current,
                    None => CharState::Pending,
                };
                (expected, state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::is_known_prompt;

    fn at(ms: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(ms)
    }

    fn playing_arena() -> Arena {
        let mut arena = Arena::with_seed("room_test", "You", 3, 9);
        arena.start(at(0));
        for s in 1..=3 {
            arena.on_countdown_tick(at(s * 1_000));
        }
        arena
    }

    fn type_prompt(arena: &mut Arena, now: SystemTime) {
        let prompt = arena.prompt().to_string();
        for c in prompt.chars() {
            arena.write(c, now);
        }
    }

    #[test]
    fn test_new_arena_is_waiting() {
        let arena = Arena::with_seed("room", "You", 3, 1);

        assert_eq!(arena.status(), MatchStatus::Waiting);
        assert!(arena.prompt().is_empty());
        assert_eq!(arena.players().len(), 2);
        assert_eq!(arena.current_round(), 1);
    }

    #[test]
    fn test_start_picks_prompt_and_counts_from_three() {
        let mut arena = Arena::with_seed("room", "You", 3, 1);

        assert!(arena.start(at(0)));
        assert_eq!(arena.status(), MatchStatus::Countdown);
        assert_eq!(arena.countdown(), 3);
        assert!(is_known_prompt(arena.prompt()));
        assert!(!arena.start(at(10)));
    }

    #[test]
    fn test_countdown_takes_exactly_three_ticks() {
        let mut arena = Arena::with_seed("room", "You", 3, 1);
        arena.start(at(0));

        arena.on_countdown_tick(at(1_000));
        assert_eq!(arena.countdown(), 2);
        assert_eq!(arena.status(), MatchStatus::Countdown);

        arena.on_countdown_tick(at(2_000));
        assert_eq!(arena.countdown(), 1);
        assert_eq!(arena.status(), MatchStatus::Countdown);
        assert!(arena.started_at().is_none());

        arena.on_countdown_tick(at(3_000));
        assert_eq!(arena.countdown(), 0);
        assert_eq!(arena.status(), MatchStatus::Playing);
        assert_eq!(arena.started_at(), Some(at(3_000)));

        // further ticks don't restart the round
        arena.on_countdown_tick(at(4_000));
        assert_eq!(arena.started_at(), Some(at(3_000)));
        assert_eq!(arena.countdown(), 0);
    }

    #[test]
    fn test_on_tick_counts_once_per_second() {
        let mut arena = Arena::with_seed("room", "You", 3, 1);
        arena.start(at(0));

        arena.on_tick(at(500));
        assert_eq!(arena.countdown(), 3);
        arena.on_tick(at(1_000));
        assert_eq!(arena.countdown(), 2);
        arena.on_tick(at(1_900));
        assert_eq!(arena.countdown(), 2);
        arena.on_tick(at(2_000));
        arena.on_tick(at(3_050));
        assert_eq!(arena.status(), MatchStatus::Playing);
        assert_eq!(arena.started_at(), Some(at(3_050)));
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let mut arena = Arena::with_seed("room", "You", 3, 1);
        arena.write('T', at(0));
        assert!(arena.input().is_empty());

        arena.start(at(0));
        arena.write('T', at(100));
        arena.set_input("The", at(100));
        assert!(arena.input().is_empty());
    }

    #[test]
    fn test_exact_match_finishes_once() {
        let mut arena = playing_arena();
        type_prompt(&mut arena, at(63_000));

        assert_eq!(arena.status(), MatchStatus::Finished);
        assert_eq!(arena.ended_at(), Some(at(63_000)));
        assert!(arena.local_player().finished);

        // no more input once finished
        arena.write('x', at(70_000));
        arena.set_input(&arena.prompt().to_string(), at(80_000));
        assert_eq!(arena.ended_at(), Some(at(63_000)));
        assert_eq!(arena.input(), arena.prompt());
    }

    #[test]
    fn test_mistyped_buffer_does_not_finish() {
        let mut arena = playing_arena();
        let mut wrong = arena.prompt().to_string();
        wrong.pop();
        wrong.push('#');

        arena.set_input(&wrong, at(10_000));
        assert_eq!(arena.status(), MatchStatus::Playing);
        assert!(arena.ended_at().is_none());

        arena.backspace();
        let last = arena.prompt().chars().last().unwrap();
        arena.write(last, at(11_000));
        assert_eq!(arena.status(), MatchStatus::Finished);
    }

    #[test]
    fn test_local_stats_frozen_at_finish() {
        let mut arena = playing_arena();
        type_prompt(&mut arena, at(63_000));

        let expected = scoring::compute(at(3_000), at(63_000), arena.prompt(), arena.input());
        assert_eq!(arena.local_player().stats(), expected);
        assert_eq!(arena.live_stats(at(999_000)), expected);
        assert_eq!(arena.elapsed_secs(at(999_000)), 60);
        assert_eq!(expected.accuracy, 100);
    }

    #[test]
    fn test_opponent_finishes_after_delay() {
        let mut arena = playing_arena();
        type_prompt(&mut arena, at(20_000));

        assert!(arena.opponent_pending());
        assert!(!arena.players()[1].finished);
        assert!(arena.is_winner());

        arena.on_tick(at(20_499));
        assert!(!arena.players()[1].finished);

        arena.on_tick(at(20_500));
        assert!(!arena.opponent_pending());
        let opp = &arena.players()[1];
        assert!(opp.finished);
        assert!((85..=100).contains(&opp.accuracy));
    }

    #[test]
    fn test_replay_resets_round() {
        let mut arena = playing_arena();
        assert!(!arena.replay(at(4_000)));

        type_prompt(&mut arena, at(30_000));
        arena.on_tick(at(31_000));

        assert!(arena.replay(at(40_000)));
        assert_eq!(arena.status(), MatchStatus::Countdown);
        assert_eq!(arena.countdown(), COUNTDOWN_FROM);
        assert!(arena.input().is_empty());
        assert!(arena.ended_at().is_none());
        assert!(arena.started_at().is_none());
        assert!(is_known_prompt(arena.prompt()));
        assert_eq!(arena.current_round(), 2);
        assert!(arena.players().iter().all(|p| !p.finished));
        assert_eq!(arena.local_player().rounds_completed, 1);
    }

    #[test]
    fn test_quick_replay_still_scores_opponent() {
        let mut arena = playing_arena();
        type_prompt(&mut arena, at(20_000));
        assert!(arena.opponent_pending());

        // next round requested well inside the opponent delay
        assert!(arena.replay(at(20_100)));
        assert!(!arena.opponent_pending());
        assert_eq!(arena.current_round(), 2);

        let opp = &arena.players()[1];
        assert_eq!(opp.rounds_completed, 1);
        assert!(opp.total_score > 0);
        assert!(!opp.finished);

        // nothing left to resolve later
        arena.on_tick(at(20_600));
        assert_eq!(arena.players()[1].rounds_completed, 1);
    }

    #[test]
    fn test_match_wraps_after_final_round() {
        let mut arena = Arena::with_seed("room", "You", 1, 5);
        arena.start(at(0));
        for s in 1..=3 {
            arena.on_countdown_tick(at(s * 1_000));
        }
        type_prompt(&mut arena, at(20_000));

        assert!(arena.match_over());
        assert!(arena.match_winner().is_none());
        arena.on_tick(at(21_000));
        assert!(arena.match_winner().is_some());

        assert!(arena.replay(at(30_000)));
        assert_eq!(arena.current_round(), 1);
        assert_eq!(arena.local_player().total_score, 0);
    }

    #[test]
    fn test_char_states() {
        let mut arena = playing_arena();
        let prompt: Vec<char> = arena.prompt().chars().collect();
        arena.write(prompt[0], at(4_000));
        arena.write('#', at(4_100));

        let states = arena.char_states();
        assert_eq!(states.len(), prompt.len());
        assert_eq!(states[0].1, CharState::Correct);
        assert_eq!(states[1].1, CharState::Incorrect);
        assert_eq!(states[2].1, CharState::Current);
        assert_eq!(states[3].1, CharState::Pending);
    }

    #[test]
    fn test_live_stats_before_start_are_zero() {
        let arena = Arena::with_seed("room", "You", 3, 1);
        assert_eq!(arena.live_stats(at(5_000)), RoundStats::default());
        assert_eq!(arena.elapsed_secs(at(5_000)), 0);
    }

    #[test]
    fn test_rounds_clamped_to_one() {
        let arena = Arena::with_seed("room", "You", 0, 1);
        assert_eq!(arena.total_rounds(), 1);
    }
}
