use std::time::{Duration, SystemTime};

/// Lower bound on elapsed minutes so a near-instant finish can't blow up wpm
pub const MIN_ELAPSED_MINUTES: f64 = 0.01;

/// Result of one typed round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub score: u32,
}

/// Minutes between `start` and `end`, clamped to [`MIN_ELAPSED_MINUTES`].
/// An `end` before `start` counts as no time at all.
pub fn elapsed_minutes(start: SystemTime, end: SystemTime) -> f64 {
    let elapsed = end.duration_since(start).unwrap_or(Duration::ZERO);
    (elapsed.as_millis() as f64 / 60_000.0).max(MIN_ELAPSED_MINUTES)
}

/// Whitespace-delimited tokens in the trimmed buffer; empty input is zero words.
pub fn count_words(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Positions where the typed char matches the prompt char
pub fn correct_chars(prompt: &str, input: &str) -> usize {
    input
        .chars()
        .zip(prompt.chars().map(Some).chain(std::iter::repeat(None)))
        .filter(|(typed, expected)| Some(*typed) == *expected)
        .count()
}

pub fn accuracy(prompt: &str, input: &str) -> u32 {
    let typed = input.chars().count();
    let correct = correct_chars(prompt, input);
    ((correct as f64 / typed.max(1) as f64) * 100.0).round() as u32
}

/// Score = wpm * (accuracy/100)^2, which weighs accuracy above raw speed
pub fn calculate_score(wpm: u32, accuracy: u32) -> u32 {
    let factor = (accuracy as f64 / 100.0).powi(2);
    (wpm as f64 * factor).round() as u32
}

pub fn compute(start: SystemTime, end: SystemTime, prompt: &str, input: &str) -> RoundStats {
    let minutes = elapsed_minutes(start, end);
    let wpm = (count_words(input) as f64 / minutes).round() as u32;
    let accuracy = accuracy(prompt, input);

    RoundStats {
        wpm,
        accuracy,
        score: calculate_score(wpm, accuracy),
    }
}
