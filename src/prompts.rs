use rand::seq::SliceRandom;
use rand::Rng;

/// Sentences a round can be played on. The on-chain application draws from the same bank.
pub const PROMPT_BANK: &[&str] = &[
    "The quick brown fox jumps over the lazy dog near the riverbank.",
    "Blockchain technology enables decentralized applications with trustless consensus.",
    "Linera microchains provide infinite horizontal scalability for web3 applications.",
    "Fast fingers and sharp minds compete in the ultimate typing arena showdown.",
    "Practice makes perfect when it comes to improving your typing speed.",
    "Cross-chain messaging allows real-time synchronization between player chains.",
    "Speed and accuracy are the twin pillars of typing mastery excellence.",
    "The future of gaming lies in decentralized multiplayer experiences.",
    "Every keystroke counts when racing against opponents in real time.",
    "Sub-second finality means your results update instantly across all chains.",
    "Welcome to Type Arena where champions are forged through practice.",
    "Microchains enable each player to have their own dedicated blockchain.",
    "Real-time competition has never been more exciting or accessible.",
    "The clock is ticking and every word matters in this typing race.",
    "Precision typing separates the good players from the great ones.",
];

pub fn random_prompt<R: Rng + ?Sized>(rng: &mut R) -> String {
    PROMPT_BANK
        .choose(rng)
        .copied()
        .unwrap_or(PROMPT_BANK[0])
        .to_string()
}

pub fn is_known_prompt(prompt: &str) -> bool {
    PROMPT_BANK.contains(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_random_prompt_comes_from_bank() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(is_known_prompt(&random_prompt(&mut rng)));
        }
    }

    #[test]
    fn test_random_prompt_covers_bank() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<String> = (0..2_000).map(|_| random_prompt(&mut rng)).collect();
        assert_eq!(seen.len(), PROMPT_BANK.len());
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(PROMPT_BANK.iter().all(|p| !p.trim().is_empty()));
    }
}
