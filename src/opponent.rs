use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scoring::RoundStats;

/// Stand-in for a remote participant: derives a plausible result from the
/// local player's. Not a reproducible remote outcome.
#[derive(Debug)]
pub struct OpponentSim {
    rng: StdRng,
}

impl OpponentSim {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn simulate(&mut self, local: RoundStats) -> RoundStats {
        let wpm = (local.wpm as f64 * self.rng.gen_range(0.8..=1.2)).round() as u32;
        let accuracy = self.rng.gen_range(85.0..=100.0_f64).round() as u32;
        let score = (local.score as f64 * self.rng.gen_range(0.7..=1.3)).round() as u32;

        RoundStats {
            wpm,
            accuracy,
            score,
        }
    }
}

impl Default for OpponentSim {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_stats_stay_in_range() {
        let mut sim = OpponentSim::seeded(3);
        let local = RoundStats {
            wpm: 100,
            accuracy: 96,
            score: 92,
        };

        for _ in 0..500 {
            let s = sim.simulate(local);
            assert!((80..=120).contains(&s.wpm), "wpm {}", s.wpm);
            assert!((85..=100).contains(&s.accuracy), "accuracy {}", s.accuracy);
            assert!((64..=120).contains(&s.score), "score {}", s.score);
        }
    }

    #[test]
    fn test_seeded_sim_is_reproducible() {
        let local = RoundStats {
            wpm: 70,
            accuracy: 90,
            score: 57,
        };
        let a = OpponentSim::seeded(11).simulate(local);
        let b = OpponentSim::seeded(11).simulate(local);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_local_result_gives_zero_speed() {
        let mut sim = OpponentSim::seeded(1);
        let s = sim.simulate(RoundStats::default());
        assert_eq!(s.wpm, 0);
        assert_eq!(s.score, 0);
    }
}
