//! Headless training loop: a simulated shooter drives rounds back to back.

use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::evolution::GenerationStats;
use crate::game::RoundController;
use crate::shooter::AutoShooter;
use rand::Rng;

/// Default cap on ticks per round before it is aborted
pub const DEFAULT_MAX_TICKS: u32 = 3000;

pub struct Trainer<R: Rng> {
    controller: RoundController<R>,
    shooter: AutoShooter,
    max_ticks_per_round: u32,
}

impl<R: Rng> Trainer<R> {
    /// Build a trainer and start the first round. A round that reaches
    /// `max_ticks_per_round` is aborted so training never stalls on agents
    /// that learned to outlast the shooter.
    pub fn new(config: SimConfig, rng: R, max_ticks_per_round: u32) -> Result<Self, ConfigError> {
        let shooter = AutoShooter::new(config.shooter.clone());
        let mut controller = RoundController::new(config, rng)?;
        controller.start_round();
        Ok(Self {
            controller,
            shooter,
            max_ticks_per_round: max_ticks_per_round.max(1),
        })
    }

    pub fn controller(&self) -> &RoundController<R> {
        &self.controller
    }

    /// Play the current round to completion and return its stats
    pub fn run_generation(&mut self) -> Option<GenerationStats> {
        if !self.controller.is_round_active() {
            self.controller.start_round();
        }
        self.shooter.reset();

        while self.controller.round_ticks() < self.max_ticks_per_round {
            self.controller.auto_fire(&mut self.shooter);
            if let Some(stats) = self.controller.tick().finished {
                return Some(stats);
            }
        }
        self.controller.abort_round()
    }

    /// Run `generations` rounds, returning stats for each
    pub fn run(&mut self, generations: u32) -> Vec<GenerationStats> {
        (0..generations)
            .filter_map(|_| self.run_generation())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SimConfig {
        SimConfig {
            population: PopulationConfig {
                initial_size: 6,
                growth: 1,
                max_size: 8,
            },
            ..SimConfig::default()
        }
    }

    #[test]
    fn run_produces_one_stats_entry_per_generation() {
        let mut trainer = Trainer::new(small_config(), StdRng::seed_from_u64(3), 200).unwrap();
        let stats = trainer.run(4);
        assert_eq!(stats.len(), 4);
        for (i, s) in stats.iter().enumerate() {
            assert_eq!(s.generation, i as u32);
            assert!(s.ticks <= 200);
            assert!(s.best_fitness >= s.avg_fitness);
            assert!(s.avg_fitness >= s.worst_fitness);
        }
        assert_eq!(trainer.controller().generation_index(), 4);
    }

    #[test]
    fn population_grows_between_generations() {
        let mut trainer = Trainer::new(small_config(), StdRng::seed_from_u64(9), 100).unwrap();
        let sizes: Vec<usize> = trainer.run(4).iter().map(|s| s.population_size).collect();
        assert_eq!(sizes, vec![6, 7, 8, 8]);
    }

    #[test]
    fn tick_cap_aborts_long_rounds() {
        let mut config = small_config();
        // One dud shot that drops straight out of the field
        config.shooter.fire_interval = u32::MAX;
        config.ballistics.min_speed = 0.0;
        config.ballistics.max_speed = 0.0;
        let mut trainer = Trainer::new(config, StdRng::seed_from_u64(1), 25).unwrap();
        let stats = trainer.run_generation().unwrap();
        assert_eq!(stats.ticks, 25);
    }

    #[test]
    fn training_is_reproducible() {
        let run = || {
            let mut trainer =
                Trainer::new(small_config(), StdRng::seed_from_u64(77), 150).unwrap();
            trainer
                .run(3)
                .into_iter()
                .map(|s| (s.ticks, s.best_fitness, s.best_genome))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = small_config();
        config.evolution.mutation_rate = 2.0;
        assert!(Trainer::new(config, StdRng::seed_from_u64(1), 100).is_err());
    }
}
