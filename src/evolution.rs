use crate::ai::{Agent, Genome};
use crate::config::EvolutionConfig;
use crate::error::EvolutionError;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Mutation rate (probability of mutating each gene)
pub const MUTATION_RATE: f32 = 0.30;

/// Mutation strength (standard deviation of gaussian mutation)
pub const MUTATION_STRENGTH: f32 = 0.35;

/// Number of top genomes copied unchanged into the next generation
pub const ELITE_COUNT: usize = 3;

/// Tournament selection size
pub const TOURNAMENT_SIZE: usize = 3;

/// Statistics for a single generation, reported on each generation transition
#[derive(Clone, Debug, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub population_size: usize,
    /// Ticks the round lasted
    pub ticks: u32,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    pub std_dev_fitness: f32,
    pub worst_fitness: f32,
    pub best_genome: Genome,
}

impl GenerationStats {
    /// Summarize a finished round. `None` for an empty population.
    pub fn from_agents(generation: u32, ticks: u32, agents: &[Agent]) -> Option<Self> {
        let best = agents
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))?;
        let n = agents.len() as f32;
        let avg = agents.iter().map(Agent::fitness).sum::<f32>() / n;
        let variance = agents
            .iter()
            .map(|a| (a.fitness() - avg) * (a.fitness() - avg))
            .sum::<f32>()
            / n;
        let worst = agents
            .iter()
            .map(Agent::fitness)
            .fold(f32::INFINITY, f32::min);

        Some(Self {
            generation,
            population_size: agents.len(),
            ticks,
            best_fitness: best.fitness(),
            avg_fitness: avg,
            std_dev_fitness: variance.sqrt(),
            worst_fitness: worst,
            best_genome: best.genome().clone(),
        })
    }
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen {:>4} | Pop: {:>3} | Ticks: {:>5} | Best: {:>8.2} | Avg: {:>8.2} | Std: {:>7.2} | Genome: {}",
            self.generation,
            self.population_size,
            self.ticks,
            self.best_fitness,
            self.avg_fitness,
            self.std_dev_fitness,
            self.best_genome,
        )
    }
}

/// Genetic algorithm producing the next generation's genomes.
///
/// Holds no state between calls besides its settings; all randomness comes
/// from the caller's RNG, so a fixed RNG sequence reproduces a run exactly.
#[derive(Clone, Debug, Default)]
pub struct EvolutionEngine {
    config: EvolutionConfig,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Agents sorted by descending fitness. Equal fitness keeps population order.
    pub fn rank(agents: &[Agent]) -> Vec<&Agent> {
        let mut ranked: Vec<&Agent> = agents.iter().collect();
        ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        ranked
    }

    /// Perform tournament selection over a ranked population.
    ///
    /// Candidates are drawn with replacement; the best-ranked one wins.
    pub fn tournament_select<'a>(&self, ranked: &[&'a Agent], rng: &mut impl Rng) -> &'a Genome {
        let rounds = self.config.tournament_size.max(1);
        let best_idx = (0..rounds)
            .map(|_| rng.gen_range(0..ranked.len()))
            .min()
            .unwrap_or(0);
        ranked[best_idx].genome()
    }

    /// Build exactly `size` genomes from the scored population: elites first,
    /// then mutated offspring of tournament-selected parents.
    pub fn next_generation(
        &self,
        agents: &[Agent],
        size: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<Genome>, EvolutionError> {
        if agents.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if size == 0 {
            return Err(EvolutionError::ZeroTargetSize);
        }

        let ranked = Self::rank(agents);
        let mut next_gen: Vec<Genome> = Vec::with_capacity(size);

        // Keep elites
        let elite_count = self.config.elite_count.min(ranked.len()).min(size);
        next_gen.extend(ranked[..elite_count].iter().map(|a| a.genome().clone()));

        // Fill rest with offspring from tournament selection + crossover + mutation
        while next_gen.len() < size {
            let parent_a = self.tournament_select(&ranked, rng);
            let parent_b = self.tournament_select(&ranked, rng);
            let child = parent_a.crossover(parent_b, rng).mutated(
                self.config.mutation_rate,
                self.config.mutation_strength,
                rng,
            );
            next_gen.push(child);
        }

        Ok(next_gen)
    }
}
