use crate::ai::{Agent, Genome};
use crate::config::{FieldConfig, SimConfig};
use crate::error::ConfigError;
use crate::evolution::{EvolutionEngine, GenerationStats};
use crate::fitness;
use crate::heatmap::ShotDensityField;
use crate::physics::{self, Projectile, Vec2};
use crate::shooter::AutoShooter;
use rand::Rng;
use tracing::{debug, info, warn};

/// Agents in the first generation
pub const INITIAL_POPULATION: usize = 20;

/// Agents added to the target population size after each generation
pub const POPULATION_GROWTH: usize = 1;

/// Upper bound for population growth
pub const MAX_POPULATION: usize = 100;

/// Round lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Running,
}

/// The agents of one generation
#[derive(Clone, Debug)]
pub struct Population {
    pub agents: Vec<Agent>,
    pub generation: u32,
}

impl Population {
    /// Spawn one agent per genome inside the field's spawn band
    pub fn spawn(
        genomes: Vec<Genome>,
        generation: u32,
        field: &FieldConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let agents = genomes
            .into_iter()
            .map(|genome| Agent::new(field.spawn.sample(field, rng), field.agent_radius, genome))
            .collect();
        Self { agents, generation }
    }

    /// Create a new random population
    pub fn random(size: usize, field: &FieldConfig, rng: &mut impl Rng) -> Self {
        let genomes = (0..size).map(|_| Genome::random(rng)).collect();
        Self::spawn(genomes, 0, field, rng)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    pub fn is_extinct(&self) -> bool {
        self.agents.iter().all(|a| !a.alive)
    }
}

/// What happened during one tick
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Indices of agents hit this tick
    pub hits: Vec<usize>,
    /// Stats of the generation that just ended, if the tick ended the round
    pub finished: Option<GenerationStats>,
}

/// Owns the population, projectiles and shot history, and drives rounds and
/// generation transitions.
pub struct RoundController<R: Rng> {
    config: SimConfig,
    engine: EvolutionEngine,
    population: Population,
    history: ShotDensityField,
    projectiles: Vec<Projectile>,
    state: RoundState,
    target_size: usize,
    round_ticks: u32,
    rng: R,
}

impl<R: Rng> RoundController<R> {
    /// Validate `config` and create a random first generation. The controller
    /// starts `Idle`; call [`RoundController::start_round`] to begin.
    pub fn new(config: SimConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let (grid_w, grid_h) = config.field.grid_size();
        let history = ShotDensityField::new(grid_w, grid_h)?;
        let population = Population::random(config.population.initial_size, &config.field, &mut rng);

        Ok(Self {
            engine: EvolutionEngine::new(config.evolution.clone()),
            target_size: config.population.initial_size,
            config,
            population,
            history,
            projectiles: Vec::new(),
            state: RoundState::Idle,
            round_ticks: 0,
            rng,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_population(&self) -> &Population {
        &self.population
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn shot_history(&self) -> &ShotDensityField {
        &self.history
    }

    pub fn generation_index(&self) -> u32 {
        self.population.generation
    }

    pub fn is_round_active(&self) -> bool {
        self.state == RoundState::Running
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Ticks elapsed in the current round
    pub fn round_ticks(&self) -> u32 {
        self.round_ticks
    }

    /// Size the next generation will be bred to
    pub fn target_population_size(&self) -> usize {
        self.target_size
    }

    /// Respawn every agent with cleared fitness and memory, and forget the
    /// previous round's projectiles and impacts. Genomes are untouched.
    pub fn start_round(&mut self) {
        for agent in &mut self.population.agents {
            let pos = self.config.field.spawn.sample(&self.config.field, &mut self.rng);
            agent.reset(pos);
        }
        self.history.clear();
        self.projectiles.clear();
        self.round_ticks = 0;
        self.state = RoundState::Running;
        debug!(
            generation = self.population.generation,
            agents = self.population.len(),
            "round started"
        );
    }

    /// Enqueue a projectile from `origin` toward `target`. The origin is
    /// clamped into the field.
    pub fn spawn_projectile(
        &mut self,
        origin_x: f32,
        origin_y: f32,
        target_x: f32,
        target_y: f32,
        speed: f32,
    ) {
        let origin = physics::clamp_to_field(
            Vec2::new(origin_x, origin_y),
            self.config.field.width,
            self.config.field.height,
            0.0,
        );
        self.projectiles.push(Projectile::aimed(
            origin,
            Vec2::new(target_x, target_y),
            speed.max(0.0),
        ));
    }

    /// Fire a charged shot from the shooter origin. `power` is in [0, 1].
    pub fn fire_charged(&mut self, target: Vec2, power: f32) {
        let origin = self.config.ballistics.shooter_origin;
        let speed = self.config.ballistics.speed_for_power(power);
        self.spawn_projectile(origin.x, origin.y, target.x, target.y, speed);
    }

    /// Let `shooter` fire a simulated shot if one is due. Returns true if it fired.
    pub fn auto_fire(&mut self, shooter: &mut AutoShooter) -> bool {
        if !self.is_round_active() {
            return false;
        }
        let Some(shot) =
            shooter.next_shot(&self.population.agents, &self.config.ballistics, &mut self.rng)
        else {
            return false;
        };
        self.spawn_projectile(shot.origin.x, shot.origin.y, shot.target.x, shot.target.y, shot.speed);
        true
    }

    /// Advance one frame: projectiles, agents, hits, fitness, then the
    /// terminal check. Does nothing while idle.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.state != RoundState::Running {
            return report;
        }
        let (width, height) = (self.config.field.width, self.config.field.height);

        // Projectiles
        let (drag, gravity) = (self.config.ballistics.drag, self.config.ballistics.gravity);
        let history = &mut self.history;
        self.projectiles.retain_mut(|p| {
            p.step(drag, gravity);
            if p.is_outside(width, height) {
                let landed = physics::clamp_to_field(p.pos, width - 1.0, height - 1.0, 0.0);
                history.record(landed.x, landed.y);
                false
            } else {
                true
            }
        });

        // Agents read an immutable view of this tick's projectiles
        for agent in &mut self.population.agents {
            agent.advance_hit_timer();
            agent.update(
                &self.projectiles,
                &self.history,
                (width, height),
                &self.config.movement,
                &mut self.rng,
            );
        }

        // Hits
        for (i, agent) in self.population.agents.iter_mut().enumerate() {
            if let Some(p) = self.projectiles.iter().find(|p| agent.is_hit(p.pos)) {
                agent.die(self.config.fitness.death_penalty);
                self.history.record(p.pos.x, p.pos.y);
                report.hits.push(i);
                debug!(
                    agent = i,
                    generation = self.population.generation,
                    tick = self.round_ticks,
                    fitness = agent.fitness(),
                    "agent hit"
                );
            }
        }

        // Fitness shaping
        let rewards: Vec<f32> = (0..self.population.agents.len())
            .map(|i| {
                fitness::tick_reward(
                    &self.population.agents,
                    i,
                    &self.projectiles,
                    &self.history,
                    &self.config.fitness,
                )
            })
            .collect();
        for (agent, reward) in self.population.agents.iter_mut().zip(rewards) {
            if agent.alive {
                agent.add_fitness(reward);
            }
        }

        self.round_ticks += 1;

        if self.population.is_extinct() {
            report.finished = self.evolve();
        }
        report
    }

    /// End the current round as if every agent had died. Aborted agents are
    /// not charged the death penalty.
    pub fn abort_round(&mut self) -> Option<GenerationStats> {
        if self.state != RoundState::Running {
            return None;
        }
        warn!(
            generation = self.population.generation,
            tick = self.round_ticks,
            alive = self.population.alive_count(),
            "round aborted"
        );
        for agent in &mut self.population.agents {
            agent.alive = false;
        }
        self.evolve()
    }

    /// Breed the next generation from the finished round and start it
    fn evolve(&mut self) -> Option<GenerationStats> {
        self.state = RoundState::Idle;
        let generation = self.population.generation;
        let stats = GenerationStats::from_agents(generation, self.round_ticks, &self.population.agents);
        if let Some(stats) = &stats {
            info!(
                generation,
                population = stats.population_size,
                ticks = stats.ticks,
                best = stats.best_fitness,
                avg = stats.avg_fitness,
                std_dev = stats.std_dev_fitness,
                genome = %stats.best_genome,
                "generation complete"
            );
        }

        self.target_size = self.config.population.next_size(self.target_size);
        let genomes = match self
            .engine
            .next_generation(&self.population.agents, self.target_size, &mut self.rng)
        {
            Ok(genomes) => genomes,
            Err(e) => {
                warn!(error = %e, "evolution failed, reseeding random genomes");
                (0..self.target_size)
                    .map(|_| Genome::random(&mut self.rng))
                    .collect()
            }
        };

        self.population =
            Population::spawn(genomes, generation + 1, &self.config.field, &mut self.rng);
        self.start_round();
        stats
    }
}
