use crate::config::MovementConfig;
use crate::heatmap::ShotDensityField;
use crate::physics::{self, Projectile, Vec2};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;

/// Number of genes in a freshly generated genome
pub const GENE_COUNT: usize = 3;

/// Gene indices: jitter, live-threat avoidance, hot-zone avoidance, memory dodge
pub const JITTER_GENE: usize = 0;
pub const AVOIDANCE_GENE: usize = 1;
pub const HISTORY_GENE: usize = 2;
pub const MEMORY_GENE: usize = 3;

/// Weight used for any behavior gene a genome does not carry
pub const MISSING_GENE_WEIGHT: f32 = 1.0;

/// Jitter weight for a genome without a jitter gene
pub const MISSING_JITTER_WEIGHT: f32 = 0.5;

/// Per-component movement multipliers applied on top of the gene weights
pub const JITTER_SCALE: f32 = 8.0;
pub const AVOIDANCE_SCALE: f32 = 18.0;
pub const HISTORY_SCALE: f32 = 8.0;
pub const MEMORY_SCALE: f32 = 6.0;

/// Projectiles closer than this push the agent away
pub const THREAT_RADIUS: f32 = 200.0;

/// The remembered threat is dodged only while it is closer than this
pub const MEMORY_RADIUS: f32 = 100.0;

/// Ticks a remembered threat stays actionable once no projectile is in flight
pub const MEMORY_TICKS: u32 = 1;

/// Maximum distance an agent can move in one tick
pub const MAX_STEP: f32 = 10.0;

/// Agent collision radius
pub const AGENT_RADIUS: f32 = 30.0;

/// An agent's behavior weights.
///
/// Genes are private: a genome never changes after construction, offspring are
/// always new values built by [`Genome::crossover`] and [`Genome::mutated`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<f32>,
}

impl Genome {
    /// Create a random genome with every gene in [0, 1)
    pub fn random(rng: &mut impl Rng) -> Self {
        let genes = (0..GENE_COUNT).map(|_| rng.gen_range(0.0..1.0)).collect();
        Self { genes }
    }

    /// Wrap raw genes. Ranges are not enforced here.
    pub fn from_genes(genes: Vec<f32>) -> Self {
        Self { genes }
    }

    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Gene `index`, or `fallback` when the genome is too short
    pub fn gene_or(&self, index: usize, fallback: f32) -> f32 {
        self.genes.get(index).copied().unwrap_or(fallback)
    }

    /// Valid range of gene `index`, enforced whenever offspring are produced
    pub fn valid_range(index: usize) -> RangeInclusive<f32> {
        if index == JITTER_GENE {
            0.0..=1.0
        } else {
            -2.0..=2.0
        }
    }

    /// Uniform crossover: each gene comes from either parent with equal probability.
    ///
    /// The child has `self`'s length; genes missing from `other` come from `self`.
    pub fn crossover(&self, other: &Genome, rng: &mut impl Rng) -> Genome {
        let genes = self
            .genes
            .iter()
            .enumerate()
            .map(|(i, &a)| match other.genes.get(i) {
                Some(&b) if rng.gen_bool(0.5) => b,
                _ => a,
            })
            .collect();
        Genome { genes }
    }

    /// Copy with Gaussian noise added to each gene with probability `rate`,
    /// every gene then clamped to its valid range
    pub fn mutated(&self, rate: f32, strength: f32, rng: &mut impl Rng) -> Genome {
        let genes = self
            .genes
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut g = g;
                if rng.gen::<f32>() < rate {
                    g += rng.sample::<f32, _>(StandardNormal) * strength;
                }
                let range = Genome::valid_range(i);
                g.clamp(*range.start(), *range.end())
            })
            .collect();
        Genome { genes }
    }

}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, g) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{g:.2}")?;
        }
        write!(f, "]")
    }
}

/// Short-term memory of the nearest threat, reset every round
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreatMemory {
    pub last_threat: Option<Vec2>,
    pub ticks_since_threat: u32,
    pub last_move: Vec2,
}

/// An evolving dodger
#[derive(Clone, Debug)]
pub struct Agent {
    pub pos: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub memory: ThreatMemory,
    genome: Genome,
    fitness: f32,
    last_move_distance: f32,
    ticks_since_hit: Option<u32>,
}

impl Agent {
    pub fn new(pos: Vec2, radius: f32, genome: Genome) -> Self {
        Self {
            pos,
            radius,
            alive: true,
            memory: ThreatMemory::default(),
            genome,
            fitness: 0.0,
            last_move_distance: 0.0,
            ticks_since_hit: None,
        }
    }

    /// Start a new round at `pos`. The genome is kept.
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.alive = true;
        self.memory = ThreatMemory::default();
        self.fitness = 0.0;
        self.last_move_distance = 0.0;
        self.ticks_since_hit = None;
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn add_fitness(&mut self, value: f32) {
        self.fitness += value;
    }

    /// Length of the last clamped movement step
    pub fn last_move_distance(&self) -> f32 {
        self.last_move_distance
    }

    /// Logical ticks elapsed since this agent was hit, `None` if never hit this round
    pub fn ticks_since_hit(&self) -> Option<u32> {
        self.ticks_since_hit
    }

    pub fn advance_hit_timer(&mut self) {
        if let Some(t) = self.ticks_since_hit.as_mut() {
            *t = t.saturating_add(1);
        }
    }

    /// True if `point` lies inside the collision disc of a living agent
    pub fn is_hit(&self, point: Vec2) -> bool {
        self.alive && self.pos.distance_squared(point) <= self.radius * self.radius
    }

    /// Mark the agent dead and charge the death penalty once
    pub fn die(&mut self, penalty: f32) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.fitness -= penalty;
        self.ticks_since_hit = Some(0);
    }

    /// Move one tick. Dead agents stay put.
    ///
    /// Returns the applied (clamped) movement vector.
    pub fn update(
        &mut self,
        projectiles: &[Projectile],
        history: &ShotDensityField,
        field: (f32, f32),
        cfg: &MovementConfig,
        rng: &mut impl Rng,
    ) -> Vec2 {
        if !self.alive {
            return Vec2::ZERO;
        }

        let jitter_w = self
            .genome
            .gene_or(JITTER_GENE, cfg.missing_jitter_weight)
            .clamp(0.0, 1.0);
        let avoid_w = self.genome.gene_or(AVOIDANCE_GENE, cfg.missing_gene_weight);
        let history_w = self.genome.gene_or(HISTORY_GENE, cfg.missing_gene_weight);
        let memory_w = self.genome.gene_or(MEMORY_GENE, cfg.missing_gene_weight);

        // Random jitter for unpredictability
        let jitter = Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5))
            * (jitter_w * cfg.jitter_scale);

        // Push away from projectiles in flight
        let (avoid, nearest) = threat_avoidance(self.pos, projectiles, cfg.threat_radius);
        let avoid = avoid * (avoid_w * cfg.avoidance_scale);

        // Hot zones: random direction, magnitude follows local density
        let density = history.density_at(self.pos.x, self.pos.y);
        let angle = rng.gen_range(0.0..2.0 * PI);
        let hot_zone = Vec2::from_angle(angle) * (history_w * density * cfg.history_scale);

        // Short-term memory of the nearest threat
        match nearest {
            Some(threat) => {
                self.memory.last_threat = Some(threat);
                self.memory.ticks_since_threat = 0;
            }
            None => {
                self.memory.ticks_since_threat = self.memory.ticks_since_threat.saturating_add(1);
            }
        }
        let dodge = self.memory_dodge(cfg) * (memory_w * cfg.memory_scale);

        let step = (jitter + avoid + hot_zone + dodge).clamp_length(cfg.max_step);
        self.last_move_distance = step.length();
        self.memory.last_move = step;

        self.pos = physics::clamp_to_field(self.pos + step, field.0, field.1, self.radius);
        step
    }

    /// Unit vector away from the remembered threat, zero when it is stale or out of range
    fn memory_dodge(&self, cfg: &MovementConfig) -> Vec2 {
        let Some(threat) = self.memory.last_threat else {
            return Vec2::ZERO;
        };
        if self.memory.ticks_since_threat > cfg.memory_ticks {
            return Vec2::ZERO;
        }
        let away = self.pos - threat;
        let dist = away.length();
        if dist > 0.0 && dist < cfg.memory_radius {
            away * (1.0 / dist)
        } else {
            Vec2::ZERO
        }
    }
}

/// Sum of inverse-square repulsion from every projectile within `radius` of
/// `pos`, plus the position of the nearest projectile at any range.
pub fn threat_avoidance(pos: Vec2, projectiles: &[Projectile], radius: f32) -> (Vec2, Option<Vec2>) {
    let radius_sq = radius * radius;
    let mut avoid = Vec2::ZERO;
    let mut nearest: Option<(f32, Vec2)> = None;

    for p in projectiles {
        let away = pos - p.pos;
        let dist_sq = away.length_squared();
        if dist_sq < radius_sq {
            avoid += away * (1.0 / (dist_sq + 1.0));
        }
        if nearest.map_or(true, |(best, _)| dist_sq < best) {
            nearest = Some((dist_sq, p.pos));
        }
    }

    (avoid, nearest.map(|(_, at)| at))
}
