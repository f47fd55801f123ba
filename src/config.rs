//! Simulation settings.
//!
//! Every tunable of the core lives here so behavioral variants are
//! configuration rather than forked code. Defaults come from the constants
//! declared next to the code that uses them.

use crate::ai::{
    AGENT_RADIUS, AVOIDANCE_SCALE, HISTORY_SCALE, JITTER_SCALE, MAX_STEP, MEMORY_RADIUS,
    MEMORY_SCALE, MEMORY_TICKS, MISSING_GENE_WEIGHT, MISSING_JITTER_WEIGHT, THREAT_RADIUS,
};
use crate::error::ConfigError;
use crate::evolution::{ELITE_COUNT, MUTATION_RATE, MUTATION_STRENGTH, TOURNAMENT_SIZE};
use crate::fitness::{
    CLOSE_CALL_NUMERATOR, CLOSE_CALL_OFFSET, CLOSE_CALL_RADIUS, CLUSTER_DISTANCE_SQ,
    CLUSTER_PENALTY, DEATH_PENALTY, HOT_ZONE_BONUS, MOVEMENT_COST, SURVIVAL_BONUS,
};
use crate::game::{INITIAL_POPULATION, MAX_POPULATION, POPULATION_GROWTH};
use crate::physics::{
    self, Vec2, DRAG, FIELD_HEIGHT, FIELD_WIDTH, GRAVITY, MAX_FIELD_DIMENSION, MAX_SHOT_SPEED,
    MIN_SHOT_SPEED,
};
use crate::shooter::{AIM_SPREAD, FIRE_INTERVAL};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub field: FieldConfig,
    pub movement: MovementConfig,
    pub fitness: FitnessConfig,
    pub ballistics: BallisticsConfig,
    pub evolution: EvolutionConfig,
    pub population: PopulationConfig,
    pub shooter: ShooterConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Missing sections and fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.movement.validate()?;
        self.ballistics.validate()?;
        self.evolution.validate()?;
        self.population.validate()?;
        self.shooter.validate()
    }
}

/// Rectangle agents are spawned in at the start of each round
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnBand {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for SpawnBand {
    fn default() -> Self {
        Self {
            x_min: 400.0,
            x_max: 700.0,
            y_min: 100.0,
            y_max: 500.0,
        }
    }
}

impl SpawnBand {
    /// Random point in the band, clamped into the field so the agent fits
    pub fn sample(&self, field: &FieldConfig, rng: &mut impl Rng) -> Vec2 {
        let x = sample_span(self.x_min, self.x_max, rng);
        let y = sample_span(self.y_min, self.y_max, rng);
        physics::clamp_to_field(Vec2::new(x, y), field.width, field.height, field.agent_radius)
    }
}

fn sample_span(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    pub agent_radius: f32,
    pub spawn: SpawnBand,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            agent_radius: AGENT_RADIUS,
            spawn: SpawnBand::default(),
        }
    }
}

impl FieldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        let side_ok = |side: f32| side.is_finite() && (1.0..=MAX_FIELD_DIMENSION).contains(&side);
        if !(side_ok(width) && side_ok(height)) {
            return Err(ConfigError::InvalidField {
                width,
                height,
                max: MAX_FIELD_DIMENSION,
            });
        }
        let radius = self.agent_radius;
        if !(radius.is_finite() && radius >= 0.0) || 2.0 * radius > width || 2.0 * radius > height
        {
            return Err(ConfigError::AgentDoesNotFit {
                radius,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Size of the shot density grid covering this field
    pub fn grid_size(&self) -> (usize, usize) {
        (self.width.ceil() as usize, self.height.ceil() as usize)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub jitter_scale: f32,
    pub avoidance_scale: f32,
    pub history_scale: f32,
    pub memory_scale: f32,
    pub threat_radius: f32,
    pub memory_radius: f32,
    pub memory_ticks: u32,
    pub max_step: f32,
    pub missing_gene_weight: f32,
    pub missing_jitter_weight: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            jitter_scale: JITTER_SCALE,
            avoidance_scale: AVOIDANCE_SCALE,
            history_scale: HISTORY_SCALE,
            memory_scale: MEMORY_SCALE,
            threat_radius: THREAT_RADIUS,
            memory_radius: MEMORY_RADIUS,
            memory_ticks: MEMORY_TICKS,
            max_step: MAX_STEP,
            missing_gene_weight: MISSING_GENE_WEIGHT,
            missing_jitter_weight: MISSING_JITTER_WEIGHT,
        }
    }
}

impl MovementConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("movement.threat_radius", self.threat_radius)?;
        non_negative("movement.memory_radius", self.memory_radius)?;
        non_negative("movement.max_step", self.max_step)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub survival_bonus: f32,
    pub close_call_radius: f32,
    pub close_call_numerator: f32,
    pub close_call_offset: f32,
    pub cluster_distance_sq: f32,
    pub cluster_penalty: f32,
    pub movement_cost: f32,
    pub hot_zone_bonus: f32,
    pub death_penalty: f32,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            survival_bonus: SURVIVAL_BONUS,
            close_call_radius: CLOSE_CALL_RADIUS,
            close_call_numerator: CLOSE_CALL_NUMERATOR,
            close_call_offset: CLOSE_CALL_OFFSET,
            cluster_distance_sq: CLUSTER_DISTANCE_SQ,
            cluster_penalty: CLUSTER_PENALTY,
            movement_cost: MOVEMENT_COST,
            hot_zone_bonus: HOT_ZONE_BONUS,
            death_penalty: DEATH_PENALTY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsConfig {
    pub drag: f32,
    pub gravity: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Where charged shots and simulated shots are fired from
    pub shooter_origin: Vec2,
}

impl Default for BallisticsConfig {
    fn default() -> Self {
        Self {
            drag: DRAG,
            gravity: GRAVITY,
            min_speed: MIN_SHOT_SPEED,
            max_speed: MAX_SHOT_SPEED,
            shooter_origin: Vec2::new(0.0, FIELD_HEIGHT),
        }
    }
}

impl BallisticsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.drag) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "ballistics.drag",
                value: self.drag,
            });
        }
        non_negative("ballistics.min_speed", self.min_speed)?;
        non_negative("ballistics.max_speed", self.max_speed)
    }

    /// Launch speed for a charge `power` in [0, 1]
    pub fn speed_for_power(&self, power: f32) -> f32 {
        let power = power.clamp(0.0, 1.0);
        self.min_speed + (self.max_speed - self.min_speed) * power
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Probability each gene of a child mutates
    pub mutation_rate: f32,
    /// Standard deviation of the Gaussian mutation noise
    pub mutation_strength: f32,
    /// Genomes copied unchanged into the next generation
    pub elite_count: usize,
    /// Candidates drawn per tournament
    pub tournament_size: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: MUTATION_RATE,
            mutation_strength: MUTATION_STRENGTH,
            elite_count: ELITE_COUNT,
            tournament_size: TOURNAMENT_SIZE,
        }
    }
}

impl EvolutionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "evolution.mutation_rate",
                value: self.mutation_rate,
            });
        }
        non_negative("evolution.mutation_strength", self.mutation_strength)?;
        if self.tournament_size == 0 {
            return Err(ConfigError::ZeroCount {
                name: "evolution.tournament_size",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub initial_size: usize,
    /// Agents added to the target size after each generation
    pub growth: usize,
    pub max_size: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_size: INITIAL_POPULATION,
            growth: POPULATION_GROWTH,
            max_size: MAX_POPULATION,
        }
    }
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size == 0 {
            return Err(ConfigError::ZeroCount {
                name: "population.initial_size",
            });
        }
        if self.max_size == 0 {
            return Err(ConfigError::ZeroCount {
                name: "population.max_size",
            });
        }
        Ok(())
    }

    /// Target size of the generation after one of size `current`
    pub fn next_size(&self, current: usize) -> usize {
        current
            .saturating_add(self.growth)
            .min(self.max_size.max(current))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Ticks between simulated shots
    pub fire_interval: u32,
    /// Maximum aim error in either axis
    pub aim_spread: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            fire_interval: FIRE_INTERVAL,
            aim_spread: AIM_SPREAD,
        }
    }
}

impl ShooterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fire_interval == 0 {
            return Err(ConfigError::ZeroCount {
                name: "shooter.fire_interval",
            });
        }
        non_negative("shooter.aim_spread", self.aim_spread)
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_tuned_constants() {
        let c = SimConfig::default();
        assert_eq!(c.field.width, 800.0);
        assert_eq!(c.field.height, 600.0);
        assert_eq!(c.evolution.elite_count, 3);
        assert_eq!(c.evolution.tournament_size, 3);
        assert_eq!(c.movement.threat_radius, 200.0);
        assert_eq!(c.movement.max_step, 10.0);
        assert_eq!(c.fitness.death_penalty, 10.0);
    }

    #[test]
    fn rejects_degenerate_field() {
        let mut c = SimConfig::default();
        c.field.width = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidField { .. })));

        let mut c = SimConfig::default();
        c.field.height = -600.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidField { .. })));

        let mut c = SimConfig::default();
        c.field.width = f32::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_agent_larger_than_field() {
        let mut c = SimConfig::default();
        c.field.width = 50.0;
        assert!(matches!(c.validate(), Err(ConfigError::AgentDoesNotFit { .. })));
    }

    #[test]
    fn rejects_bad_evolution_settings() {
        let mut c = SimConfig::default();
        c.evolution.mutation_rate = 1.5;
        assert!(c.validate().is_err());

        let mut c = SimConfig::default();
        c.evolution.tournament_size = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_empty_population() {
        let mut c = SimConfig::default();
        c.population.initial_size = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ZeroCount {
                name: "population.initial_size"
            })
        ));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SimConfig::from_json_str(r#"{ "evolution": { "elite_count": 5 } }"#).unwrap();
        assert_eq!(c.evolution.elite_count, 5);
        assert_eq!(c.evolution.tournament_size, TOURNAMENT_SIZE);
        assert_eq!(c.field, FieldConfig::default());
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(SimConfig::from_json_str(r#"{ "field": { "width": 0.0 } }"#).is_err());
    }

    #[test]
    fn loads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "population": {{ "initial_size": 7, "growth": 0 }} }}"#).unwrap();
        let c = SimConfig::from_json_file(file.path()).unwrap();
        assert_eq!(c.population.initial_size, 7);
        assert_eq!(c.population.growth, 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = SimConfig::from_json_file("/nonexistent/dodge.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn rejects_oversized_field() {
        let mut c = SimConfig::default();
        c.field.width = 1e10;
        c.field.height = 1e10;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidField { .. })));

        let mut c = SimConfig::default();
        c.field.width = MAX_FIELD_DIMENSION;
        assert!(c.validate().is_ok());
        c.field.width = MAX_FIELD_DIMENSION + 1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn partial_spawn_band_keeps_defaults() {
        let c = SimConfig::from_json_str(r#"{ "field": { "spawn": { "x_min": 300.0 } } }"#)
            .unwrap();
        assert_eq!(c.field.spawn.x_min, 300.0);
        assert_eq!(c.field.spawn.x_max, SpawnBand::default().x_max);
        assert_eq!(c.field.spawn.y_min, SpawnBand::default().y_min);
    }

    #[test]
    fn speed_for_power_interpolates() {
        let b = BallisticsConfig::default();
        assert_eq!(b.speed_for_power(0.0), MIN_SHOT_SPEED);
        assert_eq!(b.speed_for_power(1.0), MAX_SHOT_SPEED);
        assert_eq!(b.speed_for_power(7.0), MAX_SHOT_SPEED);
        assert!((b.speed_for_power(0.5) - 21.5).abs() < 1e-5);
    }

    #[test]
    fn next_size_grows_up_to_cap() {
        let p = PopulationConfig {
            initial_size: 5,
            growth: 2,
            max_size: 8,
        };
        assert_eq!(p.next_size(5), 7);
        assert_eq!(p.next_size(7), 8);
        assert_eq!(p.next_size(8), 8);
        // Never shrinks a population that already exceeds the cap
        assert_eq!(p.next_size(10), 10);
    }

    #[test]
    fn spawn_positions_stay_in_band_and_field() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = FieldConfig::default();
        for _ in 0..200 {
            let p = field.spawn.sample(&field, &mut rng);
            assert!(p.x >= 400.0 && p.x < 700.0);
            assert!(p.y >= 100.0 && p.y < 500.0);
        }
    }

    #[test]
    fn spawn_band_outside_field_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = FieldConfig {
            spawn: SpawnBand {
                x_min: 5000.0,
                x_max: 4000.0,
                y_min: -100.0,
                y_max: -50.0,
            },
            ..FieldConfig::default()
        };
        let p = field.spawn.sample(&field, &mut rng);
        assert_eq!(p.x, field.width - field.agent_radius);
        assert_eq!(p.y, field.agent_radius);
    }
}
