use crate::ai::Agent;
use crate::config::FitnessConfig;
use crate::heatmap::ShotDensityField;
use crate::physics::Projectile;

/// Reward per tick alive
pub const SURVIVAL_BONUS: f32 = 1.0;

/// Near misses inside this distance earn a close-call bonus
pub const CLOSE_CALL_RADIUS: f32 = 100.0;

/// Close-call bonus is `CLOSE_CALL_NUMERATOR / (distance + CLOSE_CALL_OFFSET)`
pub const CLOSE_CALL_NUMERATOR: f32 = 8.0;
pub const CLOSE_CALL_OFFSET: f32 = 10.0;

/// Squared distance under which two live agents count as clustered
pub const CLUSTER_DISTANCE_SQ: f32 = 1200.0;
pub const CLUSTER_PENALTY: f32 = 0.5;

/// Penalty per unit moved in the last tick
pub const MOVEMENT_COST: f32 = 0.2;

/// Numerator of the quiet-zone bonus `HOT_ZONE_BONUS / (1 + density)`
pub const HOT_ZONE_BONUS: f32 = 1.0;

/// One-time penalty on the tick an agent is hit
pub const DEATH_PENALTY: f32 = 10.0;

/// Bonus for a projectile `distance` away from an agent of `radius`.
///
/// Only genuine near misses count: a projectile inside the collision disc is a
/// hit, not a close call.
pub fn close_call_bonus(distance: f32, radius: f32, cfg: &FitnessConfig) -> Option<f32> {
    (distance > radius && distance < cfg.close_call_radius)
        .then(|| cfg.close_call_numerator / (distance + cfg.close_call_offset))
}

/// Fitness earned this tick by `agents[index]`.
///
/// Must run after hit resolution; dead agents earn nothing.
pub fn tick_reward(
    agents: &[Agent],
    index: usize,
    projectiles: &[Projectile],
    history: &ShotDensityField,
    cfg: &FitnessConfig,
) -> f32 {
    let agent = &agents[index];
    if !agent.alive {
        return 0.0;
    }

    let mut reward = cfg.survival_bonus;

    reward += projectiles
        .iter()
        .filter_map(|p| close_call_bonus(agent.pos.distance(p.pos), agent.radius, cfg))
        .sum::<f32>();

    let clustered = agents
        .iter()
        .enumerate()
        .filter(|&(j, other)| {
            j != index
                && other.alive
                && agent.pos.distance_squared(other.pos) < cfg.cluster_distance_sq
        })
        .count();
    reward -= cfg.cluster_penalty * clustered as f32;

    reward -= cfg.movement_cost * agent.last_move_distance();

    let density = history.density_at(agent.pos.x, agent.pos.y);
    reward += cfg.hot_zone_bonus / (1.0 + density);

    reward
}
