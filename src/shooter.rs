use crate::ai::Agent;
use crate::config::{BallisticsConfig, ShooterConfig};
use crate::physics::Vec2;
use rand::Rng;

/// Ticks between simulated shots in AI-only training
pub const FIRE_INTERVAL: u32 = 8;

/// Maximum aim error along each axis
pub const AIM_SPREAD: f32 = 40.0;

/// A request to launch a projectile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotCommand {
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
}

/// Simulated shooter used when no human is firing.
///
/// Fires at full speed from the ballistics origin toward a random live agent,
/// raising the aim point by the expected gravity drop.
#[derive(Clone, Debug)]
pub struct AutoShooter {
    config: ShooterConfig,
    cooldown: u32,
}

impl AutoShooter {
    pub fn new(config: ShooterConfig) -> Self {
        Self {
            config,
            cooldown: 0,
        }
    }

    pub fn reset(&mut self) {
        self.cooldown = 0;
    }

    /// Call once per tick. Returns a shot when one is due and a target is alive.
    pub fn next_shot(
        &mut self,
        agents: &[Agent],
        ballistics: &BallisticsConfig,
        rng: &mut impl Rng,
    ) -> Option<ShotCommand> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }

        let live: Vec<&Agent> = agents.iter().filter(|a| a.alive).collect();
        if live.is_empty() {
            return None;
        }
        self.cooldown = self.config.fire_interval.saturating_sub(1);

        let mark = live[rng.gen_range(0..live.len())].pos;
        let spread = self.config.aim_spread;
        let aim = if spread > 0.0 {
            mark + Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
        } else {
            mark
        };

        let origin = ballistics.shooter_origin;
        let speed = ballistics.max_speed;
        Some(ShotCommand {
            origin,
            target: aim - Vec2::new(0.0, gravity_drop(origin, aim, speed, ballistics.gravity)),
            speed,
        })
    }
}

/// Rough vertical drop of a shot over the straight-line flight time
fn gravity_drop(origin: Vec2, target: Vec2, speed: f32, gravity: f32) -> f32 {
    if speed <= 0.0 {
        return 0.0;
    }
    let t = origin.distance(target) / speed;
    0.5 * gravity * t * t
}
