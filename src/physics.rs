use serde::{Deserialize, Serialize};

/// Default play field dimensions
pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

/// Largest accepted field side; the shot density grid holds one cell per unit
pub const MAX_FIELD_DIMENSION: f32 = 16384.0;

/// Fraction of projectile velocity retained per tick
pub const DRAG: f32 = 0.99;

/// Downward acceleration applied to projectiles each tick
pub const GRAVITY: f32 = 0.68;

/// Projectile launch speed at zero charge
pub const MIN_SHOT_SPEED: f32 = 5.0;

/// Projectile launch speed at full charge
pub const MAX_SHOT_SPEED: f32 = 38.0;

/// 2D vector type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }

    /// Unit vector from an angle (0 = right, PI/2 = down)
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Rescale to at most `max` length, keeping direction
    pub fn clamp_length(self, max: f32) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Clamp a position into the field, keeping `margin` away from every edge
pub fn clamp_to_field(pos: Vec2, width: f32, height: f32, margin: f32) -> Vec2 {
    Vec2 {
        x: pos.x.clamp(margin, width - margin),
        y: pos.y.clamp(margin, height - margin),
    }
}

/// A ballistic point mass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    /// Launch from `origin` toward `target` at `speed`.
    ///
    /// Coincident origin and target leave the projectile at rest instead of
    /// dividing by zero.
    pub fn aimed(origin: Vec2, target: Vec2, speed: f32) -> Self {
        let delta = target - origin;
        let mut dist = delta.length();
        if dist == 0.0 {
            dist = 1.0;
        }
        Self {
            pos: origin,
            vel: delta * (speed / dist),
        }
    }

    /// Advance one tick: drag, then gravity, then integrate
    pub fn step(&mut self, drag: f32, gravity: f32) {
        self.vel = self.vel * drag;
        self.vel.y += gravity;
        self.pos += self.vel;
    }

    pub fn is_outside(&self, width: f32, height: f32) -> bool {
        self.pos.x < 0.0 || self.pos.x > width || self.pos.y < 0.0 || self.pos.y > height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    // --- Vec2 basic operations ---

    #[test]
    fn vec2_new_and_default() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.x, 3.0);
        assert_eq!(v.y, 4.0);

        let d = Vec2::default();
        assert_eq!(d, Vec2::ZERO);
    }

    #[test]
    fn vec2_length() {
        assert!(approx_eq(Vec2::new(3.0, 4.0).length(), 5.0));
        assert!(approx_eq(Vec2::new(3.0, 4.0).length_squared(), 25.0));
        assert!(approx_eq(Vec2::ZERO.length(), 0.0));
    }

    #[test]
    fn vec2_distance() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 5.0);
        assert!(approx_eq(a.distance(b), 5.0));
        assert!(approx_eq(a.distance_squared(b), 25.0));
    }

    #[test]
    fn vec2_from_angle() {
        let v = Vec2::from_angle(0.0);
        assert!(approx_eq(v.x, 1.0));
        assert!(approx_eq(v.y, 0.0));

        // PI/2 = pointing down
        let v = Vec2::from_angle(PI / 2.0);
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.y, 1.0));
    }

    #[test]
    fn vec2_arithmetic() {
        let r = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0);
        assert_eq!(r, Vec2::new(4.0, 6.0));

        let r = Vec2::new(5.0, 7.0) - Vec2::new(2.0, 3.0);
        assert_eq!(r, Vec2::new(3.0, 4.0));

        let mut r = Vec2::new(2.0, 3.0) * 4.0;
        r += Vec2::new(1.0, 1.0);
        assert_eq!(r, Vec2::new(9.0, 13.0));
    }

    #[test]
    fn clamp_length_caps_long_vectors() {
        let v = Vec2::new(30.0, 40.0).clamp_length(10.0);
        assert!(approx_eq(v.length(), 10.0));
        assert!(approx_eq(v.x, 6.0));
        assert!(approx_eq(v.y, 8.0));
    }

    #[test]
    fn clamp_length_keeps_short_vectors() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.clamp_length(10.0), v);
        assert_eq!(Vec2::ZERO.clamp_length(10.0), Vec2::ZERO);
    }

    // --- Field clamping ---

    #[test]
    fn clamp_to_field_inside_is_identity() {
        let p = clamp_to_field(Vec2::new(400.0, 300.0), 800.0, 600.0, 30.0);
        assert_eq!(p, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn clamp_to_field_respects_margin() {
        let p = clamp_to_field(Vec2::new(-50.0, 700.0), 800.0, 600.0, 30.0);
        assert!(approx_eq(p.x, 30.0));
        assert!(approx_eq(p.y, 570.0));
    }

    // --- Projectiles ---

    #[test]
    fn aimed_projectile_has_requested_speed() {
        let p = Projectile::aimed(Vec2::new(0.0, 600.0), Vec2::new(300.0, 200.0), 20.0);
        assert!(approx_eq(p.vel.length(), 20.0));
        assert!(p.vel.x > 0.0);
        assert!(p.vel.y < 0.0);
        assert_eq!(p.pos, Vec2::new(0.0, 600.0));
    }

    #[test]
    fn aimed_projectile_degenerate_target_is_at_rest() {
        let p = Projectile::aimed(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 38.0);
        assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn step_applies_drag_then_gravity() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::new(10.0, 0.0));
        p.step(DRAG, GRAVITY);
        assert!(approx_eq(p.vel.x, 9.9));
        assert!(approx_eq(p.vel.y, 0.68));
        assert!(approx_eq(p.pos.x, 109.9));
        assert!(approx_eq(p.pos.y, 100.68));
    }

    #[test]
    fn gravity_pulls_resting_projectile_down() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::ZERO);
        for _ in 0..10 {
            p.step(DRAG, GRAVITY);
        }
        assert!(approx_eq(p.pos.x, 100.0));
        assert!(p.pos.y > 100.0);
    }

    #[test]
    fn is_outside_detects_every_edge() {
        let inside = Projectile::new(Vec2::new(400.0, 300.0), Vec2::ZERO);
        assert!(!inside.is_outside(800.0, 600.0));

        for pos in [
            Vec2::new(-1.0, 300.0),
            Vec2::new(801.0, 300.0),
            Vec2::new(400.0, -1.0),
            Vec2::new(400.0, 601.0),
        ] {
            assert!(Projectile::new(pos, Vec2::ZERO).is_outside(800.0, 600.0));
        }
    }

    // --- Constants sanity checks ---

    #[test]
    fn ballistic_constants() {
        assert!(DRAG > 0.0 && DRAG < 1.0);
        assert!(GRAVITY > 0.0);
        assert!(MIN_SHOT_SPEED < MAX_SHOT_SPEED);
    }
}
