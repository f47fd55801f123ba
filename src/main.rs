mod render;

use dodge_evo::physics::{FIELD_HEIGHT, FIELD_WIDTH};
use dodge_evo::{AutoShooter, GenerationStats, RoundController, SimConfig};
use macroquad::prelude::*;
use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// A full charge cycle; holding longer wraps back to zero power
const CHARGE_CYCLE_SECS: f64 = 2.4;

fn window_conf() -> Conf {
    Conf {
        window_title: "Dodge Evolution".to_string(),
        window_width: FIELD_WIDTH as i32,
        window_height: FIELD_HEIGHT as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Charge power in [0, 1) after holding for `held_secs`
fn charge_power(held_secs: f64) -> f32 {
    (held_secs.max(0.0) % CHARGE_CYCLE_SECS / CHARGE_CYCLE_SECS) as f32
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = SimConfig::default();
    let mut shooter = AutoShooter::new(config.shooter.clone());
    let mut ctrl = match RoundController::new(config, StdRng::from_entropy()) {
        Ok(ctrl) => ctrl,
        Err(e) => {
            error!(error = %e, "invalid simulation config");
            return;
        }
    };

    let mut stats_history: Vec<GenerationStats> = Vec::new();
    let mut show_stats = false;
    let mut auto_fire = false;
    let mut charge_started: Option<f64> = None;
    let speed_levels: [u32; 5] = [1, 2, 4, 8, 16];
    let mut speed_index: usize = 0;

    info!("SPACE: start round  N: next generation  A: auto-fire  TAB: stats  UP/DOWN: speed");

    loop {
        let (sw, sh) = (screen_width(), screen_height());
        let scale = render::screen_scale(sw, sh);
        let (mx, my) = mouse_position();
        let aim = render::screen_to_field(mx, my, scale);

        if is_key_pressed(KeyCode::Tab) {
            show_stats = !show_stats;
        }
        if is_key_pressed(KeyCode::Space) && !ctrl.is_round_active() {
            shooter.reset();
            ctrl.start_round();
        }
        if is_key_pressed(KeyCode::N) {
            if let Some(stats) = ctrl.abort_round() {
                stats_history.push(stats);
            }
        }
        if is_key_pressed(KeyCode::A) {
            auto_fire = !auto_fire;
            shooter.reset();
        }
        if is_key_pressed(KeyCode::Up) && speed_index < speed_levels.len() - 1 {
            speed_index += 1;
        }
        if is_key_pressed(KeyCode::Down) && speed_index > 0 {
            speed_index -= 1;
        }
        let sim_speed = speed_levels[speed_index];

        // Mouse press charges, release fires
        if is_mouse_button_pressed(MouseButton::Left) {
            charge_started = Some(get_time());
        }
        let power = charge_started.map(|start| charge_power(get_time() - start));
        if is_mouse_button_released(MouseButton::Left) {
            if let Some(power) = power {
                ctrl.fire_charged(aim, power);
            }
            charge_started = None;
        }

        for _ in 0..sim_speed {
            if !ctrl.is_round_active() {
                break;
            }
            if auto_fire {
                ctrl.auto_fire(&mut shooter);
            }
            if let Some(stats) = ctrl.tick().finished {
                shooter.reset();
                stats_history.push(stats);
            }
        }

        if show_stats {
            render::draw_fitness_graph(&stats_history, sw, sh);
        } else {
            render::draw_round(&ctrl, scale);
            if let Some(start) = charge_started {
                render::draw_aim(
                    ctrl.config().ballistics.shooter_origin,
                    aim,
                    charge_power(get_time() - start),
                    &ctrl.config().ballistics,
                    scale,
                );
            }
            render::draw_hud(&ctrl, stats_history.last(), auto_fire, sim_speed);
        }

        next_frame().await;
    }
}
