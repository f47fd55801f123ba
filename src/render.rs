use dodge_evo::config::BallisticsConfig;
use dodge_evo::physics::{Projectile, FIELD_HEIGHT, FIELD_WIDTH};
use dodge_evo::{Agent, GenerationStats, RoundController, ShotDensityField, Vec2};
use macroquad::prelude::*;

const BACKGROUND_COLOR: Color = Color::new(0.08, 0.09, 0.12, 1.0);
const AGENT_COLOR: Color = SKYBLUE;
const HIT_COLOR: Color = RED;
const PROJECTILE_COLOR: Color = LIGHTGRAY;
const ARC_COLOR: Color = Color::new(1.0, 0.0, 0.0, 0.5);

/// Ticks a hit agent stays visible as a fading flash
pub const HIT_FLASH_TICKS: u32 = 30;

/// Steps simulated for the aim preview arc
const ARC_STEPS: usize = 60;

/// Density at which a heatmap cell is drawn fully opaque
const HEATMAP_SATURATION: f32 = 0.05;
const HEATMAP_CELL: usize = 20;

/// Uniform scale from field coords to screen coords
pub fn screen_scale(screen_w: f32, screen_h: f32) -> f32 {
    (screen_w / FIELD_WIDTH).min(screen_h / FIELD_HEIGHT)
}

fn field_to_screen(pos: Vec2, scale: f32) -> (f32, f32) {
    (pos.x * scale, pos.y * scale)
}

pub fn screen_to_field(x: f32, y: f32, scale: f32) -> Vec2 {
    Vec2::new(x / scale, y / scale)
}

/// Positions of a shot launched from `origin` toward `target` at `speed`,
/// stopping once it leaves the field
pub fn preview_arc(
    origin: Vec2,
    target: Vec2,
    speed: f32,
    ballistics: &BallisticsConfig,
) -> Vec<Vec2> {
    let mut shot = Projectile::aimed(origin, target, speed);
    let mut points = Vec::with_capacity(ARC_STEPS);
    for _ in 0..ARC_STEPS {
        shot.step(ballistics.drag, ballistics.gravity);
        points.push(shot.pos);
        if shot.is_outside(FIELD_WIDTH, FIELD_HEIGHT) {
            break;
        }
    }
    points
}

fn draw_agent(agent: &Agent, scale: f32) {
    let (sx, sy) = field_to_screen(agent.pos, scale);
    let r = agent.radius * scale;
    if agent.alive {
        draw_circle(sx, sy, r, AGENT_COLOR);
        draw_circle_lines(sx, sy, r, 1.5, WHITE);
        return;
    }
    // Dead agents flash briefly, then disappear
    if let Some(t) = agent.ticks_since_hit().filter(|&t| t < HIT_FLASH_TICKS) {
        let fade = 1.0 - t as f32 / HIT_FLASH_TICKS as f32;
        let grow = 1.0 + 0.5 * (1.0 - fade);
        draw_circle(sx, sy, r * grow, Color { a: fade, ..HIT_COLOR });
    }
}

fn draw_heatmap(history: &ShotDensityField, scale: f32) {
    if history.total_impacts() == 0 {
        return;
    }
    let half = HEATMAP_CELL as f32 / 2.0;
    for cy in (0..history.height()).step_by(HEATMAP_CELL) {
        for cx in (0..history.width()).step_by(HEATMAP_CELL) {
            let density = history.density_at(cx as f32 + half, cy as f32 + half);
            if density <= 0.0 {
                continue;
            }
            let alpha = (density / HEATMAP_SATURATION).min(1.0) * 0.35;
            draw_rectangle(
                cx as f32 * scale,
                cy as f32 * scale,
                HEATMAP_CELL as f32 * scale,
                HEATMAP_CELL as f32 * scale,
                Color::new(1.0, 0.4, 0.0, alpha),
            );
        }
    }
}

/// Draw the field, shot history, agents and projectiles
pub fn draw_round<R: ::rand::Rng>(ctrl: &RoundController<R>, scale: f32) {
    clear_background(BLACK);
    draw_rectangle(0.0, 0.0, FIELD_WIDTH * scale, FIELD_HEIGHT * scale, BACKGROUND_COLOR);
    draw_heatmap(ctrl.shot_history(), scale);

    for agent in &ctrl.current_population().agents {
        draw_agent(agent, scale);
    }
    for p in ctrl.projectiles() {
        let (sx, sy) = field_to_screen(p.pos, scale);
        draw_circle(sx, sy, 4.0 * scale.max(0.5), PROJECTILE_COLOR);
    }
}

/// Aim line, predicted trajectory and charge bar while the mouse is held
pub fn draw_aim(origin: Vec2, target: Vec2, power: f32, ballistics: &BallisticsConfig, scale: f32) {
    let (ox, oy) = field_to_screen(origin, scale);
    let (tx, ty) = field_to_screen(target, scale);
    draw_line(ox, oy, tx, ty, 1.0, GREEN);

    let speed = ballistics.speed_for_power(power);
    for point in preview_arc(origin, target, speed, ballistics) {
        let (px, py) = field_to_screen(point, scale);
        draw_circle(px, py, 2.0, ARC_COLOR);
    }

    let (bar_w, bar_h) = (180.0, 20.0);
    let bar_x = 10.0;
    let bar_y = FIELD_HEIGHT * scale - bar_h - 10.0;
    draw_rectangle(bar_x, bar_y, bar_w, bar_h, LIGHTGRAY);
    draw_rectangle(bar_x, bar_y, bar_w * power, bar_h, DARKGREEN);
    draw_rectangle_lines(bar_x, bar_y, bar_w, bar_h, 1.0, BLACK);
}

/// Draw the HUD overlay with generation info
pub fn draw_hud<R: ::rand::Rng>(
    ctrl: &RoundController<R>,
    last: Option<&GenerationStats>,
    auto_fire: bool,
    sim_speed: u32,
) {
    let population = ctrl.current_population();
    let text = format!(
        "Gen: {}  Alive: {}/{}  Next gen: {}  Tick: {}  Speed: {}x",
        ctrl.generation_index(),
        population.alive_count(),
        population.len(),
        ctrl.target_population_size(),
        ctrl.round_ticks(),
        sim_speed
    );
    draw_text(&text, 10.0, 20.0, 20.0, WHITE);

    if let Some(stats) = last {
        let text = format!(
            "Last gen best: {:.1}  avg: {:.1}  genome {}",
            stats.best_fitness, stats.avg_fitness, stats.best_genome
        );
        draw_text(&text, 10.0, 40.0, 18.0, GREEN);
    }

    let status = if !ctrl.is_round_active() {
        "SPACE: start round"
    } else if auto_fire {
        "Auto-fire ON (A)"
    } else {
        "Click+hold+release: shoot  A: auto-fire"
    };
    draw_text(status, 10.0, 60.0, 18.0, YELLOW);
}

/// Draw a fitness graph showing best and average fitness over generations
pub fn draw_fitness_graph(history: &[GenerationStats], screen_w: f32, screen_h: f32) {
    clear_background(BLACK);
    draw_text("Fitness by generation", 50.0, 40.0, 30.0, WHITE);
    if history.is_empty() {
        draw_text("No generation completed yet", 50.0, 80.0, 20.0, YELLOW);
        return;
    }

    let graph_x = 50.0;
    let graph_y = 80.0;
    let graph_w = screen_w - 100.0;
    let graph_h = screen_h - 130.0;

    draw_line(graph_x, graph_y, graph_x, graph_y + graph_h, 1.0, DARKGRAY);
    draw_line(
        graph_x,
        graph_y + graph_h,
        graph_x + graph_w,
        graph_y + graph_h,
        1.0,
        DARKGRAY,
    );

    // Fitness can be negative, so scale over the observed range
    let max_fitness = history
        .iter()
        .map(|s| s.best_fitness)
        .fold(f32::NEG_INFINITY, f32::max)
        .max(1.0);
    let min_fitness = history
        .iter()
        .map(|s| s.avg_fitness)
        .fold(f32::INFINITY, f32::min)
        .min(0.0);

    let x_scale = graph_w / history.len().max(2).saturating_sub(1) as f32;
    let y_scale = graph_h / (max_fitness - min_fitness);
    let to_y = |f: f32| graph_y + graph_h - (f - min_fitness) * y_scale;

    for i in 1..history.len() {
        let x1 = graph_x + (i - 1) as f32 * x_scale;
        let x2 = graph_x + i as f32 * x_scale;
        draw_line(
            x1,
            to_y(history[i - 1].best_fitness),
            x2,
            to_y(history[i].best_fitness),
            2.0,
            GREEN,
        );
        draw_line(
            x1,
            to_y(history[i - 1].avg_fitness),
            x2,
            to_y(history[i].avg_fitness),
            2.0,
            SKYBLUE,
        );
    }

    draw_text("Best", graph_x + graph_w - 125.0, graph_y + 15.0, 16.0, GREEN);
    draw_text("Avg", graph_x + graph_w - 125.0, graph_y + 35.0, 16.0, SKYBLUE);
    draw_text("TAB: field view", 10.0, screen_h - 10.0, 16.0, GRAY);
}
