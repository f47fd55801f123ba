use dodge_evo::config::{PopulationConfig, ShooterConfig};
use dodge_evo::{AutoShooter, RoundController, RoundState, SimConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config(size: usize) -> SimConfig {
    SimConfig {
        population: PopulationConfig {
            initial_size: size,
            growth: 1,
            max_size: 12,
        },
        shooter: ShooterConfig {
            fire_interval: 3,
            aim_spread: 15.0,
        },
        ..SimConfig::default()
    }
}

#[test]
fn rounds_advance_generations_under_fire() {
    let mut ctrl = RoundController::new(config(8), StdRng::seed_from_u64(21)).unwrap();
    assert_eq!(ctrl.state(), RoundState::Idle);
    ctrl.start_round();

    let mut shooter = AutoShooter::new(ctrl.config().shooter.clone());
    let mut finished = Vec::new();
    while finished.len() < 3 {
        ctrl.auto_fire(&mut shooter);
        let report = ctrl.tick();
        for &i in &report.hits {
            assert!(!ctrl.current_population().agents[i].alive || report.finished.is_some());
        }
        let outcome = match report.finished {
            Some(stats) => Some(stats),
            // Cap long rounds the way the trainer does
            None if ctrl.round_ticks() >= 1500 => ctrl.abort_round(),
            None => None,
        };
        if let Some(stats) = outcome {
            shooter.reset();
            finished.push(stats);
        }
    }

    for (i, stats) in finished.iter().enumerate() {
        assert_eq!(stats.generation, i as u32);
        assert_eq!(stats.population_size, 8 + i);
    }
    assert_eq!(ctrl.generation_index(), 3);
    assert_eq!(ctrl.current_population().len(), 11);
    assert!(ctrl.is_round_active());
}

#[test]
fn manual_shots_feed_shot_history() {
    let mut ctrl = RoundController::new(config(4), StdRng::seed_from_u64(4)).unwrap();
    ctrl.start_round();
    // Straight down from the top edge, lands inside the field
    ctrl.spawn_projectile(100.0, 0.0, 100.0, 600.0, 30.0);
    for _ in 0..40 {
        ctrl.tick();
    }
    assert!(ctrl.projectiles().is_empty());
    assert_eq!(ctrl.shot_history().total_impacts(), 1);
    assert!(ctrl.shot_history().density_at(100.0, 599.0) > 0.0);
}

#[test]
fn trainer_history_serializes_to_json() {
    let mut trainer = Trainer::new(config(5), StdRng::seed_from_u64(6), 300).unwrap();
    let stats = trainer.run(2);
    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("best_fitness"));
    assert!(json.contains("best_genome"));
}
