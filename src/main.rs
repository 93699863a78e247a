//! Brick Chaser entry point
//!
//! Headless native run: builds a sample brick layout, lets a chaser hunt a
//! sweeping paddle, and logs what happens. `RUST_LOG=debug` shows replans.

use brick_chaser::consts::*;
use brick_chaser::settings::ChaserSettings;
use brick_chaser::sim::{ChaseState, GameEvent, TickInput, tick};

/// Simulated seconds before the demo gives up
const DEMO_SECONDS: u32 = 60;

fn main() {
    env_logger::init();
    log::info!("Brick Chaser (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => ChaserSettings::load_or_default(&json),
            Err(e) => {
                log::warn!("Could not read {path}: {e}");
                ChaserSettings::default()
            }
        },
        None => ChaserSettings::default(),
    };

    let seed = 0x5eed;
    let mut state = ChaseState::new(seed, settings);
    state.add_brick_wall(BRICK_HEIGHT * 4.0, 2, 10, |row, col| row == 1 && col == 2);
    state.add_brick_wall(BRICK_HEIGHT * 9.0, 1, 10, |_, col| col == 7);
    state.add_brick_wall(BRICK_HEIGHT * 14.0, 1, 8, |_, col| col % 4 == 1);
    log::info!("Game initialized with seed: {} ({} bricks)", seed, state.bricks.len());

    let mut input = TickInput {
        spawn_chaser: true,
        ..Default::default()
    };

    for step in 0..DEMO_SECONDS * 120 {
        // Paddle sweeps back and forth across the bottom
        let t = step as f32 * SIM_DT;
        input.paddle_x = Some(PLAYFIELD_WIDTH * (0.5 + 0.4 * (t * 0.7).sin()));
        tick(&mut state, &input, SIM_DT);
        input.spawn_chaser = false;

        if let Some(chaser) = &state.chaser {
            if let Some(distress) = chaser.distress() {
                log::debug!("Chaser distress {:.2}", distress.intensity);
            }
        }

        for event in state.drain_events() {
            match event {
                GameEvent::ChaserSpawned { id } => log::info!("Chaser {id} released"),
                GameEvent::ChaserDeactivated { id, cause, score_delta } => {
                    log::info!("Chaser {id} gone ({cause:?}), score delta {score_delta}");
                    println!("tick {}: chaser {id} {cause:?}, score {}", state.time_ticks, state.score);
                    return;
                }
            }
        }
    }

    println!("chaser still hunting after {DEMO_SECONDS}s, score {}", state.score);
}
