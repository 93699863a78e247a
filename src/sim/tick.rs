//! Fixed timestep session tick
//!
//! Applies host input, refreshes the occupancy grid, then advances the chaser.

use super::agent::{AgentEvent, DeactivationCause, TickContext};
use super::state::{ChaseState, GameEvent};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Paddle center x (from mouse/touch position)
    pub paddle_x: Option<f32>,
    /// Spawn a chaser if none is active
    pub spawn_chaser: bool,
    /// Remove the active chaser without scoring
    pub remove_chaser: bool,
    /// Bricks destroyed by the ball this tick
    pub destroyed_bricks: Vec<u32>,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut ChaseState, input: &TickInput, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        log::warn!("Skipping tick with invalid dt {dt}");
        return;
    }
    state.time_ticks += 1;

    if let Some(x) = input.paddle_x {
        state.move_paddle(x);
    }
    if !input.destroyed_bricks.is_empty() {
        state.remove_bricks(&input.destroyed_bricks);
    }
    state.rebuild_grid();

    if input.remove_chaser {
        if let Some(mut chaser) = state.chaser.take() {
            if let Some(event) = chaser.deactivate() {
                record(state, chaser.id, event);
            }
        }
    }
    if input.spawn_chaser {
        state.spawn_chaser();
    }

    let Some(chaser) = state.chaser.as_mut() else {
        return;
    };
    let id = chaser.id;
    let mut ctx = TickContext {
        grid: &mut state.grid,
        layout: &state.layout,
        target: state.paddle,
        obstacles: &state.bricks,
        play_area: state.play_area,
    };
    if let Some(event) = chaser.tick(&mut ctx, dt) {
        state.chaser = None;
        record(state, id, event);
    }
}

fn record(state: &mut ChaseState, id: u32, event: AgentEvent) {
    let AgentEvent::Deactivated { cause, score_delta } = event;
    state.score += i64::from(score_delta);
    if cause == DeactivationCause::HitTarget {
        log::info!("Chaser {} caught the paddle, score {}", id, state.score);
    }
    state.events.push(GameEvent::ChaserDeactivated {
        id,
        cause,
        score_delta,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::ChaserSettings;
    use crate::sim::agent::AgentMode;

    fn run_until_deactivated(state: &mut ChaseState, max_ticks: u32) -> Option<GameEvent> {
        for _ in 0..max_ticks {
            tick(state, &TickInput::default(), SIM_DT);
            if let Some(event) = state
                .events
                .iter()
                .find(|e| matches!(e, GameEvent::ChaserDeactivated { .. }))
            {
                return Some(*event);
            }
        }
        None
    }

    #[test]
    fn test_spawn_then_catch_paddle_on_open_field() {
        let mut state = ChaseState::new(12345, ChaserSettings::default());
        let spawn = TickInput {
            spawn_chaser: true,
            ..Default::default()
        };
        tick(&mut state, &spawn, SIM_DT);
        assert!(state.chaser.is_some());

        let event = run_until_deactivated(&mut state, 120 * 30);
        assert!(matches!(
            event,
            Some(GameEvent::ChaserDeactivated {
                cause: DeactivationCause::HitTarget,
                score_delta: -1,
                ..
            })
        ));
        assert_eq!(state.score, -1);
        assert!(state.chaser.is_none());
    }

    #[test]
    fn test_chaser_threads_gap_in_brick_wall() {
        let mut state = ChaseState::new(7, ChaserSettings::default());
        // Two full-width walls with a single gap each, on opposite sides
        state.add_brick_wall(BRICK_HEIGHT * 4.0, 1, 10, |_, col| col == 0);
        state.add_brick_wall(BRICK_HEIGHT * 10.0, 1, 10, |_, col| col == 9);
        tick(
            &mut state,
            &TickInput {
                spawn_chaser: true,
                ..Default::default()
            },
            SIM_DT,
        );

        let event = run_until_deactivated(&mut state, 120 * 60);
        assert!(matches!(
            event,
            Some(GameEvent::ChaserDeactivated {
                cause: DeactivationCause::HitTarget,
                ..
            })
        ));
    }

    #[test]
    fn test_sealed_wall_makes_chaser_wander() {
        let mut state = ChaseState::new(3, ChaserSettings::default());
        state.add_brick_wall(BRICK_HEIGHT * 6.0, 1, 10, |_, _| false);
        tick(
            &mut state,
            &TickInput {
                spawn_chaser: true,
                ..Default::default()
            },
            SIM_DT,
        );
        let chaser = state.chaser.as_ref().unwrap();
        assert_eq!(chaser.mode, AgentMode::Wandering);
        let y = chaser.pos.y;

        for _ in 0..240 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let chaser = state.chaser.as_ref().unwrap();
        assert_eq!(chaser.mode, AgentMode::Wandering);
        assert_eq!(chaser.pos.y, y);
    }

    #[test]
    fn test_removed_chaser_scores_nothing() {
        let mut state = ChaseState::new(5, ChaserSettings::default());
        tick(
            &mut state,
            &TickInput {
                spawn_chaser: true,
                ..Default::default()
            },
            SIM_DT,
        );
        let id = state.chaser.as_ref().unwrap().id;
        tick(
            &mut state,
            &TickInput {
                remove_chaser: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(state.chaser.is_none());
        assert_eq!(state.score, 0);
        assert_eq!(
            state.drain_events().last(),
            Some(&GameEvent::ChaserDeactivated {
                id,
                cause: DeactivationCause::Removed,
                score_delta: 0
            })
        );
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut state = ChaseState::new(5, ChaserSettings::default());
        tick(&mut state, &TickInput::default(), 0.0);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = ChaseState::new(99999, ChaserSettings::default());
        let mut state2 = ChaseState::new(99999, ChaserSettings::default());
        for state in [&mut state1, &mut state2] {
            state.add_brick_wall(BRICK_HEIGHT * 5.0, 2, 8, |row, col| (row + col) % 3 == 0);
        }

        let inputs = [
            TickInput {
                spawn_chaser: true,
                ..Default::default()
            },
            TickInput {
                paddle_x: Some(100.0),
                ..Default::default()
            },
            TickInput {
                destroyed_bricks: vec![2, 3],
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.events, state2.events);
        assert_eq!(state1.score, state2.score);
        let pos1 = state1.chaser.as_ref().map(|c| c.pos);
        let pos2 = state2.chaser.as_ref().map(|c| c.pos);
        assert_eq!(pos1, pos2);
    }
}
