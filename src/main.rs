//! Swarm Grid headless host
//!
//! Drives the frame loop without a window: the player wanders on a seeded
//! random walk, diagnostics are logged once per simulated second and the final
//! frame's diagnostics are printed as JSON.
//!
//! Usage: `swarm-grid [settings.json] [frames]`

use std::path::Path;
use std::process::ExitCode;

use rand::Rng;

use swarm_grid::Settings;
use swarm_grid::consts::FRAME_DT;
use swarm_grid::sim::{Lcg, MoveIntent, SimState, TickInput, tick};

/// Frames to run when none are given (10 s at 60 Hz)
const DEFAULT_FRAMES: u64 = 600;

/// Chance per frame that the wandering player picks new keys
const WANDER_CHANCE: f64 = 0.05;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Swarm Grid (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut state = match SimState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("invalid settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Separate stream from the spawn RNG so the layout stays reproducible
    let mut wander = Lcg::new(state.settings.seed.rotate_left(16));
    let mut input = TickInput::new(FRAME_DT, state.settings.world_size());

    for _ in 0..frames {
        if wander.random_bool(WANDER_CHANCE) {
            input.movement = MoveIntent {
                up: wander.random(),
                down: wander.random(),
                left: wander.random(),
                right: wander.random(),
            };
        }

        let diag = tick(&mut state, &input);
        if diag.frame % 60 == 0 {
            log::info!(
                "frame {}: collisions {}{} (overlaps {}), grid avg/max {:.1}/{}, overflow {}",
                diag.frame,
                diag.collision_count,
                if diag.truncated { " (TRUNC)" } else { "" },
                diag.overlaps_found,
                diag.grid.avg_cell_count,
                diag.grid.max_cell_count,
                diag.grid.overflow_count,
            );
        }
    }

    match serde_json::to_string_pretty(&state.diagnostics) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("failed to encode diagnostics: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
