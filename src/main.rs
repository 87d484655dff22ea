//! Flappy Core headless demo
//!
//! Runs the simulation with the autopilot at 60 fps and logs what happens.
//!
//! Usage: `flappy-core [config.json] [seed] [seconds]`
//! (`-` for the config path keeps the defaults). Set `RUST_LOG=debug` to see
//! spawns and evictions.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::error::Error;

    use flappy_core::GameConfig;
    use flappy_core::hud::score_digits;
    use flappy_core::sim::{Autopilot, GameStateMachine, Occurrence};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const DEFAULT_SEED: u64 = 0x5eed;
    const DEFAULT_SECONDS: f32 = 60.0;

    struct Args {
        config: GameConfig,
        seed: u64,
        seconds: f32,
    }

    fn parse_args() -> Result<Args, Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let config = match args.next().as_deref() {
            None | Some("-") => GameConfig::default(),
            Some(path) => GameConfig::load(path)?,
        };
        let seed = match args.next() {
            Some(s) => s.parse()?,
            None => DEFAULT_SEED,
        };
        let seconds = match args.next() {
            Some(s) => s.parse()?,
            None => DEFAULT_SECONDS,
        };
        Ok(Args {
            config,
            seed,
            seconds,
        })
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let args = parse_args()?;
        let mut game = GameStateMachine::new(args.config, args.seed)?;
        let pilot = Autopilot::new(&args.config);

        let frames = (args.seconds / FRAME_DT).round() as u64;
        let mut runs = 0u32;
        let mut snapshot = game.snapshot();

        for _ in 0..frames {
            if let Some(event) = pilot.decide(&snapshot) {
                game.submit_event(event);
            }
            snapshot = game.tick(FRAME_DT)?;

            for event in &snapshot.events {
                match event {
                    Occurrence::Collision(kind) => {
                        runs += 1;
                        log::info!("Run {} ended on {:?} with score {}", runs, kind, snapshot.score);
                    }
                    Occurrence::Scored(id) => {
                        log::info!("Cleared pair {} (score {})", id.0, snapshot.score);
                    }
                    Occurrence::Spawned(_) | Occurrence::Evicted { .. } => {
                        log::debug!("{:?}", event);
                    }
                    Occurrence::StateChanged { .. } | Occurrence::Flapped => {
                        log::trace!("{:?}", event);
                    }
                }
            }
        }

        log::info!(
            "Finished {:.0}s: {} runs ended, best score {}",
            args.seconds,
            runs,
            game.best_score()
        );
        log::debug!("Score digits: {:?}", score_digits(snapshot.score, game.config()));
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Core (headless) starting...");

    if let Err(e) = demo::run() {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by the host page on wasm; there is no demo loop
}
