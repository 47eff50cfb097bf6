//! Soothe entry point
//!
//! On the web the library's `#[wasm_bindgen(start)]` hook does the setup and JS
//! drives `WebSession`. Natively this runs a session headless from scripted
//! frame timestamps with synthetic touches and logs what would be drawn.
//!
//! Usage: `soothe [SCENE] [SECONDS] [SETTINGS_JSON]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Soothe (native, headless) starting...");

    let args = headless::Args::parse();
    if let Err(e) = headless::run(args) {
        log::error!("{:#}", e);
        std::process::exit(2);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start hook, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use glam::Vec2;

    use soothe::consts::TARGET_HZ;
    use soothe::sim::{ScriptedTicks, TickInput, pump};
    use soothe::{SceneKind, Session, Settings};

    const VIEWPORT: Vec2 = Vec2::new(390.0, 844.0);
    /// A synthetic finger taps this often
    const TAP_EVERY: u64 = 90;
    /// and drags for this many frames afterwards
    const DRAG_FRAMES: u64 = 30;

    #[derive(Parser)]
    #[command(name = "soothe")]
    #[command(about = "Run a calming scene headless and log what it draws", long_about = None)]
    #[command(version)]
    pub struct Args {
        /// Scene to run (snowglobe, bubbles, swirl, bouncy-balls, ripples)
        pub scene: Option<String>,

        /// Simulated seconds
        #[arg(default_value_t = 10.0)]
        pub seconds: f64,

        /// Settings JSON file (defaults otherwise)
        pub settings: Option<PathBuf>,

        /// Seed for the session rng
        #[arg(long, default_value_t = 0x5eed)]
        pub seed: u64,
    }

    pub fn run(args: Args) -> anyhow::Result<()> {
        let kind = match args.scene.as_deref() {
            Some(name) => SceneKind::parse(name)?,
            None => SceneKind::default(),
        };
        let seconds = args.seconds;
        let settings = match &args.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                Settings::from_json(&json)
                    .with_context(|| format!("Invalid settings in {}", path.display()))?
            }
            None => Settings::load(),
        };
        log::info!("Scene: {}, {:.1}s, settings: {}", kind.as_str(), seconds, settings.to_json()?);

        let frames = (seconds.max(0.0) * TARGET_HZ as f64) as usize;
        // One long stall halfway through, as if the app was backgrounded
        let mut ticks = ScriptedTicks::steady(frames).with_stall(frames / 2, 2.5);

        let mut session = Session::new(kind, args.seed);
        session.resize(VIEWPORT.x, VIEWPORT.y);
        let input = TickInput::default();

        let mut frame = 0u64;
        let mut peak_entities = 0usize;
        let mut peak_primitives = 0usize;
        let delivered = pump(&mut ticks, |now| {
            let phase = frame % TAP_EVERY;
            let finger = finger_position(frame);
            if phase == 0 {
                session.touch_began(finger);
            } else if phase < DRAG_FRAMES {
                session.touch_moved(finger);
            } else if phase == DRAG_FRAMES {
                session.touch_ended();
            }

            let list = session.frame(now, &settings, &input);
            let entities = session.scene().map(|s| s.pool.len()).unwrap_or(0);
            peak_entities = peak_entities.max(entities);
            peak_primitives = peak_primitives.max(list.len());

            if frame % TARGET_HZ as u64 == 0 {
                log::info!(
                    "t={:6.2}s scene={:<12} entities={:4} primitives={:4} phase={:?}",
                    now,
                    session.kind().as_str(),
                    entities,
                    list.len(),
                    session.phase()
                );
            }
            frame += 1;
        });

        log::info!(
            "Done: {} frames, peak {} entities, peak {} primitives",
            delivered,
            peak_entities,
            peak_primitives
        );
        session.teardown();
        Ok(())
    }

    /// Slow Lissajous path across the middle of the screen
    fn finger_position(frame: u64) -> Vec2 {
        let t = frame as f32 / TARGET_HZ as f32;
        VIEWPORT * 0.5 + Vec2::new((t * 0.7).sin() * 120.0, (t * 0.45).cos() * 260.0)
    }
}
