use clap::Parser;
use tracing_subscriber::EnvFilter;

use squirrel::app::{demo_script, SimApp, SimConfig};
use squirrel::components::character::{DEFAULT_RUN_MULTIPLIER, DEFAULT_WALK_SPEED};
use squirrel::components::SquirrelConfig;
use squirrel::engine::time::DEFAULT_FIXED_DT;

#[derive(Parser)]
#[command(name = "squirrel", about = "Headless squirrel controller demo")]
struct Args {
    /// Walking speed in units per second
    #[arg(long, default_value_t = DEFAULT_WALK_SPEED)]
    walk_speed: f32,

    /// Sprint speed as a multiple of walking speed
    #[arg(long, default_value_t = DEFAULT_RUN_MULTIPLIER)]
    run_multiplier: f32,

    /// Trace state machine transitions
    #[arg(long)]
    debug: bool,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 3.0)]
    seconds: f32,

    /// Render frame length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,

    /// Fixed simulation step in seconds
    #[arg(long, default_value_t = DEFAULT_FIXED_DT)]
    fixed_dt: f32,

    /// Spawn without sprite, animator, or particle trail
    #[arg(long)]
    bare: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SimConfig {
        squirrel: SquirrelConfig::new(args.walk_speed, args.run_multiplier).with_debug(args.debug),
        seconds: args.seconds,
        frame_dt: args.frame_dt,
        fixed_dt: args.fixed_dt,
        bare: args.bare,
    };

    let mut app = match SimApp::new(&config, demo_script()) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to start squirrel");
            std::process::exit(1);
        }
    };

    let summary = app.run(config.seconds, config.frame_dt);
    tracing::info!(
        x = summary.position.x,
        y = summary.position.y,
        flip_x = ?summary.flip_x,
        particles = ?summary.particles_alive,
        frames = summary.frames,
        fixed_steps = summary.fixed_steps,
        "run finished"
    );
}
