use anyhow::{Context, Result};
use aquarium_core::init_logging;
use aquarium_io::SaveStore;
use aquarium_lib::{load_config, Runner, StepMode};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless aquarium life simulation", long_about = None)]
struct Args {
    /// TOML config file; missing file means defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save file for autosave and resume
    #[arg(long)]
    save: Option<PathBuf>,

    /// Continue from the save file when it holds a usable save
    #[arg(long, requires = "save")]
    resume: bool,

    /// Wall-clock seconds to simulate
    #[arg(long, default_value_t = 600.0)]
    seconds: f64,

    /// Requested speed multiplier; applied as the speed cap allows
    #[arg(long)]
    speed: Option<f64>,

    /// Starting fish count (1-6)
    #[arg(long)]
    fish: Option<u32>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Step mode
    #[arg(long, value_enum, default_value_t = StepMode::Hidden)]
    mode: StepMode,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Frame length used to drive visible mode.
const VISIBLE_FRAME_SEC: f64 = 1.0 / 60.0;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(fish) = args.fish {
        config.world.initial_fish_count = fish;
    }
    // Always run seeded so a run can be replayed from its summary.
    let seed = args
        .seed
        .or(config.world.seed)
        .unwrap_or_else(rand::random::<u64>);
    config.world.seed = Some(seed);
    tracing::info!(seed, "Seed selected");
    config.validate().context("invalid configuration")?;
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );

    let store = args.save.clone().map(SaveStore::new);
    let mut runner = match (store, args.resume) {
        (Some(store), true) => Runner::resume(config, store, args.mode),
        (store, _) => Runner::new(config, store, args.mode),
    };

    let requested_speed = args.speed;
    let apply_speed = |runner: &mut Runner| {
        if let Some(speed) = requested_speed {
            runner.world_mut().set_speed_multiplier(speed);
        }
    };
    apply_speed(&mut runner);

    match args.mode {
        StepMode::Hidden => {
            // Chunk by autosave-sized slices so the speed request can follow
            // the cap as it unlocks.
            let mut remaining = args.seconds;
            while remaining > 0.0 && !runner.is_failed() {
                let chunk = remaining.min(10.0);
                runner.advance(chunk);
                remaining -= chunk;
                apply_speed(&mut runner);
            }
        }
        StepMode::Visible => {
            let frames = (args.seconds / VISIBLE_FRAME_SEC).ceil() as u64;
            for _ in 0..frames {
                if runner.is_failed() {
                    break;
                }
                runner.advance(VISIBLE_FRAME_SEC);
                apply_speed(&mut runner);
            }
        }
    }

    runner.autosave();
    let summary = runner.summary();
    println!("{}", aquarium_io::to_json_pretty(&summary)?);
    Ok(())
}
