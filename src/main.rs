//! Rigid Arcade entry point
//!
//! Runs one of the samples headless on its autopilot and reports the result.
//!
//! ```text
//! rigid-arcade [breakout|targets|hello] [config.json]
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rigid_arcade::consts::MAX_HEADLESS_FRAMES;
use rigid_arcade::demos::{Demo, HelloWindow, RunSummary, run_headless};
use rigid_arcade::{Breakout, BreakoutConfig, JsonConfig, TargetRange, TargetsConfig};

/// Seed for layouts and launch angles
const SEED: u64 = 0x5EED;

fn report<D: Demo>(demo: &D, summary: RunSummary) {
    let (w, h) = demo.screen_size();
    log::info!(
        "{} ({}x{}) finished after {} frames",
        demo.title(),
        w,
        h,
        summary.frames
    );
    match summary.phase {
        Some(phase) => println!(
            "{}: {:?}, score {}, {} destroyed in {} frames",
            demo.title(),
            phase,
            summary.score,
            summary.destroyed,
            summary.frames
        ),
        None => println!("{}: drew {} frame(s)", demo.title(), summary.frames),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sample to run
    #[arg(value_enum, default_value_t = Sample::Breakout)]
    sample: Sample,
    /// JSON config for the sample; missing fields keep their defaults
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Sample {
    /// 2D brick breaker
    Breakout,
    /// 3D target range
    Targets,
    /// Single greeting frame
    Hello,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    log::info!("Rigid Arcade starting ({:?})", args.sample);

    match args.sample {
        Sample::Breakout => {
            let config = args
                .config
                .map(BreakoutConfig::load)
                .unwrap_or_default();
            let mut demo = Breakout::new(config, SEED);
            let summary = run_headless(&mut demo, MAX_HEADLESS_FRAMES);
            report(&demo, summary);
        }
        Sample::Targets => {
            let config = args
                .config
                .map(TargetsConfig::load)
                .unwrap_or_default();
            let mut demo = TargetRange::new(config, SEED);
            let summary = run_headless(&mut demo, MAX_HEADLESS_FRAMES);
            report(&demo, summary);
        }
        Sample::Hello => {
            let mut demo = HelloWindow::default();
            let summary = run_headless(&mut demo, 1);
            report(&demo, summary);
        }
    }
}
