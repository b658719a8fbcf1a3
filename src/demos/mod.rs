//! Playable samples built on the round core
//!
//! Each demo owns its physics world and round, consumes one [`FrameInput`]
//! per frame and draws through any [`Canvas`].

pub mod breakout;
pub mod hello;
pub mod targets;

pub use breakout::Breakout;
pub use hello::HelloWindow;
pub use targets::TargetRange;

use crate::consts::FRAME_DT;
use crate::input::FrameInput;
use crate::render::{Canvas, DrawList};
use crate::sim::{Round, RoundEvent, RoundPhase};

/// Common surface of the samples
pub trait Demo {
    fn title(&self) -> &str;

    /// Surface size in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Advance one frame
    fn update(&mut self, input: &FrameInput, dt: f32) -> Vec<RoundEvent>;

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C);

    /// Input a simple built-in player would give this frame
    fn autopilot(&self) -> FrameInput;

    /// Round being played, if the demo has one
    fn round(&self) -> Option<&Round> {
        None
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub score: u64,
    pub phase: Option<RoundPhase>,
    pub destroyed: u32,
}

/// Drive a demo with its autopilot at the fixed frame rate
///
/// Stops when the round reaches a terminal phase, after `max_frames`, or
/// after a single frame for demos without a round.
pub fn run_headless<D: Demo>(demo: &mut D, max_frames: u32) -> RunSummary {
    let mut canvas = DrawList::new();
    let mut summary = RunSummary {
        frames: 0,
        score: 0,
        phase: None,
        destroyed: 0,
    };

    log::info!("Running {} headless", demo.title());
    while summary.frames < max_frames {
        let input = demo.autopilot();
        for event in demo.update(&input, FRAME_DT) {
            if matches!(event, RoundEvent::ObjectDestroyed { .. }) {
                summary.destroyed += 1;
            }
        }
        demo.draw(&mut canvas);
        summary.frames += 1;

        let Some(round) = demo.round() else {
            break;
        };
        summary.score = round.score();
        summary.phase = Some(round.phase());
        if round.phase().is_terminal() {
            break;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakoutConfig, TargetsConfig};

    #[test]
    fn test_hello_runs_one_frame() {
        let summary = run_headless(&mut HelloWindow::default(), 100);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.phase, None);
    }

    #[test]
    fn test_breakout_autopilot_scores() {
        let mut demo = Breakout::new(BreakoutConfig::default(), 3);
        let summary = run_headless(&mut demo, 600);
        assert!(summary.score > 0);
        assert!(summary.destroyed > 0);
        assert_eq!(summary.score, demo.round().map_or(0, |r| r.score()));
    }

    #[test]
    fn test_targets_headless_respects_frame_cap() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 3);
        let summary = run_headless(&mut demo, 120);
        assert!(summary.frames <= 120);
        assert!(summary.phase.is_some());
    }
}
