//! Phase-cycling loop run on the light's background thread.

use std::thread;
use std::time::Duration;

use minstant::Instant;
use rand::Rng;

use crate::trace::debug;

use super::{CycleConfig, Shared};

/// Runs the cycler until the stop flag is observed.
///
/// Every quantum the loop wakes, checks the stop flag, and compares elapsed
/// time against the current target. On expiry it toggles the phase,
/// publishes the new value, and redraws the target. Shutdown latency is
/// therefore bounded by one quantum.
pub(super) fn run(shared: &Shared, config: &CycleConfig) {
    let mut rng = rand::rng();
    let mut target = draw_cycle(&mut rng, config);
    let mut last_toggle = Instant::now();

    while !shared.stopped() {
        thread::sleep(config.quantum);

        if last_toggle.elapsed() < target {
            continue;
        }

        let next = shared.phase().toggled();
        shared.set_phase(next);
        shared.events.send(next);
        debug!(phase = ?next, cycle = ?target, "phase toggled");

        target = draw_cycle(&mut rng, config);
        last_toggle = Instant::now();
    }
}

/// Draws the next cycle duration: a uniform integer number of units from
/// the configured inclusive range.
pub(super) fn draw_cycle<R: Rng>(rng: &mut R, config: &CycleConfig) -> Duration {
    let units = rng.random_range(config.cycle_units.clone());
    config.unit * units
}
