//! Traffic-light actor: phase state, background cycler, and green-wait.
//!
//! # Architecture
//!
//! The actor owns the authoritative phase and one [`HandoffQueue`] of phase
//! events. [`TrafficLight::simulate`] spawns a single cycler thread that
//! toggles the phase on a random interval and publishes each new phase into
//! the queue. Any other thread can call [`TrafficLight::wait_for_green`] to
//! block until the next red→green transition.
//!
//! Only transition events are queued, never the current static value: a
//! waiter that attaches while the light already shows green still waits a
//! full cycle for the next green event.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use crossing::light::{CycleConfig, Phase, TrafficLight};
//!
//! // Millisecond-scale cycles to keep the example fast.
//! let config = CycleConfig {
//!     unit: Duration::from_millis(10),
//!     ..CycleConfig::default()
//! };
//! let light = Arc::new(TrafficLight::with_config(config));
//! assert_eq!(light.current_phase(), Phase::Red);
//!
//! light.simulate().unwrap();
//!
//! let waiter = {
//!     let light = Arc::clone(&light);
//!     std::thread::spawn(move || light.wait_for_green())
//! };
//! waiter.join().unwrap().unwrap();
//!
//! light.shutdown();
//! ```

mod cycler;

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::sync::handoff::{HandoffQueue, RecvError};
use crate::trace::{debug, info, warn};

/// One of the two traffic-light states.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Red = 0,
    Green = 1,
}

impl Phase {
    /// Returns the opposite phase.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        if raw == Self::Green as u8 {
            Self::Green
        } else {
            Self::Red
        }
    }
}

/// Timing configuration for the phase cycler.
///
/// The defaults reproduce the reference behavior: each cycle lasts a whole
/// number of seconds drawn uniformly from 4..=6, and the cycler polls its
/// elapsed time every millisecond.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Inclusive range the per-cycle duration multiplier is drawn from.
    /// Each cycle's draw is independent of prior cycles.
    ///
    /// **Default**: `4..=6`
    pub cycle_units: RangeInclusive<u32>,

    /// Length of one time unit. Scaling this down (e.g. to 10ms) speeds up
    /// the whole cycle without changing the drawn multipliers.
    ///
    /// **Default**: 1s
    pub unit: Duration,

    /// How often the cycler wakes to check elapsed time and the stop flag.
    /// Bounds both toggle latency past the deadline and shutdown latency.
    ///
    /// **Default**: 1ms
    pub quantum: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_units: 4..=6,
            unit: Duration::from_secs(1),
            quantum: Duration::from_millis(1),
        }
    }
}

/// Error starting the cycler.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum SimulateError {
    /// `simulate` was already called on this light. A second uncoordinated
    /// cycler writing the same phase field is rejected outright.
    #[error("cycler already running")]
    AlreadyRunning,
}

/// State shared between the actor handle and the cycler thread.
struct Shared {
    /// Current phase, stored as the `Phase` discriminant.
    phase: AtomicU8,
    /// Transition events, cycler → waiters.
    events: HandoffQueue<Phase>,
    /// Set by `shutdown`; the cycler checks it every quantum.
    stop: AtomicBool,
}

impl Shared {
    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Relaxed))
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Relaxed);
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// A single traffic light cycling between red and green on its own thread.
///
/// The light starts out red with no cycler running; nothing happens until
/// [`simulate`](Self::simulate) is called. All methods take `&self`, so the
/// light can be shared across threads behind an [`Arc`].
pub struct TrafficLight {
    shared: Arc<Shared>,
    config: CycleConfig,
    /// Latched once `simulate` succeeds.
    running: AtomicBool,
    cycler_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TrafficLight {
    /// Creates a red light with default timing (4-6s cycles).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CycleConfig::default())
    }

    /// Creates a red light with custom cycle timing.
    #[must_use]
    pub fn with_config(config: CycleConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                phase: AtomicU8::new(Phase::Red as u8),
                events: HandoffQueue::new(),
                stop: AtomicBool::new(false),
            }),
            config,
            running: AtomicBool::new(false),
            cycler_handle: Mutex::new(None),
        }
    }

    /// Returns the current phase. Never blocks.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Overwrites the stored phase unconditionally.
    ///
    /// Intended for setup and tests; the cycle itself only advances by
    /// toggling from the cycler thread.
    pub fn set_phase(&self, phase: Phase) {
        self.shared.set_phase(phase);
    }

    /// Starts the phase cycler on a background thread and returns
    /// immediately.
    ///
    /// The cycler runs until [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    ///
    /// Returns [`SimulateError::AlreadyRunning`] if a cycler was already
    /// started on this light.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn the thread.
    pub fn simulate(&self) -> Result<(), SimulateError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("simulate called on an already-running light");
            return Err(SimulateError::AlreadyRunning);
        }

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        debug!("spawning cycler thread");
        let handle = thread::Builder::new()
            .name("crossing-cycler".into())
            .spawn(move || {
                info!("cycler thread started");
                cycler::run(&shared, &config);
                info!("cycler thread exiting");
            })
            .expect("failed to spawn cycler thread");

        *self.lock_handle() = Some(handle);
        Ok(())
    }

    /// Blocks until the light transitions to green.
    ///
    /// Consumes phase events from the internal queue, discarding reds. This
    /// observes only transitions that happen *after* the call starts; the
    /// wait is unbounded if the cycler is not running.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Closed`] if the light is shut down before a
    /// green event arrives.
    pub fn wait_for_green(&self) -> Result<(), RecvError> {
        loop {
            let phase = self.shared.events.recv()?;
            if phase == Phase::Green {
                debug!("green observed");
                return Ok(());
            }
            debug!(phase = ?phase, "discarding non-green event");
        }
    }

    /// Stops the cycler and wakes every blocked waiter.
    ///
    /// Sets the stop flag, closes the event queue (blocked
    /// [`wait_for_green`](Self::wait_for_green) calls return
    /// `Err(Closed)`), and joins the cycler thread. Idempotent, and safe to
    /// call even if `simulate` never ran. The light cannot be restarted
    /// afterwards.
    pub fn shutdown(&self) {
        info!("light shutdown initiated");
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.events.close();

        if let Some(handle) = self.lock_handle().take() {
            debug!("waiting for cycler thread to exit");
            let _ = handle.join();
        }
        info!("light shutdown complete");
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.cycler_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        // Signal the cycler and release waiters, but do not join here.
        // Explicit shutdown() is the graceful path.
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.events.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase_is_red() {
        let light = TrafficLight::new();
        assert_eq!(light.current_phase(), Phase::Red);
    }

    #[test]
    fn test_set_phase_is_visible_immediately() {
        let light = TrafficLight::new();

        light.set_phase(Phase::Green);
        assert_eq!(light.current_phase(), Phase::Green);

        light.set_phase(Phase::Red);
        assert_eq!(light.current_phase(), Phase::Red);
    }

    #[test]
    fn test_toggled_alternates() {
        assert_eq!(Phase::Red.toggled(), Phase::Green);
        assert_eq!(Phase::Green.toggled(), Phase::Red);
        assert_eq!(Phase::Red.toggled().toggled(), Phase::Red);
    }

    #[test]
    fn test_default_config_matches_reference_timing() {
        let config = CycleConfig::default();
        assert_eq!(config.cycle_units, 4..=6);
        assert_eq!(config.unit, Duration::from_secs(1));
        assert_eq!(config.quantum, Duration::from_millis(1));
    }

    #[test]
    fn test_cycle_draw_is_uniform_over_inclusive_range() {
        let config = CycleConfig::default();
        let mut rng = rand::rng();
        let mut counts = [0u32; 3];
        let samples = 6_000;

        for _ in 0..samples {
            let target = cycler::draw_cycle(&mut rng, &config);
            let secs = target.as_secs();
            assert!(
                (4..=6).contains(&secs),
                "draw {secs}s outside inclusive range"
            );
            assert_eq!(target, Duration::from_secs(secs), "non-integral draw");
            counts[(secs - 4) as usize] += 1;
        }

        // Each of {4, 5, 6} should land roughly a third of the time; a
        // sixth is a generous lower bound against systematic bias.
        for (i, &count) in counts.iter().enumerate() {
            assert!(
                count > samples / 6,
                "duration {}s drawn only {count}/{samples} times",
                i + 4
            );
        }
    }

    #[test]
    fn test_second_simulate_is_rejected() {
        let light = TrafficLight::with_config(CycleConfig {
            unit: Duration::from_millis(10),
            ..CycleConfig::default()
        });

        assert_eq!(light.simulate(), Ok(()));
        assert_eq!(light.simulate(), Err(SimulateError::AlreadyRunning));

        light.shutdown();
    }

    #[test]
    fn test_shutdown_without_simulate_is_safe() {
        let light = TrafficLight::new();
        light.shutdown();
        light.shutdown();
    }
}
