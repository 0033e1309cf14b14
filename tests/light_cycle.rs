//! End-to-end tests for the traffic-light actor.
//!
//! These tests verify the complete flow:
//! 1. Construct the light (phase starts red)
//! 2. `simulate()` spawns the cycler thread
//! 3. A second thread blocks in `wait_for_green()`
//! 4. The cycler toggles on its drawn interval and publishes the event
//! 5. The waiter wakes on the first green
//!
//! Timing uses a shrunken unit so a full 4-6 unit cycle lasts tens of
//! milliseconds instead of seconds; the drawn multipliers are unchanged.
//!
//! # Running with tracing
//!
//! ```bash
//! RUST_LOG=crossing=debug cargo test --features tracing -- --nocapture
//! ```

use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;

use crossing::{CycleConfig, Phase, TrafficLight};

static INIT_TRACING: Once = Once::new();

/// Initialize tracing for tests (only once).
fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        crossing::init_tracing();
    });
}

/// One time unit for fast tests. A cycle is 4-6 units, so 60-90ms.
const UNIT: Duration = Duration::from_millis(15);

fn fast_config() -> CycleConfig {
    CycleConfig {
        unit: UNIT,
        ..CycleConfig::default()
    }
}

/// Generous bound: one maximum cycle is 6 units, spec allows ~7.
fn max_wait() -> Duration {
    UNIT * 7 + Duration::from_millis(200)
}

#[test]
#[serial]
fn wait_for_green_returns_after_first_green_transition() {
    init_test_tracing();

    let light = Arc::new(TrafficLight::with_config(fast_config()));
    assert_eq!(light.current_phase(), Phase::Red);
    light.simulate().unwrap();

    let start = Instant::now();
    let waiter = {
        let light = Arc::clone(&light);
        thread::spawn(move || light.wait_for_green())
    };
    waiter.join().unwrap().unwrap();
    let elapsed = start.elapsed();

    // The first toggle is red→green after at least 4 units, and the waiter
    // must return within one generously-bounded cycle.
    assert!(
        elapsed >= UNIT * 4 - Duration::from_millis(5),
        "waiter returned before a full cycle could elapse ({elapsed:?})"
    );
    assert!(
        elapsed < max_wait(),
        "waiter took {elapsed:?}, bound {:?}",
        max_wait()
    );
    assert_eq!(light.current_phase(), Phase::Green);

    light.shutdown();
}

#[test]
#[serial]
fn phase_keeps_alternating_across_cycles() {
    init_test_tracing();

    let light = Arc::new(TrafficLight::with_config(fast_config()));
    light.simulate().unwrap();

    // Two consecutive green waits straddle a full green→red→green cycle.
    light.wait_for_green().unwrap();
    let start = Instant::now();
    light.wait_for_green().unwrap();

    assert!(
        start.elapsed() >= UNIT * 8 - Duration::from_millis(5),
        "second green arrived after {:?}, expected two full cycles",
        start.elapsed()
    );

    light.shutdown();
}

#[test]
#[serial]
fn shutdown_wakes_blocked_waiter() {
    init_test_tracing();

    // Hour-long unit: no transition will ever fire during the test.
    let light = Arc::new(TrafficLight::with_config(CycleConfig {
        unit: Duration::from_secs(3600),
        ..CycleConfig::default()
    }));
    light.simulate().unwrap();

    let waiter = {
        let light = Arc::clone(&light);
        thread::spawn(move || light.wait_for_green())
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!waiter.is_finished(), "waiter must block with no green event");

    light.shutdown();
    assert!(waiter.join().unwrap().is_err());
}

#[test]
#[serial]
fn shutdown_stops_the_cycler_promptly() {
    init_test_tracing();

    let light = TrafficLight::with_config(fast_config());
    light.simulate().unwrap();

    let start = Instant::now();
    light.shutdown();

    // The cycler checks the stop flag every quantum (1ms default).
    assert!(
        start.elapsed() < Duration::from_millis(500),
        "shutdown join took {:?}",
        start.elapsed()
    );
}

#[test]
#[serial]
fn simulate_is_fire_and_forget() {
    init_test_tracing();

    let light = TrafficLight::with_config(fast_config());

    let start = Instant::now();
    light.simulate().unwrap();
    assert!(
        start.elapsed() < Duration::from_millis(50),
        "simulate must return without waiting for the cycler"
    );

    light.shutdown();
}
