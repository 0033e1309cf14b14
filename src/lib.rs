//! A single traffic-light actor with a blocking hand-off queue.
//!
//! The light toggles between [`Phase::Red`] and [`Phase::Green`] on a
//! randomized interval (4-6 seconds by default) from its own background
//! thread, publishing every transition through a thread-safe
//! [`HandoffQueue`]. Observer threads call [`TrafficLight::wait_for_green`]
//! to block until the next green transition.
//!
//! # Components
//!
//! - [`sync::handoff`] - the mutex + condvar hand-off queue (blocking
//!   receive, notify-on-send, most-recent-first delivery).
//! - [`light`] - the [`TrafficLight`] actor, its [`CycleConfig`] timing
//!   knobs, and the cycler thread behind [`TrafficLight::simulate`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use crossing::{CycleConfig, Phase, TrafficLight};
//!
//! // Default timing cycles every 4-6 seconds; shrink the unit for the
//! // example so a full cycle takes tens of milliseconds.
//! let light = Arc::new(TrafficLight::with_config(CycleConfig {
//!     unit: Duration::from_millis(10),
//!     ..CycleConfig::default()
//! }));
//! light.simulate().unwrap();
//!
//! let waiter = {
//!     let light = Arc::clone(&light);
//!     std::thread::spawn(move || light.wait_for_green())
//! };
//! waiter.join().unwrap().unwrap();
//! assert_eq!(light.current_phase(), Phase::Green);
//!
//! light.shutdown();
//! ```

pub mod light;
pub mod sync;
mod trace;

#[doc(inline)]
pub use light::{CycleConfig, Phase, SimulateError, TrafficLight};

#[doc(inline)]
pub use sync::handoff::HandoffQueue;

pub use trace::init_tracing;
