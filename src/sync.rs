//! Synchronization primitives for in-process communication.
//!
//! This module provides the thread-safe hand-off queue used to carry
//! phase-change events from the cycler thread to waiting observers.

pub mod handoff;
