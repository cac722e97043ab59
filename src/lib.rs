//! `swipesim` - swipe simulator page server and cycle controller
//!
//! Serves a single self-contained HTML page that simulates a touch-driven
//! swipe loop, and exposes the loop's state machine as a Rust type that can
//! be driven by a virtual clock or the tokio timer.

pub mod asset;
pub mod cli;
pub mod cycle;
pub mod delivery;
pub mod error;
pub mod observability;
