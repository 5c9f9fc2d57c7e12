//! Core types and trait definitions for the Odonto dental chart store.
//!
//! A patient's chart is recorded as a series of immutable snapshots. This
//! crate defines those snapshots, the rules for what a chart may contain, the
//! store abstraction, and the editing session that derives the current chart
//! from history. It is deliberately free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod buffer;
pub mod chart;
pub mod condition;
pub mod error;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod tooth;

#[cfg(test)]
mod testing;

pub use error::ValidationError;
