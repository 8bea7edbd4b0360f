//! Clickflow core library — domain types, visit store, and analyzers.
//!
//! Visits flow in through a [`store::VisitStore`]; the [`analyze`] module
//! derives the growth leaderboard, per-project insights, and the inputs
//! for the flow-graph engine in `clickflow-graphs`.

pub mod analyze;
pub mod config;
pub mod error;
pub mod store;
pub mod time;
pub mod types;
