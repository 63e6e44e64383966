//! HTTP surface for the scheduling service: request submission, run polling,
//! queue observability, and the demo-catalog seed, plus the background
//! orchestrator that drives solves to a terminal state.

pub mod config;
pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod router;
pub mod routes;
pub mod state;
