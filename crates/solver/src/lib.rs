//! Solver layer: the MILP backend contract, the embedded `good_lp` backend,
//! and the driver that turns one scheduling request into a terminal run
//! outcome.

pub mod backend;
pub mod diagnose;
pub mod driver;
pub mod good_lp_backend;

pub use backend::{BackendError, MilpBackend, SolverOptions, Termination};
pub use driver::{run_solve, DriverConfig, SolveReport};
pub use good_lp_backend::GoodLpBackend;
