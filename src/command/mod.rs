//! Commands: one configured run of the pipeline.
//!
//! A [`Command`] wraps a [`CommandHooks`] implementation and drives it
//! through a linear sequence of stages:
//!
//! ```text
//! Created → Initializing → DiscoveringRules → Validating
//!         → ComputingResult | BuildingFailureResult → Completed
//! ```
//!
//! Each run owns a fresh [`Context`]. [`execute_all`] runs several commands
//! concurrently and keeps their results in input order.

mod batch;
mod context;
mod pipeline;

pub use batch::{execute_all, BatchError};
pub use context::Context;
pub use pipeline::{Command, CommandHooks, Executable, Stage};
