//! Request pipeline: state machine, revision loop and orchestrator

pub mod orchestrator;
pub mod revision;
pub mod state;

pub use orchestrator::{Orchestrator, PipelineOptions};
pub use revision::{LoopOutcome, RevisionLoop};
pub use state::{PipelineState, StateTracker};
