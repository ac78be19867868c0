pub mod activator;
pub mod cli;
pub mod dataverse;
pub mod error;
pub mod parameters;
pub mod solution;

pub use activator::{Activator, ExitStatus, RunSummary};
pub use parameters::{ConnectionParameters, SolutionTarget, StepState};
