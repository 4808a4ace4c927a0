// Wizard Controller: sequences data collection, gates forward progress on
// step-local validation, and owns the in-memory Document and Style Models.

pub mod controller;
pub mod steps;

pub use controller::{AdvanceOutcome, WizardController, WizardState};
pub use steps::{step_order, WizardStep};
