//! Core abstractions for environments, policies and step data.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
pub use step::{Step, StepData, StepDataProcessor};
use std::fmt::Debug;

/// An observation of an environment.
pub trait Obs: Clone + Debug {}

/// An action on an environment.
pub trait Act: Clone + Debug {}
