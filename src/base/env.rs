//! Environment.
use super::{Act, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    ///
    /// The seed takes effect at the first call of [`Env::reset`].
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment, returning the initial observation and the diagnostic
    /// info emitted with it.
    fn reset(&mut self) -> Result<(Self::Obs, Record)>;

    /// Performs an environment step.
    fn step(&mut self, act: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;
}
