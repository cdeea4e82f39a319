#![warn(missing_docs)]
//! A library for collecting scripted demonstration trajectories from Gymnasium maze
//! environments into [Minari](https://minari.farama.org) datasets.
//!
//! The crate drives a simulated point-mass agent with a waypoint-following controller,
//! perturbs its actions with Gaussian noise and buffers every transition, periodically
//! checkpointing the buffered episodes into a named dataset. It consists of the modules
//! below:
//!
//! * Environments implement [`Env`]. The shipped implementation,
//!   [`GymMazeEnv`](gym::GymMazeEnv), wraps a maze environment running in the Python
//!   interpreter.
//! * [`DataCollector`](collector::DataCollector) wraps an environment, runs every
//!   transition through a [`StepDataProcessor`] and buffers episode data. The
//!   Point Maze processor ([`PointMazeStepProcessor`](pointmaze::PointMazeStepProcessor))
//!   augments each record with positional fields and ends episodes on goal success.
//! * [`DatasetRegistry`](dataset::DatasetRegistry) abstracts dataset storage;
//!   [`MinariRegistry`](minari::MinariRegistry) binds the Minari dataset manager.
//! * [`Campaign`](campaign::Campaign) is the driver loop: sample an action, step the
//!   collector, checkpoint at a fixed cadence.
pub mod campaign;
pub mod collector;
pub mod controller;
pub mod dataset;
pub mod error;
pub mod gym;
pub mod minari;
pub mod pointmaze;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Obs, Policy, Step, StepData, StepDataProcessor};
