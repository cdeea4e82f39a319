//! Environment step and step-data processing.
use super::Env;
use crate::record::Record;

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with the diagnostic info emitted at the step.
///
/// An environment emits a [`Step`] object at every interaction step.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Diagnostic info of the step.
    pub info: Record,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: Record,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A buffered record of one transition.
///
/// `act` and `reward` are `None` for the record opening an episode, so an episode of
/// `n` transitions holds `n + 1` records. The diagnostic mapping carries whatever the
/// producing [`StepDataProcessor`] put there.
#[derive(Clone, Debug)]
pub struct StepData<O, A> {
    /// Observation after the step, or the initial observation for the record opening
    /// an episode.
    pub obs: O,

    /// Action taken, if any.
    pub act: Option<A>,

    /// Reward received, if any.
    pub reward: Option<f32>,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Diagnostic mapping of the record.
    pub info: Record,
}

impl<O, A> StepData<O, A> {
    #[inline]
    /// `true` if this record closes its episode.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Produces buffered step data from raw transition inputs.
///
/// The [`DataCollector`](crate::collector::DataCollector) invokes this capability on
/// every reset and step. Implementations decorating another processor can rewrite the
/// base record before it is buffered, as
/// [`PointMazeStepProcessor`](crate::pointmaze::PointMazeStepProcessor) does.
pub trait StepDataProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Produces the record opening an episode from the initial observation and its
    /// diagnostic info.
    fn reset(&mut self, obs: &E::Obs, info: &Record) -> StepData<E::Obs, E::Act>;

    /// Produces the record of one environment step.
    fn process(&mut self, step: &Step<E>) -> StepData<E::Obs, E::Act>;
}
