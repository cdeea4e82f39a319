//! Base transformation from raw transitions into buffered step data.
use crate::{record::Record, Env, Step, StepData, StepDataProcessor};

/// Configuration of [`DefaultStepProcessor`].
#[derive(Clone, Debug)]
pub struct DefaultStepProcessorConfig {}

impl Default for DefaultStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Copies raw transition data into a [`StepData`] record verbatim.
///
/// This is the base record construction; decorating processors like
/// [`PointMazeStepProcessor`](crate::pointmaze::PointMazeStepProcessor) rewrite the
/// record it produces.
pub struct DefaultStepProcessor;

impl<E: Env> StepDataProcessor<E> for DefaultStepProcessor {
    type Config = DefaultStepProcessorConfig;

    fn build(_config: &Self::Config) -> Self {
        Self
    }

    fn reset(&mut self, obs: &E::Obs, info: &Record) -> StepData<E::Obs, E::Act> {
        StepData {
            obs: obs.clone(),
            act: None,
            reward: None,
            is_terminated: false,
            is_truncated: false,
            info: info.clone(),
        }
    }

    fn process(&mut self, step: &Step<E>) -> StepData<E::Obs, E::Act> {
        StepData {
            obs: step.obs.clone(),
            act: Some(step.act.clone()),
            reward: Some(step.reward),
            is_terminated: step.is_terminated,
            is_truncated: step.is_truncated,
            info: step.info.clone(),
        }
    }
}
