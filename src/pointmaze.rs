//! Observation and action types of the Point Maze environments and the step
//! post-processor applied during data collection.
use crate::{
    collector::DefaultStepProcessor,
    record::{Record, RecordValue},
    util::ndarray::{array1_to_pyobj, pyany_to_array1},
    Act, Env, Obs, Step, StepData, StepDataProcessor,
};
use anyhow::Result;
use ndarray::{s, Array1};
use pyo3::{types::IntoPyDict, PyAny, PyObject, Python, ToPyObject};

/// Observation of the Point Maze environments.
///
/// `observation` holds the planar position in its first two components and the
/// velocity in the remaining ones. See the
/// [environment documentation](https://robotics.farama.org/envs/maze/point_maze/).
#[derive(Clone, Debug)]
pub struct PointMazeObs {
    /// Position and velocity of the point mass.
    pub observation: Array1<f32>,

    /// Position reached by the agent.
    pub achieved_goal: Array1<f32>,

    /// Target position.
    pub desired_goal: Array1<f32>,
}

impl Obs for PointMazeObs {}

impl PointMazeObs {
    /// Extracts an observation from the Python dict emitted by the environment.
    pub fn from_py(obj: &PyAny) -> Result<Self> {
        Ok(Self {
            observation: pyany_to_array1::<f64, f32>(obj.get_item("observation")?)?,
            achieved_goal: pyany_to_array1::<f64, f32>(obj.get_item("achieved_goal")?)?,
            desired_goal: pyany_to_array1::<f64, f32>(obj.get_item("desired_goal")?)?,
        })
    }

    /// Converts the observation into the Python dict the controller expects.
    pub fn to_py(&self, py: Python) -> PyObject {
        vec![
            ("observation", array1_to_pyobj(py, &self.observation)),
            ("achieved_goal", array1_to_pyobj(py, &self.achieved_goal)),
            ("desired_goal", array1_to_pyobj(py, &self.desired_goal)),
        ]
        .into_py_dict(py)
        .to_object(py)
    }
}

/// Action of the Point Maze environments, a planar force vector.
#[derive(Clone, Debug)]
pub struct PointMazeAct {
    /// Force applied along each axis.
    pub action: Array1<f32>,
}

impl Act for PointMazeAct {}

impl PointMazeAct {
    /// Extracts an action from a Python array.
    pub fn from_py(obj: &PyAny) -> Result<Self> {
        Ok(Self {
            action: pyany_to_array1::<f64, f32>(obj)?,
        })
    }

    /// Converts the action into a numpy array.
    pub fn to_py(&self, py: Python) -> PyObject {
        array1_to_pyobj(py, &self.action)
    }
}

/// Step post-processor for Point Maze data collection.
///
/// Wraps a base [`StepDataProcessor`] and rewrites the record it produces:
///
/// 1. a step marked successful in the diagnostic info forces the record's truncation
///    flag, so the buffered episode ends when the goal is reached regardless of what
///    the environment reported;
/// 2. the diagnostic mapping gains `qpos` (position), `qvel` (velocity) and `goal`
///    (target position), extracted from the observation.
///
/// The observation vector must hold the two position components first; everything
/// after them is taken as velocity.
pub struct PointMazeStepProcessor<P = DefaultStepProcessor> {
    inner: P,
}

impl<P> PointMazeStepProcessor<P> {
    /// Wraps `inner`.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl Default for PointMazeStepProcessor<DefaultStepProcessor> {
    fn default() -> Self {
        Self {
            inner: DefaultStepProcessor,
        }
    }
}

impl<E, P> StepDataProcessor<E> for PointMazeStepProcessor<P>
where
    E: Env<Obs = PointMazeObs>,
    P: StepDataProcessor<E>,
{
    type Config = P::Config;

    fn build(config: &Self::Config) -> Self {
        Self {
            inner: P::build(config),
        }
    }

    fn reset(&mut self, obs: &PointMazeObs, info: &Record) -> StepData<PointMazeObs, E::Act> {
        let mut data = self.inner.reset(obs, info);
        rewrite(&mut data);
        data
    }

    fn process(&mut self, step: &Step<E>) -> StepData<PointMazeObs, E::Act> {
        let mut data = self.inner.process(step);
        rewrite(&mut data);
        data
    }
}

fn rewrite<A>(data: &mut StepData<PointMazeObs, A>) {
    if data.info.get_bool("success").unwrap_or(false) {
        data.is_truncated = true;
    }

    let qpos = data.obs.observation.slice(s![..2]).to_vec();
    let qvel = data.obs.observation.slice(s![2..]).to_vec();
    let goal = data.obs.desired_goal.to_vec();
    data.info.insert("qpos", RecordValue::Array1(qpos));
    data.info.insert("qvel", RecordValue::Array1(qvel));
    data.info.insert("goal", RecordValue::Array1(goal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();
        type Obs = PointMazeObs;
        type Act = PointMazeAct;

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn reset(&mut self) -> Result<(PointMazeObs, Record)> {
            unreachable!()
        }

        fn step(&mut self, _act: &PointMazeAct) -> Result<Step<Self>> {
            unreachable!()
        }
    }

    fn obs() -> PointMazeObs {
        PointMazeObs {
            observation: array![1.0, 2.0, 0.1, 0.2],
            achieved_goal: array![1.0, 2.0],
            desired_goal: array![5.0, 5.0],
        }
    }

    fn step(success: bool, truncated: bool) -> Step<TestEnv> {
        let mut info = Record::empty();
        info.insert("success", RecordValue::Bool(success));
        Step::new(
            obs(),
            PointMazeAct {
                action: array![0.5, -0.5],
            },
            -1.0,
            false,
            truncated,
            info,
        )
    }

    fn processor() -> PointMazeStepProcessor {
        PointMazeStepProcessor::default()
    }

    #[test]
    fn keeps_truncation_without_success() {
        let data = processor().process(&step(false, false));
        assert!(!data.is_truncated);
        assert!(!data.is_terminated);
    }

    #[test]
    fn forces_truncation_on_success() {
        let data = processor().process(&step(true, false));
        assert!(data.is_truncated);
    }

    #[test]
    fn success_keeps_truncation_set() {
        let data = processor().process(&step(true, true));
        assert!(data.is_truncated);
    }

    #[test]
    fn splits_position_and_velocity() {
        let data = processor().process(&step(false, false));
        assert_eq!(data.info.get_array1("qpos").unwrap(), vec![1.0, 2.0]);
        assert_eq!(data.info.get_array1("qvel").unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn copies_goal_unchanged() {
        let data = processor().process(&step(false, false));
        assert_eq!(data.info.get_array1("goal").unwrap(), vec![5.0, 5.0]);
    }

    #[test]
    fn processing_is_idempotent() {
        let mut p = processor();
        let first = p.process(&step(true, false));
        let second = p.process(&step(true, false));
        assert_eq!(first.info, second.info);
        assert_eq!(first.is_truncated, second.is_truncated);
        assert_eq!(first.reward, second.reward);
    }

    #[test]
    fn augments_the_episode_opening_record() {
        let mut info = Record::empty();
        info.insert("success", RecordValue::Bool(false));
        let mut p = processor();
        let data = StepDataProcessor::<TestEnv>::reset(&mut p, &obs(), &info);
        assert!(data.act.is_none());
        assert!(data.reward.is_none());
        assert_eq!(data.info.get_array1("qpos").unwrap(), vec![1.0, 2.0]);
        assert_eq!(data.info.get_array1("qvel").unwrap(), vec![0.1, 0.2]);
    }
}
