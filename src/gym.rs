//! Wrapper of Gymnasium maze environments implemented in Python.
mod config;
pub use config::GymMazeEnvConfig;

use crate::{
    pointmaze::{PointMazeAct, PointMazeObs},
    record::{Record, RecordValue},
    Env, Step,
};
use anyhow::Result;
use log::{info, trace};
use pyo3::{
    types::{IntoPyDict, PyTuple},
    PyAny, PyObject, Python, ToPyObject,
};

/// A maze environment in [Gymnasium](https://gymnasium.farama.org), driven through
/// the Python interpreter.
///
/// Observations and actions cross the boundary as numpy arrays; the per-step info
/// dict is reduced to the goal-achievement flag (see [`Record`]).
pub struct GymMazeEnv {
    env: PyObject,

    /// Initial seed.
    ///
    /// This value will be used at the first call of the reset method.
    initial_seed: Option<i64>,
}

impl GymMazeEnv {
    /// The maze layout object of the wrapped environment.
    ///
    /// Waypoint controllers are constructed from this object.
    pub fn maze(&self) -> Result<PyObject> {
        Python::with_gil(|py| Ok(self.env.getattr(py, "maze")?))
    }

    /// A handle to the underlying Python environment.
    pub fn py_env(&self) -> PyObject {
        Python::with_gil(|py| self.env.clone_ref(py))
    }
}

fn info_to_record(info: &PyAny) -> Record {
    let mut record = Record::empty();
    // The maze environments report goal achievement per step; the remaining info
    // entries are simulator internals and are not recorded.
    if let Ok(value) = info.get_item("success") {
        if let Ok(success) = value.extract::<bool>() {
            record.insert("success", RecordValue::Bool(success));
        }
    }
    record
}

impl Env for GymMazeEnv {
    type Config = GymMazeEnvConfig;
    type Obs = PointMazeObs;
    type Act = PointMazeAct;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Python::with_gil(|py| {
            let gym = py.import("gymnasium")?;
            let kwargs = vec![
                ("continuing_task", config.continuing_task.to_object(py)),
                (
                    "max_episode_steps",
                    (config.max_episode_steps as i64).to_object(py),
                ),
            ]
            .into_py_dict(py);
            let env = gym
                .getattr("make")?
                .call((config.env_id.as_str(),), Some(kwargs))?;
            info!("Built Gymnasium environment {}", config.env_id);

            Ok(Self {
                env: env.to_object(py),
                initial_seed: Some(seed),
            })
        })
    }

    fn reset(&mut self) -> Result<(PointMazeObs, Record)> {
        trace!("GymMazeEnv::reset()");

        Python::with_gil(|py| {
            let ret_values = if let Some(seed) = self.initial_seed.take() {
                let kwargs = vec![("seed", seed)].into_py_dict(py);
                self.env.call_method(py, "reset", (), Some(kwargs))?
            } else {
                self.env.call_method0(py, "reset")?
            };
            let ret_values: &PyTuple = ret_values.extract(py)?;
            let obs = PointMazeObs::from_py(ret_values.get_item(0))?;
            let info = info_to_record(ret_values.get_item(1));
            Ok((obs, info))
        })
    }

    fn step(&mut self, act: &PointMazeAct) -> Result<Step<Self>> {
        trace!("GymMazeEnv::step()");

        Python::with_gil(|py| {
            let act_py = act.to_py(py);
            let ret = self.env.call_method(py, "step", (act_py,), None)?;
            let step: &PyTuple = ret.extract(py)?;
            let obs = PointMazeObs::from_py(step.get_item(0))?;
            let reward: f32 = step.get_item(1).extract()?;
            let is_terminated: bool = step.get_item(2).extract()?;
            let is_truncated: bool = step.get_item(3).extract()?;
            let info = info_to_record(step.get_item(4));
            Ok(Step::new(
                obs,
                act.clone(),
                reward,
                is_terminated,
                is_truncated,
                info,
            ))
        })
    }
}

impl Drop for GymMazeEnv {
    fn drop(&mut self) {
        // See https://gymnasium.farama.org/api/env/#gymnasium.Env.close
        Python::with_gil(|py| {
            let _ = self.env.call_method0(py, "close");
        })
    }
}
