//! Minari-backed dataset registry.
//!
//! Binds the [Minari](https://minari.farama.org) dataset manager for the Point Maze
//! observation and action types. Buffered episodes are shipped across the boundary
//! as numpy buffers; dataset lookup, persistence and upload stay on the Python side.
use crate::{
    collector::EpisodeBuffer,
    dataset::{DatasetHandle, DatasetMetadata, DatasetRegistry},
    pointmaze::{PointMazeAct, PointMazeObs},
    util::ndarray::rows_to_pyobj,
    StepData,
};
use anyhow::Result;
use log::info;
use pyo3::{
    types::{IntoPyDict, PyDict},
    PyObject, Python, ToPyObject,
};
use std::path::Path;

/// Dataset registry backed by the local Minari storage.
pub struct MinariRegistry {
    /// The Python environment the data was collected from; recorded into datasets
    /// at creation.
    env: PyObject,
}

impl MinariRegistry {
    /// Constructs a registry recording `env` as the source environment of created
    /// datasets.
    pub fn new(env: PyObject) -> Self {
        Self { env }
    }
}

/// A loaded or freshly created Minari dataset.
pub struct MinariDatasetHandle {
    dataset: PyObject,
}

fn episode_to_py(py: Python, episode: &EpisodeBuffer<PointMazeObs, PointMazeAct>) -> Result<PyObject> {
    let steps = &episode.steps;

    let observation: Vec<Vec<f32>> = steps.iter().map(|s| s.obs.observation.to_vec()).collect();
    let achieved_goal: Vec<Vec<f32>> = steps.iter().map(|s| s.obs.achieved_goal.to_vec()).collect();
    let desired_goal: Vec<Vec<f32>> = steps.iter().map(|s| s.obs.desired_goal.to_vec()).collect();
    let observations = vec![
        ("observation", rows_to_pyobj(py, &observation)),
        ("achieved_goal", rows_to_pyobj(py, &achieved_goal)),
        ("desired_goal", rows_to_pyobj(py, &desired_goal)),
    ]
    .into_py_dict(py);

    let actions: Vec<Vec<f32>> = steps
        .iter()
        .filter_map(|s| s.act.as_ref())
        .map(|a| a.action.to_vec())
        .collect();
    let rewards: Vec<f64> = steps.iter().filter_map(|s| s.reward).map(f64::from).collect();
    let terminations: Vec<bool> = steps.iter().skip(1).map(|s| s.is_terminated).collect();
    let truncations: Vec<bool> = steps.iter().skip(1).map(|s| s.is_truncated).collect();

    let data = PyDict::new(py);
    data.set_item("observations", observations)?;
    data.set_item("actions", rows_to_pyobj(py, &actions))?;
    data.set_item("rewards", rewards)?;
    data.set_item("terminations", terminations)?;
    data.set_item("truncations", truncations)?;
    if let Some(infos) = infos_to_py(py, steps)? {
        data.set_item("infos", infos)?;
    }
    Ok(data.to_object(py))
}

// The diagnostic arrays are aligned with the observations, one entry per record.
fn infos_to_py(py: Python, steps: &[StepData<PointMazeObs, PointMazeAct>]) -> Result<Option<PyObject>> {
    if steps.iter().any(|s| s.info.is_empty()) {
        return Ok(None);
    }

    let success: Vec<bool> = steps
        .iter()
        .map(|s| s.info.get_bool("success").unwrap_or(false))
        .collect();
    let qpos: Vec<Vec<f32>> = steps
        .iter()
        .map(|s| s.info.get_array1("qpos"))
        .collect::<Result<_, _>>()?;
    let qvel: Vec<Vec<f32>> = steps
        .iter()
        .map(|s| s.info.get_array1("qvel"))
        .collect::<Result<_, _>>()?;
    let goal: Vec<Vec<f32>> = steps
        .iter()
        .map(|s| s.info.get_array1("goal"))
        .collect::<Result<_, _>>()?;

    let infos = vec![
        ("success", success.to_object(py)),
        ("qpos", rows_to_pyobj(py, &qpos)),
        ("qvel", rows_to_pyobj(py, &qvel)),
        ("goal", rows_to_pyobj(py, &goal)),
    ]
    .into_py_dict(py);
    Ok(Some(infos.to_object(py)))
}

impl DatasetHandle<PointMazeObs, PointMazeAct> for MinariDatasetHandle {
    fn extend(&mut self, episodes: Vec<EpisodeBuffer<PointMazeObs, PointMazeAct>>) -> Result<()> {
        Python::with_gil(|py| {
            let buffer: Vec<PyObject> = episodes
                .iter()
                .map(|episode| episode_to_py(py, episode))
                .collect::<Result<_>>()?;
            self.dataset
                .call_method1(py, "update_dataset_from_buffer", (buffer,))?;
            Ok(())
        })
    }
}

impl DatasetRegistry<PointMazeObs, PointMazeAct> for MinariRegistry {
    type Handle = MinariDatasetHandle;

    fn contains(&self, dataset_id: &str) -> Result<bool> {
        Python::with_gil(|py| {
            let minari = py.import("minari")?;
            let kwargs = vec![("verbose", false)].into_py_dict(py);
            let datasets = minari
                .getattr("list_local_datasets")?
                .call((), Some(kwargs))?;
            Ok(datasets
                .call_method1("__contains__", (dataset_id,))?
                .extract()?)
        })
    }

    fn load(&mut self, dataset_id: &str) -> Result<Self::Handle> {
        Python::with_gil(|py| {
            let minari = py.import("minari")?;
            let dataset = minari
                .getattr("load_dataset")?
                .call1((dataset_id,))?
                .to_object(py);
            info!("Loaded local dataset {}", dataset_id);
            Ok(MinariDatasetHandle { dataset })
        })
    }

    fn create(
        &mut self,
        dataset_id: &str,
        episodes: Vec<EpisodeBuffer<PointMazeObs, PointMazeAct>>,
        metadata: &DatasetMetadata,
    ) -> Result<Self::Handle> {
        Python::with_gil(|py| {
            let minari = py.import("minari")?;
            let buffer: Vec<PyObject> = episodes
                .iter()
                .map(|episode| episode_to_py(py, episode))
                .collect::<Result<_>>()?;
            let kwargs = vec![
                ("algorithm_name", metadata.algorithm_name.to_object(py)),
                ("author", metadata.author.to_object(py)),
                ("author_email", metadata.author_email.to_object(py)),
                ("code_permalink", metadata.code_permalink.to_object(py)),
            ]
            .into_py_dict(py);
            let dataset = minari.getattr("create_dataset_from_buffers")?.call(
                (dataset_id, self.env.clone_ref(py), buffer),
                Some(kwargs),
            )?;
            info!("Created dataset {}", dataset_id);
            Ok(MinariDatasetHandle {
                dataset: dataset.to_object(py),
            })
        })
    }

    fn upload(&self, dataset_id: &str, path_to_private_key: &Path) -> Result<()> {
        Python::with_gil(|py| {
            let minari = py.import("minari")?;
            let key = path_to_private_key.to_string_lossy().into_owned();
            let kwargs = vec![
                ("dataset_name", dataset_id.to_object(py)),
                ("path_to_private_key", key.to_object(py)),
            ]
            .into_py_dict(py);
            minari.getattr("upload_dataset")?.call((), Some(kwargs))?;
            info!("Uploaded dataset {}", dataset_id);
            Ok(())
        })
    }
}
