//! Dataset persistence capabilities.
use crate::{collector::EpisodeBuffer, Act, Obs};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata recorded when a dataset is created.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DatasetMetadata {
    /// Name of the algorithm that generated the actions.
    pub algorithm_name: String,

    /// Name of the author of the dataset.
    pub author: Option<String>,

    /// Email of the author of the dataset.
    pub author_email: Option<String>,

    /// Permalink to the code that generated the dataset.
    pub code_permalink: Option<String>,
}

/// A handle to a named dataset, exclusively owned by the collection run.
pub trait DatasetHandle<O: Obs, A: Act> {
    /// Appends episodes to the dataset.
    fn extend(&mut self, episodes: Vec<EpisodeBuffer<O, A>>) -> Result<()>;
}

/// Lookup and lifecycle of named datasets in local storage.
///
/// The driver loop receives this capability instead of consulting ambient global
/// state, so tests can substitute an in-memory registry.
pub trait DatasetRegistry<O: Obs, A: Act> {
    /// Handle type for datasets of this registry.
    type Handle: DatasetHandle<O, A>;

    /// Whether a dataset of the given id exists in local storage.
    fn contains(&self, dataset_id: &str) -> Result<bool>;

    /// Loads an existing dataset.
    fn load(&mut self, dataset_id: &str) -> Result<Self::Handle>;

    /// Creates a dataset from the given episodes, recording the metadata.
    fn create(
        &mut self,
        dataset_id: &str,
        episodes: Vec<EpisodeBuffer<O, A>>,
        metadata: &DatasetMetadata,
    ) -> Result<Self::Handle>;

    /// Uploads a dataset to the remote storage endpoint.
    fn upload(&self, dataset_id: &str, path_to_private_key: &Path) -> Result<()>;
}
