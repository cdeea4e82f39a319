//! Collection campaign, the driver loop of a data-collection run.
use crate::{
    collector::DataCollector,
    dataset::{DatasetHandle, DatasetMetadata, DatasetRegistry},
    Env, Policy, StepDataProcessor,
};
use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Campaign`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CampaignConfig {
    /// Id of the dataset the collected episodes go to.
    pub dataset_id: String,

    /// The total number of environment steps of the run.
    pub total_steps: usize,

    /// Interval of dataset checkpoints in environment steps.
    pub checkpoint_interval: usize,

    /// Metadata recorded when the dataset is created.
    pub metadata: DatasetMetadata,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            dataset_id: "".to_string(),
            total_steps: 1_000_000,
            checkpoint_interval: 200_000,
            metadata: DatasetMetadata::default(),
        }
    }
}

impl CampaignConfig {
    /// Sets the dataset id.
    pub fn dataset_id(mut self, v: impl Into<String>) -> Self {
        self.dataset_id = v.into();
        self
    }

    /// Sets the total number of environment steps.
    pub fn total_steps(mut self, v: usize) -> Self {
        self.total_steps = v;
        self
    }

    /// Sets the checkpoint interval in environment steps.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the metadata recorded at dataset creation.
    pub fn metadata(mut self, v: DatasetMetadata) -> Self {
        self.metadata = v;
        self
    }

    /// Constructs [`CampaignConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`CampaignConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Runs a data-collection campaign.
///
/// One campaign is one fixed-length run over a collector, a policy and a dataset
/// registry. Checkpointing is the sole persistence point: a crash loses at most one
/// checkpoint interval of unflushed data, and a restarted run starts a fresh campaign
/// that merges into the same named dataset.
pub struct Campaign {
    config: CampaignConfig,
}

impl Campaign {
    /// Constructs a campaign.
    pub fn build(config: CampaignConfig) -> Self {
        Self { config }
    }

    /// Runs the campaign to completion.
    ///
    /// Returns the dataset handle if any checkpoint fired, so the caller can upload
    /// or inspect the result. Failures of the environment, the policy or the registry
    /// are not retried; they propagate and end the run.
    pub fn run<E, P, Q, R>(
        &self,
        collector: &mut DataCollector<E, P>,
        policy: &mut Q,
        registry: &mut R,
    ) -> Result<Option<R::Handle>>
    where
        E: Env,
        P: StepDataProcessor<E>,
        Q: Policy<E>,
        R: DatasetRegistry<E::Obs, E::Act>,
    {
        // Pick up a dataset left by an earlier run to add more data.
        let mut dataset = match registry.contains(&self.config.dataset_id)? {
            true => Some(registry.load(&self.config.dataset_id)?),
            false => None,
        };

        let mut obs = collector.reset()?;

        for n_step in 1..=self.config.total_steps {
            let act = policy.sample(&obs);
            let step = collector.step(&act)?;
            obs = step.obs;

            if n_step % self.config.checkpoint_interval == 0 {
                info!("steps recorded: {}", n_step);
                let episodes = collector.drain_episodes();
                if episodes.is_empty() {
                    debug!("nothing to checkpoint at step {}", n_step);
                    continue;
                }
                dataset = match dataset.take() {
                    Some(mut handle) => {
                        handle.extend(episodes)?;
                        Some(handle)
                    }
                    None => Some(registry.create(
                        &self.config.dataset_id,
                        episodes,
                        &self.config.metadata,
                    )?),
                };
            }
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn config_yaml_roundtrip() -> Result<()> {
        let config = CampaignConfig::default()
            .dataset_id("pointmaze-umaze-v0")
            .total_steps(100)
            .checkpoint_interval(10)
            .metadata(DatasetMetadata {
                algorithm_name: "QIteration".to_string(),
                author: Some("someone".to_string()),
                ..Default::default()
            });

        let dir = TempDir::new("campaign")?;
        let path = dir.path().join("campaign.yaml");
        config.save(&path)?;
        assert_eq!(CampaignConfig::load(&path)?, config);
        Ok(())
    }
}
