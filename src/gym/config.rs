//! Configuration of Gymnasium maze environments.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`GymMazeEnv`](super::GymMazeEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GymMazeEnvConfig {
    /// Environment id passed to `gymnasium.make`.
    pub env_id: String,

    /// Keep the episode running after the goal is reached, resampling a new goal.
    pub continuing_task: bool,

    /// Step cap registered with the environment.
    pub max_episode_steps: usize,
}

impl Default for GymMazeEnvConfig {
    fn default() -> Self {
        Self {
            env_id: "PointMaze_UMaze-v3".to_string(),
            continuing_task: true,
            max_episode_steps: 1_000_000,
        }
    }
}

impl GymMazeEnvConfig {
    /// Sets the environment id.
    pub fn env_id(mut self, v: impl Into<String>) -> Self {
        self.env_id = v.into();
        self
    }

    /// Sets whether the task continues after the goal is reached.
    pub fn continuing_task(mut self, v: bool) -> Self {
        self.continuing_task = v;
        self
    }

    /// Sets the step cap registered with the environment.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Constructs [`GymMazeEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`GymMazeEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
