use anyhow::Result;
use clap::Parser;
use pointmaze_collect::{
    campaign::{Campaign, CampaignConfig},
    collector::{DataCollector, DataCollectorConfig},
    controller::{GaussianNoise, WaypointController},
    dataset::{DatasetMetadata, DatasetRegistry},
    gym::{GymMazeEnv, GymMazeEnvConfig},
    minari::MinariRegistry,
    pointmaze::PointMazeStepProcessor,
    Env,
};
use std::path::PathBuf;

const SEED: i64 = 123;
const TOTAL_STEPS: usize = 1_000_000;
const CHECKPOINT_INTERVAL: usize = 200_000;
const MAX_BUFFER_STEPS: usize = 100_000;
const NOISE_STD: f32 = 0.5;

/// Collects noisy waypoint-following demonstrations from a Gymnasium maze
/// environment into a Minari dataset.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Environment id to collect data from
    #[arg(long, default_value = "PointMaze_UMaze-v3")]
    env: String,

    /// Algorithm to solve the maze and generate waypoints, can be DFS or QIteration
    #[arg(long, default_value = "QIteration")]
    maze_solver: String,

    /// Name of the Minari dataset
    #[arg(long, default_value = "pointmaze-umaze-v0")]
    dataset_name: String,

    /// Name of the author of the dataset
    #[arg(long)]
    author: Option<String>,

    /// Email of the author of the dataset
    #[arg(long)]
    author_email: Option<String>,

    /// Upload dataset to the Farama server after collecting the data
    #[arg(long, default_value_t = false, requires = "path_to_private_key")]
    upload_dataset: bool,

    /// Path to the private key to upload the dataset to the Farama GCP server
    #[arg(long = "path_to_private_key")]
    path_to_private_key: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let env_config = GymMazeEnvConfig::default()
        .env_id(args.env.clone())
        .continuing_task(true)
        .max_episode_steps(TOTAL_STEPS);
    let env = GymMazeEnv::build(&env_config, SEED)?;
    let maze = env.maze()?;
    let py_env = env.py_env();

    let collector_config = DataCollectorConfig::default()
        .record_infos(true)
        .max_buffer_steps(MAX_BUFFER_STEPS);
    let mut collector = DataCollector::new(env, PointMazeStepProcessor::default(), &collector_config);

    let mut policy = GaussianNoise::build(WaypointController::build(maze)?, NOISE_STD, SEED as u64)?;
    let mut registry = MinariRegistry::new(py_env);

    let campaign_config = CampaignConfig::default()
        .dataset_id(args.dataset_name.clone())
        .total_steps(TOTAL_STEPS)
        .checkpoint_interval(CHECKPOINT_INTERVAL)
        .metadata(DatasetMetadata {
            algorithm_name: args.maze_solver.clone(),
            author: args.author.clone(),
            author_email: args.author_email.clone(),
            code_permalink: None,
        });
    Campaign::build(campaign_config).run(&mut collector, &mut policy, &mut registry)?;

    if let (true, Some(key)) = (args.upload_dataset, args.path_to_private_key.as_deref()) {
        registry.upload(&args.dataset_name, key)?;
    }

    Ok(())
}
