//! Buffering data collector wrapping an environment.
mod step_proc;
pub use step_proc::{DefaultStepProcessor, DefaultStepProcessorConfig};

use crate::{record::Record, Env, Step, StepData, StepDataProcessor};
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    mem,
    path::Path,
};

/// Step records of one episode, in step order.
///
/// The first record opens the episode (no action, no reward); each further record is
/// one transition.
#[derive(Clone, Debug)]
pub struct EpisodeBuffer<O, A> {
    /// Buffered records.
    pub steps: Vec<StepData<O, A>>,
}

impl<O, A> EpisodeBuffer<O, A> {
    /// The number of transitions in the episode.
    pub fn num_transitions(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Configuration of [`DataCollector`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DataCollectorConfig {
    /// Whether the diagnostic mapping is kept in buffered records.
    pub record_infos: bool,

    /// Number of buffered records after which the in-progress episode is force-closed.
    pub max_buffer_steps: usize,
}

impl Default for DataCollectorConfig {
    fn default() -> Self {
        Self {
            record_infos: false,
            max_buffer_steps: usize::MAX,
        }
    }
}

impl DataCollectorConfig {
    /// Sets whether diagnostic info is kept in buffered records.
    pub fn record_infos(mut self, v: bool) -> Self {
        self.record_infos = v;
        self
    }

    /// Sets the forced-flush threshold in buffered records.
    pub fn max_buffer_steps(mut self, v: usize) -> Self {
        self.max_buffer_steps = v;
        self
    }

    /// Constructs [`DataCollectorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`DataCollectorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Wraps an environment and buffers processed step data per episode.
///
/// Every reset and step goes through the [`StepDataProcessor`], so the buffered
/// records carry whatever the processor produced, including overridden flags.
/// Episode boundaries are driven by the processed record, not by the environment:
/// a record flagged done closes the buffered episode and the next episode is opened
/// from the post-step observation without resetting the environment, which is the
/// behavior continuing-task environments need.
pub struct DataCollector<E, P>
where
    E: Env,
    P: StepDataProcessor<E>,
{
    env: E,
    processor: P,
    record_infos: bool,
    max_buffer_steps: usize,
    episodes: Vec<EpisodeBuffer<E::Obs, E::Act>>,
    current: Vec<StepData<E::Obs, E::Act>>,
    steps_since_flush: usize,
}

impl<E, P> DataCollector<E, P>
where
    E: Env,
    P: StepDataProcessor<E>,
{
    /// Wraps `env` with the given processor.
    pub fn new(env: E, processor: P, config: &DataCollectorConfig) -> Self {
        Self {
            env,
            processor,
            record_infos: config.record_infos,
            max_buffer_steps: config.max_buffer_steps,
            episodes: Vec::new(),
            current: Vec::new(),
            steps_since_flush: 0,
        }
    }

    /// The wrapped environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The number of buffered transitions not yet drained, including the in-progress
    /// episode.
    pub fn num_buffered_transitions(&self) -> usize {
        self.episodes.iter().map(|e| e.num_transitions()).sum::<usize>()
            + self.current.len().saturating_sub(1)
    }

    /// Resets the environment and opens a fresh episode.
    ///
    /// An in-progress episode with at least one transition is closed into the buffer
    /// first, truncation marked on its last record.
    pub fn reset(&mut self) -> Result<E::Obs> {
        if self.current.len() > 1 {
            self.cut_current();
        }
        let (obs, info) = self.env.reset()?;
        let mut data = self.processor.reset(&obs, &info);
        if !self.record_infos {
            data.info = Record::empty();
        }
        self.current = vec![data];
        Ok(obs)
    }

    /// Steps the environment with `act`, buffers the processed record and returns the
    /// raw step.
    pub fn step(&mut self, act: &E::Act) -> Result<Step<E>> {
        assert!(
            !self.current.is_empty(),
            "DataCollector::step() called before reset()"
        );

        let step = self.env.step(act)?;
        let mut data = self.processor.process(&step);
        if !self.record_infos {
            data.info = Record::empty();
        }
        let done = data.is_done();
        self.current.push(data);
        self.steps_since_flush += 1;

        if done {
            let steps = mem::take(&mut self.current);
            self.episodes.push(EpisodeBuffer { steps });
            self.open_episode(&step.obs);
        } else if self.steps_since_flush >= self.max_buffer_steps {
            debug!(
                "force-closing the in-progress episode after {} buffered records",
                self.steps_since_flush
            );
            self.cut_current();
            self.open_episode(&step.obs);
            self.steps_since_flush = 0;
        }

        Ok(step)
    }

    /// Closes the in-progress episode and returns every buffered episode.
    ///
    /// An in-progress episode with transitions is cut the same way the forced flush
    /// cuts it: truncation is marked on its last buffered record and the next episode
    /// reopens from the same observation.
    pub fn drain_episodes(&mut self) -> Vec<EpisodeBuffer<E::Obs, E::Act>> {
        if self.current.len() > 1 {
            let obs = self.current.last().unwrap().obs.clone();
            self.cut_current();
            self.open_episode(&obs);
        }
        self.steps_since_flush = 0;
        mem::take(&mut self.episodes)
    }

    // Moves the in-progress records into the episode buffer, marking truncation on
    // the buffered copy only. The environment is not touched.
    fn cut_current(&mut self) {
        if let Some(last) = self.current.last_mut() {
            last.is_truncated = true;
        }
        let steps = mem::take(&mut self.current);
        self.episodes.push(EpisodeBuffer { steps });
    }

    fn open_episode(&mut self, obs: &E::Obs) {
        let mut data = self.processor.reset(obs, &Record::empty());
        if !self.record_infos {
            data.info = Record::empty();
        }
        self.current = vec![data];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointmaze::{PointMazeAct, PointMazeObs, PointMazeStepProcessor};
    use crate::record::RecordValue;
    use ndarray::array;

    /// Walks through positions 1, 2, 3, ... and reports success on every
    /// `success_every`-th step (never, if zero).
    struct ScriptedEnv {
        t: usize,
        success_every: usize,
    }

    impl ScriptedEnv {
        fn obs(&self) -> PointMazeObs {
            PointMazeObs {
                observation: array![self.t as f32, 0.0, 0.5, -0.5],
                achieved_goal: array![self.t as f32, 0.0],
                desired_goal: array![5.0, 5.0],
            }
        }

        fn info(&self, success: bool) -> Record {
            let mut info = Record::empty();
            info.insert("success", RecordValue::Bool(success));
            info
        }
    }

    impl Env for ScriptedEnv {
        type Config = usize;
        type Obs = PointMazeObs;
        type Act = PointMazeAct;

        fn build(config: &usize, _seed: i64) -> Result<Self> {
            Ok(Self {
                t: 0,
                success_every: *config,
            })
        }

        fn reset(&mut self) -> Result<(PointMazeObs, Record)> {
            self.t = 0;
            Ok((self.obs(), self.info(false)))
        }

        fn step(&mut self, act: &PointMazeAct) -> Result<Step<Self>> {
            self.t += 1;
            let success = self.success_every > 0 && self.t % self.success_every == 0;
            Ok(Step::new(
                self.obs(),
                act.clone(),
                -1.0,
                false,
                false,
                self.info(success),
            ))
        }
    }

    fn act() -> PointMazeAct {
        PointMazeAct {
            action: array![0.0, 0.0],
        }
    }

    fn collector(
        success_every: usize,
        config: DataCollectorConfig,
    ) -> DataCollector<ScriptedEnv, PointMazeStepProcessor> {
        let env = ScriptedEnv::build(&success_every, 0).unwrap();
        DataCollector::new(env, PointMazeStepProcessor::default(), &config)
    }

    #[test]
    fn success_closes_episodes() {
        let mut c = collector(3, DataCollectorConfig::default().record_infos(true));
        c.reset().unwrap();
        for _ in 0..7 {
            c.step(&act()).unwrap();
        }
        let episodes = c.drain_episodes();
        // Steps 3 and 6 force truncation; the drain cuts the remaining step.
        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].num_transitions(), 3);
        assert_eq!(episodes[1].num_transitions(), 3);
        assert_eq!(episodes[2].num_transitions(), 1);
        assert!(episodes[0].steps.last().unwrap().is_truncated);
    }

    #[test]
    fn next_episode_opens_from_last_observation() {
        let mut c = collector(2, DataCollectorConfig::default().record_infos(true));
        c.reset().unwrap();
        for _ in 0..3 {
            c.step(&act()).unwrap();
        }
        let episodes = c.drain_episodes();
        let closing = episodes[0].steps.last().unwrap();
        let opening = &episodes[1].steps[0];
        assert_eq!(closing.obs.observation, opening.obs.observation);
        assert!(opening.act.is_none());
        assert!(opening.reward.is_none());
    }

    #[test]
    fn forced_flush_cuts_long_episodes() {
        let config = DataCollectorConfig::default()
            .record_infos(true)
            .max_buffer_steps(5);
        let mut c = collector(0, config);
        c.reset().unwrap();
        for _ in 0..12 {
            c.step(&act()).unwrap();
        }
        let episodes = c.drain_episodes();
        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].num_transitions(), 5);
        assert_eq!(episodes[1].num_transitions(), 5);
        assert_eq!(episodes[2].num_transitions(), 2);
        assert!(episodes[0].steps.last().unwrap().is_truncated);
    }

    #[test]
    fn strips_infos_when_not_recorded() {
        let mut c = collector(3, DataCollectorConfig::default());
        c.reset().unwrap();
        for _ in 0..3 {
            c.step(&act()).unwrap();
        }
        let episodes = c.drain_episodes();
        let steps = &episodes[0].steps;
        assert!(steps.iter().all(|s| s.info.is_empty()));
        // Truncation forced by the processor survives the strip.
        assert!(steps.last().unwrap().is_truncated);
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut c = collector(2, DataCollectorConfig::default().record_infos(true));
        c.reset().unwrap();
        for _ in 0..4 {
            c.step(&act()).unwrap();
        }
        assert_eq!(c.num_buffered_transitions(), 4);
        assert!(!c.drain_episodes().is_empty());
        assert_eq!(c.num_buffered_transitions(), 0);
        assert!(c.drain_episodes().is_empty());
    }
}
