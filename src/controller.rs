//! Scripted waypoint policy and exploration noise.
use crate::{
    pointmaze::{PointMazeAct, PointMazeObs},
    Env, Policy,
};
use anyhow::Result;
use pyo3::{PyObject, Python, ToPyObject};
use rand::{rngs::SmallRng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Waypoint-following controller for maze environments.
///
/// Binds the `controller` module shipped with the dataset-generation scripts. The
/// maze is solved on the Python side; this policy only relays observations and
/// actions across the boundary.
pub struct WaypointController {
    controller: PyObject,
}

impl WaypointController {
    /// Builds a controller for the given maze layout
    /// (see [`GymMazeEnv::maze`](crate::gym::GymMazeEnv::maze)).
    pub fn build(maze: PyObject) -> Result<Self> {
        Python::with_gil(|py| {
            let module = py.import("controller")?;
            let controller = module.getattr("WaypointController")?.call1((maze,))?;
            Ok(Self {
                controller: controller.to_object(py),
            })
        })
    }
}

impl<E> Policy<E> for WaypointController
where
    E: Env<Obs = PointMazeObs, Act = PointMazeAct>,
{
    fn sample(&mut self, obs: &PointMazeObs) -> PointMazeAct {
        Python::with_gil(|py| {
            let act = self
                .controller
                .call_method1(py, "compute_action", (obs.to_py(py),))
                .unwrap();
            PointMazeAct::from_py(act.as_ref(py)).unwrap()
        })
    }
}

/// Adds independent Gaussian noise to every action dimension of an inner policy.
///
/// Pure waypoint-following actions are nearly deterministic; the noise diversifies
/// the trajectory distribution of the collected demonstrations.
pub struct GaussianNoise<P> {
    inner: P,
    normal: Normal<f32>,
    rng: SmallRng,
}

impl<P> GaussianNoise<P> {
    /// Wraps `inner`, adding zero-mean noise of the given standard deviation with a
    /// seeded generator.
    pub fn build(inner: P, std_dev: f32, seed: u64) -> Result<Self> {
        Ok(Self {
            inner,
            normal: Normal::new(0.0, std_dev)?,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl<E, P> Policy<E> for GaussianNoise<P>
where
    E: Env<Act = PointMazeAct>,
    P: Policy<E>,
{
    fn sample(&mut self, obs: &E::Obs) -> PointMazeAct {
        let mut act = self.inner.sample(obs);
        act.action
            .mapv_inplace(|a| a + self.normal.sample(&mut self.rng));
        act
    }
}
