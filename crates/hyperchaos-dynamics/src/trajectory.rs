//! Sampled trajectories

use crate::{DIM, State};

/// Uniformly sampled solution of a system after the transient was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<State>,
    dt: f64,
    start_time: f64,
}

impl Trajectory {
    /// Wraps sampled points. `start_time` is the time of the first retained
    /// sample and `dt` the sampling interval.
    pub fn new(points: Vec<State>, dt: f64, start_time: f64) -> Self {
        Self { points, dt, start_time }
    }

    /// Retained samples in time order.
    pub fn points(&self) -> &[State] {
        &self.points
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no sample was retained.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sampling interval.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Time of sample `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        self.start_time + self.dt * index as f64
    }

    /// One state component over time.
    pub fn component(&self, dim: usize) -> impl Iterator<Item = f64> + '_ {
        debug_assert!(dim < DIM);
        self.points.iter().map(move |p| p[dim])
    }

    /// Consumes the trajectory, returning its samples.
    pub fn into_points(self) -> Vec<State> {
        self.points
    }
}
