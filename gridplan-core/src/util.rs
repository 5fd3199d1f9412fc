//! Utilities for interaction of policies and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;
use log::info;
use std::time::{Duration, Instant};

/// Run episodes with a policy and recorder.
///
/// Every step is written to `recorder` with `"reward"`, `"episode"` and
/// `"step"` entries added to the record returned by the environment.
/// Returns the undiscounted return of each episode.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::new();

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset()?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act)?;
            r_total += step.reward;

            record.insert("reward", RecordValue::Scalar(step.reward));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
            count_step += 1;
        }
        rs.push(r_total);
    }

    Ok(rs)
}

/// Wall-clock cost of repeated clones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloneTiming {
    /// Number of clones.
    pub iterations: usize,

    /// Total elapsed time.
    pub total: Duration,
}

impl CloneTiming {
    /// Average time per clone.
    pub fn per_copy(&self) -> Duration {
        if self.iterations == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.iterations as f64)
        }
    }
}

/// Clones `value` `iterations` times and measures the elapsed time.
///
/// Every clone is kept alive until the end of its iteration and then dropped,
/// so the measurement includes deallocation.
pub fn time_clones<T: Clone>(value: &T, iterations: usize) -> CloneTiming {
    let start = Instant::now();
    for _ in 0..iterations {
        let copy = value.clone();
        std::hint::black_box(&copy);
    }
    let timing = CloneTiming {
        iterations,
        total: start.elapsed(),
    };
    info!(
        "{} clones took {:?} ({:?} per clone)",
        iterations,
        timing.total,
        timing.per_copy()
    );
    timing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_clones() {
        let v = vec![0u8; 1024];
        let timing = time_clones(&v, 10);
        assert_eq!(timing.iterations, 10);
        assert!(timing.per_copy() <= timing.total);
        assert_eq!(time_clones(&v, 0).per_copy(), Duration::ZERO);
    }

    #[test]
    fn test_per_copy_with_many_iterations() {
        let timing = CloneTiming {
            iterations: 4,
            total: Duration::from_secs(2),
        };
        assert_eq!(timing.per_copy(), Duration::from_millis(500));

        let timing = CloneTiming {
            iterations: usize::MAX,
            total: Duration::from_secs(1),
        };
        assert!(timing.per_copy() < Duration::from_nanos(1));
    }
}
