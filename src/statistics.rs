#![deny(unused_variables)]
#![deny(unused_imports)]

//! Aggregation of batch trial results.
//!
//! Failed trials are kept apart from the reward statistics so one aborted
//! trial never poisons the aggregate numbers.

use crate::error::MazeError;
use crate::executor::TrialOutcome;

/// Results of `Executor::run_trials`.
#[derive(Debug, Default)]
pub struct TrialBatch {
    /// Successful trials in trial-index order.
    pub outcomes: Vec<TrialOutcome>,
    /// Failed trials as `(trial index, error)`.
    pub failures: Vec<(usize, MazeError)>,
}

/// Summary of the rewards of successful trials.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardStatistics {
    pub trials: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean_steps: f64,
}

impl TrialBatch {
    pub fn total(&self) -> usize {
        return self.outcomes.len() + self.failures.len();
    }

    /// Statistics over successful trials, `None` when every trial failed.
    pub fn statistics(&self) -> Option<RewardStatistics> {
        let n = self.outcomes.len();
        if n == 0 {
            return None;
        }

        let mut rewards: Vec<f64> = self.outcomes.iter().map(|o| o.reward).collect();
        let mean = rewards.iter().sum::<f64>() / n as f64;
        let variance = rewards.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n as f64;
        let mean_steps = self.outcomes.iter().map(|o| o.steps as f64).sum::<f64>() / n as f64;

        rewards.sort_unstable_by(|a, b| a.total_cmp(b));

        return Some(RewardStatistics {
            trials: n,
            mean,
            std_dev: variance.sqrt(),
            min: rewards[0],
            max: rewards[n - 1],
            median: rewards[n / 2],
            mean_steps,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::grid_world::State;

    fn outcome(reward: f64, steps: usize) -> TrialOutcome {
        return TrialOutcome {
            reward,
            path: vec![State::new(0, 0); steps + 1],
            steps,
            replans: 0,
        };
    }

    #[test]
    fn test_statistics() {
        let batch = TrialBatch {
            outcomes: vec![outcome(150.0, 2), outcome(100.0, 4), outcome(149.0, 3)],
            failures: vec![(3, MazeError::StepLimit { steps: 10 })],
        };
        let stats = batch.statistics().unwrap();
        assert_eq!(batch.total(), 4);
        assert_eq!(stats.trials, 3);
        assert_abs_diff_eq!(stats.mean, 133.0, epsilon = 1e-12);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 150.0);
        assert_eq!(stats.median, 149.0);
        assert_abs_diff_eq!(stats.mean_steps, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std_dev, (1634.0f64 / 3.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        assert!(TrialBatch::default().statistics().is_none());
    }
}
