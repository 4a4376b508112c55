//! Parallel processing configuration.

use serde::{Deserialize, Serialize};

/// Controls whether per-cell recognition runs on the rayon pool.
///
/// Cells are independent and read-only with respect to the source image, so
/// they can be recognized concurrently. The default is sequential, which keeps
/// the order of debug artifacts and log lines deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Recognize cells in parallel.
    #[serde(default)]
    pub parallel_cells: bool,

    /// Cell sets with at most this many cells are always processed sequentially.
    #[serde(default = "ParallelPolicy::default_cell_threshold")]
    pub cell_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Enable or disable parallel cell recognition.
    pub fn with_parallel_cells(mut self, enabled: bool) -> Self {
        self.parallel_cells = enabled;
        self
    }

    /// Set the sequential cell threshold.
    pub fn with_cell_threshold(mut self, threshold: usize) -> Self {
        self.cell_threshold = threshold;
        self
    }

    /// Returns true if a cell set of `cell_count` cells should be processed in parallel.
    pub fn should_parallelize(&self, cell_count: usize) -> bool {
        self.parallel_cells && cell_count > self.cell_threshold
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// Call once at application startup before any parallel processing occurs.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_cell_threshold() -> usize {
        16
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            parallel_cells: false,
            cell_threshold: Self::default_cell_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sequential() {
        let policy = ParallelPolicy::default();
        assert!(!policy.should_parallelize(1_000));
    }

    #[test]
    fn test_threshold_applies_when_enabled() {
        let policy = ParallelPolicy::new()
            .with_parallel_cells(true)
            .with_cell_threshold(4);
        assert!(!policy.should_parallelize(4));
        assert!(policy.should_parallelize(5));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let policy: ParallelPolicy = serde_json::from_str(r#"{"parallel_cells": true}"#).unwrap();
        assert!(policy.parallel_cells);
        assert_eq!(policy.cell_threshold, 16);
        assert_eq!(policy.max_threads, None);
    }
}
