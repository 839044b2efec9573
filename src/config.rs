//! Solver configuration
//!
//! By default a solver runs until it finds a goal or exhausts the search
//! space. [`SolverConfig`] adds optional limits: an expansion budget, a wall
//! clock limit and a shared stop flag that another thread can raise. A search
//! ended by any of them never reports its solution as optimal.
//!
//! # Example
//!
//! ```rust
//! use informed_search::config::SolverConfig;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let stop = Arc::new(AtomicBool::new(false));
//! let config = SolverConfig::new()
//!     .max_expansions(10_000)
//!     .time_limit(Duration::from_secs(5))
//!     .stop_flag(Arc::clone(&stop));
//!
//! assert_eq!(config.expansion_limit(), Some(10_000));
//! assert!(!config.is_unlimited());
//! ```

use crate::stats::Termination;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Limits applied to a single solve.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    max_expansions: Option<u64>,
    time_limit: Option<Duration>,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl SolverConfig {
    /// Creates a configuration without limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the search after `count` node expansions.
    pub fn max_expansions(mut self, count: u64) -> Self {
        self.max_expansions = Some(count);
        self
    }

    /// Stops the search once `limit` has elapsed since it started.
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Stops the search as soon as `flag` is set.
    pub fn stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Returns the expansion budget, if any.
    pub fn expansion_limit(&self) -> Option<u64> {
        self.max_expansions
    }

    /// Returns the wall clock limit, if any.
    pub fn wall_clock_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Returns true if no limit is configured.
    pub fn is_unlimited(&self) -> bool {
        self.max_expansions.is_none() && self.time_limit.is_none() && self.stop_flag.is_none()
    }

    pub(crate) fn start(&self) -> Budget<'_> {
        Budget {
            config: self,
            started: Instant::now(),
        }
    }
}

/// Tracks the limits of a running search.
pub(crate) struct Budget<'a> {
    config: &'a SolverConfig,
    started: Instant,
}

impl Budget<'_> {
    /// Returns the reason to stop before performing expansion number `expanded + 1`.
    pub(crate) fn check(&self, expanded: u64) -> Option<Termination> {
        if let Some(flag) = &self.config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                return Some(Termination::Interrupted);
            }
        }
        if let Some(max) = self.config.max_expansions {
            if expanded >= max {
                return Some(Termination::ExpansionLimit);
            }
        }
        if let Some(limit) = self.config.time_limit {
            if self.started.elapsed() >= limit {
                return Some(Termination::TimeLimit);
            }
        }
        None
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
