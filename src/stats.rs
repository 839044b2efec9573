//! Search outcomes and statistics

use std::fmt;
use std::time::Duration;

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// A goal was reached and proven optimal.
    GoalFound,
    /// Every reachable node was explored without finding a goal.
    Exhausted,
    /// The configured expansion budget ran out.
    ExpansionLimit,
    /// The configured wall clock limit passed.
    TimeLimit,
    /// The stop flag was raised.
    Interrupted,
}

impl Termination {
    /// Returns true if the search ended on its own rather than by a limit.
    ///
    /// Only naturally terminated searches prove anything about optimality.
    pub fn is_natural(self) -> bool {
        matches!(self, Termination::GoalFound | Termination::Exhausted)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::GoalFound => write!(f, "goal found"),
            Termination::Exhausted => write!(f, "search space exhausted"),
            Termination::ExpansionLimit => write!(f, "expansion limit reached"),
            Termination::TimeLimit => write!(f, "time limit reached"),
            Termination::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Number of generator calls.
    pub expanded: u64,
    /// Number of successors returned by the generator.
    pub generated: u64,
    /// Deepest level reached, the start node being level 0.
    pub max_depth: usize,
    /// Wall clock duration of the search.
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expanded {} nodes, generated {}, max depth {}, in {:.3}s",
            self.expanded,
            self.generated,
            self.max_depth,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Summary of a finished search.
///
/// The solution itself is kept by the [`Manager`](crate::manager::Manager).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    pub termination: Termination,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Returns true if the search stopped at a proven optimal goal.
    pub fn is_goal_found(&self) -> bool {
        self.termination == Termination::GoalFound
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.termination, self.stats)
    }
}
