//! Solution bookkeeping
//!
//! Solvers report every goal they reach to a [`Manager`]. The manager decides
//! which one to keep and is the only place the caller reads results from.

use crate::search::SearchNode;
use tracing::debug;

/// A goal node together with the solver's claim about its optimality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<N> {
    node: N,
    optimal: bool,
}

impl<N: SearchNode> Solution<N> {
    /// Creates a solution for `node`.
    ///
    /// `optimal` must only be true if no cheaper solution can exist.
    pub fn new(node: N, optimal: bool) -> Self {
        Solution { node, optimal }
    }

    /// Returns the goal node.
    #[inline]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Unwraps the goal node.
    #[inline]
    pub fn into_node(self) -> N {
        self.node
    }

    /// Returns the path cost of the solution.
    #[inline]
    pub fn cost(&self) -> N::Cost {
        self.node.cost()
    }

    /// Returns true if the solver proved that no cheaper solution exists.
    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }
}

/// Keeps track of the best solution found during a search.
pub trait Manager<N: SearchNode> {
    /// Offers a solution to the manager.
    fn accept_solution(&mut self, candidate: Solution<N>);

    /// Returns the solution currently kept, if any.
    fn solution(&self) -> Option<&Solution<N>>;
}

impl<N: SearchNode, M: Manager<N> + ?Sized> Manager<N> for &mut M {
    fn accept_solution(&mut self, candidate: Solution<N>) {
        (**self).accept_solution(candidate);
    }

    fn solution(&self) -> Option<&Solution<N>> {
        (**self).solution()
    }
}

/// A manager keeping the cheapest solution it has been offered.
///
/// A candidate replaces the stored solution if it is strictly cheaper. The
/// one exception is a tie in cost: an equally cheap candidate replaces the
/// stored solution when the candidate is proven optimal and the stored one is
/// not. Any other equally cheap candidate is rejected and the first one
/// offered is kept.
///
/// # Example
///
/// ```rust
/// use informed_search::manager::{BasicManager, Manager, Solution};
/// use informed_search::search::SearchNode;
///
/// #[derive(Debug, PartialEq)]
/// struct Goal(u32);
///
/// impl SearchNode for Goal {
///     type Cost = u32;
///     fn cost(&self) -> u32 { self.0 }
///     fn is_goal(&self) -> bool { true }
/// }
///
/// let mut manager = BasicManager::new();
/// manager.accept_solution(Solution::new(Goal(7), false));
/// manager.accept_solution(Solution::new(Goal(9), true));
/// manager.accept_solution(Solution::new(Goal(5), true));
///
/// let best = manager.solution().unwrap();
/// assert_eq!(best.node(), &Goal(5));
/// assert!(best.is_optimal());
/// ```
#[derive(Debug, Clone)]
pub struct BasicManager<N> {
    solution: Option<Solution<N>>,
    accepted: usize,
}

impl<N> Default for BasicManager<N> {
    fn default() -> Self {
        BasicManager {
            solution: None,
            accepted: 0,
        }
    }
}

impl<N: SearchNode> BasicManager<N> {
    /// Creates a manager without a solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many candidates replaced the stored solution.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Takes the stored solution out of the manager.
    pub fn into_solution(self) -> Option<Solution<N>> {
        self.solution
    }
}

impl<N: SearchNode> Manager<N> for BasicManager<N> {
    fn accept_solution(&mut self, candidate: Solution<N>) {
        let replace = match &self.solution {
            None => true,
            Some(current) => match candidate.cost().cmp(&current.cost()) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => candidate.optimal && !current.optimal,
                std::cmp::Ordering::Greater => false,
            },
        };

        if replace {
            debug!(
                cost = ?candidate.cost(),
                optimal = candidate.optimal,
                "accepted solution"
            );
            self.solution = Some(candidate);
            self.accepted += 1;
        }
    }

    fn solution(&self) -> Option<&Solution<N>> {
        self.solution.as_ref()
    }
}

/// Hands a goal whose optimality the solver has proven to `manager`.
pub(crate) fn accept_optimal<N: SearchNode, M: Manager<N>>(manager: &mut M, goal: N) {
    debug!(cost = ?goal.cost(), "goal reached");
    manager.accept_solution(Solution::new(goal, true));
}
