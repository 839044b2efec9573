//! Recursive best-first search (RBFS)
//!
//! RBFS explores a search tree in best-first order while keeping only the
//! current path and the siblings along it in memory. Every level remembers the
//! f-value of the best alternative it left behind; once the subtree being
//! explored becomes more expensive than that alternative, the search backs up
//! and stores the subtree's new (backed-up) f-value in its root. With an
//! admissible heuristic the first goal reached is optimal.
//!
//! # Algorithm
//!
//! Given a node with f-value `F` and an upper bound `B` (infinite at the root):
//!
//! 1. A goal node is reported to the manager and ends the search.
//! 2. A node without successors backs up an infinite f-value.
//! 3. Every successor gets `f = max(F, g + h)`, keeping f monotone along paths
//!    even if the heuristic is inconsistent.
//! 4. The best successor is explored with bound `min(B, second best f)`.
//! 5. Its backed-up value replaces its f-value and the successors are ranked
//!    again; this repeats while the best f-value does not exceed `B`.
//! 6. Otherwise the best f-value is backed up to the parent.
//!
//! The recursion runs on an explicit stack of frames, so the depth of the
//! search is limited by memory rather than by the call stack. Successors of a
//! frame are ranked in a [`FibonacciHeap`]; among equal f-values the successor
//! explored most recently comes first, then generation order.
//!
//! # Example
//!
//! ```rust
//! use informed_search::manager::{BasicManager, Manager};
//! use informed_search::rbfs::RbfsSolver;
//! use informed_search::search::{Generator, InformedSearchNode, SearchNode, ZeroHeuristic};
//! use std::convert::Infallible;
//!
//! /// Counts towards a target, either by one or by two at cost 3.
//! #[derive(Debug, Clone, PartialEq)]
//! struct Count { value: u32, cost: u32 }
//!
//! impl SearchNode for Count {
//!     type Cost = u32;
//!     fn cost(&self) -> u32 { self.cost }
//!     fn is_goal(&self) -> bool { self.value == 4 }
//! }
//!
//! struct Steps;
//!
//! impl Generator<Count, ()> for Steps {
//!     type Error = Infallible;
//!
//!     fn expand(&mut self, node: &Count, _: &()) -> Result<Vec<Count>, Infallible> {
//!         if node.value >= 4 {
//!             return Ok(Vec::new());
//!         }
//!         Ok(vec![
//!             Count { value: node.value + 1, cost: node.cost + 1 },
//!             Count { value: node.value + 2, cost: node.cost + 3 },
//!         ])
//!     }
//! }
//!
//! let start = InformedSearchNode::new(Count { value: 0, cost: 0 }, 0);
//! let mut manager = BasicManager::new();
//! let outcome = RbfsSolver::new()
//!     .solve(start, &(), &ZeroHeuristic, &mut Steps, &mut manager)
//!     .unwrap();
//!
//! assert!(outcome.is_goal_found());
//! let solution = manager.solution().unwrap();
//! assert_eq!(solution.cost(), 4);
//! assert!(solution.is_optimal());
//! ```

use crate::config::{Budget, SolverConfig};
use crate::cost::Cost;
use crate::error::SearchError;
use crate::fibonacci::FibonacciHeap;
use crate::manager::{accept_optimal, Manager};
use crate::search::{Generator, Heuristic, InformedSearchNode, SearchNode};
use crate::stats::{SearchOutcome, SearchStats, Termination};
use tracing::{info, info_span, trace, warn};

/// Ranking key of a successor inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank<C> {
    f: C,
    tie: i64,
}

/// One level of the search: the successors of the node being explored.
struct Frame<N: SearchNode> {
    successors: FibonacciHeap<Rank<N::Cost>, N>,
    /// Successor currently explored one level deeper.
    active: Option<N>,
    bound: N::Cost,
    depth: usize,
    next_tie: i64,
}

impl<N: SearchNode> Frame<N> {
    /// Puts the explored successor back with its backed-up f-value.
    fn restore(&mut self, node: N, backed_up: N::Cost) {
        self.next_tie -= 1;
        self.successors.insert(
            Rank {
                f: backed_up,
                tie: self.next_tie,
            },
            node,
        );
    }
}

/// Recursive best-first search solver.
///
/// The solver itself holds only its configuration; each call to
/// [`RbfsSolver::solve`] is independent.
#[derive(Debug, Clone, Default)]
pub struct RbfsSolver {
    config: SolverConfig,
}

impl RbfsSolver {
    /// Creates a solver without search limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver using `config`.
    pub fn with_config(config: SolverConfig) -> Self {
        RbfsSolver { config }
    }

    /// Returns the configuration of this solver.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Searches for a cheapest goal reachable from `start`.
    ///
    /// A goal found this way is reported to `manager` as optimal (provided the
    /// heuristic is admissible). If a configured limit stops the search first,
    /// the outcome says so and the manager is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the generator or the heuristic fails. The
    /// search is abandoned; solutions accepted by the manager earlier remain.
    pub fn solve<N, C, H, G, M>(
        &self,
        start: InformedSearchNode<N>,
        context: &C,
        heuristic: &H,
        generator: &mut G,
        manager: &mut M,
    ) -> Result<SearchOutcome, SearchError>
    where
        N: SearchNode,
        C: ?Sized,
        H: Heuristic<N, C>,
        G: Generator<N, C>,
        M: Manager<N>,
    {
        let span = info_span!("rbfs");
        let _guard = span.enter();

        let mut run = Run {
            context,
            heuristic,
            generator,
            budget: self.config.start(),
            stats: SearchStats::default(),
        };

        let start_f = start.f();
        let termination = run.search(start.into_node(), start_f, manager)?;
        run.stats.elapsed = run.budget.elapsed();

        if termination.is_natural() {
            info!(%termination, stats = %run.stats, "rbfs finished");
        } else {
            warn!(%termination, stats = %run.stats, "rbfs stopped early");
        }
        Ok(SearchOutcome {
            termination,
            stats: run.stats,
        })
    }
}

/// State of a single solve.
struct Run<'a, C: ?Sized, H, G> {
    context: &'a C,
    heuristic: &'a H,
    generator: &'a mut G,
    budget: Budget<'a>,
    stats: SearchStats,
}

/// Result of opening a node.
enum Opened<N: SearchNode> {
    Goal(N),
    DeadEnd(N),
    Frame(N, Frame<N>),
    Stopped(Termination),
}

impl<C: ?Sized, H, G> Run<'_, C, H, G> {
    fn search<N, M>(
        &mut self,
        start: N,
        start_f: N::Cost,
        manager: &mut M,
    ) -> Result<Termination, SearchError>
    where
        N: SearchNode,
        H: Heuristic<N, C>,
        G: Generator<N, C>,
        M: Manager<N>,
    {
        let mut stack: Vec<Frame<N>> = Vec::new();

        match self.open(start, start_f, N::Cost::infinity(), 0)? {
            Opened::Goal(goal) => {
                accept_optimal(manager, goal);
                return Ok(Termination::GoalFound);
            }
            Opened::DeadEnd(_) => return Ok(Termination::Exhausted),
            Opened::Stopped(termination) => return Ok(termination),
            Opened::Frame(_, frame) => stack.push(frame),
        }

        // Value backed up by the level that was just left.
        let mut backed_up: Option<N::Cost> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(value) = backed_up.take() {
                if let Some(node) = frame.active.take() {
                    frame.restore(node, value);
                }
            }

            let Some(best) = frame.successors.delete_minimum() else {
                stack.pop();
                backed_up = Some(N::Cost::infinity());
                continue;
            };
            let best_f = best.key.f;
            if best_f > frame.bound || best_f.is_infinite() {
                trace!(depth = frame.depth, f = ?best_f, bound = ?frame.bound, "backtrack");
                stack.pop();
                backed_up = Some(best_f);
                continue;
            }

            let alternative = frame
                .successors
                .find_minimum()
                .map_or(N::Cost::infinity(), |entry| entry.key.f);
            let bound = frame.bound.min(alternative);
            let depth = frame.depth + 1;

            match self.open(best.value, best_f, bound, depth)? {
                Opened::Goal(goal) => {
                    accept_optimal(manager, goal);
                    return Ok(Termination::GoalFound);
                }
                Opened::Stopped(termination) => return Ok(termination),
                Opened::DeadEnd(node) => {
                    frame.active = Some(node);
                    backed_up = Some(N::Cost::infinity());
                }
                Opened::Frame(node, child) => {
                    frame.active = Some(node);
                    stack.push(child);
                }
            }
        }

        Ok(Termination::Exhausted)
    }

    /// Goal-tests and expands `node`, ranking its successors in a new frame.
    fn open<N>(
        &mut self,
        node: N,
        f: N::Cost,
        bound: N::Cost,
        depth: usize,
    ) -> Result<Opened<N>, SearchError>
    where
        N: SearchNode,
        H: Heuristic<N, C>,
        G: Generator<N, C>,
    {
        if node.is_goal() {
            return Ok(Opened::Goal(node));
        }
        if let Some(termination) = self.budget.check(self.stats.expanded) {
            return Ok(Opened::Stopped(termination));
        }

        trace!(depth, f = ?f, bound = ?bound, "expand");
        let children = self
            .generator
            .expand(&node, self.context)
            .map_err(|err| SearchError::generator(depth, err))?;
        self.stats.expanded += 1;
        self.stats.generated += children.len() as u64;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        if children.is_empty() {
            return Ok(Opened::DeadEnd(node));
        }

        let mut successors = FibonacciHeap::new();
        for (tie, child) in (0i64..).zip(children) {
            let h = self
                .heuristic
                .estimate_remaining_cost(&child, self.context)
                .map_err(|err| SearchError::heuristic(depth + 1, err))?;
            let child_f = f.max(child.cost().combine(h));
            successors.insert(Rank { f: child_f, tie }, child);
        }

        Ok(Opened::Frame(
            node,
            Frame {
                successors,
                active: None,
                bound,
                depth,
                next_tie: 0,
            },
        ))
    }
}
