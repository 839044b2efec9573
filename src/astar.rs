//! A* search over a Fibonacci heap
//!
//! A* keeps every generated but unexpanded node in an open list ordered by
//! `f = g + h` and always expands the cheapest one. With an admissible
//! heuristic the first goal taken from the open list is optimal. Unlike
//! [`RbfsSolver`](crate::rbfs::RbfsSolver) it never re-expands a subtree, at
//! the price of memory proportional to the open list.
//!
//! Two variants are provided:
//!
//! - [`AStarSolver::solve`] treats the search space as a tree; a state reached
//!   along several paths is expanded once per path.
//! - [`AStarSolver::solve_graph`] detects duplicate states through
//!   [`StateSearchNode`]. A cheaper path to a state that is still open replaces
//!   the queued node in place with [`FibonacciHeap::decrease_key`]. A cheaper
//!   path to a state that was already expanded reopens it, so the result stays
//!   optimal with an admissible heuristic even when it is not consistent. With
//!   a consistent heuristic no state is ever reopened.
//!
//! Ties on `f` are broken in insertion order. Successor f-values never drop
//! below their parent's, so an inconsistent heuristic cannot make f decrease
//! along a path.
//!
//! # Example
//!
//! ```rust
//! use informed_search::astar::AStarSolver;
//! use informed_search::manager::{BasicManager, Manager};
//! use informed_search::search::{Generator, InformedSearchNode, SearchNode, StateSearchNode, ZeroHeuristic};
//! use std::convert::Infallible;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Cell { x: i32, y: i32, cost: u32 }
//!
//! impl SearchNode for Cell {
//!     type Cost = u32;
//!     fn cost(&self) -> u32 { self.cost }
//!     fn is_goal(&self) -> bool { (self.x, self.y) == (2, 2) }
//! }
//!
//! impl StateSearchNode for Cell {
//!     type State = (i32, i32);
//!     fn search_space_state(&self) -> (i32, i32) { (self.x, self.y) }
//! }
//!
//! /// Four-connected 3x3 grid.
//! struct Grid;
//!
//! impl Generator<Cell, ()> for Grid {
//!     type Error = Infallible;
//!
//!     fn expand(&mut self, node: &Cell, _: &()) -> Result<Vec<Cell>, Infallible> {
//!         Ok([(1, 0), (-1, 0), (0, 1), (0, -1)]
//!             .into_iter()
//!             .map(|(dx, dy)| (node.x + dx, node.y + dy))
//!             .filter(|&(x, y)| (0..3).contains(&x) && (0..3).contains(&y))
//!             .map(|(x, y)| Cell { x, y, cost: node.cost + 1 })
//!             .collect())
//!     }
//! }
//!
//! let start = InformedSearchNode::new(Cell { x: 0, y: 0, cost: 0 }, 0);
//! let mut manager = BasicManager::new();
//! let outcome = AStarSolver::new()
//!     .solve_graph(start, &(), &ZeroHeuristic, &mut Grid, &mut manager)
//!     .unwrap();
//!
//! assert!(outcome.is_goal_found());
//! assert_eq!(manager.solution().unwrap().cost(), 4);
//! ```

use crate::config::{Budget, SolverConfig};
use crate::cost::Cost;
use crate::error::SearchError;
use crate::fibonacci::{EntryHandle, FibonacciHeap};
use crate::manager::{accept_optimal, Manager};
use crate::search::{Generator, Heuristic, InformedSearchNode, SearchNode, StateSearchNode};
use crate::stats::{SearchOutcome, SearchStats, Termination};
use rustc_hash::FxHashMap;
use std::collections::hash_map;
use tracing::{info, info_span, trace, warn};

/// Open list key: f-value, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Priority<C> {
    f: C,
    seq: u64,
}

/// A queued node and its depth in the search tree.
struct Open<N> {
    node: N,
    depth: usize,
}

/// A* solver.
#[derive(Debug, Clone, Default)]
pub struct AStarSolver {
    config: SolverConfig,
}

impl AStarSolver {
    /// Creates a solver without search limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver using `config`.
    pub fn with_config(config: SolverConfig) -> Self {
        AStarSolver { config }
    }

    /// Returns the configuration of this solver.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Tree search from `start`.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the generator or the heuristic fails.
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
        let span = info_span!("astar");
        let _guard = span.enter();

        let mut run = Run::new(context, heuristic, generator, self.config.start());
        let start_f = start.f();
        run.push(start.into_node(), start_f, 0);

        let termination = loop {
            let Some(entry) = run.open.delete_minimum() else {
                break Termination::Exhausted;
            };
            let Open { node, depth } = entry.value;
            if node.is_goal() {
                accept_optimal(manager, node);
                break Termination::GoalFound;
            }
            if let Some(termination) = run.budget.check(run.stats.expanded) {
                break termination;
            }

            for (child, f) in run.expand(&node, entry.key.f, depth)? {
                run.push(child, f, depth + 1);
            }
        };

        Ok(run.finish(termination))
    }

    /// Graph search from `start`, merging nodes that share a search-space state.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the generator or the heuristic fails.
    pub fn solve_graph<N, C, H, G, M>(
        &self,
        start: InformedSearchNode<N>,
        context: &C,
        heuristic: &H,
        generator: &mut G,
        manager: &mut M,
    ) -> Result<SearchOutcome, SearchError>
    where
        N: StateSearchNode,
        C: ?Sized,
        H: Heuristic<N, C>,
        G: Generator<N, C>,
        M: Manager<N>,
    {
        let span = info_span!("astar_graph");
        let _guard = span.enter();

        let mut run = Run::new(context, heuristic, generator, self.config.start());
        let mut queued: FxHashMap<N::State, EntryHandle> = FxHashMap::default();
        // Expanded states with the path cost they were expanded at.
        let mut closed: FxHashMap<N::State, N::Cost> = FxHashMap::default();

        let start_f = start.f();
        let start = start.into_node();
        let start_state = start.search_space_state();
        let handle = run.push(start, start_f, 0);
        queued.insert(start_state, handle);

        let termination = loop {
            let Some(entry) = run.open.delete_minimum() else {
                break Termination::Exhausted;
            };
            let Open { node, depth } = entry.value;
            let state = node.search_space_state();
            queued.remove(&state);
            if node.is_goal() {
                accept_optimal(manager, node);
                break Termination::GoalFound;
            }
            if let Some(termination) = run.budget.check(run.stats.expanded) {
                break termination;
            }
            closed.insert(state, node.cost());

            for (child, f) in run.expand(&node, entry.key.f, depth)? {
                let child_state = child.search_space_state();
                if let Some(expanded_at) = closed.get(&child_state) {
                    if *expanded_at <= child.cost() {
                        continue;
                    }
                    trace!(cost = ?child.cost(), "reopening expanded state");
                    closed.remove(&child_state);
                }
                match queued.entry(child_state) {
                    hash_map::Entry::Vacant(slot) => {
                        slot.insert(run.push(child, f, depth + 1));
                    }
                    hash_map::Entry::Occupied(mut slot) => {
                        let handle = *slot.get();
                        if let Some(replaced) = run.improve(handle, child, f, depth + 1) {
                            slot.insert(replaced);
                        }
                    }
                }
            }
        };

        Ok(run.finish(termination))
    }
}

/// State of a single solve.
struct Run<'a, N: SearchNode, C: ?Sized, H, G> {
    context: &'a C,
    heuristic: &'a H,
    generator: &'a mut G,
    budget: Budget<'a>,
    stats: SearchStats,
    open: FibonacciHeap<Priority<N::Cost>, Open<N>>,
    seq: u64,
}

impl<'a, N, C, H, G> Run<'a, N, C, H, G>
where
    N: SearchNode,
    C: ?Sized,
    H: Heuristic<N, C>,
    G: Generator<N, C>,
{
    fn new(context: &'a C, heuristic: &'a H, generator: &'a mut G, budget: Budget<'a>) -> Self {
        Run {
            context,
            heuristic,
            generator,
            budget,
            stats: SearchStats::default(),
            open: FibonacciHeap::new(),
            seq: 0,
        }
    }

    fn push(&mut self, node: N, f: N::Cost, depth: usize) -> EntryHandle {
        self.seq += 1;
        let priority = Priority { f, seq: self.seq };
        self.open.insert(priority, Open { node, depth })
    }

    /// Replaces the queued entry behind `handle` if `node` reaches the same state cheaper.
    ///
    /// Returns the new handle if the entry had to be reinserted.
    fn improve(
        &mut self,
        handle: EntryHandle,
        node: N,
        f: N::Cost,
        depth: usize,
    ) -> Option<EntryHandle> {
        let queued = self.open.get(handle)?;
        if node.cost() >= queued.value.node.cost() {
            return None;
        }

        let priority = *queued.key;
        trace!(cost = ?node.cost(), "cheaper path to queued state");
        if f <= priority.f {
            let lowered = Priority { f, seq: priority.seq };
            if self.open.decrease_key(handle, lowered).is_ok() {
                if let Some(slot) = self.open.value_mut(handle) {
                    *slot = Open { node, depth };
                }
            }
            return None;
        }
        // Pathmax lifted f above the queued entry.
        self.open.delete(handle).ok()?;
        Some(self.push(node, f, depth))
    }

    /// Expands `node` and pairs each successor with its f-value.
    fn expand(
        &mut self,
        node: &N,
        f: N::Cost,
        depth: usize,
    ) -> Result<Vec<(N, N::Cost)>, SearchError> {
        trace!(depth, f = ?f, open = self.open.len(), "expand");
        let children = self
            .generator
            .expand(node, self.context)
            .map_err(|err| SearchError::generator(depth, err))?;
        self.stats.expanded += 1;
        self.stats.generated += children.len() as u64;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        children
            .into_iter()
            .map(|child| {
                let h = self
                    .heuristic
                    .estimate_remaining_cost(&child, self.context)
                    .map_err(|err| SearchError::heuristic(depth + 1, err))?;
                let child_f = f.max(child.cost().combine(h));
                Ok((child, child_f))
            })
            .collect()
    }

    fn finish(mut self, termination: Termination) -> SearchOutcome {
        self.stats.elapsed = self.budget.elapsed();
        if termination.is_natural() {
            info!(%termination, stats = %self.stats, "astar finished");
        } else {
            warn!(%termination, stats = %self.stats, open = self.open.len(), "astar stopped early");
        }
        SearchOutcome {
            termination,
            stats: self.stats,
        }
    }
}
