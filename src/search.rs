//! Search nodes and the collaborator traits used by the solvers
//!
//! A problem domain plugs into the solvers through three traits:
//!
//! - [`SearchNode`]: an immutable snapshot of a position in the search space,
//!   carrying the accumulated path cost `g` and whether it is a goal
//! - [`Heuristic`]: estimates the remaining cost `h` from a node to the nearest goal
//! - [`Generator`]: produces the successors of a node
//!
//! Solutions are reported to a [`Manager`](crate::manager::Manager).
//!
//! Both collaborators receive a shared, read-only domain context `C` (a puzzle
//! board, a road graph, ...) so nodes themselves can stay small.
//!
//! # Example
//!
//! ```rust
//! use informed_search::search::{Generator, Heuristic, SearchNode};
//! use std::convert::Infallible;
//!
//! /// Position on a number line, walking towards `target`.
//! #[derive(Clone, Debug, PartialEq)]
//! struct Walk { at: i32, steps: u32 }
//!
//! impl SearchNode for Walk {
//!     type Cost = u32;
//!
//!     fn cost(&self) -> u32 { self.steps }
//!     fn is_goal(&self) -> bool { self.at == 0 }
//! }
//!
//! struct Distance;
//!
//! impl Heuristic<Walk, ()> for Distance {
//!     type Error = Infallible;
//!
//!     fn estimate_remaining_cost(&self, node: &Walk, _: &()) -> Result<u32, Infallible> {
//!         Ok(node.at.unsigned_abs())
//!     }
//! }
//!
//! struct Steps;
//!
//! impl Generator<Walk, ()> for Steps {
//!     type Error = Infallible;
//!
//!     fn expand(&mut self, node: &Walk, _: &()) -> Result<Vec<Walk>, Infallible> {
//!         Ok(vec![
//!             Walk { at: node.at - 1, steps: node.steps + 1 },
//!             Walk { at: node.at + 1, steps: node.steps + 1 },
//!         ])
//!     }
//! }
//!
//! let start = Walk { at: 3, steps: 0 };
//! assert_eq!(Distance.estimate_remaining_cost(&start, &()).unwrap(), 3);
//! assert_eq!(Steps.expand(&start, &()).unwrap().len(), 2);
//! ```

use crate::cost::Cost;
use crate::error::DomainError;
use std::convert::Infallible;
use std::hash::Hash;

/// A position in the search space.
///
/// Nodes are produced by a [`Generator`] and never modified afterwards.
pub trait SearchNode {
    /// The path cost type
    type Cost: Cost;

    /// Returns the accumulated cost `g` of the path from the start to this node.
    fn cost(&self) -> Self::Cost;

    /// Returns true if this node is an acceptable solution.
    fn is_goal(&self) -> bool;
}

/// A search node exposing the underlying search-space state.
///
/// Different paths can reach the same state; graph search uses the state to
/// detect such duplicates.
pub trait StateSearchNode: SearchNode {
    /// The search-space state type
    type State: Eq + Hash;

    /// Returns the state this node represents, independent of the path taken.
    fn search_space_state(&self) -> Self::State;
}

/// Estimates the cost from a node to the cheapest reachable goal.
///
/// The solvers only return optimal solutions if the estimate is admissible,
/// i.e. never larger than the true remaining cost. This is not checked.
pub trait Heuristic<N: SearchNode, C: ?Sized> {
    /// Error raised by a failed estimate; aborts the running search
    type Error: Into<DomainError>;

    /// Estimates the remaining cost from `node` to a goal.
    fn estimate_remaining_cost(&self, node: &N, context: &C) -> Result<N::Cost, Self::Error>;
}

/// Produces the successors of a node.
///
/// Each call may return any finite number of successors, including none. The
/// search tree as a whole may be unbounded.
pub trait Generator<N: SearchNode, C: ?Sized> {
    /// Error raised by a failed expansion; aborts the running search
    type Error: Into<DomainError>;

    /// Returns the successors of `node`, in the order the domain prefers them.
    fn expand(&mut self, node: &N, context: &C) -> Result<Vec<N>, Self::Error>;
}

impl<N, C, G> Generator<N, C> for &mut G
where
    N: SearchNode,
    C: ?Sized,
    G: Generator<N, C> + ?Sized,
{
    type Error = G::Error;

    fn expand(&mut self, node: &N, context: &C) -> Result<Vec<N>, Self::Error> {
        (**self).expand(node, context)
    }
}

/// A heuristic estimating zero remaining cost for every node.
///
/// Always admissible; turns A* into uniform-cost search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroHeuristic;

impl<N: SearchNode, C: ?Sized> Heuristic<N, C> for ZeroHeuristic {
    type Error = Infallible;

    #[inline]
    fn estimate_remaining_cost(&self, _node: &N, _context: &C) -> Result<N::Cost, Infallible> {
        Ok(N::Cost::zero())
    }
}

/// A search node together with its heuristic estimate.
///
/// The f-value `g + h` is a lower bound on the cost of any solution reached
/// through this node when the heuristic is admissible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformedSearchNode<N: SearchNode> {
    node: N,
    estimate: N::Cost,
}

impl<N: SearchNode> InformedSearchNode<N> {
    /// Pairs `node` with the heuristic estimate `estimate`.
    pub fn new(node: N, estimate: N::Cost) -> Self {
        InformedSearchNode { node, estimate }
    }

    /// Evaluates `heuristic` on `node` and pairs them.
    pub fn evaluate<H, C>(node: N, heuristic: &H, context: &C) -> Result<Self, H::Error>
    where
        H: Heuristic<N, C>,
        C: ?Sized,
    {
        let estimate = heuristic.estimate_remaining_cost(&node, context)?;
        Ok(InformedSearchNode::new(node, estimate))
    }

    /// Returns the wrapped search node.
    #[inline]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Unwraps the search node.
    #[inline]
    pub fn into_node(self) -> N {
        self.node
    }

    /// Returns the accumulated cost `g`.
    #[inline]
    pub fn cost(&self) -> N::Cost {
        self.node.cost()
    }

    /// Returns the heuristic estimate `h`.
    #[inline]
    pub fn estimate(&self) -> N::Cost {
        self.estimate
    }

    /// Returns `f = g + h`.
    #[inline]
    pub fn f(&self) -> N::Cost {
        self.node.cost().combine(self.estimate)
    }
}
