//! Informed search for Rust
//!
//! This crate provides the building blocks of heuristic state-space search:
//!
//! - **Fibonacci Heap**: O(1) amortized insert, decrease_key, and merge; O(log n) amortized
//!   delete-min and delete. Handles stay valid across merges.
//! - **RBFS**: recursive best-first search, optimal under an admissible heuristic with memory
//!   linear in the search depth
//! - **A\***: best-first search over a Fibonacci heap open list, as tree search or as graph
//!   search with duplicate detection
//!
//! Problem domains plug in through the [`SearchNode`], [`Heuristic`] and [`Generator`] traits;
//! results are collected by a [`Manager`].
//!
//! # Example
//!
//! ```rust
//! use informed_search::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! heap.insert(3, "item2");
//! heap.decrease_key(handle1, 1).unwrap();
//!
//! let min = heap.delete_minimum().unwrap();
//! assert_eq!((min.key, min.value), (1, "item1"));
//! assert_eq!(heap.len(), 1);
//! ```
//!
//! # Logging
//!
//! Solvers emit [`tracing`] events: one span per solve, termination at `info`, expansions and
//! backtracking at `trace`, and early stops at `warn`. The crate never installs a subscriber.

pub mod astar;
pub mod config;
pub mod cost;
pub mod error;
pub mod fibonacci;
pub mod manager;
pub mod rbfs;
pub mod search;
pub mod stats;
pub mod traits;

pub use astar::AStarSolver;
pub use config::SolverConfig;
pub use cost::{Cost, DoubleCost};
pub use error::{CostError, HeapError, SearchError};
pub use fibonacci::{EntryHandle, FibonacciHeap};
pub use manager::{BasicManager, Manager, Solution};
pub use rbfs::RbfsSolver;
pub use search::{Generator, Heuristic, InformedSearchNode, SearchNode, StateSearchNode, ZeroHeuristic};
pub use stats::{SearchOutcome, SearchStats, Termination};
pub use traits::{DecreaseKeyHeap, Heap};
