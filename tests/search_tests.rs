//! End-to-end tests for the RBFS and A* solvers
//!
//! Includes a hand-built search space with a known expansion order and the
//! 8-puzzle, checked against a plain breadth-first reference.

use informed_search::config::SolverConfig;
use informed_search::cost::DoubleCost;
use informed_search::manager::{BasicManager, Manager, Solution};
use informed_search::search::{
    Generator, Heuristic, InformedSearchNode, SearchNode, StateSearchNode, ZeroHeuristic,
};
use informed_search::stats::Termination;
use informed_search::{AStarSolver, RbfsSolver, SearchError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::convert::Infallible;
use std::error::Error as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Hand-built search space

#[derive(Debug, Clone, PartialEq)]
struct Dummy {
    name: &'static str,
    g: DoubleCost,
    h: DoubleCost,
    goal: bool,
}

impl SearchNode for Dummy {
    type Cost = DoubleCost;

    fn cost(&self) -> DoubleCost {
        self.g
    }

    fn is_goal(&self) -> bool {
        self.goal
    }
}

fn dummy(name: &'static str, g: f64, h: f64, goal: bool) -> Dummy {
    Dummy {
        name,
        g: DoubleCost::new(g).unwrap(),
        h: DoubleCost::new(h).unwrap(),
        goal,
    }
}

/// Reads the estimate stored in the node.
struct StoredEstimate;

impl Heuristic<Dummy, ()> for StoredEstimate {
    type Error = Infallible;

    fn estimate_remaining_cost(&self, node: &Dummy, _: &()) -> Result<DoubleCost, Infallible> {
        Ok(node.h)
    }
}

/// Looks successors up in a fixed table and records every expansion.
struct TableGenerator {
    successors: HashMap<&'static str, Vec<Dummy>>,
    expanded: Vec<&'static str>,
}

impl Generator<Dummy, ()> for TableGenerator {
    type Error = Infallible;

    fn expand(&mut self, node: &Dummy, _: &()) -> Result<Vec<Dummy>, Infallible> {
        self.expanded.push(node.name);
        Ok(self.successors.get(node.name).cloned().unwrap_or_default())
    }
}

/// Search space, nodes ordered from cheap to expensive, goals in capitals:
///
/// ```text
///  ----a----
///  |   |   b
///  c   |   |
/// / \  d   |
/// e |  |   |
///   |  F   |
///   g      |
///   |      H
///   I
/// ```
fn scenario() -> (Dummy, TableGenerator) {
    let a = dummy("a", 0.0, 0.0, false);
    let b = dummy("b", 1.0, 0.0, false);
    let c = dummy("c", 0.5, 1.5, false);
    let d = dummy("d", 2.0, 1.0, false);
    let e = dummy("e", 0.0, 4.0, false);
    let f = dummy("F", 5.0, 0.0, true);
    let g = dummy("g", 4.0, 2.0, false);
    let h = dummy("H", 7.0, 0.0, true);
    let i = dummy("I", 8.0, 0.0, true);

    let successors = HashMap::from([
        ("a", vec![c, d, b]),
        ("c", vec![e, g]),
        ("g", vec![i]),
        ("d", vec![f]),
        ("b", vec![h]),
    ]);
    (
        a,
        TableGenerator {
            successors,
            expanded: Vec::new(),
        },
    )
}

#[test]
fn test_rbfs_node_expansion_order() {
    init_logging();
    let (start, mut generator) = scenario();
    let mut manager = BasicManager::new();

    let outcome = RbfsSolver::new()
        .solve(
            InformedSearchNode::new(start, DoubleCost::new(0.0).unwrap()),
            &(),
            &StoredEstimate,
            &mut generator,
            &mut manager,
        )
        .unwrap();

    assert_eq!(generator.expanded, ["a", "b", "c", "d", "c", "e", "d"]);
    assert_eq!(outcome.termination, Termination::GoalFound);
    assert_eq!(outcome.stats.expanded, 7);

    let solution = manager.solution().unwrap();
    assert_eq!(solution.node().name, "F");
    assert_eq!(solution.cost(), DoubleCost::new(5.0).unwrap());
    assert!(solution.is_optimal());
}

#[test]
fn test_astar_agrees_on_scenario() {
    init_logging();
    let (start, mut generator) = scenario();
    let mut manager = BasicManager::new();

    let outcome = AStarSolver::new()
        .solve(
            InformedSearchNode::new(start, DoubleCost::new(0.0).unwrap()),
            &(),
            &StoredEstimate,
            &mut generator,
            &mut manager,
        )
        .unwrap();

    assert!(outcome.is_goal_found());
    // A* never expands a node twice.
    assert_eq!(generator.expanded, ["a", "b", "c", "d", "e"]);
    assert_eq!(manager.solution().unwrap().node().name, "F");
    assert!(manager.solution().unwrap().is_optimal());
}

#[test]
fn test_rbfs_stop_flag_interrupts() {
    let (start, mut generator) = scenario();
    let stop = Arc::new(AtomicBool::new(true));
    let mut manager = BasicManager::new();

    let solver = RbfsSolver::with_config(SolverConfig::new().stop_flag(Arc::clone(&stop)));
    let outcome = solver
        .solve(
            InformedSearchNode::new(start, DoubleCost::new(0.0).unwrap()),
            &(),
            &StoredEstimate,
            &mut generator,
            &mut manager,
        )
        .unwrap();

    assert_eq!(outcome.termination, Termination::Interrupted);
    assert!(generator.expanded.is_empty());
    assert!(manager.solution().is_none());
    stop.store(false, Ordering::Relaxed);
}

// Inconsistent estimate

impl StateSearchNode for Dummy {
    type State = &'static str;

    fn search_space_state(&self) -> &'static str {
        self.name
    }
}

/// Weighted graph whose estimate is admissible but not consistent:
///
/// ```text
/// S -4-> A -3-> G
/// S -1-> B -1-> A
/// ```
///
/// `h(B) = 4` is exact, every other estimate is zero. Going through B first
/// finds A at cost 2 after A was already reached directly at cost 4.
struct Detour {
    expanded: Vec<&'static str>,
}

impl Generator<Dummy, ()> for Detour {
    type Error = Infallible;

    fn expand(&mut self, node: &Dummy, _: &()) -> Result<Vec<Dummy>, Infallible> {
        self.expanded.push(node.name);
        let edges: &[(&'static str, f64)] = match node.name {
            "S" => &[("A", 4.0), ("B", 1.0)],
            "B" => &[("A", 1.0)],
            "A" => &[("G", 3.0)],
            _ => &[],
        };
        Ok(edges
            .iter()
            .map(|&(name, w)| {
                let h = if name == "B" { 4.0 } else { 0.0 };
                dummy(name, node.g.value() + w, h, name == "G")
            })
            .collect())
    }
}

fn detour_start() -> InformedSearchNode<Dummy> {
    InformedSearchNode::new(dummy("S", 0.0, 0.0, false), DoubleCost::new(0.0).unwrap())
}

fn assert_cheapest_detour(manager: &BasicManager<Dummy>) {
    let solution = manager.solution().unwrap();
    assert_eq!(solution.node().name, "G");
    assert_eq!(solution.cost(), DoubleCost::new(5.0).unwrap());
    assert!(solution.is_optimal());
}

#[test]
fn test_graph_search_reopens_state_reached_cheaper() {
    init_logging();
    let mut generator = Detour { expanded: Vec::new() };
    let mut manager = BasicManager::new();

    let outcome = AStarSolver::new()
        .solve_graph(detour_start(), &(), &StoredEstimate, &mut generator, &mut manager)
        .unwrap();

    assert!(outcome.is_goal_found());
    // A is expanded at cost 4, then reopened and expanded again at cost 2.
    assert_eq!(generator.expanded, ["S", "A", "B", "A"]);
    assert_cheapest_detour(&manager);
}

#[test]
fn test_rbfs_inherits_parent_f_on_detour() {
    init_logging();
    let mut generator = Detour { expanded: Vec::new() };
    let mut manager = BasicManager::new();

    let outcome = RbfsSolver::new()
        .solve(detour_start(), &(), &StoredEstimate, &mut generator, &mut manager)
        .unwrap();

    // A backs up 7 through G. Below B the second A gets f = max(5, 2 + 0) = 5
    // from its parent and is expanded again within the bound 7.
    assert_eq!(outcome.termination, Termination::GoalFound);
    assert_eq!(generator.expanded, ["S", "A", "B", "A"]);
    assert_eq!(outcome.stats.expanded, 4);
    assert_cheapest_detour(&manager);
}

// Failing collaborators

#[derive(Debug, thiserror::Error)]
#[error("generator broke on {0}")]
struct Broken(&'static str);

struct BreaksOn(&'static str, TableGenerator);

impl Generator<Dummy, ()> for BreaksOn {
    type Error = Broken;

    fn expand(&mut self, node: &Dummy, context: &()) -> Result<Vec<Dummy>, Broken> {
        if node.name == self.0 {
            return Err(Broken(self.0));
        }
        Ok(self.1.expand(node, context).unwrap_or_default())
    }
}

/// A failed search leaves the solution accepted before it untouched.
fn assert_kept_earlier_solution(manager: &BasicManager<Dummy>) {
    assert_eq!(manager.accepted(), 1);
    let solution = manager.solution().unwrap();
    assert_eq!(solution.node().name, "Z");
    assert_eq!(solution.cost(), DoubleCost::new(9.0).unwrap());
    assert!(!solution.is_optimal());
}

#[test]
fn test_generator_error_propagates() {
    let (start, generator) = scenario();
    let mut generator = BreaksOn("d", generator);
    let mut manager = BasicManager::new();
    manager.accept_solution(Solution::new(dummy("Z", 9.0, 0.0, true), false));

    let err = RbfsSolver::new()
        .solve(
            InformedSearchNode::new(start, DoubleCost::new(0.0).unwrap()),
            &(),
            &StoredEstimate,
            &mut generator,
            &mut manager,
        )
        .unwrap_err();

    assert!(matches!(err, SearchError::Generator { depth: 1, .. }));
    assert_eq!(err.source().unwrap().to_string(), "generator broke on d");
    assert_kept_earlier_solution(&manager);
}

struct RefusesGoals;

impl Heuristic<Dummy, ()> for RefusesGoals {
    type Error = &'static str;

    fn estimate_remaining_cost(&self, node: &Dummy, _: &()) -> Result<DoubleCost, &'static str> {
        if node.goal {
            Err("cannot estimate goals")
        } else {
            Ok(node.h)
        }
    }
}

#[test]
fn test_heuristic_error_propagates() {
    let (start, mut generator) = scenario();
    let mut manager = BasicManager::new();
    manager.accept_solution(Solution::new(dummy("Z", 9.0, 0.0, true), false));

    let err = AStarSolver::new()
        .solve(
            InformedSearchNode::new(start, DoubleCost::new(0.0).unwrap()),
            &(),
            &RefusesGoals,
            &mut generator,
            &mut manager,
        )
        .unwrap_err();

    // b is expanded first and its only successor is the goal H.
    assert!(matches!(err, SearchError::Heuristic { depth: 2, .. }));
    assert_eq!(err.source().unwrap().to_string(), "cannot estimate goals");
    assert_kept_earlier_solution(&manager);
}

// 8-puzzle

type Tiles = [u8; 9];

const SOLVED: Tiles = [1, 2, 3, 4, 5, 6, 7, 8, 0];

#[derive(Debug, Clone, PartialEq)]
struct Puzzle {
    tiles: Tiles,
    moves: u32,
}

impl SearchNode for Puzzle {
    type Cost = u32;

    fn cost(&self) -> u32 {
        self.moves
    }

    fn is_goal(&self) -> bool {
        self.tiles == SOLVED
    }
}

impl StateSearchNode for Puzzle {
    type State = Tiles;

    fn search_space_state(&self) -> Tiles {
        self.tiles
    }
}

fn neighbours(blank: usize) -> impl Iterator<Item = usize> {
    let (row, col) = (blank / 3, blank % 3);
    [
        (row > 0).then(|| blank - 3),
        (row < 2).then(|| blank + 3),
        (col > 0).then(|| blank - 1),
        (col < 2).then(|| blank + 1),
    ]
    .into_iter()
    .flatten()
}

fn slide(tiles: &Tiles) -> Vec<Tiles> {
    let blank = tiles.iter().position(|&t| t == 0).unwrap_or(0);
    neighbours(blank)
        .map(|target| {
            let mut next = *tiles;
            next.swap(blank, target);
            next
        })
        .collect()
}

struct Slides;

impl Generator<Puzzle, Tiles> for Slides {
    type Error = Infallible;

    fn expand(&mut self, node: &Puzzle, _: &Tiles) -> Result<Vec<Puzzle>, Infallible> {
        Ok(slide(&node.tiles)
            .into_iter()
            .map(|tiles| Puzzle {
                tiles,
                moves: node.moves + 1,
            })
            .collect())
    }
}

/// Sum of the distances of every tile to its place in the target.
struct Manhattan;

impl Heuristic<Puzzle, Tiles> for Manhattan {
    type Error = Infallible;

    fn estimate_remaining_cost(&self, node: &Puzzle, target: &Tiles) -> Result<u32, Infallible> {
        let mut estimate = 0;
        for (index, &tile) in node.tiles.iter().enumerate() {
            if tile == 0 {
                continue;
            }
            let goal = target.iter().position(|&t| t == tile).unwrap_or(index);
            estimate += (index / 3).abs_diff(goal / 3) + (index % 3).abs_diff(goal % 3);
        }
        Ok(estimate as u32)
    }
}

/// Scrambles the solved board with a fixed walk of the blank.
fn scrambled(steps: usize) -> Puzzle {
    let mut tiles = SOLVED;
    let mut previous = None;
    for step in 0..steps {
        let blank = tiles.iter().position(|&t| t == 0).unwrap_or(0);
        let options: Vec<usize> = neighbours(blank).filter(|&n| Some(n) != previous).collect();
        let target = options[(step * 7 + 3) % options.len()];
        tiles.swap(blank, target);
        previous = Some(blank);
    }
    Puzzle { tiles, moves: 0 }
}

fn shortest_solution(start: &Tiles) -> u32 {
    let mut seen = HashSet::from([*start]);
    let mut queue = VecDeque::from([(*start, 0)]);
    while let Some((tiles, moves)) = queue.pop_front() {
        if tiles == SOLVED {
            return moves;
        }
        for next in slide(&tiles) {
            if seen.insert(next) {
                queue.push_back((next, moves + 1));
            }
        }
    }
    u32::MAX
}

#[test]
fn test_puzzle_solved_optimally_by_every_solver() {
    init_logging();
    for steps in [0, 5, 12, 20] {
        let puzzle = scrambled(steps);
        let expected = shortest_solution(&puzzle.tiles);
        assert!(expected <= steps as u32);
        let start = || InformedSearchNode::evaluate(puzzle.clone(), &Manhattan, &SOLVED).unwrap();

        let mut rbfs = BasicManager::new();
        let outcome = RbfsSolver::new()
            .solve(start(), &SOLVED, &Manhattan, &mut Slides, &mut rbfs)
            .unwrap();
        assert!(outcome.is_goal_found());
        assert_eq!(rbfs.solution().unwrap().cost(), expected, "rbfs, {steps} steps");

        let mut tree = BasicManager::new();
        AStarSolver::new()
            .solve(start(), &SOLVED, &Manhattan, &mut Slides, &mut tree)
            .unwrap();
        assert_eq!(tree.solution().unwrap().cost(), expected, "astar, {steps} steps");

        let mut graph = BasicManager::new();
        let outcome = AStarSolver::new()
            .solve_graph(start(), &SOLVED, &Manhattan, &mut Slides, &mut graph)
            .unwrap();
        assert_eq!(graph.solution().unwrap().cost(), expected, "graph, {steps} steps");
        assert!(graph.solution().unwrap().is_optimal());
        assert!(outcome.stats.generated >= outcome.stats.expanded);
    }
}

#[test]
fn test_graph_search_expands_each_state_once() {
    let puzzle = scrambled(12);
    let mut manager = BasicManager::new();
    let outcome = AStarSolver::new()
        .solve_graph(
            InformedSearchNode::new(puzzle, 0),
            &SOLVED,
            &ZeroHeuristic,
            &mut Slides,
            &mut manager,
        )
        .unwrap();

    assert!(outcome.is_goal_found());
    // 9!/2 reachable boards bound the number of expansions.
    assert!(outcome.stats.expanded <= 181_440);
    assert_eq!(
        manager.solution().unwrap().cost(),
        shortest_solution(&scrambled(12).tiles)
    );
}

#[test]
fn test_expansion_limit_reports_no_solution() {
    let puzzle = scrambled(20);
    let mut manager = BasicManager::new();
    let solver = AStarSolver::with_config(SolverConfig::new().max_expansions(3));
    let outcome = solver
        .solve(
            InformedSearchNode::new(puzzle, 0),
            &SOLVED,
            &ZeroHeuristic,
            &mut Slides,
            &mut manager,
        )
        .unwrap();

    if shortest_solution(&scrambled(20).tiles) > 2 {
        assert_eq!(outcome.termination, Termination::ExpansionLimit);
        assert_eq!(outcome.stats.expanded, 3);
        assert!(manager.solution().is_none());
    }
}

#[test]
fn test_unsolvable_puzzle_is_exhausted() {
    // Swapping two tiles makes the board unsolvable; graph search covers all
    // reachable boards and gives up.
    let mut tiles = SOLVED;
    tiles.swap(0, 1);
    let mut manager = BasicManager::new();
    let outcome = AStarSolver::new()
        .solve_graph(
            InformedSearchNode::new(Puzzle { tiles, moves: 0 }, 0),
            &SOLVED,
            &Manhattan,
            &mut Slides,
            &mut manager,
        )
        .unwrap();

    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_eq!(outcome.stats.expanded, 181_440);
    assert!(manager.solution().is_none());
}
