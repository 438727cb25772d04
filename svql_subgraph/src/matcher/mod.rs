//! Public matching entry point: candidate-matrix construction, Ullmann-style
//! refinement, and most-constrained-node-first backtracking with port-swap
//! enumeration.
//!
//! This is the heart of the engine. Everything here works
//! on the frozen, integer-indexed [`Graph`] — string lookups happen only when
//! building the final [`MatchResult`].

mod assignment;
mod candidates;
mod containment;

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::SolveError;
use crate::graph::Graph;
use crate::ids::NodeIndex;
use crate::result::{MatchResult, NodeMatch};
use crate::solver::{Permutation, Solver};

use assignment::Assignment;

type CandidateMatrix = HashMap<NodeIndex, Vec<NodeIndex>>;

/// Read-only context shared by every recursion frame of a single `solve` call.
struct SolveCtx<'a> {
    needle: &'a Graph,
    haystack: &'a Graph,
    needle_id: &'a str,
    haystack_id: &'a str,
    perms: HashMap<String, Vec<Permutation>>,
    max_solutions: Option<usize>,
    allow_overlap: bool,
}

impl SolveCtx<'_> {
    /// `Π(type(n))` for a needle node, cached once per `solve` call.
    fn perms_for_needle_node(&self, n: NodeIndex) -> &[Permutation] {
        &self.perms[self.needle.node(n).type_name()]
    }
}

/// Mutable per-call search state: the current partial, injective
/// needle-to-haystack assignment (independent of the cross-call overlap
/// history) and the permutation committed for each assigned needle node.
struct SolveState {
    assignment: Assignment,
    perm_of: HashMap<NodeIndex, Permutation>,
}

impl SolveState {
    fn new() -> Self {
        Self {
            assignment: Assignment::new(),
            perm_of: HashMap::new(),
        }
    }
}

/// Appends zero or more [`MatchResult`]s describing every injective mapping
/// of `needle_id` onto `haystack_id` that the Ullmann-style matcher finds.
///
/// Stops early once `max_solutions` results have been appended in this call.
/// When `allow_overlap` is false, haystack nodes already recorded in
/// `solver`'s overlap history for `haystack_id` are excluded from the
/// candidate domain (unless individually marked shareable), and every
/// non-shareable haystack node used by a newly emitted match is recorded.
///
/// `initial_mappings` restricts the candidate domain of named needle nodes to
/// the given haystack node names, intersected with the ordinary compatibility
/// domain.
///
/// # Errors
/// Returns [`SolveError::UnknownGraph`] if either graph name is unregistered,
/// or [`SolveError::InitialMappingUnknownNode`] if `initial_mappings` names a
/// needle node that does not exist in `needle_id`.
pub fn solve(
    solver: &mut Solver,
    results: &mut Vec<MatchResult>,
    needle_id: &str,
    haystack_id: &str,
    allow_overlap: bool,
    max_solutions: Option<usize>,
    initial_mappings: &HashMap<String, Vec<String>>,
) -> Result<(), SolveError> {
    let needle = solver.clone_graph(needle_id)?;
    let haystack = solver.clone_graph(haystack_id)?;
    solve_on(
        solver,
        results,
        needle_id,
        &needle,
        haystack_id,
        &haystack,
        allow_overlap,
        max_solutions,
        initial_mappings,
    )
}

/// Same as [`solve`], but takes the needle/haystack graphs directly instead
/// of looking them up by name in `solver`'s registry.
///
/// Used by [`solve`] itself (after a registry lookup) and by
/// [`crate::miner::mine`], which matches synthesized candidate subgraphs that
/// are never registered on the solver.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_on(
    solver: &mut Solver,
    results: &mut Vec<MatchResult>,
    needle_id: &str,
    needle: &Graph,
    haystack_id: &str,
    haystack: &Graph,
    allow_overlap: bool,
    max_solutions: Option<usize>,
    initial_mappings: &HashMap<String, Vec<String>>,
) -> Result<(), SolveError> {
    let verbose = solver.is_verbose();

    let mut perms: HashMap<String, Vec<Permutation>> = HashMap::new();
    for n in needle.node_indices() {
        let type_name = needle.node(n).type_name().to_string();
        if !perms.contains_key(&type_name) {
            let computed = solver.config_mut().permutations_for(&type_name).to_vec();
            perms.insert(type_name, computed);
        }
    }

    let mut initial: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::new();
    for (needle_name, haystack_names) in initial_mappings {
        let n = needle
            .node_by_name(needle_name)
            .ok_or_else(|| SolveError::InitialMappingUnknownNode(needle_name.clone()))?;
        let set: HashSet<NodeIndex> = haystack_names
            .iter()
            .filter_map(|name| haystack.node_by_name(name))
            .collect();
        initial.insert(n, set);
    }

    let used_before = solver.used_nodes(haystack_id).cloned();
    let mut candidates = candidates::build(
        needle,
        haystack,
        solver.config(),
        &perms,
        allow_overlap,
        used_before.as_ref(),
        &initial,
    );
    candidates::refine(needle, haystack, &perms, &mut candidates, solver.hooks());

    debug!(
        needle = needle_id,
        haystack = haystack_id,
        nodes = needle.node_count(),
        "starting subgraph search"
    );

    let ctx = SolveCtx {
        needle,
        haystack,
        needle_id,
        haystack_id,
        perms,
        max_solutions,
        allow_overlap,
    };
    let mut state = SolveState::new();
    backtrack(solver, &ctx, &mut candidates, &mut state, results, verbose);

    Ok(())
}

/// Picks the unassigned needle node with the smallest nonempty candidate row
/// (ties broken by needle index).
fn choose_branch_node(needle: &Graph, candidates: &CandidateMatrix, assigned: &Assignment) -> Option<NodeIndex> {
    needle
        .node_indices()
        .filter(|n| !assigned.contains_needle(*n))
        .filter(|n| !candidates[n].is_empty())
        .min_by_key(|n| (candidates[n].len(), n.index()))
}

/// Finds the first permutation (identity tried first) under which
/// tentatively assigning `n -> h` is consistent with every
/// already-assigned needle neighbor of `n`.
fn first_consistent_perm(
    ctx: &SolveCtx<'_>,
    solver: &Solver,
    n: NodeIndex,
    h: NodeIndex,
    state: &SolveState,
) -> Option<Permutation> {
    let type_perms = ctx.perms_for_needle_node(n);
    let neighbors: Vec<(NodeIndex, NodeIndex)> = ctx
        .needle
        .neighbors(n)
        .filter_map(|(nn, _)| state.assignment.haystack_of(nn).map(|hh| (nn, hh)))
        .collect();

    'perm: for perm in type_perms {
        if !candidates::port_compatible(ctx.needle, n, ctx.haystack, h, perm) {
            continue;
        }
        if !solver.hooks().compare_nodes(ctx.needle, n, ctx.haystack, h) {
            continue;
        }
        if !containment::constants_ok(ctx.needle, n, ctx.haystack, h, perm, solver.config()) {
            continue;
        }
        for &(nn, hh) in &neighbors {
            let perm_nn = &state.perm_of[&nn];
            if !candidates::edge_consistent(ctx.needle, n, perm, nn, perm_nn, ctx.haystack, h, hh, solver.hooks()) {
                continue 'perm;
            }
        }
        return Some(perm.clone());
    }
    None
}

/// Builds the `MatchResult` for a complete assignment, in needle node
/// declaration order, with each node's full port map under its committed
/// permutation.
fn build_result(ctx: &SolveCtx<'_>, state: &SolveState) -> MatchResult {
    let mut nodes = Vec::with_capacity(state.assignment.len());
    for n in ctx.needle.node_indices() {
        let h = state.assignment.haystack_of(n).expect("every needle node is assigned once the search completes");
        let perm = &state.perm_of[&n];
        let port_map = ctx
            .needle
            .node(n)
            .ports()
            .iter()
            .map(|p| (p.name().to_string(), perm.apply(p.name()).to_string()))
            .collect();
        nodes.push(NodeMatch {
            needle_node: ctx.needle.node(n).name().to_string(),
            haystack_node: ctx.haystack.node(h).name().to_string(),
            port_map,
        });
    }
    MatchResult {
        needle: ctx.needle_id.to_string(),
        haystack: ctx.haystack_id.to_string(),
        nodes,
    }
}

#[allow(clippy::too_many_arguments)]
fn backtrack(
    solver: &mut Solver,
    ctx: &SolveCtx<'_>,
    candidates: &mut CandidateMatrix,
    state: &mut SolveState,
    results: &mut Vec<MatchResult>,
    verbose: bool,
) -> bool {
    if let Some(cap) = ctx.max_solutions {
        if results.len() >= cap {
            return true;
        }
    }

    let Some(n) = choose_branch_node(ctx.needle, candidates, &state.assignment) else {
        if state.assignment.len() < ctx.needle.node_count() {
            // Some needle node has an empty row but isn't assigned: dead branch.
            return false;
        }
        let assignment_map: HashMap<NodeIndex, NodeIndex> = state.assignment.pairs().collect();
        if !containment::containment_ok(ctx.needle, ctx.haystack, &assignment_map, &state.perm_of) {
            return false;
        }
        let result = build_result(ctx, state);
        if !solver.hooks().check_solution(&result) {
            return false;
        }
        if verbose {
            trace!(?result, "accepted match");
        }
        if !ctx.allow_overlap {
            let claimed: Vec<NodeIndex> = state
                .assignment
                .haystack_nodes()
                .filter(|&h| !ctx.haystack.node(h).is_shareable())
                .collect();
            solver.mark_used(ctx.haystack_id, claimed);
        }
        results.push(result);
        return ctx.max_solutions.is_some_and(|cap| results.len() >= cap);
    };

    let row = candidates[&n].clone();
    for h in row {
        if !state.assignment.haystack_is_free(h) {
            continue;
        }
        let Some(perm) = first_consistent_perm(ctx, solver, n, h, state) else {
            continue;
        };

        let snapshot = candidates.clone();
        state.assignment.insert(n, h);
        state.perm_of.insert(n, perm);
        candidates.insert(n, vec![h]);
        candidates::refine(ctx.needle, ctx.haystack, &ctx.perms, candidates, solver.hooks());

        let empty_row = ctx.needle.node_indices().any(|nn| candidates[&nn].is_empty() && !state.assignment.contains_needle(nn));
        let capped = if empty_row {
            false
        } else {
            backtrack(solver, ctx, candidates, state, results, verbose)
        };

        *candidates = snapshot;
        state.perm_of.remove(&n);
        state.assignment.remove(n);

        if capped {
            return true;
        }
    }
    false
}
