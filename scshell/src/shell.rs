//! Line-oriented command interpreter over [`svql_subgraph`].
//!
//! One [`Shell`] owns a [`Solver`] plus the small amount of extra state the
//! command language needs on top of it: the graph block currently being
//! assembled, pending `initmap` entries, and the buffer of matches
//! accumulated since the last `expect`.

use std::collections::HashMap;
use std::io::Write;

use svql_subgraph::{GraphBuilder, MatchResult, MineResult, Solver};
use tracing::{info, warn};

use crate::error::ShellError;

/// State accumulated while reading `node`/`connect`/`constant`/`extern`
/// commands between a `graph <name>` line and its matching `endgraph`.
struct OpenGraph {
    name: String,
    builder: GraphBuilder,
}

/// Interprets the command language against one [`Solver`].
pub struct Shell<'a, W: Write> {
    solver: Solver,
    out: &'a mut W,
    open_graph: Option<OpenGraph>,
    initial_mappings: HashMap<String, Vec<String>>,
    pending: Vec<MatchResult>,
    line_no: usize,
}

impl<'a, W: Write> Shell<'a, W> {
    /// Creates a shell writing its output to `out`.
    pub fn new(out: &'a mut W) -> Self {
        Self {
            solver: Solver::new(),
            out,
            open_graph: None,
            initial_mappings: HashMap::new(),
            pending: Vec::new(),
            line_no: 0,
        }
    }

    /// Feeds every line of `input` through [`Shell::run_line`] in order.
    ///
    /// Returns `true` if the run should exit with status 0, `false` for
    /// status 1 (an `expect` mismatch was seen). [`ShellError::Parse`]
    /// failures are reported to stderr and execution continues with the next
    /// line; an [`ShellError::ExpectMismatch`] stops the run immediately.
    pub fn run<R: std::io::BufRead>(&mut self, input: R) -> bool {
        for line in input.lines() {
            self.line_no += 1;
            let Ok(line) = line else {
                eprintln!("line {}: failed to read line", self.line_no);
                continue;
            };
            match self.run_line(&line) {
                Ok(()) => {}
                Err(ShellError::ExpectMismatch { expected, actual }) => {
                    eprintln!(
                        "line {}: expect mismatch: expected {expected}, got {actual}",
                        self.line_no
                    );
                    return false;
                }
                Err(err @ ShellError::Parse { .. }) => {
                    eprintln!("{err}");
                }
            }
        }
        true
    }

    fn run_line(&mut self, raw: &str) -> Result<(), ShellError> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let mut tokens = line.split_whitespace();
        let Some(cmd) = tokens.next() else {
            return Ok(());
        };
        let rest: Vec<&str> = tokens.collect();

        if self.open_graph.is_some() {
            let open = self.open_graph.as_mut().expect("checked above");
            let finished = run_graph_line(open, cmd, &rest, self.line_no)?;
            if finished {
                let open = self.open_graph.take().expect("checked above");
                self.finish_graph(open);
            }
            return Ok(());
        }

        match cmd {
            "graph" => {
                let [name] = require_n(&rest, self.line_no)?;
                self.open_graph = Some(OpenGraph {
                    name: name.to_string(),
                    builder: GraphBuilder::new(),
                });
                Ok(())
            }
            "compatible" => {
                let [needle_type, haystack_type] = require_n(&rest, self.line_no)?;
                self.solver
                    .config_mut()
                    .add_compatible_types(needle_type, haystack_type);
                Ok(())
            }
            "constcompat" => {
                let [needle_char, haystack_char] = require_n(&rest, self.line_no)?;
                let (nc, hc) = (parse_char(needle_char, self.line_no)?, parse_char(haystack_char, self.line_no)?);
                self.solver.config_mut().add_compatible_constants(nc, hc);
                Ok(())
            }
            "swapgroup" => {
                if rest.len() < 3 {
                    return Err(parse_err(self.line_no, "swapgroup requires a type and >= 2 ports"));
                }
                let type_name = rest[0];
                let ports: Vec<String> = rest[1..].iter().map(|s| s.to_string()).collect();
                self.solver
                    .config_mut()
                    .add_swappable_ports(type_name, ports)
                    .map_err(|e| parse_err(self.line_no, &e.to_string()))
            }
            "swapperm" => {
                let sep = rest
                    .iter()
                    .position(|t| *t == ":")
                    .ok_or_else(|| parse_err(self.line_no, "swapperm requires a ':' separator"))?;
                if sep == 0 {
                    return Err(parse_err(self.line_no, "swapperm requires a type before the port lists"));
                }
                let type_name = rest[0];
                let lhs: Vec<String> = rest[1..sep].iter().map(|s| s.to_string()).collect();
                let rhs: Vec<String> = rest[sep + 1..].iter().map(|s| s.to_string()).collect();
                self.solver
                    .config_mut()
                    .add_swappable_ports_permutation(type_name, lhs, rhs)
                    .map_err(|e| parse_err(self.line_no, &e.to_string()))
            }
            "initmap" => {
                if rest.len() < 2 {
                    return Err(parse_err(self.line_no, "initmap requires a needle node and >= 1 haystack node"));
                }
                let needle_node = rest[0].to_string();
                let haystack_nodes: Vec<String> = rest[1..].iter().map(|s| s.to_string()).collect();
                self.initial_mappings.insert(needle_node, haystack_nodes);
                Ok(())
            }
            "solve" => self.cmd_solve(&rest),
            "mine" => self.cmd_mine(&rest),
            "expect" => self.cmd_expect(&rest),
            "clearoverlap" => {
                self.solver.clear_overlap_history();
                Ok(())
            }
            "clearconfig" => {
                self.solver.config_mut().clear_config();
                Ok(())
            }
            "verbose" => {
                self.solver.set_verbose(true);
                Ok(())
            }
            other => Err(parse_err(self.line_no, &format!("unrecognized command '{other}'"))),
        }
    }

    fn cmd_solve(&mut self, rest: &[&str]) -> Result<(), ShellError> {
        if rest.len() < 2 || rest.len() > 4 {
            return Err(parse_err(self.line_no, "solve requires <needle> <haystack> [allow_overlap [max_solutions]]"));
        }
        let needle = rest[0];
        let haystack = rest[1];
        let allow_overlap = match rest.get(2) {
            Some(s) => parse_bool(s, self.line_no)?,
            None => true,
        };
        let max_solutions = match rest.get(3) {
            Some(s) => {
                let n: i64 = s
                    .parse()
                    .map_err(|_| parse_err(self.line_no, &format!("invalid max_solutions '{s}'")))?;
                if n < 0 { None } else { Some(n as usize) }
            }
            None => None,
        };

        let initial_mappings = std::mem::take(&mut self.initial_mappings);
        let mut results = Vec::new();
        svql_subgraph::solve(
            &mut self.solver,
            &mut results,
            needle,
            haystack,
            allow_overlap,
            max_solutions,
            &initial_mappings,
        )
        .map_err(|e| parse_err(self.line_no, &e.to_string()))?;

        info!(needle = needle, haystack = haystack, found = results.len(), "solve finished");
        self.pending.extend(results);
        Ok(())
    }

    fn cmd_mine(&mut self, rest: &[&str]) -> Result<(), ShellError> {
        if rest.len() < 3 || rest.len() > 4 {
            return Err(parse_err(self.line_no, "mine requires <min_nodes> <max_nodes> <min_matches> [per_graph_cap]"));
        }
        let min_nodes: usize = rest[0].parse().map_err(|_| parse_err(self.line_no, "invalid min_nodes"))?;
        let max_nodes: usize = rest[1].parse().map_err(|_| parse_err(self.line_no, "invalid max_nodes"))?;
        let min_matches: usize = rest[2].parse().map_err(|_| parse_err(self.line_no, "invalid min_matches"))?;
        let per_graph_cap: Option<usize> = match rest.get(3) {
            Some(s) => Some(s.parse().map_err(|_| parse_err(self.line_no, "invalid per_graph_cap"))?),
            None => None,
        };

        let result: MineResult = svql_subgraph::mine(&mut self.solver, min_nodes, max_nodes, min_matches, per_graph_cap);
        if result.candidates.is_empty() {
            let _ = writeln!(self.out, "(no candidates met the threshold)");
        } else {
            let _ = writeln!(self.out, "{result}");
        }
        Ok(())
    }

    fn cmd_expect(&mut self, rest: &[&str]) -> Result<(), ShellError> {
        let [n] = require_n(rest, self.line_no)?;
        let expected: usize = n.parse().map_err(|_| parse_err(self.line_no, &format!("invalid expect count '{n}'")))?;

        for (i, result) in self.pending.iter().enumerate() {
            let _ = writeln!(self.out, "Match #{}: ({} in {})", i + 1, result.needle, result.haystack);
            for node in &result.nodes {
                let _ = write!(self.out, "  {} -> {} ", node.needle_node, node.haystack_node);
                let ports: Vec<String> = node
                    .port_map
                    .iter()
                    .map(|(np, hp)| format!("{np}:{hp}"))
                    .collect();
                let _ = writeln!(self.out, "{}", ports.join(" "));
            }
        }

        let actual = self.pending.len();
        self.pending.clear();
        if actual != expected {
            return Err(ShellError::ExpectMismatch { expected, actual });
        }
        Ok(())
    }

    fn finish_graph(&mut self, open: OpenGraph) {
        let graph = open.builder.freeze();
        if let Err(err) = self.solver.add_graph(open.name.clone(), graph) {
            warn!(graph = open.name, error = %err, "failed to register graph");
            eprintln!("line {}: {err}", self.line_no);
        }
    }
}

fn require_n<'a, const N: usize>(rest: &'a [&'a str], line: usize) -> Result<[&'a str; N], ShellError> {
    rest.try_into()
        .map_err(|_| parse_err(line, &format!("expected exactly {N} argument(s), got {}", rest.len())))
}

fn parse_err(line: usize, reason: &str) -> ShellError {
    ShellError::Parse {
        line,
        reason: reason.to_string(),
    }
}

fn parse_bool(token: &str, line: usize) -> Result<bool, ShellError> {
    match token {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(parse_err(line, &format!("invalid boolean '{other}'"))),
    }
}

fn parse_char(token: &str, line: usize) -> Result<char, ShellError> {
    let mut chars = token.chars();
    let c = chars
        .next()
        .ok_or_else(|| parse_err(line, "expected a single character"))?;
    if chars.next().is_some() {
        return Err(parse_err(line, &format!("expected a single character, got '{token}'")));
    }
    Ok(c)
}

/// Runs one line of the `graph <name> ... endgraph` block.
///
/// Returns `Ok(true)` when `endgraph` closes the block, `Ok(false)` otherwise.
///
/// The command language's `node <name> (<port> <width> [<min_width>])+`
/// grammar omits the node's type, which `GraphBuilder::create_node` requires.
/// This implementation takes the type as the second token (`node <name>
/// <type> (<port> <width> [<min_width>])+`); see DESIGN.md for the recorded
/// decision.
fn run_graph_line(open: &mut OpenGraph, cmd: &str, rest: &[&str], line: usize) -> Result<bool, ShellError> {
    match cmd {
        "endgraph" => Ok(true),
        "node" => {
            if rest.len() < 2 {
                return Err(parse_err(line, "node requires a name and a type"));
            }
            let name = rest[0];
            let type_name = rest[1];
            open.builder
                .create_node(name, type_name, None, false)
                .map_err(|e| parse_err(line, &e.to_string()))?;

            let mut i = 2;
            while i < rest.len() {
                let port_name = rest[i];
                let width: u32 = rest
                    .get(i + 1)
                    .ok_or_else(|| parse_err(line, "port is missing a width"))?
                    .parse()
                    .map_err(|_| parse_err(line, "invalid port width"))?;
                let (min_width, consumed) = match rest.get(i + 2).and_then(|t| t.parse::<u32>().ok()) {
                    Some(mw) => (Some(mw), 3),
                    None => (None, 2),
                };
                open.builder
                    .create_port(name, port_name, width, min_width)
                    .map_err(|e| parse_err(line, &e.to_string()))?;
                i += consumed;
            }
            Ok(false)
        }
        "connect" => {
            match rest.len() {
                4 => {
                    open.builder
                        .create_connection(rest[0], rest[1], rest[2], rest[3])
                        .map_err(|e| parse_err(line, &e.to_string()))?;
                }
                6 | 7 => {
                    let bit_a: u32 = rest[2].parse().map_err(|_| parse_err(line, "invalid bit_a"))?;
                    let bit_b: u32 = rest[5].parse().map_err(|_| parse_err(line, "invalid bit_b"))?;
                    let width: u32 = match rest.get(6) {
                        Some(w) => w.parse().map_err(|_| parse_err(line, "invalid width"))?,
                        None => 1,
                    };
                    open.builder
                        .create_bit_connection(rest[0], rest[1], bit_a, rest[3], rest[4], bit_b, width)
                        .map_err(|e| parse_err(line, &e.to_string()))?;
                }
                _ => return Err(parse_err(line, "connect takes 4 (whole-port) or 6-7 (bit-slice) arguments")),
            }
            Ok(false)
        }
        "constant" => {
            let (node, port, bit, value) = match rest.len() {
                3 => (rest[0], rest[1], 0u32, rest[2]),
                4 => {
                    let bit: u32 = rest[2].parse().map_err(|_| parse_err(line, "invalid bit"))?;
                    (rest[0], rest[1], bit, rest[3])
                }
                _ => return Err(parse_err(line, "constant requires <node> <port> [<bit>] <value>")),
            };
            let value = parse_char(value, line)?;
            open.builder
                .create_constant(node, port, bit, value)
                .map_err(|e| parse_err(line, &e.to_string()))?;
            Ok(false)
        }
        "extern" => {
            if rest.is_empty() {
                return Err(parse_err(line, "extern requires a node and >= 1 port"));
            }
            let node = rest[0];
            let mut i = 1;
            if i >= rest.len() {
                return Err(parse_err(line, "extern requires at least one port"));
            }
            while i < rest.len() {
                let port = rest[i];
                let bit = rest.get(i + 1).and_then(|t| t.parse::<u32>().ok());
                let consumed = if bit.is_some() { 2 } else { 1 };
                open.builder
                    .mark_extern(node, port, bit)
                    .map_err(|e| parse_err(line, &e.to_string()))?;
                i += consumed;
            }
            Ok(false)
        }
        "allextern" => {
            open.builder.mark_all_extern();
            Ok(false)
        }
        other => Err(parse_err(line, &format!("unrecognized graph-block command '{other}'"))),
    }
}
