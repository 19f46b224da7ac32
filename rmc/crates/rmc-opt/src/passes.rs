//! The optimizer: constant propagation, constant folding, copy propagation
//! (Pass A) and liveness-driven dead-code elimination (Pass B).
//!
//! Pass A is driven by reaching definitions. For an operand naming a
//! variable `v` at instruction `i` in block `B`, resolution first scans `B`
//! backwards from `i` for the nearest prior definition of `v` (and gives up
//! if that definition is not a plain copy), then falls back to IN[B]: if
//! exactly one definition of `v` reaches the block, resolution continues
//! through it. More than one reaching definition means no substitution.
//! Rewrites never cross a control boundary except through that
//! single-definition gate.
//!
//! Pass B recomputes liveness, marks dead assignments, deletes them from
//! block and stream, and repeats until nothing is marked. Array reads and
//! writes are never deleted.
//!
//! The outer loop alternates the passes to a fixed point. Five productive
//! iterations are more than any surface program needs; a sixth means a
//! non-monotonic bug, reported as an internal error.

use crate::block::{BlockId, FlowGraph};
use crate::cfg::build_flow_graph;
use crate::error::OptError;
use crate::liveness::live_variables;
use crate::reaching::{reaching_definitions, ReachingSets};
use rmc_ir::{is_bool_literal, is_constant, is_int_literal, InstrId, TacInstr, TacProgram};
use rmc_sem::SymbolTable;
use rmc_util::{FxHashSet, IndexVec};

/// Outer-loop iteration bound; exceeding it is an internal error.
pub const MAX_OPT_ITERATIONS: usize = 5;

/// Runs the optimizer to a fixed point over the instruction stream.
pub fn optimize(program: &mut TacProgram, table: &SymbolTable) -> Result<(), OptError> {
    for iteration in 0..=MAX_OPT_ITERATIONS {
        let changed_a = pass_a(program, table)?;
        let changed_b = pass_b(program, table)?;
        if !changed_a && !changed_b {
            return Ok(());
        }
        if iteration == MAX_OPT_ITERATIONS {
            return Err(OptError::FixedPointNotReached);
        }
    }
    unreachable!("loop exits by return")
}

// ---------------------------------------------------------------------------
// Pass A
// ---------------------------------------------------------------------------

/// Operand slots an instruction can have rewritten.
#[derive(Clone, Copy)]
enum Slot {
    Arg,
    Arg1,
    Arg2,
}

fn operand(instr: &TacInstr, slot: Slot) -> &str {
    match (instr, slot) {
        (TacInstr::Assign { arg, .. }, Slot::Arg) => arg,
        (TacInstr::UnOp { arg, .. }, Slot::Arg) => arg,
        (TacInstr::BinOp { arg1, .. }, Slot::Arg1) => arg1,
        (TacInstr::BinOp { arg2, .. }, Slot::Arg2) => arg2,
        _ => unreachable!("slot does not exist on this instruction"),
    }
}

fn set_operand(instr: &mut TacInstr, slot: Slot, value: String) {
    match (instr, slot) {
        (TacInstr::Assign { arg, .. }, Slot::Arg) => *arg = value,
        (TacInstr::UnOp { arg, .. }, Slot::Arg) => *arg = value,
        (TacInstr::BinOp { arg1, .. }, Slot::Arg1) => *arg1 = value,
        (TacInstr::BinOp { arg2, .. }, Slot::Arg2) => *arg2 = value,
        _ => unreachable!("slot does not exist on this instruction"),
    }
}

/// Slots carrying a rewritable source operand for this instruction kind.
fn rewritable_slots(instr: &TacInstr) -> &'static [Slot] {
    match instr {
        TacInstr::Assign { .. } | TacInstr::UnOp { .. } => &[Slot::Arg],
        TacInstr::BinOp { .. } => &[Slot::Arg1, Slot::Arg2],
        _ => &[],
    }
}

fn pass_a(program: &mut TacProgram, table: &SymbolTable) -> Result<bool, OptError> {
    // Pass A never adds or removes instructions, so blocks and reaching
    // sets stay valid across its sweeps: folding turns a binop into an
    // assign under the same id, defining the same name.
    let graph = build_flow_graph(program)?;
    let reaching = reaching_definitions(program, &graph)?;

    // Each round of the three sweeps folds at least one more level of a
    // constant expression tree, so the stream length bounds the rounds a
    // converging run can need.
    let bound = program.len() + 2;
    let mut any = false;
    for _ in 0..bound {
        let mut changed = false;
        changed |= constant_propagation(program, &graph, &reaching);
        changed |= constant_folding(program, &graph);
        changed |= copy_propagation(program, &graph, &reaching, table);
        if !changed {
            return Ok(any);
        }
        any = true;
    }
    Err(OptError::FixedPointNotReached)
}

/// Rewrites variable operands that resolve to a single constant value.
fn constant_propagation(
    program: &mut TacProgram,
    graph: &FlowGraph,
    reaching: &IndexVec<BlockId, ReachingSets>,
) -> bool {
    let mut changed = false;
    for (bid, block) in graph.blocks.iter_enumerated() {
        for (pos, &id) in block.instrs.iter().enumerate() {
            for &slot in rewritable_slots(program.instr(id)) {
                let name = operand(program.instr(id), slot).to_string();
                if is_constant(&name) {
                    continue;
                }
                let mut visited = FxHashSet::default();
                if let Some(value) =
                    resolve_const(program, graph, reaching, bid, pos, &name, &mut visited)
                {
                    set_operand(program.instr_mut(id), slot, value);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Resolves `var` at `(block, pos)` to a constant, or `None`.
fn resolve_const(
    program: &TacProgram,
    graph: &FlowGraph,
    reaching: &IndexVec<BlockId, ReachingSets>,
    block: BlockId,
    pos: usize,
    var: &str,
    visited: &mut FxHashSet<String>,
) -> Option<String> {
    if !visited.insert(var.to_string()) {
        return None;
    }

    // Nearest prior definition inside the block. Anything but a plain copy
    // ends the search.
    let instrs = &graph.blocks[block].instrs;
    for p in (0..pos).rev() {
        let instr = program.instr(instrs[p]);
        if instr.defined_name() != Some(var) {
            continue;
        }
        return match instr {
            TacInstr::Assign { arg, .. } if is_constant(arg) => Some(arg.clone()),
            TacInstr::Assign { arg, .. } => {
                let arg = arg.clone();
                resolve_const(program, graph, reaching, block, p, &arg, visited)
            }
            _ => None,
        };
    }

    // Otherwise consult the definitions reaching the block: exactly one
    // definition of `var` may reach, and it must be a plain copy.
    let mut found: Option<InstrId> = None;
    let mut incoming = 0usize;
    for &def in &reaching[block].inn {
        if program.instr(def).defined_name() == Some(var) {
            incoming += 1;
            found = Some(def);
        }
    }
    let def = match (incoming, found) {
        (1, Some(def)) => def,
        _ => return None,
    };
    match program.instr(def) {
        TacInstr::Assign { arg, .. } if is_constant(arg) => Some(arg.clone()),
        TacInstr::Assign { arg, .. } => {
            let (def_block, def_pos) = graph.location(def)?;
            let arg = arg.clone();
            resolve_const(program, graph, reaching, def_block, def_pos, &arg, visited)
        }
        _ => None,
    }
}

/// Evaluates operators whose operands became constants.
fn constant_folding(program: &mut TacProgram, graph: &FlowGraph) -> bool {
    let mut changed = false;
    for block in graph.blocks.iter() {
        for &id in &block.instrs {
            let folded = match program.instr(id) {
                TacInstr::BinOp {
                    result,
                    arg1,
                    op,
                    arg2,
                } if is_constant(arg1) && is_constant(arg2) => {
                    fold_binop(op, arg1, arg2).map(|value| (result.clone(), value))
                }
                TacInstr::UnOp { result, op, arg } if op == "!" && is_bool_literal(arg) => {
                    let value = if arg == "true" { "false" } else { "true" };
                    Some((result.clone(), value.to_string()))
                }
                _ => None,
            };

            if let Some((result, value)) = folded {
                *program.instr_mut(id) = TacInstr::Assign { result, arg: value };
                changed = true;
            }
        }
    }
    changed
}

/// Compile-time evaluation of a binary operator on two constants.
fn fold_binop(op: &str, arg1: &str, arg2: &str) -> Option<String> {
    if is_int_literal(arg1) && is_int_literal(arg2) {
        let a: i64 = arg1.parse().ok()?;
        let b: i64 = arg2.parse().ok()?;
        let folded = match op {
            "+" => Some(a.wrapping_add(b).to_string()),
            "-" => Some(a.wrapping_sub(b).to_string()),
            "*" => Some(a.wrapping_mul(b).to_string()),
            // A propagated zero divisor is left for the hardware to trap.
            "/" if b != 0 => Some((a / b).to_string()),
            "/" => return None,
            ">" => Some((a > b).to_string()),
            "<" => Some((a < b).to_string()),
            ">=" => Some((a >= b).to_string()),
            "<=" => Some((a <= b).to_string()),
            _ => None,
        };
        if let Some(folded) = folded {
            return Some(folded);
        }
    }

    // Equality and logic fold by value on the remaining constant forms.
    match op {
        "&&" => Some((arg1 == "true" && arg2 == "true").to_string()),
        "||" => Some((!(arg1 == "false" && arg2 == "false")).to_string()),
        "==" => Some((arg1 == arg2).to_string()),
        "!=" => Some((arg1 != arg2).to_string()),
        _ => None,
    }
}

/// Rewrites copy chains: an operand resolving to another variable with the
/// same value takes that variable's name.
fn copy_propagation(
    program: &mut TacProgram,
    graph: &FlowGraph,
    reaching: &IndexVec<BlockId, ReachingSets>,
    table: &SymbolTable,
) -> bool {
    let mut changed = false;
    for (bid, block) in graph.blocks.iter_enumerated() {
        for (pos, &id) in block.instrs.iter().enumerate() {
            for &slot in rewritable_slots(program.instr(id)) {
                let name = operand(program.instr(id), slot).to_string();
                if is_constant(&name) || !rmc_ir::is_variable(&name, table) {
                    continue;
                }
                if let Some(source) = resolve_copy(program, graph, reaching, bid, pos, &name) {
                    if source != name {
                        set_operand(program.instr_mut(id), slot, source);
                        changed = true;
                    }
                }
            }
        }
    }
    changed
}

/// Resolves `var` to the variable it is a copy of, or `None`.
///
/// The substitution is refused when the copy source is redefined between
/// the copy and the use; the two names must still hold the same value at
/// the use point.
fn resolve_copy(
    program: &TacProgram,
    graph: &FlowGraph,
    reaching: &IndexVec<BlockId, ReachingSets>,
    block: BlockId,
    pos: usize,
    var: &str,
) -> Option<String> {
    let instrs = &graph.blocks[block].instrs;

    let source_redefined = |source: &str, from: usize, to: usize| {
        (from..to).any(|q| program.instr(instrs[q]).defined_name() == Some(source))
    };

    // Nearest prior definition inside the block.
    for p in (0..pos).rev() {
        let instr = program.instr(instrs[p]);
        if instr.defined_name() != Some(var) {
            continue;
        }
        return match instr {
            TacInstr::Assign { arg, .. }
                if !is_constant(arg) && !source_redefined(arg, p + 1, pos) =>
            {
                Some(arg.clone())
            }
            _ => None,
        };
    }

    // Single reaching definition from outside the block.
    let mut found: Option<InstrId> = None;
    let mut incoming = 0usize;
    for &def in &reaching[block].inn {
        if program.instr(def).defined_name() == Some(var) {
            incoming += 1;
            found = Some(def);
        }
    }
    let def = match (incoming, found) {
        (1, Some(def)) => def,
        _ => return None,
    };
    match program.instr(def) {
        TacInstr::Assign { arg, .. } if !is_constant(arg) => {
            // The source must not be redefined in this block before the use.
            if source_redefined(arg, 0, pos) {
                return None;
            }
            Some(arg.clone())
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Pass B
// ---------------------------------------------------------------------------

fn pass_b(program: &mut TacProgram, table: &SymbolTable) -> Result<bool, OptError> {
    let mut any_deleted = false;
    loop {
        let graph = build_flow_graph(program)?;
        let live = live_variables(program, &graph, table)?;

        let mut marked: Vec<InstrId> = Vec::new();
        for (bid, block) in graph.blocks.iter_enumerated() {
            for (pos, &id) in block.instrs.iter().enumerate() {
                let instr = program.instr(id);
                if !instr.is_assignment_kind() {
                    continue;
                }
                // Array operations are treated as side-effectful.
                if matches!(
                    instr,
                    TacInstr::ArrayRead { .. } | TacInstr::ArrayWrite { .. }
                ) {
                    continue;
                }
                let Some(name) = instr.defined_name() else {
                    continue;
                };

                if live[bid].out.contains(name) || live[bid].inn.contains(name) {
                    continue;
                }
                let used_later = block.instrs[pos + 1..].iter().any(|&later| {
                    program
                        .instr(later)
                        .used_operands()
                        .iter()
                        .any(|used| *used == name)
                });
                if used_later {
                    continue;
                }

                marked.push(id);
            }
        }

        if marked.is_empty() {
            return Ok(any_deleted);
        }
        any_deleted = true;
        for id in marked {
            program.remove(id);
        }
    }
}
