//! Live-variable analysis.
//!
//! Sets hold variable names: temporaries and declared symbols, never
//! literals. Per block, GEN holds the upward-exposed uses (used before any
//! redefinition inside the block) and KILL the names the block defines. An
//! array write kills nothing: mutating one element never makes the array
//! dead.
//!
//! The backward iteration adds two things to a block's OUT on top of its
//! successors' INs: the condition operand of its own terminating
//! conditional jump, and, for a block with no successors, every user
//! variable. The frame's user variables are the program's observable
//! output, so they are live at exit; without this, a program that never
//! branches would optimize away entirely.

use crate::block::{BlockId, FlowGraph};
use crate::error::OptError;
use rmc_ir::{is_variable, TacInstr, TacProgram};
use rmc_sem::SymbolTable;
use rmc_util::{FxHashSet, IndexVec};

/// The four live-variable sets of one block.
#[derive(Clone, Debug, Default)]
pub struct LiveSets {
    pub gen: FxHashSet<String>,
    pub kill: FxHashSet<String>,
    pub inn: FxHashSet<String>,
    pub out: FxHashSet<String>,
}

/// Computes live-variable GEN/KILL/IN/OUT for every block.
pub fn live_variables(
    program: &TacProgram,
    graph: &FlowGraph,
    table: &SymbolTable,
) -> Result<IndexVec<BlockId, LiveSets>, OptError> {
    let mut sets: IndexVec<BlockId, LiveSets> = IndexVec::new();
    for _ in graph.blocks.iter() {
        sets.push(LiveSets::default());
    }

    // GEN/KILL per block: walk forward, uses before the instruction's own
    // definition, so `x = x + 1` exposes `x` upward.
    for (bid, block) in graph.blocks.iter_enumerated() {
        let mut gen = FxHashSet::default();
        let mut kill: FxHashSet<String> = FxHashSet::default();
        for &id in &block.instrs {
            let instr = program.instr(id);
            for used in instr.used_operands() {
                if is_variable(used, table) && !kill.contains(used) {
                    gen.insert(used.to_string());
                }
            }
            if instr.is_assignment_kind() && !matches!(instr, TacInstr::ArrayWrite { .. }) {
                if let Some(name) = instr.defined_name() {
                    kill.insert(name.to_string());
                }
            }
        }
        sets[bid].gen = gen;
        sets[bid].kill = kill;
    }

    let user_vars: Vec<String> = table.iter().map(|s| s.name.clone()).collect();

    // Backward fixed point for OUT/IN.
    let block_count = graph.blocks.len();
    let max_iterations = block_count * block_count + 2;
    let mut iterations = 0;
    loop {
        let mut changed = false;
        for (bid, block) in graph.blocks.iter_enumerated().collect::<Vec<_>>().into_iter().rev() {
            let mut out = FxHashSet::default();
            for &succ in &block.succs {
                out.extend(sets[succ].inn.iter().cloned());
            }
            if let Some(cond) = block.last_instr(program).and_then(|i| i.condition()) {
                if is_variable(cond, table) {
                    out.insert(cond.to_string());
                }
            }
            if block.succs.is_empty() {
                out.extend(user_vars.iter().cloned());
            }

            let mut inn: FxHashSet<String> = out
                .iter()
                .filter(|name| !sets[bid].kill.contains(*name))
                .cloned()
                .collect();
            inn.extend(sets[bid].gen.iter().cloned());

            if out != sets[bid].out || inn != sets[bid].inn {
                changed = true;
                sets[bid].out = out;
                sets[bid].inn = inn;
            }
        }

        if !changed {
            return Ok(sets);
        }
        iterations += 1;
        if iterations > max_iterations {
            return Err(OptError::FixedPointNotReached);
        }
    }
}
