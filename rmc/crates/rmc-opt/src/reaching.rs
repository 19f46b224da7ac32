//! Reaching-definitions analysis.
//!
//! A definition is any assignment-kind instruction (plain assign, binop,
//! unop, array read, array write). Per block:
//!
//! - GEN: the definitions in the block whose defined name is not redefined
//!   later in the same block.
//! - KILL: every definition in any *other* block whose defined name matches
//!   a name this block defines.
//! - IN = union of predecessor OUTs; OUT = GEN ∪ (IN − KILL).
//!
//! The forward iteration runs to a true fixed point; the iteration bound
//! exists only to turn a non-monotonic bug into a hard error instead of a
//! hang.

use crate::block::{BlockId, FlowGraph};
use crate::error::OptError;
use rmc_ir::{InstrId, TacProgram};
use rmc_util::{FxHashMap, FxHashSet, IndexVec};

/// The four reaching-definitions sets of one block.
#[derive(Clone, Debug, Default)]
pub struct ReachingSets {
    pub gen: FxHashSet<InstrId>,
    pub kill: FxHashSet<InstrId>,
    pub inn: FxHashSet<InstrId>,
    pub out: FxHashSet<InstrId>,
}

/// Computes GEN/KILL/IN/OUT for every block.
pub fn reaching_definitions(
    program: &TacProgram,
    graph: &FlowGraph,
) -> Result<IndexVec<BlockId, ReachingSets>, OptError> {
    let mut sets: IndexVec<BlockId, ReachingSets> = IndexVec::new();
    for _ in graph.blocks.iter() {
        sets.push(ReachingSets::default());
    }

    // All definitions of each name across the whole stream.
    let mut defs_by_name: FxHashMap<String, Vec<(BlockId, InstrId)>> = FxHashMap::default();
    for (bid, block) in graph.blocks.iter_enumerated() {
        for &id in &block.instrs {
            if let Some(name) = program.instr(id).defined_name() {
                defs_by_name
                    .entry(name.to_string())
                    .or_default()
                    .push((bid, id));
            }
        }
    }

    // GEN: last definition of each name within the block.
    // KILL: same-name definitions living in other blocks.
    for (bid, block) in graph.blocks.iter_enumerated() {
        let mut last_def: FxHashMap<&str, InstrId> = FxHashMap::default();
        for &id in &block.instrs {
            if let Some(name) = program.instr(id).defined_name() {
                last_def.insert(name, id);
            }
        }
        let gen: FxHashSet<InstrId> = last_def.values().copied().collect();

        let mut kill = FxHashSet::default();
        for name in last_def.keys() {
            if let Some(defs) = defs_by_name.get(*name) {
                for &(other_block, def) in defs {
                    if other_block != bid {
                        kill.insert(def);
                    }
                }
            }
        }

        sets[bid].gen = gen;
        sets[bid].kill = kill;
    }

    // Forward fixed point for IN/OUT.
    let block_count = graph.blocks.len();
    let max_iterations = block_count * block_count + 2;
    let mut iterations = 0;
    loop {
        let mut changed = false;
        for (bid, block) in graph.blocks.iter_enumerated() {
            let mut inn = FxHashSet::default();
            for &pred in &block.preds {
                inn.extend(sets[pred].out.iter().copied());
            }

            let mut out: FxHashSet<InstrId> = inn
                .iter()
                .copied()
                .filter(|d| !sets[bid].kill.contains(d))
                .collect();
            out.extend(sets[bid].gen.iter().copied());

            if inn != sets[bid].inn || out != sets[bid].out {
                changed = true;
                sets[bid].inn = inn;
                sets[bid].out = out;
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
