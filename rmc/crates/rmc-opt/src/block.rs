//! Basic-block formation.
//!
//! The instruction stream is cut into maximal straight-line runs. A
//! boundary occurs after a terminator (`goto` / `ifTrue` / `ifFalse`) and
//! immediately before a label, so every label begins its own block and a
//! block holds at most one label, as its first instruction.
//!
//! Blocks live in an arena keyed by [`BlockId`] and reference instructions
//! by [`InstrId`]; the cyclic predecessor/successor links of the CFG are
//! plain id lists.

use crate::error::OptError;
use rmc_ir::{InstrId, TacInstr, TacProgram};
use rmc_util::{define_idx, FxHashMap, IndexVec};

define_idx!(BlockId);

/// Hard ceiling on the number of basic blocks.
pub const MAX_BLOCKS: usize = 8192;

/// A basic block: an id, its instructions, and its CFG edges.
#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Instructions in execution order.
    pub instrs: Vec<InstrId>,
    /// Successor blocks.
    pub succs: Vec<BlockId>,
    /// Predecessor blocks.
    pub preds: Vec<BlockId>,
}

impl BasicBlock {
    /// The block's final instruction, if any.
    pub fn last_instr<'p>(&self, program: &'p TacProgram) -> Option<&'p TacInstr> {
        self.instrs.last().map(|&id| program.instr(id))
    }
}

/// The flow graph: the block arena plus an instruction location index.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    pub blocks: IndexVec<BlockId, BasicBlock>,
    locations: FxHashMap<InstrId, (BlockId, usize)>,
}

impl FlowGraph {
    /// Where an instruction lives: its block and position within it.
    pub fn location(&self, id: InstrId) -> Option<(BlockId, usize)> {
        self.locations.get(&id).copied()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the program had no instructions.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Cuts the instruction stream into blocks. Edges are added separately by
/// [`crate::cfg::connect_edges`].
pub fn form_blocks(program: &TacProgram) -> Result<FlowGraph, OptError> {
    let mut graph = FlowGraph::default();
    let mut current: Vec<InstrId> = Vec::new();

    let flush = |graph: &mut FlowGraph, current: &mut Vec<InstrId>| -> Result<(), OptError> {
        if current.is_empty() {
            return Ok(());
        }
        if graph.blocks.len() >= MAX_BLOCKS {
            return Err(OptError::BlockLimit);
        }
        let id = BlockId(graph.blocks.len() as u32);
        for (pos, &instr) in current.iter().enumerate() {
            graph.locations.insert(instr, (id, pos));
        }
        graph.blocks.push(BasicBlock {
            id,
            instrs: std::mem::take(current),
            succs: Vec::new(),
            preds: Vec::new(),
        });
        Ok(())
    };

    for (id, instr) in program.iter_ordered() {
        if matches!(instr, TacInstr::Label { .. }) {
            flush(&mut graph, &mut current)?;
        }
        current.push(id);
        if instr.is_terminator() {
            flush(&mut graph, &mut current)?;
        }
    }
    flush(&mut graph, &mut current)?;

    Ok(graph)
}
