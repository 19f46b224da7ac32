//! Control-flow-graph edge construction.
//!
//! Edges are derived from each block's final instruction: a `goto` has
//! exactly one successor (the block whose first instruction carries the
//! matching label), a conditional jump has two (the textually next block,
//! then the labeled target), and anything else falls through to the next
//! block. Predecessor lists are filled symmetrically.

use crate::block::{BlockId, FlowGraph};
use crate::error::OptError;
use indexmap::IndexMap;
use rmc_ir::{TacInstr, TacProgram};
use rmc_util::Idx;

/// Builds the label table: label name to the block it opens.
fn label_table(
    graph: &FlowGraph,
    program: &TacProgram,
) -> Result<IndexMap<String, BlockId>, OptError> {
    let mut table = IndexMap::new();
    for (id, block) in graph.blocks.iter_enumerated() {
        if let Some(&first) = block.instrs.first() {
            if let TacInstr::Label { name } = program.instr(first) {
                if table.insert(name.clone(), id).is_some() {
                    return Err(OptError::DuplicateLabel {
                        label: name.clone(),
                    });
                }
            }
        }
    }
    Ok(table)
}

/// Adds successor/predecessor edges to a freshly formed graph.
pub fn connect_edges(graph: &mut FlowGraph, program: &TacProgram) -> Result<(), OptError> {
    let labels = label_table(graph, program)?;
    let block_count = graph.blocks.len();

    let mut edges: Vec<(BlockId, BlockId)> = Vec::new();
    for (id, block) in graph.blocks.iter_enumerated() {
        let next = (id.index() + 1 < block_count).then(|| BlockId(id.0 + 1));

        match block.last_instr(program) {
            Some(TacInstr::Goto { label }) => {
                let target = labels
                    .get(label)
                    .copied()
                    .ok_or_else(|| OptError::UnknownLabel {
                        label: label.clone(),
                    })?;
                edges.push((id, target));
            }
            Some(TacInstr::IfFalse { label, .. }) | Some(TacInstr::IfTrue { label, .. }) => {
                if let Some(next) = next {
                    edges.push((id, next));
                }
                let target = labels
                    .get(label)
                    .copied()
                    .ok_or_else(|| OptError::UnknownLabel {
                        label: label.clone(),
                    })?;
                edges.push((id, target));
            }
            Some(_) => {
                if let Some(next) = next {
                    edges.push((id, next));
                }
            }
            None => {}
        }
    }

    for (from, to) in edges {
        graph.blocks[from].succs.push(to);
        graph.blocks[to].preds.push(from);
    }
    Ok(())
}

/// Forms blocks and connects CFG edges in one step.
pub fn build_flow_graph(program: &TacProgram) -> Result<FlowGraph, OptError> {
    let mut graph = crate::block::form_blocks(program)?;
    connect_edges(&mut graph, program)?;
    Ok(graph)
}
