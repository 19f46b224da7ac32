//! The report writer.
//!
//! Produces the single `compiler_output.txt` the compiler emits: eight
//! sections in pipeline order, each under a box-drawn banner. Only the
//! final section (the assembly listing) is meant for machine consumption;
//! everything else is for reading.

use rmc_ir::{InstrId, TacProgram};
use rmc_lex::Token;
use rmc_opt::{BlockId, FlowGraph, LiveSets, ReachingSets};
use rmc_par::AstNode;
use rmc_sem::SymbolTable;
use rmc_util::{FxHashMap, IndexVec};
use std::fmt::Write as _;

const BANNER_WIDTH: usize = 66;
const RECORD_WIDTH: usize = 38;

/// Accumulates report sections in order.
pub struct Report {
    out: String,
}

impl Report {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    /// Returns the finished report text.
    pub fn finish(self) -> String {
        self.out
    }

    fn banner(&mut self, title: &str) {
        let line = "═".repeat(BANNER_WIDTH - 2);
        let _ = writeln!(self.out, "╔{line}╗");
        let _ = writeln!(self.out, "║ {:<width$}║", title, width = BANNER_WIDTH - 3);
        let _ = writeln!(self.out, "╚{line}╝");
        self.out.push('\n');
    }

    /// Section 1: one boxed record per token.
    pub fn add_tokens(&mut self, tokens: &[Token]) {
        self.banner("1. LEXICAL ANALYSIS - TOKENS");

        let rule = "─".repeat(RECORD_WIDTH - 2);
        let mut printed = 0usize;
        for token in tokens {
            if *token == Token::Eof {
                continue;
            }
            printed += 1;
            let _ = writeln!(self.out, "┌{rule}┐");
            let _ = writeln!(
                self.out,
                "│ Token #{:<width$}│",
                printed,
                width = RECORD_WIDTH - 10
            );
            let _ = writeln!(self.out, "├{rule}┤");
            let _ = writeln!(
                self.out,
                "│ Type  : {:<width$}│",
                token.type_name(),
                width = RECORD_WIDTH - 11
            );
            let _ = writeln!(
                self.out,
                "│ Value : {:<width$}│",
                token.value_string(),
                width = RECORD_WIDTH - 11
            );
            let _ = writeln!(self.out, "└{rule}┘");
        }
        let _ = writeln!(self.out, "Total tokens: {printed}");
        self.out.push('\n');
    }

    /// Section 2: the indented structural AST rendering.
    pub fn add_ast(&mut self, ast: &[AstNode]) {
        self.banner("2. ABSTRACT SYNTAX TREE");

        for (i, node) in ast.iter().enumerate() {
            let _ = writeln!(self.out, "AST #{}:", i + 1);
            render_ast(&mut self.out, node, 1);
            self.out.push('\n');
        }
        if ast.is_empty() {
            let _ = writeln!(self.out, "(empty program)");
            self.out.push('\n');
        }
    }

    /// Section 3: semantic status, warnings, and the symbol table.
    pub fn add_semantics(&mut self, table: &SymbolTable, warnings: &[String]) {
        self.banner("3. SEMANTIC ANALYSIS");

        let _ = writeln!(self.out, "Type checking COMPLETED");
        let _ = writeln!(self.out, "Warnings: {}", warnings.len());
        for warning in warnings {
            let _ = writeln!(self.out, "  {warning}");
        }
        self.out.push('\n');

        let _ = writeln!(
            self.out,
            "╔═══════╤══════════════════╤════════════════╤════════╤══════════╤══════════╤═══════╤══════════════╗"
        );
        let _ = writeln!(
            self.out,
            "║  #    │ Name             │ Type           │ Array  │ Size     │ Init     │ Scope │ Block ID     ║"
        );
        let _ = writeln!(
            self.out,
            "╠═══════╪══════════════════╪════════════════╪════════╪══════════╪══════════╪═══════╪══════════════╣"
        );
        for (i, symbol) in table.iter().enumerate() {
            let _ = writeln!(
                self.out,
                "║ {:>3}   │ {:<16} │ {:<14} │ {:<6} │ {:<8} │ {:<8} │ {:>5} │ {:>10}   ║",
                i + 1,
                symbol.name,
                symbol.ty.type_name(),
                if symbol.is_array { "Yes" } else { "No" },
                symbol.array_size.as_deref().unwrap_or("-"),
                if symbol.is_initialized { "Yes" } else { "No" },
                symbol.scope,
                symbol.block_id,
            );
        }
        let _ = writeln!(
            self.out,
            "╚═══════╧══════════════════╧════════════════╧════════╧══════════╧══════════╧═══════╧══════════════╝"
        );
        let _ = writeln!(self.out, "Total symbols: {}", table.len());
        self.out.push('\n');
    }

    /// Section 4: the pre-optimization instruction stream.
    pub fn add_tac(&mut self, program: &TacProgram) {
        self.banner("4. THREE-ADDRESS CODE");
        self.tac_listing(program);
    }

    /// Section 5: blocks with their edges, no dataflow sets.
    pub fn add_cfg(&mut self, program: &TacProgram, graph: &FlowGraph) {
        self.banner("5. CONTROL FLOW GRAPH");

        let positions = stream_positions(program);
        for (id, block) in graph.blocks.iter_enumerated() {
            let _ = writeln!(self.out, "Block B{}:", id.0);
            for &instr in &block.instrs {
                let _ = writeln!(
                    self.out,
                    "  {:>3} | {}",
                    positions.get(&instr).copied().unwrap_or(0),
                    program.instr(instr)
                );
            }
            let _ = writeln!(self.out, "  out edges: {}", edge_list(&block.succs));
            let _ = writeln!(self.out, "  in edges : {}", edge_list(&block.preds));
            self.out.push('\n');
        }
        if graph.is_empty() {
            let _ = writeln!(self.out, "(no basic blocks)");
            self.out.push('\n');
        }
    }

    /// Section 6: optimized blocks with both analyses' GEN/KILL/IN/OUT.
    pub fn add_blocks(
        &mut self,
        program: &TacProgram,
        graph: &FlowGraph,
        reaching: &IndexVec<BlockId, ReachingSets>,
        live: &IndexVec<BlockId, LiveSets>,
    ) {
        self.banner("6. BASIC BLOCKS (After Optimization)");

        let positions = stream_positions(program);
        for (id, block) in graph.blocks.iter_enumerated() {
            let _ = writeln!(self.out, "Block B{}:", id.0);
            for &instr in &block.instrs {
                let _ = writeln!(
                    self.out,
                    "  {:>3} | {}",
                    positions.get(&instr).copied().unwrap_or(0),
                    program.instr(instr)
                );
            }

            let _ = writeln!(self.out, "  Reaching definitions:");
            for (name, set) in [
                ("GEN ", &reaching[id].gen),
                ("KILL", &reaching[id].kill),
                ("IN  ", &reaching[id].inn),
                ("OUT ", &reaching[id].out),
            ] {
                let _ = writeln!(
                    self.out,
                    "    {name}: {}",
                    reaching_set(program, &positions, set)
                );
            }

            let _ = writeln!(self.out, "  Live variables:");
            for (name, set) in [
                ("GEN ", &live[id].gen),
                ("KILL", &live[id].kill),
                ("IN  ", &live[id].inn),
                ("OUT ", &live[id].out),
            ] {
                let mut names: Vec<&str> = set.iter().map(String::as_str).collect();
                names.sort_unstable();
                let _ = writeln!(self.out, "    {name}: {{ {} }}", names.join(", "));
            }
            self.out.push('\n');
        }
    }

    /// Section 7: the optimized stream plus reduction statistics.
    pub fn add_optimized_tac(&mut self, program: &TacProgram, before: usize) {
        self.banner("7. THREE-ADDRESS CODE (After Optimization)");
        self.tac_listing(program);

        let after = program.len();
        let reduction = if before > 0 {
            (before - after) as f64 * 100.0 / before as f64
        } else {
            0.0
        };
        let _ = writeln!(self.out, "Instructions before optimization: {before}");
        let _ = writeln!(self.out, "Instructions after optimization : {after}");
        let _ = writeln!(self.out, "Reduction: {reduction:.1}%");
        self.out.push('\n');
    }

    /// Section 8: the assembly listing.
    pub fn add_asm(&mut self, lines: &[String]) {
        self.banner("8. REAL TARGET CODE - x86-64 ASSEMBLY");
        for line in lines {
            let _ = writeln!(self.out, "{line}");
        }
        self.out.push('\n');
    }

    fn tac_listing(&mut self, program: &TacProgram) {
        for (i, (_, instr)) in program.iter_ordered().enumerate() {
            let _ = writeln!(self.out, "{i:>3} | {instr}");
        }
        if program.is_empty() {
            let _ = writeln!(self.out, "(no instructions)");
        }
        self.out.push('\n');
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

fn edge_list(blocks: &[BlockId]) -> String {
    if blocks.is_empty() {
        return "(none)".into();
    }
    blocks
        .iter()
        .map(|b| format!("B{}", b.0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn stream_positions(program: &TacProgram) -> FxHashMap<InstrId, usize> {
    program
        .iter_ordered()
        .enumerate()
        .map(|(pos, (id, _))| (id, pos))
        .collect()
}

fn reaching_set(
    program: &TacProgram,
    positions: &FxHashMap<InstrId, usize>,
    set: &rmc_util::FxHashSet<InstrId>,
) -> String {
    let mut entries: Vec<(usize, String)> = set
        .iter()
        .map(|&id| {
            (
                positions.get(&id).copied().unwrap_or(usize::MAX),
                program.instr(id).to_string(),
            )
        })
        .collect();
    entries.sort();
    let rendered: Vec<String> = entries
        .into_iter()
        .map(|(pos, text)| {
            if pos == usize::MAX {
                format!("<deleted: {text}>")
            } else {
                format!("{pos}: {text}")
            }
        })
        .collect();
    format!("{{ {} }}", rendered.join("; "))
}

/// Renders one AST node at the given indent depth.
fn render_ast(out: &mut String, node: &AstNode, indent: usize) {
    let pad = "  ".repeat(indent);
    match node {
        AstNode::Int(v) => {
            let _ = writeln!(out, "{pad}Num: {v}");
        }
        AstNode::Double(v) => {
            let _ = writeln!(out, "{pad}Double: {v}");
        }
        AstNode::Bool(v) => {
            let _ = writeln!(out, "{pad}Bool: {v}");
        }
        AstNode::Char(c) => {
            let _ = writeln!(out, "{pad}Char: '{c}'");
        }
        AstNode::Str(s) => {
            let _ = writeln!(out, "{pad}String: \"{s}\"");
        }
        AstNode::Var(name) => {
            let _ = writeln!(out, "{pad}Var: {name}");
        }
        AstNode::ArrayAccess { name, index } => {
            let _ = writeln!(out, "{pad}Array Access: {name}[");
            render_ast(out, index, indent + 1);
            let _ = writeln!(out, "{pad}]");
        }
        AstNode::Unary { op, is_prefix, expr } => {
            let form = if *is_prefix { "prefix" } else { "postfix" };
            let _ = writeln!(out, "{pad}UnaryOp: {op} ({form})");
            render_ast(out, expr, indent + 1);
        }
        AstNode::Binary { op, left, right } => {
            let _ = writeln!(out, "{pad}BinaryOp: {op}");
            render_ast(out, left, indent + 1);
            render_ast(out, right, indent + 1);
        }
        AstNode::Assign { target, value } => {
            let _ = writeln!(out, "{pad}Assign:");
            let _ = writeln!(out, "{pad}  Var:");
            render_ast(out, target, indent + 2);
            let _ = writeln!(out, "{pad}  Expr:");
            render_ast(out, value, indent + 2);
        }
        AstNode::If { cond, then_block } => {
            let _ = writeln!(out, "{pad}If Statement:");
            let _ = writeln!(out, "{pad}  Condition:");
            render_ast(out, cond, indent + 2);
            let _ = writeln!(out, "{pad}  Then:");
            render_ast(out, then_block, indent + 2);
        }
        AstNode::IfElse {
            cond,
            then_block,
            else_block,
        } => {
            let _ = writeln!(out, "{pad}If-Else Statement:");
            let _ = writeln!(out, "{pad}  Condition:");
            render_ast(out, cond, indent + 2);
            let _ = writeln!(out, "{pad}  Then:");
            render_ast(out, then_block, indent + 2);
            let _ = writeln!(out, "{pad}  Else:");
            render_ast(out, else_block, indent + 2);
        }
        AstNode::While { cond, body } => {
            let _ = writeln!(out, "{pad}While Loop:");
            let _ = writeln!(out, "{pad}  Condition:");
            render_ast(out, cond, indent + 2);
            let _ = writeln!(out, "{pad}  Body:");
            render_ast(out, body, indent + 2);
        }
        AstNode::For {
            init,
            cond,
            update,
            body,
        } => {
            let _ = writeln!(out, "{pad}For Loop:");
            let _ = writeln!(out, "{pad}  Init:");
            render_ast(out, init, indent + 2);
            let _ = writeln!(out, "{pad}  Condition:");
            render_ast(out, cond, indent + 2);
            let _ = writeln!(out, "{pad}  Update:");
            render_ast(out, update, indent + 2);
            let _ = writeln!(out, "{pad}  Body:");
            render_ast(out, body, indent + 2);
        }
        AstNode::Block(statements) => {
            let _ = writeln!(out, "{pad}Block ({} statements):", statements.len());
            for statement in statements {
                render_ast(out, statement, indent + 1);
            }
        }
        AstNode::Decl {
            name,
            ty,
            init,
            is_array,
            array_size,
        } => {
            if *is_array {
                let _ = writeln!(
                    out,
                    "{pad}Declaration: {name}[{}] ({ty})",
                    array_size.as_deref().unwrap_or("?")
                );
            } else {
                let _ = writeln!(out, "{pad}Declaration: {name} ({ty})");
            }
            if let Some(init) = init {
                let _ = writeln!(out, "{pad}  Initializer:");
                render_ast(out, init, indent + 2);
            }
        }
    }
}
