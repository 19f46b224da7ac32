//! rmc-drv - Compiler Driver
//!
//! Entry point and orchestrator for the pipeline:
//!
//! ```text
//! Source (.c body)
//!      │
//!      ▼
//!  [Lexer] ──▶ tokens
//!      │
//!      ▼
//!  [Parser] ──▶ AST
//!      │
//!      ▼
//!  [Semantic Check] ──▶ symbol table + warnings
//!      │
//!      ▼
//!  [IR Lowering] ──▶ three-address code
//!      │
//!      ▼
//!  [Blocks / CFG / Dataflow + Optimizer] ──▶ optimized TAC
//!      │
//!      ▼
//!  [Codegen] ──▶ x86-64 assembly
//! ```
//!
//! The driver owns the `CompilationUnit` holding every artifact; phases
//! receive the pieces they consume and hand back what they produce. One
//! report file is written at the end. A failing phase terminates the
//! process with its phase-specific exit code and writes nothing.
//!
//! Exit codes: 0 success, 1 usage/IO, 2 syntax, 3 semantic, 4 IR,
//! 5 optimizer, 6 codegen.

mod report;

pub use report::Report;

use rmc_gen::CodegenError;
use rmc_ir::{IrError, TacProgram};
use rmc_lex::{LexError, Token};
use rmc_opt::{build_flow_graph, live_variables, reaching_definitions, OptError};
use rmc_par::{AstNode, ParseError};
use rmc_sem::{SemanticError, SymbolTable};
use rmc_util::Handler;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// The fixed name of the report file.
pub const OUTPUT_FILE_NAME: &str = "compiler_output.txt";

/// Any error the driver can surface, tagged with its phase.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("00 || Usage error -> {0}")]
    Usage(String),

    #[error("00 || IO error -> {0}")]
    Io(String),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Opt(#[from] OptError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// The process exit code for this error's phase.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Usage(_) | CompileError::Io(_) => 1,
            CompileError::Lex(_) | CompileError::Parse(_) => 2,
            CompileError::Semantic(_) => 3,
            CompileError::Ir(_) => 4,
            CompileError::Opt(_) => 5,
            CompileError::Codegen(_) => 6,
        }
    }
}

/// Invocation configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source file to compile.
    pub source: PathBuf,
    /// Report destination; its file name is fixed.
    pub output: PathBuf,
}

impl Config {
    /// Parses `rmc4 <source-path> <output-path>`.
    ///
    /// The output path may carry a directory, but its file name must be
    /// `compiler_output.txt`.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Config, CompileError> {
        let source = args
            .next()
            .ok_or_else(|| CompileError::Usage("usage: rmc4 <source-path> <output-path>".into()))?;
        let output = args
            .next()
            .ok_or_else(|| CompileError::Usage("usage: rmc4 <source-path> <output-path>".into()))?;
        if args.next().is_some() {
            return Err(CompileError::Usage(
                "usage: rmc4 <source-path> <output-path>".into(),
            ));
        }

        let output = PathBuf::from(output);
        if output.file_name().and_then(|n| n.to_str()) != Some(OUTPUT_FILE_NAME) {
            return Err(CompileError::Usage(format!(
                "output path must be named {OUTPUT_FILE_NAME}"
            )));
        }

        Ok(Config {
            source: PathBuf::from(source),
            output,
        })
    }
}

/// All artifacts of one compilation, in production order.
#[derive(Debug)]
pub struct CompilationUnit {
    pub tokens: Vec<Token>,
    pub ast: Vec<AstNode>,
    pub table: SymbolTable,
    pub tac: TacProgram,
    pub handler: Handler,
}

/// Parses arguments and runs one full compilation.
pub fn run(args: impl Iterator<Item = String>) -> Result<(), CompileError> {
    let config = Config::from_args(args)?;
    compile(&config).map(|_| ())
}

/// Runs the pipeline over `config.source`, writes the report, and returns
/// the compilation's artifacts.
pub fn compile(config: &Config) -> Result<CompilationUnit, CompileError> {
    let source = std::fs::read_to_string(&config.source)
        .map_err(|e| CompileError::Io(format!("cannot open {}: {e}", config.source.display())))?;

    let handler = Handler::new();
    let mut report = Report::new();

    // Phase 1: lexical analysis.
    let started = Instant::now();
    let tokens = rmc_lex::tokenize(&source)?;
    progress("01", "Lexical analysis", started);
    report.add_tokens(&tokens);

    // Phase 2: parsing.
    let started = Instant::now();
    let ast = rmc_par::parse(tokens.clone())?;
    progress("02", "Parsing", started);
    report.add_ast(&ast);

    // Phase 3: semantic check. Warnings accumulate in the handler.
    let started = Instant::now();
    let table = rmc_sem::check(&ast, &handler)?;
    progress("03", "Semantic check", started);
    report.add_semantics(&table, &handler.warnings());

    // Phase 4: lowering to three-address code.
    let started = Instant::now();
    let mut tac = rmc_ir::lower(&ast)?;
    progress("04", "Intermediate code generation", started);
    let instructions_before = tac.len();
    report.add_tac(&tac);

    // Phase 5/6: blocks, CFG, dataflow, optimization. The CFG is reported
    // as built from the unoptimized stream; the dataflow sets as rebuilt
    // from the optimized one.
    let started = Instant::now();
    let pre_graph = build_flow_graph(&tac)?;
    report.add_cfg(&tac, &pre_graph);

    rmc_opt::optimize(&mut tac, &table)?;

    let graph = build_flow_graph(&tac)?;
    let reaching = reaching_definitions(&tac, &graph)?;
    let live = live_variables(&tac, &graph, &table)?;
    progress("05", "Optimization", started);
    report.add_blocks(&tac, &graph, &reaching, &live);
    report.add_optimized_tac(&tac, instructions_before);

    // Phase 7: code generation.
    let started = Instant::now();
    let asm = rmc_gen::generate(&tac, &table)?;
    progress("06", "Target code generation", started);
    report.add_asm(&asm);

    std::fs::write(&config.output, report.finish())
        .map_err(|e| CompileError::Io(format!("cannot write {}: {e}", config.output.display())))?;

    Ok(CompilationUnit {
        tokens,
        ast,
        table,
        tac,
        handler,
    })
}

fn progress(phase: &str, name: &str, started: Instant) {
    println!(
        "{phase} || {name} completed in {:.3} ms",
        started.elapsed().as_secs_f64() * 1000.0
    );
}
