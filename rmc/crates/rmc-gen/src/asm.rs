//! x86-64 assembly emission, AT&T syntax, quadword only.
//!
//! Every value moves through `%rax`; `%rbx` holds the second operand of
//! multiplication/division and scaled array indices, `%rcx` array base
//! addresses on stores. Comparisons set `%al` and widen back to `%rax`, so
//! every boolean is a 0/1 quadword in memory. Instruction groups carry a
//! `#` comment naming the TAC instruction they implement; the output still
//! assembles with GNU as.

use crate::error::CodegenError;
use crate::stack_map::StackMap;
use rmc_ir::{
    is_bool_literal, is_char_literal, is_double_literal, is_int_literal, TacInstr, TacProgram,
};
use rmc_sem::SymbolTable;

/// Hard ceiling on emitted assembly lines.
pub const MAX_ASM_LINES: usize = 8192;

/// Assembly emitter state.
pub struct AsmEmitter<'a> {
    program: &'a TacProgram,
    map: StackMap,
    lines: Vec<String>,
}

impl<'a> AsmEmitter<'a> {
    /// Creates an emitter with a frame layout for `program`.
    pub fn new(program: &'a TacProgram, table: &SymbolTable) -> Result<Self, CodegenError> {
        Ok(Self {
            program,
            map: StackMap::build(program, table)?,
            lines: Vec::new(),
        })
    }

    /// Generates the complete listing.
    pub fn generate(mut self) -> Result<Vec<String>, CodegenError> {
        self.prologue()?;
        let order: Vec<_> = self.program.order().to_vec();
        for id in order {
            let instr = self.program.instr(id).clone();
            self.instruction(&instr)?;
        }
        self.epilogue()?;
        Ok(self.lines)
    }

    fn push(&mut self, line: impl Into<String>) -> Result<(), CodegenError> {
        if self.lines.len() >= MAX_ASM_LINES {
            return Err(CodegenError::AsmBufferLimit);
        }
        self.lines.push(line.into());
        Ok(())
    }

    /// Formats an operand: immediate, or a stack slot.
    fn operand(&self, name: &str) -> Result<String, CodegenError> {
        if is_int_literal(name) {
            return Ok(format!("${name}"));
        }
        if is_bool_literal(name) {
            return Ok(if name == "true" { "$1" } else { "$0" }.to_string());
        }
        if is_char_literal(name) {
            if let Some(c) = name.chars().nth(1) {
                return Ok(format!("${}", c as u32));
            }
        }
        if is_double_literal(name) {
            return Err(CodegenError::DoubleLiteral { value: name.into() });
        }
        let offset = self
            .map
            .offset_of(name)
            .ok_or_else(|| CodegenError::UnmappedOperand { name: name.into() })?;
        Ok(format!("{offset}(%rbp)"))
    }

    fn array_base(&self, name: &str) -> Result<i32, CodegenError> {
        self.map
            .offset_of(name)
            .ok_or_else(|| CodegenError::UnmappedOperand { name: name.into() })
    }

    fn prologue(&mut self) -> Result<(), CodegenError> {
        let frame = self.map.frame_size();
        self.push("    .section .text")?;
        self.push("    .globl main")?;
        self.push("    .type main, @function")?;
        self.push("")?;
        self.push("main:")?;
        self.push("    pushq   %rbp")?;
        self.push("    movq    %rsp, %rbp")?;
        self.push(format!("    subq    ${frame}, %rsp    # Allocate stack space"))?;
        self.push("")
    }

    fn epilogue(&mut self) -> Result<(), CodegenError> {
        self.push("")?;
        self.push("    # Function epilogue")?;
        self.push("    movq    $0, %rax")?;
        self.push("    leave")?;
        self.push("    ret")
    }

    fn instruction(&mut self, instr: &TacInstr) -> Result<(), CodegenError> {
        match instr {
            TacInstr::Assign { result, arg } => {
                let src = self.operand(arg)?;
                let dst = self.operand(result)?;
                self.push(format!("    movq    {src}, %rax    # {result} = {arg}"))?;
                self.push(format!("    movq    %rax, {dst}"))
            }

            TacInstr::BinOp {
                result,
                arg1,
                op,
                arg2,
            } => {
                let a = self.operand(arg1)?;
                let b = self.operand(arg2)?;
                let dst = self.operand(result)?;
                self.push(format!("    # {result} = {arg1} {op} {arg2}"))?;
                self.push(format!("    movq    {a}, %rax"))?;
                match op.as_str() {
                    "+" => self.push(format!("    addq    {b}, %rax"))?,
                    "-" => self.push(format!("    subq    {b}, %rax"))?,
                    "*" => {
                        self.push(format!("    movq    {b}, %rbx"))?;
                        self.push("    imulq   %rbx, %rax")?;
                    }
                    "/" => {
                        self.push("    cqto")?;
                        self.push(format!("    movq    {b}, %rbx"))?;
                        self.push("    idivq   %rbx")?;
                    }
                    "<" | ">" | "<=" | ">=" | "==" | "!=" => {
                        let set = match op.as_str() {
                            "<" => "setl",
                            ">" => "setg",
                            "<=" => "setle",
                            ">=" => "setge",
                            "==" => "sete",
                            _ => "setne",
                        };
                        self.push(format!("    cmpq    {b}, %rax"))?;
                        self.push(format!("    {set}    %al"))?;
                        self.push("    movzbq  %al, %rax")?;
                    }
                    "&&" => self.push(format!("    andq    {b}, %rax"))?,
                    "||" => self.push(format!("    orq     {b}, %rax"))?,
                    _ => {}
                }
                self.push(format!("    movq    %rax, {dst}"))
            }

            TacInstr::UnOp { result, op, arg } => {
                let src = self.operand(arg)?;
                let dst = self.operand(result)?;
                self.push(format!("    # {result} = {op} {arg}"))?;
                self.push(format!("    movq    {src}, %rax"))?;
                match op.as_str() {
                    "-" => self.push("    negq    %rax")?,
                    "!" => self.push("    xorq    $1, %rax")?,
                    "++" => self.push("    incq    %rax")?,
                    "--" => self.push("    decq    %rax")?,
                    _ => {}
                }
                self.push(format!("    movq    %rax, {dst}"))
            }

            TacInstr::Goto { label } => self.push(format!("    jmp     {label}")),

            TacInstr::IfFalse { cond, label } => {
                let c = self.operand(cond)?;
                self.push(format!("    # ifFalse {cond} goto {label}"))?;
                self.push(format!("    movq    {c}, %rax"))?;
                self.push("    testq   %rax, %rax")?;
                self.push(format!("    je      {label}"))
            }

            TacInstr::IfTrue { cond, label } => {
                let c = self.operand(cond)?;
                self.push(format!("    # ifTrue {cond} goto {label}"))?;
                self.push(format!("    movq    {c}, %rax"))?;
                self.push("    testq   %rax, %rax")?;
                self.push(format!("    jne     {label}"))
            }

            TacInstr::Label { name } => self.push(format!("{name}:")),

            TacInstr::ArrayRead {
                result,
                array,
                index,
            } => {
                let idx = self.operand(index)?;
                let dst = self.operand(result)?;
                let base = self.array_base(array)?;
                self.push(format!("    # {result} = {array}[{index}]"))?;
                self.push(format!("    movq    {idx}, %rbx"))?;
                self.push("    imulq   $8, %rbx")?;
                self.push(format!("    leaq    {base}(%rbp), %rax"))?;
                self.push("    movq    (%rax, %rbx), %rax")?;
                self.push(format!("    movq    %rax, {dst}"))
            }

            TacInstr::ArrayWrite {
                array,
                index,
                value,
            } => {
                let val = self.operand(value)?;
                let idx = self.operand(index)?;
                let base = self.array_base(array)?;
                self.push(format!("    # {array}[{index}] = {value}"))?;
                self.push(format!("    movq    {val}, %rax"))?;
                self.push(format!("    movq    {idx}, %rbx"))?;
                self.push("    imulq   $8, %rbx")?;
                self.push(format!("    leaq    {base}(%rbp), %rcx"))?;
                self.push("    movq    %rax, (%rcx, %rbx)")
            }
        }
    }
}

/// Generates the assembly listing for an optimized program.
pub fn generate(program: &TacProgram, table: &SymbolTable) -> Result<Vec<String>, CodegenError> {
    AsmEmitter::new(program, table)?.generate()
}
