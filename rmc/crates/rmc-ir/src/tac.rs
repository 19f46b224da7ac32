//! Three-address code.
//!
//! Instructions live in an arena keyed by [`InstrId`]; the program order is
//! a separate id list. The optimizer rewrites operands through the arena
//! and deletes instructions by removing them from the order (and from the
//! owning block), so every id stays valid for the whole compilation.
//!
//! Operands are plain strings compared by value: an integer/double/bool
//! literal (`42`, `3.140000`, `true`), a quoted char literal (`'A'`), a
//! user variable name, a temporary `T<k>`, or a label `L<k>`. The
//! classification helpers at the bottom of this module are what the
//! optimizer and the code generator use to tell these apart.

use crate::error::IrError;
use rmc_sem::SymbolTable;
use rmc_util::{define_idx, IndexVec};
use std::fmt;

define_idx!(InstrId);

/// Hard ceiling on the instruction stream length.
pub const MAX_INSTRUCTIONS: usize = 8192;

/// One three-address instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum TacInstr {
    /// `result = arg`
    Assign { result: String, arg: String },
    /// `result = arg1 op arg2`
    BinOp {
        result: String,
        arg1: String,
        op: String,
        arg2: String,
    },
    /// `result = op arg`
    UnOp {
        result: String,
        op: String,
        arg: String,
    },
    /// `goto label`
    Goto { label: String },
    /// `ifFalse cond goto label`
    IfFalse { cond: String, label: String },
    /// `ifTrue cond goto label`
    IfTrue { cond: String, label: String },
    /// `label:`
    Label { name: String },
    /// `result = array[index]`
    ArrayRead {
        result: String,
        array: String,
        index: String,
    },
    /// `array[index] = value`
    ArrayWrite {
        array: String,
        index: String,
        value: String,
    },
}

impl TacInstr {
    /// True for instructions that define a name (everything except jumps
    /// and labels).
    pub fn is_assignment_kind(&self) -> bool {
        matches!(
            self,
            TacInstr::Assign { .. }
                | TacInstr::BinOp { .. }
                | TacInstr::UnOp { .. }
                | TacInstr::ArrayRead { .. }
                | TacInstr::ArrayWrite { .. }
        )
    }

    /// True for a plain `result = arg` copy.
    pub fn is_simple_assign(&self) -> bool {
        matches!(self, TacInstr::Assign { .. })
    }

    /// The name this instruction defines; for an array write, the array.
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            TacInstr::Assign { result, .. }
            | TacInstr::BinOp { result, .. }
            | TacInstr::UnOp { result, .. }
            | TacInstr::ArrayRead { result, .. } => Some(result),
            TacInstr::ArrayWrite { array, .. } => Some(array),
            _ => None,
        }
    }

    /// True for instructions that end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TacInstr::Goto { .. } | TacInstr::IfFalse { .. } | TacInstr::IfTrue { .. }
        )
    }

    /// The condition operand of a conditional jump.
    pub fn condition(&self) -> Option<&str> {
        match self {
            TacInstr::IfFalse { cond, .. } | TacInstr::IfTrue { cond, .. } => Some(cond),
            _ => None,
        }
    }

    /// Operand names read by this instruction, in operand order. The array
    /// name counts as a use for a read but not for a write.
    pub fn used_operands(&self) -> Vec<&str> {
        match self {
            TacInstr::Assign { arg, .. } => vec![arg],
            TacInstr::BinOp { arg1, arg2, .. } => vec![arg1, arg2],
            TacInstr::UnOp { arg, .. } => vec![arg],
            TacInstr::ArrayRead { array, index, .. } => vec![array, index],
            TacInstr::ArrayWrite { index, value, .. } => vec![index, value],
            TacInstr::IfFalse { cond, .. } | TacInstr::IfTrue { cond, .. } => vec![cond],
            TacInstr::Goto { .. } | TacInstr::Label { .. } => vec![],
        }
    }
}

impl fmt::Display for TacInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacInstr::Assign { result, arg } => write!(f, "{result} = {arg}"),
            TacInstr::BinOp {
                result,
                arg1,
                op,
                arg2,
            } => write!(f, "{result} = {arg1} {op} {arg2}"),
            TacInstr::UnOp { result, op, arg } => write!(f, "{result} = {op} {arg}"),
            TacInstr::Goto { label } => write!(f, "goto {label}"),
            TacInstr::IfFalse { cond, label } => write!(f, "ifFalse {cond} goto {label}"),
            TacInstr::IfTrue { cond, label } => write!(f, "ifTrue {cond} goto {label}"),
            TacInstr::Label { name } => write!(f, "{name}:"),
            TacInstr::ArrayRead {
                result,
                array,
                index,
            } => write!(f, "{result} = {array}[{index}]"),
            TacInstr::ArrayWrite {
                array,
                index,
                value,
            } => write!(f, "{array}[{index}] = {value}"),
        }
    }
}

/// The instruction stream: an append-only arena plus the program order.
#[derive(Clone, Debug, Default)]
pub struct TacProgram {
    arena: IndexVec<InstrId, TacInstr>,
    order: Vec<InstrId>,
}

impl TacProgram {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self {
            arena: IndexVec::new(),
            order: Vec::new(),
        }
    }

    /// Appends an instruction to the stream.
    pub fn push(&mut self, instr: TacInstr) -> Result<InstrId, IrError> {
        if self.order.len() >= MAX_INSTRUCTIONS {
            return Err(IrError::InstructionLimit);
        }
        let id = self.arena.push(instr);
        self.order.push(id);
        Ok(id)
    }

    /// Number of instructions currently in the stream.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The instruction behind an id. Deleted instructions remain readable;
    /// they are simply no longer part of the order.
    pub fn instr(&self, id: InstrId) -> &TacInstr {
        &self.arena[id]
    }

    /// Mutable access for the optimizer's rewrites.
    pub fn instr_mut(&mut self, id: InstrId) -> &mut TacInstr {
        &mut self.arena[id]
    }

    /// Iterates `(id, instruction)` in program order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (InstrId, &TacInstr)> {
        self.order.iter().map(move |&id| (id, &self.arena[id]))
    }

    /// The program order as ids.
    pub fn order(&self) -> &[InstrId] {
        &self.order
    }

    /// Removes an instruction from the stream order.
    pub fn remove(&mut self, id: InstrId) {
        self.order.retain(|&other| other != id);
    }

    /// Renders the stream as display lines, in program order.
    pub fn render(&self) -> Vec<String> {
        self.iter_ordered()
            .map(|(_, instr)| instr.to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Operand classification
// ---------------------------------------------------------------------------

/// True for an optionally signed run of digits.
pub fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// True for an optionally signed digit run containing exactly one dot.
pub fn is_double_literal(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let mut dots = 0;
    for c in body.chars() {
        if c == '.' {
            dots += 1;
        } else if !c.is_ascii_digit() {
            return false;
        }
    }
    dots == 1
}

/// True for `true` / `false`.
pub fn is_bool_literal(s: &str) -> bool {
    s == "true" || s == "false"
}

/// True for a quoted character literal `'x'`.
pub fn is_char_literal(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next(), chars.next(), chars.next()),
        (Some('\''), Some(_), Some('\''), None)
    )
}

/// True for a quoted string literal `"..."`.
pub fn is_string_literal(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// True for the constants the optimizer propagates and folds: integers and
/// booleans. Doubles and chars flow through the stream but are never
/// substituted.
pub fn is_constant(s: &str) -> bool {
    is_int_literal(s) || is_bool_literal(s)
}

/// True for a compiler temporary `T<k>`.
pub fn is_temp(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('T')
        && s.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// True for a label `L<k>`.
pub fn is_label(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('L')
        && s.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// True for operands that name storage: temporaries and declared symbols.
pub fn is_variable(s: &str, table: &SymbolTable) -> bool {
    if s.is_empty()
        || is_int_literal(s)
        || is_double_literal(s)
        || is_bool_literal(s)
        || is_char_literal(s)
        || is_string_literal(s)
    {
        return false;
    }
    is_temp(s) || table.contains_name(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_literal() {
        assert!(is_int_literal("42"));
        assert!(is_int_literal("-7"));
        assert!(!is_int_literal("4.2"));
        assert!(!is_int_literal("x"));
        assert!(!is_int_literal("-"));
    }

    #[test]
    fn test_double_literal() {
        assert!(is_double_literal("3.140000"));
        assert!(!is_double_literal("3"));
        assert!(!is_double_literal("1.2.3"));
    }

    #[test]
    fn test_char_literal() {
        assert!(is_char_literal("'A'"));
        assert!(!is_char_literal("A"));
        assert!(!is_char_literal("'AB'"));
    }

    #[test]
    fn test_temp_and_label() {
        assert!(is_temp("T0"));
        assert!(is_temp("T17"));
        assert!(!is_temp("T"));
        assert!(!is_temp("Tx"));
        assert!(is_label("L3"));
        assert!(!is_label("Lx"));
    }

    #[test]
    fn test_constants_exclude_doubles() {
        assert!(is_constant("5"));
        assert!(is_constant("true"));
        assert!(!is_constant("3.140000"));
        assert!(!is_constant("'A'"));
    }

    #[test]
    fn test_display_forms() {
        let instr = TacInstr::BinOp {
            result: "T2".into(),
            arg1: "T0".into(),
            op: "+".into(),
            arg2: "T1".into(),
        };
        assert_eq!(instr.to_string(), "T2 = T0 + T1");

        let write = TacInstr::ArrayWrite {
            array: "arr".into(),
            index: "0".into(),
            value: "T0".into(),
        };
        assert_eq!(write.to_string(), "arr[0] = T0");

        let jump = TacInstr::IfFalse {
            cond: "T3".into(),
            label: "L1".into(),
        };
        assert_eq!(jump.to_string(), "ifFalse T3 goto L1");
    }

    #[test]
    fn test_remove_keeps_arena_entry() {
        let mut program = TacProgram::new();
        let id = program
            .push(TacInstr::Assign {
                result: "a".into(),
                arg: "1".into(),
            })
            .unwrap();
        assert_eq!(program.len(), 1);
        program.remove(id);
        assert_eq!(program.len(), 0);
        // Still readable through the arena.
        assert!(program.instr(id).is_simple_assign());
    }

    #[test]
    fn test_defined_name_for_array_write_is_array() {
        let write = TacInstr::ArrayWrite {
            array: "arr".into(),
            index: "T0".into(),
            value: "T1".into(),
        };
        assert_eq!(write.defined_name(), Some("arr"));
        // But the array name is not a use for a write.
        assert_eq!(write.used_operands(), vec!["T0", "T1"]);
    }
}
