//! Stack-frame layout.
//!
//! Every variable and temporary lives in the frame at a negative offset
//! from `%rbp`. Scalars take 8 bytes; an array of n elements takes 8n
//! contiguous bytes starting at its offset. Offsets are assigned in
//! discovery order: first the user variables in symbol-table order, then
//! every name the instruction stream mentions that is not yet mapped.

use crate::error::CodegenError;
use indexmap::IndexMap;
use rmc_ir::{
    is_bool_literal, is_char_literal, is_double_literal, is_int_literal, is_label,
    is_string_literal, TacProgram,
};
use rmc_sem::SymbolTable;

/// Hard ceiling on mapped names.
pub const MAX_SLOTS: usize = 8192;

/// One mapped name.
#[derive(Clone, Copy, Debug)]
pub struct Slot {
    /// Offset of the slot (or of the array's first element) from `%rbp`.
    pub offset: i32,
    /// Element count for arrays, 0 for scalars.
    pub array_size: i32,
}

/// Name-to-offset mapping for one frame.
#[derive(Clone, Debug)]
pub struct StackMap {
    slots: IndexMap<String, Slot>,
    next_offset: i32,
}

impl StackMap {
    /// Builds the map in two passes: symbol table first, then the stream.
    pub fn build(program: &TacProgram, table: &SymbolTable) -> Result<Self, CodegenError> {
        let mut map = StackMap {
            slots: IndexMap::new(),
            next_offset: -8,
        };

        for symbol in table.iter() {
            if map.slots.contains_key(&symbol.name) {
                continue;
            }
            if symbol.is_array {
                let size = symbol
                    .array_size
                    .as_deref()
                    .and_then(|s| s.parse::<i32>().ok())
                    .ok_or_else(|| CodegenError::BadArraySize {
                        name: symbol.name.clone(),
                    })?;
                map.insert(&symbol.name, size)?;
            } else {
                map.insert(&symbol.name, 0)?;
            }
        }

        for (_, instr) in program.iter_ordered() {
            let mut names: Vec<&str> = instr.used_operands();
            if let Some(defined) = instr.defined_name() {
                names.push(defined);
            }
            for name in names {
                if is_storage_name(name) && !map.slots.contains_key(name) {
                    map.insert(name, 0)?;
                }
            }
        }

        Ok(map)
    }

    fn insert(&mut self, name: &str, array_size: i32) -> Result<(), CodegenError> {
        if self.slots.len() >= MAX_SLOTS {
            return Err(CodegenError::StackMapLimit);
        }
        let offset = self.next_offset;
        self.next_offset -= 8 * array_size.max(1);
        self.slots.insert(
            name.to_string(),
            Slot {
                offset,
                array_size,
            },
        );
        Ok(())
    }

    /// The slot of a mapped name.
    pub fn offset_of(&self, name: &str) -> Option<i32> {
        self.slots.get(name).map(|s| s.offset)
    }

    /// Total frame size: the bytes in use plus padding, rounded up to a
    /// multiple of 16.
    pub fn frame_size(&self) -> i32 {
        let used = -self.next_offset + 16;
        (used + 15) / 16 * 16
    }

    /// Iterates `(name, slot)` in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}

/// True for operands that need a stack slot: anything that is neither a
/// literal nor a label.
fn is_storage_name(name: &str) -> bool {
    !(name.is_empty()
        || is_int_literal(name)
        || is_double_literal(name)
        || is_bool_literal(name)
        || is_char_literal(name)
        || is_string_literal(name)
        || is_label(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmc_util::Handler;

    fn build_for(body: &str) -> StackMap {
        let tokens = rmc_lex::tokenize(&format!("{{ {body}")).unwrap();
        let ast = rmc_par::parse(tokens).unwrap();
        let handler = Handler::new();
        let table = rmc_sem::check(&ast, &handler).unwrap();
        let program = rmc_ir::lower(&ast).unwrap();
        StackMap::build(&program, &table).unwrap()
    }

    #[test]
    fn test_scalars_in_declaration_order() {
        let map = build_for("int a = 5; int b = 10; int c = a + b; }");
        assert_eq!(map.offset_of("a"), Some(-8));
        assert_eq!(map.offset_of("b"), Some(-16));
        assert_eq!(map.offset_of("c"), Some(-24));
    }

    #[test]
    fn test_temps_follow_user_variables() {
        let map = build_for("int a = 5; }");
        assert_eq!(map.offset_of("a"), Some(-8));
        assert_eq!(map.offset_of("T0"), Some(-16));
    }

    #[test]
    fn test_array_consumes_contiguous_slots() {
        let map = build_for("int arr[3]; int x = 1; }");
        assert_eq!(map.offset_of("arr"), Some(-8));
        // Three elements of eight bytes push the next slot to -32.
        assert_eq!(map.offset_of("x"), Some(-32));
    }

    #[test]
    fn test_frame_size_is_multiple_of_16() {
        let map = build_for("int a = 1; int b = 2; }");
        assert_eq!(map.frame_size() % 16, 0);
        assert!(map.frame_size() >= 32);
    }

    #[test]
    fn test_literals_get_no_slot() {
        let map = build_for("int a = 5; }");
        assert_eq!(map.offset_of("5"), None);
        assert_eq!(map.offset_of("true"), None);
    }

    #[test]
    fn test_symbolic_array_size_rejected() {
        let tokens = rmc_lex::tokenize("{ int n = 4; int arr[n]; }").unwrap();
        let ast = rmc_par::parse(tokens).unwrap();
        let handler = Handler::new();
        let table = rmc_sem::check(&ast, &handler).unwrap();
        let program = rmc_ir::lower(&ast).unwrap();
        let err = StackMap::build(&program, &table).unwrap_err();
        assert_eq!(
            err,
            CodegenError::BadArraySize {
                name: "arr".into()
            }
        );
    }
}
