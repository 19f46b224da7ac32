//! The symbol table.
//!
//! An append-only sequence of symbols; nothing is ever removed when a scope
//! exits. Resolution filters by the checker's current scope depth and
//! active block-id stack instead: an entry is visible when its name and
//! arrayness match, it was declared at a depth not deeper than the current
//! one, and its block id is still on the stack. The checker guarantees
//! `(name, is_array)` uniqueness within an active stack, so at most one
//! entry is ever visible for a query.

use rmc_par::BaseType;

/// One symbol-table entry.
#[derive(Clone, Debug)]
pub struct Symbol {
    /// Symbol name.
    pub name: String,
    /// Base type.
    pub ty: BaseType,
    /// True for arrays.
    pub is_array: bool,
    /// Size lexeme (an integer literal or a symbol name); arrays only.
    pub array_size: Option<String>,
    /// True when the declaration carried an initializer. Never updated by
    /// later assignments.
    pub is_initialized: bool,
    /// Scope depth at the declaration site.
    pub scope: i32,
    /// Block id at the declaration site (0 for top-level symbols).
    pub block_id: i32,
}

/// Append-only symbol table.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a symbol.
    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Resolves a name against the active scope/block-stack context.
    pub fn resolve(
        &self,
        name: &str,
        is_array: bool,
        scope: i32,
        block_stack: &[i32],
    ) -> Option<&Symbol> {
        self.symbols.iter().find(|s| {
            s.name == name
                && s.is_array == is_array
                && s.scope <= scope
                && block_stack.contains(&s.block_id)
        })
    }

    /// True when `resolve` would find an entry.
    pub fn is_declared(&self, name: &str, is_array: bool, scope: i32, block_stack: &[i32]) -> bool {
        self.resolve(name, is_array, scope, block_stack).is_some()
    }

    /// True if the name resolves to any entry, active or not.
    ///
    /// The optimizer and code generator run after scoping has been
    /// validated and only need to distinguish program variables from
    /// temporaries and literals.
    pub fn contains_name(&self, name: &str) -> bool {
        self.symbols.iter().any(|s| s.name == name)
    }

    /// Returns the declared element count of an array symbol.
    pub fn array_size_of(&self, name: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.name == name && s.is_array)
            .and_then(|s| s.array_size.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, scope: i32, block_id: i32) -> Symbol {
        Symbol {
            name: name.into(),
            ty: BaseType::Int,
            is_array: false,
            array_size: None,
            is_initialized: true,
            scope,
            block_id,
        }
    }

    #[test]
    fn test_resolve_requires_block_on_stack() {
        let mut table = SymbolTable::new();
        table.push(sym("x", 2, 1));

        assert!(table.resolve("x", false, 2, &[0, 1]).is_some());
        assert!(table.resolve("x", false, 2, &[0]).is_none());
    }

    #[test]
    fn test_resolve_requires_enclosing_scope() {
        let mut table = SymbolTable::new();
        table.push(sym("x", 2, 1));

        // Declared at depth 2, invisible from depth 1.
        assert!(table.resolve("x", false, 1, &[0, 1]).is_none());
        assert!(table.resolve("x", false, 3, &[0, 1]).is_some());
    }

    #[test]
    fn test_resolve_distinguishes_arrayness() {
        let mut table = SymbolTable::new();
        let mut arr = sym("a", 0, 0);
        arr.is_array = true;
        arr.array_size = Some("3".into());
        table.push(arr);

        assert!(table.resolve("a", true, 0, &[0]).is_some());
        assert!(table.resolve("a", false, 0, &[0]).is_none());
        assert_eq!(table.array_size_of("a"), Some("3"));
    }

    #[test]
    fn test_contains_name_ignores_context() {
        let mut table = SymbolTable::new();
        table.push(sym("gone", 3, 9));
        assert!(table.contains_name("gone"));
        assert!(!table.contains_name("other"));
    }
}
