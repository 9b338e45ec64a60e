//! Symbols and the per-scope symbol table.

use crate::data::ExprType;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// Kind of name a symbol refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    FieldName,
    /// Table name or its alias
    IndexName,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::FieldName => write!(f, "FIELD_NAME"),
            Namespace::IndexName => write!(f, "INDEX_NAME"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub namespace: Namespace,
    pub name: String,
}

impl Symbol {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(Namespace::FieldName, name)
    }

    pub fn index(name: impl Into<String>) -> Self {
        Self::new(Namespace::IndexName, name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol(namespace={}, name={})", self.namespace, self.name)
    }
}

/// Name to type bindings of a single scope, kept in definition order
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    tables: HashMap<Namespace, IndexMap<String, ExprType>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol`, replacing any previous binding in this table.
    pub fn store(&mut self, symbol: &Symbol, ty: ExprType) {
        self.tables
            .entry(symbol.namespace)
            .or_default()
            .insert(symbol.name.clone(), ty);
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<ExprType> {
        self.tables
            .get_mut(&symbol.namespace)
            .and_then(|table| table.shift_remove(&symbol.name))
    }

    pub fn lookup(&self, symbol: &Symbol) -> Option<ExprType> {
        self.tables
            .get(&symbol.namespace)
            .and_then(|table| table.get(&symbol.name).copied())
    }

    /// All bindings in the symbol's namespace whose name starts with its name.
    pub fn lookup_by_prefix(&self, prefix: &Symbol) -> IndexMap<String, ExprType> {
        self.lookup_all_fields(prefix.namespace)
            .into_iter()
            .filter(|(name, _)| name.starts_with(&prefix.name))
            .collect()
    }

    pub fn lookup_all_fields(&self, namespace: Namespace) -> IndexMap<String, ExprType> {
        self.tables.get(&namespace).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, ExprType)> + '_ {
        self.tables.iter().flat_map(|(namespace, table)| {
            table
                .iter()
                .map(|(name, ty)| (Symbol::new(*namespace, name.clone()), *ty))
        })
    }
}
