//! Chain of scopes used to resolve names during analysis.

use crate::analysis::symbol::{Namespace, Symbol, SymbolTable};
use crate::data::ExprType;
use crate::error::{QueryError, QueryResult};
use indexmap::IndexMap;

/// One scope plus a link to the enclosing one.
///
/// Lookups walk from the innermost scope outwards and the first binding
/// wins. Mutations only ever touch the innermost scope.
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    parent: Option<Box<TypeEnvironment>>,
    symbol_table: SymbolTable,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: TypeEnvironment) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            symbol_table: SymbolTable::new(),
        }
    }

    pub fn parent(&self) -> Option<&TypeEnvironment> {
        self.parent.as_deref()
    }

    /// Detach and return the enclosing scope.
    pub fn take_parent(&mut self) -> Option<TypeEnvironment> {
        self.parent.take().map(|parent| *parent)
    }

    pub fn resolve(&self, symbol: &Symbol) -> QueryResult<ExprType> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(ty) = env.symbol_table.lookup(symbol) {
                return Ok(ty);
            }
            scope = env.parent();
        }
        Err(QueryError::semantic(format!(
            "can't resolve {} in type env",
            symbol
        )))
    }

    /// Every binding visible in `namespace`. Inner definitions shadow outer
    /// ones of the same name.
    pub fn lookup_all_fields(&self, namespace: Namespace) -> IndexMap<String, ExprType> {
        let mut result = IndexMap::new();
        let mut scope = Some(self);
        while let Some(env) = scope {
            for (name, ty) in env.symbol_table.lookup_all_fields(namespace) {
                result.entry(name).or_insert(ty);
            }
            scope = env.parent();
        }
        result
    }

    pub fn define(&mut self, symbol: &Symbol, ty: ExprType) {
        self.symbol_table.store(symbol, ty);
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<ExprType> {
        self.symbol_table.remove(symbol)
    }

    /// Drop every binding of the innermost scope.
    pub fn clear(&mut self) {
        self.symbol_table.clear();
    }

    /// Bindings of the innermost scope only.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }
}
