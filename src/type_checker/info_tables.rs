//! Side tables produced by analysis and consumed by evaluation.

use std::{collections::HashMap, fmt::Display, rc::Rc};

use crate::{ast::ast::NodeId, stdlib::function::Function};

use super::operators::Operators;

/// Dense identifier of one declaration (a variable or a parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub usize);

impl Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Everything the evaluator needs to know about a node without looking at
/// types again. Each node is written at most once.
#[derive(Debug, Default)]
pub struct InfoTables {
    symbols: HashMap<NodeId, SymbolId>,
    functions: HashMap<NodeId, Rc<Function>>,
    operators: HashMap<NodeId, Operators>,
}

impl InfoTables {
    pub fn new() -> Self {
        InfoTables::default()
    }

    pub fn add_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        let previous = self.symbols.insert(node, symbol);
        debug_assert!(previous.is_none(), "symbol for {} written twice", node);
    }

    pub fn add_function(&mut self, node: NodeId, function: Rc<Function>) {
        let previous = self.functions.insert(node, function);
        debug_assert!(previous.is_none(), "function for {} written twice", node);
    }

    pub fn add_operator(&mut self, node: NodeId, operator: Operators) {
        let previous = self.operators.insert(node, operator);
        debug_assert!(previous.is_none(), "operator for {} written twice", node);
    }

    pub fn symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.symbols.get(&node).copied()
    }

    pub fn function(&self, node: NodeId) -> Option<&Rc<Function>> {
        self.functions.get(&node)
    }

    pub fn operator(&self, node: NodeId) -> Option<Operators> {
        self.operators.get(&node).copied()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Operator entries sorted by node, for comparing two analyses.
    pub fn sorted_operators(&self) -> Vec<(NodeId, Operators)> {
        let mut operators: Vec<_> = self.operators.iter().map(|(k, v)| (*k, *v)).collect();
        operators.sort_by_key(|(node, _)| *node);
        operators
    }

    /// Symbol entries sorted by node, for comparing two analyses.
    pub fn sorted_symbols(&self) -> Vec<(NodeId, SymbolId)> {
        let mut symbols: Vec<_> = self.symbols.iter().map(|(k, v)| (*k, *v)).collect();
        symbols.sort_by_key(|(node, _)| *node);
        symbols
    }
}
