//! Lexical scopes used during analysis.
//!
//! The chain is a stack of [`ScopeImpl`]s sitting on top of the standard
//! library, which is the parentless root. Lookups walk from the innermost
//! scope outward and end at the standard library.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{ast::NodeId, types::Type},
    stdlib::{function::Function, stdlib::StandardLibrary},
};

use super::{info_tables::SymbolId, suggest::suggest_similar};

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: Type,
    pub symbol: SymbolId,
    /// The declaration or parameter node that introduced the variable.
    pub declaration: NodeId,
}

/// One link of the scope chain.
pub trait Scope {
    fn variable(&self, name: &str) -> Option<&Variable>;

    /// The overload whose parameter types are exactly `arguments`.
    fn function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>>;

    /// An overload that accepts `arguments` after literal widening.
    fn widened_function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>>;

    /// Every variable and function name declared in this scope, sorted.
    fn names(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct ScopeImpl {
    variables: HashMap<String, Variable>,
    functions: HashMap<String, Vec<Rc<Function>>>,
}

impl ScopeImpl {
    pub fn new() -> Self {
        ScopeImpl::default()
    }

    /// Fails if `name` is already a variable of this scope.
    pub fn define_variable(&mut self, name: &str, ty: Type, symbol: SymbolId, declaration: NodeId) -> bool {
        if self.variables.contains_key(name) {
            return false;
        }

        self.variables.insert(
            name.to_string(),
            Variable {
                ty,
                symbol,
                declaration,
            },
        );
        true
    }

    /// Fails if this scope already has an overload with the same parameter
    /// types.
    pub fn define_function(&mut self, function: Rc<Function>) -> bool {
        let overloads = self.functions.entry(function.name.clone()).or_default();

        if overloads
            .iter()
            .any(|existing| existing.parameter_types == function.parameter_types)
        {
            return false;
        }

        overloads.push(function);
        true
    }
}

impl Scope for ScopeImpl {
    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    fn function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>> {
        self.functions
            .get(name)?
            .iter()
            .find(|function| function.parameter_types == arguments)
            .cloned()
    }

    fn widened_function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>> {
        self.functions
            .get(name)?
            .iter()
            .find(|function| function.accepts_widened(arguments))
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .variables
            .keys()
            .chain(self.functions.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// The scopes visible at the current point of the walk.
pub struct ScopeChain<'a> {
    root: &'a StandardLibrary,
    scopes: Vec<ScopeImpl>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(root: &'a StandardLibrary) -> Self {
        ScopeChain { root, scopes: vec![] }
    }

    pub fn push(&mut self) {
        self.scopes.push(ScopeImpl::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Innermost scope first, standard library last.
    fn links(&self) -> impl Iterator<Item = &dyn Scope> {
        self.scopes
            .iter()
            .rev()
            .map(|scope| scope as &dyn Scope)
            .chain(std::iter::once(self.root as &dyn Scope))
    }

    fn current(&mut self) -> &mut ScopeImpl {
        if self.scopes.is_empty() {
            self.scopes.push(ScopeImpl::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn define_variable(&mut self, name: &str, ty: Type, symbol: SymbolId, declaration: NodeId) -> bool {
        self.current().define_variable(name, ty, symbol, declaration)
    }

    pub fn define_function(&mut self, function: Rc<Function>) -> bool {
        self.current().define_function(function)
    }

    /// Skips `up_levels` scopes outward, then searches that scope and its
    /// ancestors.
    pub fn resolve_variable(&self, name: &str, up_levels: usize) -> Option<&Variable> {
        self.links().skip(up_levels).find_map(|scope| scope.variable(name))
    }

    /// Exact overload match anywhere in the chain wins over a widened match
    /// in a closer scope.
    pub fn resolve_function(&self, name: &str, arguments: &[Type]) -> Option<Rc<Function>> {
        self.links()
            .find_map(|scope| scope.function(name, arguments))
            .or_else(|| self.links().find_map(|scope| scope.widened_function(name, arguments)))
    }

    /// Visible names close to `name`, closest scope first.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let names: Vec<String> = self.links().flat_map(|scope| scope.names()).collect();
        suggest_similar(name, names.iter().map(String::as_str))
    }
}
