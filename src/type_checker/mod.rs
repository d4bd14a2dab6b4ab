//! Semantic analysis.
//!
//! A single walk over the parse tree that:
//!
//! - resolves every variable reference to a symbol id, honoring `^` prefixes
//! - resolves every call site to one overload, literal widening included
//! - picks the type-specialized operator for every operator expression
//! - rejects unreachable code and functions that can finish without a value
//!
//! The results are recorded in [`info_tables::InfoTables`], which the
//! evaluator runs from without re-checking anything.

pub mod dead_code;
pub mod info_tables;
pub mod operators;
pub mod scope;
pub mod suggest;
pub mod type_checker;

#[cfg(test)]
mod tests;
