//! Evaluation of analyzed programs.
//!
//! The evaluator walks the parse tree using only the tables produced by the
//! type checker: symbol ids for variables, overloads for calls and operator
//! variants for operator expressions.

pub mod evaluator;
pub mod expr;
pub mod stmt;
pub mod value;

#[cfg(test)]
mod tests;
