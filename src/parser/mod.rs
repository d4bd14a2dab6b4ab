//! Parser module for building the parse tree.
//!
//! This module contains the parser that transforms a stream of tokens
//! into a tree of statements and expressions. It uses a Pratt parser for
//! expressions with proper operator precedence and handles:
//!
//! - Statement parsing (declarations, assignments, functions, control flow)
//! - Calls with and without brackets
//! - Expression parsing (binary ops, indexing, literals, interpolation)
//! - Type parsing for type annotations and native signatures
//!
//! Every node receives a `NodeId` in source order, which later phases use
//! to attach analysis results.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
