//! Error types and error handling for the interpreter.
//!
//! This module defines the error types used throughout lexing, parsing,
//! analysis and evaluation. It includes:
//!
//! - Error structures with source position information
//! - The five error kinds (syntax, name, type, logic, runtime)
//! - Specific error variants for each phase
//! - Helpful tips and nearest-name suggestions

pub mod errors;

#[cfg(test)]
mod tests;
