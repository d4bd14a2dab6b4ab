//! The standard library: the root scope every script is analyzed against,
//! and the contract for binding Rust functions as natives.

pub mod context;
pub mod function;
pub mod native;
pub mod natives;
pub mod stdlib;

#[cfg(test)]
mod tests;
