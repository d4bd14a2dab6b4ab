//! Running scripts inside a host that hands out bounded slices of time.
//!
//! A [`script_run::ScriptRun`] owns one program from loading to completion
//! and advances it a tick at a time. The [`interpreter::Interpreter`] keeps
//! the standard library and every active run, and ticks them in order.

pub mod config;
pub mod interpreter;
pub mod script_run;
