use std::{any::Any, time::Duration};

use crate::stdlib::context::PrintHandler;

/// Wall-clock time one run may use per tick.
pub const DEFAULT_TICK_BUDGET: Duration = Duration::from_millis(3);

/// Function call frames a run may have active at once.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 512;

/// Settings shared by every run of an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub tick_budget: Duration,
    pub max_recursion_depth: usize,
    /// Applied to runs started without their own animation speed.
    pub default_animation_speed: Option<u32>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            tick_budget: DEFAULT_TICK_BUDGET,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            default_animation_speed: None,
        }
    }
}

/// Settings for a single run.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// With a speed `n`, the run only advances every `n`-th tick and stops
    /// each tick after its first function call.
    pub animation_speed: Option<u32>,
    /// Host data handed to natives through the run context.
    pub metadata: Option<Box<dyn Any>>,
    /// Returned to scripts by `args()`.
    pub args: String,
    /// Seed for `random`; runs without one are seeded from entropy.
    pub seed: Option<u64>,
    pub output: PrintHandler,
}

impl RunOptions {
    pub fn with_output(output: PrintHandler) -> Self {
        RunOptions {
            output,
            ..RunOptions::default()
        }
    }
}
