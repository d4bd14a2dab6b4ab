use std::path::Path;

use tracing::{info, trace};

use crate::{errors::errors::Error, stdlib::stdlib::StandardLibrary};

use super::{
    config::{InterpreterConfig, RunOptions},
    script_run::{RunState, ScriptRun},
};

/// Owns the standard library and every active run.
pub struct Interpreter {
    stdlib: StandardLibrary,
    config: InterpreterConfig,
    runs: Vec<ScriptRun>,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Interpreter::with_stdlib(StandardLibrary::new(), config)
    }

    pub fn with_stdlib(stdlib: StandardLibrary, config: InterpreterConfig) -> Self {
        Interpreter {
            stdlib,
            config,
            runs: vec![],
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn stdlib(&self) -> &StandardLibrary {
        &self.stdlib
    }

    /// For registering host natives before runs are started.
    pub fn stdlib_mut(&mut self) -> &mut StandardLibrary {
        &mut self.stdlib
    }

    /// Loads and analyzes a script and registers it as active. Returns the
    /// run's id.
    pub fn start(&mut self, path: impl AsRef<Path>, options: RunOptions) -> Result<String, Error> {
        let mut run = ScriptRun::new(path, options, &self.config);
        run.start_execution(&self.stdlib)?;

        let id = run.id();
        self.runs.push(run);
        Ok(id)
    }

    /// Gives every active run one tick, in the order they were started.
    /// Runs that finished or stopped are removed and returned.
    pub fn tick(&mut self) -> Vec<ScriptRun> {
        for run in self.runs.iter_mut() {
            if let Err(err) = run.run_next_tick() {
                trace!("Run {} leaves the active set: {}", run.id(), err.get_error_name());
            }
        }

        let (active, done): (Vec<ScriptRun>, Vec<ScriptRun>) =
            self.runs.drain(..).partition(|run| run.state() == RunState::Running);
        self.runs = active;
        done
    }

    /// Stops every active run with `id` and returns them. Ids only have
    /// second resolution, so one script started twice in a second shares one.
    pub fn stop(&mut self, id: &str) -> Vec<ScriptRun> {
        let (mut stopped, active): (Vec<ScriptRun>, Vec<ScriptRun>) =
            self.runs.drain(..).partition(|run| run.id() == id);
        self.runs = active;

        for run in stopped.iter_mut() {
            run.stop();
        }
        if !stopped.is_empty() {
            info!("Stopped {} run(s) with id {}", stopped.len(), id);
        }
        stopped
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.runs.iter().map(ScriptRun::id).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn run(&self, id: &str) -> Option<&ScriptRun> {
        self.runs.iter().find(|run| run.id() == id)
    }

    /// Runs one script to its end outside the active set, tick by tick.
    /// Returns the finished run, or the error that stopped it.
    pub fn run_to_completion(&self, path: impl AsRef<Path>, options: RunOptions) -> Result<ScriptRun, Error> {
        let mut run = ScriptRun::new(path, options, &self.config);
        run.start_execution(&self.stdlib)?;

        while run.run_next_tick()? == RunState::Running {}

        info!("Script {} completed in {} ticks", run.id(), run.ticks());
        Ok(run)
    }
}
