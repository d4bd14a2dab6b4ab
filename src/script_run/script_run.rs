use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use tracing::{debug, error, info, trace};

use crate::{
    errors::errors::{Error, ErrorImpl},
    evaluator::evaluator::EvaluationVisitor,
    lexer::lexer::tokenize,
    parser::parser::parse,
    stdlib::{context::RunContext, stdlib::StandardLibrary},
    type_checker::type_checker::type_check,
    Position,
};

use super::config::{InterpreterConfig, RunOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    /// Ended early, by an error or by the host.
    Stopped,
    Finished,
}

/// One script from loading to completion.
pub struct ScriptRun {
    path: PathBuf,
    file_name: String,
    started_at: DateTime<Local>,
    state: RunState,
    source: Option<String>,
    evaluator: Option<EvaluationVisitor>,
    context: RunContext,
    error: Option<Error>,
    last_call: Option<String>,
    animation_speed: Option<u32>,
    tick_budget: Duration,
    max_depth: usize,
    ticks: u64,
}

impl ScriptRun {
    pub fn new(path: impl AsRef<Path>, options: RunOptions, config: &InterpreterConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let mut context = RunContext::new(options.output, options.args, options.seed);
        context.metadata = options.metadata;

        ScriptRun {
            path,
            file_name,
            started_at: Local::now(),
            state: RunState::NotStarted,
            source: None,
            evaluator: None,
            context,
            error: None,
            last_call: None,
            animation_speed: options.animation_speed.or(config.default_animation_speed),
            tick_budget: config.tick_budget,
            max_depth: config.max_recursion_depth,
            ticks: 0,
        }
    }

    /// `<file name>@<HH:MM:SS>` of the moment the run was created.
    pub fn id(&self) -> String {
        format!("{}@{}", self.file_name, self.started_at.format("%H:%M:%S"))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The script's source, once it has been read.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The error that stopped the run.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// In animation mode, the call the last tick ended on.
    pub fn last_call(&self) -> Option<&str> {
        self.last_call.as_deref()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RunContext {
        &mut self.context
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RunState::NotStarted | RunState::Running)
    }

    /// Reads, parses and analyzes the script. Nothing runs yet; on failure
    /// the run is stopped and the error kept.
    pub fn start_execution(&mut self, stdlib: &StandardLibrary) -> Result<(), Error> {
        if self.state != RunState::NotStarted {
            return Err(Error::new(
                ErrorImpl::InternalError {
                    message: format!("run {} was already started", self.id()),
                },
                self.file_position(),
            ));
        }

        match self.prepare(stdlib) {
            Ok(evaluator) => {
                self.evaluator = Some(evaluator);
                self.state = RunState::Running;
                info!("Started script run {}", self.id());
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn prepare(&mut self, stdlib: &StandardLibrary) -> Result<EvaluationVisitor, Error> {
        let source = self.read_source()?;
        self.source = Some(source.clone());

        let tokens = tokenize(source, Some(self.file_name.clone()))?;
        let program = parse(tokens, Rc::new(self.file_name.clone()))?;
        let tables = type_check(&program, stdlib)?;

        Ok(EvaluationVisitor::new(&program, Rc::new(tables), self.max_depth))
    }

    fn read_source(&self) -> Result<String, Error> {
        let unavailable = |reason: String| {
            Error::new(
                ErrorImpl::ScriptUnavailable {
                    path: self.path.display().to_string(),
                    reason,
                },
                self.file_position(),
            )
        };

        if !self.path.exists() {
            return Err(unavailable(String::from("file does not exist")));
        }
        if self.path.is_dir() {
            return Err(unavailable(String::from("path is a directory")));
        }

        fs::read_to_string(&self.path).map_err(|err| unavailable(err.to_string()))
    }

    fn file_position(&self) -> Position {
        Position::new(0, 1, 1, Rc::new(self.file_name.clone()))
    }

    /// Advances the run by one host tick.
    pub fn run_next_tick(&mut self) -> Result<RunState, Error> {
        if self.state != RunState::Running {
            return Ok(self.state);
        }

        self.ticks += 1;

        if let Some(speed) = self.animation_speed {
            if self.ticks % u64::from(speed.max(1)) != 0 {
                trace!("Run {} skipped tick {}", self.id(), self.ticks);
                return Ok(self.state);
            }
        }

        let evaluator = match self.evaluator.as_mut() {
            Some(evaluator) => evaluator,
            None => {
                let err = Error::new(
                    ErrorImpl::InternalError {
                        message: String::from("running without a program"),
                    },
                    self.file_position(),
                );
                return Err(self.fail(err));
            }
        };

        let deadline = Instant::now() + self.tick_budget;
        let mut steps = 0usize;

        while !evaluator.is_finished() {
            let call = match evaluator.step(&mut self.context) {
                Ok(call) => call,
                Err(err) => return Err(self.fail(err)),
            };
            steps += 1;

            if let (Some(call), Some(_)) = (call, self.animation_speed) {
                debug!("{}", call);
                self.last_call = Some(call);
                break;
            }

            if Instant::now() >= deadline {
                break;
            }
        }

        trace!("Run {} took {} steps in tick {}", self.id(), steps, self.ticks);

        if self.evaluator.as_ref().is_some_and(EvaluationVisitor::is_finished) {
            self.state = RunState::Finished;
            info!("Script run {} finished after {} ticks", self.id(), self.ticks);
        }

        Ok(self.state)
    }

    /// Stops the run where it is. Effects that already happened stay.
    pub fn stop(&mut self) {
        if self.is_active() {
            self.state = RunState::Stopped;
            info!("Script run {} stopped", self.id());
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        error!("Script run {} failed: {}", self.id(), err);
        self.state = RunState::Stopped;
        self.error = Some(err.clone());
        err
    }
}

impl std::fmt::Debug for ScriptRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRun")
            .field("id", &self.id())
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .finish()
    }
}
