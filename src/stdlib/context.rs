//! Per-run state that natives can see and change.

use std::{any::Any, cell::RefCell, fmt::Debug, rc::Rc};

use rand::{rngs::StdRng, SeedableRng};

/// Where a run's `print` output goes.
#[derive(Clone, Default)]
pub enum PrintHandler {
    /// Writes to stdout (default).
    #[default]
    Stdout,
    /// Captures into a shared buffer, one line per print.
    Buffer(Rc<RefCell<String>>),
    /// Discards all output.
    Silent,
}

impl PrintHandler {
    /// A capturing handler and the buffer it writes into.
    pub fn buffer() -> (PrintHandler, Rc<RefCell<String>>) {
        let buffer = Rc::new(RefCell::new(String::new()));
        (PrintHandler::Buffer(Rc::clone(&buffer)), buffer)
    }

    pub fn println(&self, message: &str) {
        match self {
            PrintHandler::Stdout => println!("{}", message),
            PrintHandler::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(message);
                buffer.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }
}

impl Debug for PrintHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintHandler::Stdout => write!(f, "Stdout"),
            PrintHandler::Buffer(_) => write!(f, "Buffer"),
            PrintHandler::Silent => write!(f, "Silent"),
        }
    }
}

/// The building cursor moved by `move` and read by `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

pub struct RunContext {
    pub cursor: Cursor,
    /// Host data attached to the run, opaque to the interpreter.
    pub metadata: Option<Box<dyn Any>>,
    pub random: StdRng,
    pub output: PrintHandler,
    /// The argument string the run was started with.
    pub args: String,
}

impl RunContext {
    pub fn new(output: PrintHandler, args: String, seed: Option<u64>) -> Self {
        let random = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        RunContext {
            cursor: Cursor::default(),
            metadata: None,
            random,
            output,
            args,
        }
    }

    pub fn move_cursor(&mut self, dx: i64, dy: i64, dz: i64) {
        self.cursor.x += dx;
        self.cursor.y += dy;
        self.cursor.z += dz;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.random = StdRng::seed_from_u64(seed);
    }

    pub fn metadata<T: 'static>(&self) -> Option<&T> {
        self.metadata.as_deref()?.downcast_ref::<T>()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        RunContext::new(PrintHandler::Stdout, String::new(), None)
    }
}

impl Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("cursor", &self.cursor)
            .field("output", &self.output)
            .field("args", &self.args)
            .finish()
    }
}
