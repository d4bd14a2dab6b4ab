//! Integration tests for end-to-end script runs.
//!
//! These tests go through the public API only: a script file on disk is
//! loaded, analyzed and ticked to completion by an interpreter, with host
//! natives registered the way an embedding would.

use std::{cell::RefCell, io::Write, rc::Rc, time::Duration};

use archit::{
    errors::errors::ErrorKind,
    format_error,
    script_run::{
        config::{InterpreterConfig, RunOptions},
        interpreter::Interpreter,
        script_run::RunState,
    },
    stdlib::context::{PrintHandler, RunContext},
};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn script(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

fn run_with(interpreter: &Interpreter, source: &str) -> (Result<RunState, archit::errors::errors::Error>, String) {
    let file = script(source);
    let (output, buffer) = PrintHandler::buffer();

    let result = interpreter
        .run_to_completion(file.path(), RunOptions::with_output(output))
        .map(|run| run.state());

    let printed = buffer.borrow().clone();
    (result, printed)
}

fn run(source: &str) -> String {
    let (result, output) = run_with(&Interpreter::new(InterpreterConfig::default()), source);
    assert_eq!(result.unwrap(), RunState::Finished);
    output
}

#[test]
fn test_compound_assignment_program() {
    assert_eq!(run("var x: number = 5; x += 3; print x;"), "8\n");
}

#[test]
fn test_repeat_program() {
    assert_eq!(run("repeat 3 { print \"hi\"; }"), "hi\nhi\nhi\n");
}

#[test]
fn test_building_program() {
    let source = "// walks a square and reports where it ended
function side(length: number, direction: <posx, negx, posz, negz>) {
  repeat length {
    move direction;
  }
}

side(3, <posx>);
side(2, <posz>);
side(1, <negx>);

var here: [number] = position();
print `ended at {here[0]}, {here[1]}, {here[2]}`;";

    assert_eq!(run(source), "ended at 2, 0, 2\n");
}

#[test]
fn test_string_natives_program() {
    let source = "var name: string = \"  Archit  \";
var trimmed: string = trim(name);
print upper(trimmed);
print length(trimmed);
print substring(trimmed, 0, 3) + \"!\";
print index_of(trimmed, \"chi\");";

    assert_eq!(run(source), "ARCHIT\n6\nArc!\n2\n");
}

#[test]
fn test_map_program() {
    let source = "var counts: |string -> number| = {};
var words: [string] = [\"a\", \"b\", \"a\"];
var i: number = 0;
while i < size(words) {
  var word: string = words[i];
  if has(counts, word) {
    counts = {word: counts[word] + 1, \"b\": 1};
  } else {
    counts = {\"a\": 1};
  }
  i += 1;
}
print counts;";

    assert_eq!(run(source), "{\"a\": 2, \"b\": 1}\n");
}

#[test]
fn test_recursion_limit_is_runtime_error() {
    let interpreter = Interpreter::new(InterpreterConfig {
        max_recursion_depth: 100,
        ..InterpreterConfig::default()
    });

    let (result, _) = run_with(
        &interpreter,
        "function deeper(n: number): number { return deeper(n + 1); }\nprint deeper(0);",
    );
    let err = result.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.get_error_name(), "RecursionLimit");
}

#[test]
fn test_deep_recursion_within_limit() {
    let interpreter = Interpreter::new(InterpreterConfig {
        max_recursion_depth: 5000,
        ..InterpreterConfig::default()
    });

    let (result, output) = run_with(
        &interpreter,
        "function sum(n: number): number {\n  if n == 0 { return 0; }\n  return n + sum(n - 1);\n}\nprint sum(4000);",
    );

    assert_eq!(result.unwrap(), RunState::Finished);
    assert_eq!(output, "8002000\n");
}

#[test]
fn test_sliced_run_matches_whole_run() {
    let source = "var total: real = 0.0;
var i: number = 1;
while i <= 50 {
  total += 1.0 / as_real(i);
  i += 1;
}
print total > 4.0;
print round(total * 1000.0);";

    let whole = run(source);

    let (result, sliced) = run_with(
        &Interpreter::new(InterpreterConfig {
            tick_budget: Duration::ZERO,
            ..InterpreterConfig::default()
        }),
        source,
    );

    assert_eq!(result.unwrap(), RunState::Finished);
    assert_eq!(sliced, whole);
}

#[test]
fn test_analysis_errors_are_rendered() {
    let source = "var count: number = 1;\nprint cont + 1;";
    let (result, output) = run_with(&Interpreter::new(InterpreterConfig::default()), source);
    let err = result.unwrap_err();

    assert_eq!(output, "");
    assert_eq!(err.kind(), ErrorKind::Name);
    assert!(err.suggestions().contains(&"count".to_string()));

    let rendered = format_error(&err, source);
    assert!(rendered.starts_with("Name error: VariableNotDeclared"));
    assert!(rendered.contains("2 | print cont + 1;"));
}

#[test]
fn test_unavailable_script() {
    let dir = tempfile::tempdir().unwrap();
    let interpreter = Interpreter::new(InterpreterConfig::default());

    let err = interpreter
        .run_to_completion(dir.path().join("nope.archit"), RunOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.get_error_name(), "ScriptUnavailable");
}

#[test]
fn test_host_native_registration() {
    let placed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(vec![]));
    let log = Rc::clone(&placed);

    let mut interpreter = Interpreter::new(InterpreterConfig::default());
    let registered = interpreter.stdlib_mut().register_native(
        "native place(block: material, count: number): number;",
        move |context: &mut RunContext, block: archit::evaluator::value::Material, count: BigInt| {
            let cursor = context.cursor;
            log.borrow_mut()
                .push(format!("{} x{} at {},{},{}", block, count, cursor.x, cursor.y, cursor.z));
            count * 2
        },
    );
    assert!(registered);

    let (result, output) = run_with(
        &interpreter,
        "move 1, 2, 3;\nvar placed: number = place(#stone, 4);\nprint placed;",
    );

    assert_eq!(result.unwrap(), RunState::Finished);
    assert_eq!(output, "8\n");
    assert_eq!(*placed.borrow(), vec!["minecraft:stone x4 at 1,2,3".to_string()]);
}

#[test]
fn test_active_runs_share_ticks() {
    let slow = script("var i: number = 0;\nwhile i < 200 { i += 1; }\nprint \"slow\";");
    let fast = script("print \"fast\";");
    let (output, buffer) = PrintHandler::buffer();

    let mut interpreter = Interpreter::new(InterpreterConfig {
        tick_budget: Duration::ZERO,
        ..InterpreterConfig::default()
    });
    interpreter
        .start(slow.path(), RunOptions::with_output(output.clone()))
        .unwrap();
    interpreter.start(fast.path(), RunOptions::with_output(output)).unwrap();

    let mut ticks = 0;
    while !interpreter.is_idle() {
        interpreter.tick();
        ticks += 1;
    }

    assert!(ticks > 200);
    assert_eq!(buffer.borrow().as_str(), "fast\nslow\n");
}
