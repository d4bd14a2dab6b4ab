//! Unit tests for the evaluator.
//!
//! Programs are analyzed with the full standard library and stepped to
//! completion with `print` captured into a buffer.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{
    evaluator::EvaluationVisitor,
    value::{MapValue, Material, Value},
};
use crate::{
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    stdlib::{
        context::{PrintHandler, RunContext},
        stdlib::StandardLibrary,
    },
    type_checker::{info_tables::SymbolId, type_checker::type_check},
};

const MAX_DEPTH: usize = 64;

fn prepare(source: &str) -> EvaluationVisitor {
    let tokens = tokenize(source.to_string(), Some("test.archit".to_string())).unwrap();
    let program = parse(tokens, Rc::new("test.archit".to_string())).unwrap();
    let tables = type_check(&program, &StandardLibrary::new()).unwrap();

    EvaluationVisitor::new(&program, Rc::new(tables), MAX_DEPTH)
}

fn capture() -> (RunContext, Rc<std::cell::RefCell<String>>) {
    let (output, buffer) = PrintHandler::buffer();
    (RunContext::new(output, String::new(), Some(0)), buffer)
}

fn finish(evaluator: &mut EvaluationVisitor, context: &mut RunContext) -> Result<Vec<String>, Error> {
    let mut calls = vec![];
    while !evaluator.is_finished() {
        if let Some(call) = evaluator.step(context)? {
            calls.push(call);
        }
    }
    Ok(calls)
}

fn run(source: &str) -> Result<String, Error> {
    let mut evaluator = prepare(source);
    let (mut context, buffer) = capture();

    finish(&mut evaluator, &mut context)?;

    let output = buffer.borrow().clone();
    Ok(output)
}

fn run_error(source: &str) -> Error {
    match run(source) {
        Ok(output) => panic!("expected a runtime error, got output {:?}", output),
        Err(err) => err,
    }
}

#[test]
fn test_compound_assignment() {
    assert_eq!(run("var x: number = 5;\nx += 3;\nprint x;").unwrap(), "8\n");
}

#[test]
fn test_repeat_runs_exactly_count_times() {
    assert_eq!(run("repeat 3 { print \"hi\"; }").unwrap(), "hi\nhi\nhi\n");
}

#[test]
fn test_repeat_negative_count() {
    assert_eq!(run("repeat -2 { print \"never\"; }\nprint \"done\";").unwrap(), "done\n");
}

#[test]
fn test_while_loop() {
    let source = "var i: number = 0;\nwhile i < 3 {\n  print i;\n  i += 1;\n}";

    assert_eq!(run(source).unwrap(), "0\n1\n2\n");
}

#[test]
fn test_break_and_continue() {
    let source = "var i: number = 0;
while true {
  i += 1;
  if i == 2 { continue; }
  if i > 4 { break; }
  print i;
}
print \"after\";";

    assert_eq!(run(source).unwrap(), "1\n3\n4\nafter\n");
}

#[test]
fn test_break_only_leaves_inner_loop() {
    let source = "repeat 2 {
  repeat 5 {
    print \"inner\";
    break;
  }
  print \"outer\";
}";

    assert_eq!(run(source).unwrap(), "inner\nouter\ninner\nouter\n");
}

#[test]
fn test_if_else_chain() {
    let source = "function describe(n: number): string {
  if n < 0 { return \"negative\"; } else if n == 0 { return \"zero\"; } else { return \"positive\"; }
}
print describe(-3);
print describe(0);
print describe(7);";

    assert_eq!(run(source).unwrap(), "negative\nzero\npositive\n");
}

#[test]
fn test_recursion() {
    let source = "function fact(n: number): number {
  if n <= 1 { return 1; }
  return n * fact(n - 1);
}
print fact(25);";

    assert_eq!(run(source).unwrap(), "15511210043330985984000000\n");
}

#[test]
fn test_recursion_limit_is_runtime_error() {
    let source = "function forever(n: number): number {\n  return forever(n + 1);\n}\nprint forever(0);";
    let err = run_error(source);

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.get_internal_error(), &ErrorImpl::RecursionLimit { limit: MAX_DEPTH });
    assert_eq!(err.line(), 2);
}

#[test]
fn test_return_from_inside_loop() {
    let source = "function first_over(limit: number): number {
  var i: number = 0;
  while true {
    i += 1;
    if i > limit { return i; }
  }
  return -1;
}
print first_over(4);";

    assert_eq!(run(source).unwrap(), "5\n");
}

#[test]
fn test_void_function_without_return() {
    let source = "function greet(name: string) {\n  print `hello {name}`;\n}\ngreet(\"archit\");\ngreet \"again\";";

    assert_eq!(run(source).unwrap(), "hello archit\nhello again\n");
}

#[test]
fn test_early_return_in_void_function() {
    let source = "function check(n: number) {\n  if n > 1 { return; }\n  print n;\n}\ncheck(1);\ncheck(2);";

    assert_eq!(run(source).unwrap(), "1\n");
}

#[test]
fn test_operands_evaluate_left_to_right() {
    let source = "function trace(n: number): number {\n  print n;\n  return n;\n}\nprint trace(1) + trace(2) * trace(3);";

    assert_eq!(run(source).unwrap(), "1\n2\n3\n7\n");
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let source = "function trace(n: number): number {\n  print n;\n  return n;\n}\nmove trace(1), trace(2), trace(3);";

    assert_eq!(run(source).unwrap(), "1\n2\n3\n");
}

#[test]
fn test_up_level_assignment() {
    let source = "var x: number = 1;\n{\n  var x: number = 5;\n  ^x = 2;\n  print x;\n}\nprint x;";

    assert_eq!(run(source).unwrap(), "5\n2\n");
}

#[test]
fn test_collections() {
    let source = "var xs: [number] = [];
xs = append(xs, 4);
xs = append(xs, 9);
print size(xs);
print xs[1];
var m: |string -> real| = {\"a\": 1.5, \"b\": 2.0};
print m[\"b\"];
print keys(m);
print has(m, \"c\");";

    assert_eq!(run(source).unwrap(), "2\n9\n2.0\n[\"a\", \"b\"]\nfalse\n");
}

#[test]
fn test_collections_are_copied_on_assignment() {
    let source = "var a: [number] = [1];\nvar b: [number] = a;\nb = append(b, 2);\nprint size(a);\nprint size(b);";

    assert_eq!(run(source).unwrap(), "1\n2\n");
}

#[test]
fn test_interpolation_and_concatenation() {
    let source = "var n: number = 3;\nvar r: real = 0.5;\nprint `n={n}, r={r}, both={n > 2 and r < 1.0}`;\nprint \"a\" + \"b\";";

    assert_eq!(run(source).unwrap(), "n=3, r=0.5, both=true\nab\n");
}

#[test]
fn test_arithmetic() {
    let source = "var a: number = -7;
print a % 3;
print a / 2;
print 2 ^ 10;
print 7.5 % 2.0;
print not (1 == 2);";

    assert_eq!(run(source).unwrap(), "2\n-3\n1024\n1.5\ntrue\n");
}

#[test]
fn test_division_by_zero() {
    let err = run_error("var zero: number = 0;\nprint 10 / zero;");

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.get_internal_error(), &ErrorImpl::DivisionByZero);
    assert_eq!(err.line(), 2);

    assert_eq!(run_error("print 1.0 % 0.0;").get_internal_error(), &ErrorImpl::DivisionByZero);
}

#[test]
fn test_invalid_exponent() {
    let err = run_error("print 2 ^ -1;");

    assert_eq!(err.get_error_name(), "InvalidExponent");
}

#[test]
fn test_index_errors() {
    let err = run_error("var xs: [number] = [1, 2];\nprint xs[2];");
    assert_eq!(
        err.get_internal_error(),
        &ErrorImpl::IndexOutOfBounds {
            index: "2".to_string(),
            length: 2,
        }
    );

    let err = run_error("var m: |string -> number| = {\"a\": 1};\nprint m[\"z\"];");
    assert_eq!(err.get_error_name(), "MissingKey");
}

#[test]
fn test_native_failure_is_runtime_error() {
    let err = run_error("print as_number(\"twelve\");");

    assert_eq!(err.kind(), ErrorKind::Runtime);
    match err.get_internal_error() {
        ErrorImpl::NativeCallFailed { function, message } => {
            assert_eq!(function, "as_number");
            assert!(message.contains("twelve"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_random_rejects_unusable_bounds() {
    let err = run_error("print random(sqrt(-1.0), 1.0);");
    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert!(matches!(
        err.get_internal_error(),
        ErrorImpl::NativeCallFailed { function, .. } if function == "random"
    ));

    let err = run_error("var m: real = 1.0;\nrepeat 400 { m *= 10.0; }\nprint random(1.0, m);");
    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.line(), 3);

    let err = run_error("var big: real = 1.0;\nrepeat 308 { big *= 10.0; }\nprint random(-big, big);");
    assert_eq!(err.kind(), ErrorKind::Runtime);
}

#[test]
fn test_literals_and_materials() {
    let source = "var d: <up, down> = <up>;\nprint d;\nprint d == <down>;\nprint #stone;\nprint #create:gear;";

    assert_eq!(run(source).unwrap(), "up\nfalse\nminecraft:stone\ncreate:gear\n");
}

#[test]
fn test_globals_after_run() {
    let mut evaluator = prepare("var total: number = 0;\nrepeat 4 { total += 2; }");
    let (mut context, _) = capture();

    finish(&mut evaluator, &mut context).unwrap();

    assert_eq!(evaluator.global(SymbolId(0)), Some(&Value::from(8)));
    assert_eq!(evaluator.depth(), 0);
}

#[test]
fn test_step_reports_calls() {
    let mut evaluator = prepare("move <posx>;\nprint 1 + 2;");
    let (mut context, _) = capture();

    let calls = finish(&mut evaluator, &mut context).unwrap();

    assert_eq!(calls, vec!["move(posx)".to_string(), "print(3)".to_string()]);
    assert_eq!(context.cursor.x, 1);
}

#[test]
fn test_loop_stack_depth_is_constant() {
    fn deepest(source: &str) -> usize {
        let mut evaluator = prepare(source);
        let (mut context, _) = capture();
        let mut deepest = 0;

        while !evaluator.is_finished() {
            evaluator.step(&mut context).unwrap();
            deepest = deepest.max(evaluator.pending());
        }
        deepest
    }

    assert_eq!(
        deepest("var i: number = 0;\nrepeat 3 { i += 1; }"),
        deepest("var i: number = 0;\nrepeat 300 { i += 1; }")
    );
    assert_eq!(
        deepest("var i: number = 0;\nwhile i < 3 { i += 1; }"),
        deepest("var i: number = 0;\nwhile i < 300 { i += 1; }")
    );
}

#[test]
fn test_interleaved_stepping_matches_single_run() {
    let first = "var i: number = 0;\nwhile i < 5 { print i * i; i += 1; }";
    let second = "function fib(n: number): number {\n  if n < 2 { return n; }\n  return fib(n - 1) + fib(n - 2);\n}\nprint fib(10);";

    let expected_first = run(first).unwrap();
    let expected_second = run(second).unwrap();

    let mut a = prepare(first);
    let mut b = prepare(second);
    let (mut context_a, buffer_a) = capture();
    let (mut context_b, buffer_b) = capture();

    while !a.is_finished() || !b.is_finished() {
        a.step(&mut context_a).unwrap();
        b.step(&mut context_b).unwrap();
        b.step(&mut context_b).unwrap();
    }

    assert_eq!(buffer_a.borrow().as_str(), expected_first);
    assert_eq!(buffer_b.borrow().as_str(), expected_second);
    assert_eq!(expected_second, "55\n");
}

#[test]
fn test_value_display() {
    let map: MapValue = [(Value::from("k"), Value::List(vec![Value::from(1.0)]))].into_iter().collect();

    assert_eq!(Value::Map(map).to_string(), "{\"k\": [1.0]}");
    assert_eq!(Value::Material(Material::new("minecraft", "dirt")).to_string(), "minecraft:dirt");
    assert_eq!(Value::Unit.to_string(), "nothing");
    assert_eq!(Material::parse(":oak_log"), Some(Material::new("minecraft", "oak_log")));
    assert_eq!(Material::parse("a:b:c"), None);
}
