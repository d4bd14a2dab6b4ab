//! Unit tests for semantic analysis.
//!
//! This module contains tests for:
//! - Operator selection and the tables recorded for the evaluator
//! - Scoping, shadowing and `^` resolution
//! - Function overloads, literal widening and suggestions
//! - Empty collection literals
//! - Dead code and return completeness

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{
    info_tables::{InfoTables, SymbolId},
    operators::Operators,
    suggest::{edit_distance, suggest_similar},
    type_checker::type_check,
};
use crate::{
    ast::{ast::Stmt, statements::BlockStmt},
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    stdlib::stdlib::StandardLibrary,
};

fn parse_source(source: &str) -> BlockStmt {
    let tokens = tokenize(source.to_string(), Some("test.archit".to_string())).unwrap();
    parse(tokens, Rc::new("test.archit".to_string())).unwrap()
}

fn check(source: &str) -> Result<InfoTables, Error> {
    type_check(&parse_source(source), &StandardLibrary::new())
}

fn check_error(source: &str) -> Error {
    match check(source) {
        Ok(_) => panic!("expected {:?} to be rejected", source),
        Err(err) => err,
    }
}

#[test]
fn test_compound_assignment_records_operator() {
    let program = parse_source("var x: number = 5;\nx += 3;\nprint x;");
    let tables = type_check(&program, &StandardLibrary::new()).unwrap();

    let assignment = program.body[1].get_id();
    assert_eq!(tables.operator(assignment), Some(Operators::AddNumbers));
}

#[test]
fn test_compound_assignment_rejects_strings() {
    let err = check_error("var s: string = \"a\";\ns += \"b\";");

    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.get_error_name(), "OperatorTypeError");
}

#[test]
fn test_binary_operators_are_specialized() {
    let program = parse_source("var a: real = 1.5 * 2.0;\nvar b: string = \"x\" + \"y\";\nvar c: logic = 1 < 2;");
    let tables = type_check(&program, &StandardLibrary::new()).unwrap();

    let operators: Vec<Operators> = tables
        .sorted_operators()
        .into_iter()
        .map(|(_, operator)| operator)
        .collect();

    assert_eq!(
        operators,
        vec![Operators::MultiplyReals, Operators::ConcatStrings, Operators::LessNumbers]
    );
}

#[test]
fn test_mixed_operands_are_rejected() {
    let err = check_error("var x: real = 1 + 2.0;");

    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(
        err.get_internal_error(),
        &ErrorImpl::OperatorTypeError {
            operator: "+".to_string(),
            left: "number".to_string(),
            right: "real".to_string(),
        }
    );
}

#[test]
fn test_declaration_type_mismatch() {
    let err = check_error("var x: number = \"five\";");

    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.line(), 1);
}

#[test]
fn test_conditions_must_be_logic() {
    assert_eq!(check_error("if 1 { }").get_error_name(), "ConditionTypeError");
    assert_eq!(check_error("while \"yes\" { }").get_error_name(), "ConditionTypeError");
    assert_eq!(check_error("repeat 1.5 { }").get_error_name(), "ConditionTypeError");
    assert!(check("repeat 3 { }").is_ok());
}

#[test]
fn test_redeclaration_in_same_scope() {
    let err = check_error("var x: number = 1;\nvar x: number = 2;");

    assert_eq!(err.kind(), ErrorKind::Name);
    assert_eq!(err.line(), 2);
}

#[test]
fn test_shadowing_in_inner_scope() {
    assert!(check("var x: number = 1;\n{ var x: string = \"inner\"; }").is_ok());
}

#[test]
fn test_up_levels_skip_inner_scopes() {
    let program = parse_source("var x: number = 1;\n{\n  var x: string = \"inner\";\n  ^x = 2;\n}");
    let tables = type_check(&program, &StandardLibrary::new()).unwrap();

    // Outer `x` is the first symbol allocated, inner `x` the second.
    let symbols: Vec<SymbolId> = tables.sorted_symbols().into_iter().map(|(_, symbol)| symbol).collect();
    assert_eq!(symbols, vec![SymbolId(0), SymbolId(1), SymbolId(0)]);
}

#[test]
fn test_up_levels_past_every_scope() {
    let err = check_error("var x: number = 1;\n{ ^^^x = 2; }");

    assert_eq!(err.get_error_name(), "VariableNotDeclared");
}

#[test]
fn test_undeclared_variable_suggestions() {
    let err = check_error("var count: number = 1;\nprint cuont;");

    assert_eq!(err.kind(), ErrorKind::Name);
    assert!(err.suggestions().contains(&"count".to_string()));
}

#[test]
fn test_unknown_function_suggestions() {
    let err = check_error("function fob(a: number) { }\nfoo(1);");

    assert_eq!(err.kind(), ErrorKind::Name);
    match err.get_internal_error() {
        ErrorImpl::FunctionNotFound {
            function,
            arguments,
            suggestions,
        } => {
            assert_eq!(function, "foo");
            assert_eq!(arguments, "number");
            assert_eq!(suggestions.first(), Some(&"fob".to_string()));
            assert!(suggestions.iter().all(|name| edit_distance("foo", name) < 3));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_overload_resolution_by_argument_types() {
    let program = parse_source(
        "function show(a: number) { }\nfunction show(a: string) { }\nshow(1);\nshow(\"one\");",
    );
    let tables = type_check(&program, &StandardLibrary::new()).unwrap();

    let calls: Vec<String> = program.body[2..]
        .iter()
        .map(|stmt| match &**stmt {
            Stmt::Expression(stmt) => tables.function(stmt.expression.get_id()).unwrap().signature(),
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();

    assert_eq!(calls, vec!["show(number)".to_string(), "show(string)".to_string()]);
}

#[test]
fn test_duplicate_overload_rejected() {
    let err = check_error("function f(a: number) { }\nfunction f(b: number) { }");

    assert_eq!(err.get_error_name(), "FunctionAlreadyDeclared");
}

#[test]
fn test_recursive_function() {
    let source = "function fact(n: number): number {\n  if n <= 1 { return 1; }\n  return n * fact(n - 1);\n}";

    assert!(check(source).is_ok());
}

#[test]
fn test_literal_widening() {
    assert!(check("move <posx>;").is_ok());
    assert!(check("var d: <up, down> = <up>;\nd = <down>;").is_ok());
    assert_eq!(check_error("var d: <up, down> = <left>;").kind(), ErrorKind::Type);
    assert!(check("var d: <up, down> = <up>;\nprint d == <down>;").is_ok());
}

#[test]
fn test_literal_list_unions_members() {
    assert!(check("var path: [<up, down>] = [<up>, <down>, <up>];").is_ok());
}

#[test]
fn test_empty_collection_binding() {
    assert!(check("var xs: [number] = [];\nvar m: |string -> real| = {};\nxs = [];").is_ok());
    assert!(check("function empty(): [string] { return []; }").is_ok());
}

#[test]
fn test_empty_collection_argument_rejected() {
    let err = check_error("function f(xs: [number]) { }\nf([]);");

    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.get_error_name(), "EmptyCollectionArgument");
}

#[test]
fn test_empty_collection_bound_first_accepted() {
    assert!(check("function f(xs: [number]) { }\nvar xs: [number] = [];\nf(xs);").is_ok());
}

#[test]
fn test_empty_collection_operand_rejected() {
    assert_eq!(check_error("print [] == [];").get_error_name(), "EmptyCollectionOperand");
    assert_eq!(check_error("var xs: [[number]] = [[]];").get_error_name(), "EmptyCollectionOperand");
}

#[test]
fn test_element_types_must_agree() {
    let err = check_error("var xs: [number] = [1, 2.0];");

    assert_eq!(err.get_error_name(), "ElementTypeMismatch");
}

#[test]
fn test_indexing() {
    assert!(check("var xs: [real] = [1.0];\nvar x: real = xs[0];").is_ok());
    assert!(check("var m: |string -> number| = {\"a\": 1};\nvar x: number = m[\"a\"];").is_ok());
    assert_eq!(
        check_error("var xs: [real] = [1.0];\nvar x: real = xs[\"0\"];").get_error_name(),
        "IndexTypeError"
    );
}

#[test]
fn test_interpolation_needs_simple_types() {
    assert!(check("var n: number = 3;\nprint `n = {n}`;").is_ok());
    assert_eq!(
        check_error("var xs: [number] = [1];\nprint `xs = {xs}`;").get_error_name(),
        "InterpolationTypeError"
    );
}

#[test]
fn test_void_call_as_value() {
    let err = check_error("function nothing() { }\nvar x: number = nothing();");

    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_return_completeness_with_else() {
    let source = "function sign(n: number): number {\n  if n < 0 { return -1; } else { return 1; }\n}";

    assert!(check(source).is_ok());
}

#[test]
fn test_return_completeness_without_else() {
    let err = check_error("function sign(n: number): number {\n  if n < 0 { return -1; }\n}");

    assert_eq!(err.kind(), ErrorKind::Logic);
    assert_eq!(err.get_error_name(), "MissingReturn");
}

#[test]
fn test_return_rules() {
    assert_eq!(check_error("return;").get_error_name(), "ReturnOutsideFunction");
    assert_eq!(
        check_error("function f(): number { return; }").get_error_name(),
        "MissingReturnValue"
    );
    assert_eq!(check_error("function f() { return 1; }").get_error_name(), "UnexpectedReturnValue");
    assert_eq!(
        check_error("function f(): number { return \"1\"; }").get_error_name(),
        "ReturnTypeMismatch"
    );
}

#[test]
fn test_unreachable_code() {
    let err = check_error("function f(): number {\n  return 1;\n  print 2;\n}");

    assert_eq!(err.kind(), ErrorKind::Logic);
    assert_eq!(err.get_error_name(), "UnreachableCode");
    assert_eq!(err.line(), 3);
}

#[test]
fn test_unreachable_after_break() {
    let err = check_error("while true {\n  break;\n  print 1;\n}");

    assert_eq!(err.get_error_name(), "UnreachableCode");
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(check_error("break;").get_error_name(), "OutsideLoop");
    assert_eq!(
        check_error("while true {\n  function f() { continue; }\n  break;\n}").get_error_name(),
        "OutsideLoop"
    );
    assert!(check("repeat 2 { if true { break; } }").is_ok());
}

#[test]
fn test_parameters_share_body_scope() {
    let err = check_error("function f(a: number) { var a: number = 1; }");

    assert_eq!(err.kind(), ErrorKind::Name);
}

#[test]
fn test_analysis_is_deterministic() {
    let source = "var x: number = 1;\nfunction f(a: number): number { return a * 2; }\nrepeat f(x) { x += 1; }";

    let first = check(source).unwrap();
    let second = check(source).unwrap();

    assert_eq!(first.sorted_symbols(), second.sorted_symbols());
    assert_eq!(first.sorted_operators(), second.sorted_operators());
    assert_eq!(first.function_count(), second.function_count());
}

#[test]
fn test_suggest_similar() {
    assert_eq!(edit_distance("count", "cuont"), 1);
    assert_eq!(edit_distance("", "abc"), 3);

    let names = ["print", "position", "pint", "paint", "print"];
    assert_eq!(
        suggest_similar("prnt", names.iter().copied()),
        vec!["print".to_string(), "pint".to_string(), "paint".to_string()]
    );
}
