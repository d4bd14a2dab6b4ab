//! Unit tests for the standard library.
//!
//! Covers native registration checks, overload and dynamic resolution, and a
//! handful of the built-in natives called directly.

use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::{
    context::{PrintHandler, RunContext},
    function::{Function, FunctionBody},
    stdlib::StandardLibrary,
};
use crate::{
    ast::types::Type,
    evaluator::value::{Material, Value},
    type_checker::scope::Scope,
};

fn call(function: &Function, context: &mut RunContext, arguments: Vec<Value>) -> Result<Value, String> {
    match &function.body {
        FunctionBody::Native(native) => native(context, arguments),
        FunctionBody::Script(_) => panic!("expected a native function"),
    }
}

fn call_builtin(name: &str, types: &[Type], arguments: Vec<Value>) -> Result<Value, String> {
    let stdlib = StandardLibrary::new();
    let function = stdlib
        .function(name, types)
        .unwrap_or_else(|| panic!("no overload for {}", name));
    call(&function, &mut RunContext::default(), arguments)
}

#[test]
fn test_register_native() {
    let mut stdlib = StandardLibrary::empty();

    let registered = stdlib.register_native(
        "native double(value: number): number;",
        |_: &mut RunContext, value: BigInt| value * 2,
    );

    assert!(registered);
    let function = stdlib.function("double", &[Type::NUMBER]).unwrap();
    assert_eq!(function.signature(), "double(number)");
    assert_eq!(function.return_type, Some(Type::NUMBER));
    assert_eq!(
        call(&function, &mut RunContext::default(), vec![Value::from(21)]),
        Ok(Value::from(42))
    );
}

#[test]
fn test_register_native_rejects_wrong_return_type() {
    let mut stdlib = StandardLibrary::empty();

    let registered = stdlib.register_native(
        "native half(value: number): real;",
        |_: &mut RunContext, value: BigInt| value / 2,
    );

    assert!(!registered);
    assert_eq!(stdlib.native_count(), 0);
}

#[test]
fn test_register_native_rejects_missing_return_type() {
    let mut stdlib = StandardLibrary::empty();

    assert!(!stdlib.register_native("native nothing(): number;", |_: &mut RunContext| {}));
    assert!(!stdlib.register_native("native something();", |_: &mut RunContext| true));
}

#[test]
fn test_register_native_rejects_parameter_mismatch() {
    let mut stdlib = StandardLibrary::empty();

    assert!(!stdlib.register_native(
        "native add(a: number, b: number): number;",
        |_: &mut RunContext, a: BigInt| a,
    ));
    assert!(!stdlib.register_native(
        "native negate(value: real): real;",
        |_: &mut RunContext, value: BigInt| -value,
    ));
}

#[test]
fn test_register_native_rejects_bad_declaration() {
    let mut stdlib = StandardLibrary::empty();

    assert!(!stdlib.register_native("native broken(: number;", |_: &mut RunContext| {}));
    assert!(!stdlib.register_native(
        "native twice(a: number, a: number);",
        |_: &mut RunContext, _: BigInt, _: BigInt| {},
    ));
}

#[test]
fn test_register_native_rejects_duplicates() {
    let mut stdlib = StandardLibrary::empty();

    assert!(stdlib.register_native("native ping(value: number);", |_: &mut RunContext, _: BigInt| {}));
    assert!(!stdlib.register_native("native ping(other: number);", |_: &mut RunContext, _: BigInt| {}));
    assert!(stdlib.register_native("native ping(value: real);", |_: &mut RunContext, _: f64| {}));
    assert_eq!(stdlib.native_count(), 2);
}

#[test]
fn test_register_dynamic_rejects_duplicates() {
    let mut stdlib = StandardLibrary::empty();

    assert!(stdlib.register_dynamic("anything", |_: &[Type]| None));
    assert!(!stdlib.register_dynamic("anything", |_: &[Type]| None));
    assert!(stdlib.has_dynamic("anything"));
}

#[test]
fn test_overloads_resolve_by_exact_types() {
    let stdlib = StandardLibrary::new();

    let number = stdlib.function("abs", &[Type::NUMBER]).unwrap();
    let real = stdlib.function("abs", &[Type::REAL]).unwrap();

    assert_eq!(number.return_type, Some(Type::NUMBER));
    assert_eq!(real.return_type, Some(Type::REAL));
    assert!(stdlib.function("abs", &[Type::STRING]).is_none());
}

#[test]
fn test_literal_argument_needs_widening() {
    let stdlib = StandardLibrary::new();
    let argument = [Type::literal(["posx"])];

    assert!(stdlib.function("move", &argument).is_none());

    let widened = stdlib.widened_function("move", &argument).unwrap();
    assert_eq!(widened.parameter_names, vec!["direction".to_string()]);
}

#[test]
fn test_print_resolves_for_any_value() {
    let stdlib = StandardLibrary::new();

    assert!(stdlib.function("print", &[Type::STRING]).is_some());
    assert!(stdlib.function("print", &[Type::map(Type::STRING, Type::list(Type::REAL))]).is_some());
    assert!(stdlib.function("print", &[Type::EmptyList]).is_none());
    assert!(stdlib.function("print", &[Type::STRING, Type::STRING]).is_none());
}

#[test]
fn test_print_writes_to_buffer() {
    let stdlib = StandardLibrary::new();
    let (output, buffer) = PrintHandler::buffer();
    let mut context = RunContext::new(output, String::new(), None);

    let print = stdlib.function("print", &[Type::list(Type::STRING)]).unwrap();
    let result = call(
        &print,
        &mut context,
        vec![Value::List(vec![Value::from("a"), Value::from("b")])],
    );

    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(buffer.borrow().as_str(), "[\"a\", \"b\"]\n");
}

#[test]
fn test_collection_dynamics() {
    let stdlib = StandardLibrary::new();
    let list = Type::list(Type::NUMBER);
    let map = Type::map(Type::STRING, Type::NUMBER);

    let append = stdlib.function("append", &[list.clone(), Type::NUMBER]).unwrap();
    assert_eq!(append.return_type, Some(list.clone()));
    assert!(stdlib.function("append", &[list.clone(), Type::STRING]).is_none());

    let keys = stdlib.function("keys", &[map.clone()]).unwrap();
    assert_eq!(keys.return_type, Some(Type::list(Type::STRING)));

    let size = stdlib.function("size", &[map.clone()]).unwrap();
    assert_eq!(size.return_type, Some(Type::NUMBER));
    assert!(stdlib.function("size", &[Type::STRING]).is_none());

    let has = stdlib.function("has", &[map, Type::STRING]).unwrap();
    let lookup: Value = Value::Map([(Value::from("a"), Value::from(1))].into_iter().collect());
    assert_eq!(
        call(&has, &mut RunContext::default(), vec![lookup.clone(), Value::from("a")]),
        Ok(Value::Logic(true))
    );
    assert_eq!(
        call(&has, &mut RunContext::default(), vec![lookup, Value::from("b")]),
        Ok(Value::Logic(false))
    );
}

#[test]
fn test_append_returns_extended_list() {
    let result = call_builtin(
        "append",
        &[Type::list(Type::NUMBER), Type::NUMBER],
        vec![Value::List(vec![Value::from(1)]), Value::from(2)],
    );

    assert_eq!(result, Ok(Value::List(vec![Value::from(1), Value::from(2)])));
}

#[test]
fn test_move_updates_cursor() {
    let stdlib = StandardLibrary::new();
    let mut context = RunContext::default();

    let by_direction = stdlib.widened_function("move", &[Type::literal(["posy"])]).unwrap();
    call(&by_direction, &mut context, vec![Value::Literal("posy".to_string())]).unwrap();

    let by_offsets = stdlib
        .function("move", &[Type::NUMBER, Type::NUMBER, Type::NUMBER])
        .unwrap();
    call(
        &by_offsets,
        &mut context,
        vec![Value::from(2), Value::from(0), Value::from(-3)],
    )
    .unwrap();

    let position = stdlib.function("position", &[]).unwrap();
    assert_eq!(
        call(&position, &mut context, vec![]),
        Ok(Value::List(vec![Value::from(2), Value::from(1), Value::from(-3)]))
    );
}

#[test]
fn test_move_vector_needs_three_components() {
    let result = call_builtin(
        "move",
        &[Type::list(Type::NUMBER)],
        vec![Value::List(vec![Value::from(1), Value::from(2)])],
    );

    assert!(result.is_err());
}

#[test]
fn test_math_natives() {
    assert_eq!(call_builtin("sqrt", &[Type::REAL], vec![Value::from(9.0)]), Ok(Value::from(3.0)));
    assert_eq!(call_builtin("abs", &[Type::NUMBER], vec![Value::from(-4)]), Ok(Value::from(4)));
    assert_eq!(call_builtin("floor", &[Type::REAL], vec![Value::from(2.7)]), Ok(Value::from(2)));
    assert_eq!(call_builtin("ceil", &[Type::REAL], vec![Value::from(2.1)]), Ok(Value::from(3)));
    assert_eq!(call_builtin("sign", &[Type::REAL], vec![Value::from(-0.5)]), Ok(Value::from(-1)));
    assert_eq!(
        call_builtin("log", &[Type::REAL, Type::REAL], vec![Value::from(2.0), Value::from(8.0)]),
        Ok(Value::from(3.0))
    );
}

#[test]
fn test_cast_natives() {
    assert_eq!(
        call_builtin("as_number", &[Type::STRING], vec![Value::from("1_000")]),
        Ok(Value::from(1000))
    );
    assert!(call_builtin("as_number", &[Type::STRING], vec![Value::from("ten")]).is_err());
    assert_eq!(
        call_builtin("as_string", &[Type::REAL], vec![Value::from(2.0)]),
        Ok(Value::from("2.0"))
    );
    assert_eq!(
        call_builtin("as_material", &[Type::STRING], vec![Value::from("stone")]),
        Ok(Value::Material(Material::new("minecraft", "stone")))
    );
}

#[test]
fn test_string_natives() {
    assert_eq!(call_builtin("length", &[Type::STRING], vec![Value::from("héllo")]), Ok(Value::from(5)));
    assert_eq!(
        call_builtin(
            "index_of",
            &[Type::STRING, Type::STRING],
            vec![Value::from("héllo"), Value::from("l")]
        ),
        Ok(Value::from(2))
    );
    assert_eq!(
        call_builtin(
            "substring",
            &[Type::STRING, Type::NUMBER, Type::NUMBER],
            vec![Value::from("archit"), Value::from(1), Value::from(4)]
        ),
        Ok(Value::from("rch"))
    );
    assert!(call_builtin(
        "substring",
        &[Type::STRING, Type::NUMBER, Type::NUMBER],
        vec![Value::from("archit"), Value::from(4), Value::from(10)]
    )
    .is_err());
    assert_eq!(
        call_builtin(
            "matches",
            &[Type::STRING, Type::STRING],
            vec![Value::from("abc123"), Value::from("[a-z]+[0-9]+")]
        ),
        Ok(Value::Logic(true))
    );
}

#[test]
fn test_random_is_seeded_per_run() {
    let stdlib = StandardLibrary::new();
    let random = stdlib.function("random", &[Type::NUMBER, Type::NUMBER]).unwrap();
    let arguments = || vec![Value::from(0), Value::from(1_000_000)];

    let mut first = RunContext::new(PrintHandler::Silent, String::new(), Some(7));
    let mut second = RunContext::new(PrintHandler::Silent, String::new(), Some(7));

    assert_eq!(
        call(&random, &mut first, arguments()),
        call(&random, &mut second, arguments())
    );
}

#[test]
fn test_random_rejects_empty_range() {
    let result = call_builtin("random", &[Type::REAL, Type::REAL], vec![Value::from(1.0), Value::from(1.0)]);

    assert!(result.is_err());
}

#[test]
fn test_names_are_sorted_and_unique() {
    let stdlib = StandardLibrary::new();
    let names = stdlib.names();

    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();

    assert_eq!(names, sorted);
    assert!(names.contains(&"print".to_string()));
    assert!(names.contains(&"move".to_string()));
}

#[test]
fn test_native_arguments_are_marshaled() {
    let mut stdlib = StandardLibrary::empty();
    stdlib.register_native(
        "native total(values: [number]): number;",
        |_: &mut RunContext, values: Vec<BigInt>| values.into_iter().sum::<BigInt>(),
    );

    let total = stdlib.function("total", &[Type::list(Type::NUMBER)]).unwrap();
    let mut context = RunContext::default();

    assert_eq!(
        call(&total, &mut context, vec![Value::List(vec![Value::from(1), Value::from(2)])]),
        Ok(Value::from(3))
    );
    assert!(call(&total, &mut context, vec![Value::from("oops")]).is_err());
}
