//! Unit tests for error handling.
//!
//! This module contains tests for error kinds, display formatting and tips.

use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn position(line: u32, column: u32) -> Position {
    Position::new(0, line, column, Rc::new("test.archit".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(1, 1),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.kind(), ErrorKind::Syntax);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(3, 14),
    );

    assert_eq!(error.line(), 3);
    assert_eq!(error.column(), 14);
    assert_eq!(error.get_position().file.as_str(), "test.archit");
}

#[test]
fn test_error_display_prefix() {
    let error = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "number".to_string(),
            received: "string".to_string(),
        },
        position(2, 5),
    );

    assert_eq!(
        error.to_string(),
        "Type error at line 2, col 5: types do not match: expected number, received string"
    );
}

#[test]
fn test_error_kinds() {
    let cases = vec![
        (ErrorImpl::UnknownType { type_: "int".to_string() }, ErrorKind::Syntax),
        (ErrorImpl::DuplicateParameter { parameter: "a".to_string() }, ErrorKind::Name),
        (ErrorImpl::EmptyCollectionOperand, ErrorKind::Type),
        (ErrorImpl::UnreachableCode, ErrorKind::Logic),
        (ErrorImpl::DivisionByZero, ErrorKind::Runtime),
        (ErrorImpl::RecursionLimit { limit: 10 }, ErrorKind::Runtime),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "{:?}", error);
    }
}

#[test]
fn test_variable_not_declared_suggestions() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "coutn".to_string(),
            suggestions: vec!["count".to_string()],
        },
        position(1, 7),
    );

    assert_eq!(error.kind(), ErrorKind::Name);
    assert_eq!(error.suggestions(), ["count".to_string()]);
    assert!(error.to_string().ends_with("(did you mean: count?)"));
    assert_eq!(error.get_tip().to_string(), "did you mean count?");
}

#[test]
fn test_suggestions_empty_for_other_errors() {
    let error = Error::new(ErrorImpl::DivisionByZero, position(1, 1));

    assert!(error.suggestions().is_empty());
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(1, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        position(1, 1),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_format_error_points_at_column() {
    let source = "var x: number = 1;\nvar y: number = z;\n";
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "z".to_string(),
            suggestions: vec![],
        },
        Position::new(35, 2, 17, Rc::new("test.archit".to_string())),
    );

    let rendered = crate::format_error(&error, source);

    assert!(rendered.starts_with("Name error: VariableNotDeclared"));
    assert!(rendered.contains("2 | var y: number = z;"));
    assert!(rendered.contains("-> test.archit:2:17"));
}
