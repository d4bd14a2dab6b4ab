use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// The five error categories a script can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Name,
    Type,
    Logic,
    Runtime,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "Syntax error"),
            ErrorKind::Name => write!(f, "Name error"),
            ErrorKind::Type => write!(f, "Type error"),
            ErrorKind::Logic => write!(f, "Logic error"),
            ErrorKind::Runtime => write!(f, "Runtime error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }

    pub fn kind(&self) -> ErrorKind {
        self.internal_error.kind()
    }

    /// Names within edit distance of an unresolved identifier, closest scope
    /// first. Empty for every other error.
    pub fn suggestions(&self) -> &[String] {
        match &self.internal_error {
            ErrorImpl::VariableNotDeclared { suggestions, .. }
            | ErrorImpl::FunctionNotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::FunctionNotFound { .. } => "FunctionNotFound",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ConditionTypeError { .. } => "ConditionTypeError",
            ErrorImpl::OperatorTypeError { .. } => "OperatorTypeError",
            ErrorImpl::UnaryOperatorTypeError { .. } => "UnaryOperatorTypeError",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::UnexpectedReturnValue { .. } => "UnexpectedReturnValue",
            ErrorImpl::EmptyCollectionArgument { .. } => "EmptyCollectionArgument",
            ErrorImpl::EmptyCollectionOperand => "EmptyCollectionOperand",
            ErrorImpl::ElementTypeMismatch { .. } => "ElementTypeMismatch",
            ErrorImpl::IndexTypeError { .. } => "IndexTypeError",
            ErrorImpl::InterpolationTypeError { .. } => "InterpolationTypeError",
            ErrorImpl::UnreachableCode => "UnreachableCode",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::OutsideLoop { .. } => "OutsideLoop",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::RecursionLimit { .. } => "RecursionLimit",
            ErrorImpl::NativeCallFailed { .. } => "NativeCallFailed",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::MissingKey { .. } => "MissingKey",
            ErrorImpl::InvalidExponent { .. } => "InvalidExponent",
            ErrorImpl::ScriptUnavailable { .. } => "ScriptUnavailable",
            ErrorImpl::InternalError { .. } => "InternalError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number literal `{}`", token))
            }
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`, expected one of number, real, logic, string, material",
                type_
            )),
            ErrorImpl::VariableNotDeclared { suggestions, .. }
            | ErrorImpl::FunctionNotFound { suggestions, .. }
                if !suggestions.is_empty() =>
            {
                ErrorTip::Suggestion(format!("did you mean {}?", suggestions.join(", ")))
            }
            ErrorImpl::DuplicateParameter { parameter } => ErrorTip::Suggestion(format!(
                "Rename one of the `{}` parameters",
                parameter
            )),
            ErrorImpl::EmptyCollectionArgument { .. } | ErrorImpl::EmptyCollectionOperand => {
                ErrorTip::Suggestion(String::from(
                    "Bind the empty collection to a typed variable first",
                ))
            }
            ErrorImpl::MissingReturn { .. } => ErrorTip::Suggestion(String::from(
                "Add a return statement or an else branch that returns",
            )),
            ErrorImpl::RecursionLimit { limit } => ErrorTip::Suggestion(format!(
                "Calls may be nested at most {} deep",
                limit
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, col {}: {}",
            self.kind(),
            self.position.line,
            self.position.column,
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

fn suggestion_list(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Syntax
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_:?}")]
    UnknownType { type_: String },

    // Name
    #[error("variable {variable:?} already declared in this scope")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared{}", suggestion_list(.suggestions))]
    VariableNotDeclared {
        variable: String,
        suggestions: Vec<String>,
    },
    #[error("function {function:?} already declared with the same parameters in this scope")]
    FunctionAlreadyDeclared { function: String },
    #[error("no function {function}({arguments}) found{}", suggestion_list(.suggestions))]
    FunctionNotFound {
        function: String,
        arguments: String,
        suggestions: Vec<String>,
    },
    #[error("parameter {parameter:?} declared more than once")]
    DuplicateParameter { parameter: String },

    // Type
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("{statement} condition must be {expected}, received {received}")]
    ConditionTypeError {
        statement: String,
        expected: String,
        received: String,
    },
    #[error("operator {operator} cannot be applied to {left} and {right}")]
    OperatorTypeError {
        operator: String,
        left: String,
        right: String,
    },
    #[error("operator {operator} cannot be applied to {operand}")]
    UnaryOperatorTypeError { operator: String, operand: String },
    #[error("function returns {expected}, received {received}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("function {function:?} must return a value")]
    MissingReturnValue { function: String },
    #[error("function {function:?} does not return a value")]
    UnexpectedReturnValue { function: String },
    #[error("empty collection passed to {function:?} without a type")]
    EmptyCollectionArgument { function: String },
    #[error("empty collection used without a type")]
    EmptyCollectionOperand,
    #[error("collection elements must share one type: expected {expected}, received {received}")]
    ElementTypeMismatch { expected: String, received: String },
    #[error("cannot index {collection} with {index}")]
    IndexTypeError { collection: String, index: String },
    #[error("cannot interpolate a value of type {received}")]
    InterpolationTypeError { received: String },

    // Logic
    #[error("unreachable code")]
    UnreachableCode,
    #[error("some branches do not return in function {function:?}")]
    MissingReturn { function: String },
    #[error("{statement} used outside of a loop")]
    OutsideLoop { statement: String },
    #[error("return used outside of a function")]
    ReturnOutsideFunction,

    // Runtime
    #[error("division by zero")]
    DivisionByZero,
    #[error("maximum recursion depth of {limit} exceeded")]
    RecursionLimit { limit: usize },
    #[error("native function {function:?} failed: {message}")]
    NativeCallFailed { function: String, message: String },
    #[error("index {index} out of bounds for list of length {length}")]
    IndexOutOfBounds { index: String, length: usize },
    #[error("key {key} not found in map")]
    MissingKey { key: String },
    #[error("invalid exponent {exponent}")]
    InvalidExponent { exponent: String },
    #[error("script {path:?} cannot be run: {reason}")]
    ScriptUnavailable { path: String, reason: String },
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl ErrorImpl {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnknownType { .. } => ErrorKind::Syntax,

            ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::FunctionNotFound { .. }
            | ErrorImpl::DuplicateParameter { .. } => ErrorKind::Name,

            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::ConditionTypeError { .. }
            | ErrorImpl::OperatorTypeError { .. }
            | ErrorImpl::UnaryOperatorTypeError { .. }
            | ErrorImpl::ReturnTypeMismatch { .. }
            | ErrorImpl::MissingReturnValue { .. }
            | ErrorImpl::UnexpectedReturnValue { .. }
            | ErrorImpl::EmptyCollectionArgument { .. }
            | ErrorImpl::EmptyCollectionOperand
            | ErrorImpl::ElementTypeMismatch { .. }
            | ErrorImpl::IndexTypeError { .. }
            | ErrorImpl::InterpolationTypeError { .. } => ErrorKind::Type,

            ErrorImpl::UnreachableCode
            | ErrorImpl::MissingReturn { .. }
            | ErrorImpl::OutsideLoop { .. }
            | ErrorImpl::ReturnOutsideFunction => ErrorKind::Logic,

            ErrorImpl::DivisionByZero
            | ErrorImpl::RecursionLimit { .. }
            | ErrorImpl::NativeCallFailed { .. }
            | ErrorImpl::IndexOutOfBounds { .. }
            | ErrorImpl::MissingKey { .. }
            | ErrorImpl::InvalidExponent { .. }
            | ErrorImpl::ScriptUnavailable { .. }
            | ErrorImpl::InternalError { .. } => ErrorKind::Runtime,
        }
    }
}
