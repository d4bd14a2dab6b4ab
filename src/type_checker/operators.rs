//! The closed set of operations a binary, unary, index or compound
//! assignment node can perform.
//!
//! Analysis picks one variant per node from the operand types and records
//! it. Evaluation applies the recorded variant to the operand values without
//! looking at types again.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    ast::types::{Primitive, Type},
    errors::errors::ErrorImpl,
    evaluator::value::Value,
    lexer::tokens::TokenKind,
};

/// Integer exponents above this are rejected at runtime.
pub const MAX_NUMBER_EXPONENT: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operators {
    // Arithmetic
    AddNumbers,
    AddReals,
    ConcatStrings,
    SubtractNumbers,
    SubtractReals,
    MultiplyNumbers,
    MultiplyReals,
    DivideNumbers,
    DivideReals,
    ModuloNumbers,
    ModuloReals,
    PowerNumbers,
    PowerReals,

    // Comparison
    Equals,
    NotEquals,
    GreaterNumbers,
    GreaterReals,
    GreaterEqualsNumbers,
    GreaterEqualsReals,
    LessNumbers,
    LessReals,
    LessEqualsNumbers,
    LessEqualsReals,

    // Logical
    And,
    Or,
    Not,

    // Access
    ListIndex,
    MapGet,

    // Unary minus
    NegateNumber,
    NegateReal,
}

#[derive(Clone, Copy, PartialEq)]
enum Numeric {
    Number,
    Real,
}

fn numeric_pair(left: &Type, right: &Type) -> Option<Numeric> {
    match (left, right) {
        (Type::Simple(Primitive::Number), Type::Simple(Primitive::Number)) => Some(Numeric::Number),
        (Type::Simple(Primitive::Real), Type::Simple(Primitive::Real)) => Some(Numeric::Real),
        _ => None,
    }
}

impl Operators {
    /// Picks the variant for `left <operator> right` and the type it
    /// produces.
    pub fn resolve_binary(operator: TokenKind, left: &Type, right: &Type) -> Option<(Operators, Type)> {
        if left.is_pseudo() || right.is_pseudo() {
            return None;
        }

        let numeric = numeric_pair(left, right);
        let arithmetic = |numbers: Operators, reals: Operators| match numeric? {
            Numeric::Number => Some((numbers, Type::NUMBER)),
            Numeric::Real => Some((reals, Type::REAL)),
        };
        let comparison = |numbers: Operators, reals: Operators| match numeric? {
            Numeric::Number => Some((numbers, Type::LOGIC)),
            Numeric::Real => Some((reals, Type::LOGIC)),
        };

        match operator {
            TokenKind::Plus => {
                if *left == Type::STRING && *right == Type::STRING {
                    return Some((Operators::ConcatStrings, Type::STRING));
                }
                arithmetic(Operators::AddNumbers, Operators::AddReals)
            }
            TokenKind::Dash => arithmetic(Operators::SubtractNumbers, Operators::SubtractReals),
            TokenKind::Star => arithmetic(Operators::MultiplyNumbers, Operators::MultiplyReals),
            TokenKind::Slash => arithmetic(Operators::DivideNumbers, Operators::DivideReals),
            TokenKind::Percent => arithmetic(Operators::ModuloNumbers, Operators::ModuloReals),
            TokenKind::Caret => arithmetic(Operators::PowerNumbers, Operators::PowerReals),

            TokenKind::Equals | TokenKind::NotEquals => {
                if !left.accepts(right) && !right.accepts(left) {
                    return None;
                }
                let variant = if operator == TokenKind::Equals {
                    Operators::Equals
                } else {
                    Operators::NotEquals
                };
                Some((variant, Type::LOGIC))
            }
            TokenKind::Greater => comparison(Operators::GreaterNumbers, Operators::GreaterReals),
            TokenKind::GreaterEquals => {
                comparison(Operators::GreaterEqualsNumbers, Operators::GreaterEqualsReals)
            }
            TokenKind::Less => comparison(Operators::LessNumbers, Operators::LessReals),
            TokenKind::LessEquals => comparison(Operators::LessEqualsNumbers, Operators::LessEqualsReals),

            TokenKind::And | TokenKind::Or if *left == Type::LOGIC && *right == Type::LOGIC => {
                let variant = if operator == TokenKind::And {
                    Operators::And
                } else {
                    Operators::Or
                };
                Some((variant, Type::LOGIC))
            }
            _ => None,
        }
    }

    /// Compound assignments only accept the numeric specializations.
    pub fn resolve_compound(operator: TokenKind, target: &Type, value: &Type) -> Option<Operators> {
        let binary = match operator {
            TokenKind::PlusEquals => TokenKind::Plus,
            TokenKind::MinusEquals => TokenKind::Dash,
            TokenKind::StarEquals => TokenKind::Star,
            TokenKind::SlashEquals => TokenKind::Slash,
            TokenKind::PercentEquals => TokenKind::Percent,
            _ => return None,
        };

        numeric_pair(target, value)?;
        Operators::resolve_binary(binary, target, value).map(|(variant, _)| variant)
    }

    pub fn resolve_unary(operator: TokenKind, operand: &Type) -> Option<(Operators, Type)> {
        match (operator, operand) {
            (TokenKind::Dash, Type::Simple(Primitive::Number)) => Some((Operators::NegateNumber, Type::NUMBER)),
            (TokenKind::Dash, Type::Simple(Primitive::Real)) => Some((Operators::NegateReal, Type::REAL)),
            (TokenKind::Not, Type::Simple(Primitive::Logic)) => Some((Operators::Not, Type::LOGIC)),
            _ => None,
        }
    }

    /// `collection[index]`: lists take a number, maps take their key type.
    pub fn resolve_index(collection: &Type, index: &Type) -> Option<(Operators, Type)> {
        match collection {
            Type::List(element) if *index == Type::NUMBER => Some((Operators::ListIndex, (**element).clone())),
            Type::Map(key, value) if key.accepts(index) => Some((Operators::MapGet, (**value).clone())),
            _ => None,
        }
    }

    pub fn apply_binary(self, left: Value, right: Value) -> Result<Value, ErrorImpl> {
        match (self, left, right) {
            (Operators::AddNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Operators::AddReals, Value::Real(a), Value::Real(b)) => Ok(Value::Real(a + b)),
            (Operators::ConcatStrings, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Operators::SubtractNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (Operators::SubtractReals, Value::Real(a), Value::Real(b)) => Ok(Value::Real(a - b)),
            (Operators::MultiplyNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            (Operators::MultiplyReals, Value::Real(a), Value::Real(b)) => Ok(Value::Real(a * b)),

            (Operators::DivideNumbers, Value::Number(a), Value::Number(b)) => {
                if b.is_zero() {
                    return Err(ErrorImpl::DivisionByZero);
                }
                Ok(Value::Number(a / b))
            }
            (Operators::DivideReals, Value::Real(a), Value::Real(b)) => {
                if b == 0.0 {
                    return Err(ErrorImpl::DivisionByZero);
                }
                Ok(Value::Real(a / b))
            }
            (Operators::ModuloNumbers, Value::Number(a), Value::Number(b)) => {
                if b.is_zero() {
                    return Err(ErrorImpl::DivisionByZero);
                }
                Ok(Value::Number(euclidean_remainder(&a, &b)))
            }
            (Operators::ModuloReals, Value::Real(a), Value::Real(b)) => {
                if b == 0.0 {
                    return Err(ErrorImpl::DivisionByZero);
                }
                Ok(Value::Real(a.rem_euclid(b)))
            }

            (Operators::PowerNumbers, Value::Number(a), Value::Number(b)) => match b.to_u32() {
                Some(exponent) if exponent <= MAX_NUMBER_EXPONENT => Ok(Value::Number(a.pow(exponent))),
                _ => Err(ErrorImpl::InvalidExponent {
                    exponent: b.to_string(),
                }),
            },
            (Operators::PowerReals, Value::Real(a), Value::Real(b)) => Ok(Value::Real(a.powf(b))),

            (Operators::Equals, a, b) => Ok(Value::Logic(a == b)),
            (Operators::NotEquals, a, b) => Ok(Value::Logic(a != b)),

            (Operators::GreaterNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Logic(a > b)),
            (Operators::GreaterReals, Value::Real(a), Value::Real(b)) => Ok(Value::Logic(a > b)),
            (Operators::GreaterEqualsNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Logic(a >= b)),
            (Operators::GreaterEqualsReals, Value::Real(a), Value::Real(b)) => Ok(Value::Logic(a >= b)),
            (Operators::LessNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Logic(a < b)),
            (Operators::LessReals, Value::Real(a), Value::Real(b)) => Ok(Value::Logic(a < b)),
            (Operators::LessEqualsNumbers, Value::Number(a), Value::Number(b)) => Ok(Value::Logic(a <= b)),
            (Operators::LessEqualsReals, Value::Real(a), Value::Real(b)) => Ok(Value::Logic(a <= b)),

            (Operators::And, Value::Logic(a), Value::Logic(b)) => Ok(Value::Logic(a && b)),
            (Operators::Or, Value::Logic(a), Value::Logic(b)) => Ok(Value::Logic(a || b)),

            (Operators::ListIndex, Value::List(mut list), Value::Number(index)) => {
                let length = list.len();
                match index.to_usize() {
                    Some(position) if position < length => Ok(list.swap_remove(position)),
                    _ => Err(ErrorImpl::IndexOutOfBounds {
                        index: index.to_string(),
                        length,
                    }),
                }
            }
            (Operators::MapGet, Value::Map(map), key) => match map.get(&key) {
                Some(value) => Ok(value.clone()),
                None => Err(ErrorImpl::MissingKey { key: key.to_string() }),
            },

            (operator, left, right) => Err(ErrorImpl::InternalError {
                message: format!(
                    "{:?} applied to {} and {}",
                    operator,
                    left.kind_name(),
                    right.kind_name()
                ),
            }),
        }
    }

    pub fn apply_unary(self, operand: Value) -> Result<Value, ErrorImpl> {
        match (self, operand) {
            (Operators::NegateNumber, Value::Number(value)) => Ok(Value::Number(-value)),
            (Operators::NegateReal, Value::Real(value)) => Ok(Value::Real(-value)),
            (Operators::Not, Value::Logic(value)) => Ok(Value::Logic(!value)),
            (operator, operand) => Err(ErrorImpl::InternalError {
                message: format!("{:?} applied to {}", operator, operand.kind_name()),
            }),
        }
    }
}

/// Remainder that is never negative, whatever the signs of the operands.
fn euclidean_remainder(a: &BigInt, b: &BigInt) -> BigInt {
    let remainder = a % b;
    if remainder.is_negative() {
        remainder + b.abs()
    } else {
        remainder
    }
}
