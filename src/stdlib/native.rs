//! Binding Rust functions as natives.
//!
//! Any `Fn(&mut RunContext, A1, ..., An) -> R` with up to five parameters
//! can be registered, as long as every `Ai` is a [`HostValue`] and `R` is a
//! [`NativeReturn`]. The host representations are compared against the
//! declared signature once, when the native is registered.

use std::{fmt::Display, rc::Rc};

use num_bigint::BigInt;

use crate::{
    ast::types::{Primitive, Type},
    evaluator::value::{Material, Value},
};

use super::{context::RunContext, function::NativeFn};

/// How a native sees one of its parameters or its return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    Number,
    Real,
    Logic,
    String,
    Material,
    List(Box<HostType>),
    /// Takes whatever value the script passes, unconverted.
    Any,
}

impl HostType {
    /// The host representation a declared type needs. Literal members are
    /// strings; maps are only reachable through [`Value`].
    pub fn for_type(ty: &Type) -> HostType {
        match ty {
            Type::Simple(Primitive::Number) => HostType::Number,
            Type::Simple(Primitive::Real) => HostType::Real,
            Type::Simple(Primitive::Logic) => HostType::Logic,
            Type::Simple(Primitive::String) => HostType::String,
            Type::Simple(Primitive::Material) => HostType::Material,
            Type::Literal(_) => HostType::String,
            Type::List(element) => HostType::List(Box::new(HostType::for_type(element))),
            Type::Map(_, _) | Type::EmptyList | Type::EmptyMap => HostType::Any,
        }
    }

    /// Whether a host parameter of this representation can receive values of
    /// the `declared` representation.
    pub fn matches(&self, declared: &HostType) -> bool {
        match (self, declared) {
            (HostType::Any, _) => true,
            (HostType::List(host), HostType::List(declared)) => host.matches(declared),
            _ => self == declared,
        }
    }
}

impl Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostType::Number => write!(f, "BigInt"),
            HostType::Real => write!(f, "f64"),
            HostType::Logic => write!(f, "bool"),
            HostType::String => write!(f, "String"),
            HostType::Material => write!(f, "Material"),
            HostType::List(element) => write!(f, "Vec<{}>", element),
            HostType::Any => write!(f, "Value"),
        }
    }
}

/// A Rust type that a script value can be marshaled into and out of.
pub trait HostValue: Sized {
    fn host_type() -> HostType;
    fn from_value(value: Value) -> Result<Self, String>;
    fn into_value(self) -> Value;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T, String> {
    Err(format!("expected {}, received {}", expected, value.kind_name()))
}

impl HostValue for BigInt {
    fn host_type() -> HostType {
        HostType::Number
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Number(number) => Ok(number),
            other => mismatch("number", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl HostValue for f64 {
    fn host_type() -> HostType {
        HostType::Real
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Real(real) => Ok(real),
            other => mismatch("real", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl HostValue for bool {
    fn host_type() -> HostType {
        HostType::Logic
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Logic(logic) => Ok(logic),
            other => mismatch("logic", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::Logic(self)
    }
}

impl HostValue for String {
    fn host_type() -> HostType {
        HostType::String
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::String(string) | Value::Literal(string) => Ok(string),
            other => mismatch("string", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl HostValue for Material {
    fn host_type() -> HostType {
        HostType::Material
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Material(material) => Ok(material),
            other => mismatch("material", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::Material(self)
    }
}

impl HostValue for Value {
    fn host_type() -> HostType {
        HostType::Any
    }

    fn from_value(value: Value) -> Result<Self, String> {
        Ok(value)
    }

    fn into_value(self) -> Value {
        self
    }
}

impl<T: HostValue> HostValue for Vec<T> {
    fn host_type() -> HostType {
        HostType::List(Box::new(T::host_type()))
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch("list", &other),
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(HostValue::into_value).collect())
    }
}

/// What a native may return: nothing, a host value, or either of those
/// wrapped in a `Result` whose error message becomes a runtime error.
pub trait NativeReturn {
    /// `None` for natives without a return type.
    fn host_type() -> Option<HostType>;
    fn into_result(self) -> Result<Value, String>;
}

impl NativeReturn for () {
    fn host_type() -> Option<HostType> {
        None
    }

    fn into_result(self) -> Result<Value, String> {
        Ok(Value::Unit)
    }
}

impl<T: HostValue> NativeReturn for T {
    fn host_type() -> Option<HostType> {
        Some(T::host_type())
    }

    fn into_result(self) -> Result<Value, String> {
        Ok(self.into_value())
    }
}

impl NativeReturn for Result<(), String> {
    fn host_type() -> Option<HostType> {
        None
    }

    fn into_result(self) -> Result<Value, String> {
        self.map(|_| Value::Unit)
    }
}

impl<T: HostValue> NativeReturn for Result<T, String> {
    fn host_type() -> Option<HostType> {
        Some(T::host_type())
    }

    fn into_result(self) -> Result<Value, String> {
        self.map(HostValue::into_value)
    }
}

/// A Rust function that can be registered as a native. `Args` is the tuple
/// of its parameter types after the run context.
pub trait NativeCallable<Args> {
    fn parameter_types() -> Vec<HostType>;
    fn return_type() -> Option<HostType>;
    fn into_native(self) -> NativeFn;
}

macro_rules! impl_native_callable {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, R, $($arg,)*> NativeCallable<($($arg,)*)> for F
        where
            F: Fn(&mut RunContext, $($arg,)*) -> R + 'static,
            R: NativeReturn,
            $($arg: HostValue,)*
        {
            fn parameter_types() -> Vec<HostType> {
                vec![$($arg::host_type(),)*]
            }

            fn return_type() -> Option<HostType> {
                R::host_type()
            }

            fn into_native(self) -> NativeFn {
                Rc::new(move |context: &mut RunContext, arguments: Vec<Value>| {
                    let mut arguments = arguments.into_iter();
                    $(
                        let $arg = $arg::from_value(
                            arguments.next().ok_or_else(|| String::from("missing argument"))?,
                        )?;
                    )*
                    (self)(context, $($arg,)*).into_result()
                })
            }
        }
    };
}

impl_native_callable!();
impl_native_callable!(A);
impl_native_callable!(A, B);
impl_native_callable!(A, B, C);
impl_native_callable!(A, B, C, D);
impl_native_callable!(A, B, C, D, E);
