use std::{fmt::Debug, rc::Rc};

use crate::{
    ast::{statements::FnDeclStmt, types::{display_types, Type}},
    evaluator::value::Value,
};

use super::context::RunContext;

/// A native after marshaling: takes the run context and the evaluated
/// arguments, returns `Value::Unit` for functions without a return type.
pub type NativeFn = Rc<dyn Fn(&mut RunContext, Vec<Value>) -> Result<Value, String>>;

#[derive(Clone)]
pub enum FunctionBody {
    Native(NativeFn),
    Script(Rc<FnDeclStmt>),
}

/// A callable resolved at analysis time. Two functions with the same name and
/// parameter types are the same overload.
#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub parameter_types: Vec<Type>,
    pub parameter_names: Vec<String>,
    pub return_type: Option<Type>,
    pub body: FunctionBody,
}

impl Function {
    pub fn native(
        name: impl Into<String>,
        parameter_types: Vec<Type>,
        parameter_names: Vec<String>,
        return_type: Option<Type>,
        native: NativeFn,
    ) -> Self {
        Function {
            name: name.into(),
            parameter_types,
            parameter_names,
            return_type,
            body: FunctionBody::Native(native),
        }
    }

    pub fn script(decl: Rc<FnDeclStmt>) -> Self {
        Function {
            name: decl.identifier.clone(),
            parameter_types: decl.parameters.iter().map(|p| p.explicit_type.clone()).collect(),
            parameter_names: decl.parameters.iter().map(|p| p.name.clone()).collect(),
            return_type: decl.return_type.clone(),
            body: FunctionBody::Script(decl),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, FunctionBody::Native(_))
    }

    /// `name(type, ...)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, display_types(&self.parameter_types))
    }

    /// `name(value, ...)` for a call with concrete arguments.
    pub fn describe_call(&self, arguments: &[Value]) -> String {
        let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
        format!("{}({})", self.name, arguments.join(", "))
    }

    /// Whether a call with `arguments` matches this overload once literal
    /// arguments are widened to the declared literal types.
    pub fn accepts_widened(&self, arguments: &[Type]) -> bool {
        self.parameter_types.len() == arguments.len()
            && self
                .parameter_types
                .iter()
                .zip(arguments)
                .all(|(expected, actual)| expected.accepts(actual))
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_native() { "native" } else { "script" };
        match &self.return_type {
            Some(return_type) => write!(f, "{} {}: {}", kind, self.signature(), return_type),
            None => write!(f, "{} {}", kind, self.signature()),
        }
    }
}
