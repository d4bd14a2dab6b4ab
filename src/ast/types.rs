//! Type system definitions.
//!
//! This module defines the structural types of the language:
//!
//! - Primitive types (number, real, logic, string, material)
//! - Composite types (lists and maps)
//! - Literal (enum-like) types such as `<posx, negx>`
//! - The empty-collection pseudo types of `[]` and `{}`
//!
//! Type annotations are parsed straight into these values; two types are
//! equal exactly when they are structurally equal.

use std::{collections::BTreeSet, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Number,
    Real,
    Logic,
    String,
    Material,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "number" => Some(Primitive::Number),
            "real" => Some(Primitive::Real),
            "logic" => Some(Primitive::Logic),
            "string" => Some(Primitive::String),
            "material" => Some(Primitive::Material),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::Real => "real",
            Primitive::Logic => "logic",
            Primitive::String => "string",
            Primitive::Material => "material",
        }
    }
}

/// Coarse classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Simple,
    List,
    Map,
    Literal,
    Pseudo,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Simple(Primitive),
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    /// An enum-like type listing its allowed members.
    Literal(BTreeSet<String>),
    /// Type of `[]` until a declaration fixes its element type.
    EmptyList,
    /// Type of `{}` until a declaration fixes its key and value types.
    EmptyMap,
}

impl Type {
    pub const NUMBER: Type = Type::Simple(Primitive::Number);
    pub const REAL: Type = Type::Simple(Primitive::Real);
    pub const LOGIC: Type = Type::Simple(Primitive::Logic);
    pub const STRING: Type = Type::Simple(Primitive::String);
    pub const MATERIAL: Type = Type::Simple(Primitive::Material);

    pub fn list(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn literal<I, S>(members: I) -> Type
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Type::Literal(members.into_iter().map(Into::into).collect())
    }

    pub fn classify(&self) -> TypeClass {
        match self {
            Type::Simple(_) => TypeClass::Simple,
            Type::List(_) => TypeClass::List,
            Type::Map(_, _) => TypeClass::Map,
            Type::Literal(_) => TypeClass::Literal,
            Type::EmptyList | Type::EmptyMap => TypeClass::Pseudo,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        self.classify() == TypeClass::Pseudo
    }

    /// Non-collection, non-pseudo types. These are the types that can be
    /// embedded in an interpolated string.
    pub fn is_simple(&self) -> bool {
        matches!(self.classify(), TypeClass::Simple | TypeClass::Literal)
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(element) => Some(element),
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<&Type> {
        match self {
            Type::Map(key, _) => Some(key),
            _ => None,
        }
    }

    pub fn value_type(&self) -> Option<&Type> {
        match self {
            Type::Map(_, value) => Some(value),
            _ => None,
        }
    }

    pub fn literal_members(&self) -> Option<&BTreeSet<String>> {
        match self {
            Type::Literal(members) => Some(members),
            _ => None,
        }
    }

    /// Whether a value of type `actual` may be stored where `self` is
    /// expected. Besides equality, a literal type is accepted by any literal
    /// type containing all of its members.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Literal(expected), Type::Literal(actual)) => actual.is_subset(expected),
            _ => self == actual,
        }
    }

    /// Like [`Type::accepts`], but also lets an empty collection literal fix
    /// its type from the expected list or map type. Only valid at binding
    /// sites: declarations, assignments and returns.
    pub fn accepts_binding(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::List(_), Type::EmptyList) | (Type::Map(_, _), Type::EmptyMap) => true,
            _ => self.accepts(actual),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Simple(primitive) => write!(f, "{}", primitive.name()),
            Type::List(element) => write!(f, "[{}]", element),
            Type::Map(key, value) => write!(f, "|{} -> {}|", key, value),
            Type::Literal(members) => {
                write!(f, "<{}>", members.iter().cloned().collect::<Vec<_>>().join(", "))
            }
            Type::EmptyList => write!(f, "[]"),
            Type::EmptyMap => write!(f, "{{}}"),
        }
    }
}

/// Renders a list of argument types the way a call site would read.
pub fn display_types(types: &[Type]) -> String {
    types
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
