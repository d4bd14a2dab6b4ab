use num_bigint::BigInt;

use crate::{lexer::tokens::Token, Span};

use super::ast::{ExprWrapper, NodeId};

#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub value: BigInt,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RealExpr {
    pub value: f64,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LogicExpr {
    pub value: bool,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StringExpr {
    pub value: String,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Text(String),
    Expr(ExprWrapper),
}

/// A backtick string with embedded `{expr}` fragments.
#[derive(Debug, Clone)]
pub struct InterpolationExpr {
    pub parts: Vec<InterpolationPart>,
    pub id: NodeId,
    pub span: Span,
}

impl InterpolationExpr {
    pub fn expressions(&self) -> impl Iterator<Item = &ExprWrapper> {
        self.parts.iter().filter_map(|part| match part {
            InterpolationPart::Expr(expr) => Some(expr),
            InterpolationPart::Text(_) => None,
        })
    }
}

/// `#id` or `#namespace:id`. A missing namespace is left empty here and
/// defaulted when the value is built.
#[derive(Debug, Clone)]
pub struct MaterialExpr {
    pub namespace: Option<String>,
    pub name: String,
    pub id: NodeId,
    pub span: Span,
}

/// A single enum member, `<posx>`.
#[derive(Debug, Clone)]
pub struct EnumExpr {
    pub member: String,
    pub id: NodeId,
    pub span: Span,
}

/// A variable reference. `up_levels` counts the `^` prefixes and skips that
/// many enclosing scopes before lookup starts.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub value: String,
    pub up_levels: usize,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: ExprWrapper,
    pub operator: Token,
    pub right: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub operator: Token,
    pub right_expr: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

/// `collection[index]`, on lists and maps alike.
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub collection: ExprWrapper,
    pub index: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<ExprWrapper>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<ExprWrapper>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MapExpr {
    pub entries: Vec<(ExprWrapper, ExprWrapper)>,
    pub id: NodeId,
    pub span: Span,
}
